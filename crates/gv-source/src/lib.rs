/// Frame sources for gridvid (still image, ffmpeg video).

#[cfg(feature = "image-source")]
pub mod image;
#[cfg(feature = "video")]
pub mod video;

use std::path::Path;

use gv_core::error::GridError;
use gv_core::traits::FrameSource;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif"];

/// Ouvre la source adaptée à l'extension de `path`.
///
/// # Errors
/// Returns [`GridError::SourceOpen`] if the input cannot be opened or no
/// enabled source handles it.
pub fn open_source(path: &Path) -> Result<Box<dyn FrameSource>, GridError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        #[cfg(feature = "image-source")]
        return Ok(Box::new(crate::image::ImageSource::open(path)?));
        #[cfg(not(feature = "image-source"))]
        return Err(GridError::source_open(path, "image support disabled (feature 'image-source')"));
    }

    #[cfg(feature = "video")]
    {
        Ok(Box::new(video::VideoSource::open(path)?))
    }
    #[cfg(not(feature = "video"))]
    {
        Err(GridError::source_open(path, "video support disabled (feature 'video')"))
    }
}
