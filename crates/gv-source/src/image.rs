use std::path::Path;

use gv_core::error::GridError;
use gv_core::pixel::{ChannelOrder, RawFrame};
use gv_core::traits::FrameSource;

/// Source d'image statique : une seule frame, puis fin de flux.
///
/// # Example
/// ```no_run
/// use gv_source::image::ImageSource;
/// use std::path::Path;
/// let source = ImageSource::open(Path::new("still.png")).unwrap();
/// ```
pub struct ImageSource {
    name: String,
    frame: Option<RawFrame>,
    fps: f64,
}

impl ImageSource {
    /// Load an image from disk.
    ///
    /// # Errors
    /// Returns [`GridError::SourceOpen`] if the image cannot be decoded.
    pub fn open(path: &Path) -> Result<Self, GridError> {
        let img = image::open(path).map_err(|e| GridError::source_open(path, e))?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(Self::from_raw(
            &path.display().to_string(),
            RawFrame {
                data: rgba.into_raw(),
                width,
                height,
                order: ChannelOrder::Rgba,
            },
        ))
    }

    /// Wrap an already decoded buffer.
    #[must_use]
    pub fn from_raw(name: &str, frame: RawFrame) -> Self {
        Self {
            name: name.to_string(),
            frame: Some(frame),
            fps: 1.0,
        }
    }
}

impl FrameSource for ImageSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_next(&mut self) -> anyhow::Result<Option<RawFrame>> {
        Ok(self.frame.take())
    }

    fn fps(&self) -> f64 {
        self.fps
    }

    fn frame_count_hint(&self) -> Option<u64> {
        Some(1)
    }

    fn release(&mut self) {
        self.frame = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn png_yields_exactly_one_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("red.png");
        image::RgbaImage::from_pixel(3, 2, image::Rgba([255, 0, 0, 255]))
            .save(&path)
            .unwrap();

        let mut src = ImageSource::open(&path).unwrap();
        let frame = src.read_next().unwrap().unwrap();
        assert_eq!((frame.width, frame.height), (3, 2));
        assert_eq!(frame.order, ChannelOrder::Rgba);
        assert_eq!(&frame.data[..4], &[255, 0, 0, 255]);
        assert!(src.read_next().unwrap().is_none());
    }

    #[test]
    fn unreadable_image_is_source_open_error() {
        let err = ImageSource::open(Path::new("/nonexistent/still.png")).err();
        assert!(matches!(err, Some(GridError::SourceOpen { .. })));
    }
}
