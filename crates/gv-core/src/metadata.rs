use serde::{Deserialize, Serialize};

use crate::reduce::GridMode;

/// Métadonnées d'une vidéo encodée, écrites à côté de l'archive.
///
/// Values read back from disk have already been validated: `fps > 0`,
/// `grid_rows >= 1`, `grid_cols >= 1`.
///
/// # Example
/// ```
/// use gv_core::metadata::VideoMetadata;
/// let meta = VideoMetadata { total_frames: Some(12), ..VideoMetadata::default() };
/// assert_eq!(meta.effective_frames(7), 7);
/// assert_eq!(meta.effective_frames(20), 12);
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct VideoMetadata {
    /// Identifiant de la source (chemin ou nom).
    pub name: String,
    pub grid_rows: usize,
    pub grid_cols: usize,
    pub frame_width: u32,
    pub frame_height: u32,
    /// Declared frame count. `None` when absent from the file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_frames: Option<usize>,
    pub fps: f64,
    /// Cell mode. `None` for files written without it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<GridMode>,
}

impl Default for VideoMetadata {
    fn default() -> Self {
        Self {
            name: String::new(),
            grid_rows: 1,
            grid_cols: 1,
            frame_width: 0,
            frame_height: 0,
            total_frames: None,
            fps: 1.0,
            mode: None,
        }
    }
}

impl VideoMetadata {
    /// Frame count to use against an archive holding `actual` matrices.
    ///
    /// Declared count when present, never beyond what the archive holds.
    #[must_use]
    pub fn effective_frames(&self, actual: usize) -> usize {
        self.total_frames.map_or(actual, |declared| declared.min(actual))
    }

    /// Output size for reconstruction, falling back to `cell_px` pixels per
    /// cell when the stored frame size is unusable.
    #[must_use]
    pub fn display_size(&self, cell_px: u32) -> (u32, u32) {
        let cell_px = cell_px.max(1);
        let w = if self.frame_width > 0 {
            self.frame_width
        } else {
            self.grid_cols as u32 * cell_px
        };
        let h = if self.frame_height > 0 {
            self.frame_height
        } else {
            self.grid_rows as u32 * cell_px
        };
        (w.max(1), h.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_total_uses_archive_length() {
        let meta = VideoMetadata::default();
        assert_eq!(meta.effective_frames(7), 7);
    }

    #[test]
    fn display_size_falls_back_to_cells() {
        let meta = VideoMetadata {
            grid_rows: 3,
            grid_cols: 4,
            ..VideoMetadata::default()
        };
        assert_eq!(meta.display_size(8), (32, 24));
        let meta = VideoMetadata {
            frame_width: 640,
            frame_height: 480,
            ..meta
        };
        assert_eq!(meta.display_size(8), (640, 480));
    }
}
