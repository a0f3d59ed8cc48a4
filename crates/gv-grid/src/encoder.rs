use anyhow::{Context, Result};

use gv_core::config::GridConfig;
use gv_core::frame::{Frame, FrameSequence, GridMatrix};
use gv_core::geometry::CellGeometry;
use gv_core::metadata::VideoMetadata;
use gv_core::pixel;
use gv_core::reduce::GridMode;
use gv_core::traits::{FrameSource, Progress};

/// Résultat d'un encodage complet : la séquence et ses métadonnées.
#[derive(Clone, Debug)]
pub struct EncodedVideo {
    pub sequence: FrameSequence,
    pub metadata: VideoMetadata,
}

/// Convertit des frames en matrices de grille R×C.
///
/// # Example
/// ```
/// use gv_core::frame::{Frame, GridCell};
/// use gv_core::reduce::GridMode;
/// use gv_grid::encoder::GridEncoder;
///
/// let mut encoder = GridEncoder::new(4, 4, GridMode::Binary);
/// let matrix = encoder.encode_frame(&Frame::filled(16, 16, (255, 255, 255)));
/// assert!(matrix.cells().iter().all(|c| *c == GridCell::Binary(1)));
/// ```
pub struct GridEncoder {
    rows: usize,
    cols: usize,
    mode: GridMode,
    max_frames: Option<usize>,
    /// Recomputed only when the frame size changes.
    geometry: Option<(u32, u32, CellGeometry)>,
}

impl GridEncoder {
    /// Zero rows or columns are treated as 1.
    #[must_use]
    pub fn new(rows: usize, cols: usize, mode: GridMode) -> Self {
        Self {
            rows: rows.max(1),
            cols: cols.max(1),
            mode,
            max_frames: None,
            geometry: None,
        }
    }

    /// Encoder configured from `[grid]` settings.
    #[must_use]
    pub fn from_config(config: &GridConfig) -> Self {
        let mut encoder = Self::new(config.grid_rows, config.grid_cols, config.mode);
        encoder.max_frames = config.max_frames;
        encoder
    }

    /// Stop after `limit` frames.
    #[must_use]
    pub fn with_max_frames(mut self, limit: Option<usize>) -> Self {
        self.max_frames = limit;
        self
    }

    fn geometry_for(&mut self, width: u32, height: u32) -> CellGeometry {
        match self.geometry {
            Some((w, h, g)) if w == width && h == height => g,
            _ => {
                let g = CellGeometry::new(width, height, self.rows, self.cols);
                self.geometry = Some((width, height, g));
                g
            }
        }
    }

    /// Sample every cell centre of `frame` and reduce it.
    pub fn encode_frame(&mut self, frame: &Frame) -> GridMatrix {
        let geometry = self.geometry_for(frame.width, frame.height);
        let mut matrix = GridMatrix::new(self.rows, self.cols, self.mode);
        for (row, col, x, y) in geometry.sample_points() {
            matrix.set(row, col, self.mode.reduce(frame.pixel(x, y)));
        }
        matrix
    }

    /// Pull frames from `source` until end of stream.
    ///
    /// The source is released before returning, on success and on error.
    ///
    /// # Errors
    /// Returns an error if the source fails mid-stream or hands out a
    /// malformed buffer.
    pub fn encode_source(
        &mut self,
        source: &mut dyn FrameSource,
        progress: &mut dyn Progress,
    ) -> Result<EncodedVideo> {
        let result = self.encode_frames(source, progress);
        source.release();
        result
    }

    fn encode_frames(
        &mut self,
        source: &mut dyn FrameSource,
        progress: &mut dyn Progress,
    ) -> Result<EncodedVideo> {
        let hint = source
            .frame_count_hint()
            .and_then(|n| usize::try_from(n).ok());
        let total = match (hint, self.max_frames) {
            (Some(h), Some(m)) => Some(h.min(m)),
            (h, m) => h.or(m),
        };

        let mut sequence = FrameSequence::new(self.rows, self.cols, self.mode);
        let mut dims = (0u32, 0u32);

        while self.max_frames.is_none_or(|m| sequence.len() < m) {
            let Some(raw) = source
                .read_next()
                .with_context(|| format!("Lecture de {}", source.name()))?
            else {
                break;
            };
            let frame = pixel::normalize(&raw)
                .with_context(|| format!("Frame {} de {}", sequence.len(), source.name()))?;
            dims = (frame.width, frame.height);
            sequence.push(self.encode_frame(&frame))?;
            progress.update(sequence.len(), total);
        }
        progress.finish(sequence.len());

        if sequence.is_empty() {
            log::warn!("Aucune frame lue depuis {}", source.name());
        }
        log::info!(
            "Encodé {} frames {}x{} → grille {}x{} ({})",
            sequence.len(),
            dims.0,
            dims.1,
            self.rows,
            self.cols,
            self.mode
        );

        let metadata = VideoMetadata {
            name: source.name().to_string(),
            grid_rows: self.rows,
            grid_cols: self.cols,
            frame_width: dims.0,
            frame_height: dims.1,
            total_frames: Some(sequence.len()),
            fps: source.fps(),
            mode: Some(self.mode),
        };
        Ok(EncodedVideo { sequence, metadata })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gv_core::frame::GridCell;
    use gv_core::pixel::{ChannelOrder, RawFrame};
    use gv_core::progress::NoProgress;

    /// Source en mémoire pour les tests.
    struct MemorySource {
        frames: Vec<RawFrame>,
        released: bool,
    }

    impl FrameSource for MemorySource {
        fn name(&self) -> &str {
            "memory"
        }
        fn read_next(&mut self) -> Result<Option<RawFrame>> {
            if self.frames.is_empty() {
                Ok(None)
            } else {
                Ok(Some(self.frames.remove(0)))
            }
        }
        fn fps(&self) -> f64 {
            24.0
        }
        fn frame_count_hint(&self) -> Option<u64> {
            None
        }
        fn release(&mut self) {
            self.released = true;
        }
    }

    struct Counting(Vec<(usize, Option<usize>)>);

    impl Progress for Counting {
        fn update(&mut self, done: usize, total: Option<usize>) {
            self.0.push((done, total));
        }
        fn finish(&mut self, _done: usize) {}
    }

    fn bgr_frame(w: u32, h: u32, rgb: (u8, u8, u8)) -> RawFrame {
        let mut data = Vec::new();
        for _ in 0..w * h {
            data.extend_from_slice(&[rgb.2, rgb.1, rgb.0]);
        }
        RawFrame {
            data,
            width: w,
            height: h,
            order: ChannelOrder::Bgr,
        }
    }

    #[test]
    fn half_white_frame_splits_columns() {
        let mut frame = Frame::new(8, 4);
        frame.fill_rect(4, 0, 8, 4, (255, 255, 255));
        let mut enc = GridEncoder::new(2, 2, GridMode::Binary);
        let m = enc.encode_frame(&frame);
        assert_eq!(m.get(0, 0), Some(GridCell::Binary(0)));
        assert_eq!(m.get(0, 1), Some(GridCell::Binary(1)));
        assert_eq!(m.get(1, 1), Some(GridCell::Binary(1)));
    }

    #[test]
    fn color_mode_keeps_rgb() {
        let mut enc = GridEncoder::new(3, 3, GridMode::Color);
        let m = enc.encode_frame(&Frame::filled(9, 9, (12, 34, 56)));
        assert!(m.cells().iter().all(|c| *c == GridCell::Color((12, 34, 56))));
    }

    #[test]
    fn source_is_encoded_in_order_with_metadata() {
        let mut src = MemorySource {
            frames: vec![
                bgr_frame(10, 6, (0, 0, 0)),
                bgr_frame(10, 6, (255, 255, 255)),
                bgr_frame(10, 6, (255, 0, 0)),
            ],
            released: false,
        };
        let mut progress = Counting(Vec::new());
        let mut enc = GridEncoder::new(2, 5, GridMode::Color);
        let out = enc.encode_source(&mut src, &mut progress).unwrap();

        assert!(src.released);
        assert_eq!(out.sequence.len(), 3);
        // BGR source normalised to RGB
        assert_eq!(
            out.sequence.get(2).unwrap().get(0, 0),
            Some(GridCell::Color((255, 0, 0)))
        );
        assert_eq!(out.metadata.total_frames, Some(3));
        assert_eq!((out.metadata.frame_width, out.metadata.frame_height), (10, 6));
        assert_eq!((out.metadata.grid_rows, out.metadata.grid_cols), (2, 5));
        assert!((out.metadata.fps - 24.0).abs() < f64::EPSILON);
        assert_eq!(progress.0, vec![(1, None), (2, None), (3, None)]);
    }

    #[test]
    fn max_frames_stops_early() {
        let mut src = MemorySource {
            frames: (0..5).map(|_| bgr_frame(4, 4, (9, 9, 9))).collect(),
            released: false,
        };
        let mut enc = GridEncoder::new(1, 1, GridMode::Binary).with_max_frames(Some(2));
        let out = enc.encode_source(&mut src, &mut NoProgress).unwrap();
        assert_eq!(out.sequence.len(), 2);
        assert!(src.released);
    }

    #[test]
    fn empty_source_yields_empty_sequence() {
        let mut src = MemorySource {
            frames: Vec::new(),
            released: false,
        };
        let mut enc = GridEncoder::new(4, 4, GridMode::Binary);
        let out = enc.encode_source(&mut src, &mut NoProgress).unwrap();
        assert!(out.sequence.is_empty());
        assert_eq!(out.metadata.total_frames, Some(0));
        assert_eq!(out.metadata.frame_width, 0);
    }

    #[test]
    fn truncated_buffer_is_an_error() {
        let mut bad = bgr_frame(4, 4, (0, 0, 0));
        bad.data.truncate(5);
        let mut src = MemorySource {
            frames: vec![bad],
            released: false,
        };
        let mut enc = GridEncoder::new(2, 2, GridMode::Binary);
        assert!(enc.encode_source(&mut src, &mut NoProgress).is_err());
        assert!(src.released);
    }
}
