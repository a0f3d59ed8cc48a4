/// Archive codec for gridvid: compressed frame array + JSON metadata.
pub mod codec;
pub mod metadata_file;

use std::path::Path;

use gv_core::error::GridError;
use gv_core::frame::FrameSequence;
use gv_core::metadata::VideoMetadata;

pub use codec::{load_archive, store_archive};
pub use metadata_file::{load_metadata, store_metadata};

/// Archive et métadonnées rechargées puis réconciliées.
#[derive(Clone, Debug)]
pub struct LoadedVideo {
    pub sequence: FrameSequence,
    /// Grid shape and mode match `sequence`; `total_frames` is effective.
    pub metadata: VideoMetadata,
}

impl LoadedVideo {
    /// Effective frame count, never beyond the archive length.
    #[must_use]
    pub fn total_frames(&self) -> usize {
        self.metadata.effective_frames(self.sequence.len())
    }
}

/// Store both files. The writes are independent; the first error is
/// returned after both have been attempted.
///
/// # Errors
/// Returns [`GridError::Io`] if either file cannot be written.
pub fn store_video(
    archive_path: &Path,
    metadata_path: &Path,
    sequence: &FrameSequence,
    metadata: &VideoMetadata,
) -> Result<(), GridError> {
    let archive = store_archive(archive_path, sequence);
    let meta = store_metadata(metadata_path, metadata);
    archive.and(meta)
}

/// Charge métadonnées puis archive, et réconcilie les deux.
///
/// The archive is authoritative for the grid shape and mode; disagreeing
/// metadata values are replaced with a warning.
///
/// # Errors
/// [`GridError::ConfigLoad`] for the metadata file,
/// [`GridError::ArchiveLoad`] for the archive.
pub fn load_video(archive_path: &Path, metadata_path: &Path) -> Result<LoadedVideo, GridError> {
    let mut metadata = load_metadata(metadata_path)?;
    let sequence = load_archive(archive_path)?;
    reconcile(&mut metadata, &sequence);
    Ok(LoadedVideo { sequence, metadata })
}

fn reconcile(metadata: &mut VideoMetadata, sequence: &FrameSequence) {
    if (metadata.grid_rows, metadata.grid_cols) != (sequence.rows(), sequence.cols()) {
        log::warn!(
            "Grille déclarée {}x{} ≠ archive {}x{}, archive utilisée.",
            metadata.grid_rows,
            metadata.grid_cols,
            sequence.rows(),
            sequence.cols()
        );
        metadata.grid_rows = sequence.rows().max(1);
        metadata.grid_cols = sequence.cols().max(1);
    }
    if let Some(mode) = metadata.mode
        && mode != sequence.mode()
    {
        log::warn!(
            "Mode déclaré {mode} ≠ archive {}, archive utilisée.",
            sequence.mode()
        );
    }
    metadata.mode = Some(sequence.mode());

    let effective = metadata.effective_frames(sequence.len());
    match metadata.total_frames {
        Some(declared) if declared > sequence.len() => log::warn!(
            "total_frames={declared} mais l'archive n'en contient que {}.",
            sequence.len()
        ),
        None => log::info!("total_frames absent, {effective} frames d'après l'archive."),
        _ => {}
    }
    metadata.total_frames = Some(effective);
}

#[cfg(test)]
mod tests {
    use super::*;
    use gv_core::frame::GridMatrix;
    use gv_core::reduce::GridMode;

    fn sequence(n: usize) -> FrameSequence {
        let mut seq = FrameSequence::new(3, 4, GridMode::Binary);
        for _ in 0..n {
            seq.push(GridMatrix::new(3, 4, GridMode::Binary)).unwrap();
        }
        seq
    }

    #[test]
    fn absent_total_frames_uses_archive_length() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("a.gvz");
        let meta_path = dir.path().join("m.json");
        store_archive(&archive, &sequence(7)).unwrap();
        std::fs::write(&meta_path, r#"{"name":"x","grid_rows":3,"grid_cols":4,"fps":10}"#)
            .unwrap();

        let video = load_video(&archive, &meta_path).unwrap();
        assert_eq!(video.total_frames(), 7);
        assert_eq!(video.metadata.mode, Some(GridMode::Binary));
    }

    #[test]
    fn overstated_total_is_clamped_and_shape_follows_archive() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("a.gvz");
        let meta_path = dir.path().join("m.json");
        store_archive(&archive, &sequence(2)).unwrap();
        std::fs::write(
            &meta_path,
            r#"{"grid_rows":60,"grid_cols":0,"total_frames":50,"fps":0,"mode":"color"}"#,
        )
        .unwrap();

        let video = load_video(&archive, &meta_path).unwrap();
        assert_eq!(video.total_frames(), 2);
        assert_eq!((video.metadata.grid_rows, video.metadata.grid_cols), (3, 4));
        assert_eq!(video.metadata.mode, Some(GridMode::Binary));
        assert!((video.metadata.fps - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn store_video_writes_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("a.gvz");
        let meta_path = dir.path().join("m.json");
        let meta = VideoMetadata {
            name: "n".into(),
            grid_rows: 3,
            grid_cols: 4,
            total_frames: Some(1),
            fps: 25.0,
            ..VideoMetadata::default()
        };
        store_video(&archive, &meta_path, &sequence(1), &meta).unwrap();
        let video = load_video(&archive, &meta_path).unwrap();
        assert_eq!(video.sequence.len(), 1);
        assert_eq!(video.metadata.name, "n");
    }

    #[test]
    fn metadata_write_failure_keeps_archive() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("a.gvz");
        let meta_path = dir.path().join("missing_dir").join("m.json");
        let err = store_video(&archive, &meta_path, &sequence(1), &VideoMetadata::default());
        assert!(matches!(err, Err(GridError::Io { .. })));
        assert!(archive.exists());
    }

    #[test]
    fn missing_metadata_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("a.gvz");
        store_archive(&archive, &sequence(1)).unwrap();
        let err = load_video(&archive, &dir.path().join("none.json")).unwrap_err();
        assert!(matches!(err, GridError::ConfigLoad { .. }));
    }
}
