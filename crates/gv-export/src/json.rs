use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use gv_archive::{LoadedVideo, load_video};
use gv_core::frame::{GridCell, GridMatrix};
use gv_core::reduce::GridMode;
use gv_core::traits::Progress;

/// Une frame exportée : tableau imbriqué de lignes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum JsonFrame {
    /// `[[0, 1, ...], ...]`
    Binary(Vec<Vec<u8>>),
    /// `[[[r, g, b], ...], ...]`
    Color(Vec<Vec<[u8; 3]>>),
}

impl JsonFrame {
    /// Convertit une matrice, ligne par ligne.
    ///
    /// # Example
    /// ```
    /// use gv_core::frame::{GridCell, GridMatrix};
    /// use gv_core::reduce::GridMode;
    /// use gv_export::json::JsonFrame;
    ///
    /// let mut m = GridMatrix::new(2, 2, GridMode::Binary);
    /// m.set(1, 0, GridCell::Binary(1));
    /// assert_eq!(
    ///     serde_json::to_string(&JsonFrame::from_matrix(&m)).unwrap(),
    ///     "[[0,0],[1,0]]"
    /// );
    /// ```
    #[must_use]
    pub fn from_matrix(matrix: &GridMatrix) -> Self {
        match matrix.mode() {
            GridMode::Binary => Self::Binary(
                matrix
                    .rows_iter()
                    .map(|row| {
                        row.iter()
                            .map(|c| match *c {
                                GridCell::Binary(v) => v,
                                GridCell::Color(_) => 0,
                            })
                            .collect()
                    })
                    .collect(),
            ),
            GridMode::Color => Self::Color(
                matrix
                    .rows_iter()
                    .map(|row| {
                        row.iter()
                            .map(|c| match *c {
                                GridCell::Color((r, g, b)) => [r, g, b],
                                GridCell::Binary(0) => [0; 3],
                                GridCell::Binary(_) => [255; 3],
                            })
                            .collect()
                    })
                    .collect(),
            ),
        }
    }
}

/// Build the exported frames in order, reporting progress per frame.
pub fn collect_frames(video: &LoadedVideo, progress: &mut dyn Progress) -> Vec<JsonFrame> {
    let total = video.total_frames();
    let mut frames = Vec::with_capacity(total);
    for (i, matrix) in video.sequence.iter().take(total).enumerate() {
        frames.push(JsonFrame::from_matrix(matrix));
        progress.update(i + 1, Some(total));
    }
    progress.finish(frames.len());
    frames
}

/// Exporte archive + métadonnées en un seul tableau JSON.
///
/// The frame count is the metadata `total_frames` when present, else the
/// archive length, never beyond the archive length. Returns the number of
/// frames written.
///
/// # Errors
/// Returns an error if either input cannot be loaded or the output cannot
/// be written.
pub fn export_json(
    archive_path: &Path,
    metadata_path: &Path,
    output_path: &Path,
    progress: &mut dyn Progress,
) -> Result<usize> {
    let video = load_video(archive_path, metadata_path).context("Chargement de la vidéo")?;
    let frames = collect_frames(&video, progress);

    let file = File::create(output_path)
        .with_context(|| format!("Création de {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, &frames)
        .with_context(|| format!("Écriture JSON {}", output_path.display()))?;
    writer.flush()?;

    log::info!(
        "Export JSON : {} frames → {}",
        frames.len(),
        output_path.display()
    );
    Ok(frames.len())
}
