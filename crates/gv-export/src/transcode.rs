use std::path::Path;

use anyhow::{Context, Result};

use gv_archive::{LoadedVideo, load_video};
use gv_core::config::GridConfig;
use gv_core::frame::Frame;
use gv_core::traits::Progress;
use gv_grid::reconstruct::{Palette, reconstruct_into};

use crate::muxer::Mp4Muxer;

/// Taille de sortie : dimensions d'origine, sinon grille × `cell_px`.
///
/// libx264 wants even dimensions; odd sizes are rounded up and the extra
/// row or column is left black by [`reconstruct_all`].
#[must_use]
pub fn output_size(video: &LoadedVideo, cell_px: u32) -> (u32, u32) {
    let (w, h) = video.metadata.display_size(cell_px);
    (w.max(2).next_multiple_of(2), h.max(2).next_multiple_of(2))
}

/// Copie `src` dans le coin haut-gauche de `dst`, le reste en noir.
fn pad_into(src: &Frame, dst: &mut Frame) {
    dst.clear();
    let src_row = src.width as usize * 3;
    let dst_row = dst.width as usize * 3;
    let copy = src_row.min(dst_row);
    for (s, d) in src
        .data
        .chunks_exact(src_row)
        .zip(dst.data.chunks_exact_mut(dst_row))
    {
        d[..copy].copy_from_slice(&s[..copy]);
    }
}

/// Reconstruit chaque frame d'une vidéo chargée et la pousse dans `sink`.
///
/// Cells are laid out over the display size; the frame handed to `sink`
/// is that image padded to [`output_size`].
///
/// Returns the number of frames produced.
///
/// # Errors
/// Propagates the first error returned by `sink`.
pub fn reconstruct_all<F>(
    video: &LoadedVideo,
    config: &GridConfig,
    progress: &mut dyn Progress,
    mut sink: F,
) -> Result<usize>
where
    F: FnMut(&Frame) -> Result<()>,
{
    let total = video.total_frames();
    let meta = &video.metadata;
    let (width, height) = meta.display_size(config.cell_px);
    let (out_w, out_h) = output_size(video, config.cell_px);
    let palette = Palette::from_config(config);
    let mut frame = Frame::new(width, height);
    let mut padded = Frame::new(out_w, out_h);

    let mut done = 0;
    for matrix in video.sequence.iter().take(total) {
        reconstruct_into(matrix, meta.grid_rows, meta.grid_cols, &palette, &mut frame);
        if (width, height) == (out_w, out_h) {
            sink(&frame)?;
        } else {
            pad_into(&frame, &mut padded);
            sink(&padded)?;
        }
        done += 1;
        progress.update(done, Some(total));
    }
    progress.finish(done);
    Ok(done)
}

/// Archive + métadonnées → MP4 reconstruit, au fps des métadonnées.
///
/// # Errors
/// Returns an error if loading fails, ffmpeg cannot be started, or the
/// encoder reports a failure.
pub fn transcode(
    archive_path: &Path,
    metadata_path: &Path,
    output_path: &Path,
    config: &GridConfig,
    progress: &mut dyn Progress,
) -> Result<usize> {
    let video = load_video(archive_path, metadata_path).context("Chargement de la vidéo")?;
    if video.total_frames() == 0 {
        anyhow::bail!("aucune frame à transcoder dans {}", archive_path.display());
    }

    let (width, height) = output_size(&video, config.cell_px);
    let mut muxer = Mp4Muxer::new(output_path, width, height, video.metadata.fps)?;
    reconstruct_all(&video, config, progress, |frame| muxer.write_frame(frame))?;
    let written = muxer.finish()?;

    log::info!("Transcodage : {written} frames → {}", output_path.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gv_core::frame::{FrameSequence, GridCell, GridMatrix};
    use gv_core::metadata::VideoMetadata;
    use gv_core::progress::NoProgress;
    use gv_core::reduce::GridMode;

    fn video(n: usize, total: Option<usize>) -> LoadedVideo {
        let mut seq = FrameSequence::new(2, 2, GridMode::Binary);
        for _ in 0..n {
            let mut m = GridMatrix::new(2, 2, GridMode::Binary);
            m.set(0, 0, GridCell::Binary(1));
            seq.push(m).unwrap();
        }
        LoadedVideo {
            sequence: seq,
            metadata: VideoMetadata {
                grid_rows: 2,
                grid_cols: 2,
                frame_width: 5,
                frame_height: 4,
                total_frames: total,
                fps: 12.0,
                ..VideoMetadata::default()
            },
        }
    }

    #[test]
    fn odd_sizes_are_rounded_up() {
        assert_eq!(output_size(&video(1, None), 8), (6, 4));
    }

    #[test]
    fn cells_follow_display_size_and_padding_is_black() {
        // 5 px over 2 cols → 2-px cells, column 4 is the remainder
        let mut v = video(1, None);
        let mut m = GridMatrix::new(2, 2, GridMode::Binary);
        m.set(0, 1, GridCell::Binary(1));
        v.sequence = FrameSequence::new(2, 2, GridMode::Binary);
        v.sequence.push(m).unwrap();

        let mut frames = Vec::new();
        reconstruct_all(&v, &GridConfig::default(), &mut NoProgress, |f| {
            frames.push(f.clone());
            Ok(())
        })
        .unwrap();
        let f = &frames[0];
        assert_eq!((f.width, f.height), (6, 4));
        assert_eq!(f.pixel(1, 0), (0, 0, 0));
        assert_eq!(f.pixel(2, 0), (255, 255, 255));
        assert_eq!(f.pixel(3, 1), (255, 255, 255));
        assert_eq!(f.pixel(4, 0), (0, 0, 0));
        assert_eq!(f.pixel(5, 0), (0, 0, 0));
    }

    #[test]
    fn padding_keeps_rows_aligned() {
        let mut src = Frame::new(3, 2);
        src.set_pixel(2, 1, (9, 8, 7));
        let mut dst = Frame::new(4, 2);
        dst.set_pixel(3, 0, (1, 1, 1));
        pad_into(&src, &mut dst);
        assert_eq!(dst.pixel(2, 1), (9, 8, 7));
        assert_eq!(dst.pixel(3, 0), (0, 0, 0));
        assert_eq!(dst.pixel(3, 1), (0, 0, 0));
    }

    #[test]
    fn every_effective_frame_reaches_the_sink() {
        let v = video(4, Some(3));
        let mut seen = Vec::new();
        let n = reconstruct_all(&v, &GridConfig::default(), &mut NoProgress, |f| {
            seen.push(f.pixel(0, 0));
            Ok(())
        })
        .unwrap();
        assert_eq!(n, 3);
        assert_eq!(seen, vec![(255, 255, 255); 3]);
    }

    #[test]
    fn sink_errors_stop_the_loop() {
        let v = video(4, None);
        let mut calls = 0;
        let res = reconstruct_all(&v, &GridConfig::default(), &mut NoProgress, |_| {
            calls += 1;
            anyhow::bail!("pipe closed")
        });
        assert!(res.is_err());
        assert_eq!(calls, 1);
    }
}
