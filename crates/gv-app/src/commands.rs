use std::path::Path;

use anyhow::{Context, Result};

use gv_archive::{load_video, store_video};
use gv_core::config::GridConfig;
use gv_core::progress::{ConsoleProgress, NoProgress};
use gv_core::traits::Progress;
use gv_export::{export_json, transcode};
use gv_grid::encoder::GridEncoder;
use gv_render::{TerminalSink, run_playback};

/// Progression console, ou silencieuse avec `--quiet`.
fn progress(quiet: bool) -> Box<dyn Progress> {
    if quiet {
        Box::new(NoProgress)
    } else {
        Box::new(ConsoleProgress::stderr())
    }
}

/// Source → grille → archive + métadonnées.
///
/// # Errors
/// Returns an error if the source cannot be opened or decoded, or if
/// either output file cannot be written.
pub fn encode(input: &Path, config: &GridConfig, quiet: bool) -> Result<()> {
    let mut source = gv_source::open_source(input)?;
    let mut encoder = GridEncoder::from_config(config);
    let encoded = encoder.encode_source(source.as_mut(), progress(quiet).as_mut())?;

    store_video(
        &config.archive_path,
        &config.metadata_path,
        &encoded.sequence,
        &encoded.metadata,
    )
    .context("Écriture de l'archive")?;

    log::info!(
        "{} frames encodées → {} + {}",
        encoded.sequence.len(),
        config.archive_path.display(),
        config.metadata_path.display()
    );
    Ok(())
}

/// Lecture interactive dans le terminal.
///
/// # Errors
/// Returns an error if loading fails or the terminal cannot be driven.
pub fn play(config: &GridConfig) -> Result<()> {
    let video = load_video(&config.archive_path, &config.metadata_path)
        .context("Chargement de la vidéo")?;
    let mut sink = TerminalSink::new();
    run_playback(&video, &mut sink, config)
}

/// Archive → tableau JSON.
///
/// # Errors
/// Returns an error if loading or writing fails.
pub fn export(config: &GridConfig, output: &Path, quiet: bool) -> Result<()> {
    let n = export_json(
        &config.archive_path,
        &config.metadata_path,
        output,
        progress(quiet).as_mut(),
    )?;
    log::info!("{n} frames exportées → {}", output.display());
    Ok(())
}

/// Archive → MP4 reconstruit.
///
/// # Errors
/// Returns an error if loading fails or ffmpeg fails.
pub fn transcode_mp4(config: &GridConfig, output: &Path, quiet: bool) -> Result<()> {
    transcode(
        &config.archive_path,
        &config.metadata_path,
        output,
        config,
        progress(quiet).as_mut(),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gv_core::reduce::GridMode;

    fn config_in(dir: &Path) -> GridConfig {
        GridConfig {
            grid_rows: 4,
            grid_cols: 4,
            archive_path: dir.join("videoContent.gvz"),
            metadata_path: dir.join("videoConfig.json"),
            export_path: dir.join("output.json"),
            ..GridConfig::default()
        }
    }

    #[test]
    fn white_image_encodes_then_exports() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("white.png");
        image::RgbImage::from_pixel(16, 8, image::Rgb([255, 255, 255]))
            .save(&input)
            .unwrap();
        let config = config_in(dir.path());

        encode(&input, &config, true).unwrap();
        let video = load_video(&config.archive_path, &config.metadata_path).unwrap();
        assert_eq!(video.total_frames(), 1);
        assert_eq!(video.metadata.mode, Some(GridMode::Binary));
        assert_eq!((video.metadata.frame_width, video.metadata.frame_height), (16, 8));

        export(&config, &config.export_path, true).unwrap();
        let text = std::fs::read_to_string(&config.export_path).unwrap();
        assert_eq!(text, "[[[1,1,1,1],[1,1,1,1],[1,1,1,1],[1,1,1,1]]]");
    }

    #[test]
    fn missing_input_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        assert!(encode(&dir.path().join("absent.png"), &config, true).is_err());
        assert!(!config.archive_path.exists());
    }
}
