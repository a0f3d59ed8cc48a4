use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use gv_core::config::GridConfig;
use gv_core::reduce::GridMode;

/// gridvid — vidéo → grille de cellules, lecture et export.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Fichier de configuration TOML. Absent → valeurs par défaut.
    #[arg(short, long, default_value = "gridvid.toml", global = true)]
    pub config: PathBuf,

    /// Niveau de log : error, warn, info, debug, trace.
    #[arg(long, default_value = "warn", global = true)]
    pub log_level: String,

    /// Pas d'indicateur de progression sur stderr.
    #[arg(long, default_value_t = false, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encode une vidéo (ou une image) en archive + métadonnées.
    Encode(EncodeArgs),
    /// Lit une archive dans le terminal.
    Play(FilesArgs),
    /// Exporte une archive en un tableau JSON.
    Export(ExportArgs),
    /// Reconstruit une archive en MP4 (ffmpeg requis).
    Transcode(TranscodeArgs),
}

/// Archive and metadata locations, overriding the config.
#[derive(Args, Debug, Default)]
pub struct FilesArgs {
    /// Archive de frames.
    #[arg(long)]
    pub archive: Option<PathBuf>,

    /// Fichier de métadonnées JSON.
    #[arg(long)]
    pub metadata: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Vidéo ou image source.
    pub input: PathBuf,

    /// Lignes de la grille.
    #[arg(long)]
    pub rows: Option<usize>,

    /// Colonnes de la grille.
    #[arg(long)]
    pub cols: Option<usize>,

    /// binary ou color.
    #[arg(long)]
    pub mode: Option<GridMode>,

    /// Nombre maximal de frames à encoder.
    #[arg(long)]
    pub max_frames: Option<usize>,

    #[command(flatten)]
    pub files: FilesArgs,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    #[command(flatten)]
    pub files: FilesArgs,

    /// Fichier JSON de sortie.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct TranscodeArgs {
    #[command(flatten)]
    pub files: FilesArgs,

    /// Fichier MP4 de sortie.
    #[arg(short, long, default_value = "reconstructed.mp4")]
    pub output: PathBuf,
}

impl FilesArgs {
    /// Apply the path overrides onto `config`.
    pub fn apply(&self, config: &mut GridConfig) {
        if let Some(ref p) = self.archive {
            config.archive_path.clone_from(p);
        }
        if let Some(ref p) = self.metadata {
            config.metadata_path.clone_from(p);
        }
    }
}

impl EncodeArgs {
    /// Apply the grid overrides onto `config`, then re-clamp.
    pub fn apply(&self, config: &mut GridConfig) {
        if let Some(r) = self.rows {
            config.grid_rows = r;
        }
        if let Some(c) = self.cols {
            config.grid_cols = c;
        }
        if let Some(m) = self.mode {
            config.mode = m;
        }
        if self.max_frames.is_some() {
            config.max_frames = self.max_frames;
        }
        self.files.apply(config);
        config.clamp_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_flags_override_config() {
        let cli = Cli::parse_from([
            "gridvid", "encode", "earth.mp4", "--rows", "30", "--mode", "color", "--archive",
            "a.gvz",
        ]);
        let Command::Encode(args) = cli.command else {
            panic!("expected encode");
        };
        let mut config = GridConfig::default();
        args.apply(&mut config);
        assert_eq!(config.grid_rows, 30);
        assert_eq!(config.grid_cols, 80);
        assert_eq!(config.mode, GridMode::Color);
        assert_eq!(config.archive_path, PathBuf::from("a.gvz"));
        assert_eq!(config.metadata_path, PathBuf::from("videoConfig.json"));
    }

    #[test]
    fn zero_rows_are_clamped() {
        let cli = Cli::parse_from(["gridvid", "encode", "x.png", "--rows", "0"]);
        let Command::Encode(args) = cli.command else {
            panic!("expected encode");
        };
        let mut config = GridConfig::default();
        args.apply(&mut config);
        assert_eq!(config.grid_rows, 1);
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["gridvid", "play", "--log-level", "info", "-c", "x.toml"]);
        assert_eq!(cli.log_level, "info");
        assert_eq!(cli.config, PathBuf::from("x.toml"));
        assert!(matches!(cli.command, Command::Play(_)));
    }

    #[test]
    fn bad_mode_is_rejected() {
        assert!(Cli::try_parse_from(["gridvid", "encode", "x.png", "--mode", "sepia"]).is_err());
    }
}
