use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::frame::Rgb;
use crate::reduce::GridMode;

/// Configuration complète, passée explicitement à chaque composant.
///
/// Sérialisable en TOML. Chaque champ a une valeur par défaut saine.
///
/// # Example
/// ```
/// use gv_core::config::GridConfig;
/// let config = GridConfig::default();
/// assert_eq!(config.grid_rows, 60);
/// assert_eq!(config.grid_cols, 80);
/// ```
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct GridConfig {
    // === Grille ===
    pub grid_rows: usize,
    pub grid_cols: usize,
    /// Binary (luminance threshold) or Color.
    pub mode: GridMode,
    /// Stop encoding after this many frames. `None` = whole video.
    pub max_frames: Option<usize>,

    // === Fichiers ===
    pub archive_path: PathBuf,
    pub metadata_path: PathBuf,
    pub export_path: PathBuf,

    // === Lecture ===
    /// Pixels par cellule quand la métadonnée n'a pas de taille de frame.
    pub cell_px: u32,
    /// Upper bound of the speed-up control.
    pub max_fps: f64,
    /// Couleur des cellules binaires à 0.
    pub off_color: Rgb,
    /// Couleur des cellules binaires à 1.
    pub on_color: Rgb,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            grid_rows: 60,
            grid_cols: 80,
            mode: GridMode::Binary,
            max_frames: None,
            archive_path: PathBuf::from("videoContent.gvz"),
            metadata_path: PathBuf::from("videoConfig.json"),
            export_path: PathBuf::from("output.json"),
            cell_px: 8,
            max_fps: 60.0,
            off_color: (0, 0, 0),
            on_color: (255, 255, 255),
        }
    }
}

impl GridConfig {
    /// Clamp all numeric fields to their valid ranges.
    /// Called after TOML deserialization to prevent out-of-range values.
    pub fn clamp_all(&mut self) {
        self.grid_rows = self.grid_rows.clamp(1, 4096);
        self.grid_cols = self.grid_cols.clamp(1, 4096);
        self.cell_px = self.cell_px.clamp(1, 64);
        if !self.max_fps.is_finite() {
            self.max_fps = 60.0;
        }
        self.max_fps = self.max_fps.clamp(1.0, 240.0);
    }
}

/// Structure TOML intermédiaire pour désérialisation avec valeurs optionnelles.
#[derive(Deserialize)]
struct ConfigFile {
    grid: Option<GridSection>,
    files: Option<FilesSection>,
    playback: Option<PlaybackSection>,
}

#[derive(Deserialize)]
struct GridSection {
    rows: Option<usize>,
    cols: Option<usize>,
    mode: Option<GridMode>,
    max_frames: Option<usize>,
}

#[derive(Deserialize)]
struct FilesSection {
    archive: Option<PathBuf>,
    metadata: Option<PathBuf>,
    export: Option<PathBuf>,
}

#[derive(Deserialize)]
struct PlaybackSection {
    cell_px: Option<u32>,
    max_fps: Option<f64>,
    off_color: Option<[u8; 3]>,
    on_color: Option<[u8; 3]>,
}

/// Charge un fichier TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
/// ```no_run
/// use gv_core::config::load_config;
/// use std::path::Path;
/// let config = load_config(Path::new("gridvid.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<GridConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Erreur de parsing TOML dans {}", path.display()))
}

/// Parse TOML text over the defaults.
///
/// # Errors
/// Returns an error if `content` is not valid TOML for this layout.
pub fn parse_config(content: &str) -> Result<GridConfig> {
    let file: ConfigFile = toml::from_str(content)?;
    let mut config = GridConfig::default();

    if let Some(g) = file.grid {
        if let Some(v) = g.rows {
            config.grid_rows = v;
        }
        if let Some(v) = g.cols {
            config.grid_cols = v;
        }
        if let Some(v) = g.mode {
            config.mode = v;
        }
        if g.max_frames.is_some() {
            config.max_frames = g.max_frames;
        }
    }

    if let Some(f) = file.files {
        if let Some(v) = f.archive {
            config.archive_path = v;
        }
        if let Some(v) = f.metadata {
            config.metadata_path = v;
        }
        if let Some(v) = f.export {
            config.export_path = v;
        }
    }

    if let Some(p) = file.playback {
        if let Some(v) = p.cell_px {
            config.cell_px = v;
        }
        if let Some(v) = p.max_fps {
            config.max_fps = v;
        }
        if let Some([r, g, b]) = p.off_color {
            config.off_color = (r, g, b);
        }
        if let Some([r, g, b]) = p.on_color {
            config.on_color = (r, g, b);
        }
    }

    config.clamp_all();
    Ok(config)
}

/// Load `path` if it exists, defaults otherwise.
///
/// # Errors
/// Returns an error only if the file exists but cannot be parsed.
pub fn load_or_default(path: &Path) -> Result<GridConfig> {
    if path.exists() {
        load_config(path)
    } else {
        log::warn!(
            "Config introuvable : {}. Utilisation des défauts.",
            path.display()
        );
        Ok(GridConfig::default())
    }
}
