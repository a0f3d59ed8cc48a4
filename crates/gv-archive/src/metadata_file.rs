use std::path::Path;

use serde_json::{Map, Value};

use gv_core::error::GridError;
use gv_core::metadata::VideoMetadata;
use gv_core::reduce::GridMode;

/// Écrit les métadonnées en JSON indenté.
///
/// Independent of the archive write: a failure here leaves the archive as is.
///
/// # Errors
/// Returns [`GridError::Io`] if the file cannot be written.
pub fn store_metadata(path: &Path, metadata: &VideoMetadata) -> Result<(), GridError> {
    let text = serde_json::to_string_pretty(metadata).map_err(|e| GridError::Io {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    std::fs::write(path, text).map_err(|source| GridError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("Métadonnées écrites : {}", path.display());
    Ok(())
}

/// Lit et valide le fichier de métadonnées.
///
/// # Errors
/// Returns [`GridError::ConfigLoad`] if the file is missing, is not JSON,
/// or is not a JSON object. Individual bad fields are corrected instead.
pub fn load_metadata(path: &Path) -> Result<VideoMetadata, GridError> {
    let text = std::fs::read_to_string(path).map_err(|e| GridError::config(path, e))?;
    let value: Value = serde_json::from_str(&text).map_err(|e| GridError::config(path, e))?;
    let Value::Object(map) = value else {
        return Err(GridError::config(path, "expected a JSON object"));
    };
    let fallback_name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("video");
    Ok(validate(&map, fallback_name))
}

/// Apply the field-level defaults to a parsed metadata object.
///
/// - `fps` missing, non-numeric or ≤ 0 → 1
/// - `grid_rows` / `grid_cols` missing, non-integer or ≤ 0 → 1
/// - `total_frames` missing → `None` (caller uses the archive length)
/// - `frame_width` / `frame_height` invalid → 0
///
/// # Example
/// ```
/// use gv_archive::metadata_file::validate;
/// let map = serde_json::json!({ "fps": -5, "grid_rows": 0, "grid_cols": 80 });
/// let meta = validate(map.as_object().unwrap(), "clip");
/// assert_eq!(meta.fps, 1.0);
/// assert_eq!(meta.grid_rows, 1);
/// assert_eq!(meta.grid_cols, 80);
/// assert_eq!(meta.total_frames, None);
/// ```
#[must_use]
pub fn validate(map: &Map<String, Value>, fallback_name: &str) -> VideoMetadata {
    let name = match map.get("name") {
        Some(Value::String(s)) => s.clone(),
        _ => {
            log::warn!("Métadonnée 'name' absente, utilisation de '{fallback_name}'.");
            fallback_name.to_string()
        }
    };

    let fps = match map.get("fps").and_then(Value::as_f64) {
        Some(f) if f.is_finite() && f > 0.0 => f,
        _ => {
            log::warn!("FPS value is invalid or zero. Setting FPS to 1.");
            1.0
        }
    };

    let grid_dim = |key: &str| match map.get(key).and_then(Value::as_u64) {
        Some(n) if n > 0 => usize::try_from(n).unwrap_or(1),
        _ => {
            log::warn!("{key} is invalid or zero. Setting to 1.");
            1
        }
    };
    let grid_rows = grid_dim("grid_rows");
    let grid_cols = grid_dim("grid_cols");

    let pixel_dim = |key: &str| match map.get(key) {
        Some(v) => match v.as_u64().and_then(|n| u32::try_from(n).ok()) {
            Some(n) => n,
            None => {
                log::warn!("{key} invalide ({v}), ignoré.");
                0
            }
        },
        None => 0,
    };
    let frame_width = pixel_dim("frame_width");
    let frame_height = pixel_dim("frame_height");

    let total_frames = match map.get("total_frames") {
        None | Some(Value::Null) => None,
        Some(v) => match v.as_u64().and_then(|n| usize::try_from(n).ok()) {
            Some(n) => Some(n),
            None => {
                log::warn!("total_frames invalide ({v}), longueur de l'archive utilisée.");
                None
            }
        },
    };

    let mode = match map.get("mode") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => match s.parse::<GridMode>() {
            Ok(m) => Some(m),
            Err(e) => {
                log::warn!("{e}; déduit de l'archive.");
                None
            }
        },
        Some(v) => {
            log::warn!("mode invalide ({v}); déduit de l'archive.");
            None
        }
    };

    VideoMetadata {
        name,
        grid_rows,
        grid_cols,
        frame_width,
        frame_height,
        total_frames,
        fps,
        mode,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check(value: &Value) -> VideoMetadata {
        validate(value.as_object().unwrap(), "fallback")
    }

    #[test]
    fn store_then_load_keeps_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("videoConfig.json");
        let meta = VideoMetadata {
            name: "earth.mp4".into(),
            grid_rows: 60,
            grid_cols: 80,
            frame_width: 1280,
            frame_height: 720,
            total_frames: Some(42),
            fps: 29.97,
            mode: Some(GridMode::Binary),
        };
        store_metadata(&path, &meta).unwrap();
        assert_eq!(load_metadata(&path).unwrap(), meta);

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"grid_rows\": 60"));
        assert!(text.contains("\"mode\": \"binary\""));
    }

    #[test]
    fn invalid_values_fall_back() {
        let meta = check(&json!({
            "name": "clip",
            "fps": -5,
            "grid_rows": 0,
            "grid_cols": "eighty",
            "frame_width": -1,
            "frame_height": 480,
        }));
        assert!((meta.fps - 1.0).abs() < f64::EPSILON);
        assert_eq!(meta.grid_rows, 1);
        assert_eq!(meta.grid_cols, 1);
        assert_eq!(meta.frame_width, 0);
        assert_eq!(meta.frame_height, 480);
    }

    #[test]
    fn non_integer_grid_and_non_numeric_fps() {
        let meta = check(&json!({ "grid_rows": 2.5, "grid_cols": 4, "fps": "fast" }));
        assert_eq!((meta.grid_rows, meta.grid_cols), (1, 4));
        assert!((meta.fps - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn fractional_fps_is_kept() {
        let meta = check(&json!({ "fps": 23.976 }));
        assert!((meta.fps - 23.976).abs() < 1e-9);
    }

    #[test]
    fn missing_name_uses_fallback() {
        assert_eq!(check(&json!({})).name, "fallback");
    }

    #[test]
    fn total_frames_absent_or_bad_is_none() {
        assert_eq!(check(&json!({})).total_frames, None);
        assert_eq!(check(&json!({ "total_frames": -3 })).total_frames, None);
        assert_eq!(check(&json!({ "total_frames": 7 })).total_frames, Some(7));
    }

    #[test]
    fn unparseable_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("videoConfig.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            load_metadata(&path),
            Err(GridError::ConfigLoad { .. })
        ));
        std::fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(
            load_metadata(&path),
            Err(GridError::ConfigLoad { .. })
        ));
        assert!(matches!(
            load_metadata(&dir.path().join("absent.json")),
            Err(GridError::ConfigLoad { .. })
        ));
    }
}
