// Décodage via ffmpeg en subprocess (std::process::Command).
// Prérequis : `ffmpeg` et `ffprobe` accessibles dans PATH.
//
//   - `probe_video`       : interroge ffprobe (width/height/fps/nb_frames)
//   - `spawn_ffmpeg_pipe` : lance ffmpeg → flux raw RGBA sur stdout
//   - `VideoSource`       : lit une frame à la fois, synchrone

use anyhow::{Context, Result};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use gv_core::error::GridError;
use gv_core::pixel::{ChannelOrder, RawFrame};
use gv_core::traits::FrameSource;

/// Métadonnées extraites via ffprobe.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VideoInfo {
    pub width: u32,
    pub height: u32,
    /// Images par seconde (ex: 23.976, 24.0, 30.0, 60.0). 0.0 si inconnu.
    pub fps: f64,
    /// `nb_frames` du flux, absent pour beaucoup de conteneurs.
    pub frame_count: Option<u64>,
}

/// Interroge `ffprobe` pour obtenir les métadonnées du flux vidéo principal.
///
/// # Errors
/// Returns [`GridError::SourceOpen`] if `ffprobe` cannot be launched or the
/// file holds no decodable video stream.
pub fn probe_video(path: &Path) -> Result<VideoInfo, GridError> {
    if !path.exists() {
        return Err(GridError::source_open(path, "file not found"));
    }
    let path_str = path
        .to_str()
        .ok_or_else(|| GridError::source_open(path, "non UTF-8 path"))?;

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height,r_frame_rate,nb_frames",
            "-of",
            "default=noprint_wrappers=1",
            "-i",
            path_str,
        ])
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
        .map_err(|e| GridError::source_open(path, format!("cannot launch ffprobe: {e}")))?;

    let info = parse_probe_output(&String::from_utf8_lossy(&output.stdout));
    if info.width == 0 || info.height == 0 {
        return Err(GridError::source_open(path, "no video stream found"));
    }

    log::info!(
        "probe_video: {}x{} @ {:.3}fps ({:?} frames) : {}",
        info.width,
        info.height,
        info.fps,
        info.frame_count,
        path.display()
    );
    Ok(info)
}

/// Parse `key=value` lines printed by ffprobe.
///
/// # Example
/// ```
/// use gv_source::video::parse_probe_output;
/// let info = parse_probe_output("width=640\nheight=360\nr_frame_rate=30000/1001\nnb_frames=N/A\n");
/// assert_eq!((info.width, info.height), (640, 360));
/// assert!((info.fps - 29.97).abs() < 0.01);
/// assert_eq!(info.frame_count, None);
/// ```
#[must_use]
pub fn parse_probe_output(text: &str) -> VideoInfo {
    let mut info = VideoInfo {
        width: 0,
        height: 0,
        fps: 0.0,
        frame_count: None,
    };

    for line in text.lines() {
        if let Some(val) = line.strip_prefix("width=") {
            info.width = val.trim().parse().unwrap_or(0);
        } else if let Some(val) = line.strip_prefix("height=") {
            info.height = val.trim().parse().unwrap_or(0);
        } else if let Some(val) = line.strip_prefix("r_frame_rate=") {
            // Format: "24/1" ou "30000/1001"
            let mut parts = val.trim().splitn(2, '/');
            let num: f64 = parts.next().and_then(|s| s.parse().ok()).unwrap_or(0.0);
            let den: f64 = parts.next().and_then(|s| s.parse().ok()).unwrap_or(1.0);
            if den > 0.0 {
                info.fps = num / den;
            }
        } else if let Some(val) = line.strip_prefix("nb_frames=") {
            info.frame_count = val.trim().parse().ok();
        }
    }
    info
}

/// Lance un processus `ffmpeg` qui écrit des frames RGBA brutes sur stdout.
///
/// Chaque frame = `w × h × 4` bytes (RGBA row-major, sans padding), à la
/// taille native du flux.
///
/// # Errors
/// Returns an error if ffmpeg cannot be spawned.
pub fn spawn_ffmpeg_pipe(path: &Path) -> Result<Child> {
    let path_str = path.to_str().context("Chemin vidéo invalide (non-UTF8)")?;

    let child = Command::new("ffmpeg")
        .args([
            "-i",
            path_str,
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-an",
            "-hide_banner",
            "-loglevel",
            "error",
            "pipe:1",
        ])
        .stdout(Stdio::piped())
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .context("Impossible de lancer ffmpeg. Vérifiez qu'il est installé et dans le PATH.")?;
    log::debug!("ffmpeg spawné pour {}", path.display());
    Ok(child)
}

/// Lit exactement `buf.len()` bytes depuis `reader`.
///
/// # Errors
/// Retourne `Ok(true)` si lu avec succès, `Ok(false)` sur EOF avant complétion,
/// `Err` sur erreur I/O fatale.
pub fn read_exact_or_eof<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<bool> {
    let mut total = 0usize;
    while total < buf.len() {
        match reader.read(&mut buf[total..]) {
            Ok(0) => return Ok(false),
            Ok(n) => total += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(true)
}

/// Source vidéo : un processus ffmpeg, une frame RGBA par `read_next`.
pub struct VideoSource {
    path: PathBuf,
    name: String,
    info: VideoInfo,
    child: Option<Child>,
}

impl VideoSource {
    /// Probe and start decoding `path`.
    ///
    /// # Errors
    /// Returns [`GridError::SourceOpen`] if the file cannot be probed or the
    /// decoder cannot be started.
    pub fn open(path: &Path) -> Result<Self, GridError> {
        let info = probe_video(path)?;
        let child =
            spawn_ffmpeg_pipe(path).map_err(|e| GridError::source_open(path, format!("{e:#}")))?;
        Ok(Self {
            path: path.to_path_buf(),
            name: path.display().to_string(),
            info,
            child: Some(child),
        })
    }

    #[must_use]
    pub fn info(&self) -> VideoInfo {
        self.info
    }
}

impl FrameSource for VideoSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_next(&mut self) -> Result<Option<RawFrame>> {
        let Some(stdout) = self.child.as_mut().and_then(|c| c.stdout.as_mut()) else {
            return Ok(None);
        };
        let frame_bytes = self.info.width as usize * self.info.height as usize * 4;
        let mut data = vec![0u8; frame_bytes];
        let complete = read_exact_or_eof(stdout, &mut data)
            .with_context(|| format!("Erreur lecture pipe ffmpeg ({})", self.path.display()))?;
        if !complete {
            log::info!("VideoSource: EOF sur {}", self.path.display());
            self.release();
            return Ok(None);
        }
        Ok(Some(RawFrame {
            data,
            width: self.info.width,
            height: self.info.height,
            order: ChannelOrder::Rgba,
        }))
    }

    fn fps(&self) -> f64 {
        self.info.fps
    }

    fn frame_count_hint(&self) -> Option<u64> {
        self.info.frame_count
    }

    fn release(&mut self) {
        if let Some(mut c) = self.child.take() {
            let _ = c.kill();
            let _ = c.wait();
        }
    }
}

impl Drop for VideoSource {
    fn drop(&mut self) {
        self.release();
    }
}
