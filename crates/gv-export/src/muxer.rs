use anyhow::{Context, Result};
use gv_core::frame::Frame;
use std::io::Write;
use std::path::Path;
use std::process::{Child, Command, Stdio};

/// Encode des frames RGB24 brutes dans un fichier MP4 avec ffmpeg.
pub struct Mp4Muxer {
    ffmpeg_child: Child,
    width: u32,
    height: u32,
    frames: usize,
}

/// Arguments ffmpeg : rawvideo rgb24 sur stdin → x264 RGB sans perte.
fn ffmpeg_args(output: &str, width: u32, height: u32, fps: f64) -> Vec<String> {
    [
        "-y",
        "-f",
        "rawvideo",
        "-vcodec",
        "rawvideo",
        "-s",
        &format!("{width}x{height}"),
        "-pix_fmt",
        "rgb24",
        "-r",
        &format!("{fps}"),
        "-i",
        "-",
        "-c:v",
        "libx264rgb",
        "-crf",
        "0",
        "-preset",
        "veryslow",
        "-pix_fmt",
        "rgb24",
        "-color_range",
        "pc",
        "-hide_banner",
        "-loglevel",
        "error",
        output,
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
}

impl Mp4Muxer {
    /// Démarre ffmpeg, prêt à recevoir `width × height` RGB24 à `fps`.
    ///
    /// # Errors
    /// Retourne une erreur si ffmpeg n'est pas installé ou impossible à démarrer.
    pub fn new(output_path: &Path, width: u32, height: u32, fps: f64) -> Result<Self> {
        let path_str = output_path.to_str().context("Chemin invalide")?;

        let child = Command::new("ffmpeg")
            .args(ffmpeg_args(path_str, width, height, fps))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .context("Échec du démarrage de l'encodeur ffmpeg. (Est-il dans PATH ?)")?;

        log::info!(
            "Muxer ffmpeg : {width}x{height} @ {fps} fps → {}",
            output_path.display()
        );
        Ok(Self {
            ffmpeg_child: child,
            width,
            height,
            frames: 0,
        })
    }

    /// Pousse une frame dans le flux.
    ///
    /// # Errors
    /// Returns an error if the frame size differs from the muxer's or the
    /// pipe write fails.
    pub fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        if (frame.width, frame.height) != (self.width, self.height) {
            anyhow::bail!(
                "frame {}x{} ≠ flux {}x{}",
                frame.width,
                frame.height,
                self.width,
                self.height
            );
        }
        let stdin = self
            .ffmpeg_child
            .stdin
            .as_mut()
            .context("ffmpeg stdin fermé")?;
        stdin
            .write_all(&frame.data)
            .context("Écriture dans le pipe ffmpeg")?;
        self.frames += 1;
        Ok(())
    }

    /// Ferme le flux et finalise l'exportation. Returns the frame count.
    ///
    /// # Errors
    /// Retourne une erreur si ffmpeg signale une erreur de terminaison.
    pub fn finish(mut self) -> Result<usize> {
        drop(self.ffmpeg_child.stdin.take());

        let output = self.ffmpeg_child.wait_with_output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("ffmpeg encoder error: {stderr}");
        }
        Ok(self.frames)
    }
}
