use std::time::Duration;

use anyhow::Result;

use gv_archive::LoadedVideo;
use gv_core::config::GridConfig;
use gv_core::frame::Frame;
use gv_core::pixel;
use gv_core::traits::{DisplaySink, Key};
use gv_grid::reconstruct::{Palette, reconstruct_into};

/// État de lecture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayState {
    Playing,
    Paused,
}

/// Signal de contrôle issu du clavier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Signal {
    Quit,
    TogglePlay,
    StepForward,
    StepBackward,
    SpeedUp,
    SpeedDown,
}

/// Résultat d'un tick de lecture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    Quit,
}

/// Clavier → signal : `q`/Esc quitter, espace play/pause, `d`/→ avancer,
/// `a`/← reculer, `+`/`=` accélérer, `-` ralentir.
///
/// # Example
/// ```
/// use gv_core::traits::Key;
/// use gv_render::playback::{signal_for_key, Signal};
/// assert_eq!(signal_for_key(Key::Char('=')), Some(Signal::SpeedUp));
/// assert_eq!(signal_for_key(Key::Char('z')), None);
/// ```
#[must_use]
pub fn signal_for_key(key: Key) -> Option<Signal> {
    match key {
        Key::Char('q') | Key::Esc => Some(Signal::Quit),
        Key::Char(' ') => Some(Signal::TogglePlay),
        Key::Char('d') | Key::Right => Some(Signal::StepForward),
        Key::Char('a') | Key::Left => Some(Signal::StepBackward),
        Key::Char('+' | '=') => Some(Signal::SpeedUp),
        Key::Char('-') => Some(Signal::SpeedDown),
        _ => None,
    }
}

/// Machine d'état de lecture : index courant, fps, Playing/Paused.
///
/// # Example
/// ```
/// use gv_render::playback::{Player, PlayState, Signal};
/// let mut p = Player::new(3, 24.0);
/// p.tick(None);
/// assert_eq!(p.index(), 1);
/// p.tick(Some(Signal::TogglePlay));
/// assert_eq!(p.state(), PlayState::Paused);
/// ```
#[derive(Clone, Debug)]
pub struct Player {
    state: PlayState,
    index: usize,
    fps: f64,
    max_fps: f64,
    total: usize,
}

impl Player {
    /// Starts Playing at frame 0. `fps` ≤ 0 or non-finite becomes 1.
    #[must_use]
    pub fn new(total: usize, fps: f64) -> Self {
        Self {
            state: PlayState::Playing,
            index: 0,
            fps: if fps.is_finite() && fps > 0.0 { fps } else { 1.0 },
            max_fps: 60.0,
            total,
        }
    }

    /// Upper bound of the speed-up control.
    #[must_use]
    pub fn with_max_fps(mut self, max_fps: f64) -> Self {
        self.max_fps = max_fps.max(1.0);
        self
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn state(&self) -> PlayState {
        self.state
    }

    #[must_use]
    pub fn fps(&self) -> f64 {
        self.fps
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Attente maximale pour un signal : `1000 / fps` ms.
    ///
    /// A vanishingly small fps saturates at `Duration::MAX` instead of
    /// overflowing.
    #[must_use]
    pub fn frame_delay(&self) -> Duration {
        Duration::try_from_secs_f64(1.0 / self.fps).unwrap_or(Duration::MAX)
    }

    /// Apply one transition. Without a signal, Playing advances and wraps.
    pub fn tick(&mut self, signal: Option<Signal>) -> TickOutcome {
        let last = self.total.saturating_sub(1);
        match signal {
            Some(Signal::Quit) => return TickOutcome::Quit,
            Some(Signal::TogglePlay) => {
                self.state = match self.state {
                    PlayState::Playing => PlayState::Paused,
                    PlayState::Paused => PlayState::Playing,
                };
            }
            Some(Signal::StepForward) => self.index = (self.index + 1).min(last),
            Some(Signal::StepBackward) => self.index = self.index.saturating_sub(1),
            Some(Signal::SpeedUp) => {
                self.fps = (self.fps + 1.0).min(self.max_fps);
                log::info!("FPS: {}", self.fps);
            }
            Some(Signal::SpeedDown) => {
                self.fps = (self.fps - 1.0).max(1.0);
                log::info!("FPS: {}", self.fps);
            }
            None => {
                if self.state == PlayState::Playing && self.total > 0 {
                    self.index = (self.index + 1) % self.total;
                }
            }
        }
        TickOutcome::Continue
    }

    /// Status line shown by sinks that support it.
    #[must_use]
    pub fn status(&self, name: &str) -> String {
        let state = match self.state {
            PlayState::Playing => "▶",
            PlayState::Paused => "⏸",
        };
        format!(
            "{state} {name}  {}/{}  {:.0} fps  [espace] pause  [a/d] pas  [+/-] vitesse  [q] quitter",
            self.index + 1,
            self.total,
            self.fps
        )
    }
}

/// Boucle de lecture : reconstruit, affiche, attend un signal, applique.
///
/// `destroy_all` runs on every exit path.
///
/// # Errors
/// Returns an error if the sink fails to create its window, draw, or poll.
pub fn run_playback(
    video: &LoadedVideo,
    sink: &mut dyn DisplaySink,
    config: &GridConfig,
) -> Result<()> {
    let total = video.total_frames();
    if total == 0 {
        log::warn!("Aucune frame à lire dans {}", video.metadata.name);
        return Ok(());
    }
    log::info!("Loaded {total} frames from {}", video.metadata.name);

    let result = playback_loop(video, total, sink, config);
    sink.destroy_all();
    result
}

fn playback_loop(
    video: &LoadedVideo,
    total: usize,
    sink: &mut dyn DisplaySink,
    config: &GridConfig,
) -> Result<()> {
    let meta = &video.metadata;
    let (width, height) = meta.display_size(config.cell_px);
    let palette = Palette::from_config(config);
    let mut player = Player::new(total, meta.fps).with_max_fps(config.max_fps);
    let mut frame = Frame::new(width, height);

    sink.create_window(&meta.name, width, height)?;

    loop {
        let Some(matrix) = video.sequence.get(player.index()) else {
            break;
        };
        reconstruct_into(matrix, meta.grid_rows, meta.grid_cols, &palette, &mut frame);
        let raw = pixel::denormalize(&frame, sink.channel_order());
        sink.set_status(&player.status(&meta.name));
        sink.show(&raw)?;

        let signal = sink.poll_key(player.frame_delay())?.and_then(signal_for_key);
        if player.tick(signal) == TickOutcome::Quit {
            break;
        }
    }
    Ok(())
}
