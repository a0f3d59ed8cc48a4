use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::DefaultTerminal;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::Paragraph;

use gv_core::pixel::{self, ChannelOrder, RawFrame};
use gv_core::traits::{DisplaySink, Key};

use crate::canvas;

/// Sink d'affichage terminal : demi-blocs + ligne d'état.
///
/// The terminal is put into raw/alternate-screen mode by `create_window`
/// and restored by `destroy_all`.
#[derive(Default)]
pub struct TerminalSink {
    terminal: Option<DefaultTerminal>,
    title: String,
    status: String,
}

impl TerminalSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// crossterm → [`Key`]. Releases and repeats are ignored.
fn map_event(event: &Event) -> Option<Key> {
    let Event::Key(KeyEvent {
        code,
        kind: KeyEventKind::Press,
        ..
    }) = *event
    else {
        return None;
    };
    match code {
        KeyCode::Char(c) => Some(Key::Char(c)),
        KeyCode::Esc => Some(Key::Esc),
        KeyCode::Left => Some(Key::Left),
        KeyCode::Right => Some(Key::Right),
        KeyCode::Up => Some(Key::Up),
        KeyCode::Down => Some(Key::Down),
        _ => None,
    }
}

/// Longest single `event::poll` wait.
const MAX_POLL_SLICE: Duration = Duration::from_secs(1);

/// Wait for the next `event::poll` call, never past `deadline`.
fn poll_slice(deadline: Option<Instant>, now: Instant) -> Duration {
    deadline
        .map_or(MAX_POLL_SLICE, |d| d.saturating_duration_since(now))
        .min(MAX_POLL_SLICE)
}

impl DisplaySink for TerminalSink {
    fn channel_order(&self) -> ChannelOrder {
        ChannelOrder::Rgb
    }

    fn create_window(&mut self, name: &str, width: u32, height: u32) -> Result<()> {
        if self.terminal.is_none() {
            let terminal = ratatui::try_init().context("terminal init failed")?;
            self.terminal = Some(terminal);
        }
        self.title = name.to_string();
        log::info!("Fenêtre '{name}' ({width}x{height})");
        Ok(())
    }

    fn show(&mut self, frame: &RawFrame) -> Result<()> {
        let Some(terminal) = self.terminal.as_mut() else {
            anyhow::bail!("show() called before create_window()");
        };
        let frame = pixel::normalize(frame)?;
        let status = if self.status.is_empty() {
            self.title.as_str()
        } else {
            self.status.as_str()
        };
        terminal.draw(|f| {
            let [canvas_area, status_area] =
                Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(f.area());
            canvas::render_frame(f.buffer_mut(), canvas_area, &frame);
            f.render_widget(
                Paragraph::new(Line::from(status)).style(Style::default().fg(Color::DarkGray)),
                status_area,
            );
        })?;
        Ok(())
    }

    fn poll_key(&mut self, timeout: Duration) -> Result<Option<Key>> {
        // `None`: the deadline is past `Instant`'s range, wait indefinitely.
        let deadline = Instant::now().checked_add(timeout);
        loop {
            let remaining = poll_slice(deadline, Instant::now());
            if event::poll(remaining)? {
                // Resize and mouse events do not end the wait.
                if let Some(key) = map_event(&event::read()?) {
                    return Ok(Some(key));
                }
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                return Ok(None);
            }
        }
    }

    fn set_status(&mut self, status: &str) {
        status.clone_into(&mut self.status);
    }

    fn destroy_all(&mut self) {
        if self.terminal.take().is_some() {
            ratatui::restore();
        }
    }
}

impl Drop for TerminalSink {
    fn drop(&mut self) {
        self.destroy_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventState, KeyModifiers};

    fn key(code: KeyCode, kind: KeyEventKind) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        })
    }

    #[test]
    fn presses_are_mapped() {
        assert_eq!(
            map_event(&key(KeyCode::Char('q'), KeyEventKind::Press)),
            Some(Key::Char('q'))
        );
        assert_eq!(
            map_event(&key(KeyCode::Left, KeyEventKind::Press)),
            Some(Key::Left)
        );
        assert_eq!(map_event(&key(KeyCode::Esc, KeyEventKind::Press)), Some(Key::Esc));
    }

    #[test]
    fn releases_and_other_events_are_ignored() {
        assert_eq!(map_event(&key(KeyCode::Char('q'), KeyEventKind::Release)), None);
        assert_eq!(map_event(&key(KeyCode::Enter, KeyEventKind::Press)), None);
        assert_eq!(map_event(&Event::Resize(80, 24)), None);
    }

    #[test]
    fn poll_slices_are_bounded() {
        let now = Instant::now();
        assert_eq!(poll_slice(None, now), MAX_POLL_SLICE);
        assert_eq!(
            poll_slice(Some(now + Duration::from_millis(40)), now),
            Duration::from_millis(40)
        );
        assert_eq!(poll_slice(Some(now + Duration::from_secs(90)), now), MAX_POLL_SLICE);
        assert_eq!(poll_slice(Some(now), now + Duration::from_secs(1)), Duration::ZERO);
        assert!(now.checked_add(Duration::MAX).is_none());
    }

    #[test]
    fn show_before_window_fails() {
        let mut sink = TerminalSink::new();
        let frame = RawFrame {
            data: vec![0; 3],
            width: 1,
            height: 1,
            order: ChannelOrder::Rgb,
        };
        assert!(sink.show(&frame).is_err());
    }
}
