/// Playback and terminal rendering for gridvid.
///
/// Provides the playback state machine, the half-block canvas, and the
/// ratatui/crossterm display sink.
pub mod canvas;
pub mod playback;
pub mod terminal;

pub use playback::{PlayState, Player, Signal, run_playback, signal_for_key};
pub use terminal::TerminalSink;
