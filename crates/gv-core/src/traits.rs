use std::time::Duration;

use anyhow::Result;

use crate::pixel::{ChannelOrder, RawFrame};

/// Fournit des frames décodées au pipeline d'encodage.
///
/// Implémenté par : `VideoSource`, `ImageSource`.
/// Opening is the implementor's constructor; it fails with
/// `GridError::SourceOpen`.
///
/// # Example
/// ```
/// use gv_core::traits::FrameSource;
/// use gv_core::pixel::RawFrame;
///
/// struct Empty;
/// impl FrameSource for Empty {
///     fn name(&self) -> &str { "empty" }
///     fn read_next(&mut self) -> anyhow::Result<Option<RawFrame>> { Ok(None) }
///     fn fps(&self) -> f64 { 25.0 }
///     fn frame_count_hint(&self) -> Option<u64> { Some(0) }
///     fn release(&mut self) {}
/// }
/// ```
pub trait FrameSource {
    /// Identifiant de la source, recopié dans les métadonnées.
    fn name(&self) -> &str;

    /// Prochaine frame, `Ok(None)` en fin de flux.
    ///
    /// # Errors
    /// Returns an error on a decoder failure mid-stream.
    fn read_next(&mut self) -> Result<Option<RawFrame>>;

    /// Images par seconde déclarées par la source.
    fn fps(&self) -> f64;

    /// Frame count announced by the container, if any.
    fn frame_count_hint(&self) -> Option<u64>;

    /// Libère le décodeur. Idempotent.
    fn release(&mut self);
}

/// Touche lue par un sink d'affichage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Esc,
    Left,
    Right,
    Up,
    Down,
}

/// Surface d'affichage pilotée par la boucle de lecture.
///
/// # Example
/// ```
/// use gv_core::traits::{DisplaySink, Key};
/// use gv_core::pixel::{ChannelOrder, RawFrame};
/// use std::time::Duration;
///
/// struct Null;
/// impl DisplaySink for Null {
///     fn channel_order(&self) -> ChannelOrder { ChannelOrder::Rgb }
///     fn create_window(&mut self, _: &str, _: u32, _: u32) -> anyhow::Result<()> { Ok(()) }
///     fn show(&mut self, _: &RawFrame) -> anyhow::Result<()> { Ok(()) }
///     fn poll_key(&mut self, _: Duration) -> anyhow::Result<Option<Key>> { Ok(Some(Key::Char('q'))) }
///     fn destroy_all(&mut self) {}
/// }
/// ```
pub trait DisplaySink {
    /// Channel layout `show` expects.
    fn channel_order(&self) -> ChannelOrder;

    /// Prépare la surface d'affichage.
    ///
    /// # Errors
    /// Returns an error if the surface cannot be created.
    fn create_window(&mut self, name: &str, width: u32, height: u32) -> Result<()>;

    /// Affiche une frame déjà convertie dans `channel_order()`.
    ///
    /// # Errors
    /// Returns an error if drawing fails.
    fn show(&mut self, frame: &RawFrame) -> Result<()>;

    /// Attend au plus `timeout` une touche.
    ///
    /// # Errors
    /// Returns an error if the input backend fails.
    fn poll_key(&mut self, timeout: Duration) -> Result<Option<Key>>;

    /// One-line status (frame index, fps, state). Ignored by default.
    fn set_status(&mut self, _status: &str) {}

    /// Ferme toutes les surfaces. Toujours appelé, même après une erreur.
    fn destroy_all(&mut self);
}

/// Observateur de progression pour les boucles longues (encodage, export).
///
/// Purely observational: suppressing it never changes results.
pub trait Progress {
    /// `done` frames processed out of `total` (if known).
    fn update(&mut self, done: usize, total: Option<usize>);

    /// Fin de boucle.
    fn finish(&mut self, done: usize);
}
