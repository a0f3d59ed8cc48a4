/// Grid conversion engine for gridvid.
///
/// Encodes pixel frames into cell grids and reconstructs approximate frames
/// from them.
pub mod encoder;
pub mod reconstruct;

pub use encoder::{EncodedVideo, GridEncoder};
pub use reconstruct::{Palette, reconstruct, reconstruct_into};
