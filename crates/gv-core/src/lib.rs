/// Configuration, types, and shared structures for gridvid.
///
/// This crate contains the data model, the pixel/grid geometry, the colour
/// reducer, and the collaborator traits used across the workspace.

pub mod config;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod metadata;
pub mod pixel;
pub mod progress;
pub mod reduce;
pub mod traits;

pub use config::GridConfig;
pub use error::GridError;
pub use frame::{Frame, FrameSequence, GridCell, GridMatrix, Rgb};
pub use geometry::CellGeometry;
pub use metadata::VideoMetadata;
pub use reduce::GridMode;
