/// Export paths for gridvid archives: bulk JSON and reconstructed MP4.
pub mod json;
pub mod muxer;
pub mod transcode;

pub use json::export_json;
pub use transcode::transcode;
