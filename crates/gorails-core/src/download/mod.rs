//! Downloading: byte streaming with progress, and the per-episode pipeline.

pub mod file;
pub mod pipeline;
pub mod progress;

pub use file::Downloader;
pub use pipeline::EpisodePipeline;
pub use progress::{ProgressTracker, ProgressTrackerConfig};
