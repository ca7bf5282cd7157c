//! Utility functions for names, sizes and text cleanup.

pub mod format;

pub use format::{collapse_whitespace, episode_filename, format_bytes, slugify};
