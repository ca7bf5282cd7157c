//! Data models for platform pages and download results.
//!
//! - `EpisodeReference`, `SeriesReference`: links discovered on listing pages
//! - `EpisodePage`, `ResolvedAsset`: an episode on its way to a direct URL
//! - `DownloadOutcome`, `PlaylistSummary`, `SeriesSummary`: run results

pub mod episode;
pub mod summary;

pub use episode::{EpisodePage, EpisodeReference, ResolvedAsset, SeriesReference};
pub use summary::{DownloadOutcome, PlaylistSummary, SeriesSummary};
