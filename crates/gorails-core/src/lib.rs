//! Core library for gorails-dl.
//!
//! Signs in to GoRails, finds the download link on episode pages, follows
//! it to the CDN and streams the video to disk:
//!
//! - [`auth`]: session file and login
//! - [`api`]: HTTP client and error taxonomy
//! - [`scrape`]: HTML parsing behind the `PageParser` trait
//! - [`download`]: streaming downloads and the episode pipeline
//! - [`config`]: explicit configuration passed to every component

pub mod api;
pub mod auth;
pub mod config;
pub mod download;
pub mod models;
pub mod scrape;
pub mod utils;

pub use api::{ApiError, ApiResult, PlatformClient};
pub use auth::{AuthArgs, Authenticator, CredentialPrompt, Credentials, PromptChoice, SessionData, SessionStore};
pub use config::Config;
pub use download::{Downloader, EpisodePipeline};
pub use scrape::{GoRailsMarkup, PageParser};
