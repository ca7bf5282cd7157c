//! HTTP access to the GoRails website.
//!
//! `PlatformClient` fetches pages with the session cookie, performs the
//! form login and resolves download redirects. `ApiError` is the error
//! taxonomy shared by the whole download pipeline.

pub mod client;
pub mod error;

pub use client::PlatformClient;
pub use error::{ApiError, ApiResult};
