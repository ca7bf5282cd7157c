//! Application configuration.
//!
//! `Config` is built once at startup and handed to every component that
//! needs it. Defaults target gorails.com; the base URL and the session file
//! can be overridden from the environment (or a `.env` file loaded by the
//! binary), which is also how the tests point the client at a mock server.
//!
//! The session token is stored at `~/.gorails.json` unless overridden.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use url::Url;

/// Default platform root
const DEFAULT_BASE_URL: &str = "https://gorails.com";

/// Session file name in the home directory
const SESSION_FILE: &str = ".gorails.json";

/// Cookie carrying the platform session
const SESSION_COOKIE: &str = "_gorails_session";

/// Default output directory, relative to the working directory
const DEFAULT_OUTPUT_DIR: &str = "downloads";

/// HTTP request timeout in seconds.
/// Applies to page requests; downloads are bounded by the connect timeout only.
const REQUEST_TIMEOUT_SECS: u64 = 30;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

pub const ENV_BASE_URL: &str = "GORAILS_BASE_URL";
pub const ENV_SESSION_FILE: &str = "GORAILS_SESSION_FILE";

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: Url,
    pub session_path: PathBuf,
    pub cookie_name: String,
    pub user_agent: String,
    pub request_timeout: Duration,
    pub output_dir: PathBuf,
    pub force: bool,
}

impl Config {
    /// Build a config for the given platform root with default settings
    pub fn new(base_url: Url, session_path: PathBuf) -> Self {
        Self {
            base_url,
            session_path,
            cookie_name: SESSION_COOKIE.to_string(),
            user_agent: USER_AGENT.to_string(),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            force: false,
        }
    }

    /// Load defaults, applying environment overrides
    pub fn load() -> Result<Self> {
        let base_url = match std::env::var(ENV_BASE_URL) {
            Ok(raw) if !raw.trim().is_empty() => Url::parse(raw.trim())
                .with_context(|| format!("Invalid {}: {}", ENV_BASE_URL, raw))?,
            _ => Url::parse(DEFAULT_BASE_URL)?,
        };

        let session_path = match std::env::var_os(ENV_SESSION_FILE) {
            Some(path) if !path.is_empty() => PathBuf::from(path),
            _ => Self::default_session_path()?,
        };

        Ok(Self::new(base_url, session_path))
    }

    fn default_session_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find home directory"))?;
        Ok(home.join(SESSION_FILE))
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn sign_in_url(&self) -> Result<Url> {
        self.endpoint("users/sign_in")
    }

    pub fn series_url(&self) -> Result<Url> {
        self.endpoint("series")
    }

    /// Join a path onto the platform root
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("Failed to build URL for {}", path))
    }

    /// Resolve a user-supplied page reference (absolute URL or site path)
    pub fn page_url(&self, input: &str) -> Result<Url> {
        match Url::parse(input) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => self.endpoint(input),
            Err(e) => Err(e).with_context(|| format!("Invalid URL: {}", input)),
        }
    }
}
