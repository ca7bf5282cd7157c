use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Transfer interrupted: {0}")]
    Interrupted(String),

    #[error("Request to {url} failed with status {status}")]
    Fetch { status: u16, url: String },

    #[error("Could not resolve download: {0}")]
    Resolve(String),

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Maximum length for page text quoted in error messages
const MAX_ERROR_TEXT_LENGTH: usize = 200;

impl ApiError {
    /// Truncate remote text to avoid dumping whole pages into errors
    fn truncate_text(text: &str) -> String {
        if text.chars().count() <= MAX_ERROR_TEXT_LENGTH {
            text.to_string()
        } else {
            let head: String = text.chars().take(MAX_ERROR_TEXT_LENGTH).collect();
            format!("{}... (truncated)", head)
        }
    }

    pub fn from_status(status: reqwest::StatusCode, url: &str) -> Self {
        match status.as_u16() {
            401 | 403 => ApiError::Auth(format!(
                "session rejected with status {} for {}",
                status.as_u16(),
                url
            )),
            code => ApiError::Fetch {
                status: code,
                url: url.to_string(),
            },
        }
    }

    pub fn login_rejected(message: &str) -> Self {
        ApiError::Auth(Self::truncate_text(message.trim()))
    }

    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ApiError::Write {
            path: path.into(),
            source,
        }
    }

    /// Network-class failures cover both transport errors and early stream ends
    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network(_) | ApiError::Interrupted(_))
    }

    /// Authentication failures end a bulk run instead of skipping one episode
    pub fn is_fatal(&self) -> bool {
        matches!(self, ApiError::Auth(_))
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_auth_codes() {
        assert!(ApiError::from_status(StatusCode::UNAUTHORIZED, "https://x/a").is_fatal());
        assert!(ApiError::from_status(StatusCode::FORBIDDEN, "https://x/a").is_fatal());
    }

    #[test]
    fn test_from_status_other_codes() {
        match ApiError::from_status(StatusCode::NOT_FOUND, "https://x/missing") {
            ApiError::Fetch { status, url } => {
                assert_eq!(status, 404);
                assert_eq!(url, "https://x/missing");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(!ApiError::from_status(StatusCode::BAD_GATEWAY, "u").is_fatal());
    }

    #[test]
    fn test_login_rejected_truncates() {
        let long = "x".repeat(500);
        let err = ApiError::login_rejected(&long);
        let msg = err.to_string();
        assert!(msg.ends_with("... (truncated)"));
        assert!(msg.len() < 300);
    }

    #[test]
    fn test_interrupted_counts_as_network() {
        assert!(ApiError::Interrupted("eof".into()).is_network());
        assert!(!ApiError::Resolve("no anchor".into()).is_network());
    }
}
