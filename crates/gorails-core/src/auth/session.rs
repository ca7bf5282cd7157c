use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Stored platform session. Valid until a request using it is rejected;
/// no expiry is tracked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    /// Older session files name this field `session_id`
    #[serde(alias = "session_id")]
    pub token: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl SessionData {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            created_at: Utc::now(),
        }
    }

    /// Value for a `Cookie` request header
    pub fn cookie_header(&self, cookie_name: &str) -> String {
        format!("{}={}", cookie_name, self.token)
    }
}

/// Reads and writes the single session record on disk.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored session. A missing file or empty token is `None`.
    pub fn load(&self) -> Result<Option<SessionData>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No stored session");
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&self.path)
            .context("Failed to read session file")?;
        let data: SessionData = serde_json::from_str(&contents)
            .context("Failed to parse session file")?;

        if data.token.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(data))
    }

    /// Save session to disk, replacing any previous record
    pub fn save(&self, data: &SessionData) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .context("Failed to create session directory")?;
            }
        }
        let contents = serde_json::to_string_pretty(data)?;
        std::fs::write(&self.path, contents).context("Failed to write session file")?;
        debug!(path = %self.path.display(), "Session saved");
        Ok(())
    }

    /// Remove the stored session, if any
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path).context("Failed to remove session file")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> SessionStore {
        SessionStore::new(dir.path().join("nested").join("session.json"))
    }

    #[test]
    fn test_load_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(store_in(&dir).load().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let data = SessionData::new("abc%2Fdef--123==");

        store.save(&data).unwrap();
        let loaded = store.load().unwrap().expect("session should be stored");
        assert_eq!(loaded, data);
        assert_eq!(loaded.token.as_bytes(), b"abc%2Fdef--123==");
    }

    #[test]
    fn test_save_overwrites_previous_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save(&SessionData::new("first")).unwrap();
        store.save(&SessionData::new("second")).unwrap();
        assert_eq!(store.load().unwrap().unwrap().token, "second");
    }

    #[test]
    fn test_load_legacy_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".gorails.json");
        std::fs::write(&path, r#"{"session_id": "legacy-token"}"#).unwrap();

        let loaded = SessionStore::new(path).load().unwrap().unwrap();
        assert_eq!(loaded.token, "legacy-token");
    }

    #[test]
    fn test_empty_token_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, r#"{"token": "  "}"#).unwrap();
        assert!(SessionStore::new(path).load().unwrap().is_none());
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(SessionStore::new(path).load().is_err());
    }

    #[test]
    fn test_clear_removes_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save(&SessionData::new("token")).unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        // Clearing twice is fine
        store.clear().unwrap();
    }

    #[test]
    fn test_cookie_header() {
        let data = SessionData::new("xyz");
        assert_eq!(data.cookie_header("_gorails_session"), "_gorails_session=xyz");
    }
}
