use std::path::{Path, PathBuf};

use futures::StreamExt;
use reqwest::Response;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info};

use crate::api::{ApiError, ApiResult, PlatformClient};
use crate::auth::SessionData;
use crate::models::{DownloadOutcome, ResolvedAsset};
use crate::utils::format_bytes;

use super::progress::{ProgressTracker, ProgressTrackerConfig};

/// Suffix for files still being written
const PARTIAL_SUFFIX: &str = "part";

/// Streams resolved assets to disk.
#[derive(Clone)]
pub struct Downloader {
    client: PlatformClient,
    force: bool,
    show_progress: bool,
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(PARTIAL_SUFFIX);
    path.with_file_name(name)
}

impl Downloader {
    pub fn new(client: PlatformClient, force: bool) -> Self {
        Self {
            client,
            force,
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Download `asset` into `dest_dir`, returning where it landed.
    ///
    /// An existing file is kept unless `force` is set. The body goes to a
    /// `.part` file first, so an interrupted transfer never leaves a file
    /// under the final name.
    pub async fn download(
        &self,
        asset: &ResolvedAsset,
        dest_dir: &Path,
        session: &SessionData,
    ) -> ApiResult<DownloadOutcome> {
        tokio::fs::create_dir_all(dest_dir)
            .await
            .map_err(|e| ApiError::write(dest_dir, e))?;
        let path = dest_dir.join(&asset.suggested_filename);

        if let Ok(meta) = tokio::fs::metadata(&path).await {
            if !self.force {
                info!(path = %path.display(), "File already exists, skipping");
                return Ok(DownloadOutcome {
                    title: asset.title.clone(),
                    path,
                    bytes: meta.len(),
                    skipped: true,
                });
            }
        }

        info!(title = %asset.title, url = %asset.direct_url, "Downloading");
        let response = self.client.open_stream(&asset.direct_url, session).await?;
        let expected = response.content_length();
        let part = partial_path(&path);

        let tracker = ProgressTracker::new(ProgressTrackerConfig {
            len: expected,
            label: asset.suggested_filename.clone(),
            visible: self.show_progress,
        });

        let written = match Self::write_stream(response, &part, expected, &tracker).await {
            Ok(written) => written,
            Err(e) => {
                tracker.abandon();
                let _ = tokio::fs::remove_file(&part).await;
                return Err(e);
            }
        };

        if self.force && tokio::fs::metadata(&path).await.is_ok() {
            tokio::fs::remove_file(&path)
                .await
                .map_err(|e| ApiError::write(&path, e))?;
        }
        tokio::fs::rename(&part, &path)
            .await
            .map_err(|e| ApiError::write(&path, e))?;

        tracker.finish(Some(format!("done, {}", format_bytes(written))));
        debug!(path = %path.display(), bytes = written, "Download complete");

        Ok(DownloadOutcome {
            title: asset.title.clone(),
            path,
            bytes: written,
            skipped: false,
        })
    }

    async fn write_stream(
        response: Response,
        part: &Path,
        expected: Option<u64>,
        tracker: &ProgressTracker,
    ) -> ApiResult<u64> {
        let file = File::create(part).await.map_err(|e| ApiError::write(part, e))?;
        let mut writer = BufWriter::new(file);
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| {
                ApiError::Interrupted(format!("stream failed after {} bytes: {}", written, e))
            })?;
            writer
                .write_all(&chunk)
                .await
                .map_err(|e| ApiError::write(part, e))?;
            written += chunk.len() as u64;
            tracker.advance(chunk.len() as u64);
        }
        writer.flush().await.map_err(|e| ApiError::write(part, e))?;

        if let Some(expected) = expected {
            if written != expected {
                return Err(ApiError::Interrupted(format!(
                    "received {} of {} bytes",
                    written, expected
                )));
            }
        }
        Ok(written)
    }
}
