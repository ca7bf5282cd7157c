//! Episode, playlist and series downloads.
//!
//! One episode goes through fetch page → find download link → resolve
//! redirect → stream to disk. Bulk modes run that sequence once per
//! discovered episode, in page order, skipping failed episodes unless the
//! session itself was rejected.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{info, warn};
use url::Url;

use crate::api::{ApiError, ApiResult, PlatformClient};
use crate::auth::SessionData;
use crate::config::Config;
use crate::models::{
    DownloadOutcome, EpisodeReference, PlaylistSummary, ResolvedAsset, SeriesReference,
    SeriesSummary,
};
use crate::utils::episode_filename;

use super::Downloader;

pub struct EpisodePipeline {
    client: PlatformClient,
    downloader: Downloader,
    session: SessionData,
    output_dir: PathBuf,
    series_url: Url,
}

impl EpisodePipeline {
    pub fn new(config: &Config, client: PlatformClient, session: SessionData) -> Result<Self> {
        Ok(Self {
            downloader: Downloader::new(client.clone(), config.force),
            client,
            session,
            output_dir: config.output_dir.clone(),
            series_url: config.series_url()?,
        })
    }

    /// Show progress bars while downloading
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.downloader = self.downloader.with_progress(show_progress);
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    // ===== Single episode =====

    /// Fetch an episode page and resolve its download to a direct URL
    pub async fn resolve_episode(
        &self,
        page_url: &Url,
        position: Option<usize>,
    ) -> ApiResult<ResolvedAsset> {
        let html = self.client.fetch_page(page_url, &self.session).await?;
        let page = self.client.parser().episode_page(&html, page_url)?;
        let direct_url = self
            .client
            .resolve_asset(&page.download_url, &self.session)
            .await?;

        Ok(ResolvedAsset {
            suggested_filename: episode_filename(&page.title, &direct_url, position),
            title: page.title,
            direct_url,
        })
    }

    pub async fn download_episode(&self, page_url: &Url) -> ApiResult<DownloadOutcome> {
        self.download_episode_into(page_url, None, &self.output_dir)
            .await
    }

    async fn download_episode_into(
        &self,
        page_url: &Url,
        position: Option<usize>,
        dir: &Path,
    ) -> ApiResult<DownloadOutcome> {
        let asset = self.resolve_episode(page_url, position).await?;
        self.downloader.download(&asset, dir, &self.session).await
    }

    // ===== Playlists =====

    pub async fn list_episodes(&self, playlist_url: &Url) -> ApiResult<Vec<EpisodeReference>> {
        let html = self.client.fetch_page(playlist_url, &self.session).await?;
        self.client.parser().episode_links(&html, playlist_url)
    }

    pub async fn download_playlist(&self, playlist_url: &Url) -> ApiResult<PlaylistSummary> {
        self.download_playlist_into(playlist_url, &self.output_dir)
            .await
    }

    async fn download_playlist_into(
        &self,
        playlist_url: &Url,
        dir: &Path,
    ) -> ApiResult<PlaylistSummary> {
        let episodes = self.list_episodes(playlist_url).await?;
        if episodes.is_empty() {
            return Err(ApiError::Resolve(format!(
                "no episode links found on {}",
                playlist_url
            )));
        }
        info!(url = %playlist_url, count = episodes.len(), "Found episodes");

        let mut summary = PlaylistSummary {
            total: episodes.len(),
            ..Default::default()
        };

        for (index, episode) in episodes.iter().enumerate() {
            let position = index + 1;
            info!(
                "Downloading episode {}/{}: {}",
                position,
                episodes.len(),
                episode.title
            );
            match self
                .download_episode_into(&episode.page_url, Some(position), dir)
                .await
            {
                Ok(outcome) => summary.outcomes.push(outcome),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!(url = %episode.page_url, error = %e, "Episode failed, continuing");
                    summary
                        .failures
                        .push((episode.page_url.to_string(), e.to_string()));
                }
            }
        }
        Ok(summary)
    }

    // ===== All series =====

    pub async fn list_series(&self) -> ApiResult<Vec<SeriesReference>> {
        let html = self.client.fetch_page(&self.series_url, &self.session).await?;
        self.client.parser().series_links(&html, &self.series_url)
    }

    /// Download every series into its own subdirectory of the output directory
    pub async fn download_all_series(&self) -> ApiResult<SeriesSummary> {
        let series = self.list_series().await?;
        if series.is_empty() {
            return Err(ApiError::Resolve(format!(
                "no series found on {}",
                self.series_url
            )));
        }
        info!(count = series.len(), "Found series");

        let mut summary = SeriesSummary {
            total: series.len(),
            ..Default::default()
        };

        for (index, entry) in series.iter().enumerate() {
            info!("Series {}/{}: {}", index + 1, series.len(), entry.title);
            let dir = self.output_dir.join(&entry.slug);
            match self.download_playlist_into(&entry.url, &dir).await {
                Ok(playlist) => summary.series.push((entry.title.clone(), playlist)),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!(series = %entry.title, error = %e, "Series failed, continuing");
                    summary.failures.push((entry.title.clone(), e.to_string()));
                }
            }
        }
        Ok(summary)
    }
}
