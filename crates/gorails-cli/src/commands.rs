use std::io::{self, IsTerminal};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use gorails_core::models::{PlaylistSummary, SeriesSummary};
use gorails_core::utils::format_bytes;
use gorails_core::{
    AuthArgs, Authenticator, Config, EpisodePipeline, GoRailsMarkup, PlatformClient, SessionData,
    SessionStore,
};
use tracing::info;

use crate::cli::{Cli, Commands};
use crate::prompt::TerminalPrompt;

const INFO_TEXT: &str = "\
gorails-dl - download videos from the GoRails video series

Usage:
  gorails-dl video <URL>       Download a single episode
  gorails-dl playlist <URL>    Download every episode of a series
  gorails-dl all-series        Download all series, one directory each
  gorails-dl auth              Sign in and store the session
  gorails-dl auth --logout     Remove the stored session
  gorails-dl info              Show this info

Options:
  -o, --output-dir <DIR>       Output directory (default: downloads)
  -f, --force                  Overwrite existing files
  -v, --verbose                Enable verbose logging
      --token <COOKIE>         Use this _gorails_session value (env: GORAILS_SESSION)

The session is stored in ~/.gorails.json (override with GORAILS_SESSION_FILE).";

/// Everything a command needs once configuration is loaded
struct App {
    config: Config,
    client: PlatformClient,
    store: SessionStore,
    auth_args: AuthArgs,
}

impl App {
    fn new(cli: &Cli, renew: bool) -> Result<Self> {
        let config = Config::load()?
            .with_output_dir(&cli.output_dir)
            .with_force(cli.force);
        let client = PlatformClient::new(&config, Arc::new(GoRailsMarkup::new()))?;
        let store = SessionStore::new(config.session_path.clone());
        Ok(Self {
            config,
            client,
            store,
            auth_args: AuthArgs {
                token: cli.token.clone(),
                renew,
            },
        })
    }

    async fn session(&self) -> Result<SessionData> {
        let authenticator = Authenticator::new(&self.client, &self.store);
        let session = authenticator
            .resolve(&self.auth_args, &mut TerminalPrompt)
            .await
            .context("Authentication required to download videos")?;
        Ok(session)
    }

    async fn pipeline(&self) -> Result<EpisodePipeline> {
        let session = self.session().await?;
        Ok(EpisodePipeline::new(&self.config, self.client.clone(), session)?
            .with_progress(io::stderr().is_terminal()))
    }
}

pub async fn run(cli: Cli) -> Result<ExitCode> {
    match &cli.command {
        Commands::Info => {
            println!("{}", INFO_TEXT);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Auth { renew, logout } => auth(&cli, *renew, *logout).await,
        Commands::Video { url } => video(&cli, url).await,
        Commands::Playlist { url } => playlist(&cli, url).await,
        Commands::AllSeries => all_series(&cli).await,
    }
}

async fn auth(cli: &Cli, renew: bool, logout: bool) -> Result<ExitCode> {
    let app = App::new(cli, renew)?;

    if logout {
        app.store.clear()?;
        println!("Signed out; removed {}", app.store.path().display());
        return Ok(ExitCode::SUCCESS);
    }

    app.session().await?;
    println!("Authentication successful!");
    Ok(ExitCode::SUCCESS)
}

async fn video(cli: &Cli, url: &str) -> Result<ExitCode> {
    let app = App::new(cli, false)?;
    let page_url = app.config.page_url(url)?;
    let pipeline = app.pipeline().await?;

    info!(url = %page_url, "Downloading single video");
    let outcome = pipeline
        .download_episode(&page_url)
        .await
        .with_context(|| format!("Failed to download {}", page_url))?;

    if outcome.skipped {
        println!(
            "File already exists, skipped: {} ({})",
            outcome.path.display(),
            format_bytes(outcome.bytes)
        );
    } else {
        println!(
            "Downloaded: {} -> {} ({})",
            outcome.title,
            outcome.path.display(),
            format_bytes(outcome.bytes)
        );
    }
    Ok(ExitCode::SUCCESS)
}

fn report_playlist(summary: &PlaylistSummary) {
    for (url, error) in &summary.failures {
        eprintln!("  failed: {} ({})", url, error);
    }
    println!(
        "{}/{} episodes downloaded, {} skipped, {} failed",
        summary.downloaded(),
        summary.total,
        summary.skipped(),
        summary.failed()
    );
}

async fn playlist(cli: &Cli, url: &str) -> Result<ExitCode> {
    let app = App::new(cli, false)?;
    let playlist_url = app.config.page_url(url)?;
    let pipeline = app.pipeline().await?;

    let summary = pipeline
        .download_playlist(&playlist_url)
        .await
        .with_context(|| format!("Failed to download playlist {}", playlist_url))?;

    report_playlist(&summary);
    Ok(if summary.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn report_series(summary: &SeriesSummary) {
    for (title, playlist) in &summary.series {
        print!("{}: ", title);
        report_playlist(playlist);
    }
    for (title, error) in &summary.failures {
        eprintln!("{}: failed ({})", title, error);
    }
    println!(
        "{}/{} series downloaded",
        summary.completed(),
        summary.total
    );
}

async fn all_series(cli: &Cli) -> Result<ExitCode> {
    let app = App::new(cli, false)?;
    let pipeline = app.pipeline().await?;

    info!(dir = %pipeline.output_dir().display(), "Downloading all series");
    let summary = pipeline
        .download_all_series()
        .await
        .context("Failed to download series")?;

    report_series(&summary);
    Ok(if summary.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
