use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "gorails-dl",
    version = env!("CARGO_PKG_VERSION"),
    about = "Download videos from GoRails episodes, playlists and series",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    /// Output directory for downloaded videos
    #[arg(short, long, global = true, default_value = "downloads")]
    pub output_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Download again and overwrite existing files
    #[arg(short, long, global = true)]
    pub force: bool,

    /// Session cookie value to use instead of the stored session
    #[arg(long, global = true, env = "GORAILS_SESSION", hide_env_values = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Download a single episode
    #[command(alias = "v")]
    Video {
        /// Episode URL or path, e.g. /episodes/rails-7-encrypted-attributes
        url: String,
    },
    /// Download every episode of a series page
    #[command(alias = "p")]
    Playlist {
        /// Series URL or path, e.g. /series/hotwire
        url: String,
    },
    /// Download all series, each in its own directory
    #[command(name = "all-series")]
    AllSeries,
    /// Sign in and store the session
    Auth {
        /// Ignore the stored session and sign in again
        #[arg(long, conflicts_with = "logout")]
        renew: bool,
        /// Remove the stored session
        #[arg(long)]
        logout: bool,
    },
    /// Show usage information
    Info,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_video_with_global_options() {
        let cli = Cli::try_parse_from([
            "gorails-dl",
            "video",
            "https://gorails.com/episodes/demo",
            "-o",
            "videos",
            "--force",
        ])
        .unwrap();
        assert_eq!(cli.output_dir, PathBuf::from("videos"));
        assert!(cli.force);
        match cli.command {
            Commands::Video { url } => assert_eq!(url, "https://gorails.com/episodes/demo"),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_all_series() {
        let cli = Cli::try_parse_from(["gorails-dl", "-v", "all-series"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::AllSeries));
        assert_eq!(cli.output_dir, PathBuf::from("downloads"));
    }

    #[test]
    fn test_auth_flags_conflict() {
        assert!(Cli::try_parse_from(["gorails-dl", "auth", "--renew", "--logout"]).is_err());
    }
}
