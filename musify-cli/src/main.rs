// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! Musify CLI - browse the music catalogs from the command line.
//!
//! # Examples
//!
//! ```bash
//! # Search the commercial catalog
//! musify search "daft punk"
//!
//! # Newest open-content albums
//! musify new-albums --limit 10
//!
//! # Albums and playlists for a genre
//! musify genre rainy_day
//!
//! # First three pages of a playlist
//! musify playlist 500089375 --pages 3
//!
//! # JSON output
//! musify --format json --pretty album 4aawyAB9vmqN3uQ7FjRGTy --catalog spotify
//!
//! # Credential state
//! musify token
//! ```

mod commands;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{album, browse, config, playlist, search, token};

// ============================================================================
// CLI Definition
// ============================================================================

/// Musify CLI - music catalog browser.
#[derive(Parser)]
#[command(name = "musify")]
#[command(about = "Music catalog browser CLI")]
#[command(long_about = r#"
Musify reads two music catalogs.

Catalogs:
  • Spotify Web API (search, albums, artists)   needs client id + secret
  • Jamendo open-content API (browse, playlists) needs client id

Credentials come from the config file or the environment:
  MUSIFY_SPOTIFY_CLIENT_ID, MUSIFY_SPOTIFY_CLIENT_SECRET, MUSIFY_JAMENDO_CLIENT_ID

Examples:
  musify search "nils frahm"       # Search everything
  musify new-albums                # Newest open-content albums
  musify genre jazz                # Genre shelf
  musify playlist 500089375        # Playlist with cover and tracks
  musify --format json token       # Credential state as JSON
"#)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Market code for commercial catalog availability, e.g. "SE".
    #[arg(long, short, global = true)]
    pub market: Option<String>,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (no logging, errors only via exit code).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Search tracks, albums, artists and playlists.
    #[command(visible_alias = "s")]
    Search(search::SearchArgs),

    /// List newly released open-content albums.
    NewAlbums(browse::NewAlbumsArgs),

    /// Show albums and playlists for a genre.
    #[command(visible_alias = "g")]
    Genre(browse::GenreArgs),

    /// Show a playlist, or page through its tracks.
    #[command(visible_alias = "p")]
    Playlist(playlist::PlaylistArgs),

    /// Show an album and its tracks.
    #[command(visible_alias = "a")]
    Album(album::AlbumArgs),

    /// Fetch a credential and show its state.
    Token,

    /// Show configuration.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(u8)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// No network, or the service could not be reached.
    Network = 2,
    /// The service reported an error or returned nothing.
    Api = 3,
    /// Credentials missing or rejected.
    Auth = 4,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code as u8)
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let filter = if verbose {
        EnvFilter::new("musify=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("musify=warn"))
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Commands::Search(args) => search::run(args, &cli).await,
        Commands::NewAlbums(args) => browse::run_new_albums(args, &cli).await,
        Commands::Genre(args) => browse::run_genre(args, &cli).await,
        Commands::Playlist(args) => playlist::run(args, &cli).await,
        Commands::Album(args) => album::run(args, &cli).await,
        Commands::Token => token::run(&cli).await,
        Commands::Config(args) => config::run(args, &cli).await,
    };

    match result {
        Ok(()) => ExitCode::Success.into(),
        Err(e) => {
            if !cli.quiet {
                eprintln!("Error: {e:#}");
            }
            commands::exit_code_for(&e).into()
        }
    }
}
