//! Browse commands - new releases and genre shelves of the open catalog.

use anyhow::Result;
use clap::Args;
use tracing::info;

use musify_core::GenreType;

use super::{CommandError, Needs, open_catalog, require};
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the new-albums command.
#[derive(Args)]
pub struct NewAlbumsArgs {
    /// Number of albums.
    #[arg(long, short, default_value_t = 20)]
    pub limit: u32,
}

/// Arguments for the genre command.
#[derive(Args)]
pub struct GenreArgs {
    /// Genre tag or label, e.g. "jazz" or "rainy day".
    pub genre: GenreType,

    /// Number of albums and playlists.
    #[arg(long, short, default_value_t = 10)]
    pub limit: u32,
}

/// Runs the new-albums command.
pub async fn run_new_albums(args: &NewAlbumsArgs, cli: &Cli) -> Result<()> {
    let catalog = open_catalog(cli, Needs::Jamendo).await?;
    let albums = require(
        catalog.home_feed.fetch_new_albums(args.limit).await,
        "new albums",
    )?;

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_albums("New albums", &albums));
        }
        OutputFormat::Json => {
            println!("{}", JsonFormatter::new(cli.pretty).format(&albums)?);
        }
    }
    Ok(())
}

/// Runs the genre command.
pub async fn run_genre(args: &GenreArgs, cli: &Cli) -> Result<()> {
    info!(genre = args.genre.tag(), "Loading genre feed");
    let catalog = open_catalog(cli, Needs::Jamendo).await?;
    let feed = catalog
        .home_feed
        .fetch_genre_feed(args.genre, args.limit)
        .await;

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_genre_feed(&feed));
        }
        OutputFormat::Json => {
            println!("{}", JsonFormatter::new(cli.pretty).format(&feed)?);
        }
    }

    // Both halves failing is a command failure; one half is shown as is.
    if let (Some(_), Some(&kind)) = (feed.albums.cause(), feed.playlists.cause()) {
        return Err(CommandError::Fetch {
            what: format!("{} feed", args.genre),
            kind,
        }
        .into());
    }
    Ok(())
}
