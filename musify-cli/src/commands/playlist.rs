//! Playlist command - details with cover fallback, or paged track listing.

use anyhow::Result;
use clap::Args;
use futures::StreamExt;
use tracing::{debug, info};

use super::{Needs, open_catalog, require};
use crate::output::{JsonFormatter, PagedTracksOutput, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the playlist command.
#[derive(Args)]
pub struct PlaylistArgs {
    /// Open-catalog playlist id.
    pub id: String,

    /// Page through the tracks, loading at most this many pages.
    #[arg(long)]
    pub pages: Option<usize>,
}

/// Runs the playlist command.
pub async fn run(args: &PlaylistArgs, cli: &Cli) -> Result<()> {
    let catalog = open_catalog(cli, Needs::Jamendo).await?;

    if let Some(max_pages) = args.pages {
        return run_paged(args, max_pages, &catalog, cli).await;
    }

    let details = require(
        catalog.tracks.fetch_playlist_details(&args.id).await,
        "playlist",
    )?;

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_playlist_details(&details));
        }
        OutputFormat::Json => {
            println!("{}", JsonFormatter::new(cli.pretty).format(&details)?);
        }
    }
    Ok(())
}

async fn run_paged(
    args: &PlaylistArgs,
    max_pages: usize,
    catalog: &musify_providers::Catalog,
    cli: &Cli,
) -> Result<()> {
    info!(playlist = %args.id, max_pages, "Paging playlist tracks");
    let pager = catalog.tracks.playlist_tracks_pager(&args.id);
    let mut pages = Box::pin(pager.into_page_stream().take(max_pages));

    let mut output = PagedTracksOutput {
        playlist_id: args.id.clone(),
        pages_loaded: 0,
        has_more: false,
        tracks: Vec::new(),
        error: None,
    };

    while let Some(page) = pages.next().await {
        match page {
            Ok(page) => {
                debug!(items = page.items.len(), next = ?page.next_key, "Page loaded");
                output.pages_loaded += 1;
                output.has_more = page.next_key.is_some();
                output.tracks.extend(page.items);
            }
            Err(e) => {
                output.error = Some(format!("{} ({})", e.kind.message(), e.kind));
                break;
            }
        }
    }

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_paged_tracks(&output));
        }
        OutputFormat::Json => {
            println!("{}", JsonFormatter::new(cli.pretty).format(&output)?);
        }
    }
    Ok(())
}
