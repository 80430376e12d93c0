//! Album command - album header and tracks from either catalog.

use anyhow::Result;
use clap::{Args, ValueEnum};
use serde::Serialize;

use musify_core::{Album, Track};

use super::{Needs, open_catalog, require};
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Catalog an album id belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum CatalogArg {
    /// Open-content catalog (tracks only).
    #[default]
    Jamendo,
    /// Commercial catalog.
    Spotify,
}

/// Arguments for the album command.
#[derive(Args)]
pub struct AlbumArgs {
    /// Album id.
    pub id: String,

    /// Catalog the id belongs to.
    #[arg(long, short, default_value = "jamendo")]
    pub catalog: CatalogArg,
}

#[derive(Serialize)]
struct AlbumOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    album: Option<Album>,
    tracks: Vec<Track>,
}

/// Runs the album command.
pub async fn run(args: &AlbumArgs, cli: &Cli) -> Result<()> {
    let output = match args.catalog {
        CatalogArg::Spotify => {
            let catalog = open_catalog(cli, Needs::Spotify).await?;
            let (album, tracks) = futures::join!(
                catalog.albums.fetch_album(&args.id),
                catalog.albums.fetch_album_tracks(&args.id),
            );
            AlbumOutput {
                album: Some(require(album, "album")?),
                tracks: require(tracks, "album tracks")?,
            }
        }
        CatalogArg::Jamendo => {
            let catalog = open_catalog(cli, Needs::Jamendo).await?;
            AlbumOutput {
                album: None,
                tracks: require(
                    catalog.tracks.fetch_tracks_for_album(&args.id).await,
                    "album tracks",
                )?,
            }
        }
    };

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            let text = match &output.album {
                Some(album) => formatter.format_album(album, &output.tracks),
                None => formatter.format_tracks(&format!("Album {}", args.id), &output.tracks),
            };
            println!("{text}");
        }
        OutputFormat::Json => {
            println!("{}", JsonFormatter::new(cli.pretty).format(&output)?);
        }
    }
    Ok(())
}
