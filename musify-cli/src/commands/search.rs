//! Search command - multi-category search of the commercial catalog.

use anyhow::Result;
use clap::Args;
use tracing::info;

use super::{Needs, open_catalog, require};
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the search command.
#[derive(Args)]
pub struct SearchArgs {
    /// Search query.
    pub query: String,

    /// Results per category.
    #[arg(long, short, default_value_t = 10)]
    pub limit: u32,
}

/// Runs the search command.
pub async fn run(args: &SearchArgs, cli: &Cli) -> Result<()> {
    info!(query = %args.query, "Searching");
    let catalog = open_catalog(cli, Needs::Spotify).await?;

    let results = require(
        catalog
            .search
            .fetch_search_results(&args.query, args.limit)
            .await,
        "search",
    )?;

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_search(&args.query, &results));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&results)?);
        }
    }

    Ok(())
}
