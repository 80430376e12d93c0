//! Token command - obtain the commercial catalog credential and show its state.

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use musify_fetch::TokenRepository;
use musify_providers::spotify;

use super::{build_context, catalog_config, load_config};
use crate::output::{JsonFormatter, TextFormatter, TokenOutput};
use crate::{Cli, OutputFormat};

/// Runs the token command.
pub async fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli).await?;
    let catalog = catalog_config(&config);

    let output = match (
        catalog.spotify.client_id.as_deref(),
        catalog.spotify.client_secret.as_deref(),
    ) {
        (Some(id), Some(secret)) => {
            let ctx = build_context(&config);
            let tokens = spotify::token_repository(
                Arc::clone(&ctx.http),
                &catalog.spotify.token_url,
                id,
                secret,
            );
            match tokens.get_valid_bearer_token().await {
                Ok(token) => {
                    info!(expires_at = %token.expires_at(), "Credential issued");
                    TokenOutput::from_token(&token)
                }
                Err(e) => TokenOutput::unavailable(true, e.to_string()),
            }
        }
        _ => TokenOutput::unavailable(false, "client id or secret missing"),
    };

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_token(&output));
        }
        OutputFormat::Json => {
            println!("{}", JsonFormatter::new(cli.pretty).format(&output)?);
        }
    }
    Ok(())
}
