//! CLI command implementations.

pub mod album;
pub mod browse;
pub mod config;
pub mod playlist;
pub mod search;
pub mod token;

use std::time::Duration;

use anyhow::Result;
use thiserror::Error;
use tracing::debug;

use musify_core::{ErrorKind, FetchedResource};
use musify_fetch::{FetchContext, FetchSettings};
use musify_providers::{Catalog, CatalogConfig, JamendoSettings, SpotifySettings};
use musify_store::Config;

use crate::{Cli, ExitCode};

/// Failures with a dedicated exit code.
#[derive(Debug, Error)]
pub enum CommandError {
    /// A catalog call failed.
    #[error("{what}: {} ({kind})", kind.message())]
    Fetch {
        /// What was being fetched.
        what: String,
        /// Classified cause.
        kind: ErrorKind,
    },

    /// The catalog needs credentials that are not configured.
    #[error("{0} credentials are not configured (see `musify config --path`)")]
    MissingCredentials(&'static str),
}

/// Maps an error to the process exit code.
pub fn exit_code_for(error: &anyhow::Error) -> ExitCode {
    match error.downcast_ref::<CommandError>() {
        Some(CommandError::MissingCredentials(_)) => ExitCode::Auth,
        Some(CommandError::Fetch { kind, .. }) => match kind {
            ErrorKind::NetworkError | ErrorKind::NetworkConnectionFailure => ExitCode::Network,
            ErrorKind::ApiError | ErrorKind::EmptyResponse => ExitCode::Api,
            ErrorKind::UnknownError => ExitCode::Error,
        },
        None => ExitCode::Error,
    }
}

/// Unwraps a fetched resource, turning a failure into a [`CommandError`].
pub fn require<T>(resource: FetchedResource<T>, what: &str) -> Result<T, CommandError> {
    resource.into_result().map_err(|kind| CommandError::Fetch {
        what: what.to_string(),
        kind,
    })
}

/// Loads the configuration and applies command-line overrides.
pub async fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load().await?;
    if let Some(market) = &cli.market {
        config.spotify.market = Some(market.clone());
    }
    config.validate()?;
    debug!(spotify = config.has_spotify_credentials(), "Configuration loaded");
    Ok(config)
}

/// Builds the fetch context from the configuration.
pub fn build_context(config: &Config) -> FetchContext {
    let mut settings = FetchSettings::default()
        .with_timeout(Duration::from_secs(config.network.timeout_secs))
        .with_page_size(config.paging.page_size);
    settings.high_density_display = config.network.high_density_display;
    FetchContext::builder().settings(settings).build()
}

/// Converts the persisted configuration into catalog settings.
pub fn catalog_config(config: &Config) -> CatalogConfig {
    let defaults = CatalogConfig::default();
    CatalogConfig {
        spotify: SpotifySettings {
            client_id: config.spotify.client_id.clone(),
            client_secret: config.spotify.client_secret.clone(),
            market: config
                .spotify
                .market
                .clone()
                .unwrap_or(defaults.spotify.market),
            token_url: config
                .spotify
                .token_url
                .clone()
                .unwrap_or(defaults.spotify.token_url),
            api_base_url: config
                .spotify
                .api_base_url
                .clone()
                .unwrap_or(defaults.spotify.api_base_url),
        },
        jamendo: JamendoSettings {
            client_id: config.jamendo.client_id.clone().unwrap_or_default(),
            api_base_url: config
                .jamendo
                .api_base_url
                .clone()
                .unwrap_or(defaults.jamendo.api_base_url),
        },
    }
}

/// Which catalogs a command talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Needs {
    /// Commercial catalog.
    Spotify,
    /// Open-content catalog.
    Jamendo,
}

/// Loads configuration and builds the catalog, checking credentials first.
pub async fn open_catalog(cli: &Cli, needs: Needs) -> Result<Catalog> {
    let config = load_config(cli).await?;
    match needs {
        Needs::Spotify if !config.has_spotify_credentials() => {
            return Err(CommandError::MissingCredentials("Spotify").into());
        }
        Needs::Jamendo if config.jamendo.client_id.as_deref().is_none_or(str::is_empty) => {
            return Err(CommandError::MissingCredentials("Jamendo").into());
        }
        _ => {}
    }
    Ok(Catalog::new(build_context(&config), &catalog_config(&config)))
}
