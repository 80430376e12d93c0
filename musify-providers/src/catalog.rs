//! Composition root wiring both catalogs into the repository facades.
//!
//! One [`Catalog`] is built per process. It owns the single credential cache
//! shared by every Spotify facade and pager.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use musify_fetch::{AuthError, BearerToken, FetchContext, TokenRepository, host_of};

use crate::images::ImageSize;
use crate::jamendo::{self, JamendoApiClient};
use crate::repositories::{
    AlbumsRepository, ArtistsRepository, HomeFeedRepository, SearchRepository, TracksRepository,
};
use crate::spotify::{self, SpotifyApiClient};

// ============================================================================
// Configuration
// ============================================================================

/// Spotify connection settings.
#[derive(Clone, PartialEq, Eq)]
pub struct SpotifySettings {
    /// OAuth client id.
    pub client_id: Option<String>,
    /// OAuth client secret.
    pub client_secret: Option<String>,
    /// Market code for availability.
    pub market: String,
    /// Token endpoint.
    pub token_url: String,
    /// Web API base URL.
    pub api_base_url: String,
}

impl Default for SpotifySettings {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            market: spotify::DEFAULT_MARKET.to_string(),
            token_url: spotify::TOKEN_URL.to_string(),
            api_base_url: spotify::API_BASE_URL.to_string(),
        }
    }
}

impl std::fmt::Debug for SpotifySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpotifySettings")
            .field("client_id", &self.client_id)
            .field("market", &self.market)
            .field("token_url", &self.token_url)
            .field("api_base_url", &self.api_base_url)
            .finish_non_exhaustive()
    }
}

/// Jamendo connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JamendoSettings {
    /// API client id.
    pub client_id: String,
    /// API base URL.
    pub api_base_url: String,
}

impl Default for JamendoSettings {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            api_base_url: jamendo::API_BASE_URL.to_string(),
        }
    }
}

/// Settings for both catalogs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Commercial catalog.
    pub spotify: SpotifySettings,
    /// Open-content catalog.
    pub jamendo: JamendoSettings,
}

impl CatalogConfig {
    /// Hosts of every configured endpoint. Requests elsewhere are refused.
    pub fn allowed_domains(&self) -> Vec<String> {
        let mut hosts: Vec<String> = [
            self.spotify.token_url.as_str(),
            self.spotify.api_base_url.as_str(),
            self.jamendo.api_base_url.as_str(),
        ]
        .into_iter()
        .filter_map(host_of)
        .collect();
        hosts.sort();
        hosts.dedup();
        hosts
    }

    /// Narrows `ctx` to a client that only reaches the configured hosts.
    fn restrict(&self, mut ctx: FetchContext) -> FetchContext {
        let http = ctx.http.as_ref().clone().with_allowed_domains(self.allowed_domains());
        ctx.http = Arc::new(http);
        ctx
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// Stand-in credential source used when no Spotify credentials are set.
struct MissingCredentials;

#[async_trait]
impl TokenRepository for MissingCredentials {
    async fn get_valid_bearer_token(&self) -> Result<BearerToken, AuthError> {
        Err(AuthError::NotConfigured)
    }

    async fn invalidate(&self) {}
}

/// All facades, sharing one context and one credential cache.
#[derive(Clone)]
pub struct Catalog {
    /// Shared credential cache.
    pub tokens: Arc<dyn TokenRepository>,
    /// Track listings.
    pub tracks: TracksRepository,
    /// Browse feed.
    pub home_feed: HomeFeedRepository,
    /// Search.
    pub search: SearchRepository,
    /// Albums.
    pub albums: AlbumsRepository,
    /// Artists.
    pub artists: ArtistsRepository,
}

impl Catalog {
    /// Builds the catalog, creating the Spotify credential cache from the
    /// configured client credentials.
    pub fn new(ctx: FetchContext, config: &CatalogConfig) -> Self {
        let ctx = config.restrict(ctx);
        let tokens: Arc<dyn TokenRepository> = match (
            config.spotify.client_id.as_deref(),
            config.spotify.client_secret.as_deref(),
        ) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => {
                Arc::new(spotify::token_repository(
                    Arc::clone(&ctx.http),
                    &config.spotify.token_url,
                    id,
                    secret,
                ))
            }
            _ => {
                debug!("Spotify credentials not configured");
                Arc::new(MissingCredentials)
            }
        };
        Self::assemble(ctx, config, tokens)
    }

    /// Builds the catalog around an existing credential source.
    pub fn with_tokens(
        ctx: FetchContext,
        config: &CatalogConfig,
        tokens: Arc<dyn TokenRepository>,
    ) -> Self {
        Self::assemble(config.restrict(ctx), config, tokens)
    }

    fn assemble(
        ctx: FetchContext,
        config: &CatalogConfig,
        tokens: Arc<dyn TokenRepository>,
    ) -> Self {
        let size = ImageSize::for_display(ctx.settings.high_density_display);

        let spotify = Arc::new(
            SpotifyApiClient::new(Arc::clone(&ctx.http))
                .with_base_url(config.spotify.api_base_url.as_str())
                .with_market(config.spotify.market.as_str())
                .with_image_size(size),
        );
        let jamendo = Arc::new(
            JamendoApiClient::new(Arc::clone(&ctx.http), config.jamendo.client_id.as_str())
                .with_base_url(config.jamendo.api_base_url.as_str())
                .with_image_size(size),
        );

        Self {
            tracks: TracksRepository::new(ctx.clone(), Arc::clone(&jamendo)),
            home_feed: HomeFeedRepository::new(ctx.clone(), jamendo),
            search: SearchRepository::new(ctx.clone(), Arc::clone(&tokens), Arc::clone(&spotify)),
            albums: AlbumsRepository::new(ctx.clone(), Arc::clone(&tokens), Arc::clone(&spotify)),
            artists: ArtistsRepository::new(ctx, Arc::clone(&tokens), spotify),
            tokens,
        }
    }
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("tracks", &self.tracks)
            .field("home_feed", &self.home_feed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use musify_core::ErrorKind;
    use musify_fetch::StaticConnectivity;

    #[tokio::test]
    async fn test_missing_credentials_fail_search() {
        let ctx = FetchContext::builder()
            .connectivity(Arc::new(StaticConnectivity::online()))
            .build();
        let catalog = Catalog::new(ctx, &CatalogConfig::default());

        let result = catalog.search.fetch_search_results("anything", 5).await;
        assert_eq!(result.cause(), Some(&ErrorKind::UnknownError));
        assert_eq!(result.data().map(musify_core::SearchResults::is_empty), Some(true));
    }

    #[test]
    fn test_allowed_domains_follow_endpoints() {
        assert_eq!(
            CatalogConfig::default().allowed_domains(),
            vec!["accounts.spotify.com", "api.jamendo.com", "api.spotify.com"]
        );

        let config = CatalogConfig {
            jamendo: JamendoSettings {
                client_id: "cid".to_string(),
                api_base_url: "http://127.0.0.1:9000/v3.0".to_string(),
            },
            ..CatalogConfig::default()
        };
        assert!(config.allowed_domains().contains(&"127.0.0.1".to_string()));
        assert!(!config.allowed_domains().contains(&"api.jamendo.com".to_string()));
    }

    #[tokio::test]
    async fn test_restricted_client_refuses_other_hosts() {
        let ctx = CatalogConfig::default().restrict(FetchContext::new());

        let err = ctx
            .http
            .get_json::<serde_json::Value>("https://tracker.example/collect", &[], None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            musify_fetch::FetchError::Http(musify_fetch::HttpError::DomainNotAllowed(_))
        ));
    }

    #[test]
    fn test_settings_debug_hides_secret() {
        let settings = SpotifySettings {
            client_secret: Some("hunter2".to_string()),
            ..SpotifySettings::default()
        };
        assert!(!format!("{settings:?}").contains("hunter2"));
    }
}
