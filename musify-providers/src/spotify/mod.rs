//! Spotify catalog adapter.
//!
//! Authenticates with the client-credentials flow and reads the Web API with
//! a bearer token. Errors come from the HTTP status.

pub mod api;
pub mod dto;
mod error;
pub mod paging;

use std::sync::Arc;

use musify_fetch::{CachingTokenRepository, HttpClient, HttpTokenIssuer, TokenGrant};

pub use api::{API_BASE_URL, DEFAULT_MARKET, SearchType, SpotifyApiClient, TOKEN_URL};
pub use paging::{ArtistAlbumPages, PlaylistTrackPages, SearchCategory, SearchPages};

/// Builds the shared client-credentials token repository.
pub fn token_repository(
    http: Arc<HttpClient>,
    token_url: &str,
    client_id: &str,
    client_secret: &str,
) -> CachingTokenRepository {
    let issuer = HttpTokenIssuer::with_client_credentials(http, token_url, client_id, client_secret);
    CachingTokenRepository::new(Arc::new(issuer), TokenGrant::ClientCredentials)
}
