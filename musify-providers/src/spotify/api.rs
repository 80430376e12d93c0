//! Spotify Web API client.
//!
//! Every call carries `Authorization: Bearer <token>`. Failures are signalled
//! by HTTP status alone, with a JSON error body whose message is surfaced.
//!
//! # Endpoints
//!
//! ```text
//! GET /v1/search?q=..&type=track,album&market=..&limit=..&offset=..
//! GET /v1/artists/{id}
//! GET /v1/artists/{id}/albums?market=..&include_groups=album,single&limit=..&offset=..
//! GET /v1/artists/{id}/top-tracks?market=..
//! GET /v1/albums/{id}?market=..
//! GET /v1/playlists/{id}/tracks?market=..&limit=..&offset=..
//! GET /v1/browse/new-releases?country=..&limit=..&offset=..
//! ```

use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument};

use musify_fetch::{BearerToken, FetchError, HttpClient};

use super::dto::{
    AlbumDto, AlbumSummaryDto, ArtistDto, NewReleasesResponse, PagingDto, PlaylistItemDto,
    SearchResponse, TopTracksResponse,
};
use super::error::refine;
use crate::images::ImageSize;

// ============================================================================
// Constants
// ============================================================================

/// Base URL of the Web API.
pub const API_BASE_URL: &str = "https://api.spotify.com/v1";

/// Token endpoint for the client-credentials flow.
pub const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Market used when none is configured.
pub const DEFAULT_MARKET: &str = "US";

/// Album groups requested for artist discographies.
const ARTIST_ALBUM_GROUPS: &str = "album,single";

// ============================================================================
// Search Types
// ============================================================================

/// Category of a search query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchType {
    /// Tracks.
    Track,
    /// Albums.
    Album,
    /// Artists.
    Artist,
    /// Playlists.
    Playlist,
}

impl SearchType {
    /// Every category.
    pub const ALL: [SearchType; 4] = [Self::Track, Self::Album, Self::Artist, Self::Playlist];

    /// Value for the `type` query parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Track => "track",
            Self::Album => "album",
            Self::Artist => "artist",
            Self::Playlist => "playlist",
        }
    }

    /// Joins categories for a single query.
    pub fn join(types: &[SearchType]) -> String {
        types
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// API Client
// ============================================================================

/// Spotify Web API client.
#[derive(Debug, Clone)]
pub struct SpotifyApiClient {
    http: Arc<HttpClient>,
    base_url: String,
    market: String,
    image_size: ImageSize,
}

impl SpotifyApiClient {
    /// Creates a client against the public API.
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self {
            http,
            base_url: API_BASE_URL.to_string(),
            market: DEFAULT_MARKET.to_string(),
            image_size: ImageSize::default(),
        }
    }

    /// Overrides the base URL (for testing).
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the market used for availability and previews.
    #[must_use]
    pub fn with_market(mut self, market: impl Into<String>) -> Self {
        self.market = market.into();
        self
    }

    /// Sets the artwork resolution class.
    #[must_use]
    pub fn with_image_size(mut self, size: ImageSize) -> Self {
        self.image_size = size;
        self
    }

    /// Market code sent with requests.
    pub fn market(&self) -> &str {
        &self.market
    }

    /// Artwork resolution class.
    pub fn image_size(&self) -> ImageSize {
        self.image_size
    }

    async fn get<T: DeserializeOwned>(
        &self,
        token: &BearerToken,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let url = format!("{}/{}", self.base_url, path);
        self.http
            .get_json(&url, query, Some(&token.header_value()))
            .await
            .map_err(refine)
    }

    /// Searches the catalog.
    #[instrument(skip(self, token), fields(types = %SearchType::join(types)))]
    pub async fn search(
        &self,
        token: &BearerToken,
        query: &str,
        types: &[SearchType],
        offset: u32,
        limit: u32,
    ) -> Result<SearchResponse, FetchError> {
        debug!("Searching Spotify");
        self.get(
            token,
            "search",
            &[
                ("q", query.to_string()),
                ("type", SearchType::join(types)),
                ("market", self.market.clone()),
                ("limit", limit.to_string()),
                ("offset", offset.to_string()),
            ],
        )
        .await
    }

    /// Fetches an artist.
    #[instrument(skip(self, token))]
    pub async fn artist(&self, token: &BearerToken, artist_id: &str) -> Result<ArtistDto, FetchError> {
        self.get(token, &format!("artists/{artist_id}"), &[]).await
    }

    /// Fetches one window of an artist's albums and singles.
    #[instrument(skip(self, token))]
    pub async fn artist_albums(
        &self,
        token: &BearerToken,
        artist_id: &str,
        offset: u32,
        limit: u32,
    ) -> Result<PagingDto<AlbumSummaryDto>, FetchError> {
        self.get(
            token,
            &format!("artists/{artist_id}/albums"),
            &[
                ("market", self.market.clone()),
                ("include_groups", ARTIST_ALBUM_GROUPS.to_string()),
                ("limit", limit.to_string()),
                ("offset", offset.to_string()),
            ],
        )
        .await
    }

    /// Fetches an artist's most popular tracks.
    #[instrument(skip(self, token))]
    pub async fn top_tracks(
        &self,
        token: &BearerToken,
        artist_id: &str,
    ) -> Result<TopTracksResponse, FetchError> {
        self.get(
            token,
            &format!("artists/{artist_id}/top-tracks"),
            &[("market", self.market.clone())],
        )
        .await
    }

    /// Fetches an album with its first window of tracks.
    #[instrument(skip(self, token))]
    pub async fn album(&self, token: &BearerToken, album_id: &str) -> Result<AlbumDto, FetchError> {
        self.get(
            token,
            &format!("albums/{album_id}"),
            &[("market", self.market.clone())],
        )
        .await
    }

    /// Fetches one window of a playlist's tracks.
    #[instrument(skip(self, token))]
    pub async fn playlist_tracks(
        &self,
        token: &BearerToken,
        playlist_id: &str,
        offset: u32,
        limit: u32,
    ) -> Result<PagingDto<PlaylistItemDto>, FetchError> {
        self.get(
            token,
            &format!("playlists/{playlist_id}/tracks"),
            &[
                ("market", self.market.clone()),
                ("limit", limit.to_string()),
                ("offset", offset.to_string()),
            ],
        )
        .await
    }

    /// Fetches one window of new album releases.
    #[instrument(skip(self, token))]
    pub async fn new_releases(
        &self,
        token: &BearerToken,
        offset: u32,
        limit: u32,
    ) -> Result<NewReleasesResponse, FetchError> {
        self.get(
            token,
            "browse/new-releases",
            &[
                ("country", self.market.clone()),
                ("limit", limit.to_string()),
                ("offset", offset.to_string()),
            ],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn token() -> BearerToken {
        BearerToken::new("tok", Utc::now(), 3600, None)
    }

    fn client(server: &MockServer) -> SpotifyApiClient {
        SpotifyApiClient::new(Arc::new(HttpClient::new()))
            .with_base_url(server.uri())
            .with_market("SE")
    }

    #[test]
    fn test_search_type_join() {
        assert_eq!(SearchType::join(&SearchType::ALL), "track,album,artist,playlist");
        assert_eq!(SearchType::Album.to_string(), "album");
    }

    #[tokio::test]
    async fn test_search_sends_bearer_and_params() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(header("authorization", "Bearer tok"))
            .and(query_param("q", "daft punk"))
            .and(query_param("type", "album"))
            .and(query_param("market", "SE"))
            .and(query_param("offset", "20"))
            .and(query_param("limit", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"albums": {"items": [{"id": "a", "name": "Discovery", "artists": [], "images": []}]}}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let response = client(&server)
            .search(&token(), "daft punk", &[SearchType::Album], 20, 10)
            .await
            .unwrap();
        assert_eq!(response.albums.unwrap().items[0].name, "Discovery");
    }

    #[tokio::test]
    async fn test_status_error_carries_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/artists/x"))
            .respond_with(ResponseTemplate::new(404).set_body_string(
                r#"{"error": {"status": 404, "message": "Resource not found"}}"#,
            ))
            .mount(&server)
            .await;

        let err = client(&server).artist(&token(), "x").await.unwrap_err();
        assert!(
            matches!(err, FetchError::Status { status: 404, ref message } if message == "Resource not found")
        );
        assert_eq!(err.kind(), musify_core::ErrorKind::NetworkError);
    }
}
