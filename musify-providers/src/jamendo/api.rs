//! Jamendo API v3 client.
//!
//! Every call carries `client_id`. A request fails when the HTTP status is not
//! a success, and also when the status block reports a non-zero code.
//!
//! # Endpoints
//!
//! ```text
//! GET /v3.0/albums?order=releasedate_desc&offset=..&limit=..
//! GET /v3.0/albums?tags=..&offset=..&limit=..
//! GET /v3.0/albums/tracks?id=..&order=track_position_asc
//! GET /v3.0/playlists?tags=..&offset=..&limit=..
//! GET /v3.0/playlists/tracks?id=..&order=track_position_asc&offset=..&limit=..
//! GET /v3.0/tracks?artist_id=..&limit=..
//! GET /v3.0/tracks?id=..
//! ```

use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, instrument};

use musify_fetch::{FetchError, HttpClient};

use super::dto::{
    JamendoAlbum, JamendoAlbumWithTracks, JamendoPlaylist, JamendoPlaylistWithTracks,
    JamendoResponse, JamendoTrack,
};
use crate::images::ImageSize;

// ============================================================================
// Constants
// ============================================================================

/// Base URL of the API.
pub const API_BASE_URL: &str = "https://api.jamendo.com/v3.0";

/// Audio encoding requested for stream URLs.
const AUDIO_FORMAT: &str = "mp32";

/// Track types included in playlist listings.
const PLAYLIST_TRACK_TYPES: &str = "single albumtrack";

/// Upper bound of tracks returned for one album.
pub const ALBUM_TRACK_LIMIT: u32 = 200;

// ============================================================================
// API Client
// ============================================================================

/// Jamendo API client.
#[derive(Debug, Clone)]
pub struct JamendoApiClient {
    http: Arc<HttpClient>,
    base_url: String,
    client_id: String,
    image_size: ImageSize,
}

impl JamendoApiClient {
    /// Creates a client against the public API.
    pub fn new(http: Arc<HttpClient>, client_id: impl Into<String>) -> Self {
        Self {
            http,
            base_url: API_BASE_URL.to_string(),
            client_id: client_id.into(),
            image_size: ImageSize::default(),
        }
    }

    /// Overrides the base URL (for testing).
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the artwork resolution class.
    #[must_use]
    pub fn with_image_size(mut self, size: ImageSize) -> Self {
        self.image_size = size;
        self
    }

    /// Artwork width requested from the API, 600 or 300.
    pub fn image_width(&self) -> u32 {
        match self.image_size {
            ImageSize::Large => ImageSize::Large.pixels(),
            ImageSize::Small | ImageSize::Medium => ImageSize::Medium.pixels(),
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        mut query: Vec<(&str, String)>,
    ) -> Result<Vec<T>, FetchError> {
        let url = format!("{}/{}", self.base_url, path);
        query.push(("client_id", self.client_id.clone()));
        query.push(("format", "json".to_string()));
        query.push(("imagesize", self.image_width().to_string()));

        let response: JamendoResponse<T> = self.http.get_json(&url, &query, None).await?;
        let results = response.into_results()?;
        debug!(count = results.len(), "Jamendo results");
        Ok(results)
    }

    /// Fetches one window of the newest albums.
    #[instrument(skip(self))]
    pub async fn new_albums(&self, offset: u32, limit: u32) -> Result<Vec<JamendoAlbum>, FetchError> {
        self.get(
            "albums",
            vec![
                ("order", "releasedate_desc".to_string()),
                ("offset", offset.to_string()),
                ("limit", limit.to_string()),
                ("audioformat", AUDIO_FORMAT.to_string()),
            ],
        )
        .await
    }

    /// Fetches one window of albums carrying `tag`.
    #[instrument(skip(self))]
    pub async fn albums_by_tag(
        &self,
        tag: &str,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<JamendoAlbum>, FetchError> {
        self.get(
            "albums",
            vec![
                ("tags", tag.to_string()),
                ("offset", offset.to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }

    /// Fetches an album with its tracks.
    #[instrument(skip(self))]
    pub async fn album_tracks(&self, album_id: &str) -> Result<Vec<JamendoAlbumWithTracks>, FetchError> {
        self.get(
            "albums/tracks",
            vec![
                ("id", album_id.to_string()),
                ("order", "track_position_asc".to_string()),
                ("offset", "0".to_string()),
                ("limit", ALBUM_TRACK_LIMIT.to_string()),
                ("audioformat", AUDIO_FORMAT.to_string()),
            ],
        )
        .await
    }

    /// Fetches one window of playlists carrying `tag`.
    #[instrument(skip(self))]
    pub async fn playlists_by_tag(
        &self,
        tag: &str,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<JamendoPlaylist>, FetchError> {
        self.get(
            "playlists",
            vec![
                ("tags", tag.to_string()),
                ("offset", offset.to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }

    /// Fetches one window of a playlist's tracks.
    #[instrument(skip(self))]
    pub async fn playlist_tracks(
        &self,
        playlist_id: &str,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<JamendoPlaylistWithTracks>, FetchError> {
        self.get(
            "playlists/tracks",
            vec![
                ("id", playlist_id.to_string()),
                ("order", "track_position_asc".to_string()),
                ("offset", offset.to_string()),
                ("limit", limit.to_string()),
                ("audioformat", AUDIO_FORMAT.to_string()),
                ("track_type", PLAYLIST_TRACK_TYPES.to_string()),
            ],
        )
        .await
    }

    /// Fetches up to `limit` tracks of an artist.
    #[instrument(skip(self))]
    pub async fn artist_tracks(&self, artist_id: &str, limit: u32) -> Result<Vec<JamendoTrack>, FetchError> {
        self.get(
            "tracks",
            vec![
                ("artist_id", artist_id.to_string()),
                ("limit", limit.to_string()),
                ("audioformat", AUDIO_FORMAT.to_string()),
            ],
        )
        .await
    }

    /// Fetches a single track, or `None` if the id is unknown.
    #[instrument(skip(self))]
    pub async fn track(&self, track_id: &str) -> Result<Option<JamendoTrack>, FetchError> {
        let tracks: Vec<JamendoTrack> = self
            .get(
                "tracks",
                vec![
                    ("id", track_id.to_string()),
                    ("audioformat", AUDIO_FORMAT.to_string()),
                ],
            )
            .await?;
        Ok(tracks.into_iter().next())
    }
}
