//! Jamendo endpoints exposed as page providers and item lookups.

use async_trait::async_trait;
use std::sync::Arc;

use musify_core::{Album, GenreType, Track};
use musify_fetch::{BearerToken, FetchError, ItemLookup, PageProvider};

use super::api::JamendoApiClient;
use super::dto::{JamendoAlbum, JamendoTrack};

// ============================================================================
// Playlist Tracks
// ============================================================================

/// Paged track list of one playlist.
///
/// The endpoint returns playlists with nested tracks, which are flattened.
/// Tracks without a stream URL are dropped after paging decisions are made.
pub struct PlaylistTrackPages {
    api: Arc<JamendoApiClient>,
    playlist_id: String,
}

impl PlaylistTrackPages {
    /// Creates a provider for `playlist_id`.
    pub fn new(api: Arc<JamendoApiClient>, playlist_id: impl Into<String>) -> Self {
        Self {
            api,
            playlist_id: playlist_id.into(),
        }
    }
}

#[async_trait]
impl PageProvider for PlaylistTrackPages {
    type Raw = JamendoTrack;
    type Item = Track;

    fn name(&self) -> &'static str {
        "jamendo-playlist-tracks"
    }

    async fn fetch_page(
        &self,
        _token: Option<&BearerToken>,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<JamendoTrack>, FetchError> {
        let playlists = self
            .api
            .playlist_tracks(&self.playlist_id, offset, limit)
            .await?;
        Ok(playlists.into_iter().flat_map(|p| p.tracks).collect())
    }

    fn map_item(&self, raw: JamendoTrack) -> Option<Track> {
        raw.has_audio().then(|| raw.into_track(None, None))
    }
}

// ============================================================================
// Albums
// ============================================================================

/// Which album listing to page through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlbumListing {
    /// Newest releases first.
    NewReleases,
    /// Albums tagged with a genre.
    Genre(GenreType),
}

/// Paged album listing.
pub struct AlbumPages {
    api: Arc<JamendoApiClient>,
    listing: AlbumListing,
}

impl AlbumPages {
    /// Creates a provider for `listing`.
    pub fn new(api: Arc<JamendoApiClient>, listing: AlbumListing) -> Self {
        Self { api, listing }
    }
}

#[async_trait]
impl PageProvider for AlbumPages {
    type Raw = JamendoAlbum;
    type Item = Album;

    fn name(&self) -> &'static str {
        match self.listing {
            AlbumListing::NewReleases => "jamendo-new-albums",
            AlbumListing::Genre(_) => "jamendo-genre-albums",
        }
    }

    async fn fetch_page(
        &self,
        _token: Option<&BearerToken>,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<JamendoAlbum>, FetchError> {
        match self.listing {
            AlbumListing::NewReleases => self.api.new_albums(offset, limit).await,
            AlbumListing::Genre(genre) => self.api.albums_by_tag(genre.tag(), offset, limit).await,
        }
    }

    fn map_item(&self, raw: JamendoAlbum) -> Option<Album> {
        Some(raw.to_album(self.api.image_width()))
    }
}

// ============================================================================
// Track Lookup
// ============================================================================

/// Resolves Jamendo track ids one at a time.
pub struct TrackLookup {
    api: Arc<JamendoApiClient>,
}

impl TrackLookup {
    /// Creates a lookup.
    pub fn new(api: Arc<JamendoApiClient>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ItemLookup for TrackLookup {
    type Item = Track;

    fn name(&self) -> &'static str {
        "jamendo-track"
    }

    async fn fetch_item(
        &self,
        _token: Option<&BearerToken>,
        id: &str,
    ) -> Result<Option<Track>, FetchError> {
        Ok(self.api.track(id).await?.map(|t| t.into_track(None, None)))
    }
}
