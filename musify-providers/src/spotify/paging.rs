//! Spotify endpoints exposed as offset page providers.
//!
//! Every provider requires a bearer token. Search results are split per
//! category so each paged stream carries a single item type.

use async_trait::async_trait;
use std::marker::PhantomData;
use std::sync::Arc;

use musify_core::{Album, Artist, PlaylistSummary, Track};
use musify_fetch::{AuthError, BearerToken, FetchError, PageProvider};

use super::api::{SearchType, SpotifyApiClient};
use super::dto::{
    AlbumSummaryDto, ArtistDto, PlaylistDto, PlaylistItemDto, SearchResponse, TrackDto,
};
use crate::images::ImageSize;

fn require(token: Option<&BearerToken>) -> Result<&BearerToken, FetchError> {
    token.ok_or(FetchError::Credential(AuthError::NotConfigured))
}

// ============================================================================
// Search
// ============================================================================

/// One category of search results.
pub trait SearchCategory: Send + Sync + 'static {
    /// Raw entry type.
    type Raw: Send;
    /// Domain item type.
    type Item: Send + Sync + 'static;

    /// Category sent as the `type` parameter.
    const KIND: SearchType;

    /// Takes this category's entries out of a response.
    fn extract(response: SearchResponse) -> Vec<Self::Raw>;

    /// Maps one entry.
    fn map(raw: Self::Raw, size: ImageSize) -> Option<Self::Item>;
}

/// Track search results.
pub struct Tracks;
/// Album search results.
pub struct Albums;
/// Artist search results.
pub struct Artists;
/// Playlist search results.
pub struct Playlists;

impl SearchCategory for Tracks {
    type Raw = TrackDto;
    type Item = Track;
    const KIND: SearchType = SearchType::Track;

    fn extract(response: SearchResponse) -> Vec<TrackDto> {
        response.tracks.map(|p| p.items).unwrap_or_default()
    }

    fn map(raw: TrackDto, size: ImageSize) -> Option<Track> {
        Some(raw.into_track(size, None))
    }
}

impl SearchCategory for Albums {
    type Raw = AlbumSummaryDto;
    type Item = Album;
    const KIND: SearchType = SearchType::Album;

    fn extract(response: SearchResponse) -> Vec<AlbumSummaryDto> {
        response.albums.map(|p| p.items).unwrap_or_default()
    }

    fn map(raw: AlbumSummaryDto, size: ImageSize) -> Option<Album> {
        Some(raw.to_album(size))
    }
}

impl SearchCategory for Artists {
    type Raw = ArtistDto;
    type Item = Artist;
    const KIND: SearchType = SearchType::Artist;

    fn extract(response: SearchResponse) -> Vec<ArtistDto> {
        response.artists.map(|p| p.items).unwrap_or_default()
    }

    fn map(raw: ArtistDto, size: ImageSize) -> Option<Artist> {
        Some(raw.to_artist(size))
    }
}

impl SearchCategory for Playlists {
    type Raw = PlaylistDto;
    type Item = PlaylistSummary;
    const KIND: SearchType = SearchType::Playlist;

    fn extract(response: SearchResponse) -> Vec<PlaylistDto> {
        response.playlists.map(|p| p.items).unwrap_or_default()
    }

    fn map(raw: PlaylistDto, size: ImageSize) -> Option<PlaylistSummary> {
        Some(raw.to_summary(size))
    }
}

/// Paged search over a single category.
pub struct SearchPages<C> {
    api: Arc<SpotifyApiClient>,
    query: String,
    _category: PhantomData<fn() -> C>,
}

impl<C: SearchCategory> SearchPages<C> {
    /// Creates a provider for `query`.
    pub fn new(api: Arc<SpotifyApiClient>, query: impl Into<String>) -> Self {
        Self {
            api,
            query: query.into(),
            _category: PhantomData,
        }
    }
}

#[async_trait]
impl<C: SearchCategory> PageProvider for SearchPages<C> {
    type Raw = C::Raw;
    type Item = C::Item;

    fn name(&self) -> &'static str {
        "spotify-search"
    }

    fn requires_auth(&self) -> bool {
        true
    }

    async fn fetch_page(
        &self,
        token: Option<&BearerToken>,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<C::Raw>, FetchError> {
        let response = self
            .api
            .search(require(token)?, &self.query, &[C::KIND], offset, limit)
            .await?;
        Ok(C::extract(response))
    }

    fn map_item(&self, raw: C::Raw) -> Option<C::Item> {
        C::map(raw, self.api.image_size())
    }
}

// ============================================================================
// Artist Albums
// ============================================================================

/// Paged discography of one artist.
pub struct ArtistAlbumPages {
    api: Arc<SpotifyApiClient>,
    artist_id: String,
}

impl ArtistAlbumPages {
    /// Creates a provider for `artist_id`.
    pub fn new(api: Arc<SpotifyApiClient>, artist_id: impl Into<String>) -> Self {
        Self {
            api,
            artist_id: artist_id.into(),
        }
    }
}

#[async_trait]
impl PageProvider for ArtistAlbumPages {
    type Raw = AlbumSummaryDto;
    type Item = Album;

    fn name(&self) -> &'static str {
        "spotify-artist-albums"
    }

    fn requires_auth(&self) -> bool {
        true
    }

    async fn fetch_page(
        &self,
        token: Option<&BearerToken>,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<AlbumSummaryDto>, FetchError> {
        let page = self
            .api
            .artist_albums(require(token)?, &self.artist_id, offset, limit)
            .await?;
        Ok(page.items)
    }

    fn map_item(&self, raw: AlbumSummaryDto) -> Option<Album> {
        Some(raw.to_album(self.api.image_size()))
    }
}

// ============================================================================
// Playlist Tracks
// ============================================================================

/// Paged track list of one playlist. Entries without a playable preview are
/// dropped.
pub struct PlaylistTrackPages {
    api: Arc<SpotifyApiClient>,
    playlist_id: String,
}

impl PlaylistTrackPages {
    /// Creates a provider for `playlist_id`.
    pub fn new(api: Arc<SpotifyApiClient>, playlist_id: impl Into<String>) -> Self {
        Self {
            api,
            playlist_id: playlist_id.into(),
        }
    }
}

#[async_trait]
impl PageProvider for PlaylistTrackPages {
    type Raw = PlaylistItemDto;
    type Item = Track;

    fn name(&self) -> &'static str {
        "spotify-playlist-tracks"
    }

    fn requires_auth(&self) -> bool {
        true
    }

    async fn fetch_page(
        &self,
        token: Option<&BearerToken>,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<PlaylistItemDto>, FetchError> {
        let page = self
            .api
            .playlist_tracks(require(token)?, &self.playlist_id, offset, limit)
            .await?;
        Ok(page.items)
    }

    fn map_item(&self, raw: PlaylistItemDto) -> Option<Track> {
        raw.track
            .map(|t| t.into_track(self.api.image_size(), None))
            .filter(Track::is_playable)
    }
}
