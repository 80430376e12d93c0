//! Spotify Web API response structures and their mapping to domain models.

use serde::{Deserialize, Deserializer};

use musify_core::{Album, Artist, CatalogKind, PlaylistSummary, Track};

use crate::images::{
    DEFAULT_ALBUM_IMAGE_URL, DEFAULT_PLAYLIST_IMAGE_URL, DEFAULT_TRACK_IMAGE_URL, ImageSize,
    resolve_image,
};

// ============================================================================
// Helpers
// ============================================================================

/// Deserializes a list that may contain `null` entries, dropping them.
fn skip_nulls<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let items: Option<Vec<Option<T>>> = Option::deserialize(deserializer)?;
    Ok(items.unwrap_or_default().into_iter().flatten().collect())
}

fn join_artists(artists: &[ArtistRefDto]) -> String {
    artists
        .iter()
        .map(|a| a.name.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

// ============================================================================
// Shared Structures
// ============================================================================

/// One rendition of an image.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageDto {
    /// Image URL.
    pub url: String,
    /// Width in pixels, when known.
    pub width: Option<u32>,
    /// Height in pixels, when known.
    pub height: Option<u32>,
}

/// Picks the rendition best matching `size`.
///
/// Prefers the smallest image at least as wide as the target, then the widest
/// one below it. Images without a width are considered last.
pub fn select_image(images: &[ImageDto], size: ImageSize) -> Option<&str> {
    let target = size.pixels();
    let at_least = images
        .iter()
        .filter(|img| img.width.is_some_and(|w| w >= target))
        .min_by_key(|img| img.width);
    let below = images
        .iter()
        .filter(|img| img.width.is_some_and(|w| w < target))
        .max_by_key(|img| img.width);

    at_least
        .or(below)
        .or_else(|| images.first())
        .map(|img| img.url.as_str())
}

/// Artist reference embedded in tracks and albums.
#[derive(Debug, Clone, Deserialize)]
pub struct ArtistRefDto {
    /// Artist id.
    pub id: String,
    /// Display name.
    pub name: String,
}

/// Offset-paged list envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct PagingDto<T> {
    /// Entries in this window, `null`s removed.
    #[serde(deserialize_with = "skip_nulls", default = "Vec::new")]
    pub items: Vec<T>,
    /// Total entries across all windows.
    pub total: Option<u32>,
    /// URL of the next window.
    pub next: Option<String>,
}

impl<T> Default for PagingDto<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: None,
            next: None,
        }
    }
}

/// Public link set.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ExternalUrlsDto {
    /// Link to the Spotify web player.
    pub spotify: Option<String>,
}

// ============================================================================
// Tracks
// ============================================================================

/// A track, with album metadata when the endpoint includes it.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackDto {
    /// Track id.
    pub id: String,
    /// Title.
    pub name: String,
    /// 30-second preview, absent for many tracks.
    pub preview_url: Option<String>,
    /// Market availability, only present when a market is sent.
    pub is_playable: Option<bool>,
    /// Explicit lyrics flag.
    #[serde(default)]
    pub explicit: bool,
    /// Duration in milliseconds.
    #[serde(default)]
    pub duration_ms: u64,
    /// Performing artists.
    #[serde(default)]
    pub artists: Vec<ArtistRefDto>,
    /// Album metadata.
    pub album: Option<AlbumSummaryDto>,
    /// Public links.
    #[serde(default)]
    pub external_urls: ExternalUrlsDto,
}

impl TrackDto {
    /// Maps to a domain track. `album` supplies artwork and album name for
    /// album-scoped endpoints that omit the embedded album.
    pub fn into_track(self, size: ImageSize, album: Option<&AlbumSummaryDto>) -> Track {
        let album = self.album.as_ref().or(album);
        let image_url = resolve_image(
            [album.and_then(|a| select_image(&a.images, size))],
            DEFAULT_TRACK_IMAGE_URL,
        );
        let stream_url = if self.is_playable == Some(false) {
            None
        } else {
            self.preview_url
        };

        Track {
            artist_name: join_artists(&self.artists),
            artist_id: self.artists.first().map(|a| a.id.clone()),
            album_name: album.map(|a| a.name.clone()),
            image_url,
            stream_url,
            duration_ms: self.duration_ms,
            is_explicit: self.explicit,
            share_url: self.external_urls.spotify,
            source: CatalogKind::Spotify,
            id: self.id,
            title: self.name,
        }
    }
}

/// Entry of a playlist's track list.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistItemDto {
    /// The track, `null` for removed or local tracks.
    pub track: Option<TrackDto>,
}

/// Response of `artists/{id}/top-tracks`.
#[derive(Debug, Clone, Deserialize)]
pub struct TopTracksResponse {
    /// Most popular tracks.
    #[serde(deserialize_with = "skip_nulls", default = "Vec::new")]
    pub tracks: Vec<TrackDto>,
}

// ============================================================================
// Albums
// ============================================================================

/// Album as embedded in listings.
#[derive(Debug, Clone, Deserialize)]
pub struct AlbumSummaryDto {
    /// Album id.
    pub id: String,
    /// Title.
    pub name: String,
    /// `album`, `single` or `compilation`.
    pub album_type: Option<String>,
    /// Credited artists.
    #[serde(default)]
    pub artists: Vec<ArtistRefDto>,
    /// Cover renditions.
    #[serde(default)]
    pub images: Vec<ImageDto>,
    /// `YYYY`, `YYYY-MM` or `YYYY-MM-DD`.
    pub release_date: Option<String>,
    /// Number of tracks.
    pub total_tracks: Option<u32>,
}

impl AlbumSummaryDto {
    /// Maps to a domain album.
    pub fn to_album(&self, size: ImageSize) -> Album {
        Album {
            id: self.id.clone(),
            name: self.name.clone(),
            artist_name: join_artists(&self.artists),
            artist_id: self
                .artists
                .first()
                .map(|a| a.id.clone())
                .filter(|id| !id.is_empty()),
            image_url: resolve_image([select_image(&self.images, size)], DEFAULT_ALBUM_IMAGE_URL),
            release_year: Album::year_from_release_date(self.release_date.as_deref()),
            source: CatalogKind::Spotify,
        }
    }
}

/// Response of `albums/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct AlbumDto {
    /// Album metadata.
    #[serde(flatten)]
    pub summary: AlbumSummaryDto,
    /// First window of the track list.
    #[serde(default)]
    pub tracks: PagingDto<TrackDto>,
}

impl AlbumDto {
    /// Maps every track, inheriting the album's artwork and name.
    pub fn into_tracks(self, size: ImageSize) -> Vec<Track> {
        let summary = self.summary;
        self.tracks
            .items
            .into_iter()
            .map(|t| t.into_track(size, Some(&summary)))
            .collect()
    }
}

/// Response of `browse/new-releases`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewReleasesResponse {
    /// Album window.
    pub albums: PagingDto<AlbumSummaryDto>,
}

// ============================================================================
// Artists
// ============================================================================

/// Follower count wrapper.
#[derive(Debug, Clone, Deserialize)]
pub struct FollowersDto {
    /// Total followers.
    pub total: Option<u64>,
}

/// Full artist object.
#[derive(Debug, Clone, Deserialize)]
pub struct ArtistDto {
    /// Artist id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Portrait renditions.
    #[serde(default)]
    pub images: Vec<ImageDto>,
    /// Genre labels.
    #[serde(default)]
    pub genres: Vec<String>,
    /// Followers.
    pub followers: Option<FollowersDto>,
}

impl ArtistDto {
    /// Maps to a domain artist.
    pub fn to_artist(&self, size: ImageSize) -> Artist {
        Artist {
            id: self.id.clone(),
            name: self.name.clone(),
            image_url: select_image(&self.images, size).map(str::to_string),
            genres: self.genres.clone(),
            followers: self.followers.as_ref().and_then(|f| f.total),
            source: CatalogKind::Spotify,
        }
    }
}

// ============================================================================
// Playlists
// ============================================================================

/// Playlist owner.
#[derive(Debug, Clone, Deserialize)]
pub struct OwnerDto {
    /// Owner's public name.
    pub display_name: Option<String>,
}

/// Track count reference.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackCountDto {
    /// Number of tracks.
    pub total: Option<u32>,
}

/// Playlist as embedded in listings.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistDto {
    /// Playlist id.
    pub id: String,
    /// Title.
    pub name: String,
    /// Owner.
    pub owner: Option<OwnerDto>,
    /// Cover renditions.
    #[serde(deserialize_with = "skip_nulls", default = "Vec::new")]
    pub images: Vec<ImageDto>,
    /// Track count reference.
    pub tracks: Option<TrackCountDto>,
}

impl PlaylistDto {
    /// Maps to a domain playlist summary.
    pub fn to_summary(&self, size: ImageSize) -> PlaylistSummary {
        PlaylistSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            owner_name: self
                .owner
                .as_ref()
                .and_then(|o| o.display_name.clone())
                .unwrap_or_default(),
            image_url: resolve_image(
                [select_image(&self.images, size)],
                DEFAULT_PLAYLIST_IMAGE_URL,
            ),
            track_count: self.tracks.as_ref().and_then(|t| t.total),
            source: CatalogKind::Spotify,
        }
    }
}

// ============================================================================
// Search
// ============================================================================

/// Response of `search`. Only the requested categories are present.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SearchResponse {
    /// Matching tracks.
    pub tracks: Option<PagingDto<TrackDto>>,
    /// Matching albums.
    pub albums: Option<PagingDto<AlbumSummaryDto>>,
    /// Matching artists.
    pub artists: Option<PagingDto<ArtistDto>>,
    /// Matching playlists.
    pub playlists: Option<PagingDto<PlaylistDto>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(url: &str, width: u32) -> ImageDto {
        ImageDto {
            url: url.to_string(),
            width: Some(width),
            height: Some(width),
        }
    }

    #[test]
    fn test_select_image_by_size() {
        let images = vec![image("l", 640), image("m", 300), image("s", 64)];
        assert_eq!(select_image(&images, ImageSize::Large), Some("l"));
        assert_eq!(select_image(&images, ImageSize::Medium), Some("m"));
        assert_eq!(select_image(&images, ImageSize::Small), Some("s"));

        let small_only = vec![image("s", 64), image("t", 32)];
        assert_eq!(select_image(&small_only, ImageSize::Large), Some("s"));
        assert_eq!(select_image(&[], ImageSize::Large), None);
    }

    #[test]
    fn test_search_response_skips_nulls() {
        let json = r#"{
            "playlists": {"items": [null, {"id": "p1", "name": "Mix", "owner": {"display_name": "me"},
                "images": null, "tracks": {"total": 12}}], "total": 2, "next": null}
        }"#;
        let response: SearchResponse = serde_json::from_str(json).unwrap();
        let playlists = response.playlists.unwrap().items;
        assert_eq!(playlists.len(), 1);

        let summary = playlists[0].to_summary(ImageSize::Medium);
        assert_eq!(summary.owner_name, "me");
        assert_eq!(summary.image_url, DEFAULT_PLAYLIST_IMAGE_URL);
        assert_eq!(summary.track_count, Some(12));
        assert!(response.tracks.is_none());
    }

    #[test]
    fn test_album_tracks_inherit_artwork() {
        let json = r#"{
            "id": "a1", "name": "Album", "album_type": "album",
            "artists": [{"id": "r1", "name": "One"}, {"id": "r2", "name": "Two"}],
            "images": [{"url": "https://img/640", "width": 640, "height": 640}],
            "release_date": "2019-05-01", "total_tracks": 2,
            "tracks": {"items": [
                {"id": "t1", "name": "First", "preview_url": "https://p/1", "explicit": true,
                 "duration_ms": 1000, "artists": [{"id": "r1", "name": "One"}]},
                {"id": "t2", "name": "Second", "preview_url": null, "duration_ms": 2000,
                 "artists": [{"id": "r1", "name": "One"}]}
            ]}
        }"#;
        let album: AlbumDto = serde_json::from_str(json).unwrap();
        let mapped = album.summary.to_album(ImageSize::Large);
        assert_eq!(mapped.artist_name, "One,Two");
        assert_eq!(mapped.artist_id.as_deref(), Some("r1"));
        assert_eq!(mapped.release_year.as_deref(), Some("2019"));

        let tracks = album.into_tracks(ImageSize::Large);
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].image_url, "https://img/640");
        assert_eq!(tracks[0].album_name.as_deref(), Some("Album"));
        assert!(tracks[0].is_playable());
        assert!(tracks[0].is_explicit);
        assert!(!tracks[1].is_playable());
    }

    #[test]
    fn test_album_without_artists_has_no_artist_id() {
        let json = r#"{"id": "a", "name": "Various", "artists": [], "images": []}"#;
        let summary: AlbumSummaryDto = serde_json::from_str(json).unwrap();
        let album = summary.to_album(ImageSize::Medium);
        assert_eq!(album.artist_id, None);
        assert_eq!(album.image_url, DEFAULT_ALBUM_IMAGE_URL);
    }

    #[test]
    fn test_paging_envelope_of_generic_items() {
        let json = r#"{"items": [{"id": "r1", "name": "One"}, null], "total": 2, "next": null}"#;
        let page: PagingDto<ArtistRefDto> = serde_json::from_str(json).unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total, Some(2));
    }

    #[test]
    fn test_unplayable_market_drops_stream() {
        let json = r#"{"id": "t", "name": "T", "preview_url": "https://p", "is_playable": false}"#;
        let track: TrackDto = serde_json::from_str(json).unwrap();
        let track = track.into_track(ImageSize::Medium, None);
        assert!(track.stream_url.is_none());
        assert_eq!(track.image_url, DEFAULT_TRACK_IMAGE_URL);
    }
}
