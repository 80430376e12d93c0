//! Jamendo API v3 response structures.
//!
//! Every response is an envelope `{"headers": {...}, "results": [...]}`. The
//! HTTP status is 200 even for rejected requests; success requires
//! `headers.code == 0`.

use serde::Deserialize;

use musify_core::{Album, CatalogKind, PlaylistSummary, Track};
use musify_fetch::FetchError;

use crate::images::{
    DEFAULT_ALBUM_IMAGE_URL, DEFAULT_PLAYLIST_IMAGE_URL, DEFAULT_TRACK_IMAGE_URL, resolve_image,
};

/// Owner shown for playlists without a user name.
pub const DEFAULT_OWNER_NAME: &str = "Jamendo Community";

/// Base of the generated placeholder artwork.
const PLACEHOLDER_BASE_URL: &str = "https://usercontent.jamendo.com";

/// Generated placeholder artwork for an entity.
pub fn placeholder_url(kind: &str, id: &str, width: u32) -> String {
    format!("{PLACEHOLDER_BASE_URL}?type={kind}&id={id}&width={width}")
}

// ============================================================================
// Envelope
// ============================================================================

/// Status block of every response.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct JamendoHeaders {
    /// `success` or `failed`.
    pub status: Option<String>,
    /// Zero on success.
    pub code: Option<i64>,
    /// Human readable reason on failure.
    #[serde(default)]
    pub error_message: Option<String>,
    /// Non-fatal notices.
    #[serde(default)]
    pub warnings: Option<String>,
    /// Number of entries in `results`.
    pub results_count: Option<u32>,
}

impl JamendoHeaders {
    /// Fails unless the provider reported code 0.
    pub fn check(&self) -> Result<(), FetchError> {
        match self.code {
            Some(0) => Ok(()),
            code => Err(FetchError::Api {
                code: code.unwrap_or(-1),
                message: self
                    .error_message
                    .clone()
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| "Jamendo request failed".to_string()),
            }),
        }
    }
}

/// Response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct JamendoResponse<T> {
    /// Status block.
    pub headers: JamendoHeaders,
    /// Entries.
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

impl<T> JamendoResponse<T> {
    /// Returns the results after checking the status block.
    pub fn into_results(self) -> Result<Vec<T>, FetchError> {
        self.headers.check()?;
        Ok(self.results)
    }
}

// ============================================================================
// Tracks
// ============================================================================

/// A track.
#[derive(Debug, Clone, Deserialize)]
pub struct JamendoTrack {
    /// Track id.
    pub id: String,
    /// Title.
    pub name: String,
    /// Duration in seconds.
    pub duration: Option<u64>,
    /// Position within the album or playlist.
    pub position: Option<String>,
    /// Artist id.
    pub artist_id: Option<String>,
    /// Artist name.
    pub artist_name: Option<String>,
    /// Album name, on `tracks` responses.
    pub album_name: Option<String>,
    /// Stream URL.
    #[serde(default)]
    pub audio: Option<String>,
    /// Track artwork.
    pub image: Option<String>,
    /// Album artwork.
    pub album_image: Option<String>,
    /// Public page.
    pub shareurl: Option<String>,
    /// Short public link.
    pub shorturl: Option<String>,
    /// Whether downloads are allowed.
    #[serde(default)]
    pub audiodownload_allowed: bool,
}

impl JamendoTrack {
    /// True when the track has a stream URL.
    pub fn has_audio(&self) -> bool {
        self.audio.as_deref().is_some_and(|u| !u.trim().is_empty())
    }

    /// Maps to a domain track.
    ///
    /// Artwork falls back from the track image to `album_image`, then to the
    /// parent's artwork, then to the default track image.
    pub fn into_track(self, album_name: Option<&str>, parent_image: Option<&str>) -> Track {
        let image_url = resolve_image(
            [
                self.image.as_deref(),
                self.album_image.as_deref(),
                parent_image,
            ],
            DEFAULT_TRACK_IMAGE_URL,
        );
        let stream_url = self.audio.filter(|u| !u.trim().is_empty());

        Track {
            id: self.id,
            title: self.name,
            artist_name: self.artist_name.unwrap_or_default(),
            artist_id: self.artist_id,
            album_name: self.album_name.or_else(|| album_name.map(str::to_string)),
            image_url,
            stream_url,
            duration_ms: self.duration.unwrap_or(0).saturating_mul(1000),
            is_explicit: false,
            share_url: self.shareurl.or(self.shorturl),
            source: CatalogKind::Jamendo,
        }
    }
}

// ============================================================================
// Albums
// ============================================================================

/// An album.
#[derive(Debug, Clone, Deserialize)]
pub struct JamendoAlbum {
    /// Album id.
    pub id: String,
    /// Title.
    pub name: String,
    /// Artist id.
    #[serde(default)]
    pub artist_id: String,
    /// Artist name.
    #[serde(default)]
    pub artist_name: String,
    /// Cover artwork, empty string when missing.
    pub image: Option<String>,
    /// `YYYY-MM-DD`.
    pub releasedate: Option<String>,
    /// Short public link.
    pub shorturl: Option<String>,
    /// Public page.
    pub shareurl: Option<String>,
}

impl JamendoAlbum {
    /// Maps to a domain album.
    ///
    /// Artwork falls back to the artist placeholder, then the default album
    /// image.
    pub fn to_album(&self, width: u32) -> Album {
        let placeholder =
            (!self.artist_id.is_empty()).then(|| placeholder_url("artist", &self.artist_id, width));
        Album {
            id: self.id.clone(),
            name: self.name.clone(),
            artist_name: self.artist_name.clone(),
            artist_id: (!self.artist_id.is_empty()).then(|| self.artist_id.clone()),
            image_url: resolve_image(
                [self.image.as_deref(), placeholder.as_deref()],
                DEFAULT_ALBUM_IMAGE_URL,
            ),
            release_year: Album::year_from_release_date(self.releasedate.as_deref()),
            source: CatalogKind::Jamendo,
        }
    }
}

/// Response entry of `albums/tracks`.
#[derive(Debug, Clone, Deserialize)]
pub struct JamendoAlbumWithTracks {
    /// Album metadata.
    #[serde(flatten)]
    pub album: JamendoAlbum,
    /// Tracks in album order.
    #[serde(default)]
    pub tracks: Vec<JamendoTrack>,
}

// ============================================================================
// Playlists
// ============================================================================

/// A playlist.
#[derive(Debug, Clone, Deserialize)]
pub struct JamendoPlaylist {
    /// Playlist id.
    pub id: String,
    /// Title.
    pub name: String,
    /// Owner id.
    pub user_id: Option<String>,
    /// Owner name.
    pub user_name: Option<String>,
    /// Cover artwork, rarely present.
    pub image: Option<String>,
    /// `YYYY-MM-DD`.
    pub creationdate: Option<String>,
    /// Short public link.
    pub shorturl: Option<String>,
    /// Public page.
    pub shareurl: Option<String>,
}

impl JamendoPlaylist {
    /// True when the playlist carries its own cover.
    pub fn has_image(&self) -> bool {
        self.image.as_deref().is_some_and(|u| !u.trim().is_empty())
    }

    /// Maps to a summary, using `cover` when the playlist has no image.
    pub fn to_summary(&self, cover: Option<&str>, track_count: Option<u32>) -> PlaylistSummary {
        PlaylistSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            owner_name: self
                .user_name
                .clone()
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_OWNER_NAME.to_string()),
            image_url: resolve_image([self.image.as_deref(), cover], DEFAULT_PLAYLIST_IMAGE_URL),
            track_count,
            source: CatalogKind::Jamendo,
        }
    }
}

/// Response entry of `playlists/tracks`.
#[derive(Debug, Clone, Deserialize)]
pub struct JamendoPlaylistWithTracks {
    /// Playlist metadata.
    #[serde(flatten)]
    pub playlist: JamendoPlaylist,
    /// Tracks in playlist order.
    #[serde(default)]
    pub tracks: Vec<JamendoTrack>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use musify_core::ErrorKind;

    #[test]
    fn test_nonzero_code_is_api_error() {
        let json = r#"{"headers": {"status": "failed", "code": 5,
            "error_message": "Invalid client id", "results_count": 0}, "results": []}"#;
        let response: JamendoResponse<JamendoTrack> = serde_json::from_str(json).unwrap();
        let err = response.into_results().unwrap_err();
        assert!(matches!(err, FetchError::Api { code: 5, ref message } if message == "Invalid client id"));
        assert_eq!(err.kind(), ErrorKind::ApiError);
    }

    #[test]
    fn test_missing_code_is_api_error() {
        let headers = JamendoHeaders::default();
        assert!(matches!(headers.check(), Err(FetchError::Api { code: -1, .. })));
    }

    #[test]
    fn test_track_image_fallback_chain() {
        let json = r#"{"id": "1", "name": "T", "duration": 61, "artist_name": "A",
            "audio": "https://audio/1", "image": "", "album_image": "https://album/1"}"#;
        let track: JamendoTrack = serde_json::from_str(json).unwrap();
        let mapped = track.clone().into_track(None, None);
        assert_eq!(mapped.image_url, "https://album/1");
        assert_eq!(mapped.duration_ms, 61_000);
        assert!(mapped.is_playable());

        let bare = JamendoTrack {
            image: None,
            album_image: None,
            audio: Some("  ".to_string()),
            ..track
        };
        assert!(!bare.has_audio());
        let mapped = bare.into_track(Some("Album"), None);
        assert_eq!(mapped.image_url, DEFAULT_TRACK_IMAGE_URL);
        assert_eq!(mapped.album_name.as_deref(), Some("Album"));
        assert!(!mapped.is_playable());
    }

    #[test]
    fn test_album_placeholder_fallback() {
        let json = r#"{"id": "9", "name": "Alb", "artist_id": "42", "artist_name": "A",
            "image": "", "releasedate": "2011-02-03"}"#;
        let album: JamendoAlbum = serde_json::from_str(json).unwrap();
        let mapped = album.to_album(300);
        assert_eq!(
            mapped.image_url,
            "https://usercontent.jamendo.com?type=artist&id=42&width=300"
        );
        assert_eq!(mapped.release_year.as_deref(), Some("2011"));
        assert_eq!(mapped.artist_id.as_deref(), Some("42"));

        let anonymous = JamendoAlbum {
            artist_id: String::new(),
            ..album
        };
        let mapped = anonymous.to_album(300);
        assert_eq!(mapped.image_url, DEFAULT_ALBUM_IMAGE_URL);
        assert_eq!(mapped.artist_id, None);
    }

    #[test]
    fn test_playlist_owner_default() {
        let json = r#"{"id": "p", "name": "Chill", "user_id": "7"}"#;
        let playlist: JamendoPlaylist = serde_json::from_str(json).unwrap();
        let summary = playlist.to_summary(None, None);
        assert_eq!(summary.owner_name, DEFAULT_OWNER_NAME);
        assert_eq!(summary.image_url, DEFAULT_PLAYLIST_IMAGE_URL);
        assert_eq!(
            playlist.to_summary(Some("https://cover"), Some(3)).image_url,
            "https://cover"
        );
    }
}
