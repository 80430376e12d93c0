//! User library documents.
//!
//! These are the shapes persisted in the user's document store: favorited
//! songs and user-created playlists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Track;

/// A favorited song as stored in the user's library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    /// Track identifier.
    pub id: String,
    /// Song title.
    pub title: String,
    /// Artist display name.
    pub artist: String,
    /// Album title, empty when unknown.
    #[serde(default)]
    pub album: String,
    /// Duration in milliseconds.
    #[serde(default)]
    pub duration: u64,
    /// Playable stream URL.
    #[serde(default)]
    pub stream_url: String,
    /// Artwork URL.
    #[serde(default)]
    pub image_url: String,
}

impl From<&Track> for Song {
    fn from(track: &Track) -> Self {
        Self {
            id: track.id.clone(),
            title: track.title.clone(),
            artist: track.artist_name.clone(),
            album: track.album_name.clone().unwrap_or_default(),
            duration: track.duration_ms,
            stream_url: track.stream_url.clone().unwrap_or_default(),
            image_url: track.image_url.clone(),
        }
    }
}

/// A user-created playlist. Holds song ids, not songs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPlaylist {
    /// Document identifier.
    pub id: String,
    /// Playlist name.
    pub name: String,
    /// Song ids in insertion order.
    #[serde(default)]
    pub song_ids: Vec<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
