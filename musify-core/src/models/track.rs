//! Track model.

use serde::{Deserialize, Serialize};

use super::CatalogKind;

/// A single track from either catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Catalog-scoped identifier.
    pub id: String,
    /// Track title.
    pub title: String,
    /// Display name of the (first) artist.
    pub artist_name: String,
    /// Identifier of the (first) artist, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist_id: Option<String>,
    /// Album title, if the track belongs to one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album_name: Option<String>,
    /// Artwork URL after fallbacks were applied.
    pub image_url: String,
    /// Playable stream URL. `None` when the catalog offers no audio.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_url: Option<String>,
    /// Duration in milliseconds.
    pub duration_ms: u64,
    /// Whether the track is flagged explicit.
    #[serde(default)]
    pub is_explicit: bool,
    /// Public share link, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_url: Option<String>,
    /// Originating catalog.
    pub source: CatalogKind,
}

impl Track {
    /// Returns true if the track has a non-blank stream URL.
    pub fn is_playable(&self) -> bool {
        self.stream_url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty())
    }

    /// Formats the duration as `m:ss`.
    pub fn duration_label(&self) -> String {
        let total_secs = self.duration_ms / 1000;
        format!("{}:{:02}", total_secs / 60, total_secs % 60)
    }
}
