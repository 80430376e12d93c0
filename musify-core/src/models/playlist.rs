//! Catalog playlist models.

use serde::{Deserialize, Serialize};

use super::{CatalogKind, Track};

/// A playlist as listed in browse and search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistSummary {
    /// Catalog-scoped identifier.
    pub id: String,
    /// Playlist name.
    pub name: String,
    /// Display name of the owner.
    pub owner_name: String,
    /// Cover URL after fallbacks were applied.
    pub image_url: String,
    /// Number of tracks reported by the catalog, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_count: Option<u32>,
    /// Originating catalog.
    pub source: CatalogKind,
}

/// A playlist together with its playable tracks.
///
/// `tracks` only holds playable tracks while `raw_track_count` counts every
/// entry the catalog returned, so the two may differ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistDetails {
    /// Summary information.
    pub summary: PlaylistSummary,
    /// Playable tracks in catalog order.
    pub tracks: Vec<Track>,
    /// Number of entries before playability filtering.
    pub raw_track_count: usize,
}

impl PlaylistDetails {
    /// Number of entries dropped because they had no stream URL.
    pub fn unplayable_count(&self) -> usize {
        self.raw_track_count.saturating_sub(self.tracks.len())
    }
}
