//! Search results.

use serde::{Deserialize, Serialize};

use super::{Album, Artist, PlaylistSummary, Track};

/// Results of a multi-category search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResults {
    /// Matching tracks.
    pub tracks: Vec<Track>,
    /// Matching albums.
    pub albums: Vec<Album>,
    /// Matching artists.
    pub artists: Vec<Artist>,
    /// Matching playlists.
    pub playlists: Vec<PlaylistSummary>,
}

impl SearchResults {
    /// Returns true if no category has a result.
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
            && self.albums.is_empty()
            && self.artists.is_empty()
            && self.playlists.is_empty()
    }

    /// Total number of results across categories.
    pub fn len(&self) -> usize {
        self.tracks.len() + self.albums.len() + self.artists.len() + self.playlists.len()
    }
}
