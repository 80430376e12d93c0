//! Album and artist models.

use serde::{Deserialize, Serialize};

use super::CatalogKind;

// ============================================================================
// Album
// ============================================================================

/// An album from either catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    /// Catalog-scoped identifier.
    pub id: String,
    /// Album title.
    pub name: String,
    /// Display name of the (first) artist.
    pub artist_name: String,
    /// Identifier of the (first) artist, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist_id: Option<String>,
    /// Artwork URL after fallbacks were applied.
    pub image_url: String,
    /// Four-digit release year, if the catalog reports a release date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_year: Option<String>,
    /// Originating catalog.
    pub source: CatalogKind,
}

/// Extracts the year from a `YYYY-MM-DD` style release date.
pub(crate) fn release_year(date: &str) -> Option<String> {
    let year: String = date.chars().take(4).collect();
    (year.len() == 4 && year.chars().all(|c| c.is_ascii_digit())).then_some(year)
}

impl Album {
    /// Builds the release year from a raw release date string.
    pub fn year_from_release_date(date: Option<&str>) -> Option<String> {
        date.and_then(release_year)
    }
}

// ============================================================================
// Artist
// ============================================================================

/// An artist from either catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    /// Catalog-scoped identifier.
    pub id: String,
    /// Artist name.
    pub name: String,
    /// Artwork URL, if the catalog has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Genre names reported by the catalog.
    #[serde(default)]
    pub genres: Vec<String>,
    /// Follower count, if reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub followers: Option<u64>,
    /// Originating catalog.
    pub source: CatalogKind,
}
