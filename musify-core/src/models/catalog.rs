//! Catalog identification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Backend catalog a domain entity was fetched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogKind {
    /// Commercial catalog. Bearer-token auth, errors via HTTP status.
    Spotify,
    /// Open-content catalog. `client_id` auth, errors via `headers.code`.
    Jamendo,
}

impl CatalogKind {
    /// Returns the display name for this catalog.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Spotify => "Spotify",
            Self::Jamendo => "Jamendo",
        }
    }

    /// Returns true if calls to this catalog need a bearer token.
    pub fn requires_auth(&self) -> bool {
        matches!(self, Self::Spotify)
    }

    /// Returns all catalogs.
    pub fn all() -> &'static [CatalogKind] {
        &[Self::Spotify, Self::Jamendo]
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
