//! Artwork selection and fallbacks.
//!
//! Resolution is chosen at request time from the display density. When an
//! entry has no artwork, callers walk a fixed fallback chain ending in one of
//! the default URLs below.

use serde::{Deserialize, Serialize};

/// Shown when a playlist has neither a cover nor a track image.
pub const DEFAULT_PLAYLIST_IMAGE_URL: &str =
    "https://i.pinimg.com/736x/cd/04/5d/cd045d2f60aadbbc0532d398f780c361.jpg";

/// Shown when an album has no cover and no artist placeholder.
pub const DEFAULT_ALBUM_IMAGE_URL: &str =
    "https://i.pinimg.com/736x/23/e6/23/23e623ade541ced591501b1e8d11fb12.jpg";

/// Shown when a track has neither its own nor an album image.
pub const DEFAULT_TRACK_IMAGE_URL: &str =
    "https://i.pinimg.com/736x/9a/95/d1/9a95d17c580534117215b0f6a50ec96c.jpg";

/// Requested artwork resolution class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ImageSize {
    /// Thumbnails.
    Small,
    /// Standard-density displays.
    #[default]
    Medium,
    /// High-density displays.
    Large,
}

impl ImageSize {
    /// Picks the class for a display.
    pub fn for_display(high_density: bool) -> Self {
        if high_density { Self::Large } else { Self::Medium }
    }

    /// Target edge length in pixels.
    pub fn pixels(self) -> u32 {
        match self {
            Self::Small => 64,
            Self::Medium => 300,
            Self::Large => 600,
        }
    }
}

/// Returns the first candidate that is present and not blank.
pub fn first_present<'a, I>(candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    candidates
        .into_iter()
        .flatten()
        .find(|url| !url.trim().is_empty())
}

/// Walks `candidates` and falls back to `default`.
pub fn resolve_image<'a, I>(candidates: I, default: &str) -> String
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    first_present(candidates).unwrap_or(default).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_present_skips_blank() {
        assert_eq!(
            first_present([None, Some(""), Some("  "), Some("https://a"), Some("https://b")]),
            Some("https://a")
        );
        assert_eq!(first_present([None, Some("")]), None);
    }

    #[test]
    fn test_resolve_image_default() {
        assert_eq!(
            resolve_image([None, Some("")], DEFAULT_TRACK_IMAGE_URL),
            DEFAULT_TRACK_IMAGE_URL
        );
    }

    #[test]
    fn test_size_for_display() {
        assert_eq!(ImageSize::for_display(true).pixels(), 600);
        assert_eq!(ImageSize::for_display(false).pixels(), 300);
    }
}
