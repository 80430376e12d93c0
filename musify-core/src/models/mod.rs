//! Domain models for Musify.
//!
//! ## Submodules
//!
//! - [`catalog`] - Which backend an entity came from
//! - [`track`] - Tracks and playability
//! - [`album`] - Albums and artists
//! - [`playlist`] - Catalog playlists
//! - [`genre`] - Genre tags used for browsing
//! - [`library`] - User library documents (favorites, user playlists)
//! - [`search`] - Aggregated search results

mod album;
mod catalog;
mod genre;
mod library;
mod playlist;
mod search;
mod track;

pub use album::{Album, Artist};
pub use catalog::CatalogKind;
pub use genre::GenreType;
pub use library::{Song, UserPlaylist};
pub use playlist::{PlaylistDetails, PlaylistSummary};
pub use search::SearchResults;
pub use track::Track;
