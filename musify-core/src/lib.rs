// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Musify Core
//!
//! Core types, result model, and paging data model shared by every `Musify`
//! crate.
//!
//! ## Key Types
//!
//! ### Catalog Models
//! - [`CatalogKind`] - Which backend catalog an entity came from
//! - [`Track`], [`Album`], [`Artist`] - Catalog entities
//! - [`PlaylistSummary`], [`PlaylistDetails`] - Catalog playlists
//! - [`GenreType`] - Browsable genre tags
//! - [`SearchResults`] - Multi-category search result
//!
//! ### Library Models
//! - [`Song`] - A favorited track as stored in the user's library
//! - [`UserPlaylist`] - A user-created playlist of song ids
//!
//! ### Results
//! - [`FetchedResource`] - Success or typed failure with optional fallback data
//! - [`ErrorKind`] - Closed failure taxonomy shared by all fetch operations
//!
//! ### Paging
//! - [`PageRequest`], [`Page`] - One load of an incremental list
//! - [`PagingState`] - Loaded pages plus the visible anchor
//! - [`PageKey`] - Ordered key with checked neighbours

pub mod error;
pub mod models;
pub mod paging;
pub mod resource;

pub use error::CoreError;

pub use models::{
    // Catalog
    Album,
    Artist,
    CatalogKind,
    GenreType,
    PlaylistDetails,
    PlaylistSummary,
    SearchResults,
    Track,
    // Library
    Song,
    UserPlaylist,
};

pub use paging::{LoadDirection, Page, PageKey, PageRequest, PagingState};
pub use resource::{ErrorKind, FetchedResource};
