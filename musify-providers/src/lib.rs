// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Musify Providers
//!
//! Catalog adapters and the repository facades built on them.
//!
//! ## Catalogs
//!
//! | Catalog | Auth | Error signal | Paging |
//! |---------|------|--------------|--------|
//! | Spotify | Bearer token (client credentials) | HTTP status | `offset`/`limit` |
//! | Jamendo | `client_id` query parameter | `headers.code` in a 200 body | `offset`/`limit` |
//!
//! Each adapter module includes:
//!
//! - **API client**: One method per endpoint, returning raw DTOs
//! - **DTOs**: Response structures and their mapping to domain models
//! - **Paging**: [`musify_fetch::PageProvider`] implementations
//!
//! ## Facades
//!
//! The [`repositories`] combine adapters with the connectivity probe, the
//! shared credential cache and the paging engine. [`Catalog`] builds all of
//! them from one [`musify_fetch::FetchContext`].
//!
//! ## Usage
//!
//! ```ignore
//! use musify_fetch::FetchContext;
//! use musify_providers::{Catalog, CatalogConfig};
//!
//! let catalog = Catalog::new(FetchContext::new(), &CatalogConfig::default());
//! let albums = catalog.home_feed.fetch_new_albums(20).await;
//! ```

pub mod catalog;
pub mod images;
pub mod repositories;

// Catalog modules (alphabetical)
pub mod jamendo;
pub mod spotify;

pub use catalog::{Catalog, CatalogConfig, JamendoSettings, SpotifySettings};
pub use images::ImageSize;
pub use repositories::{
    AlbumsRepository, ArtistsRepository, GenreFeed, HomeFeedRepository, SearchRepository,
    TracksRepository,
};
