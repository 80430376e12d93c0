// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Musify Fetch
//!
//! Token-authenticated request layer and incremental pagination engine.
//!
//! ## Host APIs
//!
//! - [`host::http`] - HTTP client with tracing and domain allowlist
//! - [`host::connectivity`] - Network availability probes
//!
//! ## Credentials
//!
//! - [`token::BearerToken`] - Immutable access credential with expiry
//! - [`token::TokenRepository`] - Cached credential with serialized refresh
//! - [`token::run_catching_with_token`] - Authenticated call wrapper that
//!   turns every failure into a [`musify_core::FetchedResource`]
//!
//! ## Paging
//!
//! - [`paging::PagingSource`] - One-page-at-a-time loader
//! - [`paging::OffsetPagingSource`] - Offset windows over a [`paging::PageProvider`]
//! - [`paging::IdListPagingSource`] - One item per page over a fixed id list
//! - [`paging::Pager`] - Load-state machine with retry and invalidation
//!
//! ## Example
//!
//! ```ignore
//! use musify_fetch::{OffsetPagingSource, Pager, PagingConfig};
//!
//! let source = OffsetPagingSource::new(provider).with_tokens(tokens);
//! let mut pager = Pager::new(source, PagingConfig::new(20));
//! pager.refresh().await?;
//! while pager.has_next() {
//!     pager.load_next().await?;
//! }
//! ```

pub mod context;
pub mod error;
pub mod host;
pub mod paging;
pub mod retry;
pub mod token;

// Errors
pub use error::{AuthError, FetchError, HttpError};

// Host APIs
pub use host::{
    ConnectivityProbe, HttpClient, StaticConnectivity, TcpConnectivityProbe, host_of,
};

// Context
pub use context::{FetchContext, FetchContextBuilder, FetchSettings};

// Credentials
pub use token::{
    AccessTokenResponse, BearerToken, CachingTokenRepository, HttpTokenIssuer, TokenGrant,
    TokenIssuer, TokenRepository, client_secret_header, run_catching_with_token,
};

// Paging
pub use paging::{
    IdListPagingSource, ItemLookup, LoadState, OffsetPagingSource, PageProvider,
    Pager, PagingConfig, PagingError, PagingSource, page_stream,
};
pub use retry::RetryStrategy;
