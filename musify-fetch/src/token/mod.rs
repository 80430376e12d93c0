//! Credential lifecycle.
//!
//! - [`credential`] - The immutable [`BearerToken`]
//! - [`issuer`] - Token endpoint client and grant types
//! - [`repository`] - Cached credential and the authenticated-call wrapper

pub mod credential;
pub mod issuer;
pub mod repository;

pub use credential::BearerToken;
pub use issuer::{
    AccessTokenResponse, HttpTokenIssuer, TokenGrant, TokenIssuer, client_secret_header,
};
pub use repository::{CachingTokenRepository, Clock, TokenRepository, run_catching_with_token};
