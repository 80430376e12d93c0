//! Bearer credential model.

use chrono::{DateTime, Duration, Utc};
use std::fmt;

/// An issued access credential.
///
/// Immutable: a refresh produces a new value that replaces the cached one.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken {
    access_token: String,
    issued_at: DateTime<Utc>,
    ttl_secs: u64,
    refresh_token: Option<String>,
}

impl BearerToken {
    /// Creates a credential issued at `issued_at` and valid for `ttl_secs`.
    pub fn new(
        access_token: impl Into<String>,
        issued_at: DateTime<Utc>,
        ttl_secs: u64,
        refresh_token: Option<String>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            issued_at,
            ttl_secs,
            refresh_token,
        }
    }

    /// The raw access token.
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// When the credential was issued.
    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// Lifetime in seconds.
    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// Refresh token, if the issuer returned one.
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    /// Instant after which the credential is expired.
    pub fn expires_at(&self) -> DateTime<Utc> {
        i64::try_from(self.ttl_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|ttl| self.issued_at.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Returns true if the credential is expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at()
    }

    /// Returns true if the credential is expired now.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Value for the `Authorization` header.
    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerToken")
            .field("access_token", &"<redacted>")
            .field("issued_at", &self.issued_at)
            .field("ttl_secs", &self.ttl_secs)
            .field("has_refresh_token", &self.refresh_token.is_some())
            .finish()
    }
}
