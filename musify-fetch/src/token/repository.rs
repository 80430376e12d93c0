//! Cached, lazily refreshed credential.
//!
//! [`CachingTokenRepository`] owns the only cached [`BearerToken`] of the
//! process. The cache lock is held for the whole refresh, so concurrent
//! callers that find the cache empty or expired wait for one refresh and then
//! share its result.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use musify_core::{ErrorKind, FetchedResource};

use super::{BearerToken, TokenGrant, TokenIssuer};
use crate::error::{AuthError, FetchError};

/// Source of the current time.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

// ============================================================================
// Trait
// ============================================================================

/// Hands out non-expired credentials.
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Returns a credential that is not expired at the moment of return.
    ///
    /// Refreshes the cached credential when it is missing or expired. A failed
    /// refresh is returned to the caller.
    async fn get_valid_bearer_token(&self) -> Result<BearerToken, AuthError>;

    /// Drops the cached credential so the next call refreshes.
    async fn invalidate(&self);
}

// ============================================================================
// Caching Repository
// ============================================================================

/// Token repository with a single serialized refresh.
pub struct CachingTokenRepository {
    issuer: Arc<dyn TokenIssuer>,
    grant: TokenGrant,
    cache: Mutex<Option<BearerToken>>,
    clock: Clock,
}

impl CachingTokenRepository {
    /// Creates a repository that renews with `grant` when it has no refresh
    /// token.
    pub fn new(issuer: Arc<dyn TokenIssuer>, grant: TokenGrant) -> Self {
        Self {
            issuer,
            grant,
            cache: Mutex::new(None),
            clock: Arc::new(Utc::now),
        }
    }

    /// Replaces the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Returns the cached credential without refreshing.
    pub async fn cached(&self) -> Option<BearerToken> {
        self.cache.lock().await.clone()
    }

    async fn issue(&self, grant: &TokenGrant) -> Result<BearerToken, AuthError> {
        let response = self.issuer.issue(grant).await?;
        if response.expires_in == 0 {
            return Err(AuthError::ZeroLifetime);
        }
        Ok(response.into_bearer((self.clock)()))
    }

    async fn refresh(&self, previous: Option<&BearerToken>) -> Result<BearerToken, AuthError> {
        if let Some(refresh_token) = previous.and_then(BearerToken::refresh_token) {
            let grant = TokenGrant::RefreshToken(refresh_token.to_string());
            match self.issue(&grant).await {
                Ok(token) => return Ok(token),
                Err(AuthError::Rejected { status, .. }) => {
                    warn!(status, "Refresh token rejected, falling back to base grant");
                }
                Err(e) => return Err(e),
            }
        }
        self.issue(&self.grant).await
    }
}

#[async_trait]
impl TokenRepository for CachingTokenRepository {
    async fn get_valid_bearer_token(&self) -> Result<BearerToken, AuthError> {
        let mut cache = self.cache.lock().await;

        if let Some(token) = cache.as_ref() {
            if !token.is_expired_at((self.clock)()) {
                return Ok(token.clone());
            }
            debug!(expired_at = %token.expires_at(), "Cached token expired");
        }

        info!("Requesting new access token");
        let token = self.refresh(cache.as_ref()).await?;
        debug!(expires_at = %token.expires_at(), "Access token cached");
        *cache = Some(token.clone());
        Ok(token)
    }

    async fn invalidate(&self) {
        if self.cache.lock().await.take().is_some() {
            debug!("Cached token invalidated");
        }
    }
}

impl std::fmt::Debug for CachingTokenRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachingTokenRepository")
            .field("grant", &self.grant)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Authenticated Call Wrapper
// ============================================================================

/// Runs `operation` with a valid credential and classifies every failure.
///
/// Token retrieval errors and operation errors both become
/// [`FetchedResource::Failure`] with the matching [`ErrorKind`] and no data.
/// An HTTP 401 from the operation also drops the cached credential.
pub async fn run_catching_with_token<R, T, F, Fut>(
    tokens: &R,
    operation: F,
) -> FetchedResource<T, ErrorKind>
where
    R: TokenRepository + ?Sized,
    F: FnOnce(BearerToken) -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let result = match tokens.get_valid_bearer_token().await {
        Ok(token) => operation(token).await,
        Err(e) => Err(FetchError::from(e)),
    };

    match result {
        Ok(data) => FetchedResource::success(data),
        Err(e) => {
            if e.is_unauthorized() {
                tokens.invalidate().await;
            }
            let kind = e.kind();
            warn!(error = %e, kind = %kind, "Authenticated call failed");
            FetchedResource::failure(kind)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::AccessTokenResponse;
    use chrono::{Duration, TimeZone};
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    // ========================================================================
    // Test doubles
    // ========================================================================

    struct MockIssuer {
        calls: AtomicU32,
        grants: StdMutex<Vec<&'static str>>,
        ttl: u64,
        refresh_token: Option<String>,
        reject_with: Option<u16>,
        reject_refresh: bool,
        delay: std::time::Duration,
    }

    impl MockIssuer {
        fn new(ttl: u64) -> Self {
            Self {
                calls: AtomicU32::new(0),
                grants: StdMutex::new(Vec::new()),
                ttl,
                refresh_token: None,
                reject_with: None,
                reject_refresh: false,
                delay: std::time::Duration::ZERO,
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TokenIssuer for MockIssuer {
        async fn issue(&self, grant: &TokenGrant) -> Result<AccessTokenResponse, AuthError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            self.grants.lock().unwrap().push(grant.grant_type());
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if let Some(status) = self.reject_with {
                return Err(AuthError::Rejected {
                    status,
                    message: "invalid_client".to_string(),
                });
            }
            if self.reject_refresh && matches!(grant, TokenGrant::RefreshToken(_)) {
                return Err(AuthError::Rejected {
                    status: 400,
                    message: "invalid_grant".to_string(),
                });
            }
            Ok(AccessTokenResponse {
                access_token: format!("token-{n}"),
                expires_in: self.ttl,
                token_type: "Bearer".to_string(),
                refresh_token: self.refresh_token.clone(),
            })
        }
    }

    fn manual_clock() -> (Clock, Arc<StdMutex<DateTime<Utc>>>) {
        let now = Arc::new(StdMutex::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        ));
        let handle = Arc::clone(&now);
        let clock: Clock = Arc::new(move || *handle.lock().unwrap());
        (clock, now)
    }

    fn advance(now: &StdMutex<DateTime<Utc>>, secs: i64) {
        let mut guard = now.lock().unwrap();
        *guard += Duration::seconds(secs);
    }

    // ========================================================================
    // Caching
    // ========================================================================

    #[tokio::test]
    async fn test_valid_token_is_reused() {
        let issuer = Arc::new(MockIssuer::new(3600));
        let repo = CachingTokenRepository::new(issuer.clone(), TokenGrant::ClientCredentials);

        let first = repo.get_valid_bearer_token().await.unwrap();
        let second = repo.get_valid_bearer_token().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(issuer.calls(), 1);
    }

    #[tokio::test]
    async fn test_expired_token_is_refreshed() {
        let (clock, now) = manual_clock();
        let issuer = Arc::new(MockIssuer::new(60));
        let repo = CachingTokenRepository::new(issuer.clone(), TokenGrant::ClientCredentials)
            .with_clock(clock);

        let first = repo.get_valid_bearer_token().await.unwrap();
        advance(&now, 61);
        let second = repo.get_valid_bearer_token().await.unwrap();

        assert_ne!(first.access_token(), second.access_token());
        assert_eq!(issuer.calls(), 2);
    }

    #[tokio::test]
    async fn test_returned_token_never_expired() {
        let (clock, now) = manual_clock();
        let issuer = Arc::new(MockIssuer::new(30));
        let repo = CachingTokenRepository::new(issuer.clone(), TokenGrant::ClientCredentials)
            .with_clock(Arc::clone(&clock));

        for step in [0, 10, 25, 5, 31, 1, 29, 60, 0, 45] {
            advance(&now, step);
            let token = repo.get_valid_bearer_token().await.unwrap();
            assert!(!token.is_expired_at(clock()), "expired token after step {step}");
        }
        assert!(issuer.calls() >= 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_share_one_refresh() {
        let mut mock = MockIssuer::new(3600);
        mock.delay = std::time::Duration::from_millis(50);
        let issuer = Arc::new(mock);
        let repo = Arc::new(CachingTokenRepository::new(
            issuer.clone(),
            TokenGrant::ClientCredentials,
        ));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let repo = Arc::clone(&repo);
            handles.push(tokio::spawn(async move {
                repo.get_valid_bearer_token().await.unwrap()
            }));
        }

        let mut tokens = Vec::new();
        for handle in handles {
            tokens.push(handle.await.unwrap());
        }

        assert_eq!(issuer.calls(), 1);
        assert!(tokens.iter().all(|t| t == &tokens[0]));
    }

    #[tokio::test]
    async fn test_refresh_token_grant_used_when_available() {
        let (clock, now) = manual_clock();
        let mut mock = MockIssuer::new(60);
        mock.refresh_token = Some("refresh-me".to_string());
        let issuer = Arc::new(mock);
        let repo = CachingTokenRepository::new(issuer.clone(), TokenGrant::ClientCredentials)
            .with_clock(clock);

        repo.get_valid_bearer_token().await.unwrap();
        advance(&now, 120);
        repo.get_valid_bearer_token().await.unwrap();

        assert_eq!(
            *issuer.grants.lock().unwrap(),
            vec!["client_credentials", "refresh_token"]
        );
    }

    #[tokio::test]
    async fn test_rejected_refresh_token_falls_back_to_base_grant() {
        let (clock, now) = manual_clock();
        let mut mock = MockIssuer::new(60);
        mock.refresh_token = Some("stale".to_string());
        mock.reject_refresh = true;
        let issuer = Arc::new(mock);
        let repo = CachingTokenRepository::new(issuer.clone(), TokenGrant::ClientCredentials)
            .with_clock(clock);

        repo.get_valid_bearer_token().await.unwrap();
        advance(&now, 120);
        let token = repo.get_valid_bearer_token().await.unwrap();

        assert_eq!(token.access_token(), "token-3");
        assert_eq!(
            *issuer.grants.lock().unwrap(),
            vec!["client_credentials", "refresh_token", "client_credentials"]
        );
    }

    #[tokio::test]
    async fn test_zero_lifetime_rejected() {
        let issuer = Arc::new(MockIssuer::new(0));
        let repo = CachingTokenRepository::new(issuer, TokenGrant::ClientCredentials);

        let err = repo.get_valid_bearer_token().await.unwrap_err();
        assert!(matches!(err, AuthError::ZeroLifetime));
        assert!(repo.cached().await.is_none());
    }

    #[tokio::test]
    async fn test_invalidate_forces_refresh() {
        let issuer = Arc::new(MockIssuer::new(3600));
        let repo = CachingTokenRepository::new(issuer.clone(), TokenGrant::ClientCredentials);

        repo.get_valid_bearer_token().await.unwrap();
        repo.invalidate().await;
        repo.get_valid_bearer_token().await.unwrap();

        assert_eq!(issuer.calls(), 2);
    }

    // ========================================================================
    // run_catching_with_token
    // ========================================================================

    #[tokio::test]
    async fn test_refresh_rejected_propagates_and_wrapper_classifies() {
        let mut mock = MockIssuer::new(3600);
        mock.reject_with = Some(401);
        let repo = CachingTokenRepository::new(Arc::new(mock), TokenGrant::ClientCredentials);

        let err = repo.get_valid_bearer_token().await.unwrap_err();
        assert!(matches!(err, AuthError::Rejected { status: 401, .. }));

        let called = AtomicU32::new(0);
        let counter = &called;
        let resource: FetchedResource<u32> = run_catching_with_token(&repo, |_| async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(1)
        })
        .await;

        assert_eq!(
            resource,
            FetchedResource::Failure {
                cause: ErrorKind::NetworkError,
                data: None
            }
        );
        assert_eq!(called.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_wrapper_passes_token_and_wraps_success() {
        let repo = CachingTokenRepository::new(
            Arc::new(MockIssuer::new(3600)),
            TokenGrant::ClientCredentials,
        );

        let resource = run_catching_with_token(&repo, |token| async move {
            Ok(token.header_value())
        })
        .await;

        assert_eq!(resource, FetchedResource::success("Bearer token-1".to_string()));
    }

    #[tokio::test]
    async fn test_wrapper_classifies_operation_errors() {
        let repo = CachingTokenRepository::new(
            Arc::new(MockIssuer::new(3600)),
            TokenGrant::ClientCredentials,
        );

        let resource: FetchedResource<()> = run_catching_with_token(&repo, |_| async {
            Err(FetchError::from(crate::error::HttpError::Timeout))
        })
        .await;
        assert_eq!(resource.cause(), Some(&ErrorKind::NetworkConnectionFailure));

        let resource: FetchedResource<()> = run_catching_with_token(&repo, |_| async {
            Err(FetchError::InvalidResponse("garbage".to_string()))
        })
        .await;
        assert_eq!(resource.cause(), Some(&ErrorKind::UnknownError));
    }

    #[tokio::test]
    async fn test_rewrapping_keeps_error_kind() {
        let repo = CachingTokenRepository::new(
            Arc::new(MockIssuer::new(3600)),
            TokenGrant::ClientCredentials,
        );

        for kind in [
            ErrorKind::NetworkError,
            ErrorKind::NetworkConnectionFailure,
            ErrorKind::ApiError,
            ErrorKind::EmptyResponse,
            ErrorKind::UnknownError,
        ] {
            let inner: FetchedResource<u8> = FetchedResource::failure(kind);
            let outer = run_catching_with_token(&repo, |_| async move {
                inner.into_result().map_err(FetchError::from)
            })
            .await;
            assert_eq!(outer.cause(), Some(&kind));
        }
    }

    #[tokio::test]
    async fn test_unauthorized_operation_invalidates_cache() {
        let issuer = Arc::new(MockIssuer::new(3600));
        let repo = CachingTokenRepository::new(issuer.clone(), TokenGrant::ClientCredentials);

        let resource: FetchedResource<()> = run_catching_with_token(&repo, |_| async {
            Err(FetchError::Status {
                status: 401,
                message: "The access token expired".to_string(),
            })
        })
        .await;

        assert_eq!(resource.cause(), Some(&ErrorKind::NetworkError));
        assert!(repo.cached().await.is_none());
    }
}
