//! Current user identity.

use async_trait::async_trait;
use std::sync::{PoisonError, RwLock};
use tracing::info;
use uuid::Uuid;

use crate::error::StoreError;

/// Supplies the id of the signed-in user.
#[async_trait]
pub trait UserSession: Send + Sync {
    /// The signed-in user, if any.
    fn current_user_id(&self) -> Option<String>;

    /// Signs in without credentials and returns the new user id.
    async fn sign_in_anonymously(&self) -> Result<String, StoreError>;

    /// Returns the signed-in user, signing in anonymously first if needed.
    async fn ensure_user(&self) -> Result<String, StoreError> {
        match self.current_user_id() {
            Some(id) => Ok(id),
            None => self.sign_in_anonymously().await,
        }
    }
}

/// Session kept in process memory.
#[derive(Debug, Default)]
pub struct LocalSession {
    user_id: RwLock<Option<String>>,
}

impl LocalSession {
    /// Creates a signed-out session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session already signed in as `user_id`.
    pub fn signed_in(user_id: impl Into<String>) -> Self {
        Self {
            user_id: RwLock::new(Some(user_id.into())),
        }
    }

    /// Signs out.
    pub fn sign_out(&self) {
        *self.user_id.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

#[async_trait]
impl UserSession for LocalSession {
    fn current_user_id(&self) -> Option<String> {
        self.user_id
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn sign_in_anonymously(&self) -> Result<String, StoreError> {
        let mut user_id = self.user_id.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = user_id.as_ref() {
            return Ok(existing.clone());
        }
        let id = format!("anon-{}", Uuid::new_v4().simple());
        info!(user_id = %id, "Signed in anonymously");
        *user_id = Some(id.clone());
        Ok(id)
    }
}
