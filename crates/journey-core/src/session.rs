//! Session gate consumed by the workflow.
//!
//! The gate is passed into every write operation rather than held globally,
//! so each request carries exactly the identity it authenticated with.

use async_trait::async_trait;
use journey_store::UserId;
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// Error from the identity service.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Network or transport failure
    #[error("identity service unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    /// The identity service answered with something we cannot use
    #[error("unexpected identity response: {0}")]
    InvalidResponse(String),
}

/// Resolves the caller of the current request.
#[async_trait]
pub trait SessionGate: Send + Sync {
    /// The signed-in user, or `None` when there is no active session.
    async fn current_user(&self) -> Result<Option<UserId>, SessionError>;

    /// End the current session.
    async fn sign_out(&self) -> Result<(), SessionError>;
}

/// Fixed session, used when authentication is disabled and in tests.
#[derive(Debug, Default)]
pub struct StaticSession {
    user: Mutex<Option<UserId>>,
}

impl StaticSession {
    /// Owner used for every request when authentication is disabled.
    pub const ANONYMOUS: &'static str = "anonymous";

    /// A session signed in as `user_id`.
    pub fn signed_in(user_id: impl Into<String>) -> Self {
        Self {
            user: Mutex::new(Some(UserId::new(user_id))),
        }
    }

    /// No session at all.
    pub fn signed_out() -> Self {
        Self::default()
    }

    /// The auth-disabled identity.
    pub fn anonymous() -> Self {
        Self::signed_in(Self::ANONYMOUS)
    }
}

#[async_trait]
impl SessionGate for StaticSession {
    async fn current_user(&self) -> Result<Option<UserId>, SessionError> {
        Ok(self
            .user
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    async fn sign_out(&self) -> Result<(), SessionError> {
        let mut user = self.user.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = user.take() {
            debug!(user_id = %previous, "Static session signed out");
        }
        Ok(())
    }
}
