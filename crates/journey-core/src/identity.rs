//! Hosted identity service client.
//!
//! Password checks and session issuance belong to the identity service; this
//! module only asks it who a bearer token belongs to and revokes tokens on
//! sign-out.

use crate::session::{SessionError, SessionGate};
use async_trait::async_trait;
use journey_store::UserId;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// `GET /auth/v1/user` response (only the fields we use).
#[derive(Debug, Deserialize)]
struct IdentityUser {
    id: String,
}

/// REST client for the identity service.
#[derive(Debug, Clone)]
pub struct IdentityClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl IdentityClient {
    /// Create a client for the service at `base_url`.
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Look up the user that owns `token`. Rejected tokens yield `None`.
    pub async fn user_for_token(&self, token: &str) -> Result<Option<UserId>, SessionError> {
        let response = self
            .client
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", &self.api_key)
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            debug!(%status, "Identity service rejected token");
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SessionError::InvalidResponse(format!("{status}: {body}")));
        }

        let user: IdentityUser = response
            .json()
            .await
            .map_err(|e| SessionError::InvalidResponse(e.to_string()))?;
        if user.id.trim().is_empty() {
            return Err(SessionError::InvalidResponse("user without id".to_string()));
        }
        Ok(Some(UserId::new(user.id)))
    }

    /// Revoke `token`. A token the service no longer accepts counts as signed out.
    pub async fn logout(&self, token: &str) -> Result<(), SessionError> {
        let response = self
            .client
            .post(format!("{}/auth/v1/logout", self.base_url))
            .header("apikey", &self.api_key)
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() || status == reqwest::StatusCode::UNAUTHORIZED {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        warn!(%status, "Identity service refused logout");
        Err(SessionError::InvalidResponse(format!("{status}: {body}")))
    }
}

/// Session gate for one request's bearer token.
pub struct BearerSession {
    identity: Arc<IdentityClient>,
    token: Option<String>,
}

impl BearerSession {
    /// Wrap the token presented with a request, if any.
    pub fn new(identity: Arc<IdentityClient>, token: Option<String>) -> Self {
        Self { identity, token }
    }
}

#[async_trait]
impl SessionGate for BearerSession {
    async fn current_user(&self) -> Result<Option<UserId>, SessionError> {
        match &self.token {
            Some(token) if !token.is_empty() => self.identity.user_for_token(token).await,
            _ => Ok(None),
        }
    }

    async fn sign_out(&self) -> Result<(), SessionError> {
        match &self.token {
            Some(token) if !token.is_empty() => self.identity.logout(token).await,
            _ => Ok(()),
        }
    }
}
