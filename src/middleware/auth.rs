//! Session extraction for Axum
//!
//! Builds a [`SessionGate`] for each request from its bearer token. The gate
//! is handed to the workflow, which decides whether a session is required.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use journey_core::{BearerSession, IdentityClient, SessionGate, StaticSession};
use serde::Serialize;
use std::sync::Arc;

/// How request sessions are resolved. Installed as a router `Extension`.
#[derive(Clone)]
pub enum SessionProvider {
    /// Authentication disabled: every request acts as the anonymous owner
    Disabled,
    /// Bearer tokens are resolved by the identity service
    Identity(Arc<IdentityClient>),
}

impl SessionProvider {
    /// Session gate for a request presenting `token`.
    pub fn session_for(&self, token: Option<String>) -> Arc<dyn SessionGate> {
        match self {
            SessionProvider::Disabled => Arc::new(StaticSession::anonymous()),
            SessionProvider::Identity(identity) => {
                Arc::new(BearerSession::new(identity.clone(), token))
            }
        }
    }
}

/// JSON error response when the provider is missing
#[derive(Debug, Serialize)]
struct SessionErrorResponse {
    success: bool,
    error: String,
}

/// Session extraction rejection
#[derive(Debug)]
pub struct SessionRejection;

impl IntoResponse for SessionRejection {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(SessionErrorResponse {
                success: false,
                error: "Session provider not configured".to_string(),
            }),
        )
            .into_response()
    }
}

/// Axum extractor yielding the caller's session gate.
///
/// Never rejects a signed-out caller; `current_user()` simply returns `None`.
pub struct RequestSession(pub Arc<dyn SessionGate>);

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for RequestSession
where
    S: Send + Sync,
{
    type Rejection = SessionRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let provider = parts
            .extensions
            .get::<SessionProvider>()
            .ok_or(SessionRejection)?;
        Ok(RequestSession(provider.session_for(extract_token(parts))))
    }
}

/// `Authorization: Bearer <token>`
fn extract_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use journey_store::UserId;

    fn parts_with(header_value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/memories");
        if let Some(value) = header_value {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_extract_token() {
        assert_eq!(
            extract_token(&parts_with(Some("Bearer abc.def"))),
            Some("abc.def".to_string())
        );
        assert_eq!(extract_token(&parts_with(Some("Basic xyz"))), None);
        assert_eq!(extract_token(&parts_with(Some("Bearer   "))), None);
        assert_eq!(extract_token(&parts_with(None)), None);
    }

    #[tokio::test]
    async fn test_disabled_provider_is_anonymous() {
        let mut parts = parts_with(None);
        parts.extensions.insert(SessionProvider::Disabled);

        let RequestSession(session) = RequestSession::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(
            session.current_user().await.unwrap(),
            Some(UserId::new(StaticSession::ANONYMOUS))
        );
    }

    #[tokio::test]
    async fn test_missing_provider_rejects() {
        let mut parts = parts_with(Some("Bearer abc"));
        let result = RequestSession::from_request_parts(&mut parts, &()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_identity_provider_without_token_is_signed_out() {
        let provider =
            SessionProvider::Identity(Arc::new(IdentityClient::new("http://127.0.0.1:9", "anon")));
        let session = provider.session_for(None);
        assert_eq!(session.current_user().await.unwrap(), None);
    }
}
