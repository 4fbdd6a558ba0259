//! Auth API endpoints
//!
//! POST /api/auth/sign-out - End the caller's session
//!
//! Sign-in happens against the identity service directly; this server only
//! resolves and revokes the tokens it issues.

use axum::{routing::post, Extension, Json, Router};
use serde::Serialize;
use tracing::info;

use super::{ApiError, ApiResponse};
use crate::middleware::auth::RequestSession;

/// Where the client should go after signing out.
#[derive(Debug, Serialize)]
pub struct SignOutView {
    pub redirect_to: String,
}

/// Login page path, installed as a router `Extension`.
#[derive(Debug, Clone)]
pub struct LoginPath(pub String);

async fn sign_out(
    RequestSession(session): RequestSession,
    Extension(LoginPath(login_path)): Extension<LoginPath>,
) -> Result<Json<ApiResponse<SignOutView>>, ApiError> {
    session
        .sign_out()
        .await
        .map_err(|e| ApiError::from_workflow(e.into(), &login_path))?;
    info!("Session signed out");
    Ok(Json(ApiResponse::success(SignOutView {
        redirect_to: login_path,
    })))
}

/// Create auth routes
pub fn auth_routes() -> Router {
    Router::new().route("/api/auth/sign-out", post(sign_out))
}
