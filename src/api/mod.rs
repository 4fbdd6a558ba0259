//! Web API module for Journey
//!
//! Provides REST API endpoints for:
//! - The memory timeline (list, fetch, create, edit, delete)
//! - Media removal
//! - Sign-out

pub mod auth;
pub mod error;
pub mod health;
pub mod memories;

use axum::Router;
use serde::Serialize;

pub use auth::auth_routes;
pub use error::ApiError;
pub use health::health_routes;
pub use memories::{memories_routes, MemoriesState};

/// Standard JSON envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

/// Create the API router with all endpoints
pub fn api_router(state: MemoriesState) -> Router {
    Router::new()
        .merge(memories_routes(state))
        .merge(auth_routes())
}
