//! Workflow errors as HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use journey_core::WorkflowError;
use serde::Serialize;
use tracing::error;

/// Error body: `{ "success": false, "error": "...", "login_url": "..." }`
#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    login_url: Option<String>,
}

/// Handler error carrying its status code.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    /// Set for 401 so clients know where to authenticate
    pub login_url: Option<String>,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            login_url: None,
        }
    }

    /// Map a workflow failure; `login_path` is attached to 401 responses.
    pub fn from_workflow(err: WorkflowError, login_path: &str) -> Self {
        let status = match &err {
            WorkflowError::Unauthorized => StatusCode::UNAUTHORIZED,
            WorkflowError::Forbidden => StatusCode::FORBIDDEN,
            WorkflowError::Validation(_) => StatusCode::BAD_REQUEST,
            WorkflowError::NotFound(_) => StatusCode::NOT_FOUND,
            WorkflowError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            WorkflowError::Upload(_) | WorkflowError::Session(_) => StatusCode::BAD_GATEWAY,
        };
        if status.is_server_error() {
            error!(%status, "Request failed: {}", err);
        }
        Self {
            status,
            message: err.to_string(),
            login_url: (status == StatusCode::UNAUTHORIZED).then(|| login_path.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            error: self.message,
            login_url: self.login_url,
        };
        (self.status, Json(body)).into_response()
    }
}
