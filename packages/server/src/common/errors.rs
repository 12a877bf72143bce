//! Application error taxonomy and HTTP mapping.
//!
//! Actions return `AppResult<T>`; the HTTP edge converts `AppError` into a
//! status code + JSON body via `IntoResponse`. Infrastructure code returns
//! `anyhow::Result` and is wrapped at the action boundary.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// The primary error type for core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Bad or missing input; user-correctable.
    #[error("{0}")]
    Validation(String),

    /// Referenced record does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Bad or missing admin credential.
    #[error("Unauthorized")]
    Unauthorized,

    /// The record exists but is not publicly visible. Rendered with the same
    /// body as a missing link so hidden content cannot be probed for.
    #[error("This link is not available.")]
    Unavailable,

    /// An external collaborator failed in a way that must surface.
    #[error("dependency failure: {0}")]
    Dependency(String),

    /// Infrastructure failure (database, serialization, ...).
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// A specialized Result type for core operations.
pub type AppResult<T> = std::result::Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{what} not found")),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            // Same status and body shape as a missing record on purpose.
            AppError::Unavailable => (
                StatusCode::NOT_FOUND,
                "This link is not available.".to_string(),
            ),
            AppError::Dependency(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            AppError::Internal(err) => {
                tracing::error!(error = %err, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Internal(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_and_missing_render_identically() {
        // Hidden records must be indistinguishable from absent ones: both are
        // 404 with a body that does not name a cause.
        let unavailable = AppError::Unavailable.into_response();
        assert_eq!(unavailable.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_validation_maps_to_bad_request() {
        let resp = AppError::Validation("At least one tag is required".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_unauthorized_maps_to_401() {
        let resp = AppError::Unauthorized.into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
