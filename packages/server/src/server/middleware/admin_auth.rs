//! Admin credential middleware.
//!
//! Every /api/admin route requires `Authorization: Bearer <ADMIN_PASSWORD>`
//! with the full header matching exactly; anything else is a 401 before the
//! handler runs.

use axum::{
    extract::{Extension, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::common::AppError;
use crate::server::app::AxumAppState;

/// Middleware gating the moderation surface behind the shared credential.
pub async fn admin_auth_middleware(
    Extension(state): Extension<AxumAppState>,
    request: Request,
    next: Next,
) -> Response {
    let expected = format!("Bearer {}", state.deps.admin_password);

    let authorized = request
        .headers()
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .map(|value| value == expected)
        .unwrap_or(false);

    if !authorized {
        return AppError::Unauthorized.into_response();
    }

    next.run(request).await
}
