//! Admin routes. All of these sit behind `admin_auth_middleware`.

use axum::extract::{Extension, Path, Query};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};

use crate::common::{AppError, AppResult, LinkId};
use crate::domains::links::actions::{moderation, queries};
use crate::domains::links::models::LinkUpdate;
use crate::server::app::AxumAppState;

#[derive(Debug, Default, Deserialize)]
pub struct AdminListQuery {
    pub filter: Option<String>,
}

/// `GET /api/admin/links?filter=` - the unfiltered operator view, with the
/// dashboard's derived filters.
pub async fn admin_list_handler(
    Extension(state): Extension<AxumAppState>,
    Query(query): Query<AdminListQuery>,
) -> AppResult<Json<JsonValue>> {
    let filter = query
        .filter
        .as_deref()
        .map(str::parse)
        .transpose()
        .map_err(|error: anyhow::Error| AppError::Validation(error.to_string()))?
        .unwrap_or_default();

    let links = queries::admin_list(filter, &state.deps).await?;
    Ok(Json(json!({ "links": links })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdminUpdateRequest {
    pub link_id: Option<String>,
    pub updates: Option<LinkUpdate>,
}

/// `PATCH /api/admin/links` - allow-listed field edits.
pub async fn admin_update_handler(
    Extension(state): Extension<AxumAppState>,
    Json(request): Json<AdminUpdateRequest>,
) -> AppResult<Json<JsonValue>> {
    let (Some(link_id), Some(updates)) = (request.link_id, request.updates) else {
        return Err(AppError::Validation("Link ID and updates required".into()));
    };
    let link_id = LinkId::parse(&link_id).map_err(|_| AppError::NotFound("Link"))?;

    moderation::update_link(link_id, updates, &state.deps).await?;
    Ok(Json(json!({ "success": true })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdminDeleteRequest {
    pub link_id: Option<String>,
}

/// `DELETE /api/admin/links` - hard removal.
pub async fn admin_delete_handler(
    Extension(state): Extension<AxumAppState>,
    Json(request): Json<AdminDeleteRequest>,
) -> AppResult<Json<JsonValue>> {
    let Some(link_id) = request.link_id else {
        return Err(AppError::Validation("Link ID required".into()));
    };
    let link_id = LinkId::parse(&link_id).map_err(|_| AppError::NotFound("Link"))?;

    moderation::delete_link(link_id, &state.deps).await?;
    Ok(Json(json!({ "success": true })))
}

/// `POST /api/admin/links/:id/toggle-flag` - flag ⇄ approve helper.
pub async fn admin_toggle_flag_handler(
    Extension(state): Extension<AxumAppState>,
    Path(id): Path<String>,
) -> AppResult<Json<JsonValue>> {
    let link_id = LinkId::parse(&id).map_err(|_| AppError::NotFound("Link"))?;
    let status = moderation::toggle_flag(link_id, &state.deps).await?;
    Ok(Json(json!({ "success": true, "status": status })))
}
