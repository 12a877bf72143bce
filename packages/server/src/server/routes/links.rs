//! Public routes: submission, reporting, the feed, and the scan callback.

use axum::extract::{Extension, Path};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};

use crate::common::{AppError, AppResult, LinkId};
use crate::domains::links::actions::{queries, report, scan, submit};
use crate::domains::links::models::ScanVerdict;
use crate::server::app::AxumAppState;

/// `POST /api/submit` - accept a link submission.
pub async fn submit_handler(
    Extension(state): Extension<AxumAppState>,
    Json(input): Json<submit::SubmitLink>,
) -> AppResult<Json<JsonValue>> {
    let receipt = submit::submit_link(input, &state.deps).await?;
    Ok(Json(json!({
        "success": true,
        "linkId": receipt.link_id,
        // Inform the client that a scan is in progress
        "securityStatus": receipt.security_status,
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub link_id: String,
    pub reporter_id: String,
    pub reason: String,
}

/// `POST /api/report` - community report with reporter dedup.
pub async fn report_handler(
    Extension(state): Extension<AxumAppState>,
    Json(request): Json<ReportRequest>,
) -> AppResult<Json<report::ReportReceipt>> {
    // A malformed id cannot resolve to a record, so it reads as missing.
    let link_id =
        LinkId::parse(&request.link_id).map_err(|_| AppError::NotFound("Link"))?;

    let receipt =
        report::report_link(link_id, &request.reporter_id, &request.reason, &state.deps).await?;
    Ok(Json(receipt))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResultRequest {
    pub link_id: String,
    pub verdict: ScanVerdict,
    #[serde(default)]
    pub detail: JsonValue,
}

/// `POST /api/scan/result` - callback for an external scan engine.
pub async fn scan_result_handler(
    Extension(state): Extension<AxumAppState>,
    Json(request): Json<ScanResultRequest>,
) -> AppResult<Json<JsonValue>> {
    let link_id =
        LinkId::parse(&request.link_id).map_err(|_| AppError::NotFound("Link"))?;

    scan::apply_scan_result(link_id, request.verdict, request.detail, &state.deps).await?;
    Ok(Json(json!({ "success": true })))
}

/// `GET /api/links` - the public feed, approved records only.
pub async fn public_list_handler(
    Extension(state): Extension<AxumAppState>,
) -> AppResult<Json<JsonValue>> {
    let links = queries::public_list(&state.deps).await?;
    Ok(Json(json!({ "links": links })))
}

/// `GET /api/links/{id}` - one record, if it is publicly visible.
pub async fn public_get_handler(
    Extension(state): Extension<AxumAppState>,
    Path(id): Path<String>,
) -> AppResult<Json<JsonValue>> {
    // Malformed, missing, and hidden all collapse into the same answer.
    let link_id = LinkId::parse(&id).map_err(|_| AppError::Unavailable)?;
    let link = queries::public_get(link_id, &state.deps).await?;
    Ok(Json(json!({ "link": link })))
}
