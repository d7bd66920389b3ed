//! Handler for explicit click reporting.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::HeaderMap,
};
use serde_json::json;

use crate::api::dto::clicks::{RecordClickRequest, RecordClickResponse};
use crate::error::AppError;
use crate::state::AppState;

use super::parse_id;

/// Header carrying a client-side dedup token.
pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

/// Records a click on a link.
///
/// # Endpoint
///
/// `POST /public/links/{id}/click`
///
/// # Request Body
///
/// Optional. `{ "dedupToken": "…" }`, or an `Idempotency-Key` header.
///
/// # Response
///
/// ```json
/// { "outcome": "recorded" }
/// ```
///
/// `outcome` is `recorded`, `duplicate` (same token inside the dedup window)
/// or `dropped` (storage failure, logged). Only an unknown link is an error.
pub async fn record_click_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<RecordClickResponse>, AppError> {
    let link_id = parse_id(&id, "link_id")?;

    let request = if body.iter().all(u8::is_ascii_whitespace) {
        RecordClickRequest::default()
    } else {
        serde_json::from_slice::<RecordClickRequest>(&body).map_err(|e| {
            AppError::bad_request("Invalid request body", json!({ "reason": e.to_string() }))
        })?
    };

    let dedup_token = request.dedup_token.or_else(|| {
        headers
            .get(IDEMPOTENCY_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
    });

    let outcome = state
        .facade
        .record_click(link_id, dedup_token.as_deref())
        .await?;

    Ok(Json(outcome.into()))
}
