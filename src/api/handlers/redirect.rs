//! Handler for visitor navigation through a tracked link.

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::Redirect,
};

use crate::application::click_worker::enqueue_click;
use crate::domain::click_queue::QueuedClick;
use crate::error::AppError;
use crate::state::AppState;

use super::clicks::IDEMPOTENCY_KEY_HEADER;
use super::parse_id;

/// Redirects to the link target and records the click in the background.
///
/// # Endpoint
///
/// `GET /go/{id}`
///
/// # Flow
///
/// 1. Resolve the link; unknown and disabled links answer 404
/// 2. Queue the click without waiting (a full queue drops it)
/// 3. Respond `307 Temporary Redirect` to the target URL
pub async fn redirect_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Redirect, AppError> {
    let link_id = parse_id(&id, "link_id")?;

    let link = state.facade.resolve_for_navigation(link_id).await?;

    let token = headers
        .get(IDEMPOTENCY_KEY_HEADER)
        .and_then(|v| v.to_str().ok());
    enqueue_click(&state.click_sender, QueuedClick::new(link.id, token));

    Ok(Redirect::temporary(&link.url))
}
