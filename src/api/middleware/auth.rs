//! Bearer token authentication middleware.

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::Response,
};
use axum_auth::AuthBearer;

use crate::{error::AppError, state::AppState};

/// Authenticates requests using owner tokens from the Authorization header.
///
/// # Header Format
///
/// ```text
/// Authorization: Bearer <owner_id>.<signature>
/// ```
///
/// On success the resolved [`Caller`](crate::application::services::Caller)
/// is stored in request extensions for handlers to extract with
/// `Extension<Caller>`.
///
/// # Errors
///
/// Returns `401 Unauthorized` if the header is missing, malformed, or the
/// signature does not match. Responses carry `WWW-Authenticate: Bearer`.
pub async fn layer(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let AuthBearer(token) = AuthBearer::from_request_parts(&mut parts, &())
        .await
        .map_err(|_| {
            AppError::unauthorized(
                "Unauthorized",
                serde_json::json!({"reason": "Authorization header is missing or invalid"}),
            )
        })?;

    let caller = st.auth_service.authenticate(&token)?;
    parts.extensions.insert(caller);

    let req = Request::from_parts(parts, body);

    Ok(next.run(req).await)
}
