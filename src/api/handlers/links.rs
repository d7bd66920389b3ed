//! Handlers for the caller's own link collection.
//!
//! The owner is always the authenticated caller; there is no way to address
//! another owner's collection through these endpoints.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::links::{
    CreateLinkRequest, LinkListResponse, LinkResponse, ReorderRequest, UpdateLinkRequest,
};
use crate::application::services::Caller;
use crate::error::AppError;
use crate::state::AppState;

use super::parse_id;

/// Lists the caller's links ordered by position.
///
/// # Endpoint
///
/// `GET /api/links`
///
/// Disabled links are included; the response carries the collection
/// `version` to pass back as `expectedVersion` when reordering.
pub async fn list_links_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<LinkListResponse>, AppError> {
    let collection = state.facade.list_links(&caller, caller.owner_id).await?;
    Ok(Json(collection.into()))
}

/// Appends a link at the end of the caller's collection.
///
/// # Endpoint
///
/// `POST /api/links`
///
/// # Request Body
///
/// ```json
/// { "title": "Blog", "url": "https://blog.example.com", "icon": "📝" }
/// ```
///
/// # Errors
///
/// - **400**: empty or too long title, invalid URL, oversized icon
pub async fn create_link_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(payload): Json<CreateLinkRequest>,
) -> Result<(StatusCode, Json<LinkResponse>), AppError> {
    payload.validate()?;

    let link = state
        .facade
        .create_link(
            &caller,
            caller.owner_id,
            &payload.title,
            &payload.url,
            payload.icon.as_deref(),
        )
        .await?;

    tracing::info!(owner_id = %caller.owner_id, link_id = %link.id, position = link.position, "Link created");

    Ok((StatusCode::CREATED, Json(link.into())))
}

/// Partially updates a link.
///
/// # Endpoint
///
/// `PUT /api/links/{id}` or `PATCH /api/links/{id}`
///
/// # Request Body
///
/// All fields are optional, at least one is required.
///
/// ```json
/// { "title": "New title", "isActive": false }
/// ```
///
/// # Errors
///
/// - **400**: empty body or invalid field
/// - **404**: link does not exist in the caller's collection
pub async fn update_link_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateLinkRequest>,
) -> Result<Json<LinkResponse>, AppError> {
    payload.validate()?;
    let link_id = parse_id(&id, "link_id")?;

    let link = state
        .facade
        .update_link(&caller, caller.owner_id, link_id, payload.into())
        .await?;

    Ok(Json(link.into()))
}

/// Deletes a link and closes the gap it leaves in the ordering.
///
/// # Endpoint
///
/// `DELETE /api/links/{id}`
///
/// Returns `204 No Content`. Click history of the link is kept.
pub async fn delete_link_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let link_id = parse_id(&id, "link_id")?;

    state
        .facade
        .delete_link(&caller, caller.owner_id, link_id)
        .await?;

    tracing::info!(owner_id = %caller.owner_id, link_id = %link_id, "Link deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Replaces the ordering of the caller's collection.
///
/// # Endpoint
///
/// `PUT /api/links/order`
///
/// # Request Body
///
/// ```json
/// { "linkIds": ["…", "…"], "expectedVersion": 7 }
/// ```
///
/// # Errors
///
/// - **400** (`position_mismatch`): ids are not a permutation of the collection
/// - **409**: `expectedVersion` no longer matches
pub async fn reorder_links_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(payload): Json<ReorderRequest>,
) -> Result<Json<LinkListResponse>, AppError> {
    payload.validate()?;

    let collection = state
        .facade
        .reorder_links(
            &caller,
            caller.owner_id,
            payload.link_ids,
            payload.expected_version,
        )
        .await?;

    tracing::info!(
        owner_id = %caller.owner_id,
        version = collection.version,
        links = collection.len(),
        "Links reordered"
    );

    Ok(Json(collection.into()))
}
