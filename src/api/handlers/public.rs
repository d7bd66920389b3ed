//! Handler for public profile pages.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::dto::links::{PublicLinkResponse, PublicLinksResponse};
use crate::error::AppError;
use crate::state::AppState;

use super::parse_id;

/// Lists an owner's active links in display order.
///
/// # Endpoint
///
/// `GET /public/{owner_id}/links`
///
/// No authentication. An owner without links yields an empty list.
pub async fn public_links_handler(
    State(state): State<AppState>,
    Path(owner): Path<String>,
) -> Result<Json<PublicLinksResponse>, AppError> {
    let owner_id = parse_id(&owner, "owner_id")?;

    let links = state.facade.public_links(owner_id).await?;

    Ok(Json(PublicLinksResponse {
        owner_id,
        links: links.into_iter().map(PublicLinkResponse::from).collect(),
    }))
}
