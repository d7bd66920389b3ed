//! DTOs for link collection endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::entities::{Link, LinkCollection, LinkPatch};

/// A link as seen by its owner.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkResponse {
    pub id: Uuid,
    pub title: String,
    pub url: String,
    pub icon: String,
    pub is_active: bool,
    pub position: i32,
    pub clicks: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Link> for LinkResponse {
    fn from(link: Link) -> Self {
        Self {
            id: link.id,
            title: link.title,
            url: link.url,
            icon: link.icon,
            is_active: link.is_active,
            position: link.position,
            clicks: link.click_count,
            created_at: link.created_at,
            updated_at: link.updated_at,
        }
    }
}

/// The owner's whole collection with its version.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkListResponse {
    pub owner_id: Uuid,
    pub version: i64,
    pub links: Vec<LinkResponse>,
}

impl From<LinkCollection> for LinkListResponse {
    fn from(collection: LinkCollection) -> Self {
        Self {
            owner_id: collection.owner_id,
            version: collection.version,
            links: collection.links.into_iter().map(LinkResponse::from).collect(),
        }
    }
}

/// A link as shown on a public profile. Click counts stay private.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicLinkResponse {
    pub id: Uuid,
    pub title: String,
    pub url: String,
    pub icon: String,
    pub position: i32,
}

impl From<Link> for PublicLinkResponse {
    fn from(link: Link) -> Self {
        Self {
            id: link.id,
            title: link.title,
            url: link.url,
            icon: link.icon,
            position: link.position,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicLinksResponse {
    pub owner_id: Uuid,
    pub links: Vec<PublicLinkResponse>,
}

/// Request body for `POST /api/links`.
///
/// ```json
/// { "title": "My YouTube Channel", "url": "https://youtube.com/@me", "icon": "🎥" }
/// ```
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateLinkRequest {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: String,

    #[validate(length(min = 1, max = 2048, message = "URL must be 1 to 2048 characters"))]
    pub url: String,

    pub icon: Option<String>,
}

/// Request body for `PUT`/`PATCH /api/links/{id}`.
///
/// Only provided fields are changed. Position is managed by
/// `PUT /api/links/order`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLinkRequest {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: Option<String>,

    #[validate(length(min = 1, max = 2048, message = "URL must be 1 to 2048 characters"))]
    pub url: Option<String>,

    pub icon: Option<String>,

    pub is_active: Option<bool>,
}

impl From<UpdateLinkRequest> for LinkPatch {
    fn from(req: UpdateLinkRequest) -> Self {
        LinkPatch {
            title: req.title,
            url: req.url,
            icon: req.icon,
            is_active: req.is_active,
        }
    }
}

/// Request body for `PUT /api/links/order`.
///
/// `linkIds` must list every link of the collection exactly once. Its cap
/// matches [`MAX_LINKS_PER_OWNER`](crate::domain::entities::MAX_LINKS_PER_OWNER),
/// so any stored collection can be reordered.
/// `expectedVersion`, when present, makes the call fail with 409 if the
/// collection changed since the client read it.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRequest {
    #[validate(length(max = 1000, message = "Too many links"))]
    pub link_ids: Vec<Uuid>,

    pub expected_version: Option<i64>,
}
