//! Link entity: one entry of an owner's ordered collection.

use chrono::{DateTime, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::error::AppError;

/// Glyph used when a link is created without an icon.
pub const DEFAULT_ICON: &str = "🔗";

/// Maximum title length in characters.
pub const TITLE_MAX_CHARS: usize = 100;

/// Maximum icon length in characters.
pub const ICON_MAX_CHARS: usize = 16;

/// Maximum number of links in one owner's collection.
pub const MAX_LINKS_PER_OWNER: usize = 1000;

/// Error returned when an owner's collection already holds
/// [`MAX_LINKS_PER_OWNER`] links.
pub fn collection_full(owner_id: Uuid) -> AppError {
    AppError::bad_request(
        "Link collection is full",
        json!({
            "reason": "collection_full",
            "owner_id": owner_id,
            "max_links": MAX_LINKS_PER_OWNER,
        }),
    )
}

/// A link displayed on an owner's profile.
///
/// `position` is the zero-based rank inside the owner's collection. For a
/// collection of `n` links the positions are exactly `0..n`. Only the link
/// store writes `position` and `click_count`.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub url: String,
    pub icon: String,
    pub is_active: bool,
    pub position: i32,
    pub click_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Link {
    /// Creates a new Link instance.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: Uuid,
        owner_id: Uuid,
        title: String,
        url: String,
        icon: String,
        is_active: bool,
        position: i32,
        click_count: i64,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner_id,
            title,
            url,
            icon,
            is_active,
            position,
            click_count,
            created_at,
            updated_at,
        }
    }

    /// Returns true if `owner_id` owns this link.
    pub fn is_owned_by(&self, owner_id: Uuid) -> bool {
        self.owner_id == owner_id
    }

    /// Applies a partial update. Position and click count are never touched.
    pub fn apply(&mut self, patch: LinkPatch, now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(url) = patch.url {
            self.url = url;
        }
        if let Some(icon) = patch.icon {
            self.icon = icon;
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
        self.updated_at = now;
    }
}

/// Input data for appending a link to an owner's collection.
///
/// Fields are expected to be validated already; the store assigns the id,
/// the position and the timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLink {
    pub owner_id: Uuid,
    pub title: String,
    pub url: String,
    pub icon: String,
}

/// Partial update for an existing link.
///
/// `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkPatch {
    pub title: Option<String>,
    pub url: Option<String>,
    pub icon: Option<String>,
    pub is_active: Option<bool>,
}

impl LinkPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.url.is_none() && self.icon.is_none() && self.is_active.is_none()
    }
}

/// Snapshot of an owner's collection, ordered by position.
///
/// `version` increases with every create, delete and reorder, so a client
/// holding a stale snapshot can be told its reorder no longer applies.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkCollection {
    pub owner_id: Uuid,
    pub version: i64,
    pub links: Vec<Link>,
}

impl LinkCollection {
    pub fn empty(owner_id: Uuid) -> Self {
        Self {
            owner_id,
            version: 0,
            links: Vec::new(),
        }
    }

    pub fn ids(&self) -> Vec<Uuid> {
        self.links.iter().map(|l| l.id).collect()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}
