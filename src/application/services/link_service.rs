//! Link collection management service.

use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use crate::domain::entities::{
    DEFAULT_ICON, ICON_MAX_CHARS, Link, LinkCollection, LinkPatch, NewLink, TITLE_MAX_CHARS,
};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::url_validator::validate_link_url;

/// Service for creating, editing and ordering an owner's links.
///
/// Validates and normalizes user input before it reaches the repository.
/// Position bookkeeping is left entirely to the repository.
pub struct LinkService<L: LinkRepository + ?Sized> {
    repository: Arc<L>,
}

impl<L: LinkRepository + ?Sized> LinkService<L> {
    /// Creates a new link service.
    pub fn new(repository: Arc<L>) -> Self {
        Self { repository }
    }

    /// Returns the owner's collection ordered by position.
    pub async fn list(&self, owner_id: Uuid) -> Result<LinkCollection, AppError> {
        self.repository.list(owner_id).await
    }

    /// Returns the owner's active links in position order.
    ///
    /// Positions are reported as stored, so the public view may skip numbers
    /// where disabled links sit.
    pub async fn list_public(&self, owner_id: Uuid) -> Result<Vec<Link>, AppError> {
        let collection = self.repository.list(owner_id).await?;
        Ok(collection
            .links
            .into_iter()
            .filter(|l| l.is_active)
            .collect())
    }

    /// Looks a link up by id regardless of owner.
    pub async fn find(&self, link_id: Uuid) -> Result<Option<Link>, AppError> {
        self.repository.find(link_id).await
    }

    /// Returns a link owned by `owner_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the link does not exist or belongs to
    /// someone else.
    pub async fn get(&self, owner_id: Uuid, link_id: Uuid) -> Result<Link, AppError> {
        self.repository
            .find(link_id)
            .await?
            .filter(|l| l.is_owned_by(owner_id))
            .ok_or_else(|| {
                AppError::not_found(
                    "Link not found",
                    json!({ "owner_id": owner_id, "link_id": link_id }),
                )
            })
    }

    /// Appends a new link to the end of the owner's collection.
    ///
    /// A missing or blank icon falls back to [`DEFAULT_ICON`].
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if:
    /// - Title is blank or longer than [`TITLE_MAX_CHARS`]
    /// - URL is not an absolute http(s) URL
    /// - Icon is longer than [`ICON_MAX_CHARS`]
    pub async fn create(
        &self,
        owner_id: Uuid,
        title: &str,
        url: &str,
        icon: Option<&str>,
    ) -> Result<Link, AppError> {
        let new_link = NewLink {
            owner_id,
            title: validate_title(title)?,
            url: validate_url(url)?,
            icon: validate_icon(icon)?,
        };

        let link = self.repository.create(new_link).await?;
        tracing::info!(owner_id = %owner_id, link_id = %link.id, position = link.position, "Link created");
        Ok(link)
    }

    /// Applies a partial update. Position and click count are never changed here.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for an empty patch or invalid fields,
    /// and [`AppError::NotFound`] if the link does not belong to `owner_id`.
    pub async fn update(
        &self,
        owner_id: Uuid,
        link_id: Uuid,
        patch: LinkPatch,
    ) -> Result<Link, AppError> {
        if patch.is_empty() {
            return Err(AppError::bad_request(
                "No fields to update",
                json!({ "fields": ["title", "url", "icon", "isActive"] }),
            ));
        }

        let patch = LinkPatch {
            title: patch.title.as_deref().map(validate_title).transpose()?,
            url: patch.url.as_deref().map(validate_url).transpose()?,
            icon: match patch.icon.as_deref() {
                Some(icon) => Some(validate_icon(Some(icon))?),
                None => None,
            },
            is_active: patch.is_active,
        };

        self.repository.update(owner_id, link_id, patch).await
    }

    /// Deletes a link and compacts the positions after it.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the link does not belong to `owner_id`.
    pub async fn delete(&self, owner_id: Uuid, link_id: Uuid) -> Result<(), AppError> {
        if !self.repository.delete(owner_id, link_id).await? {
            return Err(AppError::not_found(
                "Link not found",
                json!({ "owner_id": owner_id, "link_id": link_id }),
            ));
        }

        tracing::info!(owner_id = %owner_id, link_id = %link_id, "Link deleted");
        Ok(())
    }

    /// Replaces the order of the owner's links.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `ordered` is not a permutation of
    /// the current ids, [`AppError::Conflict`] on a stale `expected_version`.
    pub async fn reorder(
        &self,
        owner_id: Uuid,
        ordered: Vec<Uuid>,
        expected_version: Option<i64>,
    ) -> Result<LinkCollection, AppError> {
        let collection = self
            .repository
            .reorder(owner_id, ordered, expected_version)
            .await?;

        tracing::info!(owner_id = %owner_id, version = collection.version, "Links reordered");
        Ok(collection)
    }

    /// Checks that the backing store is reachable.
    pub async fn health_check(&self) -> Result<(), AppError> {
        self.repository.health_check().await
    }
}

fn validate_title(title: &str) -> Result<String, AppError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::bad_request(
            "Title must not be empty",
            json!({ "field": "title" }),
        ));
    }
    if title.chars().count() > TITLE_MAX_CHARS {
        return Err(AppError::bad_request(
            "Title is too long",
            json!({ "field": "title", "max_chars": TITLE_MAX_CHARS }),
        ));
    }
    Ok(title.to_string())
}

fn validate_url(url: &str) -> Result<String, AppError> {
    validate_link_url(url).map_err(|e| {
        AppError::bad_request(
            "Invalid URL format",
            json!({ "field": "url", "reason": e.to_string() }),
        )
    })
}

fn validate_icon(icon: Option<&str>) -> Result<String, AppError> {
    let icon = icon.map(str::trim).unwrap_or_default();
    if icon.is_empty() {
        return Ok(DEFAULT_ICON.to_string());
    }
    if icon.chars().count() > ICON_MAX_CHARS {
        return Err(AppError::bad_request(
            "Icon is too long",
            json!({ "field": "icon", "max_chars": ICON_MAX_CHARS }),
        ));
    }
    Ok(icon.to_string())
}
