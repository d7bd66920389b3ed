//! Repository trait for link collections.

use crate::domain::entities::{Link, LinkCollection, LinkPatch, NewLink};
use crate::error::AppError;
use async_trait::async_trait;
use uuid::Uuid;

/// Storage contract for owners' link collections.
///
/// Implementations own every write to `position` and `click_count`.
/// `create`, `delete` and `reorder` must run under an exclusive section per
/// owner so that positions stay exactly `0..n` for every reader, and must be
/// all-or-nothing: a failed or cancelled call leaves no partial change.
///
/// # Implementations
///
/// - [`crate::infrastructure::memory::MemoryLinkRepository`]
/// - [`crate::infrastructure::persistence::PgLinkRepository`]
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Returns the owner's links ordered by position, with the collection version.
    ///
    /// An owner without links gets an empty collection at version 0.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] when storage is unavailable.
    async fn list(&self, owner_id: Uuid) -> Result<LinkCollection, AppError>;

    /// Finds a link by id regardless of owner.
    async fn find(&self, link_id: Uuid) -> Result<Option<Link>, AppError>;

    /// Appends a link at position `n` and bumps the collection version.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] (`collection_full`) if the owner
    /// already has [`crate::domain::entities::MAX_LINKS_PER_OWNER`] links.
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError>;

    /// Partially updates title, url, icon or active flag.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if `link_id` does not belong to `owner_id`.
    async fn update(&self, owner_id: Uuid, link_id: Uuid, patch: LinkPatch)
    -> Result<Link, AppError>;

    /// Removes a link and shifts every later link down by one position.
    ///
    /// Returns `Ok(false)` if the link does not belong to `owner_id`.
    async fn delete(&self, owner_id: Uuid, link_id: Uuid) -> Result<bool, AppError>;

    /// Rewrites positions so that `ordered[i]` ends up at position `i`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `ordered` is not a permutation of
    /// the owner's current link ids, and [`AppError::Conflict`] if
    /// `expected_version` is given and differs from the current version.
    /// In both cases the stored order is unchanged.
    async fn reorder(
        &self,
        owner_id: Uuid,
        ordered: Vec<Uuid>,
        expected_version: Option<i64>,
    ) -> Result<LinkCollection, AppError>;

    /// Atomically increments the link's click counter.
    ///
    /// Does not take the owner's exclusive section.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the link no longer exists.
    async fn increment_clicks(&self, link_id: Uuid) -> Result<(), AppError>;

    /// Verifies the storage backend is reachable.
    async fn health_check(&self) -> Result<(), AppError>;
}
