//! Repository trait for the click log.

use crate::domain::entities::{ClickAppend, ClickEvent, NewClick};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use uuid::Uuid;

/// Storage contract for the append-only click log.
///
/// # Implementations
///
/// - [`crate::infrastructure::memory::MemoryClickRepository`]
/// - [`crate::infrastructure::persistence::PgClickRepository`]
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickRepository: Send + Sync {
    /// Appends a click event.
    ///
    /// When `new_click.dedup_token` is set and an event with the same token
    /// was recorded less than `dedup_window` away from `new_click.clicked_at`,
    /// nothing is written and the existing event is returned as
    /// [`ClickAppend::Duplicate`]. The check and the write are atomic.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] on storage failures.
    async fn append(
        &self,
        new_click: NewClick,
        dedup_window: TimeDelta,
    ) -> Result<ClickAppend, AppError>;

    /// Returns events of `link_ids` with `from <= clicked_at < to`, ordered
    /// by time then id, at most `limit` of them.
    async fn events_for_links(
        &self,
        link_ids: Vec<Uuid>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<ClickEvent>, AppError>;
}
