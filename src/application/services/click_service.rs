//! Click recording service.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use serde_json::json;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use uuid::Uuid;

use crate::domain::entities::{ClickAppend, DEDUP_TOKEN_MAX_LEN, NewClick};
use crate::domain::repositories::{ClickRepository, LinkRepository};
use crate::error::AppError;

/// Default window inside which a repeated dedup token is ignored.
pub const DEFAULT_DEDUP_WINDOW_SECONDS: i64 = 5;

/// What happened to a click handed to [`ClickService::record_click`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// A new event was appended and the counter bumped.
    Recorded,
    /// The dedup token matched a recent event; nothing was written.
    Duplicate,
    /// Storage failed; the click was logged and discarded.
    Dropped,
}

impl ClickOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Recorded => "recorded",
            Self::Duplicate => "duplicate",
            Self::Dropped => "dropped",
        }
    }
}

/// Service for appending clicks to the log.
///
/// Unknown links are reported to the caller. Storage failures are not:
/// the click is logged, counted in `clicks_dropped_total` and reported as
/// [`ClickOutcome::Dropped`] so the navigation it belongs to never fails.
pub struct ClickService<L: LinkRepository + ?Sized, C: ClickRepository + ?Sized> {
    link_repository: Arc<L>,
    click_repository: Arc<C>,
    dedup_window: TimeDelta,
}

impl<L: LinkRepository + ?Sized, C: ClickRepository + ?Sized> ClickService<L, C> {
    /// Creates a new click service.
    pub fn new(link_repository: Arc<L>, click_repository: Arc<C>, dedup_window: TimeDelta) -> Self {
        Self {
            link_repository,
            click_repository,
            dedup_window,
        }
    }

    /// Records a click happening now.
    pub async fn record_click(
        &self,
        link_id: Uuid,
        dedup_token: Option<&str>,
    ) -> Result<ClickOutcome, AppError> {
        self.record_click_at(link_id, dedup_token, Utc::now()).await
    }

    /// Records a click that happened at `clicked_at`.
    ///
    /// Clicks on disabled links are still recorded, flagged with
    /// `was_active = false`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for an unknown link and
    /// [`AppError::Validation`] for an oversized dedup token.
    pub async fn record_click_at(
        &self,
        link_id: Uuid,
        dedup_token: Option<&str>,
        clicked_at: DateTime<Utc>,
    ) -> Result<ClickOutcome, AppError> {
        let dedup_token = normalize_dedup_token(dedup_token)?;

        let link = match self.link_repository.find(link_id).await {
            Ok(Some(link)) => link,
            Ok(None) => {
                return Err(AppError::not_found(
                    "Link not found",
                    json!({ "link_id": link_id }),
                ));
            }
            Err(e) => return Ok(dropped(link_id, "lookup", &e)),
        };

        let new_click = NewClick {
            link_id,
            clicked_at,
            dedup_token,
            was_active: link.is_active,
        };

        match self.click_repository.append(new_click, self.dedup_window).await {
            Ok(ClickAppend::Recorded(_)) => {}
            Ok(ClickAppend::Duplicate(existing)) => {
                tracing::debug!(link_id = %link_id, event_id = %existing.id, "Duplicate click ignored");
                metrics::counter!("clicks_duplicate_total").increment(1);
                return Ok(ClickOutcome::Duplicate);
            }
            Err(e) => return Ok(dropped(link_id, "append", &e)),
        }

        self.increment_with_retry(link_id).await;
        metrics::counter!("clicks_recorded_total").increment(1);

        Ok(ClickOutcome::Recorded)
    }

    /// Bumps the link counter, retrying transient failures.
    ///
    /// The event is already in the log at this point, so a final failure is
    /// only logged.
    async fn increment_with_retry(&self, link_id: Uuid) {
        let strategy = ExponentialBackoff::from_millis(10).map(jitter).take(3);

        let result = Retry::spawn(strategy, || async {
            self.link_repository.increment_clicks(link_id).await
        })
        .await;

        if let Err(e) = result {
            tracing::warn!(link_id = %link_id, error = %e, "Failed to increment click counter");
            metrics::counter!("click_counter_failures_total").increment(1);
        }
    }
}

fn dropped(link_id: Uuid, stage: &'static str, error: &AppError) -> ClickOutcome {
    tracing::warn!(link_id = %link_id, stage, error = %error, "Click dropped");
    metrics::counter!("clicks_dropped_total", "stage" => stage).increment(1);
    ClickOutcome::Dropped
}

/// Trims a client dedup token; blank tokens count as absent.
///
/// # Errors
///
/// Returns [`AppError::Validation`] for tokens longer than
/// [`DEDUP_TOKEN_MAX_LEN`] bytes.
pub fn normalize_dedup_token(token: Option<&str>) -> Result<Option<String>, AppError> {
    let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(None);
    };
    if token.len() > DEDUP_TOKEN_MAX_LEN {
        return Err(AppError::bad_request(
            "Dedup token is too long",
            json!({ "field": "dedupToken", "max_len": DEDUP_TOKEN_MAX_LEN }),
        ));
    }
    Ok(Some(token.to_string()))
}
