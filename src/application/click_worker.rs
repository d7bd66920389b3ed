//! Background processing of clicks accepted on the redirect path.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::application::services::ClickService;
use crate::domain::click_queue::QueuedClick;
use crate::domain::repositories::{ClickRepository, LinkRepository};

/// Hands a click to the worker without waiting.
///
/// Returns `false` when the queue is full or the worker is gone; the click
/// is then dropped and counted, never retried.
pub fn enqueue_click(sender: &mpsc::Sender<QueuedClick>, click: QueuedClick) -> bool {
    match sender.try_send(click) {
        Ok(()) => true,
        Err(TrySendError::Full(click)) => {
            tracing::warn!(link_id = %click.link_id, "Click queue full, click dropped");
            metrics::counter!("clicks_dropped_total", "stage" => "queue_full").increment(1);
            false
        }
        Err(TrySendError::Closed(click)) => {
            tracing::error!(link_id = %click.link_id, "Click queue closed, click dropped");
            metrics::counter!("clicks_dropped_total", "stage" => "queue_closed").increment(1);
            false
        }
    }
}

/// Drains the click queue until every sender is dropped.
///
/// Each click goes through [`ClickService::record_click_at`] with the time it
/// was received, so queueing delay does not shift it into another day.
pub async fn run_click_worker<L, C>(
    mut receiver: mpsc::Receiver<QueuedClick>,
    clicks: Arc<ClickService<L, C>>,
) where
    L: LinkRepository + ?Sized,
    C: ClickRepository + ?Sized,
{
    while let Some(click) = receiver.recv().await {
        match clicks
            .record_click_at(click.link_id, click.dedup_token.as_deref(), click.received_at)
            .await
        {
            Ok(outcome) => {
                tracing::debug!(link_id = %click.link_id, outcome = outcome.as_str(), "Queued click processed");
            }
            Err(e) => {
                tracing::warn!(link_id = %click.link_id, error = %e, "Queued click rejected");
                metrics::counter!("clicks_dropped_total", "stage" => "rejected").increment(1);
            }
        }
    }

    tracing::info!("Click worker stopped");
}
