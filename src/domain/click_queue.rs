//! Click message for asynchronous recording.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A click accepted on the navigation path, waiting to be recorded.
///
/// The redirect handler hands these to a bounded channel so a slow or
/// failing click log never delays the redirect itself. The background
/// worker ([`crate::application::click_worker::run_click_worker`]) records
/// them through the click service.
#[derive(Debug, Clone)]
pub struct QueuedClick {
    pub link_id: Uuid,
    pub dedup_token: Option<String>,
    pub received_at: DateTime<Utc>,
}

impl QueuedClick {
    pub fn new(link_id: Uuid, dedup_token: Option<&str>) -> Self {
        Self {
            link_id,
            dedup_token: dedup_token.map(|s| s.to_string()),
            received_at: Utc::now(),
        }
    }
}
