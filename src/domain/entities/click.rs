//! Click event entity: one immutable entry of the append-only click log.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Maximum accepted length of a client-supplied dedup token.
pub const DEDUP_TOKEN_MAX_LEN: usize = 128;

/// A recorded click on a link.
///
/// Click events are never updated or deleted. `was_active` captures whether
/// the link was enabled when the click happened, so aggregation can leave
/// clicks on disabled links out.
#[derive(Debug, Clone, PartialEq)]
pub struct ClickEvent {
    pub id: Uuid,
    pub link_id: Uuid,
    pub clicked_at: DateTime<Utc>,
    pub dedup_token: Option<String>,
    pub was_active: bool,
}

impl ClickEvent {
    /// Creates a new ClickEvent instance.
    pub fn new(
        id: Uuid,
        link_id: Uuid,
        clicked_at: DateTime<Utc>,
        dedup_token: Option<String>,
        was_active: bool,
    ) -> Self {
        Self {
            id,
            link_id,
            clicked_at,
            dedup_token,
            was_active,
        }
    }
}

/// Input data for appending a click to the log.
#[derive(Debug, Clone, PartialEq)]
pub struct NewClick {
    pub link_id: Uuid,
    pub clicked_at: DateTime<Utc>,
    pub dedup_token: Option<String>,
    pub was_active: bool,
}

impl NewClick {
    pub fn into_event(self, id: Uuid) -> ClickEvent {
        ClickEvent::new(
            id,
            self.link_id,
            self.clicked_at,
            self.dedup_token,
            self.was_active,
        )
    }
}

/// Result of appending a click.
#[derive(Debug, Clone, PartialEq)]
pub enum ClickAppend {
    /// A new event was written.
    Recorded(ClickEvent),
    /// An event with the same dedup token exists inside the window; nothing was written.
    Duplicate(ClickEvent),
}
