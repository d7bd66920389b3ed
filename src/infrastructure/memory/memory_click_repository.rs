//! In-memory implementation of click repository.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::ops::Bound::Excluded;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::{ClickAppend, ClickEvent, NewClick};
use crate::domain::repositories::ClickRepository;
use crate::error::AppError;

/// Ordering key of the log: time first, id breaks ties.
type EventKey = (DateTime<Utc>, Uuid);

#[derive(Default)]
struct ClickLog {
    events: BTreeMap<EventKey, ClickEvent>,
    /// Keys of every event carrying each dedup token.
    by_token: HashMap<String, BTreeSet<EventKey>>,
}

impl ClickLog {
    /// Event with `token` closest to `at`, if one lies strictly inside `window`.
    fn recent_with_token(
        &self,
        token: &str,
        at: DateTime<Utc>,
        window: TimeDelta,
    ) -> Option<&ClickEvent> {
        if window <= TimeDelta::zero() {
            return None;
        }
        let keys = self.by_token.get(token)?;
        let lower = (at - window, Uuid::from_u128(u128::MAX));
        let upper = (at + window, Uuid::nil());

        keys.range((Excluded(lower), Excluded(upper)))
            .min_by_key(|(clicked_at, _)| (*clicked_at - at).abs())
            .and_then(|key| self.events.get(key))
    }
}

/// Append-only click log held in process memory.
///
/// Events are kept in time order so range scans only visit the requested
/// window and stop at the limit.
#[derive(Default)]
pub struct MemoryClickRepository {
    log: RwLock<ClickLog>,
}

impl MemoryClickRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored events.
    pub async fn len(&self) -> usize {
        self.log.read().await.events.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ClickRepository for MemoryClickRepository {
    async fn append(
        &self,
        new_click: NewClick,
        dedup_window: TimeDelta,
    ) -> Result<ClickAppend, AppError> {
        let mut log = self.log.write().await;

        if let Some(token) = &new_click.dedup_token
            && let Some(existing) = log.recent_with_token(token, new_click.clicked_at, dedup_window)
        {
            return Ok(ClickAppend::Duplicate(existing.clone()));
        }

        let event = new_click.into_event(Uuid::new_v4());
        let key = (event.clicked_at, event.id);
        if let Some(token) = &event.dedup_token {
            log.by_token.entry(token.clone()).or_default().insert(key);
        }
        log.events.insert(key, event.clone());

        Ok(ClickAppend::Recorded(event))
    }

    async fn events_for_links(
        &self,
        link_ids: Vec<Uuid>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<ClickEvent>, AppError> {
        if from >= to {
            return Ok(Vec::new());
        }

        let wanted: HashSet<Uuid> = link_ids.into_iter().collect();
        let log = self.log.read().await;

        Ok(log
            .events
            .range((from, Uuid::nil())..(to, Uuid::nil()))
            .map(|(_, event)| event)
            .filter(|e| wanted.contains(&e.link_id))
            .take(limit)
            .cloned()
            .collect())
    }
}
