//! In-memory implementation of link repository.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use serde_json::json;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::{
    Link, LinkCollection, LinkPatch, MAX_LINKS_PER_OWNER, NewLink, collection_full,
};
use crate::domain::ordering::{compacted_position, is_contiguous, plan_reorder};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

struct StoredLink {
    link: Link,
    clicks: Arc<AtomicI64>,
}

impl StoredLink {
    fn snapshot(&self) -> Link {
        let mut link = self.link.clone();
        link.click_count = self.clicks.load(Ordering::Acquire);
        link
    }
}

/// An owner's links; the vector index is the position.
#[derive(Default)]
struct OwnerCollection {
    version: i64,
    links: Vec<StoredLink>,
}

impl OwnerCollection {
    fn snapshot(&self, owner_id: Uuid) -> LinkCollection {
        LinkCollection {
            owner_id,
            version: self.version,
            links: self.links.iter().map(StoredLink::snapshot).collect(),
        }
    }

    fn index_of(&self, link_id: Uuid) -> Option<usize> {
        self.links.iter().position(|s| s.link.id == link_id)
    }

    fn positions_are_contiguous(&self) -> bool {
        self.links
            .iter()
            .enumerate()
            .all(|(i, s)| s.link.position == i as i32)
            && is_contiguous(self.links.iter().map(|s| s.link.position))
    }
}

struct LinkSlot {
    owner_id: Uuid,
    clicks: Arc<AtomicI64>,
}

/// Link storage held in process memory.
///
/// State is lost on restart.
#[derive(Default)]
pub struct MemoryLinkRepository {
    collections: DashMap<Uuid, Arc<RwLock<OwnerCollection>>>,
    index: DashMap<Uuid, LinkSlot>,
}

impl MemoryLinkRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn collection(&self, owner_id: Uuid) -> Option<Arc<RwLock<OwnerCollection>>> {
        self.collections.get(&owner_id).map(|c| c.value().clone())
    }

    fn collection_or_default(&self, owner_id: Uuid) -> Arc<RwLock<OwnerCollection>> {
        self.collections.entry(owner_id).or_default().value().clone()
    }
}

fn link_not_found(owner_id: Uuid, link_id: Uuid) -> AppError {
    AppError::not_found(
        "Link not found",
        json!({ "owner_id": owner_id, "link_id": link_id }),
    )
}

#[async_trait]
impl LinkRepository for MemoryLinkRepository {
    async fn list(&self, owner_id: Uuid) -> Result<LinkCollection, AppError> {
        match self.collection(owner_id) {
            Some(collection) => Ok(collection.read().await.snapshot(owner_id)),
            None => Ok(LinkCollection::empty(owner_id)),
        }
    }

    async fn find(&self, link_id: Uuid) -> Result<Option<Link>, AppError> {
        let Some(owner_id) = self.index.get(&link_id).map(|slot| slot.owner_id) else {
            return Ok(None);
        };
        let Some(collection) = self.collection(owner_id) else {
            return Ok(None);
        };

        let guard = collection.read().await;
        Ok(guard
            .index_of(link_id)
            .map(|i| guard.links[i].snapshot()))
    }

    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let collection = self.collection_or_default(new_link.owner_id);
        let mut guard = collection.write().await;

        if guard.links.len() >= MAX_LINKS_PER_OWNER {
            return Err(collection_full(new_link.owner_id));
        }

        let now = Utc::now();
        let link = Link::new(
            Uuid::new_v4(),
            new_link.owner_id,
            new_link.title,
            new_link.url,
            new_link.icon,
            true,
            guard.links.len() as i32,
            0,
            now,
            now,
        );
        let clicks = Arc::new(AtomicI64::new(0));

        self.index.insert(
            link.id,
            LinkSlot {
                owner_id: link.owner_id,
                clicks: clicks.clone(),
            },
        );
        guard.links.push(StoredLink {
            link: link.clone(),
            clicks,
        });
        guard.version += 1;

        debug_assert!(guard.positions_are_contiguous());
        Ok(link)
    }

    async fn update(
        &self,
        owner_id: Uuid,
        link_id: Uuid,
        patch: LinkPatch,
    ) -> Result<Link, AppError> {
        let collection = self
            .collection(owner_id)
            .ok_or_else(|| link_not_found(owner_id, link_id))?;
        let mut guard = collection.write().await;

        let i = guard
            .index_of(link_id)
            .ok_or_else(|| link_not_found(owner_id, link_id))?;
        guard.links[i].link.apply(patch, Utc::now());

        Ok(guard.links[i].snapshot())
    }

    async fn delete(&self, owner_id: Uuid, link_id: Uuid) -> Result<bool, AppError> {
        let Some(collection) = self.collection(owner_id) else {
            return Ok(false);
        };
        let mut guard = collection.write().await;

        let Some(i) = guard.index_of(link_id) else {
            return Ok(false);
        };

        let removed = guard.links.remove(i);
        let removed_position = removed.link.position;
        for stored in guard.links.iter_mut() {
            stored.link.position = compacted_position(stored.link.position, removed_position);
        }
        guard.version += 1;
        self.index.remove(&link_id);

        debug_assert!(guard.positions_are_contiguous());
        Ok(true)
    }

    async fn reorder(
        &self,
        owner_id: Uuid,
        ordered: Vec<Uuid>,
        expected_version: Option<i64>,
    ) -> Result<LinkCollection, AppError> {
        let collection = self.collection_or_default(owner_id);
        let mut guard = collection.write().await;

        if let Some(expected) = expected_version
            && expected != guard.version
        {
            return Err(AppError::conflict(
                "Link collection changed since it was read",
                json!({ "expected_version": expected, "current_version": guard.version }),
            ));
        }

        let current: Vec<Uuid> = guard.links.iter().map(|s| s.link.id).collect();
        let plan = plan_reorder(&current, &ordered)?;

        let now = Utc::now();
        let mut by_id: HashMap<Uuid, StoredLink> =
            guard.links.drain(..).map(|s| (s.link.id, s)).collect();
        let mut reordered = Vec::with_capacity(plan.len());
        for (id, position) in plan {
            if let Some(mut stored) = by_id.remove(&id) {
                if stored.link.position != position {
                    stored.link.position = position;
                    stored.link.updated_at = now;
                }
                reordered.push(stored);
            }
        }
        guard.links = reordered;
        guard.version += 1;

        debug_assert!(guard.positions_are_contiguous());
        Ok(guard.snapshot(owner_id))
    }

    async fn increment_clicks(&self, link_id: Uuid) -> Result<(), AppError> {
        let slot = self.index.get(&link_id).ok_or_else(|| {
            AppError::not_found("Link not found", json!({ "link_id": link_id }))
        })?;
        slot.clicks.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}
