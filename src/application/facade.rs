//! Single entry point for callers of the engine.
//!
//! Handlers and the admin CLI talk to [`QueryFacade`] only. It checks that
//! the caller acts on their own collection and composes the services.

use std::sync::Arc;

use chrono::TimeDelta;
use serde_json::json;
use uuid::Uuid;

use crate::application::services::{
    AnalyticsService, AnalyticsSettings, Caller, ClickOutcome, ClickService, LinkService,
};
use crate::domain::analytics::{AnalyticsSummary, LinkAnalytics, SummaryOptions, TimeRange};
use crate::domain::entities::{Link, LinkCollection, LinkPatch};
use crate::domain::repositories::{ClickRepository, LinkRepository};
use crate::error::AppError;

pub type DynLinkService = LinkService<dyn LinkRepository>;
pub type DynClickService = ClickService<dyn LinkRepository, dyn ClickRepository>;
pub type DynAnalyticsService = AnalyticsService<dyn LinkRepository, dyn ClickRepository>;

/// Composition of the link, click and analytics services.
///
/// Every owner-scoped call takes the authenticated [`Caller`] and the target
/// `owner_id`; a mismatch fails with [`AppError::Forbidden`] before any
/// storage access.
pub struct QueryFacade {
    links: Arc<DynLinkService>,
    clicks: Arc<DynClickService>,
    analytics: Arc<DynAnalyticsService>,
}

impl QueryFacade {
    pub fn new(
        link_repository: Arc<dyn LinkRepository>,
        click_repository: Arc<dyn ClickRepository>,
        dedup_window: TimeDelta,
        analytics_settings: AnalyticsSettings,
    ) -> Self {
        Self {
            links: Arc::new(LinkService::new(link_repository.clone())),
            clicks: Arc::new(ClickService::new(
                link_repository.clone(),
                click_repository.clone(),
                dedup_window,
            )),
            analytics: Arc::new(AnalyticsService::new(
                link_repository,
                click_repository,
                analytics_settings,
            )),
        }
    }

    /// Click service shared with the background worker.
    pub fn click_service(&self) -> Arc<DynClickService> {
        self.clicks.clone()
    }

    fn authorize(caller: &Caller, owner_id: Uuid) -> Result<(), AppError> {
        if caller.owner_id != owner_id {
            tracing::warn!(caller = %caller.owner_id, owner_id = %owner_id, "Cross-owner access denied");
            return Err(AppError::forbidden(
                "Forbidden",
                json!({ "reason": "Caller does not own this collection" }),
            ));
        }
        Ok(())
    }

    pub async fn list_links(&self, caller: &Caller, owner_id: Uuid) -> Result<LinkCollection, AppError> {
        Self::authorize(caller, owner_id)?;
        self.links.list(owner_id).await
    }

    /// Active links of any owner, for public profile pages.
    pub async fn public_links(&self, owner_id: Uuid) -> Result<Vec<Link>, AppError> {
        self.links.list_public(owner_id).await
    }

    pub async fn create_link(
        &self,
        caller: &Caller,
        owner_id: Uuid,
        title: &str,
        url: &str,
        icon: Option<&str>,
    ) -> Result<Link, AppError> {
        Self::authorize(caller, owner_id)?;
        self.links.create(owner_id, title, url, icon).await
    }

    pub async fn update_link(
        &self,
        caller: &Caller,
        owner_id: Uuid,
        link_id: Uuid,
        patch: LinkPatch,
    ) -> Result<Link, AppError> {
        Self::authorize(caller, owner_id)?;
        self.links.update(owner_id, link_id, patch).await
    }

    pub async fn delete_link(
        &self,
        caller: &Caller,
        owner_id: Uuid,
        link_id: Uuid,
    ) -> Result<(), AppError> {
        Self::authorize(caller, owner_id)?;
        self.links.delete(owner_id, link_id).await
    }

    pub async fn reorder_links(
        &self,
        caller: &Caller,
        owner_id: Uuid,
        ordered: Vec<Uuid>,
        expected_version: Option<i64>,
    ) -> Result<LinkCollection, AppError> {
        Self::authorize(caller, owner_id)?;
        self.links.reorder(owner_id, ordered, expected_version).await
    }

    /// Records a visitor click. No authentication.
    pub async fn record_click(
        &self,
        link_id: Uuid,
        dedup_token: Option<&str>,
    ) -> Result<ClickOutcome, AppError> {
        self.clicks.record_click(link_id, dedup_token).await
    }

    /// Returns the link a visitor navigates to.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for unknown and disabled links.
    pub async fn resolve_for_navigation(&self, link_id: Uuid) -> Result<Link, AppError> {
        self.links
            .find(link_id)
            .await?
            .filter(|l| l.is_active)
            .ok_or_else(|| AppError::not_found("Link not found", json!({ "link_id": link_id })))
    }

    pub async fn analytics(
        &self,
        caller: &Caller,
        owner_id: Uuid,
        range: TimeRange,
        options: SummaryOptions,
    ) -> Result<AnalyticsSummary, AppError> {
        Self::authorize(caller, owner_id)?;
        self.analytics.summarize(owner_id, range, options).await
    }

    pub async fn link_analytics(
        &self,
        caller: &Caller,
        owner_id: Uuid,
        link_id: Uuid,
        range: TimeRange,
        include_inactive: bool,
    ) -> Result<LinkAnalytics, AppError> {
        Self::authorize(caller, owner_id)?;
        self.analytics
            .summarize_link(owner_id, link_id, range, include_inactive)
            .await
    }

    pub async fn storage_health(&self) -> Result<(), AppError> {
        self.links.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::DEFAULT_DEDUP_WINDOW_SECONDS;
    use crate::infrastructure::memory::{MemoryClickRepository, MemoryLinkRepository};

    fn memory_facade() -> QueryFacade {
        QueryFacade::new(
            Arc::new(MemoryLinkRepository::new()),
            Arc::new(MemoryClickRepository::new()),
            TimeDelta::seconds(DEFAULT_DEDUP_WINDOW_SECONDS),
            AnalyticsSettings::default(),
        )
    }

    #[tokio::test]
    async fn test_cross_owner_mutation_forbidden() {
        let facade = memory_facade();
        let owner = Uuid::new_v4();
        let caller = Caller {
            owner_id: Uuid::new_v4(),
        };

        let result = facade
            .create_link(&caller, owner, "Title", "https://example.com", None)
            .await;
        assert!(matches!(result, Err(AppError::Forbidden { .. })));

        let result = facade.reorder_links(&caller, owner, vec![], None).await;
        assert!(matches!(result, Err(AppError::Forbidden { .. })));
    }

    #[tokio::test]
    async fn test_mutations_are_visible_to_next_list() {
        let facade = memory_facade();
        let owner = Uuid::new_v4();
        let caller = Caller { owner_id: owner };

        let a = facade
            .create_link(&caller, owner, "A", "https://a.example.com", None)
            .await
            .unwrap();
        let b = facade
            .create_link(&caller, owner, "B", "https://b.example.com", None)
            .await
            .unwrap();
        let c = facade
            .create_link(&caller, owner, "C", "https://c.example.com", None)
            .await
            .unwrap();

        facade.delete_link(&caller, owner, b.id).await.unwrap();
        facade
            .reorder_links(&caller, owner, vec![c.id, a.id], None)
            .await
            .unwrap();

        let listed = facade.list_links(&caller, owner).await.unwrap();
        let order: Vec<(Uuid, i32)> = listed.links.iter().map(|l| (l.id, l.position)).collect();
        assert_eq!(order, vec![(c.id, 0), (a.id, 1)]);
    }

    #[tokio::test]
    async fn test_navigation_skips_inactive_links() {
        let facade = memory_facade();
        let owner = Uuid::new_v4();
        let caller = Caller { owner_id: owner };

        let link = facade
            .create_link(&caller, owner, "A", "https://a.example.com", None)
            .await
            .unwrap();
        assert_eq!(facade.resolve_for_navigation(link.id).await.unwrap().id, link.id);

        facade
            .update_link(
                &caller,
                owner,
                link.id,
                LinkPatch {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(matches!(
            facade.resolve_for_navigation(link.id).await,
            Err(AppError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_clicks_feed_analytics() {
        let facade = memory_facade();
        let owner = Uuid::new_v4();
        let caller = Caller { owner_id: owner };

        let link = facade
            .create_link(&caller, owner, "A", "https://a.example.com", None)
            .await
            .unwrap();
        for _ in 0..3 {
            facade.record_click(link.id, None).await.unwrap();
        }

        let summary = facade
            .analytics(&caller, owner, TimeRange::Week, SummaryOptions::default())
            .await
            .unwrap();

        assert_eq!(summary.total_clicks, 3);
        assert_eq!(summary.lifetime_clicks, 3);
        assert_eq!(summary.top_links[0].link_id, link.id);
    }
}
