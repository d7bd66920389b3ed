//! Analytics aggregation service.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::domain::analytics::{
    self, AnalyticsSummary, LinkAnalytics, ReportingWindow, SummaryOptions, TimeRange,
};
use crate::domain::entities::ClickEvent;
use crate::domain::repositories::{ClickRepository, LinkRepository};
use crate::error::AppError;

/// Largest `top` prefix a caller may ask for.
pub const MAX_TOP_LINKS: usize = 50;

/// Limits and reporting timezone for aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyticsSettings {
    /// Offset that defines calendar days for bucketing.
    pub reporting_offset: FixedOffset,
    /// Maximum number of events one aggregation may scan.
    pub max_events: usize,
    /// Wall-clock limit for one aggregation.
    pub timeout: Duration,
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self {
            reporting_offset: Utc.fix(),
            max_events: 1_000_000,
            timeout: Duration::from_millis(5000),
        }
    }
}

/// Service computing click summaries on demand.
///
/// Nothing is cached: each call reads the owner's links and the events in
/// the window, then folds them with [`analytics::summarize`]. A scan that
/// would exceed `max_events`, or a call running past `timeout`, fails with
/// [`AppError::ResourceExhausted`].
pub struct AnalyticsService<L: LinkRepository + ?Sized, C: ClickRepository + ?Sized> {
    link_repository: Arc<L>,
    click_repository: Arc<C>,
    settings: AnalyticsSettings,
}

impl<L: LinkRepository + ?Sized, C: ClickRepository + ?Sized> AnalyticsService<L, C> {
    /// Creates a new analytics service.
    pub fn new(link_repository: Arc<L>, click_repository: Arc<C>, settings: AnalyticsSettings) -> Self {
        Self {
            link_repository,
            click_repository,
            settings,
        }
    }

    /// Summarizes the owner's clicks over `range` ending now.
    pub async fn summarize(
        &self,
        owner_id: Uuid,
        range: TimeRange,
        options: SummaryOptions,
    ) -> Result<AnalyticsSummary, AppError> {
        self.summarize_at(owner_id, range, options, Utc::now()).await
    }

    /// Summarizes the owner's clicks over `range` ending at `now`.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] if `options.top` is 0 or above [`MAX_TOP_LINKS`]
    /// - [`AppError::ResourceExhausted`] if the scan budget or timeout is exceeded
    /// - [`AppError::Storage`] on storage failures
    pub async fn summarize_at(
        &self,
        owner_id: Uuid,
        range: TimeRange,
        options: SummaryOptions,
        now: DateTime<Utc>,
    ) -> Result<AnalyticsSummary, AppError> {
        if options.top == 0 || options.top > MAX_TOP_LINKS {
            return Err(AppError::bad_request(
                "Invalid top links count",
                json!({ "field": "top", "min": 1, "max": MAX_TOP_LINKS }),
            ));
        }

        let window = ReportingWindow::ending_at(range, now, self.settings.reporting_offset);

        self.within_budget(owner_id, range, async {
            let collection = self.link_repository.list(owner_id).await?;
            let events = self.scan(owner_id, collection.ids(), &window).await?;
            Ok(analytics::summarize(&collection.links, &events, &window, options))
        })
        .await
    }

    /// Daily clicks for one of the owner's links over `range` ending now.
    pub async fn summarize_link(
        &self,
        owner_id: Uuid,
        link_id: Uuid,
        range: TimeRange,
        include_inactive: bool,
    ) -> Result<LinkAnalytics, AppError> {
        self.summarize_link_at(owner_id, link_id, range, include_inactive, Utc::now())
            .await
    }

    /// Daily clicks for one of the owner's links over `range` ending at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the link does not belong to `owner_id`.
    pub async fn summarize_link_at(
        &self,
        owner_id: Uuid,
        link_id: Uuid,
        range: TimeRange,
        include_inactive: bool,
        now: DateTime<Utc>,
    ) -> Result<LinkAnalytics, AppError> {
        let window = ReportingWindow::ending_at(range, now, self.settings.reporting_offset);

        self.within_budget(owner_id, range, async {
            let link = self
                .link_repository
                .find(link_id)
                .await?
                .filter(|l| l.is_owned_by(owner_id))
                .ok_or_else(|| {
                    AppError::not_found(
                        "Link not found",
                        json!({ "owner_id": owner_id, "link_id": link_id }),
                    )
                })?;

            let events = self.scan(owner_id, vec![link.id], &window).await?;
            Ok(analytics::summarize_link(
                &link,
                &events,
                &window,
                include_inactive,
            ))
        })
        .await
    }

    async fn scan(
        &self,
        owner_id: Uuid,
        link_ids: Vec<Uuid>,
        window: &ReportingWindow,
    ) -> Result<Vec<ClickEvent>, AppError> {
        if link_ids.is_empty() {
            return Ok(Vec::new());
        }

        let max_events = self.settings.max_events;
        let events = self
            .click_repository
            .events_for_links(link_ids, window.start, window.end, max_events.saturating_add(1))
            .await?;

        if events.len() > max_events {
            tracing::warn!(
                owner_id = %owner_id,
                time_range = %window.range,
                max_events,
                "Analytics scan budget exceeded"
            );
            metrics::counter!("analytics_budget_exceeded_total", "limit" => "events").increment(1);
            return Err(AppError::resource_exhausted(
                "Too many click events in the requested range",
                json!({ "max_events": max_events, "time_range": window.range.as_str() }),
            ));
        }

        Ok(events)
    }

    async fn within_budget<T>(
        &self,
        owner_id: Uuid,
        range: TimeRange,
        work: impl Future<Output = Result<T, AppError>>,
    ) -> Result<T, AppError> {
        match tokio::time::timeout(self.settings.timeout, work).await {
            Ok(result) => result,
            Err(_) => {
                let timeout_ms = self.settings.timeout.as_millis() as u64;
                tracing::warn!(owner_id = %owner_id, time_range = %range, timeout_ms, "Analytics timed out");
                metrics::counter!("analytics_budget_exceeded_total", "limit" => "timeout").increment(1);
                Err(AppError::resource_exhausted(
                    "Analytics query timed out",
                    json!({ "timeout_ms": timeout_ms, "time_range": range.as_str() }),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Link, LinkCollection};
    use crate::domain::repositories::{MockClickRepository, MockLinkRepository};
    use chrono::{TimeDelta, TimeZone};

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
    }

    fn test_link(owner_id: Uuid, title: &str) -> Link {
        let created = noon() - TimeDelta::days(60);
        Link::new(
            Uuid::new_v4(),
            owner_id,
            title.to_string(),
            format!("https://example.com/{title}"),
            "🔗".to_string(),
            true,
            0,
            0,
            created,
            created,
        )
    }

    fn collection_mock(links: Vec<Link>) -> MockLinkRepository {
        let mut mock = MockLinkRepository::new();
        mock.expect_list().returning(move |owner_id| {
            Ok(LinkCollection {
                owner_id,
                version: 1,
                links: links.clone(),
            })
        });
        mock
    }

    fn events(link_id: Uuid, count: usize) -> Vec<ClickEvent> {
        (0..count)
            .map(|i| {
                ClickEvent::new(
                    Uuid::new_v4(),
                    link_id,
                    noon() - TimeDelta::minutes(i as i64 + 1),
                    None,
                    true,
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn test_summarize_counts_events() {
        let owner = Uuid::new_v4();
        let link = test_link(owner, "a");
        let link_id = link.id;

        let mut clicks = MockClickRepository::new();
        clicks
            .expect_events_for_links()
            .withf(move |ids, _, to, limit| ids == &vec![link_id] && *to == noon() && *limit == 1_000_001)
            .times(1)
            .returning(move |_, _, _, _| Ok(events(link_id, 4)));

        let service = AnalyticsService::new(
            Arc::new(collection_mock(vec![link])),
            Arc::new(clicks),
            AnalyticsSettings::default(),
        );
        let summary = service
            .summarize_at(owner, TimeRange::Week, SummaryOptions::default(), noon())
            .await
            .unwrap();

        assert_eq!(summary.total_clicks, 4);
        assert_eq!(summary.daily_clicks.len(), 7);
        assert_eq!(summary.top_links[0].clicks, 4);
    }

    #[tokio::test]
    async fn test_owner_without_links_skips_scan() {
        let mut clicks = MockClickRepository::new();
        clicks.expect_events_for_links().times(0);

        let service = AnalyticsService::new(
            Arc::new(collection_mock(vec![])),
            Arc::new(clicks),
            AnalyticsSettings::default(),
        );
        let summary = service
            .summarize_at(Uuid::new_v4(), TimeRange::Month, SummaryOptions::default(), noon())
            .await
            .unwrap();

        assert_eq!(summary.total_clicks, 0);
        assert_eq!(summary.daily_clicks.len(), 30);
        assert_eq!(summary.clicks_per_link, 0.0);
    }

    #[tokio::test]
    async fn test_scan_budget_exceeded() {
        let owner = Uuid::new_v4();
        let link = test_link(owner, "a");
        let link_id = link.id;

        let mut clicks = MockClickRepository::new();
        clicks
            .expect_events_for_links()
            .returning(move |_, _, _, limit| Ok(events(link_id, limit)));

        let settings = AnalyticsSettings {
            max_events: 3,
            ..Default::default()
        };
        let service = AnalyticsService::new(
            Arc::new(collection_mock(vec![link])),
            Arc::new(clicks),
            settings,
        );
        let result = service
            .summarize_at(owner, TimeRange::Week, SummaryOptions::default(), noon())
            .await;

        assert!(matches!(result, Err(AppError::ResourceExhausted { .. })));
    }

    #[tokio::test]
    async fn test_exactly_at_budget_is_allowed() {
        let owner = Uuid::new_v4();
        let link = test_link(owner, "a");
        let link_id = link.id;

        let mut clicks = MockClickRepository::new();
        clicks
            .expect_events_for_links()
            .returning(move |_, _, _, _| Ok(events(link_id, 3)));

        let settings = AnalyticsSettings {
            max_events: 3,
            ..Default::default()
        };
        let service = AnalyticsService::new(
            Arc::new(collection_mock(vec![link])),
            Arc::new(clicks),
            settings,
        );
        let summary = service
            .summarize_at(owner, TimeRange::Week, SummaryOptions::default(), noon())
            .await
            .unwrap();

        assert_eq!(summary.total_clicks, 3);
    }

    #[tokio::test]
    async fn test_invalid_top_rejected() {
        let service = AnalyticsService::new(
            Arc::new(MockLinkRepository::new()),
            Arc::new(MockClickRepository::new()),
            AnalyticsSettings::default(),
        );

        for top in [0, MAX_TOP_LINKS + 1] {
            let options = SummaryOptions {
                top,
                ..Default::default()
            };
            let result = service
                .summarize_at(Uuid::new_v4(), TimeRange::Week, options, noon())
                .await;
            assert!(matches!(result, Err(AppError::Validation { .. })));
        }
    }

    #[tokio::test]
    async fn test_summarize_link_of_other_owner_not_found() {
        let link = test_link(Uuid::new_v4(), "a");
        let mut links = MockLinkRepository::new();
        links
            .expect_find()
            .returning(move |_| Ok(Some(link.clone())));

        let mut clicks = MockClickRepository::new();
        clicks.expect_events_for_links().times(0);

        let service = AnalyticsService::new(
            Arc::new(links),
            Arc::new(clicks),
            AnalyticsSettings::default(),
        );
        let result = service
            .summarize_link_at(Uuid::new_v4(), Uuid::new_v4(), TimeRange::Week, true, noon())
            .await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_timeout_is_resource_exhausted() {
        struct SlowLinks;

        #[async_trait::async_trait]
        impl LinkRepository for SlowLinks {
            async fn list(&self, owner_id: Uuid) -> Result<LinkCollection, AppError> {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(LinkCollection::empty(owner_id))
            }
            async fn find(&self, _: Uuid) -> Result<Option<Link>, AppError> {
                Ok(None)
            }
            async fn create(&self, _: crate::domain::entities::NewLink) -> Result<Link, AppError> {
                unimplemented!()
            }
            async fn update(
                &self,
                _: Uuid,
                _: Uuid,
                _: crate::domain::entities::LinkPatch,
            ) -> Result<Link, AppError> {
                unimplemented!()
            }
            async fn delete(&self, _: Uuid, _: Uuid) -> Result<bool, AppError> {
                unimplemented!()
            }
            async fn reorder(
                &self,
                _: Uuid,
                _: Vec<Uuid>,
                _: Option<i64>,
            ) -> Result<LinkCollection, AppError> {
                unimplemented!()
            }
            async fn increment_clicks(&self, _: Uuid) -> Result<(), AppError> {
                unimplemented!()
            }
            async fn health_check(&self) -> Result<(), AppError> {
                Ok(())
            }
        }

        let settings = AnalyticsSettings {
            timeout: Duration::from_millis(100),
            ..Default::default()
        };
        let service = AnalyticsService::new(
            Arc::new(SlowLinks),
            Arc::new(MockClickRepository::new()),
            settings,
        );
        let result = service
            .summarize_at(Uuid::new_v4(), TimeRange::Week, SummaryOptions::default(), noon())
            .await;

        match result {
            Err(AppError::ResourceExhausted { details, .. }) => {
                assert_eq!(details["timeout_ms"], 100);
            }
            other => panic!("expected resource exhausted, got {other:?}"),
        }
    }
}
