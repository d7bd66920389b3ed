//! DTOs for analytics endpoints.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use uuid::Uuid;

use crate::domain::analytics::{
    AnalyticsSummary, DailyBucket, LinkAnalytics, LinkSeries, ReportingWindow, TopLink,
};

use super::links::LinkResponse;

/// Query parameters for `GET /api/analytics`.
///
/// `timeRange` is one of `7d`, `30d` (default), `90d`, `1y`.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsQuery {
    #[serde(default)]
    pub time_range: Option<String>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub top: Option<usize>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub include_inactive: Option<bool>,
}

/// Reporting window echoed back with every summary.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowResponse {
    pub time_range: &'static str,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub first_day: NaiveDate,
    pub last_day: NaiveDate,
    pub utc_offset_minutes: i32,
}

impl From<&ReportingWindow> for WindowResponse {
    fn from(window: &ReportingWindow) -> Self {
        Self {
            time_range: window.range.as_str(),
            from: window.start,
            to: window.end,
            first_day: window.first_day,
            last_day: window.last_day(),
            utc_offset_minutes: window.offset.local_minus_utc() / 60,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DailyClicksResponse {
    pub date: NaiveDate,
    pub clicks: u64,
}

impl From<DailyBucket> for DailyClicksResponse {
    fn from(bucket: DailyBucket) -> Self {
        Self {
            date: bucket.date,
            clicks: bucket.count,
        }
    }
}

fn daily(buckets: Vec<DailyBucket>) -> Vec<DailyClicksResponse> {
    buckets.into_iter().map(DailyClicksResponse::from).collect()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopLinkResponse {
    pub link_id: Uuid,
    pub title: String,
    pub url: String,
    pub icon: String,
    pub is_active: bool,
    pub clicks: u64,
}

impl From<TopLink> for TopLinkResponse {
    fn from(top: TopLink) -> Self {
        Self {
            link_id: top.link_id,
            title: top.title,
            url: top.url,
            icon: top.icon,
            is_active: top.is_active,
            clicks: top.clicks,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkSeriesResponse {
    pub link_id: Uuid,
    pub title: String,
    pub total_clicks: u64,
    pub daily_clicks: Vec<DailyClicksResponse>,
}

impl From<LinkSeries> for LinkSeriesResponse {
    fn from(series: LinkSeries) -> Self {
        Self {
            link_id: series.link_id,
            title: series.title,
            total_clicks: series.total,
            daily_clicks: daily(series.buckets),
        }
    }
}

/// Response of `GET /api/analytics`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResponse {
    pub window: WindowResponse,
    pub total_clicks: u64,
    pub lifetime_clicks: i64,
    pub total_links: usize,
    pub active_links: usize,
    pub clicks_per_link: f64,
    pub top_links: Vec<TopLinkResponse>,
    pub daily_clicks: Vec<DailyClicksResponse>,
    pub link_series: Vec<LinkSeriesResponse>,
}

impl From<AnalyticsSummary> for AnalyticsResponse {
    fn from(summary: AnalyticsSummary) -> Self {
        Self {
            window: WindowResponse::from(&summary.window),
            total_clicks: summary.total_clicks,
            lifetime_clicks: summary.lifetime_clicks,
            total_links: summary.total_links,
            active_links: summary.active_links,
            clicks_per_link: summary.clicks_per_link,
            top_links: summary.top_links.into_iter().map(TopLinkResponse::from).collect(),
            daily_clicks: daily(summary.daily_clicks),
            link_series: summary
                .link_series
                .into_iter()
                .map(LinkSeriesResponse::from)
                .collect(),
        }
    }
}

/// Response of `GET /api/analytics/link/{id}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkAnalyticsResponse {
    pub window: WindowResponse,
    pub link: LinkResponse,
    pub total_clicks: u64,
    pub daily_clicks: Vec<DailyClicksResponse>,
}

impl From<LinkAnalytics> for LinkAnalyticsResponse {
    fn from(analytics: LinkAnalytics) -> Self {
        Self {
            window: WindowResponse::from(&analytics.window),
            link: LinkResponse::from(analytics.link),
            total_clicks: analytics.total_clicks,
            daily_clicks: daily(analytics.daily_clicks),
        }
    }
}
