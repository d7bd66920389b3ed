//! Handlers for click analytics of the caller's collection.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde_json::json;

use crate::api::dto::analytics::{AnalyticsQuery, AnalyticsResponse, LinkAnalyticsResponse};
use crate::application::services::{Caller, MAX_TOP_LINKS};
use crate::domain::analytics::{SummaryOptions, TimeRange};
use crate::error::AppError;
use crate::state::AppState;

use super::parse_id;

impl AnalyticsQuery {
    /// Resolves the requested range, defaulting to 30 days.
    pub fn time_range(&self) -> Result<TimeRange, AppError> {
        self.time_range
            .as_deref()
            .map(str::parse)
            .transpose()
            .map(Option::unwrap_or_default)
    }

    /// Builds summary options, rejecting a `top` outside `1..=MAX_TOP_LINKS`.
    pub fn summary_options(&self) -> Result<SummaryOptions, AppError> {
        let defaults = SummaryOptions::default();
        let top = self.top.unwrap_or(defaults.top);
        if top == 0 || top > MAX_TOP_LINKS {
            return Err(AppError::bad_request(
                "Invalid top parameter",
                json!({ "top": top, "min": 1, "max": MAX_TOP_LINKS }),
            ));
        }

        Ok(SummaryOptions {
            top,
            include_inactive: self.include_inactive.unwrap_or(defaults.include_inactive),
        })
    }
}

/// Returns the click summary of the caller's collection.
///
/// # Endpoint
///
/// `GET /api/analytics?timeRange=30d&top=5&includeInactive=true`
///
/// # Query Parameters
///
/// - `timeRange` - `7d`, `30d` (default), `90d` or `1y`
/// - `top` - size of the ranking, 1 to 50 (default 5)
/// - `includeInactive` - count clicks made while a link was disabled (default true)
///
/// # Errors
///
/// - **400**: unknown range or invalid `top`
/// - **503**: the window holds more events than the service aggregates at once,
///   or aggregation timed out
pub async fn analytics_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Query(params): Query<AnalyticsQuery>,
) -> Result<Json<AnalyticsResponse>, AppError> {
    let range = params.time_range()?;
    let options = params.summary_options()?;

    let summary = state
        .facade
        .analytics(&caller, caller.owner_id, range, options)
        .await?;

    Ok(Json(summary.into()))
}

/// Returns the daily click series of one link.
///
/// # Endpoint
///
/// `GET /api/analytics/link/{id}?timeRange=7d`
pub async fn link_analytics_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
    Query(params): Query<AnalyticsQuery>,
) -> Result<Json<LinkAnalyticsResponse>, AppError> {
    let link_id = parse_id(&id, "link_id")?;
    let range = params.time_range()?;
    let include_inactive = params
        .include_inactive
        .unwrap_or(SummaryOptions::default().include_inactive);

    let analytics = state
        .facade
        .link_analytics(&caller, caller.owner_id, link_id, range, include_inactive)
        .await?;

    Ok(Json(analytics.into()))
}
