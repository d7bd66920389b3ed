//! Click aggregation: reporting windows, daily buckets and link rankings.
//!
//! [`summarize`] and [`summarize_link`] are pure functions of the links, the
//! click events and the window. Given the same inputs they return the same
//! output; the service layer only decides which events to load.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeDelta, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::domain::entities::{ClickEvent, Link};
use crate::error::AppError;

/// Reporting span selectable by clients.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TimeRange {
    Week,
    #[default]
    Month,
    Quarter,
    Year,
}

impl TimeRange {
    pub const ALL: [TimeRange; 4] = [Self::Week, Self::Month, Self::Quarter, Self::Year];

    /// Number of calendar days covered by the range.
    pub fn days(self) -> u32 {
        match self {
            Self::Week => 7,
            Self::Month => 30,
            Self::Quarter => 90,
            Self::Year => 365,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Week => "7d",
            Self::Month => "30d",
            Self::Quarter => "90d",
            Self::Year => "1y",
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "7d" => Ok(Self::Week),
            "30d" => Ok(Self::Month),
            "90d" => Ok(Self::Quarter),
            "1y" => Ok(Self::Year),
            other => Err(AppError::bad_request(
                "Unknown time range",
                json!({
                    "time_range": other,
                    "allowed": TimeRange::ALL.iter().map(|r| r.as_str()).collect::<Vec<_>>(),
                }),
            )),
        }
    }
}

/// Half-open interval `[start, end)` aligned to calendar days in the
/// reporting timezone.
///
/// The window covers `range.days()` calendar days ending with the day that
/// contains `end`. `start` is local midnight of the first day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportingWindow {
    pub range: TimeRange,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub first_day: NaiveDate,
    pub offset: FixedOffset,
}

impl ReportingWindow {
    pub fn ending_at(range: TimeRange, now: DateTime<Utc>, offset: FixedOffset) -> Self {
        let today = now.with_timezone(&offset).date_naive();
        let first_day = today - TimeDelta::days(i64::from(range.days()) - 1);
        let local_midnight = first_day.and_time(NaiveTime::MIN);
        let start =
            (local_midnight - TimeDelta::seconds(i64::from(offset.local_minus_utc()))).and_utc();

        Self {
            range,
            start,
            end: now,
            first_day,
            offset,
        }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at < self.end
    }

    pub fn day_count(&self) -> usize {
        self.range.days() as usize
    }

    pub fn last_day(&self) -> NaiveDate {
        self.first_day + TimeDelta::days(i64::from(self.range.days()) - 1)
    }

    /// Bucket index of `at`, or `None` when it falls outside the window.
    pub fn day_index(&self, at: DateTime<Utc>) -> Option<usize> {
        if !self.contains(at) {
            return None;
        }
        let day = at.with_timezone(&self.offset).date_naive();
        let index = (day - self.first_day).num_days();
        usize::try_from(index)
            .ok()
            .filter(|i| *i < self.day_count())
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        (0..self.range.days()).map(move |i| self.first_day + TimeDelta::days(i64::from(i)))
    }

    fn empty_buckets(&self) -> Vec<DailyBucket> {
        self.days()
            .map(|date| DailyBucket { date, count: 0 })
            .collect()
    }
}

/// Number of clicks on one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyBucket {
    pub date: NaiveDate,
    pub count: u64,
}

/// A link with its click count inside the window.
#[derive(Debug, Clone, PartialEq)]
pub struct TopLink {
    pub link_id: Uuid,
    pub title: String,
    pub url: String,
    pub icon: String,
    pub is_active: bool,
    pub clicks: u64,
    pub created_at: DateTime<Utc>,
}

/// Zero-filled daily series for a single link.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkSeries {
    pub link_id: Uuid,
    pub title: String,
    pub total: u64,
    pub buckets: Vec<DailyBucket>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsSummary {
    pub window: ReportingWindow,
    pub total_clicks: u64,
    pub lifetime_clicks: i64,
    pub total_links: usize,
    pub active_links: usize,
    pub clicks_per_link: f64,
    pub top_links: Vec<TopLink>,
    pub daily_clicks: Vec<DailyBucket>,
    pub link_series: Vec<LinkSeries>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkAnalytics {
    pub window: ReportingWindow,
    pub link: Link,
    pub total_clicks: u64,
    pub daily_clicks: Vec<DailyBucket>,
}

/// Knobs for [`summarize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryOptions {
    /// Size of the `top_links` prefix.
    pub top: usize,
    /// When false, clicks recorded while the link was disabled are ignored.
    pub include_inactive: bool,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            top: 5,
            include_inactive: true,
        }
    }
}

/// Total clicks divided by active links, one decimal, 0 without active links.
pub fn clicks_per_link(total_clicks: u64, active_links: usize) -> f64 {
    if active_links == 0 {
        return 0.0;
    }
    let ratio = total_clicks as f64 / active_links as f64;
    (ratio * 10.0).round() / 10.0
}

fn counts(event: &ClickEvent, include_inactive: bool) -> bool {
    include_inactive || event.was_active
}

/// Aggregates `events` over `links` into a summary for `window`.
///
/// Events outside the window or on links not in `links` are ignored.
pub fn summarize(
    links: &[Link],
    events: &[ClickEvent],
    window: &ReportingWindow,
    options: SummaryOptions,
) -> AnalyticsSummary {
    let slots: HashMap<Uuid, usize> = links
        .iter()
        .enumerate()
        .map(|(i, link)| (link.id, i))
        .collect();

    let mut daily = window.empty_buckets();
    let mut per_link: Vec<Vec<DailyBucket>> = links.iter().map(|_| window.empty_buckets()).collect();
    let mut totals = vec![0u64; links.len()];

    for event in events.iter().filter(|e| counts(e, options.include_inactive)) {
        let (Some(&slot), Some(day)) = (slots.get(&event.link_id), window.day_index(event.clicked_at))
        else {
            continue;
        };
        daily[day].count += 1;
        per_link[slot][day].count += 1;
        totals[slot] += 1;
    }

    let total_clicks: u64 = totals.iter().sum();
    let active_links = links.iter().filter(|l| l.is_active).count();

    let mut ranked: Vec<usize> = (0..links.len()).collect();
    ranked.sort_by(|a, b| {
        totals[*b]
            .cmp(&totals[*a])
            .then_with(|| links[*a].created_at.cmp(&links[*b].created_at))
            .then_with(|| links[*a].id.cmp(&links[*b].id))
    });

    let top_links = ranked
        .into_iter()
        .take(options.top)
        .map(|i| {
            let link = &links[i];
            TopLink {
                link_id: link.id,
                title: link.title.clone(),
                url: link.url.clone(),
                icon: link.icon.clone(),
                is_active: link.is_active,
                clicks: totals[i],
                created_at: link.created_at,
            }
        })
        .collect();

    let link_series = links
        .iter()
        .zip(per_link)
        .zip(totals.iter())
        .map(|((link, buckets), total)| LinkSeries {
            link_id: link.id,
            title: link.title.clone(),
            total: *total,
            buckets,
        })
        .collect();

    AnalyticsSummary {
        window: *window,
        total_clicks,
        lifetime_clicks: links.iter().map(|l| l.click_count).sum(),
        total_links: links.len(),
        active_links,
        clicks_per_link: clicks_per_link(total_clicks, active_links),
        top_links,
        daily_clicks: daily,
        link_series,
    }
}

/// Aggregates the events of a single link.
pub fn summarize_link(
    link: &Link,
    events: &[ClickEvent],
    window: &ReportingWindow,
    include_inactive: bool,
) -> LinkAnalytics {
    let mut daily = window.empty_buckets();

    for event in events
        .iter()
        .filter(|e| e.link_id == link.id && counts(e, include_inactive))
    {
        if let Some(day) = window.day_index(event.clicked_at) {
            daily[day].count += 1;
        }
    }

    LinkAnalytics {
        window: *window,
        link: link.clone(),
        total_clicks: daily.iter().map(|b| b.count).sum(),
        daily_clicks: daily,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn link(title: &str, created_at: DateTime<Utc>) -> Link {
        Link::new(
            Uuid::new_v4(),
            Uuid::nil(),
            title.to_string(),
            format!("https://example.com/{title}"),
            "🔗".to_string(),
            true,
            0,
            0,
            created_at,
            created_at,
        )
    }

    fn click(link_id: Uuid, at: DateTime<Utc>) -> ClickEvent {
        ClickEvent::new(Uuid::new_v4(), link_id, at, None, true)
    }

    fn utc_offset() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn test_time_range_parsing() {
        assert_eq!("7d".parse::<TimeRange>().unwrap(), TimeRange::Week);
        assert_eq!("30d".parse::<TimeRange>().unwrap(), TimeRange::Month);
        assert_eq!("90d".parse::<TimeRange>().unwrap(), TimeRange::Quarter);
        assert_eq!("1y".parse::<TimeRange>().unwrap(), TimeRange::Year);
        assert!(matches!(
            "2w".parse::<TimeRange>(),
            Err(AppError::Validation { .. })
        ));
        assert!("".parse::<TimeRange>().is_err());
    }

    #[test]
    fn test_window_is_day_aligned() {
        let now = utc(2026, 3, 10, 15);
        let window = ReportingWindow::ending_at(TimeRange::Week, now, utc_offset());

        assert_eq!(window.first_day, NaiveDate::from_ymd_opt(2026, 3, 4).unwrap());
        assert_eq!(window.last_day(), NaiveDate::from_ymd_opt(2026, 3, 10).unwrap());
        assert_eq!(window.start, utc(2026, 3, 4, 0));
        assert_eq!(window.end, now);
        assert_eq!(window.days().count(), 7);
    }

    #[test]
    fn test_window_respects_reporting_offset() {
        // 23:00 UTC on the 10th is already the 11th at UTC+2.
        let now = utc(2026, 3, 10, 23);
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let window = ReportingWindow::ending_at(TimeRange::Week, now, offset);

        assert_eq!(window.last_day(), NaiveDate::from_ymd_opt(2026, 3, 11).unwrap());
        // Local midnight of the 5th at UTC+2 is 22:00 UTC on the 4th.
        assert_eq!(window.start, utc(2026, 3, 4, 22));
    }

    #[test]
    fn test_window_is_half_open() {
        let now = utc(2026, 3, 10, 15);
        let window = ReportingWindow::ending_at(TimeRange::Week, now, utc_offset());

        assert!(window.contains(window.start));
        assert!(!window.contains(now));
        assert!(!window.contains(window.start - TimeDelta::seconds(1)));
        assert_eq!(window.day_index(now), None);
        assert_eq!(window.day_index(window.start), Some(0));
    }

    #[test]
    fn test_thirty_clicks_over_five_days() {
        let now = utc(2026, 3, 10, 15);
        let window = ReportingWindow::ending_at(TimeRange::Week, now, utc_offset());
        let x = link("x", utc(2026, 1, 1, 0));

        let days = [4, 5, 7, 8, 10];
        let events: Vec<ClickEvent> = (0..30)
            .map(|i| click(x.id, utc(2026, 3, days[i % 5], 9)))
            .collect();

        let summary = summarize(&[x.clone()], &events, &window, SummaryOptions::default());

        assert_eq!(summary.total_clicks, 30);
        assert_eq!(summary.daily_clicks.len(), 7);
        assert_eq!(summary.daily_clicks.iter().filter(|b| b.count == 0).count(), 2);
        assert_eq!(summary.daily_clicks[0].count, 6);
        assert_eq!(summary.daily_clicks[2].count, 0);
        assert_eq!(summary.daily_clicks[5].count, 0);
        assert_eq!(summary.top_links[0].clicks, 30);
    }

    #[test]
    fn test_link_without_clicks_has_explicit_zero_series() {
        let now = utc(2026, 3, 10, 15);
        let window = ReportingWindow::ending_at(TimeRange::Week, now, utc_offset());
        let busy = link("busy", utc(2026, 1, 1, 0));
        let idle = link("idle", utc(2026, 1, 2, 0));

        let events = vec![click(busy.id, utc(2026, 3, 9, 12))];
        let summary = summarize(
            &[busy.clone(), idle.clone()],
            &events,
            &window,
            SummaryOptions::default(),
        );

        let idle_series = summary
            .link_series
            .iter()
            .find(|s| s.link_id == idle.id)
            .unwrap();
        assert_eq!(idle_series.buckets.len(), 7);
        assert!(idle_series.buckets.iter().all(|b| b.count == 0));
        assert_eq!(idle_series.total, 0);
    }

    #[test]
    fn test_top_links_tie_break_by_created_at() {
        let now = utc(2026, 3, 10, 15);
        let window = ReportingWindow::ending_at(TimeRange::Week, now, utc_offset());
        let older = link("older", utc(2026, 1, 1, 0));
        let newer = link("newer", utc(2026, 2, 1, 0));
        let leader = link("leader", utc(2026, 2, 15, 0));

        let at = utc(2026, 3, 9, 12);
        let events = vec![
            click(newer.id, at),
            click(older.id, at),
            click(leader.id, at),
            click(leader.id, at),
        ];

        let summary = summarize(
            &[newer.clone(), older.clone(), leader.clone()],
            &events,
            &window,
            SummaryOptions::default(),
        );

        let order: Vec<&str> = summary.top_links.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(order, vec!["leader", "older", "newer"]);
    }

    #[test]
    fn test_top_prefix_is_bounded() {
        let now = utc(2026, 3, 10, 15);
        let window = ReportingWindow::ending_at(TimeRange::Week, now, utc_offset());
        let links: Vec<Link> = (0..8)
            .map(|i| link(&format!("l{i}"), utc(2026, 1, 1, i)))
            .collect();

        let summary = summarize(
            &links,
            &[],
            &window,
            SummaryOptions {
                top: 3,
                include_inactive: true,
            },
        );

        assert_eq!(summary.top_links.len(), 3);
        assert_eq!(summary.link_series.len(), 8);
    }

    #[test]
    fn test_inactive_clicks_can_be_excluded() {
        let now = utc(2026, 3, 10, 15);
        let window = ReportingWindow::ending_at(TimeRange::Week, now, utc_offset());
        let l = link("l", utc(2026, 1, 1, 0));
        let at = utc(2026, 3, 9, 12);
        let mut disabled_click = click(l.id, at);
        disabled_click.was_active = false;
        let events = vec![click(l.id, at), disabled_click];

        let all = summarize(&[l.clone()], &events, &window, SummaryOptions::default());
        let active_only = summarize(
            &[l.clone()],
            &events,
            &window,
            SummaryOptions {
                top: 5,
                include_inactive: false,
            },
        );

        assert_eq!(all.total_clicks, 2);
        assert_eq!(active_only.total_clicks, 1);
    }

    #[test]
    fn test_events_outside_window_or_for_unknown_links_ignored() {
        let now = utc(2026, 3, 10, 15);
        let window = ReportingWindow::ending_at(TimeRange::Week, now, utc_offset());
        let l = link("l", utc(2026, 1, 1, 0));

        let events = vec![
            click(l.id, utc(2026, 3, 3, 23)),
            click(l.id, now),
            click(Uuid::new_v4(), utc(2026, 3, 9, 12)),
        ];

        let summary = summarize(&[l], &events, &window, SummaryOptions::default());
        assert_eq!(summary.total_clicks, 0);
    }

    #[test]
    fn test_summarize_is_deterministic() {
        let now = utc(2026, 3, 10, 15);
        let window = ReportingWindow::ending_at(TimeRange::Month, now, utc_offset());
        let a = link("a", utc(2026, 1, 1, 0));
        let b = link("b", utc(2026, 1, 1, 0));
        let events = vec![
            click(a.id, utc(2026, 3, 1, 1)),
            click(b.id, utc(2026, 3, 2, 1)),
        ];
        let links = vec![a, b];

        let first = summarize(&links, &events, &window, SummaryOptions::default());
        let second = summarize(&links, &events, &window, SummaryOptions::default());
        assert_eq!(first, second);
    }

    #[test]
    fn test_clicks_per_link_guards_zero() {
        assert_eq!(clicks_per_link(10, 0), 0.0);
        assert_eq!(clicks_per_link(0, 3), 0.0);
        assert_eq!(clicks_per_link(10, 3), 3.3);
        assert_eq!(clicks_per_link(30, 1), 30.0);
    }

    #[test]
    fn test_summarize_link() {
        let now = utc(2026, 3, 10, 15);
        let window = ReportingWindow::ending_at(TimeRange::Week, now, utc_offset());
        let l = link("solo", utc(2026, 1, 1, 0));
        let other = Uuid::new_v4();
        let events = vec![
            click(l.id, utc(2026, 3, 10, 1)),
            click(l.id, utc(2026, 3, 10, 2)),
            click(other, utc(2026, 3, 10, 2)),
        ];

        let analytics = summarize_link(&l, &events, &window, true);
        assert_eq!(analytics.total_clicks, 2);
        assert_eq!(analytics.daily_clicks.len(), 7);
        assert_eq!(analytics.daily_clicks[6].count, 2);
    }
}
