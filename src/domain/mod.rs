//! Domain layer containing business entities and logic.
//!
//! Nothing in here knows about HTTP or a particular database.
//!
//! # Architecture
//!
//! - [`entities`] - Links, collections and click events
//! - [`repositories`] - Storage contracts implemented by the infrastructure layer
//! - [`ordering`] - Position planning for reorder and delete compaction
//! - [`analytics`] - Reporting windows and click aggregation
//! - [`click_queue`] - Click message handed to the background worker
//!
//! # Click Processing Flow
//!
//! 1. A visitor clicks a link on a public profile
//! 2. The click is recorded directly, or a [`click_queue::QueuedClick`] is
//!    sent to the background worker when the request is a redirect
//! 3. The click service appends a [`entities::ClickEvent`] and bumps the
//!    link's counter via [`repositories::LinkRepository::increment_clicks`]
//! 4. [`analytics::summarize`] turns the stored events into daily buckets

pub mod analytics;
pub mod click_queue;
pub mod entities;
pub mod ordering;
pub mod repositories;
