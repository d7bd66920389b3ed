//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod analytics;
pub mod clicks;
pub mod health;
pub mod links;
pub mod public;
pub mod redirect;

pub use analytics::{analytics_handler, link_analytics_handler};
pub use clicks::record_click_handler;
pub use health::health_handler;
pub use links::{
    create_link_handler, delete_link_handler, list_links_handler, reorder_links_handler,
    update_link_handler,
};
pub use public::public_links_handler;
pub use redirect::redirect_handler;

use serde_json::json;
use uuid::Uuid;

use crate::error::AppError;

/// Parses a path segment as a UUID, answering 400 with a JSON body otherwise.
pub(crate) fn parse_id(raw: &str, field: &'static str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| {
        AppError::bad_request(
            format!("Invalid {field}"),
            json!({ field: raw, "reason": "expected a UUID" }),
        )
    })
}
