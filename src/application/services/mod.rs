//! Business logic services for the application layer.

pub mod analytics_service;
pub mod auth_service;
pub mod click_service;
pub mod link_service;

pub use analytics_service::{AnalyticsService, AnalyticsSettings, MAX_TOP_LINKS};
pub use auth_service::{AuthService, Caller};
pub use click_service::{ClickOutcome, ClickService, DEFAULT_DEDUP_WINDOW_SECONDS};
pub use link_service::LinkService;
