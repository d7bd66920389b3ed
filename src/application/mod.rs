//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository calls,
//! validation, and business rules. Services consume repository traits; the
//! [`facade::QueryFacade`] composes them for HTTP handlers and the CLI.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Link creation, editing and ordering
//! - [`services::click_service::ClickService`] - Click recording with dedup
//! - [`services::analytics_service::AnalyticsService`] - Click summaries
//! - [`services::auth_service::AuthService`] - Bearer token authentication
//! - [`click_worker`] - Background recording of redirect clicks

pub mod click_worker;
pub mod facade;
pub mod services;

pub use facade::QueryFacade;
