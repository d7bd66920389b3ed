//! Data Transfer Objects for API requests and responses.
//!
//! Request and response bodies use camelCase field names. Request DTOs are
//! checked with `validator` before they reach the services.

pub mod analytics;
pub mod clicks;
pub mod health;
pub mod links;
