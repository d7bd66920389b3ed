//! Repository trait definitions for the domain layer.
//!
//! These traits are the storage contracts of the engine. Implementations live
//! in `crate::infrastructure`:
//!
//! - `memory` - in-process storage with per-owner locks
//! - `persistence` - PostgreSQL via SQLx
//!
//! Mock implementations are generated via `mockall` for service tests.
//!
//! # Available Repositories
//!
//! - [`LinkRepository`] - Link collections, positions and click counters
//! - [`ClickRepository`] - Append-only click log with range scans

pub mod click_repository;
pub mod link_repository;

pub use click_repository::ClickRepository;
pub use link_repository::LinkRepository;

#[cfg(test)]
pub use click_repository::MockClickRepository;
#[cfg(test)]
pub use link_repository::MockLinkRepository;
