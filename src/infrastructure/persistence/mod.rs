//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx. Schema
//! lives in `migrations/` and is applied at startup.
//!
//! # Repositories
//!
//! - [`PgLinkRepository`] - Owner collections, ordering and click counters
//! - [`PgClickRepository`] - Append-only click log and range scans

pub mod pg_click_repository;
pub mod pg_link_repository;

pub use pg_click_repository::PgClickRepository;
pub use pg_link_repository::PgLinkRepository;

use sqlx::PgPool;

use crate::error::AppError;

/// Applies pending migrations from `migrations/`.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Migration failed");
            AppError::storage("Migration failed", serde_json::json!({ "reason": e.to_string() }))
        })
}
