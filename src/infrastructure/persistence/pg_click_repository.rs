//! PostgreSQL implementation of click repository.

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{ClickAppend, ClickEvent, NewClick};
use crate::domain::repositories::ClickRepository;
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct ClickRow {
    id: Uuid,
    link_id: Uuid,
    clicked_at: DateTime<Utc>,
    dedup_token: Option<String>,
    was_active: bool,
}

impl From<ClickRow> for ClickEvent {
    fn from(r: ClickRow) -> Self {
        ClickEvent::new(r.id, r.link_id, r.clicked_at, r.dedup_token, r.was_active)
    }
}

/// PostgreSQL repository for the click log.
///
/// Events are only ever inserted. Appends carrying a dedup token take a
/// transaction-scoped advisory lock on the token, so two concurrent retries
/// of the same click cannot both pass the window check.
pub struct PgClickRepository {
    pool: Arc<PgPool>,
}

impl PgClickRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClickRepository for PgClickRepository {
    async fn append(
        &self,
        new_click: NewClick,
        dedup_window: TimeDelta,
    ) -> Result<ClickAppend, AppError> {
        let mut tx = self.pool.begin().await?;

        if let Some(token) = &new_click.dedup_token {
            sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
                .bind(token)
                .execute(&mut *tx)
                .await?;

            let existing: Option<ClickRow> = sqlx::query_as(
                r#"
                SELECT id, link_id, clicked_at, dedup_token, was_active
                FROM link_clicks
                WHERE dedup_token = $1 AND clicked_at > $2 AND clicked_at < $3
                ORDER BY clicked_at DESC, id DESC
                LIMIT 1
                "#,
            )
            .bind(token)
            .bind(new_click.clicked_at - dedup_window)
            .bind(new_click.clicked_at + dedup_window)
            .fetch_optional(&mut *tx)
            .await?;

            if let Some(row) = existing {
                tx.commit().await?;
                return Ok(ClickAppend::Duplicate(row.into()));
            }
        }

        let row: ClickRow = sqlx::query_as(
            r#"
            INSERT INTO link_clicks (id, link_id, clicked_at, dedup_token, was_active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, link_id, clicked_at, dedup_token, was_active
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new_click.link_id)
        .bind(new_click.clicked_at)
        .bind(&new_click.dedup_token)
        .bind(new_click.was_active)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(ClickAppend::Recorded(row.into()))
    }

    async fn events_for_links(
        &self,
        link_ids: Vec<Uuid>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<ClickEvent>, AppError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let rows: Vec<ClickRow> = sqlx::query_as(
            r#"
            SELECT id, link_id, clicked_at, dedup_token, was_active
            FROM link_clicks
            WHERE link_id = ANY($1) AND clicked_at >= $2 AND clicked_at < $3
            ORDER BY clicked_at, id
            LIMIT $4
            "#,
        )
        .bind(&link_ids)
        .bind(from)
        .bind(to)
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(ClickEvent::from).collect())
    }
}
