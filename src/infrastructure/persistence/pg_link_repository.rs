//! PostgreSQL implementation of link repository.
//!
//! Every position-affecting operation runs in one transaction that first
//! takes the owner's `link_collections` row with `FOR UPDATE`. That row lock
//! serializes create, delete and reorder per owner; other owners proceed in
//! parallel. The `(owner_id, position)` unique constraint is deferred to
//! commit so shifts inside a transaction never trip it.

use async_trait::async_trait;
use serde_json::json;
use sqlx::{PgPool, Postgres, Transaction};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{
    Link, LinkCollection, LinkPatch, MAX_LINKS_PER_OWNER, NewLink, collection_full,
};
use crate::domain::ordering::plan_reorder;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

const LINK_COLUMNS: &str =
    "id, owner_id, title, url, icon, is_active, position, click_count, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct LinkRow {
    id: Uuid,
    owner_id: Uuid,
    title: String,
    url: String,
    icon: String,
    is_active: bool,
    position: i32,
    click_count: i64,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<LinkRow> for Link {
    fn from(r: LinkRow) -> Self {
        Link::new(
            r.id,
            r.owner_id,
            r.title,
            r.url,
            r.icon,
            r.is_active,
            r.position,
            r.click_count,
            r.created_at,
            r.updated_at,
        )
    }
}

/// PostgreSQL repository for owner link collections.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

/// Enters the owner's exclusive section and returns the current version.
async fn lock_collection(
    tx: &mut Transaction<'_, Postgres>,
    owner_id: Uuid,
) -> Result<i64, AppError> {
    sqlx::query(
        "INSERT INTO link_collections (owner_id) VALUES ($1) ON CONFLICT (owner_id) DO NOTHING",
    )
    .bind(owner_id)
    .execute(&mut **tx)
    .await?;

    let version: i64 =
        sqlx::query_scalar("SELECT version FROM link_collections WHERE owner_id = $1 FOR UPDATE")
            .bind(owner_id)
            .fetch_one(&mut **tx)
            .await?;

    Ok(version)
}

async fn bump_version(tx: &mut Transaction<'_, Postgres>, owner_id: Uuid) -> Result<i64, AppError> {
    let version: i64 = sqlx::query_scalar(
        r#"
        UPDATE link_collections
        SET version = version + 1, updated_at = NOW()
        WHERE owner_id = $1
        RETURNING version
        "#,
    )
    .bind(owner_id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(version)
}

async fn fetch_links(
    tx: &mut Transaction<'_, Postgres>,
    owner_id: Uuid,
) -> Result<Vec<Link>, AppError> {
    let sql = format!("SELECT {LINK_COLUMNS} FROM links WHERE owner_id = $1 ORDER BY position");
    let rows: Vec<LinkRow> = sqlx::query_as(&sql)
        .bind(owner_id)
        .fetch_all(&mut **tx)
        .await?;

    Ok(rows.into_iter().map(Link::from).collect())
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn list(&self, owner_id: Uuid) -> Result<LinkCollection, AppError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await?;

        let version: Option<i64> =
            sqlx::query_scalar("SELECT version FROM link_collections WHERE owner_id = $1")
                .bind(owner_id)
                .fetch_optional(&mut *tx)
                .await?;
        let links = fetch_links(&mut tx, owner_id).await?;
        tx.commit().await?;

        Ok(LinkCollection {
            owner_id,
            version: version.unwrap_or(0),
            links,
        })
    }

    async fn find(&self, link_id: Uuid) -> Result<Option<Link>, AppError> {
        let sql = format!("SELECT {LINK_COLUMNS} FROM links WHERE id = $1");
        let row: Option<LinkRow> = sqlx::query_as(&sql)
            .bind(link_id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Link::from))
    }

    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let mut tx = self.pool.begin().await?;
        lock_collection(&mut tx, new_link.owner_id).await?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links WHERE owner_id = $1")
            .bind(new_link.owner_id)
            .fetch_one(&mut *tx)
            .await?;

        if count as usize >= MAX_LINKS_PER_OWNER {
            tx.rollback().await?;
            return Err(collection_full(new_link.owner_id));
        }

        let sql = format!(
            r#"
            INSERT INTO links (id, owner_id, title, url, icon, is_active, position)
            VALUES ($1, $2, $3, $4, $5, TRUE, $6)
            RETURNING {LINK_COLUMNS}
            "#
        );
        let row: LinkRow = sqlx::query_as(&sql)
            .bind(Uuid::new_v4())
            .bind(new_link.owner_id)
            .bind(&new_link.title)
            .bind(&new_link.url)
            .bind(&new_link.icon)
            .bind(count as i32)
            .fetch_one(&mut *tx)
            .await?;

        bump_version(&mut tx, new_link.owner_id).await?;
        tx.commit().await?;

        Ok(row.into())
    }

    async fn update(
        &self,
        owner_id: Uuid,
        link_id: Uuid,
        patch: LinkPatch,
    ) -> Result<Link, AppError> {
        let sql = format!(
            r#"
            UPDATE links
            SET title = COALESCE($3, title),
                url = COALESCE($4, url),
                icon = COALESCE($5, icon),
                is_active = COALESCE($6, is_active),
                updated_at = NOW()
            WHERE id = $1 AND owner_id = $2
            RETURNING {LINK_COLUMNS}
            "#
        );
        let row: Option<LinkRow> = sqlx::query_as(&sql)
            .bind(link_id)
            .bind(owner_id)
            .bind(patch.title)
            .bind(patch.url)
            .bind(patch.icon)
            .bind(patch.is_active)
            .fetch_optional(self.pool.as_ref())
            .await?;

        row.map(Link::from).ok_or_else(|| {
            AppError::not_found(
                "Link not found",
                json!({ "owner_id": owner_id, "link_id": link_id }),
            )
        })
    }

    async fn delete(&self, owner_id: Uuid, link_id: Uuid) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;
        lock_collection(&mut tx, owner_id).await?;

        let removed: Option<i32> = sqlx::query_scalar(
            "DELETE FROM links WHERE id = $1 AND owner_id = $2 RETURNING position",
        )
        .bind(link_id)
        .bind(owner_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(removed) = removed else {
            tx.rollback().await?;
            return Ok(false);
        };

        sqlx::query(
            r#"
            UPDATE links
            SET position = position - 1
            WHERE owner_id = $1 AND position > $2
            "#,
        )
        .bind(owner_id)
        .bind(removed)
        .execute(&mut *tx)
        .await?;

        bump_version(&mut tx, owner_id).await?;
        tx.commit().await?;

        Ok(true)
    }

    async fn reorder(
        &self,
        owner_id: Uuid,
        ordered: Vec<Uuid>,
        expected_version: Option<i64>,
    ) -> Result<LinkCollection, AppError> {
        let mut tx = self.pool.begin().await?;
        let version = lock_collection(&mut tx, owner_id).await?;

        if let Some(expected) = expected_version
            && expected != version
        {
            tx.rollback().await?;
            return Err(AppError::conflict(
                "Link collection changed since it was read",
                json!({ "expected_version": expected, "current_version": version }),
            ));
        }

        let current: Vec<Uuid> =
            sqlx::query_scalar("SELECT id FROM links WHERE owner_id = $1 ORDER BY position")
                .bind(owner_id)
                .fetch_all(&mut *tx)
                .await?;

        let (ids, positions): (Vec<Uuid>, Vec<i32>) =
            plan_reorder(&current, &ordered)?.into_iter().unzip();

        let result = sqlx::query(
            r#"
            UPDATE links AS l
            SET position = v.position,
                updated_at = CASE WHEN l.position <> v.position THEN NOW() ELSE l.updated_at END
            FROM UNNEST($2::uuid[], $3::int4[]) AS v(id, position)
            WHERE l.id = v.id AND l.owner_id = $1
            "#,
        )
        .bind(owner_id)
        .bind(&ids)
        .bind(&positions)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() != ids.len() as u64 {
            tx.rollback().await?;
            tracing::error!(
                owner_id = %owner_id,
                expected = ids.len(),
                updated = result.rows_affected(),
                "Reorder touched an unexpected number of links"
            );
            return Err(AppError::internal(
                "Failed to apply link order",
                json!({ "owner_id": owner_id }),
            ));
        }

        let version = bump_version(&mut tx, owner_id).await?;
        let links = fetch_links(&mut tx, owner_id).await?;
        tx.commit().await?;

        Ok(LinkCollection {
            owner_id,
            version,
            links,
        })
    }

    async fn increment_clicks(&self, link_id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE links SET click_count = click_count + 1 WHERE id = $1")
            .bind(link_id)
            .execute(self.pool.as_ref())
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(
                "Link not found",
                json!({ "link_id": link_id }),
            ));
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(self.pool.as_ref()).await?;
        Ok(())
    }
}
