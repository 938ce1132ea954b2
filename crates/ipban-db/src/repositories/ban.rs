//! PostgreSQL implementation of BanRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use ipban_core::entities::{Ban, BanListing, NewBan};
use ipban_core::traits::{BanQuery, BanRepository, RepoResult};
use ipban_core::value_objects::BanId;

use crate::models::{BanListingModel, BanModel};

use super::error::map_db_error;

/// PostgreSQL implementation of BanRepository
#[derive(Clone)]
pub struct PgBanRepository {
    pool: PgPool,
}

impl PgBanRepository {
    /// Create a new PgBanRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BanRepository for PgBanRepository {
    #[instrument(skip(self, ban), fields(target = %ban.target))]
    async fn create(&self, ban: &NewBan) -> RepoResult<BanId> {
        let id = sqlx::query_scalar::<_, i64>(
            r"
            INSERT INTO bans (target, mode, reason, banner_id, added_at, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            ",
        )
        .bind(ban.target_text())
        .bind(ban.mode.as_str())
        .bind(&ban.reason)
        .bind(ban.created_by.into_inner())
        .bind(ban.added_at)
        .bind(ban.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(BanId::new(id))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: BanId) -> RepoResult<Option<Ban>> {
        let result = sqlx::query_as::<_, BanModel>(
            r"
            DELETE FROM bans
            WHERE id = $1
            RETURNING id, target, mode, reason, banner_id, added_at, expires_at
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Ban::from))
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: BanId) -> RepoResult<Option<Ban>> {
        let result = sqlx::query_as::<_, BanModel>(
            r"
            SELECT id, target, mode, reason, banner_id, added_at, expires_at
            FROM bans
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Ban::from))
    }

    #[instrument(skip(self))]
    async fn list_active(&self, now: DateTime<Utc>) -> RepoResult<Vec<Ban>> {
        let results = sqlx::query_as::<_, BanModel>(
            r"
            SELECT id, target, mode, reason, banner_id, added_at, expires_at
            FROM bans
            WHERE expires_at IS NULL OR expires_at > $1
            ORDER BY expires_at ASC NULLS LAST, id ASC
            ",
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Ban::from).collect())
    }

    #[instrument(skip(self))]
    async fn list(&self, query: &BanQuery) -> RepoResult<Vec<BanListing>> {
        let results = sqlx::query_as::<_, BanListingModel>(
            r"
            SELECT b.id, b.target, b.mode, b.reason, b.banner_id, b.added_at, b.expires_at,
                   u.name AS banner_name
            FROM bans b
            LEFT JOIN users u ON u.id = b.banner_id
            WHERE NOT $1 OR b.expires_at IS NULL OR b.expires_at > $2
            ORDER BY b.expires_at ASC NULLS LAST, b.id ASC
            LIMIT $3 OFFSET $4
            ",
        )
        .bind(query.active_only)
        .bind(query.now)
        .bind(query.limit)
        .bind(query.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(BanListing::from).collect())
    }

    #[instrument(skip(self))]
    async fn ping(&self) -> RepoResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(())
    }
}
