use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::Like;
use crate::error::AppResult;

#[derive(sqlx::FromRow)]
struct LikeUpsertRow {
    id: i64,
    video_id: i64,
    account_id: i64,
    created_at: DateTime<Utc>,
    was_created: bool,
}

#[derive(Clone)]
pub struct LikeRepository {
    pool: PgPool,
}

impl LikeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a like row, treating a duplicate `(video_id, account_id)`
    /// as a no-op rather than an error. Returns whether a new row was
    /// actually created so callers know whether to bump counters.
    pub async fn create_idempotent(&self, video_id: i64, account_id: i64) -> AppResult<(Like, bool)> {
        let row = sqlx::query_as::<_, LikeUpsertRow>(
            r#"
            INSERT INTO likes (video_id, account_id, created_at)
            VALUES ($1, $2, now())
            ON CONFLICT (video_id, account_id) DO UPDATE SET video_id = EXCLUDED.video_id
            RETURNING id, video_id, account_id, created_at, (xmax = 0) AS was_created
            "#,
        )
        .bind(video_id)
        .bind(account_id)
        .fetch_one(&self.pool)
        .await?;
        let like = Like {
            id: row.id,
            video_id: row.video_id,
            account_id: row.account_id,
            created_at: row.created_at,
        };
        Ok((like, row.was_created))
    }

    /// Deletes a like row; returns whether a row was actually removed.
    pub async fn delete(&self, video_id: i64, account_id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM likes WHERE video_id = $1 AND account_id = $2")
            .bind(video_id)
            .bind(account_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn is_liked(&self, video_id: i64, account_id: i64) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM likes WHERE video_id = $1 AND account_id = $2)",
        )
        .bind(video_id)
        .bind(account_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Batched is_liked lookup for a page of videos against one viewer.
    pub async fn batch_is_liked(&self, video_ids: &[i64], account_id: i64) -> AppResult<HashMap<i64, bool>> {
        if video_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let liked: Vec<i64> = sqlx::query_scalar(
            "SELECT video_id FROM likes WHERE video_id = ANY($1) AND account_id = $2",
        )
        .bind(video_ids)
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;
        let liked_set: HashSet<i64> = liked.into_iter().collect();
        Ok(video_ids.iter().map(|id| (*id, liked_set.contains(id))).collect())
    }

    pub async fn list_liked_video_ids(&self, account_id: i64) -> AppResult<Vec<i64>> {
        let ids: Vec<i64> = sqlx::query_scalar(
            "SELECT video_id FROM likes WHERE account_id = $1 ORDER BY created_at DESC",
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }
}
