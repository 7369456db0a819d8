use sqlx::PgPool;

use crate::domain::{Account, Follow};
use crate::error::AppResult;

#[derive(Clone)]
pub struct FollowRepository {
    pool: PgPool,
}

impl FollowRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Unique-conflict on `(follower_id, vlogger_id)` is treated as
    /// success; returns whether a new edge was created.
    pub async fn create_idempotent(&self, follower_id: i64, vlogger_id: i64) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO follows (follower_id, vlogger_id)
            VALUES ($1, $2)
            ON CONFLICT (follower_id, vlogger_id) DO NOTHING
            "#,
        )
        .bind(follower_id)
        .bind(vlogger_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, follower_id: i64, vlogger_id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND vlogger_id = $2")
            .bind(follower_id)
            .bind(vlogger_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn is_following(&self, follower_id: i64, vlogger_id: i64) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM follows WHERE follower_id = $1 AND vlogger_id = $2)",
        )
        .bind(follower_id)
        .bind(vlogger_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    pub async fn list_followers(&self, vlogger_id: i64) -> AppResult<Vec<Account>> {
        let rows = sqlx::query_as::<_, Account>(
            r#"
            SELECT a.id, a.username, a.password_hash, a.current_token
            FROM accounts a
            JOIN follows f ON f.follower_id = a.id
            WHERE f.vlogger_id = $1
            "#,
        )
        .bind(vlogger_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn list_vloggers(&self, follower_id: i64) -> AppResult<Vec<Account>> {
        let rows = sqlx::query_as::<_, Account>(
            r#"
            SELECT a.id, a.username, a.password_hash, a.current_token
            FROM accounts a
            JOIN follows f ON f.vlogger_id = a.id
            WHERE f.follower_id = $1
            "#,
        )
        .bind(follower_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    #[allow(dead_code)]
    pub async fn raw_edge(&self, follower_id: i64, vlogger_id: i64) -> AppResult<Option<Follow>> {
        let row = sqlx::query_as::<_, Follow>(
            "SELECT id, follower_id, vlogger_id FROM follows WHERE follower_id = $1 AND vlogger_id = $2",
        )
        .bind(follower_id)
        .bind(vlogger_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}
