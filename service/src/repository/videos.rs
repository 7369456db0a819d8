use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::Video;
use crate::error::AppResult;

#[derive(Clone)]
pub struct VideoRepository {
    pool: PgPool,
}

impl VideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        author_id: i64,
        author_username: &str,
        title: &str,
        description: &str,
        play_url: &str,
        cover_url: &str,
    ) -> AppResult<Video> {
        let row = sqlx::query_as::<_, Video>(
            r#"
            INSERT INTO videos (author_id, author_username, title, description, play_url, cover_url, create_time, likes_count, popularity)
            VALUES ($1, $2, $3, $4, $5, $6, now(), 0, 0)
            RETURNING id, author_id, author_username, title, description, play_url, cover_url, create_time, likes_count, popularity
            "#,
        )
        .bind(author_id)
        .bind(author_username)
        .bind(title)
        .bind(description)
        .bind(play_url)
        .bind(cover_url)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<Video>> {
        let row = sqlx::query_as::<_, Video>(VIDEO_COLUMNS_WHERE_ID)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Preserves no particular order; callers reorder to match the
    /// id sequence they asked for (cache hydration, cursor pages).
    pub async fn get_by_ids(&self, ids: &[i64]) -> AppResult<Vec<Video>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, Video>(
            "SELECT id, author_id, author_username, title, description, play_url, cover_url, create_time, likes_count, popularity
             FROM videos WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn list_by_author(&self, author_id: i64) -> AppResult<Vec<Video>> {
        let rows = sqlx::query_as::<_, Video>(
            "SELECT id, author_id, author_username, title, description, play_url, cover_url, create_time, likes_count, popularity
             FROM videos WHERE author_id = $1 ORDER BY create_time DESC",
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Order: create_time DESC, WHERE create_time < before. Known
    /// weakness: rows sharing `create_time` at a page boundary may be
    /// skipped or duplicated under this single-column cursor.
    pub async fn list_latest(&self, limit: i64, before: DateTime<Utc>) -> AppResult<Vec<Video>> {
        let rows = sqlx::query_as::<_, Video>(
            "SELECT id, author_id, author_username, title, description, play_url, cover_url, create_time, likes_count, popularity
             FROM videos WHERE create_time < $1 ORDER BY create_time DESC LIMIT $2",
        )
        .bind(before)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Order: author_id in the viewer's following set, create_time DESC.
    pub async fn list_by_following(&self, viewer_id: i64, limit: i64, before: DateTime<Utc>) -> AppResult<Vec<Video>> {
        let rows = sqlx::query_as::<_, Video>(
            r#"
            SELECT id, author_id, author_username, title, description, play_url, cover_url, create_time, likes_count, popularity
            FROM videos
            WHERE create_time < $2
              AND author_id IN (SELECT vlogger_id FROM follows WHERE follower_id = $1)
            ORDER BY create_time DESC
            LIMIT $3
            "#,
        )
        .bind(viewer_id)
        .bind(before)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Order: (likes_count DESC, id DESC). Composite cursor
    /// `(likes_count_before, id_before)` guarantees a strict total
    /// order even when many rows share a like count.
    pub async fn list_by_likes(
        &self,
        limit: i64,
        likes_count_before: Option<i64>,
        id_before: Option<i64>,
    ) -> AppResult<Vec<Video>> {
        let rows = match (likes_count_before, id_before) {
            (Some(l), Some(i)) => {
                sqlx::query_as::<_, Video>(
                    r#"
                    SELECT id, author_id, author_username, title, description, play_url, cover_url, create_time, likes_count, popularity
                    FROM videos
                    WHERE likes_count < $1 OR (likes_count = $1 AND id < $2)
                    ORDER BY likes_count DESC, id DESC
                    LIMIT $3
                    "#,
                )
                .bind(l)
                .bind(i)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            _ => {
                sqlx::query_as::<_, Video>(
                    "SELECT id, author_id, author_username, title, description, play_url, cover_url, create_time, likes_count, popularity
                     FROM videos ORDER BY likes_count DESC, id DESC LIMIT $1",
                )
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(rows)
    }

    /// Order: (popularity DESC, create_time DESC, id DESC). Triple
    /// cursor used both as the snapshot-exhausted fallback and as the
    /// direct path when the cache is unreachable.
    pub async fn list_by_popularity(
        &self,
        limit: i64,
        popularity_before: Option<i64>,
        create_time_before: Option<DateTime<Utc>>,
        id_before: Option<i64>,
    ) -> AppResult<Vec<Video>> {
        let rows = match (popularity_before, create_time_before, id_before) {
            (Some(p), Some(t), Some(i)) => {
                sqlx::query_as::<_, Video>(
                    r#"
                    SELECT id, author_id, author_username, title, description, play_url, cover_url, create_time, likes_count, popularity
                    FROM videos
                    WHERE popularity < $1
                       OR (popularity = $1 AND create_time < $2)
                       OR (popularity = $1 AND create_time = $2 AND id < $3)
                    ORDER BY popularity DESC, create_time DESC, id DESC
                    LIMIT $4
                    "#,
                )
                .bind(p)
                .bind(t)
                .bind(i)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            _ => {
                sqlx::query_as::<_, Video>(
                    "SELECT id, author_id, author_username, title, description, play_url, cover_url, create_time, likes_count, popularity
                     FROM videos ORDER BY popularity DESC, create_time DESC, id DESC LIMIT $1",
                )
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(rows)
    }

    /// Clamps at zero: `GREATEST(likes_count + delta, 0)`.
    pub async fn change_likes_count(&self, id: i64, delta: i64) -> AppResult<()> {
        sqlx::query("UPDATE videos SET likes_count = GREATEST(likes_count + $1, 0) WHERE id = $2")
            .bind(delta)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn change_popularity(&self, id: i64, delta: i64) -> AppResult<()> {
        sqlx::query("UPDATE videos SET popularity = GREATEST(popularity + $1, 0) WHERE id = $2")
            .bind(delta)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Reconciliation setter: assigns an exact value rather than a delta.
    pub async fn update_likes_count(&self, id: i64, value: i64) -> AppResult<()> {
        sqlx::query("UPDATE videos SET likes_count = $1 WHERE id = $2")
            .bind(value)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

const VIDEO_COLUMNS_WHERE_ID: &str = "SELECT id, author_id, author_username, title, description, play_url, cover_url, create_time, likes_count, popularity FROM videos WHERE id = $1";
