use sqlx::PgPool;

use crate::domain::Comment;
use crate::error::AppResult;

#[derive(Clone)]
pub struct CommentRepository {
    pool: PgPool,
}

impl CommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        video_id: i64,
        author_id: i64,
        author_username: &str,
        content: &str,
    ) -> AppResult<Comment> {
        let row = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (video_id, author_id, author_username, content, created_at)
            VALUES ($1, $2, $3, $4, now())
            RETURNING id, video_id, author_id, author_username, content, created_at
            "#,
        )
        .bind(video_id)
        .bind(author_id)
        .bind(author_username)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<Comment>> {
        let row = sqlx::query_as::<_, Comment>(
            "SELECT id, video_id, author_id, author_username, content, created_at FROM comments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Returns whether a row was actually deleted, so the delete worker
    /// and handler can treat "already gone" as a no-op rather than an
    /// error.
    pub async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list_all(&self, video_id: i64) -> AppResult<Vec<Comment>> {
        let rows = sqlx::query_as::<_, Comment>(
            "SELECT id, video_id, author_id, author_username, content, created_at
             FROM comments WHERE video_id = $1 ORDER BY created_at DESC",
        )
        .bind(video_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
