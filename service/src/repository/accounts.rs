use sqlx::PgPool;

use crate::domain::Account;
use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct AccountRepository {
    pool: PgPool,
}

impl AccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, username: &str, password_hash: &str, token: &str) -> AppResult<Account> {
        let row = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (username, password_hash, current_token)
            VALUES ($1, $2, $3)
            RETURNING id, username, password_hash, current_token
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(token)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict("username already exists".into())
            }
            other => other.into(),
        })?;
        Ok(row)
    }

    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<Account>> {
        let row = sqlx::query_as::<_, Account>(
            "SELECT id, username, password_hash, current_token FROM accounts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<Account>> {
        let row = sqlx::query_as::<_, Account>(
            "SELECT id, username, password_hash, current_token FROM accounts WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Overwrites `current_token`, revoking whatever token was active.
    pub async fn set_current_token(&self, id: i64, token: &str) -> AppResult<()> {
        sqlx::query("UPDATE accounts SET current_token = $1 WHERE id = $2")
            .bind(token)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn clear_current_token(&self, id: i64) -> AppResult<()> {
        sqlx::query("UPDATE accounts SET current_token = '' WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn rename(&self, id: i64, new_username: &str) -> AppResult<()> {
        sqlx::query("UPDATE accounts SET username = $1 WHERE id = $2")
            .bind(new_username)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    AppError::Conflict("username already exists".into())
                }
                other => other.into(),
            })?;
        Ok(())
    }

    pub async fn set_password_hash(&self, id: i64, password_hash: &str) -> AppResult<()> {
        sqlx::query("UPDATE accounts SET password_hash = $1 WHERE id = $2")
            .bind(password_hash)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
