/// Cross-cutting auth gate. Self-healing: a cache miss falls through to
/// the database and repopulates the cache, so cache loss never blocks a
/// session backed by a valid `current_token` row.
use crate::cache::{keys, CacheAccess, CacheLookup};
use crate::error::AppError;
use crate::repository::accounts::AccountRepository;

use super::jwt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identity {
    Anonymous,
    Account(i64),
}

#[derive(Clone)]
pub struct AuthGate {
    cache: CacheAccess,
    accounts: AccountRepository,
    jwt_secret: String,
}

impl AuthGate {
    pub fn new(cache: CacheAccess, accounts: AccountRepository, jwt_secret: String) -> Self {
        Self {
            cache,
            accounts,
            jwt_secret,
        }
    }

    fn extract_bearer(header: Option<&str>) -> Result<Option<&str>, AppError> {
        match header {
            None => Ok(None),
            Some(h) => h
                .strip_prefix("Bearer ")
                .map(Some)
                .ok_or(AppError::InvalidAuthHeader),
        }
    }

    /// Required auth: missing or invalid token is rejected.
    pub async fn authenticate(&self, header: Option<&str>) -> Result<i64, AppError> {
        let token = Self::extract_bearer(header)?.ok_or(AppError::InvalidAuthHeader)?;
        self.admit(token).await
    }

    /// Soft auth: no token is anonymous; a malformed or stale token is
    /// still rejected outright.
    pub async fn authenticate_soft(&self, header: Option<&str>) -> Result<Identity, AppError> {
        match Self::extract_bearer(header)? {
            None => Ok(Identity::Anonymous),
            Some(token) => self.admit(token).await.map(Identity::Account),
        }
    }

    async fn admit(&self, token: &str) -> Result<i64, AppError> {
        let claims = jwt::verify(token, &self.jwt_secret)?;
        let key = keys::account_token(claims.account_id);

        match self.cache.get(&key).await {
            Ok(CacheLookup::Hit(cached)) => {
                if cached == token.as_bytes() {
                    return Ok(claims.account_id);
                }
                return Err(AppError::TokenRevoked);
            }
            Ok(CacheLookup::Miss) => {}
            Err(_) => {
                // Cache unavailable: degrade straight to the database
                // check below, same as a miss.
            }
        }

        let account = self
            .accounts
            .find_by_id(claims.account_id)
            .await?
            .ok_or(AppError::TokenInvalid)?;

        if account.current_token != token {
            return Err(AppError::TokenInvalid);
        }

        let _ = self.cache.set(&key, token.as_bytes(), keys::ACCOUNT_TTL).await;
        Ok(claims.account_id)
    }

    /// Populates the token cache outright, used right after login /
    /// rename when the new token is already known to be current.
    pub async fn warm(&self, account_id: i64, token: &str) {
        let key = keys::account_token(account_id);
        let _ = self.cache.set(&key, token.as_bytes(), keys::ACCOUNT_TTL).await;
    }

    pub async fn evict(&self, account_id: i64) {
        let key = keys::account_token(account_id);
        let _ = self.cache.del(&key).await;
    }
}
