/// HS256 bearer tokens: `{account_id, username, iat, nbf, exp}`.
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub account_id: i64,
    pub username: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
}

pub fn issue(account_id: i64, username: &str, secret: &str, ttl_secs: i64) -> AppResult<String> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        account_id,
        username: username.to_string(),
        iat: now,
        nbf: now,
        exp: now + ttl_secs,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}

/// Verifies signature, expiration, and not-before. Does not consult the
/// cache or database — revocation is the auth gate's concern, layered
/// on top of this pure cryptographic check.
pub fn verify(token: &str, secret: &str) -> AppResult<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_nbf = true;
    let data = decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_valid_token() {
        let token = issue(1, "alice", "secret", 3600).unwrap();
        let claims = verify(&token, "secret").unwrap();
        assert_eq!(claims.account_id, 1);
        assert_eq!(claims.username, "alice");
    }

    #[test]
    fn rejects_wrong_secret() {
        let token = issue(1, "alice", "secret", 3600).unwrap();
        assert!(verify(&token, "other-secret").is_err());
    }

    #[test]
    fn rejects_expired_token() {
        let token = issue(1, "alice", "secret", -1).unwrap();
        assert!(verify(&token, "secret").is_err());
    }
}
