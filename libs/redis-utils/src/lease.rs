/// Cache-rebuild lease: set-if-absent with a random token, released by
/// a server-side compare-and-delete so a stale releaser can never drop
/// someone else's lease.
use std::time::Duration;

use rand::RngCore;

use crate::{cas_delete_script, with_timeout, RedisUtilResult, SharedRedis, DEFAULT_DEADLINE};

pub struct Lease {
    pub key: String,
    pub token: String,
}

fn random_token() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Attempts `SET lock:{key} token NX EX ttl` as a single atomic command.
/// Returns `None` when another builder already holds the lease.
pub async fn acquire(redis: &SharedRedis, cache_key: &str, ttl: Duration) -> RedisUtilResult<Option<Lease>> {
    let lock_key = format!("lock:{cache_key}");
    let token = random_token();
    let secs = ttl.as_millis().max(1) as i64 / 1000 + 1;
    let mut conn = redis.lock().await;
    let acquired: Option<String> = with_timeout(
        DEFAULT_DEADLINE,
        redis::cmd("SET")
            .arg(&lock_key)
            .arg(&token)
            .arg("NX")
            .arg("EX")
            .arg(secs)
            .query_async(&mut *conn),
    )
    .await?;
    if acquired.is_none() {
        return Ok(None);
    }
    Ok(Some(Lease {
        key: lock_key,
        token,
    }))
}

/// Releases a lease via scripted compare-and-delete. Uses a deadline
/// independent of the caller's request context: a canceled caller must
/// never leak the lock past its own timeout.
pub async fn release(redis: &SharedRedis, lease: &Lease) -> RedisUtilResult<()> {
    let mut conn = redis.lock().await;
    let script = cas_delete_script();
    let _: i64 = with_timeout(
        DEFAULT_DEADLINE,
        script.key(&lease.key).arg(&lease.token).invoke_async(&mut *conn),
    )
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_token_is_32_hex_chars() {
        let token = random_token();
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn random_token_is_not_constant() {
        assert_ne!(random_token(), random_token());
    }
}
