/// Shared Redis plumbing: deadline-bounded calls and the lease
/// primitive used by cache-aside callers to single-flight a rebuild.
use std::sync::Arc;
use std::time::Duration;

use redis::aio::ConnectionManager;
use redis::{AsyncCommands, RedisError, Script};
use tokio::sync::Mutex;

pub mod lease;

pub type SharedRedis = Arc<Mutex<ConnectionManager>>;

/// Default deadline for a single cache operation.
pub const DEFAULT_DEADLINE: Duration = Duration::from_millis(50);
/// Deadline for the union-store aggregation used by popularity snapshots.
pub const UNION_STORE_DEADLINE: Duration = Duration::from_millis(80);

#[derive(Debug, thiserror::Error)]
pub enum RedisUtilError {
    #[error("redis operation timed out")]
    Timeout,
    #[error("redis error: {0}")]
    Redis(#[from] RedisError),
}

pub type RedisUtilResult<T> = Result<T, RedisUtilError>;

/// Runs `fut` under `deadline`, turning an elapsed timer into a soft
/// `RedisUtilError::Timeout` rather than propagating a cancellation.
/// Callers treat a timeout the same way as any other cache failure:
/// fall through to the source of truth.
pub async fn with_timeout<F, T>(deadline: Duration, fut: F) -> RedisUtilResult<T>
where
    F: std::future::Future<Output = Result<T, RedisError>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(inner) => inner.map_err(RedisUtilError::Redis),
        Err(_) => Err(RedisUtilError::Timeout),
    }
}

pub async fn connect(redis_url: &str) -> RedisUtilResult<SharedRedis> {
    let client = redis::Client::open(redis_url)?;
    let manager = ConnectionManager::new(client).await?;
    Ok(Arc::new(Mutex::new(manager)))
}

/// `GET key`. A missing key is `Ok(None)`, never an error.
pub async fn get(redis: &SharedRedis, key: &str) -> RedisUtilResult<Option<Vec<u8>>> {
    let mut conn = redis.lock().await;
    with_timeout(DEFAULT_DEADLINE, conn.get(key)).await
}

pub async fn set_ex(redis: &SharedRedis, key: &str, value: &[u8], ttl: Duration) -> RedisUtilResult<()> {
    let mut conn = redis.lock().await;
    with_timeout(
        DEFAULT_DEADLINE,
        conn.set_ex(key, value, ttl.as_secs().max(1)),
    )
    .await
}

pub async fn del(redis: &SharedRedis, key: &str) -> RedisUtilResult<()> {
    let mut conn = redis.lock().await;
    with_timeout(DEFAULT_DEADLINE, conn.del(key)).await
}

pub async fn exists(redis: &SharedRedis, key: &str) -> RedisUtilResult<bool> {
    let mut conn = redis.lock().await;
    with_timeout(DEFAULT_DEADLINE, conn.exists(key)).await
}

pub async fn zincr(redis: &SharedRedis, key: &str, member: &str, delta: f64) -> RedisUtilResult<f64> {
    let mut conn = redis.lock().await;
    with_timeout(DEFAULT_DEADLINE, conn.zincr(key, member, delta)).await
}

pub async fn expire(redis: &SharedRedis, key: &str, ttl: Duration) -> RedisUtilResult<()> {
    let mut conn = redis.lock().await;
    with_timeout(DEFAULT_DEADLINE, conn.expire(key, ttl.as_secs() as i64)).await
}

/// `ZUNIONSTORE dst numkeys srcKeys AGGREGATE SUM`, bounded by the
/// longer union-store deadline rather than the default.
pub async fn zunionstore_sum(redis: &SharedRedis, dst: &str, src_keys: &[String]) -> RedisUtilResult<()> {
    let mut conn = redis.lock().await;
    let mut cmd = redis::cmd("ZUNIONSTORE");
    cmd.arg(dst).arg(src_keys.len()).arg(src_keys).arg("AGGREGATE").arg("SUM");
    with_timeout(UNION_STORE_DEADLINE, cmd.query_async(&mut *conn)).await
}

pub async fn zrevrange(redis: &SharedRedis, key: &str, start: isize, stop: isize) -> RedisUtilResult<Vec<String>> {
    let mut conn = redis.lock().await;
    with_timeout(DEFAULT_DEADLINE, conn.zrevrange(key, start, stop)).await
}

/// Lazily-compiled CAS-delete script: deletes `KEYS[1]` only if its
/// current value equals `ARGV[1]`.
pub fn cas_delete_script() -> Script {
    Script::new(
        r"
        if redis.call('get', KEYS[1]) == ARGV[1] then
            return redis.call('del', KEYS[1])
        else
            return 0
        end
        ",
    )
}
