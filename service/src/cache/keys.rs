/// Cache key builders. All serialized-response keys carry a leading
/// schema tag (`v{N}:`) so a payload-shape change invalidates old
/// entries automatically on deploy, rather than relying on every
/// reader tolerating an unknown shape.
use std::time::Duration;

pub const SCHEMA_TAG: &str = "v1";

pub const ACCOUNT_TTL: Duration = Duration::from_secs(24 * 3600);
pub const FEED_TTL: Duration = Duration::from_secs(5);
pub const VIDEO_DETAIL_TTL: Duration = Duration::from_secs(5 * 60);
pub const HOT_BUCKET_TTL: Duration = Duration::from_secs(2 * 3600);
pub const HOT_SNAPSHOT_TTL: Duration = Duration::from_secs(2 * 60);
pub const DEFAULT_LEASE_TTL: Duration = Duration::from_millis(500);
pub const VIDEO_DETAIL_LEASE_TTL: Duration = Duration::from_secs(2);

pub fn account_token(account_id: i64) -> String {
    format!("{SCHEMA_TAG}:account:{account_id}")
}

pub fn feed_latest(limit: u32, before_unix: i64) -> String {
    format!("{SCHEMA_TAG}:feed:listLatest:limit={limit}:before={before_unix}")
}

pub fn feed_by_following(limit: u32, account_id: i64, before_unix: i64) -> String {
    format!("{SCHEMA_TAG}:feed:listByFollowing:limit={limit}:accountID={account_id}:before={before_unix}")
}

pub fn video_detail(video_id: i64) -> String {
    format!("{SCHEMA_TAG}:video:detail:id={video_id}")
}

/// Minute-bucket key. `minute` is a minute-truncated unix timestamp.
pub fn hot_video_minute_bucket(minute: i64) -> String {
    format!("hot:video:1m:{minute}")
}

pub fn hot_video_snapshot(as_of: i64) -> String {
    format!("hot:video:merge:1m:{as_of}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_carry_schema_tag() {
        assert!(account_token(1).starts_with(SCHEMA_TAG));
        assert!(feed_latest(10, 0).starts_with(SCHEMA_TAG));
        assert!(video_detail(5).starts_with(SCHEMA_TAG));
    }

    #[test]
    fn hot_bucket_keys_are_not_schema_tagged() {
        // Sorted-set bucket keys are read by minute arithmetic across
        // the union-store window, not deserialized as a response body,
        // so they don't carry the response schema tag.
        assert!(!hot_video_minute_bucket(123).starts_with(SCHEMA_TAG));
    }
}
