use event_schema::PopularityUpdatePayload;

use crate::cache::{keys, CacheAccess};

use super::Outcome;

/// Maintains the sliding-window hot-bucket cache only; the `video.popularity`
/// DB column is owned by the like/comment worker transactions, not this one.
#[derive(Clone)]
pub struct PopularityWorker {
    cache: CacheAccess,
}

impl PopularityWorker {
    pub fn new(cache: CacheAccess) -> Self {
        Self { cache }
    }

    pub async fn apply(&self, payload: PopularityUpdatePayload) -> Outcome {
        if self.cache.del(&keys::video_detail(payload.video_id)).await.is_err() {
            return Outcome::Transient;
        }
        let minute = chrono::Utc::now().timestamp() / 60 * 60;
        let bucket = keys::hot_video_minute_bucket(minute);
        if self
            .cache
            .zincr(&bucket, &payload.video_id.to_string(), payload.change as f64)
            .await
            .is_err()
        {
            return Outcome::Transient;
        }
        if self.cache.expire(&bucket, keys::HOT_BUCKET_TTL).await.is_err() {
            return Outcome::Transient;
        }
        Outcome::Done
    }
}
