/// Feed Service (C5): the four ranking endpoints, cache-aside with
/// lease-based single-flight for the time-ordered feeds, popularity
/// snapshot materialization over the sliding minute-bucket window, and
/// batched per-viewer like-state enrichment.
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::auth::Identity;
use crate::cache::{keys, CacheAccess};
use crate::domain::{Video, VideoView};
use crate::error::{AppError, AppResult};
use crate::repository::likes::LikeRepository;
use crate::repository::videos::VideoRepository;

const POPULARITY_WINDOW_MINUTES: i64 = 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeCursorPage {
    pub video_list: Vec<VideoView>,
    pub next_time: i64,
    pub has_more: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikesCursorPage {
    pub video_list: Vec<VideoView>,
    pub next_likes_count_before: Option<i64>,
    pub next_id_before: Option<i64>,
    pub has_more: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopularityPage {
    pub video_list: Vec<VideoView>,
    pub as_of: i64,
    pub next_offset: i64,
    pub has_more: bool,
    pub next_popularity_before: Option<i64>,
    pub next_create_time_before: Option<i64>,
    pub next_id_before: Option<i64>,
}

/// A page shape that hasn't yet been enriched with per-viewer like
/// state; this is what actually gets cached, since `is_liked` depends
/// on the caller and must never leak between viewers.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawPage<C> {
    videos: Vec<Video>,
    cursor: C,
}

#[derive(Clone)]
pub struct FeedService {
    videos: VideoRepository,
    likes: LikeRepository,
    cache: CacheAccess,
}

impl FeedService {
    pub fn new(videos: VideoRepository, likes: LikeRepository, cache: CacheAccess) -> Self {
        Self { videos, likes, cache }
    }

    async fn enrich(&self, videos: Vec<Video>, viewer: Identity) -> AppResult<Vec<VideoView>> {
        match viewer {
            Identity::Anonymous => Ok(videos
                .into_iter()
                .map(|video| VideoView { video, is_liked: false })
                .collect()),
            Identity::Account(account_id) => {
                let ids: Vec<i64> = videos.iter().map(|v| v.id).collect();
                let liked = self.likes.batch_is_liked(&ids, account_id).await?;
                Ok(videos
                    .into_iter()
                    .map(|video| {
                        let is_liked = *liked.get(&video.id).unwrap_or(&false);
                        VideoView { video, is_liked }
                    })
                    .collect())
            }
        }
    }

    /// `key` is `None` when the request isn't eligible for caching (e.g.
    /// a logged-in viewer on `listLatest`), in which case `build` runs
    /// unconditionally. Otherwise delegates to the shared cache-aside-
    /// with-lease protocol in `CacheAccess`.
    async fn cache_aside<T, F, Fut>(&self, key: Option<&str>, ttl: Duration, lease_ttl: Duration, build: F) -> AppResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = AppResult<T>>,
    {
        match key {
            Some(key) => self.cache.cache_aside(key, ttl, lease_ttl, build).await,
            None => build().await,
        }
    }

    /// `listLatest`. Caches only for anonymous viewers: a logged-in
    /// viewer's response carries no identity in the cache key, so it
    /// must not be cached under a key shared with other viewers.
    pub async fn list_latest(&self, limit: i64, before_unix: i64, viewer: Identity) -> AppResult<TimeCursorPage> {
        let before = unix_to_utc(before_unix);
        let cache_key = match viewer {
            Identity::Anonymous => Some(keys::feed_latest(limit as u32, before_unix)),
            Identity::Account(_) => None,
        };

        let videos_repo = self.videos.clone();
        let raw: RawPage<i64> = self
            .cache_aside(cache_key.as_deref(), keys::FEED_TTL, keys::DEFAULT_LEASE_TTL, || {
                let videos_repo = videos_repo.clone();
                async move {
                    let videos = videos_repo.list_latest(limit, before).await?;
                    let next_time = videos.last().map(|v| v.create_time.timestamp()).unwrap_or(before_unix);
                    Ok(RawPage { videos, cursor: next_time })
                }
            })
            .await?;

        let has_more = raw.videos.len() as i64 == limit;
        let next_time = raw.cursor;
        let video_list = self.enrich(raw.videos, viewer).await?;
        Ok(TimeCursorPage { video_list, next_time, has_more })
    }

    /// `listByFollowing`. Caches only for logged-in viewers: the key
    /// includes `accountID`, so anonymous traffic never populates or
    /// reads this entry.
    pub async fn list_by_following(&self, limit: i64, before_unix: i64, viewer_id: i64) -> AppResult<TimeCursorPage> {
        let before = unix_to_utc(before_unix);
        let cache_key = keys::feed_by_following(limit as u32, viewer_id, before_unix);

        let videos_repo = self.videos.clone();
        let raw: RawPage<i64> = self
            .cache_aside(Some(&cache_key), keys::FEED_TTL, keys::DEFAULT_LEASE_TTL, || {
                let videos_repo = videos_repo.clone();
                async move {
                    let videos = videos_repo.list_by_following(viewer_id, limit, before).await?;
                    let next_time = videos.last().map(|v| v.create_time.timestamp()).unwrap_or(before_unix);
                    Ok(RawPage { videos, cursor: next_time })
                }
            })
            .await?;

        let has_more = raw.videos.len() as i64 == limit;
        let next_time = raw.cursor;
        let video_list = self.enrich(raw.videos, Identity::Account(viewer_id)).await?;
        Ok(TimeCursorPage { video_list, next_time, has_more })
    }

    /// `listLikesCount`. Never cached: the ranking field mutates on
    /// every like/unlike and the composite cursor is cheap on the
    /// supporting index, so a cache would buy little and risk serving
    /// counts that are visibly stale relative to the write the caller
    /// just made.
    pub async fn list_by_likes(
        &self,
        limit: i64,
        likes_count_before: Option<i64>,
        id_before: Option<i64>,
        viewer: Identity,
    ) -> AppResult<LikesCursorPage> {
        if likes_count_before.is_some() != id_before.is_some() {
            return Err(AppError::Validation("cursor pair incomplete".into()));
        }
        let videos = self.videos.list_by_likes(limit, likes_count_before, id_before).await?;
        let has_more = videos.len() as i64 == limit;
        let (next_likes_count_before, next_id_before) = match videos.last() {
            Some(v) => (Some(v.likes_count), Some(v.id)),
            None => (None, None),
        };
        let video_list = self.enrich(videos, viewer).await?;
        Ok(LikesCursorPage {
            video_list,
            next_likes_count_before,
            next_id_before,
            has_more,
        })
    }

    /// `listByPopularity`. `as_of = 0` means "use the current minute".
    /// Materializes a 60-bucket union-store snapshot per minute so that
    /// sequential pages within the snapshot's 2-minute TTL observe an
    /// identical member set regardless of concurrent hot-bucket writes.
    pub async fn list_by_popularity(
        &self,
        limit: i64,
        as_of: i64,
        offset: i64,
        fallback_cursor: (Option<i64>, Option<i64>, Option<i64>),
        viewer: Identity,
    ) -> AppResult<PopularityPage> {
        let as_of = if as_of == 0 {
            Utc::now().timestamp() / 60 * 60
        } else {
            as_of
        };

        match self.try_popularity_from_cache(limit, as_of, offset).await {
            Ok(Some((videos, ordered_ids))) => {
                let has_more = videos.len() as i64 == limit;
                let next_offset = offset + videos.len() as i64;
                let (next_popularity_before, next_create_time_before, next_id_before) = videos
                    .last()
                    .map(|v| (Some(v.popularity), Some(v.create_time.timestamp()), Some(v.id)))
                    .unwrap_or((None, None, None));
                let ordered = reorder_by_ids(videos, &ordered_ids);
                let video_list = self.enrich(ordered, viewer).await?;
                return Ok(PopularityPage {
                    video_list,
                    as_of,
                    next_offset,
                    has_more,
                    next_popularity_before,
                    next_create_time_before,
                    next_id_before,
                });
            }
            Ok(None) => {
                // Empty snapshot page past offset 0: no DB fallback
                // needed, this is a legitimate end-of-results signal.
                return Ok(PopularityPage {
                    video_list: Vec::new(),
                    as_of,
                    next_offset: offset,
                    has_more: false,
                    next_popularity_before: None,
                    next_create_time_before: None,
                    next_id_before: None,
                });
            }
            Err(_) => {
                // Cache unreachable: fall through to the repository's
                // triple-cursor query using the client-supplied cursor.
            }
        }

        let (p, t, i) = fallback_cursor;
        let t_dt = t.map(unix_to_utc);
        let videos = self.videos.list_by_popularity(limit, p, t_dt, i).await?;
        let has_more = videos.len() as i64 == limit;
        let (next_p, next_t, next_i) = videos
            .last()
            .map(|v| (Some(v.popularity), Some(v.create_time.timestamp()), Some(v.id)))
            .unwrap_or((None, None, None));
        let page_len = videos.len() as i64;
        let video_list = self.enrich(videos, viewer).await?;
        Ok(PopularityPage {
            video_list,
            as_of,
            next_offset: offset + page_len,
            has_more,
            next_popularity_before: next_p,
            next_create_time_before: next_t,
            next_id_before: next_i,
        })
    }

    /// Returns `Ok(Some((videos, ordered_ids)))` on a cache hit (even an
    /// empty one), `Ok(None)` when the offset has run past the end of a
    /// legitimately empty snapshot, and `Err` on any cache failure so
    /// the caller falls through to the database.
    async fn try_popularity_from_cache(
        &self,
        limit: i64,
        as_of: i64,
        offset: i64,
    ) -> AppResult<Option<(Vec<Video>, Vec<i64>)>> {
        let dst = keys::hot_video_snapshot(as_of);
        let exists = self.cache.exists(&dst).await?;
        if !exists {
            let buckets: Vec<String> = (0..POPULARITY_WINDOW_MINUTES)
                .map(|k| keys::hot_video_minute_bucket(as_of - k * 60))
                .collect();
            self.cache.zunionstore_sum(&dst, &buckets).await?;
            self.cache.expire(&dst, keys::HOT_SNAPSHOT_TTL).await?;
        }

        let members = self
            .cache
            .zrevrange(&dst, offset as isize, (offset + limit - 1) as isize)
            .await?;
        if members.is_empty() {
            return if offset > 0 { Ok(None) } else { Ok(Some((Vec::new(), Vec::new()))) };
        }

        let ids: Vec<i64> = members.iter().filter_map(|m| m.parse().ok()).collect();
        let videos = self.videos.get_by_ids(&ids).await?;
        Ok(Some((videos, ids)))
    }
}

fn reorder_by_ids(videos: Vec<Video>, ids: &[i64]) -> Vec<Video> {
    let mut by_id: std::collections::HashMap<i64, Video> = videos.into_iter().map(|v| (v.id, v)).collect();
    ids.iter().filter_map(|id| by_id.remove(id)).collect()
}

fn unix_to_utc(ts: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(ts, 0).single().unwrap_or_else(Utc::now)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(id: i64) -> Video {
        Video {
            id,
            author_id: 1,
            author_username: "author".into(),
            title: "t".into(),
            description: String::new(),
            play_url: "u".into(),
            cover_url: String::new(),
            create_time: Utc::now(),
            likes_count: 0,
            popularity: 0,
        }
    }

    #[test]
    fn reorder_by_ids_matches_snapshot_member_order() {
        let videos = vec![video(3), video(1), video(2)];
        let ordered = reorder_by_ids(videos, &[1, 2, 3]);
        let ids: Vec<i64> = ordered.iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn reorder_by_ids_drops_ids_with_no_matching_row() {
        let videos = vec![video(1)];
        let ordered = reorder_by_ids(videos, &[5, 1, 9]);
        let ids: Vec<i64> = ordered.iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![1]);
    }
}
