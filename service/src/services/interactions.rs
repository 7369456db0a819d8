/// Interaction Services (C4): like/unlike, comment publish/delete,
/// follow/unfollow. Each write dual-publishes a state event and, where
/// applicable, a popularity-delta event; a failed publish on either
/// target is the sole trigger for the matching direct fallback write on
/// that target, so a successful API response always means the effect is
/// either durably queued or already durably applied, never both lost.
use crate::cache::{keys, CacheAccess};
use crate::domain::Comment;
use crate::error::{AppError, AppResult};
use crate::events::{payloads, EventBus};
use crate::repository::comments::CommentRepository;
use crate::repository::follows::FollowRepository;
use crate::repository::likes::LikeRepository;
use crate::repository::videos::VideoRepository;

#[derive(Clone)]
pub struct InteractionService {
    videos: VideoRepository,
    likes: LikeRepository,
    comments: CommentRepository,
    follows: FollowRepository,
    cache: CacheAccess,
    bus: EventBus,
}

impl InteractionService {
    pub fn new(
        videos: VideoRepository,
        likes: LikeRepository,
        comments: CommentRepository,
        follows: FollowRepository,
        cache: CacheAccess,
        bus: EventBus,
    ) -> Self {
        Self {
            videos,
            likes,
            comments,
            follows,
            cache,
            bus,
        }
    }

    fn current_minute(&self) -> i64 {
        chrono::Utc::now().timestamp() / 60 * 60
    }

    /// Direct fallback for a failed popularity-delta publish: bump the
    /// current minute bucket and drop the stale detail cache entry.
    /// Mirrors what `PopularityWorker` would have done for the same
    /// event.
    async fn fallback_popularity_direct(&self, video_id: i64, change: i64) {
        let _ = self.cache.del(&keys::video_detail(video_id)).await;
        let bucket = keys::hot_video_minute_bucket(self.current_minute());
        let _ = self.cache.zincr(&bucket, &video_id.to_string(), change as f64).await;
        let _ = self.cache.expire(&bucket, keys::HOT_BUCKET_TTL).await;
    }

    async fn publish_popularity_delta(&self, video_id: i64, change: i64) -> bool {
        let ok = self
            .bus
            .publish(
                payloads::topics::VIDEO_POPULARITY_EVENTS,
                payloads::actions::POPULARITY_UPDATE,
                &video_id.to_string(),
                payloads::PopularityUpdatePayload { video_id, change },
            )
            .await
            .is_ok();
        if !ok {
            self.fallback_popularity_direct(video_id, change).await;
        }
        ok
    }

    pub async fn like(&self, video_id: i64, account_id: i64) -> AppResult<()> {
        self.videos
            .find_by_id(video_id)
            .await?
            .ok_or_else(|| AppError::Validation("video not found".into()))?;

        let state_ok = self
            .bus
            .publish(
                payloads::topics::LIKE_EVENTS,
                payloads::actions::LIKE_LIKE,
                &video_id.to_string(),
                payloads::LikePayload {
                    user_id: account_id,
                    video_id,
                },
            )
            .await
            .is_ok();

        if !state_ok {
            let (_, was_created) = self.likes.create_idempotent(video_id, account_id).await?;
            if was_created {
                self.videos.change_likes_count(video_id, 1).await?;
                self.videos.change_popularity(video_id, 1).await?;
            }
        }

        self.publish_popularity_delta(video_id, 1).await;
        Ok(())
    }

    pub async fn unlike(&self, video_id: i64, account_id: i64) -> AppResult<()> {
        if !self.likes.is_liked(video_id, account_id).await? {
            return Err(AppError::LogicalPrecondition("not liked".into()));
        }

        let state_ok = self
            .bus
            .publish(
                payloads::topics::LIKE_EVENTS,
                payloads::actions::LIKE_UNLIKE,
                &video_id.to_string(),
                payloads::LikePayload {
                    user_id: account_id,
                    video_id,
                },
            )
            .await
            .is_ok();

        if !state_ok {
            let removed = self.likes.delete(video_id, account_id).await?;
            if removed {
                self.videos.change_likes_count(video_id, -1).await?;
                self.videos.change_popularity(video_id, -1).await?;
            }
        }

        self.publish_popularity_delta(video_id, -1).await;
        Ok(())
    }

    pub async fn publish_comment(
        &self,
        video_id: i64,
        author_id: i64,
        author_username: &str,
        content: &str,
    ) -> AppResult<Comment> {
        if content.trim().is_empty() {
            return Err(AppError::Validation("content must not be empty".into()));
        }
        self.videos
            .find_by_id(video_id)
            .await?
            .ok_or_else(|| AppError::Validation("video not found".into()))?;

        let state_ok = self
            .bus
            .publish(
                payloads::topics::COMMENT_EVENTS,
                payloads::actions::COMMENT_PUBLISH,
                &video_id.to_string(),
                payloads::CommentPublishPayload {
                    username: author_username.to_string(),
                    video_id,
                    author_id,
                    content: content.to_string(),
                },
            )
            .await
            .is_ok();

        let comment = if !state_ok {
            let comment = self
                .comments
                .create(video_id, author_id, author_username, content)
                .await?;
            self.videos.change_popularity(video_id, 1).await?;
            comment
        } else {
            // The worker will create the durable row; the caller still
            // needs a response body, so synthesize one with a
            // provisional id of zero rather than wait on the queue.
            Comment {
                id: 0,
                video_id,
                author_id,
                author_username: author_username.to_string(),
                content: content.to_string(),
                created_at: chrono::Utc::now(),
            }
        };

        self.publish_popularity_delta(video_id, 1).await;
        Ok(comment)
    }

    pub async fn delete_comment(&self, comment_id: i64, caller_id: i64) -> AppResult<()> {
        let comment = self
            .comments
            .find_by_id(comment_id)
            .await?
            .ok_or_else(|| AppError::Validation("comment not found".into()))?;
        if comment.author_id != caller_id {
            return Err(AppError::Forbidden);
        }

        let state_ok = self
            .bus
            .publish(
                payloads::topics::COMMENT_EVENTS,
                payloads::actions::COMMENT_DELETE,
                &comment.video_id.to_string(),
                payloads::CommentDeletePayload { comment_id },
            )
            .await
            .is_ok();

        if !state_ok {
            self.comments.delete(comment_id).await?;
        }
        Ok(())
    }

    pub async fn follow(&self, follower_id: i64, vlogger_id: i64) -> AppResult<()> {
        if follower_id == vlogger_id {
            return Err(AppError::LogicalPrecondition("cannot follow yourself".into()));
        }
        if self.follows.is_following(follower_id, vlogger_id).await? {
            return Err(AppError::LogicalPrecondition("already followed".into()));
        }

        let state_ok = self
            .bus
            .publish(
                payloads::topics::SOCIAL_EVENTS,
                payloads::actions::SOCIAL_FOLLOW,
                &vlogger_id.to_string(),
                payloads::SocialPayload {
                    follower_id,
                    vlogger_id,
                },
            )
            .await
            .is_ok();

        if !state_ok {
            self.follows.create_idempotent(follower_id, vlogger_id).await?;
        }
        Ok(())
    }

    pub async fn unfollow(&self, follower_id: i64, vlogger_id: i64) -> AppResult<()> {
        let state_ok = self
            .bus
            .publish(
                payloads::topics::SOCIAL_EVENTS,
                payloads::actions::SOCIAL_UNFOLLOW,
                &vlogger_id.to_string(),
                payloads::SocialPayload {
                    follower_id,
                    vlogger_id,
                },
            )
            .await
            .is_ok();

        if !state_ok {
            self.follows.delete(follower_id, vlogger_id).await?;
        }
        Ok(())
    }
}
