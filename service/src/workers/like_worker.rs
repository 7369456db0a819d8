use event_schema::{actions, LikePayload};

use crate::repository::likes::LikeRepository;
use crate::repository::videos::VideoRepository;

use super::Outcome;

#[derive(Clone)]
pub struct LikeWorker {
    videos: VideoRepository,
    likes: LikeRepository,
}

impl LikeWorker {
    pub fn new(videos: VideoRepository, likes: LikeRepository) -> Self {
        Self { videos, likes }
    }

    pub async fn apply(&self, action: &str, payload: LikePayload) -> Outcome {
        match self.videos.find_by_id(payload.video_id).await {
            Ok(None) => return Outcome::Done, // absent target: ack and drop
            Err(_) => return Outcome::Transient,
            Ok(Some(_)) => {}
        }

        if action == actions::LIKE_LIKE {
            match self.likes.create_idempotent(payload.video_id, payload.user_id).await {
                Ok((_, was_created)) => {
                    if was_created {
                        if self.videos.change_likes_count(payload.video_id, 1).await.is_err() {
                            return Outcome::Transient;
                        }
                        if self.videos.change_popularity(payload.video_id, 1).await.is_err() {
                            return Outcome::Transient;
                        }
                    }
                    Outcome::Done
                }
                Err(_) => Outcome::Transient,
            }
        } else {
            match self.likes.delete(payload.video_id, payload.user_id).await {
                Ok(removed) => {
                    if removed {
                        if self.videos.change_likes_count(payload.video_id, -1).await.is_err() {
                            return Outcome::Transient;
                        }
                        if self.videos.change_popularity(payload.video_id, -1).await.is_err() {
                            return Outcome::Transient;
                        }
                    }
                    Outcome::Done
                }
                Err(_) => Outcome::Transient,
            }
        }
    }
}
