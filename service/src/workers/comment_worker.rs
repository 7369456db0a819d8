use event_schema::{CommentDeletePayload, CommentPublishPayload};

use crate::repository::comments::CommentRepository;
use crate::repository::videos::VideoRepository;

use super::Outcome;

#[derive(Clone)]
pub struct CommentWorker {
    videos: VideoRepository,
    comments: CommentRepository,
}

impl CommentWorker {
    pub fn new(videos: VideoRepository, comments: CommentRepository) -> Self {
        Self { videos, comments }
    }

    pub async fn apply_publish(&self, payload: CommentPublishPayload) -> Outcome {
        match self.videos.find_by_id(payload.video_id).await {
            Ok(None) => return Outcome::Done,
            Err(_) => return Outcome::Transient,
            Ok(Some(_)) => {}
        }

        let created = self
            .comments
            .create(payload.video_id, payload.author_id, &payload.username, &payload.content)
            .await;
        match created {
            Ok(_) => {
                if self.videos.change_popularity(payload.video_id, 1).await.is_err() {
                    return Outcome::Transient;
                }
                Outcome::Done
            }
            Err(_) => Outcome::Transient,
        }
    }

    pub async fn apply_delete(&self, payload: CommentDeletePayload) -> Outcome {
        match self.comments.delete(payload.comment_id).await {
            Ok(_) => Outcome::Done,
            Err(_) => Outcome::Transient,
        }
    }
}
