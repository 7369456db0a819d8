use event_schema::SocialPayload;

use crate::repository::follows::FollowRepository;

use super::Outcome;

#[derive(Clone)]
pub struct SocialWorker {
    follows: FollowRepository,
}

impl SocialWorker {
    pub fn new(follows: FollowRepository) -> Self {
        Self { follows }
    }

    pub async fn apply_follow(&self, payload: SocialPayload) -> Outcome {
        match self.follows.create_idempotent(payload.follower_id, payload.vlogger_id).await {
            Ok(_) => Outcome::Done,
            Err(_) => Outcome::Transient,
        }
    }

    pub async fn apply_unfollow(&self, payload: SocialPayload) -> Outcome {
        match self.follows.delete(payload.follower_id, payload.vlogger_id).await {
            Ok(_) => Outcome::Done,
            Err(_) => Outcome::Transient,
        }
    }
}
