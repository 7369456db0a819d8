/// Event schemas for the interaction-engine's domain topics.
///
/// Each event carries a `schema_version` so consumers can detect payload
/// drift across deploys. Topics and routing keys mirror the domain
/// boundaries of the write paths that publish onto them.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const SCHEMA_VERSION: u32 = 1;

/// Envelope wrapping every published event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope<T> {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub schema_version: u32,
    pub action: String,
    pub payload: T,
}

impl<T> EventEnvelope<T> {
    pub fn new(action: impl Into<String>, payload: T) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            schema_version: SCHEMA_VERSION,
            action: action.into(),
            payload,
        }
    }
}

/// Per-domain topic names. Routing keys are the `action` field on the
/// envelope, not a separate broker concept, since the bus is modeled as
/// Kafka topics rather than an AMQP exchange/queue pair.
pub mod topics {
    pub const LIKE_EVENTS: &str = "like.events";
    pub const COMMENT_EVENTS: &str = "comment.events";
    pub const SOCIAL_EVENTS: &str = "social.events";
    pub const VIDEO_POPULARITY_EVENTS: &str = "video.popularity.events";
}

pub mod actions {
    pub const LIKE_LIKE: &str = "like.like";
    pub const LIKE_UNLIKE: &str = "like.unlike";
    pub const COMMENT_PUBLISH: &str = "comment.publish";
    pub const COMMENT_DELETE: &str = "comment.delete";
    pub const SOCIAL_FOLLOW: &str = "social.follow";
    pub const SOCIAL_UNFOLLOW: &str = "social.unfollow";
    pub const POPULARITY_UPDATE: &str = "video.popularity.update";
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikePayload {
    pub user_id: i64,
    pub video_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentPublishPayload {
    pub username: String,
    pub video_id: i64,
    pub author_id: i64,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentDeletePayload {
    pub comment_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialPayload {
    pub follower_id: i64,
    pub vlogger_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopularityUpdatePayload {
    pub video_id: i64,
    pub change: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_carries_schema_version() {
        let env = EventEnvelope::new(
            actions::LIKE_LIKE,
            LikePayload {
                user_id: 1,
                video_id: 2,
            },
        );
        assert_eq!(env.schema_version, SCHEMA_VERSION);
        assert_eq!(env.action, actions::LIKE_LIKE);
    }
}
