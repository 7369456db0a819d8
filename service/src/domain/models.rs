use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account entity. `current_token` enforces single-active-session: a new
/// login overwrites it, revoking any previously issued token.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Account {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(skip_serializing)]
    pub current_token: String,
}

/// Public view of an account with secrets stripped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountPublic {
    pub id: i64,
    pub username: String,
}

impl From<Account> for AccountPublic {
    fn from(a: Account) -> Self {
        Self {
            id: a.id,
            username: a.username,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Video {
    pub id: i64,
    pub author_id: i64,
    pub author_username: String,
    pub title: String,
    pub description: String,
    pub play_url: String,
    pub cover_url: String,
    pub create_time: DateTime<Utc>,
    pub likes_count: i64,
    pub popularity: i64,
}

/// Video enriched with the viewer's like state; used on every feed and
/// detail response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoView {
    #[serde(flatten)]
    pub video: Video,
    pub is_liked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Like {
    pub id: i64,
    pub video_id: i64,
    pub account_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub video_id: i64,
    pub author_id: i64,
    pub author_username: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Follow {
    pub id: i64,
    pub follower_id: i64,
    pub vlogger_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_public_strips_secrets() {
        let account = Account {
            id: 7,
            username: "alice".into(),
            password_hash: "hash".into(),
            current_token: "token".into(),
        };
        let public = AccountPublic::from(account);
        let json = serde_json::to_value(&public).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["username"], "alice");
        assert!(json.get("password_hash").is_none());
        assert!(json.get("current_token").is_none());
    }

    #[test]
    fn account_serialization_omits_secrets_too() {
        let account = Account {
            id: 1,
            username: "bob".into(),
            password_hash: "hash".into(),
            current_token: "token".into(),
        };
        let json = serde_json::to_value(&account).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("current_token").is_none());
    }
}
