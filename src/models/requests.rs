use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::models::domain::{Gender, UserId};

/// Request addressed to a single user (find match, stop, block)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UserActionRequest {
    #[validate(range(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: UserId,
}

/// Register (or look up) an account by its external id
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterUserRequest {
    #[validate(length(min = 1, max = 50))]
    #[serde(alias = "external_id", rename = "externalId")]
    pub external_id: String,
}

/// Create or replace a user's profile
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SaveProfileRequest {
    #[validate(range(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: UserId,
    #[validate(range(min = 18, max = 99))]
    pub age: u8,
    pub gender: Gender,
    #[serde(alias = "looking_for", rename = "lookingFor")]
    pub looking_for: Gender,
    #[validate(range(min = 18, max = 99))]
    #[serde(default = "default_min_age", alias = "min_age", rename = "minAge")]
    pub min_age: u8,
    #[validate(range(min = 18, max = 99))]
    #[serde(default = "default_max_age", alias = "max_age", rename = "maxAge")]
    pub max_age: u8,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub interests: Option<String>,
}

fn default_min_age() -> u8 {
    18
}

fn default_max_age() -> u8 {
    50
}

/// Send a chat message on the sender's active pairing
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SendMessageRequest {
    #[validate(range(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: UserId,
    #[validate(length(min = 1, max = 1000))]
    pub content: String,
}

/// Query string for match history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryQuery {
    #[serde(rename = "userId")]
    pub user_id: UserId,
    #[serde(default = "default_history_limit")]
    pub limit: u16,
}

fn default_history_limit() -> u16 {
    10
}

/// Query string addressed to a single user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserQuery {
    #[serde(rename = "userId")]
    pub user_id: UserId,
}
