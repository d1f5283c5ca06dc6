//! Data Transfer Objects - request/response types for the management API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

fn default_post_type() -> String {
    "educational".to_string()
}

/// Request to create a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub topic: String,
    /// Kebab-case post type name; parsed case-insensitively.
    #[serde(default = "default_post_type")]
    pub post_type: String,
}

/// A post as returned by the management API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: Uuid,
    pub topic: String,
    pub post_type: String,
    pub draft: Option<String>,
    pub status: String,
    /// Present while Pending; where the review conversation is.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_step: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response containing an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
}
