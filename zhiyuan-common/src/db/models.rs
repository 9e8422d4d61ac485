//! Database models

use serde::{Deserialize, Serialize};

/// Account row without credential material
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub guid: String,
    pub username: String,
    pub email: String,
    pub role: String,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

/// Credential material for login verification. Never serialized.
#[derive(Debug, Clone)]
pub struct StoredCredentials {
    pub guid: String,
    pub username: String,
    pub role: String,
    pub password_hash: String,
    pub password_salt: String,
}

/// Per-user recommendation defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub province: String,
    pub exam_type: String,
    pub last_rank: i64,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            province: "广东".to_string(),
            exam_type: "物理类".to_string(),
            last_rank: 10000,
        }
    }
}

/// Announcement row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Announcement {
    pub guid: String,
    pub title: String,
    pub content: String,
    pub expire_time: Option<String>,
    pub is_pinned: bool,
    pub created_at: String,
}

/// Wishlist entry row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Favorite {
    pub guid: String,
    pub school: String,
    pub major: String,
    pub category: String,
    pub sort_order: i64,
    pub note: Option<String>,
    pub created_at: String,
}
