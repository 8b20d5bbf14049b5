//! User model

use serde::{Deserialize, Serialize};

const AVATAR_BASE_URL: &str = "https://api.dicebear.com/7.x/avataaars/svg";

/// An authenticated user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Identity provider ID
    pub id: String,
    /// Email address
    pub email: String,
    /// Display name
    pub name: String,
    /// Avatar image URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl User {
    /// Build a user from an email, deriving the display name and avatar
    pub fn from_email(id: impl Into<String>, email: &str) -> Self {
        Self {
            id: id.into(),
            email: email.to_string(),
            name: display_name_from_email(email),
            avatar_url: Some(default_avatar_url(email)),
        }
    }
}

/// Display name fallback: the local part of the email
pub fn display_name_from_email(email: &str) -> String {
    email.split('@').next().unwrap_or_default().to_string()
}

/// Generated avatar seeded by the email
pub fn default_avatar_url(email: &str) -> String {
    format!("{}?seed={}", AVATAR_BASE_URL, email)
}
