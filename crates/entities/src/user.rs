//! User-related entity definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier.
    pub id: Uuid,
    /// Email address, unique and compared exactly as stored.
    pub email: String,
    /// Username, unique.
    pub username: String,
    /// Argon2 PHC string. Never serialized.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Free-text location ("City, State").
    pub location: String,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
    /// When this record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a new user with an already hashed password.
    pub fn new(
        email: impl Into<String>,
        username: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            username: username.into(),
            password_hash: password_hash.into(),
            first_name: String::new(),
            last_name: String::new(),
            location: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the profile fields.
    pub fn with_profile(
        mut self,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        self.first_name = first_name.into();
        self.last_name = last_name.into();
        self.location = location.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_creation() {
        let user = User::new("fan@example.com", "fan", "$argon2id$hash")
            .with_profile("Jerry", "Garcia", "San Francisco, CA");

        assert_eq!(user.email, "fan@example.com");
        assert_eq!(user.username, "fan");
        assert_eq!(user.location, "San Francisco, CA");
        assert_eq!(user.created_at, user.updated_at);
    }

    #[test]
    fn test_password_hash_is_never_serialized() {
        let user = User::new("fan@example.com", "fan", "$argon2id$secret");
        let json = serde_json::to_value(&user).unwrap();

        assert!(json.get("password_hash").is_none());
        assert!(!json.to_string().contains("secret"));
    }
}
