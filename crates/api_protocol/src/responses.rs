//! Response bodies.
//!
//! Bands, venues, shows and attendance records are returned as the entity
//! types themselves (`Band`, `Venue`, `ShowDetail`, `AttendanceDetail`).

use chrono::{DateTime, Utc};
use entities::User;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user as seen by clients. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub location: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            location: user.location.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Response for register and login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

/// Plain confirmation message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response for show deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteShowResponse {
    pub message: String,
    /// Attendance records removed along with the show.
    pub attendances_removed: u64,
}

/// Liveness probe response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_profile_has_no_password() {
        let user = User::new("fan@example.com", "fan", "$argon2id$secret");
        let json = serde_json::to_string(&UserProfile::from(&user)).unwrap();

        assert!(json.contains("fan@example.com"));
        assert!(!json.contains("argon2"));
        assert!(!json.contains("password"));
    }
}
