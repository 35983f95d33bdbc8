//! Show attendance entity definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ShowDetail;

/// Lowest accepted rating.
pub const MIN_RATING: f64 = 1.0;

/// Highest accepted rating.
pub const MAX_RATING: f64 = 5.0;

/// Returns true if `rating` lies in the inclusive accepted range.
pub fn is_valid_rating(rating: f64) -> bool {
    (MIN_RATING..=MAX_RATING).contains(&rating)
}

/// A user's record of a show. At most one exists per (user, show).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowAttendance {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning user.
    pub user_id: Uuid,
    /// Attended show.
    pub show_id: Uuid,
    /// Whether the user was there (false marks a show they wanted to see).
    pub attended: bool,
    /// Rating between 1.0 and 5.0.
    pub rating: Option<f64>,
    /// Favorite song of the night.
    pub favorite_song: String,
    /// Free-text notes.
    pub notes: String,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
    /// When this record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl ShowAttendance {
    /// Creates a new attendance record, marked as attended.
    pub fn new(user_id: Uuid, show_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            show_id,
            attended: true,
            rating: None,
            favorite_song: String::new(),
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns true if `user_id` owns this record.
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}

/// An attendance record with its show, band and venue attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceDetail {
    /// The attendance record itself.
    #[serde(flatten)]
    pub attendance: ShowAttendance,
    /// The attended show.
    pub show: ShowDetail,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds_are_inclusive() {
        assert!(is_valid_rating(1.0));
        assert!(is_valid_rating(5.0));
        assert!(is_valid_rating(3.5));
        assert!(!is_valid_rating(0.9));
        assert!(!is_valid_rating(5.1));
        assert!(!is_valid_rating(f64::NAN));
    }

    #[test]
    fn test_new_attendance_defaults_to_attended() {
        let user_id = Uuid::new_v4();
        let attendance = ShowAttendance::new(user_id, Uuid::new_v4());

        assert!(attendance.attended);
        assert!(attendance.rating.is_none());
        assert!(attendance.is_owned_by(user_id));
        assert!(!attendance.is_owned_by(Uuid::new_v4()));
    }
}
