//! Show entity definitions.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Band, Venue, calendar_date};

/// A performance by one band at one venue.
///
/// At most one show exists per (band, venue, calendar date).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Show {
    /// Unique identifier.
    pub id: Uuid,
    /// Performing band.
    pub band_id: Uuid,
    /// Venue.
    pub venue_id: Uuid,
    /// When the show took place, in UTC.
    pub date: DateTime<Utc>,
    /// External setlist reference (setlist.fm id).
    pub setlist_id: Option<String>,
    /// Free-text notes.
    pub notes: String,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
    /// When this record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Show {
    /// Creates a new show.
    pub fn new(band_id: Uuid, venue_id: Uuid, date: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            band_id,
            venue_id,
            date,
            setlist_id: None,
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the notes.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Sets the setlist reference.
    pub fn with_setlist_id(mut self, setlist_id: Option<String>) -> Self {
        self.setlist_id = setlist_id;
        self
    }

    /// Calendar date used for the uniqueness rule and date filters.
    pub fn show_date(&self) -> NaiveDate {
        calendar_date(self.date)
    }
}

/// A show with its band and venue attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowDetail {
    /// The show itself.
    #[serde(flatten)]
    pub show: Show,
    /// Performing band.
    pub band: Band,
    /// Venue.
    pub venue: Venue,
}
