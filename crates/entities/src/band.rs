//! Band entity definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::normalize::normalize_name;

/// A band or artist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Band {
    /// Unique identifier.
    pub id: Uuid,
    /// Band name, stored trimmed and lower-cased. Unique.
    pub name: String,
    /// Genre.
    pub genre: String,
    /// Free-text description.
    pub description: String,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
    /// When this record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Band {
    /// Creates a new band. The name is normalized.
    pub fn new(name: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: normalize_name(name),
            genre: String::new(),
            description: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the genre.
    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = genre.into();
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}
