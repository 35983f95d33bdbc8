//! Venue entity definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::normalize::normalize_name;

/// Country used when none is given.
pub const DEFAULT_COUNTRY: &str = "USA";

/// A concert venue.
///
/// Name, city, state and country are stored normalized; the
/// (name, city, state) triple is unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Venue {
    /// Unique identifier.
    pub id: Uuid,
    /// Venue name.
    pub name: String,
    /// City.
    pub city: String,
    /// State or region.
    pub state: String,
    /// Country.
    pub country: String,
    /// Street address.
    pub address: String,
    /// Capacity, if known.
    pub capacity: Option<u32>,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
    /// When this record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Venue {
    /// Creates a new venue in the default country.
    pub fn new(name: &str, city: &str, state: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: normalize_name(name),
            city: normalize_name(city),
            state: normalize_name(state),
            country: normalize_name(DEFAULT_COUNTRY),
            address: String::new(),
            capacity: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the country. Blank input keeps the default.
    pub fn with_country(mut self, country: &str) -> Self {
        let country = normalize_name(country);
        if !country.is_empty() {
            self.country = country;
        }
        self
    }

    /// Sets the street address.
    pub fn with_address(mut self, address: &str) -> Self {
        self.address = address.trim().to_string();
        self
    }

    /// Sets the capacity.
    pub fn with_capacity(mut self, capacity: Option<u32>) -> Self {
        self.capacity = capacity;
        self
    }
}
