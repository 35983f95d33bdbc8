//! Filters for list queries.
//!
//! Text filters are slug-normalized when they are set, so `new-york` and
//! `New York` produce the same filter. Blank values are dropped. Stores apply
//! every present filter as a case-insensitive substring match and combine
//! them with AND.

use chrono::NaiveDate;
use entities::{normalize::normalize_slug, parse_date_filter};

/// Normalizes an optional filter value, discarding blanks.
fn normalized(value: Option<&str>) -> Option<String> {
    value.map(normalize_slug).filter(|v| !v.is_empty())
}

/// Filter options for listing shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShowFilter {
    /// Substring of the band name.
    pub band: Option<String>,
    /// Substring of the venue name.
    pub venue: Option<String>,
    /// Substring of the venue city.
    pub city: Option<String>,
    /// Substring of the venue state.
    pub state: Option<String>,
    /// Earliest calendar date, inclusive.
    pub date_from: Option<NaiveDate>,
    /// Latest calendar date, inclusive.
    pub date_to: Option<NaiveDate>,
}

impl ShowFilter {
    /// Creates an empty filter matching every show.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters by band name.
    pub fn with_band(mut self, band: Option<&str>) -> Self {
        self.band = normalized(band);
        self
    }

    /// Filters by venue name.
    pub fn with_venue(mut self, venue: Option<&str>) -> Self {
        self.venue = normalized(venue);
        self
    }

    /// Filters by venue city.
    pub fn with_city(mut self, city: Option<&str>) -> Self {
        self.city = normalized(city);
        self
    }

    /// Filters by venue state.
    pub fn with_state(mut self, state: Option<&str>) -> Self {
        self.state = normalized(state);
        self
    }

    /// Sets the lower date bound. Malformed dates are ignored.
    pub fn with_date_from(mut self, date_from: Option<&str>) -> Self {
        self.date_from = date_from.and_then(parse_date_filter);
        self
    }

    /// Sets the upper date bound. Malformed dates are ignored.
    pub fn with_date_to(mut self, date_to: Option<&str>) -> Self {
        self.date_to = date_to.and_then(parse_date_filter);
        self
    }

    /// Returns true if `date` falls inside the date bounds.
    pub fn date_in_range(&self, date: NaiveDate) -> bool {
        self.date_from.map_or(true, |from| date >= from)
            && self.date_to.map_or(true, |to| date <= to)
    }
}

/// Filter options for listing venues.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VenueFilter {
    /// Substring of the venue name.
    pub name: Option<String>,
    /// Substring of the city.
    pub city: Option<String>,
    /// Substring of the state.
    pub state: Option<String>,
    /// Substring of the country.
    pub country: Option<String>,
}

impl VenueFilter {
    /// Creates an empty filter matching every venue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters by name.
    pub fn with_name(mut self, name: Option<&str>) -> Self {
        self.name = normalized(name);
        self
    }

    /// Filters by city.
    pub fn with_city(mut self, city: Option<&str>) -> Self {
        self.city = normalized(city);
        self
    }

    /// Filters by state.
    pub fn with_state(mut self, state: Option<&str>) -> Self {
        self.state = normalized(state);
        self
    }

    /// Filters by country.
    pub fn with_country(mut self, country: Option<&str>) -> Self {
        self.country = normalized(country);
        self
    }
}
