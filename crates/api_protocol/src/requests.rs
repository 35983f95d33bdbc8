//! Request bodies and query strings.

use serde::{Deserialize, Serialize};

// ============================================================================
// Account
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Profile update. Names are required; they are optional here so a missing
/// field is reported by validation with a readable message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteAccountRequest {
    pub password: String,
}

// ============================================================================
// Bands
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBandRequest {
    pub band_name: String,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateBandRequest {
    #[serde(default)]
    pub band_name: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

// ============================================================================
// Venues
// ============================================================================

/// Venue creation. `capacity` is signed so negative input reaches validation
/// instead of failing deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVenueRequest {
    pub name: String,
    pub city: String,
    pub state: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub capacity: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateVenueRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub capacity: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VenuesQuery {
    pub name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

// ============================================================================
// Shows
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateShowRequest {
    pub band_name: String,
    pub venue_name: String,
    pub date: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub setlist_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateShowRequest {
    #[serde(default)]
    pub band_name: Option<String>,
    #[serde(default)]
    pub venue_name: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub setlist_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShowsQuery {
    pub band: Option<String>,
    pub venue: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

// ============================================================================
// Attendance
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttendShowRequest {
    #[serde(default)]
    pub attended: Option<bool>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub favorite_song: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAttendanceRequest {
    #[serde(default)]
    pub attended: Option<bool>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub favorite_song: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}
