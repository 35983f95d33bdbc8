//! Concert store trait definitions.

use async_trait::async_trait;
use chrono::NaiveDate;
use entities::{AttendanceDetail, Band, Show, ShowAttendance, ShowDetail, User, Venue};
use uuid::Uuid;

use crate::{ConcertStoreResult, ShowFilter, VenueFilter};

/// Trait for concert storage operations.
///
/// Implementations enforce these uniqueness rules and report violations as
/// [`ConcertStoreError::AlreadyExists`](crate::ConcertStoreError::AlreadyExists):
///
/// - user email, user username
/// - band name
/// - venue (name, city, state)
/// - show (band, venue, calendar date)
/// - attendance (user, show)
///
/// Deleting a user or a show removes the dependent attendance rows in the
/// same atomic operation, before the parent row.
#[async_trait]
pub trait ConcertStore: Send + Sync {
    // =========================================================================
    // User operations
    // =========================================================================

    /// Creates a new user.
    async fn create_user(&self, user: User) -> ConcertStoreResult<User>;

    /// Gets a user by ID.
    async fn get_user(&self, id: Uuid) -> ConcertStoreResult<Option<User>>;

    /// Gets a user by exact email.
    async fn get_user_by_email(&self, email: &str) -> ConcertStoreResult<Option<User>>;

    /// Gets a user whose email or username matches exactly.
    async fn find_user_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> ConcertStoreResult<Option<User>>;

    /// Updates a user.
    async fn update_user(&self, user: User) -> ConcertStoreResult<User>;

    /// Deletes a user and their attendance records. Returns the number of
    /// attendance records removed.
    async fn delete_user(&self, id: Uuid) -> ConcertStoreResult<u64>;

    // =========================================================================
    // Band operations
    // =========================================================================

    /// Creates a new band.
    async fn create_band(&self, band: Band) -> ConcertStoreResult<Band>;

    /// Gets a band by ID.
    async fn get_band(&self, id: Uuid) -> ConcertStoreResult<Option<Band>>;

    /// Gets a band by its normalized name.
    async fn get_band_by_name(&self, name: &str) -> ConcertStoreResult<Option<Band>>;

    /// Lists all bands ordered by name.
    async fn list_bands(&self) -> ConcertStoreResult<Vec<Band>>;

    /// Updates a band.
    async fn update_band(&self, band: Band) -> ConcertStoreResult<Band>;

    /// Deletes a band.
    async fn delete_band(&self, id: Uuid) -> ConcertStoreResult<()>;

    /// Counts shows referencing a band.
    async fn count_shows_for_band(&self, band_id: Uuid) -> ConcertStoreResult<u64>;

    // =========================================================================
    // Venue operations
    // =========================================================================

    /// Creates a new venue.
    async fn create_venue(&self, venue: Venue) -> ConcertStoreResult<Venue>;

    /// Gets a venue by ID.
    async fn get_venue(&self, id: Uuid) -> ConcertStoreResult<Option<Venue>>;

    /// Gets the earliest created venue with the given normalized name.
    async fn get_venue_by_name(&self, name: &str) -> ConcertStoreResult<Option<Venue>>;

    /// Gets the venue with the given normalized (name, city, state).
    async fn find_venue(
        &self,
        name: &str,
        city: &str,
        state: &str,
    ) -> ConcertStoreResult<Option<Venue>>;

    /// Lists venues matching a filter, ordered by name.
    async fn list_venues(&self, filter: VenueFilter) -> ConcertStoreResult<Vec<Venue>>;

    /// Updates a venue.
    async fn update_venue(&self, venue: Venue) -> ConcertStoreResult<Venue>;

    /// Deletes a venue.
    async fn delete_venue(&self, id: Uuid) -> ConcertStoreResult<()>;

    /// Counts shows referencing a venue.
    async fn count_shows_for_venue(&self, venue_id: Uuid) -> ConcertStoreResult<u64>;

    // =========================================================================
    // Show operations
    // =========================================================================

    /// Creates a new show.
    async fn create_show(&self, show: Show) -> ConcertStoreResult<Show>;

    /// Gets a show by ID.
    async fn get_show(&self, id: Uuid) -> ConcertStoreResult<Option<Show>>;

    /// Gets a show with its band and venue.
    async fn get_show_detail(&self, id: Uuid) -> ConcertStoreResult<Option<ShowDetail>>;

    /// Gets the show for a band at a venue on a calendar date.
    async fn find_show_on_date(
        &self,
        band_id: Uuid,
        venue_id: Uuid,
        date: NaiveDate,
    ) -> ConcertStoreResult<Option<Show>>;

    /// Lists shows matching a filter, most recent first.
    async fn list_shows(&self, filter: ShowFilter) -> ConcertStoreResult<Vec<ShowDetail>>;

    /// Updates a show.
    async fn update_show(&self, show: Show) -> ConcertStoreResult<Show>;

    /// Deletes a show and its attendance records. Returns the number of
    /// attendance records removed.
    async fn delete_show(&self, id: Uuid) -> ConcertStoreResult<u64>;

    // =========================================================================
    // Attendance operations
    // =========================================================================

    /// Creates a new attendance record.
    async fn create_attendance(
        &self,
        attendance: ShowAttendance,
    ) -> ConcertStoreResult<ShowAttendance>;

    /// Gets an attendance record by ID.
    async fn get_attendance(&self, id: Uuid) -> ConcertStoreResult<Option<ShowAttendance>>;

    /// Gets a user's attendance record for a show.
    async fn find_attendance(
        &self,
        user_id: Uuid,
        show_id: Uuid,
    ) -> ConcertStoreResult<Option<ShowAttendance>>;

    /// Gets an attendance record with its show, band and venue.
    async fn get_attendance_detail(
        &self,
        id: Uuid,
    ) -> ConcertStoreResult<Option<AttendanceDetail>>;

    /// Lists a user's attendance records, most recent show first.
    async fn list_attendances_for_user(
        &self,
        user_id: Uuid,
    ) -> ConcertStoreResult<Vec<AttendanceDetail>>;

    /// Updates an attendance record.
    async fn update_attendance(
        &self,
        attendance: ShowAttendance,
    ) -> ConcertStoreResult<ShowAttendance>;

    /// Deletes an attendance record.
    async fn delete_attendance(&self, id: Uuid) -> ConcertStoreResult<()>;
}
