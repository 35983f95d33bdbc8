//! In-memory concert store implementation for testing.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use entities::{
    normalize::contains_normalized, AttendanceDetail, Band, Show, ShowAttendance, ShowDetail,
    User, Venue,
};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{ConcertStore, ConcertStoreError, ConcertStoreResult, ShowFilter, VenueFilter};

/// Backing tables. They share one lock so cascading deletes and
/// check-then-insert sequences are atomic.
#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    bands: HashMap<Uuid, Band>,
    venues: HashMap<Uuid, Venue>,
    shows: HashMap<Uuid, Show>,
    attendances: HashMap<Uuid, ShowAttendance>,
}

impl Tables {
    fn show_detail(&self, show: &Show) -> ConcertStoreResult<ShowDetail> {
        let band = self
            .bands
            .get(&show.band_id)
            .cloned()
            .ok_or_else(|| ConcertStoreError::not_found("Band", show.band_id))?;
        let venue = self
            .venues
            .get(&show.venue_id)
            .cloned()
            .ok_or_else(|| ConcertStoreError::not_found("Venue", show.venue_id))?;

        Ok(ShowDetail {
            show: show.clone(),
            band,
            venue,
        })
    }

    fn attendance_detail(&self, attendance: &ShowAttendance) -> ConcertStoreResult<AttendanceDetail> {
        let show = self
            .shows
            .get(&attendance.show_id)
            .ok_or_else(|| ConcertStoreError::not_found("Show", attendance.show_id))?;

        Ok(AttendanceDetail {
            attendance: attendance.clone(),
            show: self.show_detail(show)?,
        })
    }

    fn user_conflict(&self, user: &User) -> bool {
        self.users.values().any(|u| {
            u.id != user.id && (u.email == user.email || u.username == user.username)
        })
    }

    fn band_conflict(&self, band: &Band) -> bool {
        self.bands
            .values()
            .any(|b| b.id != band.id && b.name == band.name)
    }

    fn venue_conflict(&self, venue: &Venue) -> bool {
        self.venues.values().any(|v| {
            v.id != venue.id && v.name == venue.name && v.city == venue.city && v.state == venue.state
        })
    }

    fn show_conflict(&self, show: &Show) -> bool {
        self.shows.values().any(|s| {
            s.id != show.id
                && s.band_id == show.band_id
                && s.venue_id == show.venue_id
                && s.show_date() == show.show_date()
        })
    }

    fn check_show_references(&self, show: &Show) -> ConcertStoreResult<()> {
        if !self.bands.contains_key(&show.band_id) {
            return Err(ConcertStoreError::ForeignKeyViolation(format!(
                "Band {}",
                show.band_id
            )));
        }
        if !self.venues.contains_key(&show.venue_id) {
            return Err(ConcertStoreError::ForeignKeyViolation(format!(
                "Venue {}",
                show.venue_id
            )));
        }
        Ok(())
    }
}

/// Sorts shows by date, most recent first, with the ID as a stable tie-break.
fn sort_most_recent_first(shows: &mut [ShowDetail]) {
    shows.sort_by(|a, b| {
        b.show
            .date
            .cmp(&a.show.date)
            .then_with(|| b.show.id.cmp(&a.show.id))
    });
}

fn field_matches(value: &str, needle: &Option<String>) -> bool {
    needle
        .as_deref()
        .map_or(true, |needle| contains_normalized(value, needle))
}

/// In-memory concert store for testing purposes.
#[derive(Debug, Default)]
pub struct MemoryConcertStore {
    tables: RwLock<Tables>,
}

impl MemoryConcertStore {
    /// Creates a new in-memory concert store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConcertStore for MemoryConcertStore {
    // =========================================================================
    // User operations
    // =========================================================================

    async fn create_user(&self, user: User) -> ConcertStoreResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.contains_key(&user.id) || tables.user_conflict(&user) {
            return Err(ConcertStoreError::already_exists("User", &user.email));
        }
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> ConcertStoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> ConcertStoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> ConcertStoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.email == email || u.username == username)
            .cloned())
    }

    async fn update_user(&self, user: User) -> ConcertStoreResult<User> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&user.id) {
            return Err(ConcertStoreError::not_found("User", user.id));
        }
        if tables.user_conflict(&user) {
            return Err(ConcertStoreError::already_exists("User", &user.email));
        }
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete_user(&self, id: Uuid) -> ConcertStoreResult<u64> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&id) {
            return Err(ConcertStoreError::not_found("User", id));
        }
        let before = tables.attendances.len();
        tables.attendances.retain(|_, a| a.user_id != id);
        let removed = (before - tables.attendances.len()) as u64;
        tables.users.remove(&id);
        Ok(removed)
    }

    // =========================================================================
    // Band operations
    // =========================================================================

    async fn create_band(&self, band: Band) -> ConcertStoreResult<Band> {
        let mut tables = self.tables.write().await;
        if tables.bands.contains_key(&band.id) || tables.band_conflict(&band) {
            return Err(ConcertStoreError::already_exists("Band", &band.name));
        }
        tables.bands.insert(band.id, band.clone());
        Ok(band)
    }

    async fn get_band(&self, id: Uuid) -> ConcertStoreResult<Option<Band>> {
        let tables = self.tables.read().await;
        Ok(tables.bands.get(&id).cloned())
    }

    async fn get_band_by_name(&self, name: &str) -> ConcertStoreResult<Option<Band>> {
        let tables = self.tables.read().await;
        Ok(tables.bands.values().find(|b| b.name == name).cloned())
    }

    async fn list_bands(&self) -> ConcertStoreResult<Vec<Band>> {
        let tables = self.tables.read().await;
        let mut bands: Vec<Band> = tables.bands.values().cloned().collect();
        bands.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(bands)
    }

    async fn update_band(&self, band: Band) -> ConcertStoreResult<Band> {
        let mut tables = self.tables.write().await;
        if !tables.bands.contains_key(&band.id) {
            return Err(ConcertStoreError::not_found("Band", band.id));
        }
        if tables.band_conflict(&band) {
            return Err(ConcertStoreError::already_exists("Band", &band.name));
        }
        tables.bands.insert(band.id, band.clone());
        Ok(band)
    }

    async fn delete_band(&self, id: Uuid) -> ConcertStoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.shows.values().any(|s| s.band_id == id) {
            return Err(ConcertStoreError::ForeignKeyViolation(format!("Band {id}")));
        }
        if tables.bands.remove(&id).is_none() {
            return Err(ConcertStoreError::not_found("Band", id));
        }
        Ok(())
    }

    async fn count_shows_for_band(&self, band_id: Uuid) -> ConcertStoreResult<u64> {
        let tables = self.tables.read().await;
        Ok(tables.shows.values().filter(|s| s.band_id == band_id).count() as u64)
    }

    // =========================================================================
    // Venue operations
    // =========================================================================

    async fn create_venue(&self, venue: Venue) -> ConcertStoreResult<Venue> {
        let mut tables = self.tables.write().await;
        if tables.venues.contains_key(&venue.id) || tables.venue_conflict(&venue) {
            return Err(ConcertStoreError::already_exists("Venue", &venue.name));
        }
        tables.venues.insert(venue.id, venue.clone());
        Ok(venue)
    }

    async fn get_venue(&self, id: Uuid) -> ConcertStoreResult<Option<Venue>> {
        let tables = self.tables.read().await;
        Ok(tables.venues.get(&id).cloned())
    }

    async fn get_venue_by_name(&self, name: &str) -> ConcertStoreResult<Option<Venue>> {
        let tables = self.tables.read().await;
        Ok(tables
            .venues
            .values()
            .filter(|v| v.name == name)
            .min_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)))
            .cloned())
    }

    async fn find_venue(
        &self,
        name: &str,
        city: &str,
        state: &str,
    ) -> ConcertStoreResult<Option<Venue>> {
        let tables = self.tables.read().await;
        Ok(tables
            .venues
            .values()
            .find(|v| v.name == name && v.city == city && v.state == state)
            .cloned())
    }

    async fn list_venues(&self, filter: VenueFilter) -> ConcertStoreResult<Vec<Venue>> {
        let tables = self.tables.read().await;
        let mut venues: Vec<Venue> = tables
            .venues
            .values()
            .filter(|v| {
                field_matches(&v.name, &filter.name)
                    && field_matches(&v.city, &filter.city)
                    && field_matches(&v.state, &filter.state)
                    && field_matches(&v.country, &filter.country)
            })
            .cloned()
            .collect();
        venues.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.city.cmp(&b.city)));
        Ok(venues)
    }

    async fn update_venue(&self, venue: Venue) -> ConcertStoreResult<Venue> {
        let mut tables = self.tables.write().await;
        if !tables.venues.contains_key(&venue.id) {
            return Err(ConcertStoreError::not_found("Venue", venue.id));
        }
        if tables.venue_conflict(&venue) {
            return Err(ConcertStoreError::already_exists("Venue", &venue.name));
        }
        tables.venues.insert(venue.id, venue.clone());
        Ok(venue)
    }

    async fn delete_venue(&self, id: Uuid) -> ConcertStoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.shows.values().any(|s| s.venue_id == id) {
            return Err(ConcertStoreError::ForeignKeyViolation(format!("Venue {id}")));
        }
        if tables.venues.remove(&id).is_none() {
            return Err(ConcertStoreError::not_found("Venue", id));
        }
        Ok(())
    }

    async fn count_shows_for_venue(&self, venue_id: Uuid) -> ConcertStoreResult<u64> {
        let tables = self.tables.read().await;
        Ok(tables.shows.values().filter(|s| s.venue_id == venue_id).count() as u64)
    }

    // =========================================================================
    // Show operations
    // =========================================================================

    async fn create_show(&self, show: Show) -> ConcertStoreResult<Show> {
        let mut tables = self.tables.write().await;
        tables.check_show_references(&show)?;
        if tables.shows.contains_key(&show.id) || tables.show_conflict(&show) {
            return Err(ConcertStoreError::already_exists("Show", show.id));
        }
        tables.shows.insert(show.id, show.clone());
        Ok(show)
    }

    async fn get_show(&self, id: Uuid) -> ConcertStoreResult<Option<Show>> {
        let tables = self.tables.read().await;
        Ok(tables.shows.get(&id).cloned())
    }

    async fn get_show_detail(&self, id: Uuid) -> ConcertStoreResult<Option<ShowDetail>> {
        let tables = self.tables.read().await;
        tables
            .shows
            .get(&id)
            .map(|show| tables.show_detail(show))
            .transpose()
    }

    async fn find_show_on_date(
        &self,
        band_id: Uuid,
        venue_id: Uuid,
        date: NaiveDate,
    ) -> ConcertStoreResult<Option<Show>> {
        let tables = self.tables.read().await;
        Ok(tables
            .shows
            .values()
            .find(|s| s.band_id == band_id && s.venue_id == venue_id && s.show_date() == date)
            .cloned())
    }

    async fn list_shows(&self, filter: ShowFilter) -> ConcertStoreResult<Vec<ShowDetail>> {
        let tables = self.tables.read().await;
        let mut shows = Vec::new();
        for show in tables.shows.values() {
            if !filter.date_in_range(show.show_date()) {
                continue;
            }
            let detail = tables.show_detail(show)?;
            if field_matches(&detail.band.name, &filter.band)
                && field_matches(&detail.venue.name, &filter.venue)
                && field_matches(&detail.venue.city, &filter.city)
                && field_matches(&detail.venue.state, &filter.state)
            {
                shows.push(detail);
            }
        }
        sort_most_recent_first(&mut shows);
        Ok(shows)
    }

    async fn update_show(&self, show: Show) -> ConcertStoreResult<Show> {
        let mut tables = self.tables.write().await;
        if !tables.shows.contains_key(&show.id) {
            return Err(ConcertStoreError::not_found("Show", show.id));
        }
        tables.check_show_references(&show)?;
        if tables.show_conflict(&show) {
            return Err(ConcertStoreError::already_exists("Show", show.id));
        }
        tables.shows.insert(show.id, show.clone());
        Ok(show)
    }

    async fn delete_show(&self, id: Uuid) -> ConcertStoreResult<u64> {
        let mut tables = self.tables.write().await;
        if !tables.shows.contains_key(&id) {
            return Err(ConcertStoreError::not_found("Show", id));
        }
        let before = tables.attendances.len();
        tables.attendances.retain(|_, a| a.show_id != id);
        let removed = (before - tables.attendances.len()) as u64;
        tables.shows.remove(&id);
        Ok(removed)
    }

    // =========================================================================
    // Attendance operations
    // =========================================================================

    async fn create_attendance(
        &self,
        attendance: ShowAttendance,
    ) -> ConcertStoreResult<ShowAttendance> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&attendance.user_id) {
            return Err(ConcertStoreError::ForeignKeyViolation(format!(
                "User {}",
                attendance.user_id
            )));
        }
        if !tables.shows.contains_key(&attendance.show_id) {
            return Err(ConcertStoreError::ForeignKeyViolation(format!(
                "Show {}",
                attendance.show_id
            )));
        }
        let duplicate = tables.attendances.values().any(|a| {
            a.id == attendance.id
                || (a.user_id == attendance.user_id && a.show_id == attendance.show_id)
        });
        if duplicate {
            return Err(ConcertStoreError::already_exists(
                "ShowAttendance",
                attendance.show_id,
            ));
        }
        tables.attendances.insert(attendance.id, attendance.clone());
        Ok(attendance)
    }

    async fn get_attendance(&self, id: Uuid) -> ConcertStoreResult<Option<ShowAttendance>> {
        let tables = self.tables.read().await;
        Ok(tables.attendances.get(&id).cloned())
    }

    async fn find_attendance(
        &self,
        user_id: Uuid,
        show_id: Uuid,
    ) -> ConcertStoreResult<Option<ShowAttendance>> {
        let tables = self.tables.read().await;
        Ok(tables
            .attendances
            .values()
            .find(|a| a.user_id == user_id && a.show_id == show_id)
            .cloned())
    }

    async fn get_attendance_detail(
        &self,
        id: Uuid,
    ) -> ConcertStoreResult<Option<AttendanceDetail>> {
        let tables = self.tables.read().await;
        tables
            .attendances
            .get(&id)
            .map(|attendance| tables.attendance_detail(attendance))
            .transpose()
    }

    async fn list_attendances_for_user(
        &self,
        user_id: Uuid,
    ) -> ConcertStoreResult<Vec<AttendanceDetail>> {
        let tables = self.tables.read().await;
        let mut result = tables
            .attendances
            .values()
            .filter(|a| a.user_id == user_id)
            .map(|a| tables.attendance_detail(a))
            .collect::<ConcertStoreResult<Vec<_>>>()?;
        result.sort_by(|a, b| {
            b.show
                .show
                .date
                .cmp(&a.show.show.date)
                .then_with(|| b.attendance.id.cmp(&a.attendance.id))
        });
        Ok(result)
    }

    async fn update_attendance(
        &self,
        attendance: ShowAttendance,
    ) -> ConcertStoreResult<ShowAttendance> {
        let mut tables = self.tables.write().await;
        if !tables.attendances.contains_key(&attendance.id) {
            return Err(ConcertStoreError::not_found("ShowAttendance", attendance.id));
        }
        tables.attendances.insert(attendance.id, attendance.clone());
        Ok(attendance)
    }

    async fn delete_attendance(&self, id: Uuid) -> ConcertStoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.attendances.remove(&id).is_none() {
            return Err(ConcertStoreError::not_found("ShowAttendance", id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    async fn seed_show(store: &MemoryConcertStore) -> (Band, Venue, Show) {
        let band = store.create_band(Band::new("Goose")).await.unwrap();
        let venue = store
            .create_venue(Venue::new("Red Rocks", "Morrison", "CO"))
            .await
            .unwrap();
        let date = Utc.with_ymd_and_hms(2024, 6, 21, 19, 0, 0).unwrap();
        let show = store
            .create_show(Show::new(band.id, venue.id, date))
            .await
            .unwrap();
        (band, venue, show)
    }

    #[tokio::test]
    async fn test_user_uniqueness() {
        let store = MemoryConcertStore::new();
        store
            .create_user(User::new("a@example.com", "alice", "hash"))
            .await
            .unwrap();

        let same_email = store
            .create_user(User::new("a@example.com", "other", "hash"))
            .await;
        assert!(matches!(same_email, Err(ConcertStoreError::AlreadyExists { .. })));

        let same_username = store
            .create_user(User::new("b@example.com", "alice", "hash"))
            .await;
        assert!(matches!(same_username, Err(ConcertStoreError::AlreadyExists { .. })));

        // Email comparison is exact.
        assert!(store
            .create_user(User::new("A@example.com", "alice2", "hash"))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_band_crud() {
        let store = MemoryConcertStore::new();

        let created = store.create_band(Band::new("Phish")).await.unwrap();
        let fetched = store.get_band_by_name("phish").await.unwrap().unwrap();
        assert_eq!(fetched.id, created.id);

        assert!(matches!(
            store.create_band(Band::new("PHISH ")).await,
            Err(ConcertStoreError::AlreadyExists { .. })
        ));

        store.delete_band(created.id).await.unwrap();
        assert!(store.get_band(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_referenced_band_and_venue_cannot_be_deleted() {
        let store = MemoryConcertStore::new();
        let (band, venue, _) = seed_show(&store).await;

        assert_eq!(store.count_shows_for_band(band.id).await.unwrap(), 1);
        assert_eq!(store.count_shows_for_venue(venue.id).await.unwrap(), 1);
        assert!(matches!(
            store.delete_band(band.id).await,
            Err(ConcertStoreError::ForeignKeyViolation(_))
        ));
        assert!(matches!(
            store.delete_venue(venue.id).await,
            Err(ConcertStoreError::ForeignKeyViolation(_))
        ));
    }

    #[tokio::test]
    async fn test_show_unique_per_calendar_date() {
        let store = MemoryConcertStore::new();
        let (band, venue, _) = seed_show(&store).await;

        let late = Utc.with_ymd_and_hms(2024, 6, 21, 23, 30, 0).unwrap();
        assert!(matches!(
            store.create_show(Show::new(band.id, venue.id, late)).await,
            Err(ConcertStoreError::AlreadyExists { .. })
        ));

        let next_day = Utc.with_ymd_and_hms(2024, 6, 22, 19, 0, 0).unwrap();
        assert!(store
            .create_show(Show::new(band.id, venue.id, next_day))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_delete_show_cascades_attendances() {
        let store = MemoryConcertStore::new();
        let (_, _, show) = seed_show(&store).await;
        let user = store
            .create_user(User::new("a@example.com", "alice", "hash"))
            .await
            .unwrap();
        let attendance = store
            .create_attendance(ShowAttendance::new(user.id, show.id))
            .await
            .unwrap();

        let removed = store.delete_show(show.id).await.unwrap();

        assert_eq!(removed, 1);
        assert!(store.get_attendance(attendance.id).await.unwrap().is_none());
        assert!(store.get_show(show.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_user_cascades_attendances() {
        let store = MemoryConcertStore::new();
        let (_, _, show) = seed_show(&store).await;
        let user = store
            .create_user(User::new("a@example.com", "alice", "hash"))
            .await
            .unwrap();
        store
            .create_attendance(ShowAttendance::new(user.id, show.id))
            .await
            .unwrap();

        assert_eq!(store.delete_user(user.id).await.unwrap(), 1);
        assert!(store.get_user(user.id).await.unwrap().is_none());
        assert!(store.find_attendance(user.id, show.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_attendance_unique_per_user_and_show() {
        let store = MemoryConcertStore::new();
        let (_, _, show) = seed_show(&store).await;
        let user = store
            .create_user(User::new("a@example.com", "alice", "hash"))
            .await
            .unwrap();

        store
            .create_attendance(ShowAttendance::new(user.id, show.id))
            .await
            .unwrap();
        assert!(matches!(
            store
                .create_attendance(ShowAttendance::new(user.id, show.id))
                .await,
            Err(ConcertStoreError::AlreadyExists { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_shows_filters_and_orders() {
        let store = MemoryConcertStore::new();
        let (band, venue, first) = seed_show(&store).await;
        let nyc = store
            .create_venue(Venue::new("Madison Square Garden", "New York", "NY"))
            .await
            .unwrap();
        let later = Utc.with_ymd_and_hms(2024, 12, 31, 20, 0, 0).unwrap();
        let second = store
            .create_show(Show::new(band.id, nyc.id, later))
            .await
            .unwrap();

        let all = store.list_shows(ShowFilter::new()).await.unwrap();
        assert_eq!(
            all.iter().map(|s| s.show.id).collect::<Vec<_>>(),
            vec![second.id, first.id]
        );

        let nyc_only = store
            .list_shows(ShowFilter::new().with_city(Some("new-york")))
            .await
            .unwrap();
        assert_eq!(nyc_only.len(), 1);
        assert_eq!(nyc_only[0].venue.id, nyc.id);

        let june = store
            .list_shows(
                ShowFilter::new()
                    .with_date_from(Some("2024-06-21"))
                    .with_date_to(Some("2024-06-21")),
            )
            .await
            .unwrap();
        assert_eq!(june.len(), 1);
        assert_eq!(june[0].venue.id, venue.id);

        let none = store
            .list_shows(ShowFilter::new().with_band(Some("goose")).with_state(Some("ca")))
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_get_venue_by_name_prefers_earliest() {
        let store = MemoryConcertStore::new();
        let first = store
            .create_venue(Venue::new("The Fillmore", "San Francisco", "CA"))
            .await
            .unwrap();
        let mut second = Venue::new("The Fillmore", "Denver", "CO");
        second.created_at = first.created_at + chrono::Duration::seconds(1);
        store.create_venue(second).await.unwrap();

        let resolved = store.get_venue_by_name("the fillmore").await.unwrap().unwrap();
        assert_eq!(resolved.id, first.id);
    }
}
