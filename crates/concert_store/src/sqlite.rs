//! SQLite concert store implementation.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use entities::{
    normalize::like_pattern, AttendanceDetail, Band, Show, ShowAttendance, ShowDetail, User,
    Venue,
};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    FromRow, Pool, QueryBuilder, Sqlite,
};
use uuid::Uuid;

use crate::{ConcertStore, ConcertStoreError, ConcertStoreResult, ShowFilter, VenueFilter};

/// Schema for a fresh database. Every statement is idempotent.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY NOT NULL,
    email TEXT NOT NULL UNIQUE,
    username TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    first_name TEXT NOT NULL DEFAULT '',
    last_name TEXT NOT NULL DEFAULT '',
    location TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS bands (
    id TEXT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL UNIQUE,
    genre TEXT NOT NULL DEFAULT '',
    description TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS venues (
    id TEXT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    city TEXT NOT NULL,
    state TEXT NOT NULL,
    country TEXT NOT NULL DEFAULT 'usa',
    address TEXT NOT NULL DEFAULT '',
    capacity INTEGER,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE (name, city, state)
);

CREATE TABLE IF NOT EXISTS shows (
    id TEXT PRIMARY KEY NOT NULL,
    band_id TEXT NOT NULL REFERENCES bands(id) ON DELETE RESTRICT,
    venue_id TEXT NOT NULL REFERENCES venues(id) ON DELETE RESTRICT,
    date TEXT NOT NULL,
    show_date TEXT NOT NULL,
    setlist_id TEXT,
    notes TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE (band_id, venue_id, show_date)
);

CREATE INDEX IF NOT EXISTS idx_shows_date ON shows(date);

CREATE TABLE IF NOT EXISTS show_attendances (
    id TEXT PRIMARY KEY NOT NULL,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    show_id TEXT NOT NULL REFERENCES shows(id) ON DELETE CASCADE,
    attended INTEGER NOT NULL DEFAULT 1,
    rating REAL,
    favorite_song TEXT NOT NULL DEFAULT '',
    notes TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE (user_id, show_id)
);

CREATE INDEX IF NOT EXISTS idx_show_attendances_show ON show_attendances(show_id);
"#;

const USER_COLUMNS: &str =
    "id, email, username, password_hash, first_name, last_name, location, created_at, updated_at";

const BAND_COLUMNS: &str = "id, name, genre, description, created_at, updated_at";

const VENUE_COLUMNS: &str =
    "id, name, city, state, country, address, capacity, created_at, updated_at";

const SHOW_COLUMNS: &str =
    "id, band_id, venue_id, date, setlist_id, notes, created_at, updated_at";

const ATTENDANCE_COLUMNS: &str =
    "id, user_id, show_id, attended, rating, favorite_song, notes, created_at, updated_at";

/// Joined columns for a show with its band and venue, aliased so they fit
/// [`ShowDetailRow`].
const SHOW_DETAIL_COLUMNS: &str = "\
    s.id AS show_id, s.band_id AS show_band_id, s.venue_id AS show_venue_id, \
    s.date AS show_date_time, s.setlist_id AS show_setlist_id, s.notes AS show_notes, \
    s.created_at AS show_created_at, s.updated_at AS show_updated_at, \
    b.id AS band_id, b.name AS band_name, b.genre AS band_genre, \
    b.description AS band_description, b.created_at AS band_created_at, \
    b.updated_at AS band_updated_at, \
    v.id AS venue_id, v.name AS venue_name, v.city AS venue_city, v.state AS venue_state, \
    v.country AS venue_country, v.address AS venue_address, v.capacity AS venue_capacity, \
    v.created_at AS venue_created_at, v.updated_at AS venue_updated_at";

const SHOW_JOINS: &str =
    "FROM shows s JOIN bands b ON b.id = s.band_id JOIN venues v ON v.id = s.venue_id";

const ATTENDANCE_DETAIL_COLUMNS: &str = "\
    a.id AS attendance_id, a.user_id AS attendance_user_id, \
    a.show_id AS attendance_show_id, a.attended AS attendance_attended, \
    a.rating AS attendance_rating, a.favorite_song AS attendance_favorite_song, \
    a.notes AS attendance_notes, a.created_at AS attendance_created_at, \
    a.updated_at AS attendance_updated_at";

// =============================================================================
// Column encoding
// =============================================================================

/// Timestamps are stored as fixed-width RFC 3339 UTC text so that text
/// ordering matches chronological ordering.
fn encode_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn encode_date(value: NaiveDate) -> String {
    value.format(entities::show_date::DATE_FORMAT).to_string()
}

fn decode_uuid(entity_type: &'static str, value: &str) -> ConcertStoreResult<Uuid> {
    Uuid::parse_str(value).map_err(|e| ConcertStoreError::corrupt(entity_type, e))
}

fn decode_timestamp(entity_type: &'static str, value: &str) -> ConcertStoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ConcertStoreError::corrupt(entity_type, e))
}

// =============================================================================
// Rows
// =============================================================================

#[derive(Debug, FromRow)]
struct UserRow {
    id: String,
    email: String,
    username: String,
    password_hash: String,
    first_name: String,
    last_name: String,
    location: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<UserRow> for User {
    type Error = ConcertStoreError;

    fn try_from(row: UserRow) -> ConcertStoreResult<Self> {
        Ok(User {
            id: decode_uuid("User", &row.id)?,
            email: row.email,
            username: row.username,
            password_hash: row.password_hash,
            first_name: row.first_name,
            last_name: row.last_name,
            location: row.location,
            created_at: decode_timestamp("User", &row.created_at)?,
            updated_at: decode_timestamp("User", &row.updated_at)?,
        })
    }
}

#[derive(Debug, FromRow)]
struct BandRow {
    id: String,
    name: String,
    genre: String,
    description: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<BandRow> for Band {
    type Error = ConcertStoreError;

    fn try_from(row: BandRow) -> ConcertStoreResult<Self> {
        Ok(Band {
            id: decode_uuid("Band", &row.id)?,
            name: row.name,
            genre: row.genre,
            description: row.description,
            created_at: decode_timestamp("Band", &row.created_at)?,
            updated_at: decode_timestamp("Band", &row.updated_at)?,
        })
    }
}

#[derive(Debug, FromRow)]
struct VenueRow {
    id: String,
    name: String,
    city: String,
    state: String,
    country: String,
    address: String,
    capacity: Option<i64>,
    created_at: String,
    updated_at: String,
}

impl TryFrom<VenueRow> for Venue {
    type Error = ConcertStoreError;

    fn try_from(row: VenueRow) -> ConcertStoreResult<Self> {
        let capacity = row
            .capacity
            .map(u32::try_from)
            .transpose()
            .map_err(|e| ConcertStoreError::corrupt("Venue", e))?;

        Ok(Venue {
            id: decode_uuid("Venue", &row.id)?,
            name: row.name,
            city: row.city,
            state: row.state,
            country: row.country,
            address: row.address,
            capacity,
            created_at: decode_timestamp("Venue", &row.created_at)?,
            updated_at: decode_timestamp("Venue", &row.updated_at)?,
        })
    }
}

#[derive(Debug, FromRow)]
struct ShowRow {
    id: String,
    band_id: String,
    venue_id: String,
    date: String,
    setlist_id: Option<String>,
    notes: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<ShowRow> for Show {
    type Error = ConcertStoreError;

    fn try_from(row: ShowRow) -> ConcertStoreResult<Self> {
        Ok(Show {
            id: decode_uuid("Show", &row.id)?,
            band_id: decode_uuid("Show", &row.band_id)?,
            venue_id: decode_uuid("Show", &row.venue_id)?,
            date: decode_timestamp("Show", &row.date)?,
            setlist_id: row.setlist_id,
            notes: row.notes,
            created_at: decode_timestamp("Show", &row.created_at)?,
            updated_at: decode_timestamp("Show", &row.updated_at)?,
        })
    }
}

#[derive(Debug, FromRow)]
struct ShowDetailRow {
    show_id: String,
    show_band_id: String,
    show_venue_id: String,
    show_date_time: String,
    show_setlist_id: Option<String>,
    show_notes: String,
    show_created_at: String,
    show_updated_at: String,
    band_id: String,
    band_name: String,
    band_genre: String,
    band_description: String,
    band_created_at: String,
    band_updated_at: String,
    venue_id: String,
    venue_name: String,
    venue_city: String,
    venue_state: String,
    venue_country: String,
    venue_address: String,
    venue_capacity: Option<i64>,
    venue_created_at: String,
    venue_updated_at: String,
}

impl TryFrom<ShowDetailRow> for ShowDetail {
    type Error = ConcertStoreError;

    fn try_from(row: ShowDetailRow) -> ConcertStoreResult<Self> {
        let show = ShowRow {
            id: row.show_id,
            band_id: row.show_band_id,
            venue_id: row.show_venue_id,
            date: row.show_date_time,
            setlist_id: row.show_setlist_id,
            notes: row.show_notes,
            created_at: row.show_created_at,
            updated_at: row.show_updated_at,
        };
        let band = BandRow {
            id: row.band_id,
            name: row.band_name,
            genre: row.band_genre,
            description: row.band_description,
            created_at: row.band_created_at,
            updated_at: row.band_updated_at,
        };
        let venue = VenueRow {
            id: row.venue_id,
            name: row.venue_name,
            city: row.venue_city,
            state: row.venue_state,
            country: row.venue_country,
            address: row.venue_address,
            capacity: row.venue_capacity,
            created_at: row.venue_created_at,
            updated_at: row.venue_updated_at,
        };

        Ok(ShowDetail {
            show: show.try_into()?,
            band: band.try_into()?,
            venue: venue.try_into()?,
        })
    }
}

#[derive(Debug, FromRow)]
struct AttendanceRow {
    id: String,
    user_id: String,
    show_id: String,
    attended: bool,
    rating: Option<f64>,
    favorite_song: String,
    notes: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<AttendanceRow> for ShowAttendance {
    type Error = ConcertStoreError;

    fn try_from(row: AttendanceRow) -> ConcertStoreResult<Self> {
        Ok(ShowAttendance {
            id: decode_uuid("ShowAttendance", &row.id)?,
            user_id: decode_uuid("ShowAttendance", &row.user_id)?,
            show_id: decode_uuid("ShowAttendance", &row.show_id)?,
            attended: row.attended,
            rating: row.rating,
            favorite_song: row.favorite_song,
            notes: row.notes,
            created_at: decode_timestamp("ShowAttendance", &row.created_at)?,
            updated_at: decode_timestamp("ShowAttendance", &row.updated_at)?,
        })
    }
}

#[derive(Debug, FromRow)]
struct AttendanceDetailRow {
    attendance_id: String,
    attendance_user_id: String,
    attendance_show_id: String,
    attendance_attended: bool,
    attendance_rating: Option<f64>,
    attendance_favorite_song: String,
    attendance_notes: String,
    attendance_created_at: String,
    attendance_updated_at: String,
    #[sqlx(flatten)]
    show: ShowDetailRow,
}

impl TryFrom<AttendanceDetailRow> for AttendanceDetail {
    type Error = ConcertStoreError;

    fn try_from(row: AttendanceDetailRow) -> ConcertStoreResult<Self> {
        let attendance = AttendanceRow {
            id: row.attendance_id,
            user_id: row.attendance_user_id,
            show_id: row.attendance_show_id,
            attended: row.attendance_attended,
            rating: row.attendance_rating,
            favorite_song: row.attendance_favorite_song,
            notes: row.attendance_notes,
            created_at: row.attendance_created_at,
            updated_at: row.attendance_updated_at,
        };

        Ok(AttendanceDetail {
            attendance: attendance.try_into()?,
            show: row.show.try_into()?,
        })
    }
}

fn convert_all<R, T>(rows: Vec<R>) -> ConcertStoreResult<Vec<T>>
where
    T: TryFrom<R, Error = ConcertStoreError>,
{
    rows.into_iter().map(T::try_from).collect()
}

fn push_like(builder: &mut QueryBuilder<'_, Sqlite>, column: &str, needle: &Option<String>) {
    if let Some(needle) = needle {
        builder
            .push(format!(" AND LOWER({column}) LIKE "))
            .push_bind(like_pattern(needle))
            .push(" ESCAPE '\\'");
    }
}

// =============================================================================
// Store
// =============================================================================

/// SQLite-backed concert store.
#[derive(Debug, Clone)]
pub struct SqliteConcertStore {
    pool: Pool<Sqlite>,
}

impl SqliteConcertStore {
    /// Connects to a SQLite database, creating the file if needed.
    ///
    /// Call [`SqliteConcertStore::init`] before first use.
    pub async fn connect(database_url: &str) -> ConcertStoreResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Creates a store on a private in-memory database with its schema
    /// applied.
    pub async fn in_memory() -> ConcertStoreResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        // Each connection to :memory: is its own database, so keep exactly one.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.init().await?;
        Ok(store)
    }

    /// Creates tables and indexes.
    pub async fn init(&self) -> ConcertStoreResult<()> {
        sqlx::raw_sql(SCHEMA_SQL).execute(&self.pool).await?;
        tracing::debug!("Concert store schema initialized");
        Ok(())
    }

    async fn fetch_show_detail(&self, id: Uuid) -> ConcertStoreResult<Option<ShowDetail>> {
        let sql = format!("SELECT {SHOW_DETAIL_COLUMNS} {SHOW_JOINS} WHERE s.id = ?");
        sqlx::query_as::<_, ShowDetailRow>(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .map(ShowDetail::try_from)
            .transpose()
    }
}

#[async_trait]
impl ConcertStore for SqliteConcertStore {
    // =========================================================================
    // User operations
    // =========================================================================

    async fn create_user(&self, user: User) -> ConcertStoreResult<User> {
        sqlx::query(&format!(
            "INSERT INTO users ({USER_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(user.id.to_string())
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.location)
        .bind(encode_timestamp(user.created_at))
        .bind(encode_timestamp(user.updated_at))
        .execute(&self.pool)
        .await
        .map_err(|e| ConcertStoreError::from_write("User", &user.email, e))?;

        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> ConcertStoreResult<Option<User>> {
        sqlx::query_as::<_, UserRow>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn get_user_by_email(&self, email: &str) -> ConcertStoreResult<Option<User>> {
        sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?
        .map(User::try_from)
        .transpose()
    }

    async fn find_user_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> ConcertStoreResult<Option<User>> {
        sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ? OR username = ? LIMIT 1"
        ))
        .bind(email)
        .bind(username)
        .fetch_optional(&self.pool)
        .await?
        .map(User::try_from)
        .transpose()
    }

    async fn update_user(&self, user: User) -> ConcertStoreResult<User> {
        let result = sqlx::query(
            "UPDATE users SET email = ?, username = ?, password_hash = ?, first_name = ?, \
             last_name = ?, location = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.location)
        .bind(encode_timestamp(user.updated_at))
        .bind(user.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| ConcertStoreError::from_write("User", &user.email, e))?;

        if result.rows_affected() == 0 {
            return Err(ConcertStoreError::not_found("User", user.id));
        }
        Ok(user)
    }

    async fn delete_user(&self, id: Uuid) -> ConcertStoreResult<u64> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM show_attendances WHERE user_id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let deleted = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            tx.rollback().await?;
            return Err(ConcertStoreError::not_found("User", id));
        }

        tx.commit().await?;
        Ok(removed)
    }

    // =========================================================================
    // Band operations
    // =========================================================================

    async fn create_band(&self, band: Band) -> ConcertStoreResult<Band> {
        sqlx::query(&format!(
            "INSERT INTO bands ({BAND_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?)"
        ))
        .bind(band.id.to_string())
        .bind(&band.name)
        .bind(&band.genre)
        .bind(&band.description)
        .bind(encode_timestamp(band.created_at))
        .bind(encode_timestamp(band.updated_at))
        .execute(&self.pool)
        .await
        .map_err(|e| ConcertStoreError::from_write("Band", &band.name, e))?;

        Ok(band)
    }

    async fn get_band(&self, id: Uuid) -> ConcertStoreResult<Option<Band>> {
        sqlx::query_as::<_, BandRow>(&format!("SELECT {BAND_COLUMNS} FROM bands WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .map(Band::try_from)
            .transpose()
    }

    async fn get_band_by_name(&self, name: &str) -> ConcertStoreResult<Option<Band>> {
        sqlx::query_as::<_, BandRow>(&format!("SELECT {BAND_COLUMNS} FROM bands WHERE name = ?"))
            .bind(name)
            .fetch_optional(&self.pool)
            .await?
            .map(Band::try_from)
            .transpose()
    }

    async fn list_bands(&self) -> ConcertStoreResult<Vec<Band>> {
        let rows = sqlx::query_as::<_, BandRow>(&format!(
            "SELECT {BAND_COLUMNS} FROM bands ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;

        convert_all(rows)
    }

    async fn update_band(&self, band: Band) -> ConcertStoreResult<Band> {
        let result = sqlx::query(
            "UPDATE bands SET name = ?, genre = ?, description = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&band.name)
        .bind(&band.genre)
        .bind(&band.description)
        .bind(encode_timestamp(band.updated_at))
        .bind(band.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| ConcertStoreError::from_write("Band", &band.name, e))?;

        if result.rows_affected() == 0 {
            return Err(ConcertStoreError::not_found("Band", band.id));
        }
        Ok(band)
    }

    async fn delete_band(&self, id: Uuid) -> ConcertStoreResult<()> {
        let result = sqlx::query("DELETE FROM bands WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| ConcertStoreError::from_write("Band", id, e))?;

        if result.rows_affected() == 0 {
            return Err(ConcertStoreError::not_found("Band", id));
        }
        Ok(())
    }

    async fn count_shows_for_band(&self, band_id: Uuid) -> ConcertStoreResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shows WHERE band_id = ?")
            .bind(band_id.to_string())
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    // =========================================================================
    // Venue operations
    // =========================================================================

    async fn create_venue(&self, venue: Venue) -> ConcertStoreResult<Venue> {
        sqlx::query(&format!(
            "INSERT INTO venues ({VENUE_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(venue.id.to_string())
        .bind(&venue.name)
        .bind(&venue.city)
        .bind(&venue.state)
        .bind(&venue.country)
        .bind(&venue.address)
        .bind(venue.capacity.map(i64::from))
        .bind(encode_timestamp(venue.created_at))
        .bind(encode_timestamp(venue.updated_at))
        .execute(&self.pool)
        .await
        .map_err(|e| ConcertStoreError::from_write("Venue", &venue.name, e))?;

        Ok(venue)
    }

    async fn get_venue(&self, id: Uuid) -> ConcertStoreResult<Option<Venue>> {
        sqlx::query_as::<_, VenueRow>(&format!(
            "SELECT {VENUE_COLUMNS} FROM venues WHERE id = ?"
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?
        .map(Venue::try_from)
        .transpose()
    }

    async fn get_venue_by_name(&self, name: &str) -> ConcertStoreResult<Option<Venue>> {
        sqlx::query_as::<_, VenueRow>(&format!(
            "SELECT {VENUE_COLUMNS} FROM venues WHERE name = ? \
             ORDER BY created_at ASC, id ASC LIMIT 1"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?
        .map(Venue::try_from)
        .transpose()
    }

    async fn find_venue(
        &self,
        name: &str,
        city: &str,
        state: &str,
    ) -> ConcertStoreResult<Option<Venue>> {
        sqlx::query_as::<_, VenueRow>(&format!(
            "SELECT {VENUE_COLUMNS} FROM venues WHERE name = ? AND city = ? AND state = ?"
        ))
        .bind(name)
        .bind(city)
        .bind(state)
        .fetch_optional(&self.pool)
        .await?
        .map(Venue::try_from)
        .transpose()
    }

    async fn list_venues(&self, filter: VenueFilter) -> ConcertStoreResult<Vec<Venue>> {
        let mut builder =
            QueryBuilder::<Sqlite>::new(format!("SELECT {VENUE_COLUMNS} FROM venues WHERE 1 = 1"));
        push_like(&mut builder, "name", &filter.name);
        push_like(&mut builder, "city", &filter.city);
        push_like(&mut builder, "state", &filter.state);
        push_like(&mut builder, "country", &filter.country);
        builder.push(" ORDER BY name, city");

        let rows = builder
            .build_query_as::<VenueRow>()
            .fetch_all(&self.pool)
            .await?;

        convert_all(rows)
    }

    async fn update_venue(&self, venue: Venue) -> ConcertStoreResult<Venue> {
        let result = sqlx::query(
            "UPDATE venues SET name = ?, city = ?, state = ?, country = ?, address = ?, \
             capacity = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&venue.name)
        .bind(&venue.city)
        .bind(&venue.state)
        .bind(&venue.country)
        .bind(&venue.address)
        .bind(venue.capacity.map(i64::from))
        .bind(encode_timestamp(venue.updated_at))
        .bind(venue.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| ConcertStoreError::from_write("Venue", &venue.name, e))?;

        if result.rows_affected() == 0 {
            return Err(ConcertStoreError::not_found("Venue", venue.id));
        }
        Ok(venue)
    }

    async fn delete_venue(&self, id: Uuid) -> ConcertStoreResult<()> {
        let result = sqlx::query("DELETE FROM venues WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| ConcertStoreError::from_write("Venue", id, e))?;

        if result.rows_affected() == 0 {
            return Err(ConcertStoreError::not_found("Venue", id));
        }
        Ok(())
    }

    async fn count_shows_for_venue(&self, venue_id: Uuid) -> ConcertStoreResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shows WHERE venue_id = ?")
            .bind(venue_id.to_string())
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    // =========================================================================
    // Show operations
    // =========================================================================

    async fn create_show(&self, show: Show) -> ConcertStoreResult<Show> {
        sqlx::query(&format!(
            "INSERT INTO shows ({SHOW_COLUMNS}, show_date) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(show.id.to_string())
        .bind(show.band_id.to_string())
        .bind(show.venue_id.to_string())
        .bind(encode_timestamp(show.date))
        .bind(&show.setlist_id)
        .bind(&show.notes)
        .bind(encode_timestamp(show.created_at))
        .bind(encode_timestamp(show.updated_at))
        .bind(encode_date(show.show_date()))
        .execute(&self.pool)
        .await
        .map_err(|e| ConcertStoreError::from_write("Show", show.id, e))?;

        Ok(show)
    }

    async fn get_show(&self, id: Uuid) -> ConcertStoreResult<Option<Show>> {
        sqlx::query_as::<_, ShowRow>(&format!("SELECT {SHOW_COLUMNS} FROM shows WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .map(Show::try_from)
            .transpose()
    }

    async fn get_show_detail(&self, id: Uuid) -> ConcertStoreResult<Option<ShowDetail>> {
        self.fetch_show_detail(id).await
    }

    async fn find_show_on_date(
        &self,
        band_id: Uuid,
        venue_id: Uuid,
        date: NaiveDate,
    ) -> ConcertStoreResult<Option<Show>> {
        sqlx::query_as::<_, ShowRow>(&format!(
            "SELECT {SHOW_COLUMNS} FROM shows \
             WHERE band_id = ? AND venue_id = ? AND show_date = ?"
        ))
        .bind(band_id.to_string())
        .bind(venue_id.to_string())
        .bind(encode_date(date))
        .fetch_optional(&self.pool)
        .await?
        .map(Show::try_from)
        .transpose()
    }

    async fn list_shows(&self, filter: ShowFilter) -> ConcertStoreResult<Vec<ShowDetail>> {
        let mut builder = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {SHOW_DETAIL_COLUMNS} {SHOW_JOINS} WHERE 1 = 1"
        ));
        push_like(&mut builder, "b.name", &filter.band);
        push_like(&mut builder, "v.name", &filter.venue);
        push_like(&mut builder, "v.city", &filter.city);
        push_like(&mut builder, "v.state", &filter.state);
        if let Some(from) = filter.date_from {
            builder.push(" AND s.show_date >= ").push_bind(encode_date(from));
        }
        if let Some(to) = filter.date_to {
            builder.push(" AND s.show_date <= ").push_bind(encode_date(to));
        }
        builder.push(" ORDER BY s.date DESC, s.id DESC");

        let rows = builder
            .build_query_as::<ShowDetailRow>()
            .fetch_all(&self.pool)
            .await?;

        convert_all(rows)
    }

    async fn update_show(&self, show: Show) -> ConcertStoreResult<Show> {
        let result = sqlx::query(
            "UPDATE shows SET band_id = ?, venue_id = ?, date = ?, show_date = ?, \
             setlist_id = ?, notes = ?, updated_at = ? WHERE id = ?",
        )
        .bind(show.band_id.to_string())
        .bind(show.venue_id.to_string())
        .bind(encode_timestamp(show.date))
        .bind(encode_date(show.show_date()))
        .bind(&show.setlist_id)
        .bind(&show.notes)
        .bind(encode_timestamp(show.updated_at))
        .bind(show.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| ConcertStoreError::from_write("Show", show.id, e))?;

        if result.rows_affected() == 0 {
            return Err(ConcertStoreError::not_found("Show", show.id));
        }
        Ok(show)
    }

    async fn delete_show(&self, id: Uuid) -> ConcertStoreResult<u64> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM show_attendances WHERE show_id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let deleted = sqlx::query("DELETE FROM shows WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            tx.rollback().await?;
            return Err(ConcertStoreError::not_found("Show", id));
        }

        tx.commit().await?;
        tracing::debug!(show_id = %id, attendances = removed, "Deleted show");
        Ok(removed)
    }

    // =========================================================================
    // Attendance operations
    // =========================================================================

    async fn create_attendance(
        &self,
        attendance: ShowAttendance,
    ) -> ConcertStoreResult<ShowAttendance> {
        sqlx::query(&format!(
            "INSERT INTO show_attendances ({ATTENDANCE_COLUMNS}) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(attendance.id.to_string())
        .bind(attendance.user_id.to_string())
        .bind(attendance.show_id.to_string())
        .bind(attendance.attended)
        .bind(attendance.rating)
        .bind(&attendance.favorite_song)
        .bind(&attendance.notes)
        .bind(encode_timestamp(attendance.created_at))
        .bind(encode_timestamp(attendance.updated_at))
        .execute(&self.pool)
        .await
        .map_err(|e| ConcertStoreError::from_write("ShowAttendance", attendance.show_id, e))?;

        Ok(attendance)
    }

    async fn get_attendance(&self, id: Uuid) -> ConcertStoreResult<Option<ShowAttendance>> {
        sqlx::query_as::<_, AttendanceRow>(&format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM show_attendances WHERE id = ?"
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?
        .map(ShowAttendance::try_from)
        .transpose()
    }

    async fn find_attendance(
        &self,
        user_id: Uuid,
        show_id: Uuid,
    ) -> ConcertStoreResult<Option<ShowAttendance>> {
        sqlx::query_as::<_, AttendanceRow>(&format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM show_attendances WHERE user_id = ? AND show_id = ?"
        ))
        .bind(user_id.to_string())
        .bind(show_id.to_string())
        .fetch_optional(&self.pool)
        .await?
        .map(ShowAttendance::try_from)
        .transpose()
    }

    async fn get_attendance_detail(
        &self,
        id: Uuid,
    ) -> ConcertStoreResult<Option<AttendanceDetail>> {
        let sql = format!(
            "SELECT {ATTENDANCE_DETAIL_COLUMNS}, {SHOW_DETAIL_COLUMNS} \
             FROM show_attendances a \
             JOIN shows s ON s.id = a.show_id \
             JOIN bands b ON b.id = s.band_id \
             JOIN venues v ON v.id = s.venue_id \
             WHERE a.id = ?"
        );
        sqlx::query_as::<_, AttendanceDetailRow>(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .map(AttendanceDetail::try_from)
            .transpose()
    }

    async fn list_attendances_for_user(
        &self,
        user_id: Uuid,
    ) -> ConcertStoreResult<Vec<AttendanceDetail>> {
        let sql = format!(
            "SELECT {ATTENDANCE_DETAIL_COLUMNS}, {SHOW_DETAIL_COLUMNS} \
             FROM show_attendances a \
             JOIN shows s ON s.id = a.show_id \
             JOIN bands b ON b.id = s.band_id \
             JOIN venues v ON v.id = s.venue_id \
             WHERE a.user_id = ? \
             ORDER BY s.date DESC, a.id DESC"
        );
        let rows = sqlx::query_as::<_, AttendanceDetailRow>(&sql)
            .bind(user_id.to_string())
            .fetch_all(&self.pool)
            .await?;

        convert_all(rows)
    }

    async fn update_attendance(
        &self,
        attendance: ShowAttendance,
    ) -> ConcertStoreResult<ShowAttendance> {
        let result = sqlx::query(
            "UPDATE show_attendances SET attended = ?, rating = ?, favorite_song = ?, \
             notes = ?, updated_at = ? WHERE id = ?",
        )
        .bind(attendance.attended)
        .bind(attendance.rating)
        .bind(&attendance.favorite_song)
        .bind(&attendance.notes)
        .bind(encode_timestamp(attendance.updated_at))
        .bind(attendance.id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ConcertStoreError::not_found("ShowAttendance", attendance.id));
        }
        Ok(attendance)
    }

    async fn delete_attendance(&self, id: Uuid) -> ConcertStoreResult<()> {
        let result = sqlx::query("DELETE FROM show_attendances WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ConcertStoreError::not_found("ShowAttendance", id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    async fn seed(store: &SqliteConcertStore) -> (User, Band, Venue, Show) {
        let user = store
            .create_user(User::new("fan@example.com", "fan", "hash"))
            .await
            .unwrap();
        let band = store.create_band(Band::new("Goose")).await.unwrap();
        let venue = store
            .create_venue(
                Venue::new("Red Rocks", "Morrison", "CO").with_capacity(Some(9525)),
            )
            .await
            .unwrap();
        let date = Utc.with_ymd_and_hms(2024, 6, 21, 19, 0, 0).unwrap();
        let show = store
            .create_show(Show::new(band.id, venue.id, date).with_notes("night one"))
            .await
            .unwrap();
        (user, band, venue, show)
    }

    #[tokio::test]
    async fn test_user_round_trip_and_uniqueness() {
        let store = SqliteConcertStore::in_memory().await.unwrap();
        let user = User::new("a@example.com", "alice", "hash").with_profile("Alice", "Smith", "");
        store.create_user(user.clone()).await.unwrap();

        let fetched = store.get_user(user.id).await.unwrap().unwrap();
        assert_eq!(fetched.email, "a@example.com");
        assert_eq!(fetched.first_name, "Alice");
        assert_eq!(fetched.password_hash, "hash");

        let dup = store
            .create_user(User::new("a@example.com", "bob", "hash"))
            .await;
        assert!(matches!(dup, Err(ConcertStoreError::AlreadyExists { .. })));

        let found = store
            .find_user_by_email_or_username("nobody@example.com", "alice")
            .await
            .unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));
    }

    #[tokio::test]
    async fn test_show_detail_joins_band_and_venue() {
        let store = SqliteConcertStore::in_memory().await.unwrap();
        let (_, band, venue, show) = seed(&store).await;

        let detail = store.get_show_detail(show.id).await.unwrap().unwrap();

        assert_eq!(detail.show.id, show.id);
        assert_eq!(detail.show.date, show.date);
        assert_eq!(detail.show.notes, "night one");
        assert_eq!(detail.band.id, band.id);
        assert_eq!(detail.venue.id, venue.id);
        assert_eq!(detail.venue.capacity, Some(9525));
    }

    #[tokio::test]
    async fn test_show_dates_stay_readable_at_year_bounds() {
        let store = SqliteConcertStore::in_memory().await.unwrap();
        let (_, band, venue, _) = seed(&store).await;

        assert!(entities::parse_show_date("+12345-01-01").is_err());

        let latest = entities::parse_show_date("9999-12-31 23:59").unwrap();
        let show = store
            .create_show(Show::new(band.id, venue.id, latest))
            .await
            .unwrap();

        let listed = store.list_shows(ShowFilter::new()).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].show.id, show.id);
        assert_eq!(listed[0].show.date, latest);
    }

    #[tokio::test]
    async fn test_show_unique_per_calendar_date() {
        let store = SqliteConcertStore::in_memory().await.unwrap();
        let (_, band, venue, _) = seed(&store).await;

        let same_day = Utc.with_ymd_and_hms(2024, 6, 21, 23, 0, 0).unwrap();
        let result = store.create_show(Show::new(band.id, venue.id, same_day)).await;
        assert!(matches!(result, Err(ConcertStoreError::AlreadyExists { .. })));

        let found = store
            .find_show_on_date(band.id, venue.id, NaiveDate::from_ymd_opt(2024, 6, 21).unwrap())
            .await
            .unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn test_delete_referenced_band_is_rejected() {
        let store = SqliteConcertStore::in_memory().await.unwrap();
        let (_, band, _, _) = seed(&store).await;

        let result = store.delete_band(band.id).await;
        assert!(matches!(result, Err(ConcertStoreError::ForeignKeyViolation(_))));
        assert!(store.get_band(band.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_show_cascades_attendances() {
        let store = SqliteConcertStore::in_memory().await.unwrap();
        let (user, _, _, show) = seed(&store).await;
        let attendance = store
            .create_attendance(ShowAttendance::new(user.id, show.id))
            .await
            .unwrap();

        assert_eq!(store.delete_show(show.id).await.unwrap(), 1);
        assert!(store.get_attendance(attendance.id).await.unwrap().is_none());
        assert!(matches!(
            store.delete_show(show.id).await,
            Err(ConcertStoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_user_cascades_attendances() {
        let store = SqliteConcertStore::in_memory().await.unwrap();
        let (user, _, _, show) = seed(&store).await;
        store
            .create_attendance(ShowAttendance::new(user.id, show.id))
            .await
            .unwrap();

        assert_eq!(store.delete_user(user.id).await.unwrap(), 1);
        assert!(store.get_user(user.id).await.unwrap().is_none());
        assert!(store.get_show(show.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_list_shows_filters_and_orders() {
        let store = SqliteConcertStore::in_memory().await.unwrap();
        let (_, band, _, first) = seed(&store).await;
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
        assert_eq!(nyc_only[0].show.id, second.id);

        let december = store
            .list_shows(ShowFilter::new().with_date_from(Some("2024-12-01")))
            .await
            .unwrap();
        assert_eq!(december.len(), 1);

        let wildcard = store
            .list_shows(ShowFilter::new().with_band(Some("%")))
            .await
            .unwrap();
        assert!(wildcard.is_empty());
    }

    #[tokio::test]
    async fn test_list_venues_filter() {
        let store = SqliteConcertStore::in_memory().await.unwrap();
        store
            .create_venue(Venue::new("Brooklyn Steel", "Brooklyn", "NY"))
            .await
            .unwrap();
        store
            .create_venue(Venue::new("The Fillmore", "San Francisco", "CA"))
            .await
            .unwrap();

        let ny = store
            .list_venues(VenueFilter::new().with_state(Some("ny")))
            .await
            .unwrap();
        assert_eq!(ny.len(), 1);
        assert_eq!(ny[0].name, "brooklyn steel");

        let all = store.list_venues(VenueFilter::new()).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_attendance_detail() {
        let store = SqliteConcertStore::in_memory().await.unwrap();
        let (user, band, _, show) = seed(&store).await;
        let mut attendance = ShowAttendance::new(user.id, show.id);
        attendance.rating = Some(4.5);
        attendance.favorite_song = "Arcadia".to_string();
        store.create_attendance(attendance.clone()).await.unwrap();

        let detail = store
            .get_attendance_detail(attendance.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(detail.attendance.rating, Some(4.5));
        assert_eq!(detail.show.band.id, band.id);

        let listed = store.list_attendances_for_user(user.id).await.unwrap();
        assert_eq!(listed.len(), 1);

        let dup = store
            .create_attendance(ShowAttendance::new(user.id, show.id))
            .await;
        assert!(matches!(dup, Err(ConcertStoreError::AlreadyExists { .. })));
    }
}
