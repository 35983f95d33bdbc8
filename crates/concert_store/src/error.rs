//! Concert store error types.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum ConcertStoreError {
    /// Entity not found.
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// A uniqueness constraint rejected the write.
    #[error("{entity_type} already exists: {id}")]
    AlreadyExists {
        entity_type: &'static str,
        id: String,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Foreign key constraint violation.
    #[error("Foreign key constraint violation: {0}")]
    ForeignKeyViolation(String),

    /// A stored row could not be converted back into an entity.
    #[error("Corrupt {entity_type} row: {reason}")]
    CorruptRow {
        entity_type: &'static str,
        reason: String,
    },
}

impl ConcertStoreError {
    /// Creates a not found error.
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }

    /// Creates an already exists error.
    pub fn already_exists(entity_type: &'static str, id: impl ToString) -> Self {
        Self::AlreadyExists {
            entity_type,
            id: id.to_string(),
        }
    }

    /// Creates a corrupt row error.
    pub fn corrupt(entity_type: &'static str, reason: impl ToString) -> Self {
        Self::CorruptRow {
            entity_type,
            reason: reason.to_string(),
        }
    }

    /// Maps a write failure, turning constraint violations into their
    /// dedicated variants.
    pub fn from_write(entity_type: &'static str, id: impl ToString, err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return Self::already_exists(entity_type, id);
            }
            if db_err.is_foreign_key_violation() {
                return Self::ForeignKeyViolation(format!("{entity_type} {}", id.to_string()));
            }
        }
        Self::Database(err)
    }
}

/// Result type for store operations.
pub type ConcertStoreResult<T> = Result<T, ConcertStoreError>;
