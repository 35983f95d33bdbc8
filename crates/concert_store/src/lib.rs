//! Storage for JamTracker.
//!
//! This crate provides the [`ConcertStore`] abstraction over users, bands,
//! venues, shows and attendance records, with an in-memory implementation
//! for tests and a SQLite implementation for deployments. Both enforce the
//! same uniqueness rules and delete dependent attendance rows atomically
//! with their parent.

mod error;
mod filter;
mod memory;
mod sqlite;
mod traits;

pub use error::*;
pub use filter::*;
pub use memory::*;
pub use sqlite::*;
pub use traits::*;
