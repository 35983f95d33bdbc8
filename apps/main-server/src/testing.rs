//! Shared fixtures for unit tests.

use std::sync::Arc;

use concert_store::MemoryConcertStore;

use crate::config::Config;
use crate::create_state;
use crate::state::AppState;

pub(crate) const TEST_JWT_SECRET: &str = "test-secret-for-unit-tests";

/// Creates application state backed by an empty in-memory store.
pub(crate) fn test_state() -> Arc<AppState<MemoryConcertStore>> {
    create_state(Config::new(TEST_JWT_SECRET), MemoryConcertStore::new())
}
