//! Application state.

use std::sync::Arc;

use auth::JwtManager;
use concert_store::ConcertStore;

use crate::config::Config;

/// Shared application state.
pub struct AppState<S: ConcertStore> {
    /// Server configuration.
    pub config: Config,
    /// Concert store.
    pub store: S,
    /// Session token issuer and validator.
    pub jwt_manager: JwtManager,
}

impl<S: ConcertStore> AppState<S> {
    /// Creates new application state.
    pub fn new(config: Config, store: S, jwt_manager: JwtManager) -> Self {
        Self {
            config,
            store,
            jwt_manager,
        }
    }
}

/// Type alias for shared state.
pub type SharedState<S> = Arc<AppState<S>>;

/// Creates shared state from config and store.
pub fn create_shared_state<S: ConcertStore>(
    config: Config,
    store: S,
    jwt_manager: JwtManager,
) -> SharedState<S> {
    Arc::new(AppState::new(config, store, jwt_manager))
}
