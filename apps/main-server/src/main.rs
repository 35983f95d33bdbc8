//! JamTracker Server binary.

use std::net::SocketAddr;

use concert_store::SqliteConcertStore;
use jamtracker_server::{config::Config, create_app, create_state, init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env if present
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    init_tracing(&config.log_level);

    tracing::info!(
        environment = %config.environment,
        database_url = %config.database_url,
        "Starting JamTracker server"
    );

    let store = SqliteConcertStore::connect(&config.database_url).await?;
    store.init().await?;

    let state = create_state(config.clone(), store);
    let app = create_app(state);

    let addr: SocketAddr = config.server_addr().parse()?;

    tracing::info!(addr = %addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
