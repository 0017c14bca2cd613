use ledger_sync_service::{config::Config, db, discovery, state::AppState};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ledger-sync-service");

    let config = Config::from_env();

    let db_pool = db::connection::establish_connection(&config.database_url).await?;
    db::migration::run_migrations(&db_pool).await?;
    info!("Database connection established");

    let state = Arc::new(AppState { config, db_pool });

    let shutdown = CancellationToken::new();
    let discovery_state = state.clone();
    let discovery_shutdown = shutdown.clone();
    let discovery_handle = tokio::spawn(async move {
        discovery::start_discovery(discovery_state, discovery_shutdown).await;
    });
    info!("Discovery scheduler started");

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested");
    shutdown.cancel();
    let _ = discovery_handle.await;

    Ok(())
}
