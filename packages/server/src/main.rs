use std::net::SocketAddr;

use anyhow::Context;
use tracing::info;

use server::config::AppConfig;
use server::database::{ensure_usage_triggers, init_db};
use server::seed::seed_storage_quotas;
use server::state::{AppState, build_object_store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let config = AppConfig::load().context("Failed to load config")?;

    let db = init_db(&config.database.url)
        .await
        .context("Failed to connect to database")?;
    info!("Database connected and schema synced");

    ensure_usage_triggers(&db).await?;
    seed_storage_quotas(&db).await?;

    let store = build_object_store(&config).context("Failed to initialize object store")?;
    info!(
        bucket = store.bucket(),
        region = store.region(),
        "Object store ready"
    );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let state = AppState { db, store, config };
    let app = server::build_router(state);

    info!("Server running at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
