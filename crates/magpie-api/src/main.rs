//! magpie-api - HTTP API server for magpie

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use magpie_api::{build_router, AppState};
use magpie_core::defaults::SERVER_PORT;
use magpie_db::Database;
use magpie_fetch::{MirrorClient, PlatformClient};
use magpie_sync::SyncConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "magpie=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:magpie.db".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(SERVER_PORT);

    let db = Database::connect(&database_url).await?;
    db.migrate().await?;
    info!(database_url = %database_url, "Database ready");

    let state = AppState::new(
        Arc::new(db),
        Arc::new(MirrorClient::from_env()),
        Arc::new(PlatformClient::from_env()),
        SyncConfig::from_env(),
    );
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "magpie-api listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown signal received");
}
