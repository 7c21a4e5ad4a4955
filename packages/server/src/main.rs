use std::net::SocketAddr;

use tracing::info;
use tracing_subscriber::EnvFilter;

use server::config::AppConfig;
use server::state::AppState;
use server::{build_router, database, seed, storage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load()?;

    let db = database::init_db(&config.database).await?;
    if seed::ensure_bootstrap_admin(&db, &config.bootstrap).await? {
        info!("Log in with the bootstrap admin and remove its password from configuration");
    }

    let blob_store = storage::build_blob_store(&config.storage, &db);
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    let state = AppState {
        db,
        config,
        blob_store,
    };
    let app = build_router(state);

    info!("Server running at http://{}", addr);
    info!("API docs at http://{}/scalar", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
