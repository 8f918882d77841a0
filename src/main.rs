//! stream-ideas server entry point.
//!
//! Starts the Axum HTTP server with REST and SSE endpoints.

use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use stream_ideas::api;
use stream_ideas::app_state::AppState;
use stream_ideas::config::{AppConfig, StoreBackend};
use stream_ideas::persistence::Store;
use stream_ideas::persistence::memory::MemoryStore;
use stream_ideas::persistence::postgres::PostgresStore;
use stream_ideas::persistence::unavailable::UnavailableStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration (also reads .env, so RUST_LOG may come from there)
    let config = AppConfig::from_env()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    tracing::info!(addr = %config.listen_addr, backend = ?config.store_backend, "starting stream-ideas");

    // Build persistence layer
    let store = build_store(&config).await?;

    // Build application state
    let listen_addr = config.listen_addr;
    let app_state = AppState::new(config, store)
        .map_err(|err| anyhow::anyhow!("invalid SESSION_SECRET: {err}"))?;
    if app_state.sessions.is_none() {
        tracing::warn!("SESSION_SECRET not set; every caller is anonymous");
    }

    // Build router
    let app = api::build_router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    tracing::info!(addr = %listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

async fn build_store(config: &AppConfig) -> anyhow::Result<Arc<dyn Store>> {
    match (config.store_backend, config.database_url.as_deref()) {
        (StoreBackend::Memory, _) => {
            tracing::info!("using in-memory store; data is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        (StoreBackend::Postgres, Some(url)) => {
            let store = PostgresStore::connect_lazy(config, url)?;
            if config.run_migrations {
                store.run_migrations().await?;
                tracing::info!("database migrations applied");
            }
            Ok(Arc::new(store))
        }
        (StoreBackend::Postgres, None) => {
            tracing::warn!("DATABASE_URL not configured; running with the store disabled");
            Ok(Arc::new(UnavailableStore))
        }
    }
}
