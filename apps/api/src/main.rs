mod config;
mod db;
mod document;
mod errors;
mod export;
mod identity;
mod models;
mod render;
mod routes;
mod session;
mod state;
mod store;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::export::ExportPipeline;
use crate::identity::{IdentityGateway, IdentityToolkitClient};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{DocumentStore, MemoryDocumentStore, PgDocumentStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Vitae API v{}", env!("CARGO_PKG_VERSION"));

    // Document store: Postgres when configured, memory otherwise
    let store: Arc<dyn DocumentStore> = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url).await?;
            info!("Document store: PostgreSQL");
            Arc::new(PgDocumentStore::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set; documents are kept in memory and lost on restart");
            Arc::new(MemoryDocumentStore::new())
        }
    };

    // Identity gateway
    let identity: Arc<dyn IdentityGateway> = Arc::new(IdentityToolkitClient::new(
        config.identity_endpoint.clone(),
        config.identity_api_key.clone(),
        config.oauth_request_uri.clone(),
    ));
    info!("Identity gateway: {}", config.identity_endpoint);

    let state = AppState {
        config: config.clone(),
        identity,
        store,
        export: ExportPipeline::new(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins to the deployed frontend

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
