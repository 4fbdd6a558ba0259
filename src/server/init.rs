//! Server initialization
//!
//! Contains the main `run()` function that wires the stores, the workflow and
//! the HTTP router together.

use super::config::AppConfig;
use super::init_stores::{build_object_store, open_store};
use super::loader::{environment, load_config};
use super::validation::validate_config;
use crate::api::auth::LoginPath;
use crate::api::{api_router, health_routes, MemoriesState};
use crate::middleware::auth::SessionProvider;
use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::{Extension, Router};
use journey_core::{IdentityClient, MemoryWorkflow};
use journey_store::JourneyStore;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::{info, warn};

/// Run the server
pub async fn run() -> Result<()> {
    info!("Starting Journey v{}", env!("CARGO_PKG_VERSION"));

    let environment = environment();
    let config = load_config().context("Failed to load configuration")?;
    info!("Configuration loaded ({})", environment);

    validate_config(&config, &environment)?;

    let store = open_store(&config).await?;
    let objects = build_object_store(&config)?;
    let workflow = MemoryWorkflow::new(store.clone(), objects.store);
    let sessions = session_provider(&config);

    let app = build_router(&config, workflow, store, sessions, objects.local_dir);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    info!("HTTP server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Journey shutdown complete");
    Ok(())
}

/// Session resolution for `[auth]`
fn session_provider(config: &AppConfig) -> SessionProvider {
    if config.auth.enabled {
        info!("Sessions resolved by {}", config.auth.identity_url);
        SessionProvider::Identity(Arc::new(IdentityClient::new(
            &config.auth.identity_url,
            &config.auth.api_key,
        )))
    } else {
        SessionProvider::Disabled
    }
}

/// Build the main router with all endpoints
pub(crate) fn build_router(
    config: &AppConfig,
    workflow: MemoryWorkflow,
    store: JourneyStore,
    sessions: SessionProvider,
    local_dir: Option<PathBuf>,
) -> Router {
    // Local blobs are served under the same prefix the hosted store uses
    let prefix = format!("/storage/v1/object/public/{}", workflow.objects().bucket());
    let state = MemoriesState::new(workflow, &config.auth.login_path);
    let app = Router::new()
        .merge(health_routes())
        .merge(api_router(state));

    let app = match local_dir {
        Some(dir) => {
            info!("Serving {} from {}", prefix, dir.display());
            app.nest_service(&prefix, ServeDir::new(dir))
        }
        None => app,
    };

    app.layer(Extension(store))
        .layer(Extension(sessions))
        .layer(Extension(LoginPath(config.auth.login_path.clone())))
        .layer(DefaultBodyLimit::max(config.server.max_upload_bytes()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received");
}
