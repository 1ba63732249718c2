//! Router construction and the server entry point.

use std::sync::Arc;

use axum::{
    Router,
    routing::{any, get, post},
};
use leasewire_shared::handshake::WEBSOCKET_PATH;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;

use crate::{
    config::ServerConfig,
    domain::{MembershipStore, TokenVerifier},
    infrastructure::{
        auth::{HttpTokenVerifier, PresenceTokenVerifier},
        repository::InMemoryMembershipStore,
    },
    ui::{
        handler::{get_stats, health_check, push_event, websocket_handler},
        signal::shutdown_signal,
        state::AppState,
    },
};

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(WEBSOCKET_PATH, any(websocket_handler))
        .route("/api/health", get(health_check))
        .route("/api/stats", get(get_stats))
        .route("/internal/push", post(push_event))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn build_verifier(config: &ServerConfig) -> Result<Arc<dyn TokenVerifier>, Box<dyn std::error::Error>> {
    match &config.auth_url {
        Some(url) => {
            tracing::info!("Verifying tokens against '{}'", url);
            Ok(Arc::new(HttpTokenVerifier::new(url.clone())?))
        }
        None => {
            tracing::warn!("No auth URL configured, accepting any non-empty token");
            Ok(Arc::new(PresenceTokenVerifier))
        }
    }
}

/// Run the server until Ctrl+C or SIGTERM.
pub async fn run(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let verifier = build_verifier(&config)?;
    let store: Arc<dyn MembershipStore> = Arc::new(InMemoryMembershipStore::new());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let state = Arc::new(AppState::new(
        store,
        verifier,
        config.heartbeat(),
        config.push_secret.clone(),
        shutdown_rx,
    ));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()?).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            // Open connections send a close frame and are evicted
            let _ = shutdown_tx.send(true);
        })
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
