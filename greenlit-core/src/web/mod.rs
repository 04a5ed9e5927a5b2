// File: greenlit-core/src/web/mod.rs

//! Inbound HTTP: the Payhip purchase webhook and the allow-list endpoint the
//! Roblox games poll.

pub mod allow_list;
pub mod webhook;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use axum_server::{Handle, Server};
use tokio::sync::watch;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::Error;
use crate::stores::{AllowListStore, PendingLedger};
use greenlit_common::models::SystemCatalog;

/// Shared state for the HTTP routes.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<SystemCatalog>,
    pub ledger: Arc<PendingLedger>,
    pub allow_lists: Arc<AllowListStore>,
    /// Hex SHA-256 of the Payhip API key; webhook bodies must carry it.
    pub expected_signature: String,
}

impl AppState {
    pub fn new(
        catalog: Arc<SystemCatalog>,
        ledger: Arc<PendingLedger>,
        allow_lists: Arc<AllowListStore>,
        payhip_api_key: &str,
    ) -> Self {
        Self {
            catalog,
            ledger,
            allow_lists,
            expected_signature: webhook::signature_for(payhip_api_key),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/payhip-webhook", post(webhook::handle_payhip_webhook))
        .route("/whitelist/{system}", get(allow_list::handle_get_allow_list))
        .with_state(state)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

/// Serves `router(state)` on `addr` until `shutdown` flips to true.
pub async fn serve(addr: SocketAddr, state: AppState, mut shutdown: watch::Receiver<bool>) -> Result<(), Error> {
    let app = router(state);
    let handle = Handle::new();
    let handle_clone = handle.clone();

    tokio::spawn(async move {
        while shutdown.changed().await.is_ok() {
            if *shutdown.borrow() {
                break;
            }
        }
        handle_clone.graceful_shutdown(None);
    });

    info!("HTTP server listening on http://{}", addr);
    if let Err(e) = Server::bind(addr).handle(handle).serve(app.into_make_service()).await {
        error!("HTTP server error: {}", e);
        return Err(Error::Io(e));
    }
    info!("HTTP server shut down.");
    Ok(())
}
