//! Annotator Server
//!
//! Collects query/response annotations over HTTP and keeps them in a single
//! SQLite table.

pub mod config;
pub mod error;
pub mod handlers;
pub mod services;
pub mod storage;

use annotator_core::AnnotationStore;
use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::services::ServeFile;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::{BulkUploadMode, ServerConfig};
use crate::services::AnnotationService;
use crate::storage::Database;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub annotations: Arc<AnnotationService>,
}

impl AppState {
    pub fn new(store: Arc<dyn AnnotationStore>, bulk_mode: BulkUploadMode) -> Self {
        Self {
            annotations: Arc::new(AnnotationService::new(store, bulk_mode)),
        }
    }
}

pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .route_service("/", ServeFile::new(&config.index_path))
        .route("/health", get(handlers::health))
        .route("/save-annotation", post(handlers::annotations::save))
        .route("/upload-json", post(handlers::annotations::upload))
        .route(
            "/annotations",
            get(handlers::annotations::list).delete(handlers::annotations::delete_all),
        )
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Open storage, bind the listener and serve until a shutdown signal arrives.
pub async fn run(config: ServerConfig) -> Result<()> {
    let addr = config.socket_addr().context("Invalid bind address")?;

    info!("Initializing SQLite database...");
    let db = Arc::new(
        Database::connect(&config.database)
            .await
            .with_context(|| {
                format!(
                    "Failed to initialize database at {}",
                    config.database.path.display()
                )
            })?,
    );

    let state = AppState::new(db.clone(), config.bulk_upload);
    info!("Bulk upload mode: {:?}", state.annotations.bulk_mode());

    if !config.index_path.is_file() {
        warn!(
            "Index page not found at {}; GET / will return 404",
            config.index_path.display()
        );
    }

    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    db.close().await;
    info!("Shutdown complete");

    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl-C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
