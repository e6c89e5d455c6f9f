//! Core library containing the file store, validation and route handlers
//! for the file upload server.

pub mod config;
pub mod error;
pub mod files;
pub mod handlers;
pub mod middleware;

pub use config::AppConfig;
pub use error::{AppError, Result};
pub use files::{
    FileCategory, FileStore, FileStoreConfig, FileUpload, FileValidator, StoredFile,
    ValidationError,
};
pub use handlers::routes::create_routes;
pub use middleware::cors::{cors_layer_from_config, cors_layer_permissive};

use axum::Router;
use std::net::SocketAddr;
use tokio::signal;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub app_name: String,
    pub version: String,
    pub file_store: FileStore,
}

impl AppState {
    pub fn new(file_store: FileStore) -> Self {
        Self {
            app_name: "File Upload Server".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            file_store,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(FileStore::with_default_config())
    }
}

pub fn create_app(state: AppState) -> Router {
    create_app_with_config(state, AppConfig::default())
}

pub fn create_app_with_config(state: AppState, config: AppConfig) -> Router {
    let router = Router::new()
        .merge(create_routes())
        // axum's default 2 MB body cap would reject uploads well inside
        // the configured per-file policy
        .layer(axum::extract::DefaultBodyLimit::max(config.storage.upload_body_limit()))
        .layer(middleware::cors::cors_layer_from_config(&config.cors));

    middleware::logging::with_request_logging(router).with_state(state)
}

pub async fn run_server(app: Router, addr: SocketAddr) -> Result<()> {
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
