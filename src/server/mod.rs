//! Price Predictor Server Module
//!
//! Web front end for the price model: an HTML form for single predictions,
//! CSV upload for batch predictions, and a health endpoint.

mod api;
mod error;
mod handlers;
pub mod page;
mod state;

pub use api::create_router;
pub use error::ServerError;
pub use state::AppState;

use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

use crate::artifacts::ArtifactPaths;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub artifacts: ArtifactPaths,
    pub max_upload_size: usize,
    pub cors_origin: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            artifacts: ArtifactPaths::default(),
            max_upload_size: std::env::var("MAX_UPLOAD_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(100 * 1024 * 1024), // 100MB
            cors_origin: std::env::var("CORS_ORIGIN").ok(),
        }
    }
}

/// Start the server with the given configuration
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let start_time = chrono::Utc::now();
    info!(
        preprocessor = %config.artifacts.preprocessor.display(),
        model = %config.artifacts.model.display(),
        feature_list = %config.artifacts.feature_list.display(),
        train_csv = %config.artifacts.train_csv.display(),
        started_at = %start_time.to_rfc3339(),
        "Loading artifacts"
    );

    let state = AppState::load(config.clone())?;
    if !state.engine.model_loaded() {
        warn!("Serving without model artifacts, predictions will fail until they are provided");
    }
    let app = create_router(Arc::new(state));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!(
        host = %config.host,
        port = config.port,
        address = %addr,
        max_upload_size_mb = config.max_upload_size / 1024 / 1024,
        started_at = %start_time.to_rfc3339(),
        "Price predictor server starting"
    );
    info!(url = %format!("http://{}", addr), "Web UI available");
    info!(url = %format!("http://{}/health", addr), "Health endpoint available");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, pid = std::process::id(), "Server listening and ready to accept connections");

    // Graceful shutdown on ctrl+c
    let shutdown_signal = async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for ctrl+c, shutting down");
        }
        let stop_time = chrono::Utc::now();
        let uptime = stop_time.signed_duration_since(start_time);
        info!(
            stopped_at = %stop_time.to_rfc3339(),
            uptime_secs = uptime.num_seconds(),
            "Shutdown signal received, stopping server gracefully"
        );
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shut down cleanly");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        if std::env::var("API_PORT").is_err() {
            assert_eq!(config.port, 5000);
        }
        if std::env::var("MAX_UPLOAD_SIZE").is_err() {
            assert_eq!(config.max_upload_size, 100 * 1024 * 1024);
        }
    }
}
