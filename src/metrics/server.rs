//! HTTP exporter for round metrics and the last published colors.
//!
//! Routes:
//!
//! - `GET /metrics`: Prometheus text format
//! - `GET /colors`: last published triple as the same JSON object that is
//!   sent with PATCH, or `204 No Content` before the first success
//! - `GET /health`: liveness

use crate::color::TriHexColor;
use crate::metrics::{MetricsRegistry, MetricsSnapshot};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;

/// Errors from the exporter.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listen address could not be bound.
    #[error("failed to bind metrics listener: {0}")]
    Bind(#[from] std::io::Error),

    /// The server stopped with an error.
    #[error("metrics server error: {0}")]
    Server(String),
}

/// Where the exporter listens.
#[derive(Debug, Clone)]
pub struct MetricsServerConfig {
    /// Listen address.
    pub bind_addr: SocketAddr,
}

impl Default for MetricsServerConfig {
    fn default() -> Self {
        Self::with_port(9090)
    }
}

impl MetricsServerConfig {
    /// Listens on all interfaces at `port`.
    pub fn with_port(port: u16) -> Self {
        Self {
            bind_addr: ([0, 0, 0, 0], port).into(),
        }
    }
}

/// State shared between the sampling loop and the request handlers.
pub struct MetricsState {
    registry: MetricsRegistry,
    last_colors: Option<TriHexColor>,
}

impl MetricsState {
    /// Applies a snapshot from the sampling loop.
    pub fn update(&mut self, snapshot: &MetricsSnapshot) {
        self.registry.update(snapshot);
        if let Some(colors) = &snapshot.last_colors {
            self.last_colors = Some(TriHexColor::from_colors(colors));
        }
    }

    /// The triple published by the last successful round.
    pub fn last_colors(&self) -> Option<&TriHexColor> {
        self.last_colors.as_ref()
    }
}

/// Serves the exporter routes over HTTP.
pub struct MetricsServer {
    config: MetricsServerConfig,
    state: Arc<RwLock<MetricsState>>,
}

impl MetricsServer {
    /// Creates a server exporting `registry`.
    pub fn new(config: MetricsServerConfig, registry: MetricsRegistry) -> Self {
        Self {
            config,
            state: Arc::new(RwLock::new(MetricsState {
                registry,
                last_colors: None,
            })),
        }
    }

    /// Handle for pushing snapshots from the sampling loop.
    pub fn state(&self) -> Arc<RwLock<MetricsState>> {
        Arc::clone(&self.state)
    }

    /// Runs until the listener fails.
    pub async fn run(self) -> Result<(), ServerError> {
        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(addr = %self.config.bind_addr, "Metrics server listening");

        axum::serve(listener, router(self.state))
            .await
            .map_err(|e| ServerError::Server(e.to_string()))
    }
}

fn router(state: Arc<RwLock<MetricsState>>) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/colors", get(colors_handler))
        .route("/health", get(|| async { (StatusCode::OK, "OK") }))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn metrics_handler(State(state): State<Arc<RwLock<MetricsState>>>) -> Response {
    match state.read().await.registry.encode() {
        Ok(output) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
            output,
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("failed to encode metrics: {}", e),
        )
            .into_response(),
    }
}

async fn colors_handler(State(state): State<Arc<RwLock<MetricsState>>>) -> Response {
    let state = state.read().await;
    let Some(colors) = state.last_colors() else {
        return StatusCode::NO_CONTENT.into_response();
    };
    match colors.to_json() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}
