//! API server implementation.
//!
//! Provides health, ready, metrics, and the `/v1` API surface.

use axum::middleware;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use muster_core::{Error, Result};

use crate::metrics::track_requests;
use crate::routes;
use crate::state::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
}

/// Readiness check response.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct ReadyResponse {
    /// Service readiness status.
    pub ready: bool,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

async fn ready() -> Json<ReadyResponse> {
    Json(ReadyResponse { ready: true })
}

async fn render_metrics() -> String {
    crate::metrics::render()
}

/// Builds the full application router.
#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/metrics", get(render_metrics))
        .nest("/v1", routes::v1())
        .layer(middleware::from_fn(track_requests))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds the configured address and serves until shutdown.
///
/// # Errors
///
/// Returns a transient error when the listener cannot bind or the server
/// fails while running.
pub async fn serve(state: AppState) -> Result<()> {
    let addr = state.config.bind_addr;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::transient_with_source(format!("failed to bind {addr}"), e))?;
    tracing::info!(%addr, "muster api listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| Error::transient_with_source("server terminated abnormally", e))
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::warn!("failed to install ctrl-c handler; running until killed");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use muster_core::{DocumentStore, MemoryStore};
    use muster_push::{NoopTransport, PushTransport};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_router() -> Router {
        let state = AppState::new(
            Config::default(),
            Arc::new(MemoryStore::new()) as Arc<dyn DocumentStore>,
            Arc::new(NoopTransport) as Arc<dyn PushTransport>,
        );
        router(state)
    }

    #[tokio::test]
    async fn health_and_ready_respond() {
        let app = test_router();

        let response = app
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(Request::get("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn metrics_endpoint_responds() {
        let app = test_router();
        let response = app
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
