//! Liveness endpoint.

use axum::{extract::State, response::Json, routing::get, Router};
use chainalert_stream::LogListener;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Clone)]
pub struct HealthState {
    pub version: String,
    pub startup_time: i64,
    pub relay: Arc<dyn LogListener>,
}

impl HealthState {
    pub fn new(relay: Arc<dyn LogListener>) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            startup_time: chrono::Utc::now().timestamp(),
            relay,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: i64,
    /// Whether the log transport is connected; liveness does not depend on it
    pub relay_connected: bool,
}

async fn health_handler(State(state): State<Arc<HealthState>>) -> Json<HealthResponse> {
    let uptime = chrono::Utc::now().timestamp() - state.startup_time;

    Json(HealthResponse {
        status: "ok".to_string(),
        version: state.version.clone(),
        uptime_seconds: uptime.max(0),
        relay_connected: state.relay.is_connected(),
    })
}

/// `GET /` and `GET /health`.
pub fn router(relay: Arc<dyn LogListener>) -> Router {
    let state = Arc::new(HealthState::new(relay));

    Router::new()
        .route("/", get(health_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chainalert_stream::EvmWsListener;
    use tower::ServiceExt;

    async fn get_json(uri: &str) -> (StatusCode, Option<HealthResponse>) {
        // never subscribed, so never connected
        let relay = Arc::new(EvmWsListener::new("ws://127.0.0.1:1"));
        let response = router(relay)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).ok())
    }

    #[tokio::test]
    async fn health_reports_ok() {
        for uri in ["/", "/health"] {
            let (status, body) = get_json(uri).await;
            assert_eq!(status, StatusCode::OK);
            let body = body.unwrap();
            assert_eq!(body.status, "ok");
            assert_eq!(body.version, env!("CARGO_PKG_VERSION"));
            assert!(body.uptime_seconds >= 0);
            assert!(!body.relay_connected);
        }
    }

    #[tokio::test]
    async fn unknown_path_is_404() {
        let (status, _) = get_json("/metrics").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
