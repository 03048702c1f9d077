//! HTTP listener for sync webhooks

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Router,
};
use parking_lot::Mutex;
use tower_http::trace::TraceLayer;

use super::{dispatch, WebhookPayload};
use crate::sync::SyncEngine;

/// Header carrying the shared secret
pub const SECRET_HEADER: &str = "x-webhook-secret";

/// Shared state of the webhook router.
///
/// The engine sits behind a mutex: webhook-triggered syncs run one at a time.
#[derive(Clone)]
pub struct WebhookState {
    engine: Arc<Mutex<SyncEngine>>,
    secret: Option<Arc<str>>,
}

impl WebhookState {
    pub fn new(engine: Arc<Mutex<SyncEngine>>, secret: Option<String>) -> Self {
        Self {
            engine,
            secret: secret.filter(|s| !s.is_empty()).map(Arc::from),
        }
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        match &self.secret {
            None => true,
            Some(secret) => headers
                .get(SECRET_HEADER)
                .and_then(|v| v.to_str().ok())
                .is_some_and(|provided| provided == &**secret),
        }
    }
}

/// Webhook server
pub struct WebhookServer {
    state: WebhookState,
    addr: SocketAddr,
}

impl WebhookServer {
    pub fn new(state: WebhookState, port: u16) -> Self {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        Self { state, addr }
    }

    /// Build the router
    pub fn router(state: WebhookState) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route("/webhook", post(webhook_handler))
            .fallback(not_found)
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Bind and serve until the process is stopped
    pub async fn start(self) -> std::io::Result<()> {
        let app = Self::router(self.state);

        tracing::info!("Webhook server listening on {}", self.addr);

        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down webhook server");
}

async fn health_handler() -> &'static str {
    "OK"
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not Found")
}

async fn webhook_handler(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, String) {
    if !state.authorized(&headers) {
        tracing::warn!("Webhook rejected: invalid secret");
        return (StatusCode::UNAUTHORIZED, "Unauthorized".to_string());
    }

    let payload: WebhookPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(_) => return (StatusCode::BAD_REQUEST, "Invalid JSON".to_string()),
    };
    tracing::info!(
        action = payload.action.as_deref().unwrap_or("-"),
        post_id = ?payload.post_id,
        post_type = payload.post_type.as_deref().unwrap_or("-"),
        slug = payload.slug.as_deref().unwrap_or("-"),
        "Received webhook"
    );

    let action = payload.action();
    let engine = state.engine.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        let mut engine = engine.lock();
        dispatch(&mut engine, action)
    })
    .await;

    match outcome {
        Ok(Ok(message)) => (StatusCode::OK, message),
        Ok(Err(e)) => {
            tracing::error!("Error handling webhook: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {}", e))
        }
        Err(e) => {
            tracing::error!("Webhook sync task failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {}", e))
        }
    }
}
