//! Heartbeat endpoint.
//!
//! # Responsibilities
//! - Answer liveness probes on `/` (GET and POST return `{"up": true}`)
//! - Answer CORS preflight (`OPTIONS /`) with an empty 200
//! - Stop serving when shutdown is triggered
//!
//! # Design Decisions
//! - Permissive CORS headers on every response, set by middleware

use axum::{
    http::{header, HeaderValue, StatusCode},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::lifecycle::ShutdownListener;

const ALLOW_HEADERS: &str = "Origin, Content-Type, Accept, Content-Encoding";
const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS, HEAD";

/// Build the heartbeat router.
pub fn router() -> Router {
    Router::new()
        .route("/", get(heartbeat).post(heartbeat).options(empty_heartbeat))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        ))
}

async fn heartbeat() -> Json<Value> {
    Json(json!({ "up": true }))
}

async fn empty_heartbeat() -> StatusCode {
    StatusCode::OK
}

/// Serve the heartbeat on `listener` until `shutdown` fires.
pub async fn serve(listener: TcpListener, mut shutdown: ShutdownListener) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "Heartbeat server starting");

    axum::serve(listener, router())
        .with_graceful_shutdown(async move { shutdown.wait().await })
        .await?;

    tracing::info!("Heartbeat server stopped");
    Ok(())
}
