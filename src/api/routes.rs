//! API Routes
//!
//! HTTP endpoints for metrics, health checks, and the served zone

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::Metrics;
use crate::config::ServerConfig;
use crate::dns::StaticZone;

/// Shared API state
pub struct ApiState {
    pub config: Arc<ServerConfig>,
    pub zone: Arc<StaticZone>,
    pub metrics: Arc<Metrics>,
    pub started_at: DateTime<Utc>,
}

/// Build the API router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        // Health & Status
        .route("/health", get(health_check))
        .route("/status", get(get_status))

        // Metrics
        .route("/metrics", get(get_metrics_prometheus))
        .route("/metrics/json", get(get_metrics_json))

        // Zone
        .route("/zone", get(get_zone))

        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the HTTP API server
pub async fn run_api_server(
    config: Arc<ServerConfig>,
    zone: Arc<StaticZone>,
    metrics: Arc<Metrics>,
) -> anyhow::Result<()> {
    let state = Arc::new(ApiState {
        config: config.clone(),
        zone,
        metrics,
        started_at: Utc::now(),
    });

    let addr = std::net::SocketAddr::new(config.listen_addr, config.api_port);
    info!("📊 HTTP API server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}

/// GET /health - Simple health check
async fn health_check() -> impl IntoResponse {
    "OK"
}

/// GET /status - Detailed status
async fn get_status(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    let status = serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "started_at": state.started_at.to_rfc3339(),
        "uptime_secs": state.metrics.uptime_secs(),
        "dns": {
            "listen": format!("{}:{}", state.config.listen_addr, state.config.dns_port),
            "max_packet_size": state.config.max_packet_size,
            "zone_records": state.zone.len(),
            "fallback_ipv4": state.zone.fallback_ipv4().map(|ip| ip.to_string()),
        }
    });

    Json(status)
}

/// GET /metrics - Prometheus format metrics
async fn get_metrics_prometheus(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        state.metrics.to_prometheus(),
    )
}

/// GET /metrics/json - JSON format metrics
async fn get_metrics_json(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    Json(state.metrics.to_json())
}

/// GET /zone - Explicit records served
async fn get_zone(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    let records: Vec<_> = state
        .zone
        .records()
        .iter()
        .map(|r| {
            serde_json::json!({
                "name": r.name.to_string(),
                "type": r.rtype.to_string(),
                "class": r.rclass.to_string(),
                "ttl": r.ttl,
                "data": hex::encode(&r.data),
            })
        })
        .collect();

    Json(serde_json::json!({
        "count": records.len(),
        "fallback_ipv4": state.zone.fallback_ipv4().map(|ip| ip.to_string()),
        "records": records,
    }))
}
