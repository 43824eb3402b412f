//! HTTP API Module
//!
//! Provides health, metrics and zone inspection endpoints for the responder.

mod routes;
mod metrics;

pub use routes::{router, run_api_server, ApiState};
pub use metrics::{Metrics, MetricsSnapshot};
