//! Axum router wiring.
//!
//! - `GET /metrics`       : scrape (drains the telemetry store)
//! - `GET /_appTelemetry` : WebSocket upgrade, telemetry polling
//! - `GET /echo`          : WebSocket upgrade, debug echo

use axum::{routing::get, Router};

use crate::{app_state::AppState, ops, transport};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/metrics", get(ops::metrics))
        .route("/_appTelemetry", get(transport::ws::telemetry_upgrade))
        .route("/echo", get(transport::ws::echo_upgrade))
        .with_state(state)
}
