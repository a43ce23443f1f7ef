//! Operational HTTP endpoints.
//!
//! - `/metrics` : drained telemetry reports, Prometheus text format

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::app_state::AppState;

pub const METRICS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Drain the telemetry store once and return the reports newline-joined.
pub async fn metrics(State(state): State<AppState>) -> Response {
    let reports = state.store().drain_normalized();
    tracing::debug!(reports = reports.len(), "metrics scrape");

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, METRICS_CONTENT_TYPE)],
        reports.join("\n"),
    )
        .into_response()
}
