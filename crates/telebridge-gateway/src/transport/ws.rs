//! WebSocket upgrade handlers.
//!
//! Responsibilities:
//! - Upgrade HTTP -> WS with the configured message size cap
//! - Register the session and run it inside a tracing span
//! - Hand the socket to the telemetry poll loop or the echo relay
//!
//! Session bodies are tracked by `AppState` so shutdown can wait for them
//! to close their sockets.

use axum::{
    extract::{ws::WebSocketUpgrade, State},
    response::Response,
};
use tracing::Instrument;

use crate::app_state::AppState;
use crate::services::run_echo_session;
use crate::session::SessionKind;
use crate::telemetry::{run_telemetry_session, PollSettings};

// --------------------
// /_appTelemetry
// --------------------
pub async fn telemetry_upgrade(State(app): State<AppState>, ws: WebSocketUpgrade) -> Response {
    let max = app.cfg().server.max_message_bytes;
    ws.max_message_size(max).on_upgrade(move |socket| {
        let tracker = app.clone();
        tracker.track(async move {
            let guard = app.sessions().open(SessionKind::Telemetry);
            let span = tracing::info_span!(
                "telemetry_session",
                session_id = guard.id(),
                kind = guard.kind().as_str()
            );

            async move {
                tracing::info!("telemetry client connected");
                let settings = PollSettings::from(&app.cfg().telemetry);
                let _ = run_telemetry_session(socket, app.store(), settings, guard.cancel_token()).await;
                drop(guard);
            }
            .instrument(span)
            .await
        })
    })
}

// --------------------
// /echo
// --------------------
pub async fn echo_upgrade(State(app): State<AppState>, ws: WebSocketUpgrade) -> Response {
    let max = app.cfg().server.max_message_bytes;
    ws.max_message_size(max).on_upgrade(move |socket| {
        let tracker = app.clone();
        tracker.track(async move {
            let guard = app.sessions().open(SessionKind::Echo);
            let span = tracing::info_span!(
                "echo_session",
                session_id = guard.id(),
                kind = guard.kind().as_str()
            );

            async move {
                tracing::info!("echo client connected");
                let heartbeat = app.cfg().echo.heartbeat();
                let _ = run_echo_session(socket, heartbeat, guard.cancel_token()).await;
                drop(guard);
            }
            .instrument(span)
            .await
        })
    })
}
