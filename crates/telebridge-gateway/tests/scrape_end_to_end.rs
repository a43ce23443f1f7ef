//! Poll loop feeding the store while `/metrics` drains it.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::time::Duration;

use axum::body::to_bytes;
use axum::extract::State;
use axum::http::{header, StatusCode};

use tokio::task::JoinHandle;

use telebridge_core::error::{ErrorKind, TelemetryError};
use telebridge_gateway::app_state::AppState;
use telebridge_gateway::config::GatewayConfig;
use telebridge_gateway::ops;
use telebridge_gateway::session::SessionKind;
use telebridge_gateway::telemetry::{run_telemetry_session, PollSettings};

use scripted_peer::{success, ScriptedPeer, Step};

async fn scrape(state: &AppState) -> String {
    let resp = ops::metrics(State(state.clone())).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/plain; version=0.0.4"
    );
    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

fn spawn_session(state: &AppState, script: Vec<Step>) -> JoinHandle<TelemetryError> {
    let (peer, _log) = ScriptedPeer::new(script);
    let guard = state.sessions().open(SessionKind::Telemetry);
    let store = state.store();
    tokio::spawn(async move {
        let reason = run_telemetry_session(peer, store, PollSettings::default(), guard.cancel_token()).await;
        drop(guard);
        reason
    })
}

#[tokio::test(start_paused = true)]
async fn scrape_mid_session_then_after_timeout() {
    let state = AppState::new(GatewayConfig::default()).unwrap();
    let task = spawn_session(
        &state,
        vec![Step::Reply(success("a")), Step::Reply(success("b")), Step::Silent],
    );

    // replies land at 1s and 2s; the third command times out at 4s
    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert_eq!(scrape(&state).await, "a\nb");

    let reason = task.await.unwrap();
    assert_eq!(reason.kind(), ErrorKind::Timeout);
    assert_eq!(scrape(&state).await, "");
}

#[tokio::test(start_paused = true)]
async fn scrape_after_dead_session_returns_reports_once() {
    let state = AppState::new(GatewayConfig::default()).unwrap();
    let task = spawn_session(
        &state,
        vec![Step::Reply(success("a")), Step::Reply(success("b")), Step::Silent],
    );

    assert_eq!(task.await.unwrap().kind(), ErrorKind::Timeout);
    assert_eq!(scrape(&state).await, "a\nb");
    assert_eq!(scrape(&state).await, "");
}

#[tokio::test(start_paused = true)]
async fn scrape_strips_agent_labels() {
    let state = AppState::new(GatewayConfig::default()).unwrap();
    let report = concat!(
        r#"sdk_kv_r_total{agent="ruby/1.2.3 (Ruby/3.3.0)",bucket="default",node="example.com"} 3"#,
        "\n",
        r#"sdk_query_duration_seconds_count{agent="ruby/1.2.3 (Ruby/3.3.0)",bucket="foo",node="example.net"} 1"#,
    );
    let task = spawn_session(&state, vec![Step::Reply(success(report)), Step::Silent]);
    task.await.unwrap();

    assert_eq!(
        scrape(&state).await,
        concat!(
            r#"sdk_kv_r_total{bucket="default",node="example.com"} 3"#,
            "\n",
            r#"sdk_query_duration_seconds_count{bucket="foo",node="example.net"} 1"#,
        )
    );
}

#[tokio::test(start_paused = true)]
async fn shutdown_cancels_sessions_and_keeps_reports() {
    let state = AppState::new(GatewayConfig::default()).unwrap();
    let task = spawn_session(&state, vec![Step::Reply(success("a")); 10]);

    tokio::time::sleep(Duration::from_millis(3500)).await;
    state.begin_shutdown();

    let reason = task.await.unwrap();
    assert_eq!(reason.kind(), ErrorKind::Cancelled);
    assert!(state.sessions().is_empty());
    assert_eq!(scrape(&state).await, "a\na\na");
}

#[tokio::test(start_paused = true)]
async fn shutdown_waits_for_tracked_sessions_to_close() {
    let state = AppState::new(GatewayConfig::default()).unwrap();
    let (peer, log) = ScriptedPeer::new([Step::Reply(success("a"))]);
    let guard = state.sessions().open(SessionKind::Telemetry);
    let store = state.store();
    tokio::spawn(state.track(async move {
        let _ = run_telemetry_session(peer, store, PollSettings::default(), guard.cancel_token()).await;
        drop(guard);
    }));

    // second command is pending when shutdown starts
    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert_eq!(log.lock().unwrap().closes, 0);

    state.begin_shutdown();
    state.wait_for_sessions().await;

    assert_eq!(log.lock().unwrap().closes, 1);
    assert!(state.sessions().is_empty());
    assert_eq!(scrape(&state).await, "a");
}

#[tokio::test]
async fn empty_store_scrapes_empty_body() {
    let state = AppState::new(GatewayConfig::default()).unwrap();
    assert_eq!(scrape(&state).await, "");
}
