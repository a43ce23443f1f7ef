//! Echo relay against a scripted peer (paused clock).

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::time::Duration;

use axum::extract::ws::Message;
use tokio_util::sync::CancellationToken;

use telebridge_core::error::{ErrorKind, TelemetryError};
use telebridge_gateway::services::run_echo_session;

use scripted_peer::ScriptedPeer;

const HEARTBEAT: Duration = Duration::from_secs(3);

#[tokio::test(start_paused = true)]
async fn mirrors_text_and_binary_until_close() {
    let (peer, log) = ScriptedPeer::sending([
        Message::Text("hello".into()),
        Message::Binary(vec![0xde, 0xad]),
        Message::Close(None),
        Message::Text("after close".into()),
    ]);

    let res = run_echo_session(peer, HEARTBEAT, CancellationToken::new()).await;

    assert!(res.is_ok());
    let log = log.lock().unwrap();
    assert_eq!(
        log.sent,
        vec![Message::Text("hello".into()), Message::Binary(vec![0xde, 0xad])]
    );
    assert_eq!(log.closes, 1);
}

#[tokio::test(start_paused = true)]
async fn stream_end_is_a_clean_exit() {
    let (peer, log) = ScriptedPeer::sending([Message::Text("x".into())]);

    let res = run_echo_session(peer.hang_up_when_done(), HEARTBEAT, CancellationToken::new()).await;

    assert!(res.is_ok());
    assert_eq!(log.lock().unwrap().closes, 1);
}

#[tokio::test(start_paused = true)]
async fn silent_peer_is_dropped_as_idle() {
    let (peer, log) = ScriptedPeer::sending(std::iter::empty());

    let res = run_echo_session(peer, HEARTBEAT, CancellationToken::new()).await;

    assert!(matches!(res, Err(TelemetryError::Timeout(_))));
    let log = log.lock().unwrap();
    // one keepalive at 3s, idle detected at 6s
    assert_eq!(log.sent, vec![Message::Ping(Vec::new())]);
    assert_eq!(log.closes, 1);
}

#[tokio::test(start_paused = true)]
async fn pongs_keep_the_session_alive() {
    let (peer, log) = ScriptedPeer::sending(std::iter::empty());
    let cancel = CancellationToken::new();

    let task = tokio::spawn(run_echo_session(peer.answer_pings(), HEARTBEAT, cancel.clone()));
    tokio::time::sleep(Duration::from_secs(20)).await;
    cancel.cancel();

    let res = task.await.unwrap();
    assert_eq!(res.unwrap_err().kind(), ErrorKind::Cancelled);
    let log = log.lock().unwrap();
    assert_eq!(log.sent.len(), 6);
    assert!(log.sent.iter().all(|m| matches!(m, Message::Ping(_))));
    assert_eq!(log.closes, 1);
}

#[tokio::test(start_paused = true)]
async fn send_failure_ends_relay() {
    let (peer, log) = ScriptedPeer::sending([Message::Text("x".into())]);

    let res = run_echo_session(peer.failing_send(), HEARTBEAT, CancellationToken::new()).await;

    assert_eq!(res.unwrap_err().kind(), ErrorKind::TransportFault);
    assert_eq!(log.lock().unwrap().closes, 1);
}
