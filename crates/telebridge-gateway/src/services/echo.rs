//! Debug echo relay for `/echo`.
//!
//! Text and binary frames are sent back unchanged. The server pings every
//! heartbeat; a peer that has been silent (no data, no pong) for one and a
//! half heartbeats is dropped as idle.

use std::time::Duration;

use axum::extract::ws::Message;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use telebridge_core::error::{Result, TelemetryError};

use crate::transport::duplex::Duplex;

/// Relay frames until the peer leaves, goes idle, faults, or `cancel` fires.
///
/// Returns `Ok(())` when the peer closed the session itself. The connection
/// is closed on every path.
pub async fn run_echo_session<D: Duplex>(
    mut conn: D,
    heartbeat: Duration,
    cancel: CancellationToken,
) -> Result<()> {
    let res = tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(TelemetryError::Cancelled),
        res = relay(&mut conn, heartbeat) => res,
    };

    match &res {
        Ok(()) => tracing::info!("echo peer closed"),
        Err(TelemetryError::Cancelled) => tracing::info!("echo session cancelled"),
        Err(e) => tracing::warn!(kind = e.kind().as_str(), error = %e, "echo session failed"),
    }

    if let Err(e) = conn.close().await {
        tracing::debug!(error = %e, "close after echo session failed");
    }
    res
}

async fn relay<D: Duplex>(conn: &mut D, heartbeat: Duration) -> Result<()> {
    let idle_after = heartbeat + heartbeat / 2;
    let mut last_seen = Instant::now();

    let mut ping = interval_at(Instant::now() + heartbeat, heartbeat);
    ping.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            incoming = conn.recv() => {
                let Some(msg) = incoming else { return Ok(()); };
                let msg = msg?;
                last_seen = Instant::now();

                match msg {
                    Message::Text(s) => {
                        tracing::debug!(bytes = s.len(), "echo text");
                        conn.send(Message::Text(s)).await?;
                    }
                    Message::Binary(b) => {
                        tracing::debug!(bytes = b.len(), "echo binary");
                        conn.send(Message::Binary(b)).await?;
                    }
                    // pings are answered by the websocket layer
                    Message::Ping(_) | Message::Pong(_) => {}
                    Message::Close(_) => return Ok(()),
                }
            }

            _ = ping.tick() => {
                if last_seen.elapsed() >= idle_after {
                    return Err(TelemetryError::Timeout(idle_after));
                }
                conn.send(Message::Ping(Vec::new())).await?;
            }
        }
    }
}
