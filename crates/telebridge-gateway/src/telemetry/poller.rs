use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::Message;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;

use telebridge_core::error::{Result, TelemetryError};
use telebridge_core::protocol::{Command, Reply};
use telebridge_core::TelemetryStore;

use crate::config::TelemetrySection;
use crate::transport::codec::{decode, Inbound};
use crate::transport::duplex::Duplex;

/// Timing of one poll cycle.
#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    /// Pause before each command.
    pub poll_interval: Duration,
    /// Deadline for the reply, measured from the moment the command was sent.
    /// A send that stalls for this long fails the same way.
    pub reply_timeout: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            reply_timeout: Duration::from_secs(1),
        }
    }
}

impl From<&TelemetrySection> for PollSettings {
    fn from(cfg: &TelemetrySection) -> Self {
        Self {
            poll_interval: cfg.poll_interval(),
            reply_timeout: cfg.reply_timeout(),
        }
    }
}

/// Drive the telemetry protocol until the session ends, then close `conn`.
///
/// Returns the reason the session ended. `TelemetryError::Cancelled` means
/// `cancel` fired; every other variant is a failure of the peer or transport.
/// The connection is closed exactly once whichever way the loop exits, and a
/// failing close is logged without replacing the returned reason.
pub async fn run_telemetry_session<D: Duplex>(
    mut conn: D,
    store: Arc<TelemetryStore>,
    settings: PollSettings,
    cancel: CancellationToken,
) -> TelemetryError {
    let reason = tokio::select! {
        biased;
        _ = cancel.cancelled() => TelemetryError::Cancelled,
        reason = poll_until_failure(&mut conn, &store, settings) => reason,
    };

    match &reason {
        TelemetryError::Cancelled => tracing::info!("telemetry polling cancelled"),
        TelemetryError::PeerUnsupported(cmd) => {
            tracing::warn!(command = ?cmd, "client does not understand the telemetry command")
        }
        e => tracing::warn!(kind = e.kind().as_str(), error = %e, "telemetry session failed"),
    }

    if let Err(e) = conn.close().await {
        tracing::debug!(error = %e, "close after telemetry session failed");
    }
    tracing::info!("telemetry connection closed");

    reason
}

async fn poll_until_failure<D: Duplex>(
    conn: &mut D,
    store: &TelemetryStore,
    settings: PollSettings,
) -> TelemetryError {
    loop {
        if let Err(e) = poll_once(conn, store, settings).await {
            return e;
        }
    }
}

/// One cycle: sleep, send the command, await and classify the reply.
async fn poll_once<D: Duplex>(
    conn: &mut D,
    store: &TelemetryStore,
    settings: PollSettings,
) -> Result<()> {
    sleep(settings.poll_interval).await;

    let cmd = Command::GetTelemetry;
    timeout(settings.reply_timeout, conn.send(Message::Binary(cmd.encode().to_vec())))
        .await
        .map_err(|_| TelemetryError::Timeout(settings.reply_timeout))??;

    let reply = timeout(settings.reply_timeout, await_reply(conn))
        .await
        .map_err(|_| TelemetryError::Timeout(settings.reply_timeout))??;

    match reply {
        Reply::Telemetry(report) => {
            tracing::trace!(bytes = report.len(), "telemetry report received");
            store.append(report);
            Ok(())
        }
        Reply::UnknownCommand => Err(TelemetryError::PeerUnsupported(cmd)),
    }
}

/// Wait for the next reply frame, skipping keepalive traffic.
async fn await_reply<D: Duplex>(conn: &mut D) -> Result<Reply> {
    loop {
        let msg = conn
            .recv()
            .await
            .ok_or_else(|| TelemetryError::TransportFault("connection closed by peer".into()))??;

        match decode(msg)? {
            Inbound::Reply(reply) => return Ok(reply),
            Inbound::Ping(_) | Inbound::Pong(_) => continue,
            // anything but a binary reply breaks the protocol, close included
            Inbound::Close => {
                return Err(TelemetryError::ProtocolViolation(
                    "expected binary reply, got close frame".into(),
                ))
            }
        }
    }
}
