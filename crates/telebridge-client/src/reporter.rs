//! Client side of the telemetry protocol.
//!
//! The reporter dials the gateway's telemetry endpoint and answers every
//! binary command frame with one reply frame. `GetTelemetry` is answered
//! with `Success` and a fresh export of the recorder; any other command byte
//! (or an empty frame) is answered with `UnknownCommand`.

use std::sync::Arc;

use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use telebridge_core::protocol::{encode_reply, Command, Reply};
use telebridge_core::{Result, TelemetryError};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::recorder::SdkMetrics;

type ClientStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Build the reply frame for one inbound command frame.
pub fn answer(frame: &[u8], metrics: &SdkMetrics) -> Bytes {
    let reply = match frame.first().copied().map(Command::decode) {
        Some(Ok(Command::GetTelemetry)) => Reply::Telemetry(metrics.export_now()),
        Some(Err(e)) => {
            debug!(error = %e, "declining command");
            Reply::UnknownCommand
        }
        None => {
            debug!("declining empty command frame");
            Reply::UnknownCommand
        }
    };
    encode_reply(&reply)
}

/// Connect to `url` and answer commands until the server closes the
/// connection, the transport fails, or `cancel` fires.
///
/// The connection is closed on every exit path. Returns `Ok(())` when the
/// server ended the session cleanly.
pub async fn run_reporter(
    url: &str,
    metrics: Arc<SdkMetrics>,
    cancel: CancellationToken,
) -> Result<()> {
    let (mut ws, _resp) = connect_async(url)
        .await
        .map_err(|e| TelemetryError::TransportFault(format!("connect {url}: {e}")))?;
    info!(url, agent = metrics.agent(), "reporter connected");

    let res = tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(TelemetryError::Cancelled),
        res = serve_commands(&mut ws, &metrics) => res,
    };

    if let Err(e) = ws.close(None).await {
        debug!(error = %e, "close after session end failed");
    }
    res
}

async fn serve_commands(ws: &mut ClientStream, metrics: &SdkMetrics) -> Result<()> {
    while let Some(msg) = ws.next().await {
        let msg = msg.map_err(|e| TelemetryError::TransportFault(e.to_string()))?;
        match msg {
            Message::Binary(frame) => {
                let reply = answer(&frame, metrics);
                ws.send(Message::Binary(reply.to_vec()))
                    .await
                    .map_err(|e| TelemetryError::TransportFault(e.to_string()))?;
            }
            Message::Close(frame) => {
                info!(?frame, "server closed connection");
                return Ok(());
            }
            Message::Text(_) => warn!("ignoring text frame"),
            // pongs for inbound pings are queued by tungstenite itself
            Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
        }
    }
    Ok(())
}
