//! Message-framed duplex connection seam.
//!
//! Session loops talk to this trait instead of `axum::extract::ws::WebSocket`
//! directly, so they can be driven by a scripted peer in tests.

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};

use telebridge_core::error::{Result, TelemetryError};

#[async_trait]
pub trait Duplex: Send {
    /// Send one frame.
    async fn send(&mut self, msg: Message) -> Result<()>;

    /// Next inbound frame; `None` once the peer is gone.
    async fn recv(&mut self) -> Option<Result<Message>>;

    /// Close the connection. Safe to call on an already-closed connection.
    async fn close(&mut self) -> Result<()>;
}

#[async_trait]
impl Duplex for WebSocket {
    async fn send(&mut self, msg: Message) -> Result<()> {
        SinkExt::send(self, msg)
            .await
            .map_err(|e| TelemetryError::TransportFault(format!("send failed: {e}")))
    }

    async fn recv(&mut self) -> Option<Result<Message>> {
        StreamExt::next(self)
            .await
            .map(|r| r.map_err(|e| TelemetryError::TransportFault(format!("receive failed: {e}"))))
    }

    async fn close(&mut self) -> Result<()> {
        SinkExt::close(self)
            .await
            .map_err(|e| TelemetryError::TransportFault(format!("close failed: {e}")))
    }
}
