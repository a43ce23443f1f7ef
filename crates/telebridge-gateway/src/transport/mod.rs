//! Transport layer (WebSocket).
//!
//! Exposes the upgrade handlers, the `Duplex` seam session loops are written
//! against, and the codec that classifies inbound telemetry frames.

pub mod codec;
pub mod duplex;
pub mod ws;
