//! telebridge gateway library entry.
//!
//! This crate wires the WebSocket transport, the telemetry poll loop, the
//! echo relay and the scrape endpoint into one axum application. It is
//! consumed by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod ops;
pub mod router;
pub mod services;
pub mod session;
pub mod telemetry;
pub mod transport;
