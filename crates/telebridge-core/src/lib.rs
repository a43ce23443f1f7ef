//! telebridge core: telemetry wire protocol, error types, and the telemetry store.
//!
//! This crate defines the byte-level contract between the server and a
//! telemetry client, plus the store the poll loop feeds and the scrape
//! endpoint drains. It carries no transport or runtime dependencies so the
//! gateway, tests, and client tooling can all share it.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Malformed replies surface as `TelemetryError` so a misbehaving client can
//! only end its own session.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod normalize;
pub mod protocol;
pub mod store;

/// Shared result type.
pub use error::{ErrorKind, Result, TelemetryError};
pub use store::TelemetryStore;
