//! Telemetry wire protocol.
//!
//! Every exchange is one binary frame each way:
//! - server -> client: a single [`Command`] byte.
//! - client -> server: a [`Status`] byte, followed by UTF-8 text when the
//!   status is `Success`.
//!
//! All decoders are total: unknown bytes map to an explicit error variant
//! instead of a guessed value, so the gateway can close the session cleanly.

pub mod command;
pub mod reply;

pub use command::{Command, Status};
pub use reply::{decode_reply, encode_reply, Reply};
