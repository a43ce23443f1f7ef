//! Debug services that share the WebSocket transport but not the telemetry store.

pub mod echo;

pub use echo::run_echo_session;
