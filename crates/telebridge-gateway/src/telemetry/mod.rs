//! Telemetry polling over a duplex connection.
//!
//! One loop per `/_appTelemetry` session: wait, send `GetTelemetry`, wait a
//! bounded time for the reply, append successful reports to the shared
//! [`TelemetryStore`](telebridge_core::TelemetryStore). Any violation, timeout,
//! transport fault or cancellation ends the session; the connection is closed
//! on every exit path.

pub mod poller;

pub use poller::{run_telemetry_session, PollSettings};
