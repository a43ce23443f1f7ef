//! telebridge client: an SDK-side telemetry reporter.
//!
//! Records per-bucket, per-node request counters and latency histograms
//! ([`recorder`]), renders them as Prometheus text on request, and answers
//! the gateway's `GetTelemetry` polls over a WebSocket ([`reporter`]).
//! [`load`] generates a synthetic workload for demos and soak runs.

pub mod load;
pub mod recorder;
pub mod reporter;

pub use recorder::SdkMetrics;
pub use reporter::run_reporter;
