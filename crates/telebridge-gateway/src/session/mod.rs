//! Live session bookkeeping and cancellation.

pub mod registry;

pub use registry::{SessionGuard, SessionKind, SessionRegistry};
