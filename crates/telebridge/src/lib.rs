//! Top-level facade crate for telebridge.
//!
//! Re-exports the core protocol/store types, the gateway library and the
//! reporting client so users can depend on a single crate.

pub mod core {
    pub use telebridge_core::*;
}

pub mod gateway {
    pub use telebridge_gateway::*;
}

pub mod client {
    pub use telebridge_client::*;
}
