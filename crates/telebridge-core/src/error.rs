//! Shared error type across telebridge crates.

use std::time::Duration;

use thiserror::Error;

use crate::protocol::Command;

/// Stable error taxonomy used in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No reply within the deadline.
    Timeout,
    /// Wrong frame type or malformed reply.
    ProtocolViolation,
    /// Peer answered, but declined the command.
    PeerUnsupported,
    /// Connection-level I/O failure.
    TransportFault,
    /// Session teardown requested by the server.
    Cancelled,
    /// Rejected configuration.
    InvalidConfig,
    /// Internal server error.
    Internal,
}

impl ErrorKind {
    /// String representation used as a structured log field.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Timeout => "TIMEOUT",
            ErrorKind::ProtocolViolation => "PROTOCOL_VIOLATION",
            ErrorKind::PeerUnsupported => "PEER_UNSUPPORTED",
            ErrorKind::TransportFault => "TRANSPORT_FAULT",
            ErrorKind::Cancelled => "CANCELLED",
            ErrorKind::InvalidConfig => "INVALID_CONFIG",
            ErrorKind::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Unified error type used by core and gateway.
///
/// Every variant that can end a telemetry session leads to the same terminal
/// action (close the connection); the variants only differ in how the end is
/// logged.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("no reply within {0:?}")]
    Timeout(Duration),
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),
    #[error("invalid status byte 0x{0:02x}")]
    InvalidStatus(u8),
    #[error("invalid command byte 0x{0:02x}")]
    InvalidCommand(u8),
    #[error("peer does not understand {0:?}")]
    PeerUnsupported(Command),
    #[error("transport fault: {0}")]
    TransportFault(String),
    #[error("session cancelled")]
    Cancelled,
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl TelemetryError {
    /// Map to the stable taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TelemetryError::Timeout(_) => ErrorKind::Timeout,
            TelemetryError::ProtocolViolation(_)
            | TelemetryError::InvalidStatus(_)
            | TelemetryError::InvalidCommand(_) => ErrorKind::ProtocolViolation,
            TelemetryError::PeerUnsupported(_) => ErrorKind::PeerUnsupported,
            TelemetryError::TransportFault(_) => ErrorKind::TransportFault,
            TelemetryError::Cancelled => ErrorKind::Cancelled,
            TelemetryError::InvalidConfig(_) => ErrorKind::InvalidConfig,
            TelemetryError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// `false` only for an externally requested teardown.
    pub fn is_failure(&self) -> bool {
        !matches!(self, TelemetryError::Cancelled)
    }
}
