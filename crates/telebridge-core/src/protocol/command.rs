//! One-byte command and status codes.

use crate::error::{Result, TelemetryError};

/// Request sent from the server to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    /// Ask the client for its current telemetry report.
    GetTelemetry = 0,
}

impl Command {
    /// Wire value.
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Frame body for this command (always exactly one byte).
    pub const fn encode(self) -> [u8; 1] {
        [self.as_u8()]
    }

    /// Decode a command byte (client side).
    pub fn decode(b: u8) -> Result<Self> {
        match b {
            0 => Ok(Command::GetTelemetry),
            other => Err(TelemetryError::InvalidCommand(other)),
        }
    }
}

/// How the client handled a [`Command`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Status {
    Success = 0,
    UnknownCommand = 1,
}

impl Status {
    /// Wire value.
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    pub const fn encode(self) -> [u8; 1] {
        [self.as_u8()]
    }

    /// Decode a status byte. Anything other than `0x00`/`0x01` is rejected.
    pub fn decode(b: u8) -> Result<Self> {
        match b {
            0 => Ok(Status::Success),
            1 => Ok(Status::UnknownCommand),
            other => Err(TelemetryError::InvalidStatus(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_is_one_byte() {
        assert_eq!(Command::GetTelemetry.encode(), [0x00]);
        assert_eq!(Command::decode(0x00).ok(), Some(Command::GetTelemetry));
        assert!(matches!(Command::decode(0x05), Err(TelemetryError::InvalidCommand(0x05))));
    }

    #[test]
    fn status_decode_is_total() {
        assert_eq!(Status::decode(0).ok(), Some(Status::Success));
        assert_eq!(Status::decode(1).ok(), Some(Status::UnknownCommand));
        for b in 2..=u8::MAX {
            assert!(matches!(Status::decode(b), Err(TelemetryError::InvalidStatus(x)) if x == b));
        }
        assert_eq!(Status::UnknownCommand.encode(), [0x01]);
    }
}
