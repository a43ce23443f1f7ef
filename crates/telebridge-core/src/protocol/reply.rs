//! Client reply frames (panic-free).
//!
//! Parsing rules:
//! - Never index (`buf[0]`); always use `Buf` and `remaining()` checks.
//! - Never `unwrap()` / `expect()` / `panic!()` in production paths.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{Result, TelemetryError};
use crate::protocol::command::Status;

/// Decoded client reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// `Success` followed by the UTF-8 report (possibly empty).
    Telemetry(String),
    /// The client does not understand the command it was sent.
    UnknownCommand,
}

impl Reply {
    pub fn status(&self) -> Status {
        match self {
            Reply::Telemetry(_) => Status::Success,
            Reply::UnknownCommand => Status::UnknownCommand,
        }
    }
}

/// Decode a reply from a binary frame body.
///
/// Bytes following `UnknownCommand` are ignored.
pub fn decode_reply(mut buf: Bytes) -> Result<Reply> {
    if !buf.has_remaining() {
        return Err(TelemetryError::ProtocolViolation("empty reply frame".into()));
    }

    match Status::decode(buf.get_u8())? {
        Status::Success => {
            let payload = String::from_utf8(buf.to_vec()).map_err(|e| {
                TelemetryError::ProtocolViolation(format!("telemetry payload is not utf-8: {e}"))
            })?;
            Ok(Reply::Telemetry(payload))
        }
        Status::UnknownCommand => Ok(Reply::UnknownCommand),
    }
}

/// Encode a reply the way a conforming client sends it.
pub fn encode_reply(reply: &Reply) -> Bytes {
    match reply {
        Reply::Telemetry(report) => {
            let mut out = BytesMut::with_capacity(1 + report.len());
            out.put_u8(reply.status().as_u8());
            out.put_slice(report.as_bytes());
            out.freeze()
        }
        Reply::UnknownCommand => Bytes::copy_from_slice(&reply.status().encode()),
    }
}
