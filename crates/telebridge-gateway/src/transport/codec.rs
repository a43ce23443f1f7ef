//! Decode-once codec for telemetry replies.
//!
//! - Binary frames => `Reply` (panic-free `bytes::Buf` parsing in core)
//! - Text frames => protocol violation (telemetry is binary only)
//! - Ping/Pong/Close are surfaced for lifecycle management

use axum::extract::ws::Message;
use bytes::Bytes;

use telebridge_core::{
    error::{Result, TelemetryError},
    protocol::{decode_reply, Reply},
};

#[derive(Debug)]
pub enum Inbound {
    Reply(Reply),
    Ping(Vec<u8>),
    Pong(Vec<u8>),
    Close,
}

pub fn decode(msg: Message) -> Result<Inbound> {
    match msg {
        Message::Binary(b) => Ok(Inbound::Reply(decode_reply(Bytes::from(b))?)),
        Message::Text(s) => Err(TelemetryError::ProtocolViolation(format!(
            "expected binary reply, got text frame ({} bytes)",
            s.len()
        ))),
        Message::Ping(v) => Ok(Inbound::Ping(v)),
        Message::Pong(v) => Ok(Inbound::Pong(v)),
        Message::Close(_) => Ok(Inbound::Close),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_frames_decode_to_replies() {
        match decode(Message::Binary(b"\x00cpu=10".to_vec())) {
            Ok(Inbound::Reply(Reply::Telemetry(r))) => assert_eq!(r, "cpu=10"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            decode(Message::Binary(vec![0x01])),
            Ok(Inbound::Reply(Reply::UnknownCommand))
        ));
    }

    #[test]
    fn text_frames_are_violations() {
        let err = decode(Message::Text("\u{0}cpu=10".into())).unwrap_err();
        assert_eq!(err.kind().as_str(), "PROTOCOL_VIOLATION");
    }

    #[test]
    fn control_frames_pass_through() {
        assert!(matches!(decode(Message::Ping(vec![1])), Ok(Inbound::Ping(p)) if p == [1]));
        assert!(matches!(decode(Message::Close(None)), Ok(Inbound::Close)));
    }
}
