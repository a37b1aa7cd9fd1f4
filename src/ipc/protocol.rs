//! Framing for the i3-ipc compatible wire protocol.
//!
//! Every message is a 14 byte header followed by the payload:
//!
//! ```text
//! "i3-ipc" | payload length: u32 LE | message type: u32 LE | payload
//! ```

use std::io::{Read, Write};

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

pub const MAGIC: &[u8; 6] = b"i3-ipc";
pub const HEADER_SIZE: usize = 14;
pub const MAX_PAYLOAD: usize = 64 * 1024 * 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[derive(TryFromPrimitive, IntoPrimitive, EnumString, Display)]
#[repr(u32)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum MessageType {
    RunCommand = 0,
    GetWorkspaces = 1,
    GetOutputs = 3,
    GetTree = 4,
    GetVersion = 7,
}

#[derive(Debug, Error)]
pub enum IpcError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid i3-ipc magic")]
    BadMagic,
    #[error("IPC payload too large: {0} bytes")]
    PayloadTooLarge(usize),
    #[error("unknown message type {0}")]
    UnknownMessageType(u32),
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no socket path available")]
    SocketPathUnavailable,
    #[error("window manager is not accepting requests")]
    Disconnected,
    #[error("reply of type {got} to a request of type {sent}")]
    UnexpectedReply { sent: u32, got: u32 },
}

/// One frame. The type stays raw so that unknown requests can be answered
/// with the same type they arrived with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub kind: u32,
    pub payload: Vec<u8>,
}

impl Message {
    pub fn new(kind: impl Into<u32>, payload: impl Into<Vec<u8>>) -> Message {
        Message { kind: kind.into(), payload: payload.into() }
    }

    pub fn message_type(&self) -> Result<MessageType, IpcError> {
        MessageType::try_from(self.kind).map_err(|_| IpcError::UnknownMessageType(self.kind))
    }

    pub fn payload_str(&self) -> std::borrow::Cow<'_, str> { String::from_utf8_lossy(&self.payload) }

    pub fn write_to(&self, w: &mut impl Write) -> Result<(), IpcError> {
        write_message(w, self.kind, &self.payload)
    }

    pub fn read_from(r: &mut impl Read) -> Result<Message, IpcError> { read_message(r) }
}

pub fn write_message(w: &mut impl Write, kind: u32, payload: &[u8]) -> Result<(), IpcError> {
    if payload.len() > MAX_PAYLOAD {
        return Err(IpcError::PayloadTooLarge(payload.len()));
    }
    let len = payload.len() as u32;
    let mut header = [0u8; HEADER_SIZE];
    header[..6].copy_from_slice(MAGIC);
    header[6..10].copy_from_slice(&len.to_le_bytes());
    header[10..14].copy_from_slice(&kind.to_le_bytes());
    w.write_all(&header)?;
    if !payload.is_empty() {
        w.write_all(payload)?;
    }
    w.flush()?;
    Ok(())
}

/// Reads one frame, looping over short reads until header and payload are complete.
pub fn read_message(r: &mut impl Read) -> Result<Message, IpcError> {
    let mut header = [0u8; HEADER_SIZE];
    r.read_exact(&mut header)?;

    if &header[..6] != MAGIC {
        return Err(IpcError::BadMagic);
    }

    let len = u32::from_le_bytes([header[6], header[7], header[8], header[9]]) as usize;
    let kind = u32::from_le_bytes([header[10], header[11], header[12], header[13]]);

    if len > MAX_PAYLOAD {
        return Err(IpcError::PayloadTooLarge(len));
    }

    let mut payload = vec![0u8; len];
    if len > 0 {
        r.read_exact(&mut payload)?;
    }

    Ok(Message { kind, payload })
}

/// Result of one command in a `RUN_COMMAND` request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CommandOutcome {
    pub fn ok() -> Self { CommandOutcome { success: true, error: None } }

    pub fn failed(error: impl Into<String>) -> Self {
        CommandOutcome {
            success: false,
            error: Some(error.into()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionReply {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub human_readable: String,
}

impl VersionReply {
    pub fn current() -> Self {
        let parse = |s: &str| s.parse().unwrap_or(0);
        VersionReply {
            major: parse(env!("CARGO_PKG_VERSION_MAJOR")),
            minor: parse(env!("CARGO_PKG_VERSION_MINOR")),
            patch: parse(env!("CARGO_PKG_VERSION_PATCH")),
            human_readable: format!("spire {}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use pretty_assertions::assert_eq;

    use super::*;

    /// Hands out at most `chunk` bytes per read.
    struct Trickle<'a> {
        data: &'a [u8],
        chunk: usize,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let n = self.chunk.min(buf.len()).min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    #[test]
    fn header_layout() {
        let mut buf = Vec::new();
        write_message(&mut buf, MessageType::GetTree.into(), b"{}").unwrap();
        assert_eq!(HEADER_SIZE + 2, buf.len());
        assert_eq!(b"i3-ipc", &buf[..6]);
        assert_eq!(&[2, 0, 0, 0], &buf[6..10]);
        assert_eq!(&[4, 0, 0, 0], &buf[10..14]);
        assert_eq!(b"{}", &buf[14..]);
    }

    #[test]
    fn short_reads_are_completed() {
        let mut buf = Vec::new();
        Message::new(MessageType::RunCommand, "workspace 2").write_to(&mut buf).unwrap();
        let mut reader = Trickle { data: &buf, chunk: 3 };
        let msg = Message::read_from(&mut reader).unwrap();
        assert_eq!(Ok(MessageType::RunCommand), msg.message_type().map_err(|e| e.to_string()));
        assert_eq!("workspace 2", msg.payload_str());
    }

    #[test]
    fn empty_payload() {
        let mut buf = Vec::new();
        write_message(&mut buf, 7, b"").unwrap();
        let msg = read_message(&mut Cursor::new(buf)).unwrap();
        assert_eq!(Message { kind: 7, payload: vec![] }, msg);
    }

    #[test]
    fn bad_magic_is_rejected() {
        let mut buf = Vec::new();
        write_message(&mut buf, 1, b"").unwrap();
        buf[0] = b'x';
        assert!(matches!(read_message(&mut Cursor::new(buf)), Err(IpcError::BadMagic)));
    }

    #[test]
    fn oversized_length_is_rejected() {
        let mut buf = MAGIC.to_vec();
        buf.extend_from_slice(&u32::MAX.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());
        assert!(matches!(
            read_message(&mut Cursor::new(buf)),
            Err(IpcError::PayloadTooLarge(_))
        ));
    }

    #[test]
    fn truncated_payload_is_an_io_error() {
        let mut buf = Vec::new();
        write_message(&mut buf, 0, b"workspace 1").unwrap();
        buf.truncate(buf.len() - 3);
        assert!(matches!(read_message(&mut Cursor::new(buf)), Err(IpcError::Io(_))));
    }

    #[test]
    fn unknown_types_keep_their_number() {
        let msg = Message::new(2u32, Vec::new());
        assert!(matches!(msg.message_type(), Err(IpcError::UnknownMessageType(2))));
    }

    #[test]
    fn message_types_parse_by_name() {
        assert_eq!(Ok(MessageType::GetWorkspaces), "get_workspaces".parse());
        assert_eq!(Ok(MessageType::GetTree), "GET_TREE".parse());
        assert_eq!(3u32, u32::from(MessageType::GetOutputs));
        assert_eq!("get_version", MessageType::GetVersion.to_string());
    }

    #[test]
    fn command_outcome_omits_missing_error() {
        assert_eq!(r#"{"success":true}"#, serde_json::to_string(&CommandOutcome::ok()).unwrap());
        assert_eq!(
            r#"{"success":false,"error":"nope"}"#,
            serde_json::to_string(&CommandOutcome::failed("nope")).unwrap()
        );
    }
}
