// JDWP protocol definitions and packet handling
//
// Reference: https://docs.oracle.com/javase/8/docs/platform/jpda/jdwp/jdwp-protocol.html

use bytes::{Buf, BufMut, BytesMut};
use thiserror::Error;

// JDWP uses big-endian (network byte order) for all multi-byte values

pub type JdwpResult<T> = Result<T, JdwpError>;

#[derive(Debug, Error)]
pub enum JdwpError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Invalid handshake")]
    InvalidHandshake,

    #[error("JDWP error code {0}: {1}")]
    JdwpErrorCode(u16, String),

    #[error("Connection closed")]
    ConnectionClosed,
}

impl JdwpError {
    /// True when the VM rejected a command because it is gone
    pub fn is_vm_dead(&self) -> bool {
        matches!(self, JdwpError::JdwpErrorCode(error_codes::VM_DEAD, _) | JdwpError::ConnectionClosed)
    }
}

// JDWP handshake string
pub const JDWP_HANDSHAKE: &[u8] = b"JDWP-Handshake";

// Packet structure:
// length (4 bytes) - includes header
// id (4 bytes)
// flags (1 byte) - 0x00 = command, 0x80 = reply
// [Command packet: command set (1 byte) + command (1 byte)]
// [Reply packet: error code (2 bytes)]
// data (variable)

pub const HEADER_SIZE: usize = 11;
pub const REPLY_FLAG: u8 = 0x80;

pub mod error_codes {
    pub const NONE: u16 = 0;
    pub const INVALID_THREAD: u16 = 10;
    pub const THREAD_NOT_SUSPENDED: u16 = 13;
    pub const INVALID_OBJECT: u16 = 20;
    pub const INVALID_CLASS: u16 = 21;
    pub const INVALID_METHODID: u16 = 23;
    pub const INVALID_LOCATION: u16 = 24;
    pub const INVALID_FRAMEID: u16 = 30;
    pub const OPAQUE_FRAME: u16 = 32;
    pub const DUPLICATE: u16 = 40;
    pub const NOT_FOUND: u16 = 41;
    pub const NOT_IMPLEMENTED: u16 = 99;
    pub const ABSENT_INFORMATION: u16 = 101;
    pub const INVALID_EVENT_TYPE: u16 = 102;
    pub const ILLEGAL_ARGUMENT: u16 = 103;
    pub const ACCESS_DENIED: u16 = 111;
    pub const VM_DEAD: u16 = 112;
    pub const INTERNAL: u16 = 113;
}

#[derive(Debug, Clone)]
pub struct CommandPacket {
    pub id: u32,
    pub command_set: u8,
    pub command: u8,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct ReplyPacket {
    pub id: u32,
    pub error_code: u16,
    pub data: Vec<u8>,
}

impl CommandPacket {
    pub fn new(id: u32, command_set: u8, command: u8) -> Self {
        Self {
            id,
            command_set,
            command,
            data: Vec::new(),
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let length = HEADER_SIZE + self.data.len();
        let mut buf = BytesMut::with_capacity(length);

        buf.put_u32(length as u32);
        buf.put_u32(self.id);
        buf.put_u8(0x00); // command flag
        buf.put_u8(self.command_set);
        buf.put_u8(self.command);
        buf.put_slice(&self.data);

        buf.to_vec()
    }

    /// Decode a full command packet (header included)
    pub fn decode(mut buf: &[u8]) -> JdwpResult<Self> {
        if buf.len() < HEADER_SIZE {
            return Err(JdwpError::Protocol("Command packet too short".to_string()));
        }

        let _length = buf.get_u32();
        let id = buf.get_u32();
        let flags = buf.get_u8();

        if flags == REPLY_FLAG {
            return Err(JdwpError::Protocol("Expected command packet, got reply".to_string()));
        }

        let command_set = buf.get_u8();
        let command = buf.get_u8();

        Ok(Self {
            id,
            command_set,
            command,
            data: buf.to_vec(),
        })
    }
}

impl ReplyPacket {
    pub fn new(id: u32, error_code: u16, data: Vec<u8>) -> Self {
        Self {
            id,
            error_code,
            data,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let length = HEADER_SIZE + self.data.len();
        let mut buf = BytesMut::with_capacity(length);

        buf.put_u32(length as u32);
        buf.put_u32(self.id);
        buf.put_u8(REPLY_FLAG);
        buf.put_u16(self.error_code);
        buf.put_slice(&self.data);

        buf.to_vec()
    }

    pub fn decode(mut buf: &[u8]) -> JdwpResult<Self> {
        if buf.len() < HEADER_SIZE {
            return Err(JdwpError::Protocol("Reply packet too short".to_string()));
        }

        let _length = buf.get_u32();
        let id = buf.get_u32();
        let flags = buf.get_u8();

        if flags != REPLY_FLAG {
            return Err(JdwpError::Protocol(format!("Invalid reply flag: {:#x}", flags)));
        }

        let error_code = buf.get_u16();
        let data = buf.to_vec();

        Ok(Self {
            id,
            error_code,
            data,
        })
    }

    pub fn is_error(&self) -> bool {
        self.error_code != error_codes::NONE
    }

    pub fn check_error(&self) -> JdwpResult<()> {
        if self.is_error() {
            Err(JdwpError::JdwpErrorCode(
                self.error_code,
                self.error_message().to_string(),
            ))
        } else {
            Ok(())
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn error_message(&self) -> &'static str {
        use error_codes::*;

        match self.error_code {
            NONE => "NONE",
            INVALID_THREAD => "INVALID_THREAD",
            THREAD_NOT_SUSPENDED => "THREAD_NOT_SUSPENDED",
            INVALID_OBJECT => "INVALID_OBJECT",
            INVALID_CLASS => "INVALID_CLASS",
            INVALID_METHODID => "INVALID_METHODID",
            INVALID_LOCATION => "INVALID_LOCATION",
            INVALID_FRAMEID => "INVALID_FRAMEID",
            OPAQUE_FRAME => "OPAQUE_FRAME",
            DUPLICATE => "DUPLICATE",
            NOT_FOUND => "NOT_FOUND",
            NOT_IMPLEMENTED => "NOT_IMPLEMENTED",
            ABSENT_INFORMATION => "ABSENT_INFORMATION",
            INVALID_EVENT_TYPE => "INVALID_EVENT_TYPE",
            ILLEGAL_ARGUMENT => "ILLEGAL_ARGUMENT",
            ACCESS_DENIED => "ACCESS_DENIED",
            VM_DEAD => "VM_DEAD",
            INTERNAL => "INTERNAL",
            _ => "UNKNOWN_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_packet_encode() {
        let packet = CommandPacket::new(1, 11, 7);
        let encoded = packet.encode();

        assert_eq!(encoded.len(), HEADER_SIZE);
        assert_eq!(&encoded[0..4], &[0, 0, 0, 11]); // length (big-endian)
        assert_eq!(&encoded[4..8], &[0, 0, 0, 1]); // id (big-endian)
        assert_eq!(encoded[8], 0x00); // command flag
        assert_eq!(encoded[9], 11); // command set
        assert_eq!(encoded[10], 7); // command
    }

    #[test]
    fn test_command_packet_decode_keeps_payload() {
        let mut packet = CommandPacket::new(0x0102_0304, 15, 1);
        packet.data = vec![1, 2, 0, 0, 0, 0];

        let decoded = CommandPacket::decode(&packet.encode()).unwrap();
        assert_eq!(decoded.id, 0x0102_0304);
        assert_eq!(decoded.command_set, 15);
        assert_eq!(decoded.command, 1);
        assert_eq!(decoded.data, vec![1, 2, 0, 0, 0, 0]);
    }

    #[test]
    fn test_reply_packet_decode() {
        let reply_data = vec![
            0, 0, 0, 11, // length = 11 (big-endian)
            0, 0, 0, 1,  // id = 1 (big-endian)
            0x80,        // reply flag
            0, 0,        // error code = 0 (big-endian)
        ];

        let packet = ReplyPacket::decode(&reply_data).unwrap();
        assert_eq!(packet.id, 1);
        assert_eq!(packet.error_code, 0);
        assert!(!packet.is_error());
    }

    #[test]
    fn test_reply_error_code_maps_to_error() {
        let packet = ReplyPacket::new(9, error_codes::THREAD_NOT_SUSPENDED, Vec::new());
        let decoded = ReplyPacket::decode(&packet.encode()).unwrap();

        match decoded.check_error() {
            Err(JdwpError::JdwpErrorCode(13, msg)) => assert_eq!(msg, "THREAD_NOT_SUSPENDED"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_vm_dead_detection() {
        let dead = JdwpError::JdwpErrorCode(error_codes::VM_DEAD, "VM_DEAD".to_string());
        assert!(dead.is_vm_dead());
        assert!(JdwpError::ConnectionClosed.is_vm_dead());
        assert!(!JdwpError::InvalidHandshake.is_vm_dead());
    }
}
