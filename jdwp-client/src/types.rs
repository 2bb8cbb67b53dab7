// JDWP type definitions
//
// Common types used across the JDWP protocol

use crate::protocol::JdwpResult;
use crate::reader::{read_u64, read_u8};
use bytes::BufMut;
use serde::{Deserialize, Serialize};

// Object IDs are 8 bytes in JDWP
pub type ObjectId = u64;
pub type ThreadId = ObjectId;

pub type ReferenceTypeId = u64;
pub type MethodId = u64;

/// Type tag of a location's declaring type
pub mod type_tags {
    pub const CLASS: u8 = 1;
    pub const INTERFACE: u8 = 2;
    pub const ARRAY: u8 = 3;
}

// Location identifies a code position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub type_tag: u8, // 1=class, 2=interface, 3=array
    pub class_id: ReferenceTypeId,
    pub method_id: MethodId,
    pub index: u64, // bytecode index (PC)
}

impl Location {
    /// Location inside a class (the common case for breakpoints)
    pub fn in_class(class_id: ReferenceTypeId, method_id: MethodId, index: u64) -> Self {
        Self {
            type_tag: type_tags::CLASS,
            class_id,
            method_id,
            index,
        }
    }

    pub fn read(buf: &mut &[u8]) -> JdwpResult<Self> {
        let type_tag = read_u8(buf)?;
        let class_id = read_u64(buf)?;
        let method_id = read_u64(buf)?;
        let index = read_u64(buf)?;

        Ok(Self {
            type_tag,
            class_id,
            method_id,
            index,
        })
    }

    pub fn write(&self, buf: &mut Vec<u8>) {
        buf.put_u8(self.type_tag);
        buf.put_u64(self.class_id);
        buf.put_u64(self.method_id);
        buf.put_u64(self.index);
    }
}

// Thread status values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u32)]
pub enum ThreadStatus {
    Zombie = 0,
    Running = 1,
    Sleeping = 2,
    Monitor = 3,
    Wait = 4,
}

impl ThreadStatus {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Zombie),
            1 => Some(Self::Running),
            2 => Some(Self::Sleeping),
            3 => Some(Self::Monitor),
            4 => Some(Self::Wait),
            _ => None,
        }
    }
}

// Suspend status values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u32)]
pub enum SuspendStatus {
    Running = 0,
    Suspended = 1,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_wire_layout() {
        let location = Location::in_class(0x10, 0x20, 7);
        let mut buf = Vec::new();
        location.write(&mut buf);

        assert_eq!(buf.len(), 25);
        assert_eq!(buf[0], type_tags::CLASS);
        assert_eq!(&buf[1..9], &[0, 0, 0, 0, 0, 0, 0, 0x10]);
        assert_eq!(&buf[17..25], &[0, 0, 0, 0, 0, 0, 0, 7]);

        let mut slice = buf.as_slice();
        assert_eq!(Location::read(&mut slice).unwrap(), location);
        assert!(slice.is_empty());
    }

    #[test]
    fn test_thread_status_decoding() {
        assert_eq!(ThreadStatus::from_u32(3), Some(ThreadStatus::Monitor));
        assert_eq!(ThreadStatus::from_u32(42), None);
    }
}
