// JDWP event handling
//
// Events are sent from the JVM to notify about breakpoints, steps, etc.

use crate::commands::{event_kinds, modifier_kinds};
use crate::eventrequest::{RequestId, SuspendPolicy};
use crate::protocol::{JdwpError, JdwpResult};
use crate::reader::{read_count, read_i32, read_u64, read_u8};
use crate::types::*;
use bytes::BufMut;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Composite event packet (can contain multiple events)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventSet {
    pub suspend_policy: SuspendPolicy,
    pub events: Vec<Event>,
}

/// Single event within an event set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub kind: u8,
    pub request_id: RequestId,
    pub details: EventKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EventKind {
    VMStart {
        thread: ThreadId,
    },
    VMDeath,
    ThreadStart {
        thread: ThreadId,
    },
    ThreadDeath {
        thread: ThreadId,
    },
    Breakpoint {
        thread: ThreadId,
        location: Location,
    },
    Step {
        thread: ThreadId,
        location: Location,
    },
    Unknown {
        kind: u8,
    },
}

impl EventKind {
    /// Thread the event happened on, when it has one
    pub fn thread(&self) -> Option<ThreadId> {
        match self {
            EventKind::VMStart { thread }
            | EventKind::ThreadStart { thread }
            | EventKind::ThreadDeath { thread }
            | EventKind::Breakpoint { thread, .. }
            | EventKind::Step { thread, .. } => Some(*thread),
            EventKind::VMDeath | EventKind::Unknown { .. } => None,
        }
    }
}

impl EventSet {
    /// First thread mentioned by any event in the set
    pub fn thread(&self) -> Option<ThreadId> {
        self.events.iter().find_map(|e| e.details.thread())
    }
}

// Event request modifiers
#[derive(Debug, Clone, PartialEq)]
pub enum EventModifier {
    Count(i32),
    ClassExclude(String),
    LocationOnly(Location),
    Step {
        thread: ThreadId,
        size: i32,
        depth: i32,
    },
}

impl EventModifier {
    /// Append the modifier (kind byte + payload) to an EventRequest.Set body
    pub fn write(&self, buf: &mut Vec<u8>) {
        match self {
            EventModifier::Count(count) => {
                buf.put_u8(modifier_kinds::COUNT);
                buf.put_i32(*count);
            }
            EventModifier::ClassExclude(pattern) => {
                buf.put_u8(modifier_kinds::CLASS_EXCLUDE);
                write_string(buf, pattern);
            }
            EventModifier::LocationOnly(location) => {
                buf.put_u8(modifier_kinds::LOCATION_ONLY);
                location.write(buf);
            }
            EventModifier::Step {
                thread,
                size,
                depth,
            } => {
                buf.put_u8(modifier_kinds::STEP);
                buf.put_u64(*thread);
                buf.put_i32(*size);
                buf.put_i32(*depth);
            }
        }
    }
}

/// Write a JDWP string (4-byte length prefix + UTF-8 bytes)
pub(crate) fn write_string(buf: &mut Vec<u8>, value: &str) {
    buf.put_u32(value.len() as u32);
    buf.extend_from_slice(value.as_bytes());
}

/// Parse an event packet from JDWP
pub fn parse_event_packet(data: &[u8]) -> JdwpResult<EventSet> {
    let mut buf = data;

    let policy_byte = read_u8(&mut buf)?;
    let suspend_policy = SuspendPolicy::from_u8(policy_byte)
        .ok_or_else(|| JdwpError::Protocol(format!("Invalid suspend policy: {}", policy_byte)))?;

    // Every event carries at least its kind and request ID
    let event_count = read_count(&mut buf, 1 + 4)?;
    let mut events = Vec::with_capacity(event_count);

    for _ in 0..event_count {
        let kind = read_u8(&mut buf)?;
        let request_id = read_i32(&mut buf)?;

        let details = match kind {
            event_kinds::BREAKPOINT => {
                let thread = read_u64(&mut buf)?;
                let location = Location::read(&mut buf)?;
                EventKind::Breakpoint { thread, location }
            }
            event_kinds::SINGLE_STEP => {
                let thread = read_u64(&mut buf)?;
                let location = Location::read(&mut buf)?;
                EventKind::Step { thread, location }
            }
            event_kinds::VM_START => {
                let thread = read_u64(&mut buf)?;
                EventKind::VMStart { thread }
            }
            event_kinds::VM_DEATH => EventKind::VMDeath,
            event_kinds::THREAD_START => {
                let thread = read_u64(&mut buf)?;
                EventKind::ThreadStart { thread }
            }
            event_kinds::THREAD_DEATH => {
                let thread = read_u64(&mut buf)?;
                EventKind::ThreadDeath { thread }
            }
            _ => {
                // Payload layout is unknown, so the rest of the set can't be read
                warn!("Unsupported event kind: {}", kind);
                events.push(Event {
                    kind,
                    request_id,
                    details: EventKind::Unknown { kind },
                });
                break;
            }
        };

        events.push(Event {
            kind,
            request_id,
            details,
        });
    }

    Ok(EventSet {
        suspend_policy,
        events,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_event_bytes(request_id: i32, thread: u64) -> Vec<u8> {
        let mut data = Vec::new();
        data.put_u8(SuspendPolicy::EventThread as u8);
        data.put_i32(1);
        data.put_u8(event_kinds::SINGLE_STEP);
        data.put_i32(request_id);
        data.put_u64(thread);
        Location::in_class(1, 2, 3).write(&mut data);
        data
    }

    #[test]
    fn test_parse_step_event() {
        let set = parse_event_packet(&step_event_bytes(17, 0xabc)).unwrap();

        assert_eq!(set.suspend_policy, SuspendPolicy::EventThread);
        assert_eq!(set.events.len(), 1);
        assert_eq!(set.events[0].request_id, 17);
        assert_eq!(set.thread(), Some(0xabc));
        assert!(matches!(set.events[0].details, EventKind::Step { .. }));
    }

    #[test]
    fn test_parse_rejects_bad_suspend_policy() {
        let mut data = step_event_bytes(1, 1);
        data[0] = 9;
        assert!(parse_event_packet(&data).is_err());
    }

    #[test]
    fn test_vm_death_has_no_thread() {
        let mut data = Vec::new();
        data.put_u8(SuspendPolicy::None as u8);
        data.put_i32(1);
        data.put_u8(event_kinds::VM_DEATH);
        data.put_i32(0);

        let set = parse_event_packet(&data).unwrap();
        assert_eq!(set.thread(), None);
    }

    #[test]
    fn test_step_modifier_layout() {
        let mut buf = Vec::new();
        EventModifier::Step {
            thread: 5,
            size: 1,
            depth: 0,
        }
        .write(&mut buf);

        assert_eq!(buf[0], modifier_kinds::STEP);
        assert_eq!(buf.len(), 1 + 8 + 4 + 4);
        assert_eq!(&buf[9..13], &[0, 0, 0, 1]);
        assert_eq!(&buf[13..17], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_parse_rejects_impossible_event_count() {
        let data = [SuspendPolicy::All as u8, 0x7f, 0xff, 0xff, 0xff];
        assert!(matches!(parse_event_packet(&data), Err(JdwpError::Protocol(_))));

        // Two events announced, one present
        let mut data = step_event_bytes(1, 1);
        data[4] = 2;
        assert!(parse_event_packet(&data).is_err());
    }

    #[test]
    fn test_count_and_location_modifier_layout() {
        let mut buf = Vec::new();
        EventModifier::Count(1).write(&mut buf);
        assert_eq!(buf, vec![modifier_kinds::COUNT, 0, 0, 0, 1]);

        let mut buf = Vec::new();
        EventModifier::LocationOnly(Location::in_class(0x10, 0x20, 7)).write(&mut buf);
        assert_eq!(buf[0], modifier_kinds::LOCATION_ONLY);
        assert_eq!(buf.len(), 1 + 1 + 8 + 8 + 8);
        assert_eq!(buf[1], crate::types::type_tags::CLASS);
        assert_eq!(&buf[18..26], &7u64.to_be_bytes());
    }

    #[test]
    fn test_class_exclude_modifier_layout() {
        let mut buf = Vec::new();
        EventModifier::ClassExclude("java.*".to_string()).write(&mut buf);

        assert_eq!(buf[0], modifier_kinds::CLASS_EXCLUDE);
        assert_eq!(&buf[1..5], &[0, 0, 0, 6]);
        assert_eq!(&buf[5..], b"java.*");
    }
}
