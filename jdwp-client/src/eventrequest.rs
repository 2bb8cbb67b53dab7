// EventRequest command implementations
//
// Set up event requests (breakpoints, steps) and tear them down again

use crate::commands::{command_sets, event_commands, event_kinds};
use crate::connection::JdwpConnection;
use crate::events::EventModifier;
use crate::protocol::{CommandPacket, JdwpResult};
use crate::reader::read_i32;
use crate::types::{Location, ThreadId};
use bytes::BufMut;
use serde::{Deserialize, Serialize};

/// Request ID handed out by the VM for every event request
pub type RequestId = i32;

/// Suspend policy for events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum SuspendPolicy {
    None = 0,
    EventThread = 1,
    All = 2,
}

impl SuspendPolicy {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::EventThread),
            2 => Some(Self::All),
            _ => None,
        }
    }
}

/// Build an EventRequest.Set packet
pub fn event_request_packet(
    id: u32,
    event_kind: u8,
    suspend_policy: SuspendPolicy,
    modifiers: &[EventModifier],
) -> CommandPacket {
    let mut packet = CommandPacket::new(id, command_sets::EVENT_REQUEST, event_commands::SET);

    packet.data.put_u8(event_kind);
    packet.data.put_u8(suspend_policy as u8);
    packet.data.put_i32(modifiers.len() as i32);

    for modifier in modifiers {
        modifier.write(&mut packet.data);
    }

    packet
}

impl JdwpConnection {
    /// Register an event request (EventRequest.Set command)
    /// Returns the request ID the VM assigned
    pub async fn set_event_request(
        &self,
        event_kind: u8,
        suspend_policy: SuspendPolicy,
        modifiers: &[EventModifier],
    ) -> JdwpResult<RequestId> {
        let packet = event_request_packet(self.next_id(), event_kind, suspend_policy, modifiers);

        let reply = self.send_command(packet).await?;
        reply.check_error()?;

        let mut data = reply.data();
        read_i32(&mut data)
    }

    /// Set a breakpoint at a specific location
    pub async fn set_breakpoint(
        &self,
        location: Location,
        suspend_policy: SuspendPolicy,
    ) -> JdwpResult<RequestId> {
        self.set_event_request(
            event_kinds::BREAKPOINT,
            suspend_policy,
            &[EventModifier::LocationOnly(location)],
        )
        .await
    }

    /// Request a single step on one thread
    ///
    /// `class_excludes` become ClassExclude modifiers; `count_filter`
    /// makes the request fire once.
    pub async fn set_step_request(
        &self,
        thread: ThreadId,
        size: i32,
        depth: i32,
        suspend_policy: SuspendPolicy,
        class_excludes: &[String],
        count_filter: bool,
    ) -> JdwpResult<RequestId> {
        let mut modifiers = vec![EventModifier::Step {
            thread,
            size,
            depth,
        }];
        modifiers.extend(
            class_excludes
                .iter()
                .map(|pattern| EventModifier::ClassExclude(pattern.clone())),
        );
        if count_filter {
            modifiers.push(EventModifier::Count(1));
        }

        self.set_event_request(event_kinds::SINGLE_STEP, suspend_policy, &modifiers)
            .await
    }

    /// Clear an event request by kind and request ID (EventRequest.Clear command)
    pub async fn clear_event_request(&self, event_kind: u8, request_id: RequestId) -> JdwpResult<()> {
        let mut packet =
            CommandPacket::new(self.next_id(), command_sets::EVENT_REQUEST, event_commands::CLEAR);

        packet.data.put_u8(event_kind);
        packet.data.put_i32(request_id);

        self.send_unit_command(packet).await
    }

    /// Clear a breakpoint by request ID
    pub async fn clear_breakpoint(&self, request_id: RequestId) -> JdwpResult<()> {
        self.clear_event_request(event_kinds::BREAKPOINT, request_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::modifier_kinds;

    #[test]
    fn test_breakpoint_request_layout() {
        let location = Location::in_class(0x11, 0x22, 4);
        let packet = event_request_packet(
            3,
            event_kinds::BREAKPOINT,
            SuspendPolicy::EventThread,
            &[EventModifier::LocationOnly(location)],
        );

        assert_eq!(packet.command_set, command_sets::EVENT_REQUEST);
        assert_eq!(packet.command, event_commands::SET);
        assert_eq!(packet.data[0], event_kinds::BREAKPOINT);
        assert_eq!(packet.data[1], SuspendPolicy::EventThread as u8);
        assert_eq!(&packet.data[2..6], &[0, 0, 0, 1]);
        assert_eq!(packet.data[6], modifier_kinds::LOCATION_ONLY);
        assert_eq!(packet.data.len(), 7 + 25);
    }

    #[test]
    fn test_suspend_policy_from_wire() {
        assert_eq!(SuspendPolicy::from_u8(2), Some(SuspendPolicy::All));
        assert_eq!(SuspendPolicy::from_u8(3), None);
    }
}
