// ThreadReference command implementations
//
// Commands for working with threads (name, stack depth, status, resume)
// plus the VM-wide suspend/resume pair.

use crate::commands::{command_sets, thread_commands, vm_commands};
use crate::connection::JdwpConnection;
use crate::protocol::{CommandPacket, JdwpError, JdwpResult};
use crate::reader::{read_count, read_i32, read_string, read_u32, read_u64};
use crate::types::{SuspendStatus, ThreadId, ThreadStatus};
use bytes::BufMut;
use serde::{Deserialize, Serialize};

/// Result of ThreadReference.Status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadState {
    pub status: ThreadStatus,
    pub suspend_status: SuspendStatus,
}

impl JdwpConnection {
    fn thread_packet(&self, command: u8, thread_id: ThreadId) -> CommandPacket {
        let mut packet = CommandPacket::new(self.next_id(), command_sets::THREAD_REFERENCE, command);
        packet.data.put_u64(thread_id);
        packet
    }

    /// Get the thread's name (ThreadReference.Name command)
    pub async fn thread_name(&self, thread_id: ThreadId) -> JdwpResult<String> {
        let reply = self
            .send_command(self.thread_packet(thread_commands::NAME, thread_id))
            .await?;
        reply.check_error()?;

        let mut data = reply.data();
        read_string(&mut data)
    }

    /// Number of frames on a suspended thread's stack (ThreadReference.FrameCount)
    pub async fn frame_count(&self, thread_id: ThreadId) -> JdwpResult<i32> {
        let reply = self
            .send_command(self.thread_packet(thread_commands::FRAME_COUNT, thread_id))
            .await?;
        reply.check_error()?;

        let mut data = reply.data();
        read_i32(&mut data)
    }

    /// Thread and suspend status (ThreadReference.Status)
    pub async fn thread_status(&self, thread_id: ThreadId) -> JdwpResult<ThreadState> {
        let reply = self
            .send_command(self.thread_packet(thread_commands::STATUS, thread_id))
            .await?;
        reply.check_error()?;

        let mut data = reply.data();
        let raw_status = read_u32(&mut data)?;
        let raw_suspend = read_u32(&mut data)?;

        let status = ThreadStatus::from_u32(raw_status)
            .ok_or_else(|| JdwpError::Protocol(format!("Invalid thread status: {}", raw_status)))?;
        let suspend_status = if raw_suspend & 1 == 1 {
            SuspendStatus::Suspended
        } else {
            SuspendStatus::Running
        };

        Ok(ThreadState {
            status,
            suspend_status,
        })
    }

    /// Resume a single thread (ThreadReference.Resume)
    ///
    /// Decrements the thread's suspend count by one; the thread only runs
    /// once the count reaches zero.
    pub async fn resume_thread(&self, thread_id: ThreadId) -> JdwpResult<()> {
        self.send_unit_command(self.thread_packet(thread_commands::RESUME, thread_id))
            .await
    }

    /// Get all threads (VirtualMachine.AllThreads)
    pub async fn get_all_threads(&self) -> JdwpResult<Vec<ThreadId>> {
        let packet = CommandPacket::new(self.next_id(), command_sets::VIRTUAL_MACHINE, vm_commands::ALL_THREADS);

        let reply = self.send_command(packet).await?;
        reply.check_error()?;

        let mut data = reply.data();

        let threads_count = read_count(&mut data, 8)?;
        let mut threads = Vec::with_capacity(threads_count);

        for _ in 0..threads_count {
            threads.push(read_u64(&mut data)?);
        }

        Ok(threads)
    }

    /// Suspend all threads (VirtualMachine.Suspend)
    pub async fn suspend_all(&self) -> JdwpResult<()> {
        let packet = CommandPacket::new(self.next_id(), command_sets::VIRTUAL_MACHINE, vm_commands::SUSPEND);
        self.send_unit_command(packet).await
    }

    /// Resume all threads (VirtualMachine.Resume)
    pub async fn resume_all(&self) -> JdwpResult<()> {
        let packet = CommandPacket::new(self.next_id(), command_sets::VIRTUAL_MACHINE, vm_commands::RESUME);
        self.send_unit_command(packet).await
    }
}
