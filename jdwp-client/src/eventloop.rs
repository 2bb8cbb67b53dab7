// JDWP Event Loop
//
// Multiplexes one socket: outgoing commands, their replies, and the
// composite event packets the VM sends on its own.

use crate::commands::command_sets;
use crate::events::{parse_event_packet, EventSet};
use crate::protocol::{CommandPacket, JdwpError, JdwpResult, ReplyPacket, HEADER_SIZE, REPLY_FLAG};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

/// Maximum allowed JDWP packet size (10MB)
const MAX_PACKET_SIZE: usize = 10 * 1024 * 1024;

type PendingReplies = HashMap<u32, oneshot::Sender<JdwpResult<ReplyPacket>>>;

/// Request to send a command and get reply
pub struct CommandRequest {
    pub packet: CommandPacket,
    pub reply_tx: oneshot::Sender<JdwpResult<ReplyPacket>>,
}

/// Handle to the event loop for sending commands and receiving events
#[derive(Clone, Debug)]
pub struct EventLoopHandle {
    command_tx: mpsc::Sender<CommandRequest>,
    event_rx: Arc<tokio::sync::Mutex<mpsc::Receiver<EventSet>>>,
}

impl EventLoopHandle {
    /// Send a command and wait for reply
    pub async fn send_command(&self, packet: CommandPacket) -> JdwpResult<ReplyPacket> {
        let (reply_tx, reply_rx) = oneshot::channel();

        let request = CommandRequest { packet, reply_tx };

        self.command_tx
            .send(request)
            .await
            .map_err(|_| JdwpError::ConnectionClosed)?;

        reply_rx.await.map_err(|_| JdwpError::ConnectionClosed)?
    }

    /// Try to receive an event (non-blocking)
    pub async fn try_recv_event(&self) -> Option<EventSet> {
        let mut rx = self.event_rx.lock().await;
        rx.try_recv().ok()
    }

    /// Wait for the next event (blocking)
    pub async fn recv_event(&self) -> Option<EventSet> {
        let mut rx = self.event_rx.lock().await;
        rx.recv().await
    }
}

/// Start the event loop task
pub fn spawn_event_loop(reader: OwnedReadHalf, writer: OwnedWriteHalf) -> EventLoopHandle {
    let (command_tx, command_rx) = mpsc::channel(32);
    // Breakpoint and step events must not be dropped under load
    let (event_tx, event_rx) = mpsc::channel(256);

    tokio::spawn(event_loop_task(reader, writer, command_rx, event_tx));

    EventLoopHandle {
        command_tx,
        event_rx: Arc::new(tokio::sync::Mutex::new(event_rx)),
    }
}

/// Main event loop task
async fn event_loop_task(
    mut reader: OwnedReadHalf,
    mut writer: OwnedWriteHalf,
    mut command_rx: mpsc::Receiver<CommandRequest>,
    event_tx: mpsc::Sender<EventSet>,
) {
    info!("Event loop started");

    let mut pending_replies = PendingReplies::new();

    loop {
        tokio::select! {
            Some(cmd) = command_rx.recv() => {
                let packet_id = cmd.packet.id;
                debug!("Sending command id={}", packet_id);

                let encoded = cmd.packet.encode();
                if let Err(e) = writer.write_all(&encoded).await {
                    error!("Failed to write command: {}", e);
                    cmd.reply_tx.send(Err(JdwpError::Io(e))).ok();
                    continue;
                }

                if let Err(e) = writer.flush().await {
                    error!("Failed to flush command: {}", e);
                    cmd.reply_tx.send(Err(JdwpError::Io(e))).ok();
                    continue;
                }

                pending_replies.insert(packet_id, cmd.reply_tx);
            }

            result = read_packet(&mut reader) => {
                match result {
                    Ok((true, packet_id, data)) => route_reply(&mut pending_replies, packet_id, &data),
                    Ok((false, _, data)) => forward_event(&event_tx, &data),
                    Err(e) => {
                        error!("Failed to read packet: {}", e);
                        break;
                    }
                }
            }
        }
    }

    // Anyone still waiting on a reply would otherwise hang forever
    for (_, tx) in pending_replies.drain() {
        tx.send(Err(JdwpError::ConnectionClosed)).ok();
    }

    info!("Event loop shutting down");
}

fn route_reply(pending_replies: &mut PendingReplies, packet_id: u32, data: &[u8]) {
    debug!("Received reply id={}", packet_id);

    let Some(tx) = pending_replies.remove(&packet_id) else {
        warn!("Received reply for unknown command id={}", packet_id);
        return;
    };

    match ReplyPacket::decode(data) {
        Ok(reply) => {
            tx.send(Ok(reply)).ok();
        }
        Err(e) => {
            warn!("Failed to decode reply: {}", e);
            tx.send(Err(e)).ok();
        }
    }
}

fn forward_event(event_tx: &mpsc::Sender<EventSet>, data: &[u8]) {
    debug!("Received command packet from VM, len={}", data.len());

    let packet = match CommandPacket::decode(data) {
        Ok(packet) => packet,
        Err(e) => {
            warn!("Failed to decode VM command: {}", e);
            return;
        }
    };

    if packet.command_set != command_sets::EVENT {
        warn!("Ignoring VM command set={} cmd={}", packet.command_set, packet.command);
        return;
    }

    let event_set = match parse_event_packet(&packet.data) {
        Ok(event_set) => event_set,
        Err(e) => {
            warn!("Failed to parse event: {}", e);
            return;
        }
    };

    info!(
        "Parsed event set: {} events, suspend_policy={:?}",
        event_set.events.len(),
        event_set.suspend_policy
    );

    match event_tx.try_send(event_set) {
        Ok(_) => {}
        Err(mpsc::error::TrySendError::Full(event)) => {
            error!(
                "Event channel full! Dropping event set with {} events",
                event.events.len()
            );
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            warn!("Event receiver dropped, future events will be discarded");
        }
    }
}

/// Read a packet from the socket and determine if it's a reply or event
async fn read_packet(reader: &mut OwnedReadHalf) -> JdwpResult<(bool, u32, Vec<u8>)> {
    let mut header = [0u8; HEADER_SIZE];

    reader.read_exact(&mut header).await.map_err(JdwpError::Io)?;

    let length = u32::from_be_bytes([header[0], header[1], header[2], header[3]]) as usize;
    let packet_id = u32::from_be_bytes([header[4], header[5], header[6], header[7]]);
    let flags = header[8];

    if length < HEADER_SIZE {
        return Err(JdwpError::Protocol(format!("Invalid packet length: {}", length)));
    }

    if length > MAX_PACKET_SIZE {
        return Err(JdwpError::Protocol(format!(
            "Packet too large: {} bytes (max: {} bytes)",
            length, MAX_PACKET_SIZE
        )));
    }

    let mut full_packet = header.to_vec();
    let data_len = length - HEADER_SIZE;

    if data_len > 0 {
        let mut data = vec![0u8; data_len];
        reader.read_exact(&mut data).await.map_err(JdwpError::Io)?;
        full_packet.extend_from_slice(&data);
    }

    Ok((flags == REPLY_FLAG, packet_id, full_packet))
}
