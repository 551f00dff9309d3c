use crate::events::detect;
use crate::sync::{SnapshotBuffer, SyncState};
use log::{info, warn};
use shared::{GameEvent, MatchConfig, MatchPhase, Packet, Slot, Snapshot};

/// Where the handshake with the server stands.
#[derive(Debug, Clone, PartialEq)]
pub enum Connection {
    Joining,
    Seated { slot: Slot, config: MatchConfig },
    Rejected { reason: String },
}

/// Everything the client knows about the match: its seat and the buffered
/// stream of server snapshots. It never mutates what the server sent.
pub struct ClientGameState {
    pub connection: Connection,
    pub buffer: SnapshotBuffer,
    snapshots_received: u64,
    last_rendered: Option<Snapshot>,
}

impl ClientGameState {
    pub fn new() -> Self {
        Self::with_buffer(SnapshotBuffer::new())
    }

    pub fn with_buffer(buffer: SnapshotBuffer) -> Self {
        Self {
            connection: Connection::Joining,
            buffer,
            snapshots_received: 0,
            last_rendered: None,
        }
    }

    pub fn slot(&self) -> Option<Slot> {
        match self.connection {
            Connection::Seated { slot, .. } => Some(slot),
            _ => None,
        }
    }

    /// True once the server has answered in any way, so `Join` need not be
    /// resent.
    pub fn has_contact(&self) -> bool {
        !matches!(self.connection, Connection::Joining) || self.snapshots_received > 0
    }

    pub fn snapshots_received(&self) -> u64 {
        self.snapshots_received
    }

    /// Phase of the newest snapshot, ahead of what is on screen.
    pub fn latest_phase(&self) -> Option<MatchPhase> {
        self.buffer.latest().map(|s| s.phase)
    }

    pub fn apply_packet(&mut self, packet: Packet, local_ms: u64) {
        match packet {
            Packet::Welcome { slot, config } => {
                if self.slot() != Some(slot) {
                    info!("Seated as {} in {} mode", slot, config.mode);
                }
                self.connection = Connection::Seated { slot, config };
            }
            Packet::Rejected { reason } => {
                warn!("Server rejected us: {}", reason);
                self.connection = Connection::Rejected { reason };
            }
            Packet::Snapshot(snapshot) => {
                self.snapshots_received += 1;
                self.buffer.push(snapshot, local_ms);
            }
            other => warn!("Unexpected {} packet from server", other.kind()),
        }
    }

    /// Samples the world for this frame and reports events since the last
    /// rendered frame.
    pub fn frame(&mut self, local_now_ms: u64) -> (SyncState, Vec<GameEvent>) {
        let state = self.buffer.sample(local_now_ms);

        let events = match (&self.last_rendered, state.snapshot()) {
            (Some(prev), Some(next)) => detect(prev, next),
            _ => Vec::new(),
        };
        if let Some(snapshot) = state.snapshot() {
            self.last_rendered = Some(snapshot.clone());
        }

        (state, events)
    }
}

impl Default for ClientGameState {
    fn default() -> Self {
        Self::new()
    }
}
