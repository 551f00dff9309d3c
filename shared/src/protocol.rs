//! Wire protocol between server and clients.
//!
//! Every datagram carries exactly one bincode-encoded [`Packet`]; the enum
//! variant is the message-kind discriminant.

use crate::config::{GameMode, MatchConfig};
use crate::entity::{Body, InputVector, Slot};
use crate::error::ProtocolError;
use crate::events::Outcome;
use crate::math::Vec2;
use crate::MAX_PACKET_SIZE;
use bincode::Options;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Packet {
    // Client -> server
    Join {
        protocol_version: u32,
    },
    Input(InputVector),
    Configure {
        mode: GameMode,
        duration_secs: u32,
    },
    TogglePause,
    Restart,
    Leave,

    // Server -> client
    Welcome {
        slot: Slot,
        config: MatchConfig,
    },
    Rejected {
        reason: String,
    },
    Snapshot(Snapshot),
}

/// Fixed-width little-endian integers, and nothing may follow the packet.
fn wire_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .reject_trailing_bytes()
}

impl Packet {
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        let data = wire_options()
            .serialize(self)
            .map_err(ProtocolError::Encode)?;
        if data.len() > MAX_PACKET_SIZE {
            return Err(ProtocolError::Oversized {
                size: data.len(),
                max: MAX_PACKET_SIZE,
            });
        }
        Ok(data)
    }

    pub fn decode(data: &[u8]) -> Result<Self, ProtocolError> {
        if data.len() > MAX_PACKET_SIZE {
            return Err(ProtocolError::Oversized {
                size: data.len(),
                max: MAX_PACKET_SIZE,
            });
        }
        wire_options()
            .deserialize(data)
            .map_err(ProtocolError::Decode)
    }

    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Packet::Join { .. } => "join",
            Packet::Input(_) => "input",
            Packet::Configure { .. } => "configure",
            Packet::TogglePause => "toggle-pause",
            Packet::Restart => "restart",
            Packet::Leave => "leave",
            Packet::Welcome { .. } => "welcome",
            Packet::Rejected { .. } => "rejected",
            Packet::Snapshot(_) => "snapshot",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    /// Players may drive around; the match clock has not started.
    Warmup,
    Playing,
    Paused,
    GameOver,
}

/// Position and velocity of one entity on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EntityState {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
}

impl EntityState {
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn velocity(&self) -> Vec2 {
        Vec2::new(self.vx, self.vy)
    }

    pub fn lerp(&self, other: &EntityState, t: f32) -> EntityState {
        let pos = self.position().lerp(other.position(), t);
        let vel = self.velocity().lerp(other.velocity(), t);
        EntityState {
            x: pos.x,
            y: pos.y,
            vx: vel.x,
            vy: vel.y,
        }
    }
}

impl From<&Body> for EntityState {
    fn from(body: &Body) -> Self {
        Self {
            x: body.pos.x,
            y: body.pos.y,
            vx: body.vel.x,
            vy: body.vel.y,
        }
    }
}

/// Complete authoritative world state for one server tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Milliseconds on the server's monotonic clock.
    pub timestamp_ms: u64,
    pub tick: u64,
    pub p1: EntityState,
    pub p2: EntityState,
    pub gk1: EntityState,
    pub gk2: EntityState,
    pub ball: EntityState,
    /// Degrees, in `[0, 360)`.
    pub ball_angle: f32,
    pub score: [u32; 2],
    pub goal_timer: u32,
    pub time_left: f32,
    pub phase: MatchPhase,
}

impl Snapshot {
    pub fn player(&self, slot: Slot) -> &EntityState {
        match slot {
            Slot::P1 => &self.p1,
            Slot::P2 => &self.p2,
        }
    }

    /// The four cars in p1, p2, gk1, gk2 order.
    pub fn cars(&self) -> [&EntityState; 4] {
        [&self.p1, &self.p2, &self.gk1, &self.gk2]
    }

    pub fn outcome(&self) -> Option<Outcome> {
        (self.phase == MatchPhase::GameOver).then(|| Outcome::from_score(self.score))
    }
}
