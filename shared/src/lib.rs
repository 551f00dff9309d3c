//! # Shared Game Model
//!
//! Types and rules used by both the authoritative server and the viewing
//! clients: pitch geometry, circle math, the car/keeper/ball entity model with
//! its per-tick update rules, the collision resolver, match-mode presets and
//! the wire protocol.
//!
//! Every distance is in pitch pixels and every velocity in pixels per tick.
//! The simulation is tick based (no `dt`), so the same inputs always produce
//! the same world.

pub mod config;
pub mod entity;
pub mod events;
pub mod math;
pub mod physics;
pub mod protocol;

mod error;

pub use config::{GameMode, MatchConfig};
pub use entity::{Ball, Body, Car, CarKind, InputVector, Side, Slot};
pub use error::ProtocolError;
pub use events::{GameEvent, Outcome};
pub use math::{circle_overlap, Contact, Vec2};
pub use protocol::{EntityState, MatchPhase, Packet, Snapshot};

pub const PITCH_WIDTH: f32 = 1000.0;
pub const PITCH_HEIGHT: f32 = 600.0;
pub const GOAL_WIDTH: f32 = 180.0;
/// Upper edge of both goal mouths. The ball only leaves the pitch strictly
/// between `GOAL_TOP_Y` and `GOAL_BOTTOM_Y`.
pub const GOAL_TOP_Y: f32 = (PITCH_HEIGHT - GOAL_WIDTH) / 2.0;
pub const GOAL_BOTTOM_Y: f32 = (PITCH_HEIGHT + GOAL_WIDTH) / 2.0;

pub const CAR_RADIUS: f32 = 22.0;
pub const BALL_RADIUS: f32 = 16.0;
pub const CAR_MAX_SPEED: f32 = 7.0;
pub const KEEPER_MAX_SPEED: f32 = 4.5;
pub const SPEED_POWER: f32 = 0.25;
/// Multiplier on forward thrust while boosting.
pub const BOOST_THRUST: f32 = 1.5;
/// Multiplier on the speed cap while boosting.
pub const BOOST_SPEED_CAP: f32 = 1.4;
/// Share of `SPEED_POWER` applied on the reverse and sideways axes.
pub const SECONDARY_AXIS_FACTOR: f32 = 0.8;

/// Distance of each keeper's patrol line from its own goal line.
pub const KEEPER_LINE_OFFSET: f32 = 50.0;
pub const KICKOFF_OFFSET: f32 = 200.0;

/// Ticks the world stays frozen after a goal before the kickoff reset.
pub const GOAL_FREEZE_TICKS: u32 = 90;
pub const TICK_RATE: u32 = 60;
pub const INTERPOLATION_DELAY_MS: u64 = 100;

pub const DEFAULT_PORT: u16 = 5555;
pub const PROTOCOL_VERSION: u32 = 1;
/// Size of every receive buffer; larger datagrams are never produced.
pub const MAX_PACKET_SIZE: usize = 2048;

/// Centre spot of the pitch, where the ball is placed at every kickoff.
pub fn pitch_center() -> Vec2 {
    Vec2::new(PITCH_WIDTH / 2.0, PITCH_HEIGHT / 2.0)
}

/// True when `y` lies strictly inside the goal mouth band.
pub fn in_goal_band(y: f32) -> bool {
    GOAL_TOP_Y < y && y < GOAL_BOTTOM_Y
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goal_band_is_centered() {
        assert_eq!(GOAL_TOP_Y, 210.0);
        assert_eq!(GOAL_BOTTOM_Y, 390.0);
        assert!(in_goal_band(PITCH_HEIGHT / 2.0));
    }

    #[test]
    fn test_goal_band_edges_are_exclusive() {
        assert!(!in_goal_band(GOAL_TOP_Y));
        assert!(!in_goal_band(GOAL_BOTTOM_Y));
        assert!(in_goal_band(GOAL_TOP_Y + 0.01));
        assert!(in_goal_band(GOAL_BOTTOM_Y - 0.01));
    }

    #[test]
    fn test_pitch_center() {
        let c = pitch_center();
        assert_eq!(c.x, 500.0);
        assert_eq!(c.y, 300.0);
    }
}
