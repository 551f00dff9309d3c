//! Match-mode presets. A `MatchConfig` is fixed for the lifetime of a match.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameMode {
    /// Grass pitch, balanced friction.
    #[default]
    Soccer,
    /// Ice rink: slippery cars and a livelier puck.
    Hockey,
}

impl GameMode {
    pub const ALL: [GameMode; 2] = [GameMode::Soccer, GameMode::Hockey];

    pub fn label(&self) -> &'static str {
        match self {
            GameMode::Soccer => "CLASSIC SOCCER",
            GameMode::Hockey => "ICE HOCKEY",
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameMode::Soccer => write!(f, "soccer"),
            GameMode::Hockey => write!(f, "hockey"),
        }
    }
}

impl FromStr for GameMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "soccer" => Ok(GameMode::Soccer),
            "hockey" => Ok(GameMode::Hockey),
            other => Err(format!("unknown game mode '{}' (expected soccer or hockey)", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    pub mode: GameMode,
    pub duration_secs: u32,
    pub car_friction: f32,
    pub ball_friction: f32,
    /// Scales the impulse cars deliver to the ball.
    pub ball_speed_multiplier: f32,
}

impl MatchConfig {
    pub fn from_mode(mode: GameMode) -> Self {
        match mode {
            GameMode::Soccer => Self {
                mode,
                duration_secs: 300,
                car_friction: 0.985,
                ball_friction: 0.992,
                ball_speed_multiplier: 1.0,
            },
            GameMode::Hockey => Self {
                mode,
                duration_secs: 180,
                car_friction: 0.995,
                ball_friction: 0.998,
                ball_speed_multiplier: 1.2,
            },
        }
    }

    /// Overrides the preset's match length. Zero keeps the preset.
    pub fn with_duration(mut self, duration_secs: u32) -> Self {
        if duration_secs > 0 {
            self.duration_secs = duration_secs;
        }
        self
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self::from_mode(GameMode::default())
    }
}
