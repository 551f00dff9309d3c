use crate::entity::Slot;
use serde::{Deserialize, Serialize};

/// How a finished match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Winner(Slot),
    Draw,
}

impl Outcome {
    /// Strict score comparison; equal scores are a draw.
    pub fn from_score(score: [u32; 2]) -> Self {
        use std::cmp::Ordering;
        match score[0].cmp(&score[1]) {
            Ordering::Greater => Outcome::Winner(Slot::P1),
            Ordering::Less => Outcome::Winner(Slot::P2),
            Ordering::Equal => Outcome::Draw,
        }
    }
}

/// Discrete notifications for the audio layer and logs. Fire and forget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    GoalScored { scorer: Slot },
    KickoffReset,
    MatchOver { outcome: Outcome },
    /// A control key was pressed.
    Click,
}
