//! Turns the stream of rendered states into discrete game events and hands
//! them to the audio layer.

use log::info;
use shared::{GameEvent, MatchPhase, Outcome, Slot, Snapshot};

/// Events implied by going from `prev` to `next`.
///
/// A score that drops (after a restart) is not a goal.
pub fn detect(prev: &Snapshot, next: &Snapshot) -> Vec<GameEvent> {
    let mut events = Vec::new();

    for scorer in Slot::ALL {
        let i = scorer.index();
        if next.score[i] > prev.score[i] {
            events.push(GameEvent::GoalScored { scorer });
        }
    }

    if prev.goal_timer > 0 && next.goal_timer == 0 && next.phase != MatchPhase::GameOver {
        events.push(GameEvent::KickoffReset);
    }

    if prev.phase != MatchPhase::GameOver && next.phase == MatchPhase::GameOver {
        events.push(GameEvent::MatchOver {
            outcome: Outcome::from_score(next.score),
        });
    }

    events
}

/// Receiver of fire-and-forget game events. Implementations must not block.
pub trait AudioSink {
    fn play(&mut self, event: &GameEvent);
}

/// Stand-in sink that logs each cue instead of playing a sample.
#[derive(Debug, Default)]
pub struct LogAudio {
    pub played: u64,
}

impl AudioSink for LogAudio {
    fn play(&mut self, event: &GameEvent) {
        self.played += 1;
        match event {
            GameEvent::GoalScored { scorer } => info!("[audio] goal horn for {}", scorer),
            GameEvent::MatchOver { outcome } => info!("[audio] final whistle: {:?}", outcome),
            GameEvent::KickoffReset => info!("[audio] kickoff whistle"),
            GameEvent::Click => info!("[audio] click"),
        }
    }
}
