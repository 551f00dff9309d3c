//! Score, post-goal freeze and match clock.
//!
//! `MatchState` is owned by [`GameState`](crate::game::GameState) and advanced
//! once per tick. Every time-dependent call takes `now` explicitly so the clock
//! can be driven from tests without sleeping.

use log::info;
use shared::{MatchPhase, Outcome, Slot, GOAL_FREEZE_TICKS};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct MatchState {
    pub score: [u32; 2],
    /// Ticks left in the post-goal freeze. Zero means live play.
    pub goal_timer: u32,
    phase: MatchPhase,
    duration: Duration,
    started_at: Option<Instant>,
    paused_at: Option<Instant>,
    total_paused: Duration,
    time_left: f32,
}

impl MatchState {
    pub fn new(duration_secs: u32) -> Self {
        Self {
            score: [0, 0],
            goal_timer: 0,
            phase: MatchPhase::Warmup,
            duration: Duration::from_secs(u64::from(duration_secs)),
            started_at: None,
            paused_at: None,
            total_paused: Duration::ZERO,
            time_left: duration_secs as f32,
        }
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    /// Seconds remaining, never negative. The full duration during warmup.
    pub fn time_left(&self) -> f32 {
        self.time_left
    }

    /// Starts a fresh match clock from any phase. The score is cleared.
    pub fn start(&mut self, now: Instant) {
        self.score = [0, 0];
        self.goal_timer = 0;
        self.phase = MatchPhase::Playing;
        self.started_at = Some(now);
        self.paused_at = None;
        self.total_paused = Duration::ZERO;
        self.time_left = self.duration.as_secs_f32();
    }

    /// Same as [`start`](Self::start); kept separate so call sites read like
    /// the control message that triggered them.
    pub fn restart(&mut self, now: Instant) {
        self.start(now);
    }

    /// Playing <-> Paused. Returns the new phase, or `None` if the current
    /// phase cannot be paused.
    pub fn toggle_pause(&mut self, now: Instant) -> Option<MatchPhase> {
        match self.phase {
            MatchPhase::Playing => {
                self.paused_at = Some(now);
                self.phase = MatchPhase::Paused;
            }
            MatchPhase::Paused => {
                if let Some(paused_at) = self.paused_at.take() {
                    self.total_paused += now.saturating_duration_since(paused_at);
                }
                self.phase = MatchPhase::Playing;
            }
            MatchPhase::Warmup | MatchPhase::GameOver => return None,
        }
        Some(self.phase)
    }

    fn elapsed(&self, now: Instant) -> Duration {
        let Some(started_at) = self.started_at else {
            return Duration::ZERO;
        };
        let until = self.paused_at.unwrap_or(now);
        until
            .saturating_duration_since(started_at)
            .saturating_sub(self.total_paused)
    }

    /// Recomputes `time_left`. Returns the outcome on the call that ends the
    /// match, `None` on every other call.
    pub fn update_clock(&mut self, now: Instant) -> Option<Outcome> {
        if self.started_at.is_none() || self.phase == MatchPhase::GameOver {
            return None;
        }

        let remaining = self.duration.saturating_sub(self.elapsed(now));
        self.time_left = remaining.as_secs_f32();

        if remaining.is_zero() && self.phase == MatchPhase::Playing {
            self.phase = MatchPhase::GameOver;
            let outcome = Outcome::from_score(self.score);
            info!("Match over: {:?} ({}-{})", outcome, self.score[0], self.score[1]);
            return Some(outcome);
        }
        None
    }

    pub fn winner(&self) -> Option<Outcome> {
        (self.phase == MatchPhase::GameOver).then(|| Outcome::from_score(self.score))
    }

    /// Physics, inputs and AI only advance in warmup and live play.
    pub fn is_simulating(&self) -> bool {
        matches!(self.phase, MatchPhase::Warmup | MatchPhase::Playing)
    }

    pub fn is_frozen(&self) -> bool {
        self.goal_timer > 0
    }

    /// Credits `scorer` and starts the freeze. Ignored while a freeze is
    /// already running.
    pub fn record_goal(&mut self, scorer: Slot) -> bool {
        if self.is_frozen() {
            return false;
        }
        self.score[scorer.index()] += 1;
        self.goal_timer = GOAL_FREEZE_TICKS;
        true
    }

    /// Counts the freeze down by one tick. Returns true on the tick it
    /// expires, when the caller must reset the kickoff.
    pub fn tick_goal_timer(&mut self) -> bool {
        if self.goal_timer == 0 {
            return false;
        }
        self.goal_timer -= 1;
        self.goal_timer == 0
    }
}
