use crate::match_state::MatchState;
use log::{debug, info};
use shared::physics::resolve_collisions;
use shared::{
    Ball, Car, EntityState, GameEvent, InputVector, MatchConfig, MatchPhase, Side, Slot, Snapshot,
};
use std::time::Instant;

const P1: usize = 0;
const P2: usize = 1;
const GK1: usize = 2;
const GK2: usize = 3;

/// The authoritative world: four cars, the ball and the match state.
#[derive(Debug, Clone)]
pub struct GameState {
    pub tick: u64,
    pub config: MatchConfig,
    /// p1, p2, gk1, gk2
    pub cars: [Car; 4],
    pub ball: Ball,
    pub match_state: MatchState,
}

impl GameState {
    pub fn new(config: MatchConfig) -> Self {
        let car_friction = config.car_friction;
        Self {
            tick: 0,
            config,
            cars: [
                Car::player(Slot::P1, car_friction),
                Car::player(Slot::P2, car_friction),
                Car::keeper(Side::Left, car_friction),
                Car::keeper(Side::Right, car_friction),
            ],
            ball: Ball::new(config.ball_friction),
            match_state: MatchState::new(config.duration_secs),
        }
    }

    pub fn player(&self, slot: Slot) -> &Car {
        &self.cars[slot.index()]
    }

    pub fn player_mut(&mut self, slot: Slot) -> &mut Car {
        &mut self.cars[slot.index()]
    }

    /// Rebuilds the world for `config` and starts the match clock.
    pub fn reconfigure(&mut self, config: MatchConfig, now: Instant) {
        let tick = self.tick;
        *self = GameState::new(config);
        self.tick = tick;
        self.match_state.start(now);
        info!(
            "Match configured: {} for {}s",
            config.mode, config.duration_secs
        );
    }

    /// Fresh kickoff with the current config.
    pub fn restart(&mut self, now: Instant) {
        self.reset_kickoff();
        self.match_state.restart(now);
        info!("Match restarted");
    }

    pub fn toggle_pause(&mut self, now: Instant) -> Option<MatchPhase> {
        self.match_state.toggle_pause(now)
    }

    /// Every car and the ball back to their kickoff spots, motionless.
    pub fn reset_kickoff(&mut self) {
        for car in self.cars.iter_mut() {
            car.reset_to_kickoff();
        }
        self.ball.reset();
    }

    /// Advances the world by one tick and reports what happened.
    ///
    /// Nothing moves while paused, after the final whistle or during the
    /// post-goal freeze. The freeze keeps counting down and the kickoff reset
    /// happens on the tick it expires.
    pub fn tick(&mut self, inputs: [InputVector; 2], now: Instant) -> Vec<GameEvent> {
        self.tick += 1;
        let mut events = Vec::new();

        if let Some(outcome) = self.match_state.update_clock(now) {
            events.push(GameEvent::MatchOver { outcome });
        }

        if !self.match_state.is_simulating() {
            return events;
        }

        if self.match_state.is_frozen() {
            if self.match_state.tick_goal_timer() {
                self.reset_kickoff();
                debug!("Kickoff at tick {}", self.tick);
                events.push(GameEvent::KickoffReset);
            }
            return events;
        }

        for slot in Slot::ALL {
            self.cars[slot.index()].apply_input(&inputs[slot.index()]);
        }
        self.step_physics();

        if let Some(side) = self.ball.goal_crossed() {
            let scorer = side.attacker();
            if self.match_state.record_goal(scorer) {
                let score = self.match_state.score;
                info!("Goal for {}! Score {}-{}", scorer, score[0], score[1]);
                events.push(GameEvent::GoalScored { scorer });
            }
        }

        events
    }

    fn step_physics(&mut self) {
        let ball_pos = self.ball.body.pos;
        for car in self.cars.iter_mut() {
            car.update(ball_pos);
        }
        self.ball.integrate();

        resolve_collisions(
            &mut self.cars,
            &mut self.ball,
            self.config.ball_speed_multiplier,
        );
    }

    pub fn snapshot(&self, timestamp_ms: u64) -> Snapshot {
        Snapshot {
            timestamp_ms,
            tick: self.tick,
            p1: EntityState::from(&self.cars[P1].body),
            p2: EntityState::from(&self.cars[P2].body),
            gk1: EntityState::from(&self.cars[GK1].body),
            gk2: EntityState::from(&self.cars[GK2].body),
            ball: EntityState::from(&self.ball.body),
            ball_angle: self.ball.angle,
            score: self.match_state.score,
            goal_timer: self.match_state.goal_timer,
            time_left: self.match_state.time_left(),
            phase: self.match_state.phase(),
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(MatchConfig::default())
    }
}
