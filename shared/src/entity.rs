//! Car, keeper and ball state together with their per-tick update rules.

use crate::math::Vec2;
use crate::{
    in_goal_band, pitch_center, BALL_RADIUS, BOOST_SPEED_CAP, BOOST_THRUST, CAR_MAX_SPEED,
    CAR_RADIUS, KEEPER_LINE_OFFSET, KEEPER_MAX_SPEED, KICKOFF_OFFSET, PITCH_HEIGHT, PITCH_WIDTH,
    SECONDARY_AXIS_FACTOR, SPEED_POWER,
};
use serde::{Deserialize, Serialize};

/// One of the two human-controlled seats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slot {
    P1,
    P2,
}

impl Slot {
    pub const ALL: [Slot; 2] = [Slot::P1, Slot::P2];

    /// Index into per-slot arrays such as the score.
    pub fn index(self) -> usize {
        match self {
            Slot::P1 => 0,
            Slot::P2 => 1,
        }
    }

    /// The half of the pitch this slot kicks off in and defends.
    pub fn home_side(self) -> Side {
        match self {
            Slot::P1 => Side::Left,
            Slot::P2 => Side::Right,
        }
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Slot::P1 => write!(f, "p1"),
            Slot::P2 => write!(f, "p2"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// x coordinate of the line a keeper on this side patrols.
    pub fn patrol_x(self) -> f32 {
        match self {
            Side::Left => KEEPER_LINE_OFFSET,
            Side::Right => PITCH_WIDTH - KEEPER_LINE_OFFSET,
        }
    }

    /// The slot that scores when the ball leaves through this side's goal.
    pub fn attacker(self) -> Slot {
        match self {
            Side::Left => Slot::P2,
            Side::Right => Slot::P1,
        }
    }
}

/// Boolean control vector a player sends every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InputVector {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub boost: bool,
}

impl InputVector {
    pub const IDLE: InputVector = InputVector {
        up: false,
        down: false,
        left: false,
        right: false,
        boost: false,
    };
}

/// Kinematic state shared by every dynamic entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
}

impl Body {
    pub fn at_rest(pos: Vec2, radius: f32) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            radius,
        }
    }

    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    /// Hard clamp of the centre into the pitch, leaving velocity untouched.
    pub fn clamp_to_pitch(&mut self) {
        self.pos.x = self.pos.x.clamp(self.radius, PITCH_WIDTH - self.radius);
        self.pos.y = self.pos.y.clamp(self.radius, PITCH_HEIGHT - self.radius);
    }
}

/// Who steers a car, fixed when the car is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarKind {
    Player(Slot),
    Keeper(Side),
}

const KEEPER_NUDGE: f32 = 0.5;
const KEEPER_Y_DEAD_ZONE: f32 = 10.0;
const KEEPER_X_DEAD_ZONE: f32 = 5.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Car {
    pub body: Body,
    pub kind: CarKind,
    pub max_speed: f32,
    pub friction: f32,
    pub speed_power: f32,
    pub kickoff: Vec2,
}

impl Car {
    pub fn player(slot: Slot, friction: f32) -> Self {
        let kickoff = match slot.home_side() {
            Side::Left => Vec2::new(KICKOFF_OFFSET, PITCH_HEIGHT / 2.0),
            Side::Right => Vec2::new(PITCH_WIDTH - KICKOFF_OFFSET, PITCH_HEIGHT / 2.0),
        };
        Self::build(CarKind::Player(slot), kickoff, CAR_MAX_SPEED, friction)
    }

    pub fn keeper(side: Side, friction: f32) -> Self {
        let kickoff = Vec2::new(side.patrol_x(), PITCH_HEIGHT / 2.0);
        Self::build(CarKind::Keeper(side), kickoff, KEEPER_MAX_SPEED, friction)
    }

    fn build(kind: CarKind, kickoff: Vec2, max_speed: f32, friction: f32) -> Self {
        Self {
            body: Body::at_rest(kickoff, CAR_RADIUS),
            kind,
            max_speed,
            friction,
            speed_power: SPEED_POWER,
            kickoff,
        }
    }

    /// Accelerates from a player's controls and applies the speed cap.
    pub fn apply_input(&mut self, input: &InputVector) {
        let thrust = if input.boost { BOOST_THRUST } else { 1.0 };
        let secondary = self.speed_power * SECONDARY_AXIS_FACTOR;
        let mut accel = Vec2::ZERO;

        if input.up {
            accel.y -= self.speed_power * thrust;
        }
        if input.down {
            accel.y += secondary;
        }
        if input.left {
            accel.x -= secondary;
        }
        if input.right {
            accel.x += secondary;
        }

        self.body.vel += accel;
        self.limit_speed(input.boost);
    }

    /// Uniformly rescales velocity down to the cap, `max_speed` or
    /// `max_speed * BOOST_SPEED_CAP` while boosting.
    pub fn limit_speed(&mut self, boosting: bool) {
        let limit = if boosting {
            self.max_speed * BOOST_SPEED_CAP
        } else {
            self.max_speed
        };
        self.body.vel = self.body.vel.clamp_length(limit);
    }

    /// Friction, then motion, then a hard clamp into the pitch.
    pub fn integrate(&mut self) {
        self.body.vel = self.body.vel * self.friction;
        self.body.pos += self.body.vel;
        self.body.clamp_to_pitch();
    }

    /// Advances one tick. Player cars only coast here since their input was
    /// already applied; keepers run their controller against `ball` first.
    pub fn update(&mut self, ball: Vec2) {
        if let CarKind::Keeper(side) = self.kind {
            self.steer_keeper(side, ball);
        }
        self.integrate();
    }

    // Bang-bang tracking: follow the ball vertically, hold the patrol line.
    fn steer_keeper(&mut self, side: Side, ball: Vec2) {
        let dy = ball.y - self.body.pos.y;
        if dy.abs() > KEEPER_Y_DEAD_ZONE {
            self.body.vel.y += KEEPER_NUDGE.copysign(dy);
        }

        let dx = side.patrol_x() - self.body.pos.x;
        if dx.abs() > KEEPER_X_DEAD_ZONE {
            self.body.vel.x += KEEPER_NUDGE.copysign(dx);
        }

        self.limit_speed(false);
    }

    pub fn reset_to_kickoff(&mut self) {
        self.body.pos = self.kickoff;
        self.body.vel = Vec2::ZERO;
    }
}

const ROLL_RATE: f32 = 3.0;
const SPIN_EASING: f32 = 0.04;

#[derive(Debug, Clone, PartialEq)]
pub struct Ball {
    pub body: Body,
    pub friction: f32,
    /// Visual rotation in degrees, always in `[0, 360)`.
    pub angle: f32,
    pub angular_velocity: f32,
}

impl Ball {
    pub fn new(friction: f32) -> Self {
        Self {
            body: Body::at_rest(pitch_center(), BALL_RADIUS),
            friction,
            angle: 0.0,
            angular_velocity: 0.0,
        }
    }

    /// Back to the centre spot, motionless.
    pub fn reset(&mut self) {
        self.body = Body::at_rest(pitch_center(), BALL_RADIUS);
        self.angle = 0.0;
        self.angular_velocity = 0.0;
    }

    /// Friction, motion, wall bounces and spin for one tick.
    ///
    /// The side walls reflect the ball except inside the goal mouth band, where
    /// it is allowed to cross the goal line so the match can register a goal.
    pub fn integrate(&mut self) {
        let r = self.body.radius;
        self.body.vel = self.body.vel * self.friction;
        self.body.pos += self.body.vel;

        let pos = &mut self.body.pos;
        let vel = &mut self.body.vel;

        if pos.y < r {
            pos.y = r;
            vel.y = -vel.y;
        }
        if pos.y > PITCH_HEIGHT - r {
            pos.y = PITCH_HEIGHT - r;
            vel.y = -vel.y;
        }

        if pos.x < r && !in_goal_band(pos.y) {
            pos.x = r;
            vel.x = -vel.x;
        }
        if pos.x > PITCH_WIDTH - r && !in_goal_band(pos.y) {
            pos.x = PITCH_WIDTH - r;
            vel.x = -vel.x;
        }

        self.spin();
    }

    /// Eases the spin towards a rolling rate set by horizontal speed.
    /// Purely cosmetic.
    pub fn spin(&mut self) {
        let target = -self.body.vel.x * ROLL_RATE;
        self.angular_velocity += (target - self.angular_velocity) * SPIN_EASING;
        self.angle = (self.angle + self.angular_velocity).rem_euclid(360.0);
    }

    /// The goal the ball has fully crossed, if any.
    pub fn goal_crossed(&self) -> Option<Side> {
        let Body { pos, radius, .. } = self.body;
        if !in_goal_band(pos.y) {
            return None;
        }
        if pos.x - radius < 0.0 {
            Some(Side::Left)
        } else if pos.x + radius > PITCH_WIDTH {
            Some(Side::Right)
        } else {
            None
        }
    }
}
