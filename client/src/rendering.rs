use crate::game::Connection;
use crate::sync::SyncState;
use macroquad::prelude::*;
use shared::{
    EntityState, GameMode, MatchPhase, Outcome, Slot, Snapshot, BALL_RADIUS, CAR_RADIUS,
    GOAL_BOTTOM_Y, GOAL_TOP_Y, PITCH_HEIGHT, PITCH_WIDTH,
};

/// Height of the score bar above the pitch.
pub const HUD_HEIGHT: f32 = 50.0;
const GOAL_DEPTH: f32 = 24.0;

const GRASS: Color = Color::new(0.16, 0.45, 0.2, 1.0);
const ICE: Color = Color::new(0.78, 0.88, 0.95, 1.0);
const P1_COLOR: Color = Color::new(0.2, 0.5, 1.0, 1.0);
const P2_COLOR: Color = Color::new(1.0, 0.35, 0.25, 1.0);
const KEEPER_TINT: f32 = 0.6;

/// Per-frame information the world snapshot does not carry.
#[derive(Debug, Clone)]
pub struct HudInfo<'a> {
    pub connection: &'a Connection,
    pub server: String,
    pub mode: GameMode,
}

/// Draws the pitch in pitch coordinates, shifted below the HUD bar.
pub struct Renderer {
    origin: Vec2,
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            origin: vec2(GOAL_DEPTH, HUD_HEIGHT),
        }
    }

    pub fn window_size() -> (i32, i32) {
        (
            (PITCH_WIDTH + 2.0 * GOAL_DEPTH) as i32,
            (PITCH_HEIGHT + HUD_HEIGHT) as i32,
        )
    }

    fn at(&self, x: f32, y: f32) -> Vec2 {
        self.origin + vec2(x, y)
    }

    pub fn render(&self, state: &SyncState, hud: &HudInfo) {
        clear_background(Color::from_rgba(26, 26, 26, 255));

        match state {
            SyncState::Ready(snapshot) => {
                self.draw_pitch(hud.mode == GameMode::Hockey);
                self.draw_world(snapshot);
                self.draw_hud(snapshot, hud);
                self.draw_overlay(snapshot, hud);
            }
            SyncState::NotReady => self.draw_waiting(hud),
        }
    }

    fn draw_pitch(&self, ice: bool) {
        let top_left = self.at(0.0, 0.0);
        let surface = if ice { ICE } else { GRASS };
        let lines = if ice { RED } else { WHITE };

        draw_rectangle(top_left.x, top_left.y, PITCH_WIDTH, PITCH_HEIGHT, surface);
        draw_rectangle_lines(top_left.x, top_left.y, PITCH_WIDTH, PITCH_HEIGHT, 3.0, lines);

        let mid_top = self.at(PITCH_WIDTH / 2.0, 0.0);
        draw_line(mid_top.x, mid_top.y, mid_top.x, mid_top.y + PITCH_HEIGHT, 2.0, lines);
        let center = self.at(PITCH_WIDTH / 2.0, PITCH_HEIGHT / 2.0);
        draw_circle_lines(center.x, center.y, 70.0, 2.0, lines);

        // Goal mouths sit outside the pitch rectangle.
        let mouth = GOAL_BOTTOM_Y - GOAL_TOP_Y;
        let left = self.at(-GOAL_DEPTH, GOAL_TOP_Y);
        let right = self.at(PITCH_WIDTH, GOAL_TOP_Y);
        draw_rectangle(left.x, left.y, GOAL_DEPTH, mouth, DARKGRAY);
        draw_rectangle(right.x, right.y, GOAL_DEPTH, mouth, DARKGRAY);
        draw_rectangle_lines(left.x, left.y, GOAL_DEPTH, mouth, 2.0, WHITE);
        draw_rectangle_lines(right.x, right.y, GOAL_DEPTH, mouth, 2.0, WHITE);
    }

    fn draw_world(&self, snapshot: &Snapshot) {
        let keeper = |c: Color| {
            Color::new(c.r * KEEPER_TINT, c.g * KEEPER_TINT, c.b * KEEPER_TINT, 1.0)
        };

        self.draw_car(&snapshot.gk1, keeper(P1_COLOR));
        self.draw_car(&snapshot.gk2, keeper(P2_COLOR));
        self.draw_car(&snapshot.p1, P1_COLOR);
        self.draw_car(&snapshot.p2, P2_COLOR);
        self.draw_ball(&snapshot.ball, snapshot.ball_angle);
    }

    fn draw_car(&self, car: &EntityState, color: Color) {
        let center = self.at(car.x, car.y);
        draw_circle(center.x, center.y, CAR_RADIUS, color);
        draw_circle_lines(center.x, center.y, CAR_RADIUS, 2.0, WHITE);

        // Nose points along the velocity; a parked car shows none.
        let vel = vec2(car.vx, car.vy);
        if vel.length() > 0.3 {
            let nose = center + vel.normalize() * CAR_RADIUS;
            draw_line(center.x, center.y, nose.x, nose.y, 4.0, YELLOW);
        }
    }

    fn draw_ball(&self, ball: &EntityState, angle_deg: f32) {
        let center = self.at(ball.x, ball.y);
        draw_circle(center.x, center.y, BALL_RADIUS, WHITE);
        draw_circle_lines(center.x, center.y, BALL_RADIUS, 1.5, BLACK);

        let angle = angle_deg.to_radians();
        let marker = center + vec2(angle.cos(), angle.sin()) * (BALL_RADIUS * 0.6);
        draw_circle(marker.x, marker.y, 4.0, BLACK);
    }

    fn draw_hud(&self, snapshot: &Snapshot, hud: &HudInfo) {
        let width = screen_width();

        let score = format!("{}  -  {}", snapshot.score[0], snapshot.score[1]);
        let dims = measure_text(&score, None, 36, 1.0);
        draw_text(&score, (width - dims.width) / 2.0, 36.0, 36.0, WHITE);

        let secs = snapshot.time_left.max(0.0).ceil() as u32;
        let clock = format!("{}:{:02}", secs / 60, secs % 60);
        draw_text(&clock, width - 110.0, 34.0, 30.0, WHITE);

        let seat = match hud.connection {
            Connection::Seated { slot: Slot::P1, .. } => "You: P1 (blue)",
            Connection::Seated { slot: Slot::P2, .. } => "You: P2 (red)",
            _ => "Spectating",
        };
        draw_text(seat, 16.0, 24.0, 22.0, LIGHTGRAY);
        draw_text(hud.mode.label(), 16.0, 44.0, 16.0, GRAY);
    }

    fn draw_overlay(&self, snapshot: &Snapshot, hud: &HudInfo) {
        match snapshot.phase {
            MatchPhase::Warmup => {
                let hint = match hud.connection {
                    Connection::Seated { slot: Slot::P1, .. } => {
                        "WARM-UP: waiting for match start"
                    }
                    _ => "WARM-UP: waiting for host",
                };
                self.banner(hint, 28.0, YELLOW);
            }
            MatchPhase::Paused => self.banner("PAUSED  (P to resume)", 48.0, WHITE),
            MatchPhase::GameOver => {
                let result = match Outcome::from_score(snapshot.score) {
                    Outcome::Winner(Slot::P1) => "GAME OVER: P1 WINS",
                    Outcome::Winner(Slot::P2) => "GAME OVER: P2 WINS",
                    Outcome::Draw => "GAME OVER: DRAW",
                };
                self.banner(result, 48.0, GOLD);
                let hint = "R to restart, Esc to quit";
                let dims = measure_text(hint, None, 24, 1.0);
                draw_text(
                    hint,
                    (screen_width() - dims.width) / 2.0,
                    screen_height() / 2.0 + 48.0,
                    24.0,
                    LIGHTGRAY,
                );
            }
            MatchPhase::Playing if snapshot.goal_timer > 0 => self.banner("GOAL!", 72.0, GOLD),
            MatchPhase::Playing => {}
        }
    }

    fn banner(&self, text: &str, size: f32, color: Color) {
        let dims = measure_text(text, None, size as u16, 1.0);
        let x = (screen_width() - dims.width) / 2.0;
        let y = screen_height() / 2.0;
        draw_rectangle(
            x - 16.0,
            y - dims.height - 12.0,
            dims.width + 32.0,
            dims.height + 28.0,
            Color::new(0.0, 0.0, 0.0, 0.6),
        );
        draw_text(text, x, y, size, color);
    }

    fn draw_waiting(&self, hud: &HudInfo) {
        let message = match hud.connection {
            Connection::Rejected { reason } => format!("Server refused to seat us: {}", reason),
            _ => format!("Connecting to server {}...", hud.server),
        };
        let dims = measure_text(&message, None, 28, 1.0);
        draw_text(
            &message,
            (screen_width() - dims.width) / 2.0,
            screen_height() / 2.0,
            28.0,
            WHITE,
        );
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}
