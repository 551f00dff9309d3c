//! Snapshot buffering and delayed interpolation.
//!
//! Snapshots arrive unordered and lossy. The buffer keeps them sorted by their
//! server timestamp and renders the world a fixed delay behind the newest one,
//! blending the two snapshots that bracket the render time.

use shared::{EntityState, Snapshot, INTERPOLATION_DELAY_MS};
use std::collections::VecDeque;

pub const DEFAULT_CAPACITY: usize = 120;

/// What the renderer gets for a frame.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncState {
    /// Not enough history to interpolate. Show a waiting screen.
    NotReady,
    Ready(Snapshot),
}

impl SyncState {
    pub fn snapshot(&self) -> Option<&Snapshot> {
        match self {
            SyncState::Ready(snapshot) => Some(snapshot),
            SyncState::NotReady => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SnapshotBuffer {
    snapshots: VecDeque<Snapshot>,
    capacity: usize,
    delay_ms: i64,
    /// Smallest `local receive time - server timestamp` seen so far.
    clock_offset_ms: Option<i64>,
}

impl SnapshotBuffer {
    pub fn new() -> Self {
        Self::with_settings(DEFAULT_CAPACITY, INTERPOLATION_DELAY_MS)
    }

    pub fn with_settings(capacity: usize, delay_ms: u64) -> Self {
        Self {
            snapshots: VecDeque::with_capacity(capacity),
            capacity: capacity.max(2),
            delay_ms: i64::try_from(delay_ms).unwrap_or(i64::MAX),
            clock_offset_ms: None,
        }
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Newest snapshot by server time.
    pub fn latest(&self) -> Option<&Snapshot> {
        self.snapshots.back()
    }

    pub fn clock_offset_ms(&self) -> Option<i64> {
        self.clock_offset_ms
    }

    /// Inserts a snapshot received at `local_ms` on the client clock.
    ///
    /// Returns false for a duplicate timestamp, which is dropped. When the
    /// buffer is over capacity the oldest snapshot goes.
    pub fn push(&mut self, snapshot: Snapshot, local_ms: u64) -> bool {
        let ts = snapshot.timestamp_ms;
        let index = self.snapshots.partition_point(|s| s.timestamp_ms < ts);
        if self
            .snapshots
            .get(index)
            .is_some_and(|s| s.timestamp_ms == ts)
        {
            return false;
        }

        // Lowest observed transit time is the best guess at the true offset.
        let offset = local_ms as i64 - ts as i64;
        self.clock_offset_ms = Some(self.clock_offset_ms.map_or(offset, |o| o.min(offset)));

        self.snapshots.insert(index, snapshot);
        while self.snapshots.len() > self.capacity {
            self.snapshots.pop_front();
        }
        true
    }

    /// Render time in the server's time base, or `None` before any snapshot.
    pub fn render_time(&self, local_now_ms: u64) -> Option<i64> {
        self.clock_offset_ms
            .map(|offset| local_now_ms as i64 - offset - self.delay_ms)
    }

    /// Interpolated world for the current local time.
    pub fn sample(&mut self, local_now_ms: u64) -> SyncState {
        match self.render_time(local_now_ms) {
            Some(render_time) => self.sample_at(render_time),
            None => SyncState::NotReady,
        }
    }

    /// Interpolated world at `render_time` (server milliseconds).
    ///
    /// Snapshots older than the bracketing pair are dropped. Never
    /// extrapolates: past the newest snapshot the newest one is returned.
    pub fn sample_at(&mut self, render_time: i64) -> SyncState {
        while self.snapshots.len() > 2 && (self.snapshots[1].timestamp_ms as i64) <= render_time {
            self.snapshots.pop_front();
        }

        if self.snapshots.len() < 2 {
            return SyncState::NotReady;
        }
        if render_time < self.snapshots[0].timestamp_ms as i64 {
            return SyncState::NotReady;
        }

        let prev = &self.snapshots[0];
        let next = &self.snapshots[1];
        let span = (next.timestamp_ms - prev.timestamp_ms) as f32;
        let t = ((render_time - prev.timestamp_ms as i64) as f32 / span).clamp(0.0, 1.0);

        SyncState::Ready(interpolate(prev, next, t))
    }
}

impl Default for SnapshotBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Blends the numeric state of two snapshots. Discrete fields (score, goal
/// timer, clock, phase, tick) come from `next`.
pub fn interpolate(prev: &Snapshot, next: &Snapshot, t: f32) -> Snapshot {
    let lerp = |a: &EntityState, b: &EntityState| a.lerp(b, t);
    let span = next.timestamp_ms.saturating_sub(prev.timestamp_ms) as f32;

    Snapshot {
        timestamp_ms: prev.timestamp_ms + (span * t).round() as u64,
        tick: next.tick,
        p1: lerp(&prev.p1, &next.p1),
        p2: lerp(&prev.p2, &next.p2),
        gk1: lerp(&prev.gk1, &next.gk1),
        gk2: lerp(&prev.gk2, &next.gk2),
        ball: lerp(&prev.ball, &next.ball),
        ball_angle: lerp_angle(prev.ball_angle, next.ball_angle, t),
        score: next.score,
        goal_timer: next.goal_timer,
        time_left: next.time_left,
        phase: next.phase,
    }
}

/// Interpolates degrees along the shorter way round. Result in `[0, 360)`.
pub fn lerp_angle(from: f32, to: f32, t: f32) -> f32 {
    let diff = (to - from + 180.0).rem_euclid(360.0) - 180.0;
    (from + diff * t).rem_euclid(360.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use shared::MatchPhase;

    fn snapshot(timestamp_ms: u64, p1_x: f32) -> Snapshot {
        let at = |x: f32, y: f32| EntityState {
            x,
            y,
            vx: 0.0,
            vy: 0.0,
        };
        Snapshot {
            timestamp_ms,
            tick: timestamp_ms / 16,
            p1: at(p1_x, 300.0),
            p2: at(800.0, 300.0),
            gk1: at(50.0, 300.0),
            gk2: at(950.0, 300.0),
            ball: at(500.0, 300.0),
            ball_angle: 0.0,
            score: [0, 0],
            goal_timer: 0,
            time_left: 300.0,
            phase: MatchPhase::Playing,
        }
    }

    #[test]
    fn test_midpoint_interpolation() {
        let mut buffer = SnapshotBuffer::new();
        buffer.push(snapshot(0, 100.0), 0);
        buffer.push(snapshot(1000, 200.0), 1000);

        let state = buffer.sample_at(500);
        let p1 = state.snapshot().unwrap().p1;
        assert_approx_eq!(p1.x, 150.0, 1e-4);
        assert_eq!(p1.y, 300.0);
    }

    #[test]
    fn test_not_ready_with_fewer_than_two() {
        let mut buffer = SnapshotBuffer::new();
        assert_eq!(buffer.sample_at(0), SyncState::NotReady);
        assert_eq!(buffer.sample(1000), SyncState::NotReady);

        buffer.push(snapshot(100, 100.0), 150);
        assert_eq!(buffer.sample_at(100), SyncState::NotReady);
        assert_eq!(buffer.sample_at(5000), SyncState::NotReady);
    }

    #[test]
    fn test_not_ready_before_oldest() {
        let mut buffer = SnapshotBuffer::new();
        buffer.push(snapshot(1000, 100.0), 1000);
        buffer.push(snapshot(1016, 110.0), 1016);

        assert_eq!(buffer.sample_at(999), SyncState::NotReady);
        assert_eq!(buffer.sample_at(-50), SyncState::NotReady);
        assert!(buffer.sample_at(1000).snapshot().is_some());
    }

    #[test]
    fn test_never_extrapolates() {
        let mut buffer = SnapshotBuffer::new();
        buffer.push(snapshot(0, 100.0), 0);
        buffer.push(snapshot(100, 200.0), 100);

        let state = buffer.sample_at(10_000);
        assert_eq!(state.snapshot().unwrap().p1.x, 200.0);
    }

    #[test]
    fn test_out_of_order_arrival_is_sorted() {
        let mut buffer = SnapshotBuffer::new();
        buffer.push(snapshot(200, 300.0), 250);
        buffer.push(snapshot(0, 100.0), 260);
        buffer.push(snapshot(100, 200.0), 270);

        assert_eq!(buffer.len(), 3);
        let state = buffer.sample_at(50);
        assert_approx_eq!(state.snapshot().unwrap().p1.x, 150.0, 1e-4);
    }

    #[test]
    fn test_duplicates_are_dropped() {
        let mut buffer = SnapshotBuffer::new();
        assert!(buffer.push(snapshot(100, 100.0), 100));
        assert!(!buffer.push(snapshot(100, 999.0), 120));
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.latest().unwrap().p1.x, 100.0);
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut buffer = SnapshotBuffer::with_settings(4, 100);
        for i in 0..10 {
            buffer.push(snapshot(i * 16, i as f32), i * 16);
        }
        assert_eq!(buffer.len(), 4);
        assert_eq!(buffer.latest().unwrap().timestamp_ms, 144);
    }

    #[test]
    fn test_prunes_but_keeps_bracketing_pair() {
        let mut buffer = SnapshotBuffer::new();
        for i in 0..6 {
            buffer.push(snapshot(i * 100, i as f32 * 10.0), i * 100);
        }

        let state = buffer.sample_at(350);

        assert_approx_eq!(state.snapshot().unwrap().p1.x, 35.0, 1e-4);
        // 300 and 400 bracket the render time; 500 is kept for later.
        assert_eq!(buffer.len(), 3);
    }

    #[test]
    fn test_discrete_fields_come_from_newer() {
        let mut older = snapshot(0, 100.0);
        older.score = [0, 0];
        older.goal_timer = 0;
        older.time_left = 100.0;
        let mut newer = snapshot(100, 200.0);
        newer.score = [1, 0];
        newer.goal_timer = 90;
        newer.time_left = 99.9;
        newer.phase = MatchPhase::Paused;

        let blended = interpolate(&older, &newer, 0.25);

        assert_eq!(blended.score, [1, 0]);
        assert_eq!(blended.goal_timer, 90);
        assert_eq!(blended.time_left, 99.9);
        assert_eq!(blended.phase, MatchPhase::Paused);
        assert_eq!(blended.tick, newer.tick);
        assert_eq!(blended.timestamp_ms, 25);
        assert_approx_eq!(blended.p1.x, 125.0, 1e-4);
    }

    #[test]
    fn test_velocity_is_interpolated() {
        let mut a = snapshot(0, 100.0);
        a.ball.vx = -4.0;
        let mut b = snapshot(100, 100.0);
        b.ball.vx = 4.0;

        let blended = interpolate(&a, &b, 0.5);
        assert_approx_eq!(blended.ball.vx, 0.0, 1e-6);
    }

    #[test]
    fn test_angle_takes_short_way_round() {
        assert_approx_eq!(lerp_angle(350.0, 10.0, 0.5), 0.0, 1e-4);
        assert_approx_eq!(lerp_angle(10.0, 350.0, 0.25), 5.0, 1e-4);
        assert_approx_eq!(lerp_angle(90.0, 180.0, 0.5), 135.0, 1e-4);
        assert!((0.0..360.0).contains(&lerp_angle(359.0, 1.0, 0.9)));
    }

    #[test]
    fn test_clock_offset_uses_fastest_delivery() {
        let mut buffer = SnapshotBuffer::new();
        buffer.push(snapshot(1000, 0.0), 5030);
        buffer.push(snapshot(1016, 0.0), 5020);
        buffer.push(snapshot(1032, 0.0), 5060);

        assert_eq!(buffer.clock_offset_ms(), Some(4004));
        assert_eq!(buffer.render_time(5200), Some(5200 - 4004 - 100));
    }

    #[test]
    fn test_sample_uses_delayed_render_time() {
        let mut buffer = SnapshotBuffer::new();
        // Offset 0: the client clock matches the server clock.
        buffer.push(snapshot(0, 100.0), 0);
        buffer.push(snapshot(1000, 200.0), 1000);

        let state = buffer.sample(600);
        assert_approx_eq!(state.snapshot().unwrap().p1.x, 150.0, 1e-4);
    }
}
