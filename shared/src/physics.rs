//! Single-pass collision resolution between cars and the ball.
//!
//! Resolution is approximate: each pair is visited once per tick and nothing
//! is iterated to convergence.

use crate::entity::{Ball, Car};
use crate::math::circle_overlap;

/// Restitution of the impulse a car gives the ball.
pub const CAR_BALL_RESTITUTION: f32 = 1.3;
/// Share of the ball impulse pushed back onto the car.
pub const CAR_RECOIL: f32 = 0.3;
/// Tangential relative speed to ball spin. Cosmetic only.
pub const SPIN_TRANSFER: f32 = 2.0;
pub const CAR_CAR_RESTITUTION: f32 = 0.6;
/// Extra gap added on each side when separating two cars.
pub const SEPARATION_EPSILON: f32 = 0.1;

/// Resolves one car against the ball. Returns true on contact.
///
/// The ball is treated as infinitely light: it is pushed out by the whole
/// overlap and the car does not move. When the ball is closing on the car it
/// gets a restitution impulse along the contact normal, scaled by
/// `ball_speed_multiplier`, and the car a small opposite recoil.
pub fn resolve_car_ball(car: &mut Car, ball: &mut Ball, ball_speed_multiplier: f32) -> bool {
    let Some(contact) = circle_overlap(car.body.pos, car.body.radius, ball.body.pos, ball.body.radius)
    else {
        return false;
    };
    let n = contact.normal;

    ball.body.pos += n * contact.overlap;

    let relative = ball.body.vel - car.body.vel;
    let impact = relative.dot(n);
    if impact < 0.0 {
        let impulse = -impact * CAR_BALL_RESTITUTION;
        ball.body.vel += n * (impulse * ball_speed_multiplier);
        car.body.vel -= n * (impulse * CAR_RECOIL);

        let tangent_speed = relative.dot(n.perp());
        ball.angular_velocity += tangent_speed * SPIN_TRANSFER;
    }

    true
}

/// Separates two overlapping cars symmetrically and exchanges the normal
/// components of their velocities. Returns true on contact.
pub fn resolve_car_car(a: &mut Car, b: &mut Car) -> bool {
    let Some(contact) = circle_overlap(a.body.pos, a.body.radius, b.body.pos, b.body.radius) else {
        return false;
    };
    let n = contact.normal;

    let separation = contact.overlap / 2.0 + SEPARATION_EPSILON;
    a.body.pos -= n * separation;
    b.body.pos += n * separation;
    a.body.clamp_to_pitch();
    b.body.clamp_to_pitch();

    let a_normal = a.body.vel.dot(n);
    let b_normal = b.body.vel.dot(n);
    let exchange = (b_normal - a_normal) * CAR_CAR_RESTITUTION;
    a.body.vel += n * exchange;
    b.body.vel -= n * exchange;

    true
}

/// Resolves every car against the ball, then every unordered pair of cars.
///
/// Cars pushed by the ball can still be separated from one another in the same
/// tick because car pairs are handled last.
pub fn resolve_collisions(cars: &mut [Car], ball: &mut Ball, ball_speed_multiplier: f32) -> usize {
    let mut contacts = 0;

    for car in cars.iter_mut() {
        if resolve_car_ball(car, ball, ball_speed_multiplier) {
            contacts += 1;
        }
    }

    for i in 0..cars.len() {
        let (head, tail) = cars.split_at_mut(i + 1);
        let a = &mut head[i];
        for b in tail.iter_mut() {
            if resolve_car_car(a, b) {
                contacts += 1;
            }
        }
    }

    contacts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Side, Slot};
    use crate::math::Vec2;
    use crate::{BALL_RADIUS, CAR_RADIUS};
    use assert_approx_eq::assert_approx_eq;

    fn car_at(x: f32, y: f32) -> Car {
        let mut car = Car::player(Slot::P1, 0.985);
        car.body.pos = Vec2::new(x, y);
        car
    }

    fn ball_at(x: f32, y: f32) -> Ball {
        let mut ball = Ball::new(0.992);
        ball.body.pos = Vec2::new(x, y);
        ball
    }

    #[test]
    fn test_car_ball_pushes_ball_out_fully() {
        let mut car = car_at(300.0, 300.0);
        let mut ball = ball_at(330.0, 300.0);

        assert!(resolve_car_ball(&mut car, &mut ball, 1.0));

        assert_approx_eq!(ball.body.pos.x, 300.0 + CAR_RADIUS + BALL_RADIUS, 1e-4);
        assert_eq!(car.body.pos, Vec2::new(300.0, 300.0));
    }

    #[test]
    fn test_car_ball_impulse_when_approaching() {
        let mut car = car_at(300.0, 300.0);
        car.body.vel = Vec2::new(5.0, 0.0);
        let mut ball = ball_at(330.0, 300.0);

        resolve_car_ball(&mut car, &mut ball, 1.0);

        // relative normal speed -5, impulse 6.5
        assert_approx_eq!(ball.body.vel.x, 6.5, 1e-5);
        assert_approx_eq!(car.body.vel.x, 5.0 - 6.5 * CAR_RECOIL, 1e-5);
    }

    #[test]
    fn test_car_ball_no_impulse_when_separating() {
        let mut car = car_at(300.0, 300.0);
        car.body.vel = Vec2::new(-2.0, 0.0);
        let mut ball = ball_at(330.0, 300.0);
        ball.body.vel = Vec2::new(3.0, 0.0);

        resolve_car_ball(&mut car, &mut ball, 1.0);

        assert_eq!(ball.body.vel, Vec2::new(3.0, 0.0));
        assert_eq!(car.body.vel, Vec2::new(-2.0, 0.0));
    }

    #[test]
    fn test_ball_speed_multiplier_scales_ball_impulse_only() {
        let mut car = car_at(300.0, 300.0);
        car.body.vel = Vec2::new(5.0, 0.0);
        let mut ball = ball_at(330.0, 300.0);

        resolve_car_ball(&mut car, &mut ball, 1.2);

        assert_approx_eq!(ball.body.vel.x, 6.5 * 1.2, 1e-5);
        assert_approx_eq!(car.body.vel.x, 5.0 - 6.5 * CAR_RECOIL, 1e-5);
    }

    #[test]
    fn test_glancing_contact_adds_spin() {
        let mut car = car_at(300.0, 300.0);
        car.body.vel = Vec2::new(4.0, 4.0);
        let mut ball = ball_at(330.0, 300.0);

        resolve_car_ball(&mut car, &mut ball, 1.0);

        // tangent is (0, 1); relative tangential speed is -4
        assert_approx_eq!(ball.angular_velocity, -8.0, 1e-5);
    }

    #[test]
    fn test_no_contact_leaves_everything_alone() {
        let mut car = car_at(100.0, 100.0);
        let mut ball = ball_at(500.0, 300.0);
        let (car_before, ball_before) = (car.clone(), ball.clone());

        assert!(!resolve_car_ball(&mut car, &mut ball, 1.0));
        assert_eq!(car, car_before);
        assert_eq!(ball, ball_before);
    }

    #[test]
    fn test_car_car_symmetric_separation() {
        let mut a = car_at(300.0, 300.0);
        let mut b = car_at(340.0, 300.0);

        assert!(resolve_car_car(&mut a, &mut b));

        // overlap 4 => each moves 2.1
        assert_approx_eq!(a.body.pos.x, 297.9, 1e-4);
        assert_approx_eq!(b.body.pos.x, 342.1, 1e-4);
        let gap = (b.body.pos - a.body.pos).length();
        assert!(gap > 2.0 * CAR_RADIUS);
    }

    #[test]
    fn test_car_car_velocity_exchange() {
        let mut a = car_at(300.0, 300.0);
        let mut b = car_at(340.0, 300.0);
        a.body.vel = Vec2::new(5.0, 1.0);
        b.body.vel = Vec2::new(-1.0, 0.0);

        resolve_car_car(&mut a, &mut b);

        // exchange = (-1 - 5) * 0.6 = -3.6 along x
        assert_approx_eq!(a.body.vel.x, 1.4, 1e-5);
        assert_approx_eq!(b.body.vel.x, 2.6, 1e-5);
        assert_eq!(a.body.vel.y, 1.0);
        // normal momentum is conserved
        assert_approx_eq!(a.body.vel.x + b.body.vel.x, 4.0, 1e-5);
    }

    #[test]
    fn test_car_car_separation_stays_in_pitch() {
        let mut a = car_at(CAR_RADIUS, 300.0);
        let mut b = car_at(CAR_RADIUS + 10.0, 300.0);

        resolve_car_car(&mut a, &mut b);

        assert_eq!(a.body.pos.x, CAR_RADIUS);
    }

    #[test]
    fn test_coincident_cars_are_left_alone() {
        let mut a = car_at(300.0, 300.0);
        let mut b = car_at(300.0, 300.0);
        assert!(!resolve_car_car(&mut a, &mut b));
        assert_eq!(a.body.pos, b.body.pos);
    }

    #[test]
    fn test_resolve_collisions_visits_every_pair() {
        let mut cars = vec![
            car_at(300.0, 300.0),
            car_at(340.0, 300.0),
            Car::keeper(Side::Left, 0.985),
            Car::keeper(Side::Right, 0.985),
        ];
        cars[2].body.pos = Vec2::new(300.0, 340.0);
        cars[3].body.pos = Vec2::new(700.0, 100.0);
        let mut ball = ball_at(270.0, 300.0);

        let contacts = resolve_collisions(&mut cars, &mut ball, 1.0);

        // ball with car 0, car 0 with car 1, car 0 with keeper 2
        assert_eq!(contacts, 3);
        assert_eq!(cars[3].body.pos, Vec2::new(700.0, 100.0));
    }
}
