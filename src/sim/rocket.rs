//! Rocket flight model.
//!
//! Forward is -Z. Speed is a signed scalar along that axis; strafing and
//! climbing use separate lateral velocities that die off quickly once
//! released. Tilt is purely cosmetic and blends towards a target derived
//! from the current velocities.

use cgmath::{InnerSpace, Point3, Quaternion, Rad, Rotation, Rotation3, Vector3};

use crate::{
    settings::FlightSettings,
    sim::{
        input::{Controls, Held},
        lerp,
    },
};

const REST_EPSILON: f32 = 1e-4;
const BOUNCE_DAMPING: f32 = 0.5;
const BOUNCE_KICK: f32 = 0.15;
const NOSE_OFFSET: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Exhaust {
    pub visible: bool,
    pub length: f32,
    pub opacity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RocketState {
    pub position: Point3<f32>,
    pub speed: f32,
    pub velocity_x: f32,
    pub velocity_y: f32,
    pub pitch: f32,
    pub roll: f32,
}

impl Default for RocketState {
    fn default() -> Self {
        Self {
            position: Point3::new(0.0, 0.0, 0.0),
            speed: 0.0,
            velocity_x: 0.0,
            velocity_y: 0.0,
            pitch: 0.0,
            roll: 0.0,
        }
    }
}

impl RocketState {
    /// Advances one simulation step.
    pub fn step(&mut self, controls: &Controls, flight: &FlightSettings) {
        self.update_speed(controls, flight);
        self.update_lateral(controls, flight);

        self.position.z -= self.speed;
        self.position.x += self.velocity_x;
        self.position.y += self.velocity_y;
        self.clamp_to_bounds(flight.bounds);

        let target_pitch = -self.speed * flight.tilt_factor;
        let target_roll = -self.velocity_x * flight.roll_factor;
        self.pitch = lerp(self.pitch, target_pitch, flight.blend);
        self.roll = lerp(self.roll, target_roll, flight.blend);
    }

    fn update_speed(&mut self, controls: &Controls, flight: &FlightSettings) {
        let boosting = controls.is_held(Held::Boost);
        let boost = if boosting {
            flight.boost_multiplier
        } else {
            1.0
        };
        let cap = flight.max_speed * boost;

        // Forward wins while both are held.
        if controls.is_held(Held::Forward) {
            if self.speed > cap {
                // Boost released while above the regular cap.
                self.speed = (self.speed * flight.drag).max(cap);
            } else {
                self.speed = (self.speed + flight.acceleration * boost).min(cap);
            }
        } else if controls.is_held(Held::Backward) {
            self.speed = (self.speed - flight.acceleration).max(-flight.max_reverse_speed);
        } else {
            self.speed *= flight.drag;
        }

        if self.speed.abs() < REST_EPSILON {
            self.speed = 0.0;
        }
    }

    fn update_lateral(&mut self, controls: &Controls, flight: &FlightSettings) {
        let steer = |velocity: f32, axis: f32| {
            if axis == 0.0 {
                let decayed = velocity * flight.lateral_drag;
                if decayed.abs() < REST_EPSILON {
                    0.0
                } else {
                    decayed
                }
            } else {
                (velocity + axis * flight.lateral_acceleration)
                    .clamp(-flight.max_lateral_speed, flight.max_lateral_speed)
            }
        };
        self.velocity_x = steer(self.velocity_x, controls.axis(Held::Left, Held::Right));
        self.velocity_y = steer(self.velocity_y, controls.axis(Held::Down, Held::Up));
    }

    fn clamp_to_bounds(&mut self, bounds: f32) {
        if self.position.x.abs() > bounds {
            self.position.x = self.position.x.clamp(-bounds, bounds);
            self.velocity_x = 0.0;
        }
        if self.position.y.abs() > bounds {
            self.position.y = self.position.y.clamp(-bounds, bounds);
            self.velocity_y = 0.0;
        }
    }

    /// Knocks the rocket back after hitting something centred at `obstacle`.
    pub fn bounce(&mut self, obstacle: Point3<f32>, flight: &FlightSettings) {
        let boost_cap = flight.max_speed * flight.boost_multiplier;
        self.speed = (-self.speed * BOUNCE_DAMPING).clamp(-flight.max_reverse_speed, boost_cap);

        let away = Vector3::new(
            self.position.x - obstacle.x,
            self.position.y - obstacle.y,
            0.0,
        );
        let away = if away.magnitude2() > f32::EPSILON {
            away.normalize()
        } else {
            Vector3::unit_x()
        };
        self.velocity_x = (self.velocity_x + away.x * BOUNCE_KICK)
            .clamp(-flight.max_lateral_speed, flight.max_lateral_speed);
        self.velocity_y = (self.velocity_y + away.y * BOUNCE_KICK)
            .clamp(-flight.max_lateral_speed, flight.max_lateral_speed);
    }

    pub fn exhaust(&self) -> Exhaust {
        Exhaust {
            visible: self.speed > 0.0,
            length: 1.0 + 2.0 * self.speed.max(0.0),
            opacity: (2.0 * self.speed).clamp(0.0, 0.8),
        }
    }

    /// The rocket model is built along +Y; this lays it down along -Z and
    /// applies pitch and roll on top.
    pub fn orientation(&self) -> Quaternion<f32> {
        Quaternion::from_angle_z(Rad(self.roll))
            * Quaternion::from_angle_x(Rad(self.pitch))
            * Quaternion::from_angle_x(Rad(-std::f32::consts::FRAC_PI_2))
    }

    pub fn nose(&self) -> Point3<f32> {
        self.position + self.orientation().rotate_vector(Vector3::unit_y() * NOSE_OFFSET)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::keyboard::KeyCode;

    fn press(keys: &[KeyCode]) -> Controls {
        let mut controls = Controls::default();
        for key in keys {
            controls.handle_key(*key, true, false);
        }
        controls
    }

    #[test]
    fn forward_accelerates_up_to_the_cap() {
        let flight = FlightSettings::default();
        let controls = press(&[KeyCode::KeyW]);
        let mut rocket = RocketState::default();
        rocket.step(&controls, &flight);
        assert!((rocket.speed - flight.acceleration).abs() < 1e-6);
        for _ in 0..200 {
            rocket.step(&controls, &flight);
        }
        assert_eq!(rocket.speed, flight.max_speed);
        assert!(rocket.position.z < 0.0);
    }

    #[test]
    fn boost_raises_the_cap_and_decays_back() {
        let flight = FlightSettings::default();
        let boosted = press(&[KeyCode::KeyW, KeyCode::ShiftLeft]);
        let mut rocket = RocketState::default();
        for _ in 0..200 {
            rocket.step(&boosted, &flight);
        }
        assert_eq!(rocket.speed, flight.max_speed * flight.boost_multiplier);

        let cruising = press(&[KeyCode::KeyW]);
        rocket.step(&cruising, &flight);
        assert!(rocket.speed < flight.max_speed * flight.boost_multiplier);
        for _ in 0..500 {
            rocket.step(&cruising, &flight);
        }
        assert_eq!(rocket.speed, flight.max_speed);
    }

    #[test]
    fn forward_wins_over_backward() {
        let flight = FlightSettings::default();
        let controls = press(&[KeyCode::KeyW, KeyCode::KeyS]);
        let mut rocket = RocketState::default();
        rocket.step(&controls, &flight);
        assert!((rocket.speed - flight.acceleration).abs() < 1e-6);

        let mut reversing = RocketState {
            speed: -0.3,
            ..Default::default()
        };
        reversing.step(&controls, &flight);
        assert!(reversing.speed > -0.3);
    }

    #[test]
    fn coasting_decays_to_rest() {
        let flight = FlightSettings::default();
        let mut rocket = RocketState {
            speed: 0.4,
            ..Default::default()
        };
        let idle = Controls::default();
        for _ in 0..1000 {
            rocket.step(&idle, &flight);
        }
        assert_eq!(rocket.speed, 0.0);
    }

    #[test]
    fn reverse_is_capped() {
        let flight = FlightSettings::default();
        let controls = press(&[KeyCode::KeyS]);
        let mut rocket = RocketState::default();
        for _ in 0..500 {
            rocket.step(&controls, &flight);
        }
        assert_eq!(rocket.speed, -flight.max_reverse_speed);
        assert!(rocket.position.z > 0.0);
    }

    #[test]
    fn strafing_stops_at_the_wall() {
        let flight = FlightSettings::default();
        let controls = press(&[KeyCode::KeyD, KeyCode::Space]);
        let mut rocket = RocketState::default();
        for _ in 0..2000 {
            rocket.step(&controls, &flight);
        }
        assert_eq!(rocket.position.x, flight.bounds);
        assert_eq!(rocket.position.y, flight.bounds);
    }

    #[test]
    fn strafing_right_rolls_right() {
        let flight = FlightSettings::default();
        let controls = press(&[KeyCode::KeyD]);
        let mut rocket = RocketState::default();
        for _ in 0..10 {
            rocket.step(&controls, &flight);
        }
        assert!(rocket.velocity_x > 0.0);
        assert!(rocket.roll < 0.0);
    }

    #[test]
    fn pitch_follows_speed() {
        let flight = FlightSettings::default();
        let controls = press(&[KeyCode::KeyW]);
        let mut rocket = RocketState::default();
        for _ in 0..300 {
            rocket.step(&controls, &flight);
        }
        let target = -flight.max_speed * flight.tilt_factor;
        assert!((rocket.pitch - target).abs() < 1e-3);
    }

    #[test]
    fn exhaust_tracks_speed() {
        let idle = RocketState::default().exhaust();
        assert!(!idle.visible);

        let fast = RocketState {
            speed: 0.5,
            ..Default::default()
        }
        .exhaust();
        assert!(fast.visible);
        assert!((fast.length - 2.0).abs() < 1e-6);
        assert!((fast.opacity - 0.8).abs() < 1e-6);
    }

    #[test]
    fn nose_points_forward_when_level() {
        let rocket = RocketState::default();
        let nose = rocket.nose();
        assert!(nose.z < -1.9);
        assert!(nose.x.abs() < 1e-5 && nose.y.abs() < 1e-5);
    }

    #[test]
    fn bounce_reverses_and_pushes_away() {
        let flight = FlightSettings::default();
        let mut rocket = RocketState {
            speed: 0.4,
            ..Default::default()
        };
        rocket.bounce(Point3::new(1.0, 0.0, -1.0), &flight);
        assert!((rocket.speed + 0.2).abs() < 1e-6);
        assert!(rocket.velocity_x < 0.0);
    }
}
