use cgmath::{InnerSpace, MetricSpace, Point3, Quaternion, Rad, Rotation3, Vector3};
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::settings::AsteroidSettings;

#[derive(Debug, Clone, PartialEq)]
pub struct Asteroid {
    pub position: Point3<f32>,
    pub radius: f32,
    pub spin_axis: Vector3<f32>,
    pub spin_rate: f32,
    pub angle: f32,
}

impl Asteroid {
    pub fn rotation(&self) -> Quaternion<f32> {
        Quaternion::from_axis_angle(self.spin_axis, Rad(self.angle))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub index: usize,
    pub position: Point3<f32>,
}

#[derive(Debug)]
pub struct AsteroidField {
    pub asteroids: Vec<Asteroid>,
    settings: AsteroidSettings,
    bounds: f32,
    rng: StdRng,
}

impl AsteroidField {
    /// Scatters the field ahead of `origin` (towards -Z).
    pub fn new(settings: &AsteroidSettings, bounds: f32, origin: Point3<f32>, seed: u64) -> Self {
        let mut field = Self {
            asteroids: Vec::with_capacity(settings.count),
            settings: settings.clone(),
            bounds,
            rng: StdRng::seed_from_u64(seed),
        };
        for _ in 0..settings.count {
            let asteroid = field.spawn(origin, settings.near);
            field.asteroids.push(asteroid);
        }
        field
    }

    fn spawn(&mut self, origin: Point3<f32>, near: f32) -> Asteroid {
        let s = &self.settings;
        let rng = &mut self.rng;
        let distance = rng.gen_range(near..s.depth.max(near + 1.0));
        let axis = Vector3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0f32),
        );
        let spin_axis = if axis.magnitude2() > 1e-6 {
            axis.normalize()
        } else {
            Vector3::unit_y()
        };
        Asteroid {
            position: Point3::new(
                rng.gen_range(-self.bounds..=self.bounds),
                rng.gen_range(-self.bounds..=self.bounds),
                origin.z - distance,
            ),
            radius: rng.gen_range(s.min_radius..=s.max_radius),
            spin_axis,
            spin_rate: rng.gen_range(-s.max_spin..=s.max_spin),
            angle: rng.gen_range(0.0..std::f32::consts::TAU),
        }
    }

    /// Spins and recycles the field, then tests the rocket against it.
    /// At most one hit is reported per step; the asteroid that was hit
    /// respawns far ahead.
    pub fn step(&mut self, rocket: Point3<f32>, hit_radius: f32) -> Option<Hit> {
        let recycle_at = rocket.z + self.settings.recycle_distance;
        let respawn_near = self.settings.near;
        for i in 0..self.asteroids.len() {
            let asteroid = &mut self.asteroids[i];
            asteroid.angle =
                (asteroid.angle + asteroid.spin_rate).rem_euclid(std::f32::consts::TAU);
            if asteroid.position.z > recycle_at {
                self.asteroids[i] = self.spawn(rocket, respawn_near);
            }
        }

        let index = self.asteroids.iter().position(|a| {
            let reach = hit_radius + a.radius;
            a.position.distance2(rocket) < reach * reach
        })?;
        let position = self.asteroids[index].position;
        self.asteroids[index] = self.spawn(rocket, respawn_near);
        Some(Hit { index, position })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field() -> AsteroidField {
        AsteroidField::new(
            &AsteroidSettings::default(),
            40.0,
            Point3::new(0.0, 0.0, 0.0),
            7,
        )
    }

    #[test]
    fn spawns_ahead_of_the_origin() {
        let field = field();
        let s = AsteroidSettings::default();
        assert_eq!(field.asteroids.len(), s.count);
        assert!(field.asteroids.iter().all(|a| {
            a.position.z <= -s.near
                && a.position.z >= -s.depth
                && a.position.x.abs() <= 40.0
                && a.radius >= s.min_radius
                && a.radius <= s.max_radius
        }));
    }

    #[test]
    fn passed_asteroids_are_recycled() {
        let mut field = field();
        // Far past every asteroid and outside the corridor, so nothing hits.
        let rocket = Point3::new(1000.0, 1000.0, -2000.0);
        field.step(rocket, 1.4);
        assert!(field.asteroids.iter().all(|a| a.position.z < rocket.z));
    }

    #[test]
    fn overlapping_asteroid_is_reported_and_respawned() {
        let mut field = field();
        let target = field.asteroids[3].position;
        let hit = field.step(target, 1.4).expect("rocket sits inside an asteroid");
        assert!(hit.position.distance(target) < 1.4 + 2.0 * AsteroidSettings::default().max_radius);
        assert!(field.asteroids[hit.index].position.z < target.z);
    }

    #[test]
    fn spin_accumulates() {
        let mut field = field();
        let before: Vec<f32> = field.asteroids.iter().map(|a| a.angle).collect();
        field.step(Point3::new(1000.0, 1000.0, 0.0), 1.4);
        let changed = field
            .asteroids
            .iter()
            .zip(before)
            .filter(|(a, b)| (a.angle - b).abs() > 0.0)
            .count();
        assert!(changed > 0);
    }
}
