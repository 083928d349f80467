use std::collections::VecDeque;

use cgmath::{InnerSpace, Point3, Vector3};
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::settings::FireworkSettings;

#[derive(Debug, Clone, PartialEq)]
pub struct Spark {
    pub position: Point3<f32>,
    pub velocity: Vector3<f32>,
    pub colour: [f32; 3],
    pub age: u32,
    pub lifetime: u32,
}

impl Spark {
    /// Fades linearly from 1 to 0 over the lifetime.
    pub fn opacity(&self) -> f32 {
        1.0 - (self.age as f32 / self.lifetime as f32).min(1.0)
    }
}

#[derive(Debug)]
pub struct Fireworks {
    pub sparks: VecDeque<Spark>,
    settings: FireworkSettings,
    rng: StdRng,
}

impl Fireworks {
    pub fn new(settings: &FireworkSettings, seed: u64) -> Self {
        Self {
            sparks: VecDeque::with_capacity(settings.capacity),
            settings: settings.clone(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Emits one burst at `origin`, cycling through `colours`. The oldest
    /// sparks make room once the pool is full.
    pub fn burst(&mut self, origin: Point3<f32>, colours: &[[f32; 3]]) {
        let s = &self.settings;
        if colours.is_empty() || s.capacity == 0 {
            return;
        }
        for i in 0..s.particles_per_burst {
            let direction = loop {
                let v = Vector3::new(
                    self.rng.gen_range(-1.0..=1.0f32),
                    self.rng.gen_range(-1.0..=1.0f32),
                    self.rng.gen_range(-1.0..=1.0f32),
                );
                let m = v.magnitude2();
                if m > 1e-4 && m <= 1.0 {
                    break v.normalize();
                }
            };
            let speed = self.rng.gen_range(s.min_speed..=s.max_speed);
            if self.sparks.len() >= s.capacity {
                self.sparks.pop_front();
            }
            self.sparks.push_back(Spark {
                position: origin,
                velocity: direction * speed,
                colour: colours[i % colours.len()],
                age: 0,
                lifetime: s.lifetime_steps,
            });
        }
    }

    pub fn step(&mut self) {
        let s = &self.settings;
        for spark in &mut self.sparks {
            spark.velocity.y -= s.gravity;
            spark.velocity *= s.drag;
            spark.position += spark.velocity;
            spark.age += 1;
        }
        self.sparks.retain(|spark| spark.age < spark.lifetime);
    }

    pub fn is_empty(&self) -> bool {
        self.sparks.is_empty()
    }
}
