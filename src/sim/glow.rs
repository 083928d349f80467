//! Screen-space glow particles behind the 3D scene.
//!
//! Coordinates are physical pixels centred on the window with y pointing
//! up. Particles within the repulsion radius of the cursor are pushed away
//! and light up; the rest drift slowly and wrap around the edges.

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::settings::GlowSettings;

const PUSH: f32 = 5.0;
const BRIGHTEN: f32 = 0.7;
const GROW: f32 = 1.5;

#[derive(Debug, Clone, PartialEq)]
pub struct GlowParticle {
    pub position: [f32; 2],
    pub velocity: [f32; 2],
    pub colour: [f32; 3],
    pub base_brightness: f32,
    pub brightness: f32,
    pub scale: f32,
}

#[derive(Debug)]
pub struct GlowField {
    pub particles: Vec<GlowParticle>,
    settings: GlowSettings,
    width: f32,
    height: f32,
    mouse: Option<[f32; 2]>,
}

impl GlowField {
    pub fn new(settings: &GlowSettings, width: u32, height: u32, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let (w, h) = (width.max(1) as f32, height.max(1) as f32);
        let half_drift = settings.drift / 2.0;
        let particles = (0..settings.count)
            .map(|_| {
                let base_brightness = rng.gen_range(0.5..=1.0);
                GlowParticle {
                    position: [
                        rng.gen_range(-w / 2.0..=w / 2.0),
                        rng.gen_range(-h / 2.0..=h / 2.0),
                    ],
                    velocity: [
                        rng.gen_range(-half_drift..=half_drift),
                        rng.gen_range(-half_drift..=half_drift),
                    ],
                    colour: [
                        rng.gen_range(0.3..=0.5),
                        rng.gen_range(0.3..=0.5),
                        rng.gen_range(0.8..=1.0),
                    ],
                    base_brightness,
                    brightness: base_brightness,
                    scale: 1.0,
                }
            })
            .collect();
        Self {
            particles,
            settings: settings.clone(),
            width: w,
            height: h,
            mouse: None,
        }
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn radius(&self) -> f32 {
        self.settings.radius
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width.max(1) as f32;
        self.height = height.max(1) as f32;
    }

    /// Cursor position in window coordinates (origin top left, y down).
    pub fn set_mouse_window(&mut self, x: f64, y: f64) {
        self.mouse = Some([
            x as f32 - self.width / 2.0,
            self.height / 2.0 - y as f32,
        ]);
    }

    pub fn clear_mouse(&mut self) {
        self.mouse = None;
    }

    pub fn step(&mut self) {
        let s = &self.settings;
        let (half_w, half_h) = (self.width / 2.0, self.height / 2.0);
        for p in &mut self.particles {
            let distance = self.mouse.map(|m| {
                let dx = p.position[0] - m[0];
                let dy = p.position[1] - m[1];
                (dx, dy, (dx * dx + dy * dy).sqrt())
            });

            match distance {
                Some((dx, dy, d)) if d < s.repulsion_radius => {
                    let factor = (1.0 - d / s.repulsion_radius) * s.repulsion_strength;
                    if d > f32::EPSILON {
                        p.position[0] += dx / d * factor * PUSH;
                        p.position[1] += dy / d * factor * PUSH;
                    }
                    p.brightness = p.base_brightness + BRIGHTEN * factor;
                    p.scale = 1.0 + GROW * factor;
                }
                _ => {
                    p.brightness = p.base_brightness;
                    p.scale = 1.0;
                }
            }

            let calm = distance.is_none_or(|(_, _, d)| d > s.repulsion_radius / 2.0);
            if calm {
                p.position[0] += p.velocity[0];
                p.position[1] += p.velocity[1];
            }

            p.position[0] = wrap(p.position[0], half_w);
            p.position[1] = wrap(p.position[1], half_h);
        }
    }
}

fn wrap(v: f32, half: f32) -> f32 {
    if v > half {
        -half
    } else if v < -half {
        half
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(position: [f32; 2]) -> GlowField {
        let mut field = GlowField::new(
            &GlowSettings {
                count: 1,
                ..Default::default()
            },
            800,
            600,
            1,
        );
        field.particles[0].position = position;
        field.particles[0].velocity = [0.0, 0.0];
        field
    }

    #[test]
    fn particles_start_on_screen_and_blue() {
        let field = GlowField::new(&GlowSettings::default(), 800, 600, 5);
        assert_eq!(field.particles.len(), 100);
        assert!(field.particles.iter().all(|p| {
            p.position[0].abs() <= 400.0
                && p.position[1].abs() <= 300.0
                && p.colour[2] >= 0.8
                && p.colour[0] <= 0.5
        }));
    }

    #[test]
    fn cursor_pushes_and_brightens() {
        let mut field = single([50.0, 0.0]);
        // Window centre.
        field.set_mouse_window(400.0, 300.0);
        let base = field.particles[0].base_brightness;
        field.step();
        let p = &field.particles[0];
        assert!(p.position[0] > 50.0);
        assert!(p.brightness > base);
        assert!(p.scale > 1.0);
    }

    #[test]
    fn far_particles_relax() {
        let mut field = single([350.0, 250.0]);
        field.set_mouse_window(0.0, 600.0);
        field.particles[0].brightness = 5.0;
        field.particles[0].scale = 3.0;
        field.step();
        let p = &field.particles[0];
        assert_eq!(p.brightness, p.base_brightness);
        assert_eq!(p.scale, 1.0);
    }

    #[test]
    fn no_cursor_no_repulsion() {
        let mut field = single([0.0, 0.0]);
        field.step();
        assert_eq!(field.particles[0].position, [0.0, 0.0]);
        assert_eq!(field.particles[0].scale, 1.0);
    }

    #[test]
    fn particles_wrap_at_the_edges() {
        let mut field = single([399.99, 0.0]);
        field.particles[0].velocity = [0.05, 0.0];
        field.step();
        assert_eq!(field.particles[0].position[0], -400.0);
    }
}
