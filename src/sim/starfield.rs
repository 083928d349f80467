use cgmath::Point3;
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::settings::StarfieldSettings;

const WRAP_TOLERANCE: f32 = 1e-3;

/// Fixed set of points that wraps around whatever it is centred on.
#[derive(Debug, Clone)]
pub struct Starfield {
    pub stars: Vec<Point3<f32>>,
    extent: f32,
}

impl Starfield {
    pub fn new(settings: &StarfieldSettings, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let half = settings.extent / 2.0;
        let stars = (0..settings.count)
            .map(|_| {
                Point3::new(
                    rng.gen_range(-half..half),
                    rng.gen_range(-half..half),
                    rng.gen_range(-half..half),
                )
            })
            .collect();
        Self {
            stars,
            extent: settings.extent,
        }
    }

    pub fn extent(&self) -> f32 {
        self.extent
    }

    /// Wraps every star into the cube centred on `center`. Returns whether
    /// anything moved.
    pub fn recenter(&mut self, center: Point3<f32>) -> bool {
        let extent = self.extent;
        let half = extent / 2.0;
        let wrap = |v: f32, c: f32| (v - c + half).rem_euclid(extent) - half + c;
        let mut moved = false;
        for star in &mut self.stars {
            let wrapped = Point3::new(
                wrap(star.x, center.x),
                wrap(star.y, center.y),
                wrap(star.z, center.z),
            );
            if (wrapped.x - star.x).abs() > WRAP_TOLERANCE
                || (wrapped.y - star.y).abs() > WRAP_TOLERANCE
                || (wrapped.z - star.z).abs() > WRAP_TOLERANCE
            {
                *star = wrapped;
                moved = true;
            }
        }
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> StarfieldSettings {
        StarfieldSettings {
            count: 500,
            extent: 100.0,
            size: 0.2,
        }
    }

    #[test]
    fn stars_fill_the_cube() {
        let field = Starfield::new(&settings(), 1);
        assert_eq!(field.stars.len(), 500);
        assert!(
            field
                .stars
                .iter()
                .all(|s| s.x.abs() <= 50.0 && s.y.abs() <= 50.0 && s.z.abs() <= 50.0)
        );
    }

    #[test]
    fn same_seed_same_sky() {
        let a = Starfield::new(&settings(), 9);
        let b = Starfield::new(&settings(), 9);
        assert_eq!(a.stars, b.stars);
    }

    #[test]
    fn recentering_keeps_stars_around_the_center() {
        let mut field = Starfield::new(&settings(), 3);
        let center = Point3::new(0.0, 0.0, -175.0);
        assert!(field.recenter(center));
        assert!(field.stars.iter().all(|s| (s.z - center.z).abs() <= 50.0 + 1e-3));
        assert!(!field.recenter(center));
    }
}
