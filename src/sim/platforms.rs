use cgmath::{MetricSpace, Point3, Quaternion, Rad, Rotation3};

use crate::settings::PlatformSettings;

#[derive(Debug, Clone, PartialEq)]
pub struct Platform {
    /// Index into the project list.
    pub project: usize,
    pub anchor: Point3<f32>,
    pub position: Point3<f32>,
    pub angle: f32,
    phase: f32,
}

impl Platform {
    pub fn rotation(&self) -> Quaternion<f32> {
        Quaternion::from_angle_y(Rad(self.angle))
    }
}

/// Floating content platforms, one per project, strung out along -Z.
#[derive(Debug, Clone)]
pub struct Platforms {
    pub platforms: Vec<Platform>,
    settings: PlatformSettings,
    steps: u64,
}

impl Platforms {
    pub fn new(settings: &PlatformSettings, projects: usize) -> Self {
        let platforms = (0..projects)
            .map(|i| {
                let side = if i % 2 == 0 { -1.0 } else { 1.0 };
                let anchor = Point3::new(
                    side * settings.lateral_offset,
                    ((i % 3) as f32 - 1.0) * 4.0,
                    -settings.spacing * (i + 1) as f32,
                );
                Platform {
                    project: i,
                    anchor,
                    position: anchor,
                    angle: 0.0,
                    phase: i as f32 * 1.3,
                }
            })
            .collect();
        Self {
            platforms,
            settings: settings.clone(),
            steps: 0,
        }
    }

    pub fn step(&mut self) {
        self.steps += 1;
        let t = self.steps as f32;
        let s = &self.settings;
        for platform in &mut self.platforms {
            let bob = (t * s.bob_speed + platform.phase).sin() * s.bob_height;
            platform.position =
                Point3::new(platform.anchor.x, platform.anchor.y + bob, platform.anchor.z);
            platform.angle = (platform.angle + s.spin).rem_euclid(std::f32::consts::TAU);
        }
    }

    /// Closest platform within the interaction radius of `point`.
    pub fn nearest(&self, point: Point3<f32>) -> Option<&Platform> {
        let radius2 = self.settings.interact_radius * self.settings.interact_radius;
        self.platforms
            .iter()
            .map(|p| (p, p.position.distance2(point)))
            .filter(|(_, d)| *d <= radius2)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(p, _)| p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platforms_alternate_sides() {
        let platforms = Platforms::new(&PlatformSettings::default(), 3);
        let xs: Vec<f32> = platforms.platforms.iter().map(|p| p.anchor.x).collect();
        assert_eq!(xs, vec![-12.0, 12.0, -12.0]);
        assert_eq!(platforms.platforms[2].anchor.z, -180.0);
    }

    #[test]
    fn bobbing_stays_within_height() {
        let settings = PlatformSettings::default();
        let mut platforms = Platforms::new(&settings, 3);
        for _ in 0..500 {
            platforms.step();
            for p in &platforms.platforms {
                assert!((p.position.y - p.anchor.y).abs() <= settings.bob_height + 1e-5);
            }
        }
    }

    #[test]
    fn nearest_respects_the_radius() {
        let platforms = Platforms::new(&PlatformSettings::default(), 3);
        assert!(platforms.nearest(Point3::new(0.0, 0.0, 0.0)).is_none());
        let near_second = Point3::new(8.0, 0.0, -118.0);
        assert_eq!(platforms.nearest(near_second).map(|p| p.project), Some(1));
    }
}
