//! Time of day.
//!
//! Phase 0.0 is sunrise, 0.25 noon, 0.5 sunset and 0.75 midnight. The sun
//! travels around the z axis, tilted slightly towards the viewer so the
//! scene is never lit exactly edge-on.

use cgmath::{InnerSpace, Vector3};

use crate::{
    settings::DayNightSettings,
    sim::{lerp, lerp3, smoothstep},
};

const NIGHT_SKY: [f32; 3] = [0.0, 0.0, 0.0];
const DAY_SKY: [f32; 3] = [0.02, 0.04, 0.12];
const MOON_LIGHT: [f32; 3] = [0.6, 0.65, 0.9];
const SUN_LIGHT: [f32; 3] = [1.0, 0.95, 0.85];
const NIGHT_AMBIENT: f32 = 0.25;
const DAY_AMBIENT: f32 = 0.5;
const NIGHT_INTENSITY: f32 = 0.4;
const DAY_INTENSITY: f32 = 1.0;
const SUN_TILT: f32 = 0.35;

/// Everything the sky hands to the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lighting {
    pub clear_colour: [f32; 3],
    pub light_colour: [f32; 3],
    /// Points from the scene towards the light.
    pub light_direction: [f32; 3],
    pub ambient: f32,
    pub intensity: f32,
}

/// Lighting used when the cycle is switched off.
pub fn static_lighting() -> Lighting {
    Lighting {
        clear_colour: NIGHT_SKY,
        light_colour: [1.0, 1.0, 1.0],
        light_direction: Vector3::new(5.0f32, 5.0, 5.0).normalize().into(),
        ambient: 0.5,
        intensity: 1.0,
    }
}

#[derive(Debug, Clone)]
pub struct DayNight {
    phase: f32,
    period: f32,
    enabled: bool,
}

impl DayNight {
    pub fn new(settings: &DayNightSettings) -> Self {
        Self {
            phase: settings.start_phase.rem_euclid(1.0),
            period: settings.period_secs,
            enabled: settings.enabled,
        }
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn advance(&mut self, secs: f32) {
        if self.enabled && self.period > 0.0 {
            self.phase = (self.phase + secs / self.period).rem_euclid(1.0);
        }
    }

    pub fn sun_elevation(&self) -> f32 {
        (std::f32::consts::TAU * self.phase).sin()
    }

    /// 0 at night, 1 in full daylight, smooth across dawn and dusk.
    pub fn daylight(&self) -> f32 {
        smoothstep(-0.2, 0.3, self.sun_elevation())
    }

    pub fn lighting(&self) -> Lighting {
        if !self.enabled {
            return static_lighting();
        }
        let day = self.daylight();
        let angle = std::f32::consts::TAU * self.phase;
        // Below the horizon the moon sits opposite the sun.
        let sun = Vector3::new(angle.cos(), angle.sin(), SUN_TILT);
        let direction = if self.sun_elevation() >= 0.0 {
            sun
        } else {
            Vector3::new(-sun.x, -sun.y, sun.z)
        };
        Lighting {
            clear_colour: lerp3(NIGHT_SKY, DAY_SKY, day),
            light_colour: lerp3(MOON_LIGHT, SUN_LIGHT, day),
            light_direction: direction.normalize().into(),
            ambient: lerp(NIGHT_AMBIENT, DAY_AMBIENT, day),
            intensity: lerp(NIGHT_INTENSITY, DAY_INTENSITY, day),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(phase: f32) -> DayNight {
        DayNight::new(&DayNightSettings {
            enabled: true,
            period_secs: 120.0,
            start_phase: phase,
        })
    }

    #[test]
    fn midnight_is_black_and_noon_is_bright() {
        let midnight = at(0.75).lighting();
        assert_eq!(midnight.clear_colour, NIGHT_SKY);
        assert_eq!(midnight.intensity, NIGHT_INTENSITY);

        let noon = at(0.25).lighting();
        assert_eq!(noon.clear_colour, DAY_SKY);
        assert_eq!(noon.ambient, DAY_AMBIENT);
    }

    #[test]
    fn phase_wraps() {
        let mut cycle = at(0.9);
        cycle.advance(24.0);
        assert!((cycle.phase() - 0.1).abs() < 1e-5);
    }

    #[test]
    fn light_always_comes_from_above() {
        for i in 0..100 {
            let lighting = at(i as f32 / 100.0).lighting();
            assert!(lighting.light_direction[1] >= -1e-6);
        }
    }

    #[test]
    fn disabled_cycle_keeps_static_light() {
        let mut cycle = DayNight::new(&DayNightSettings {
            enabled: false,
            ..Default::default()
        });
        let before = cycle.phase();
        cycle.advance(60.0);
        assert_eq!(cycle.phase(), before);
        assert_eq!(cycle.lighting(), static_lighting());
    }
}
