//! GPU-free scene simulation.
//!
//! Everything in here is plain data stepped at a fixed rate of 60 steps per
//! second, so the frame-tuned constants behave the same on every display.
//! The flows in [`crate::scene`] own these types and mirror them into GPU
//! instance buffers.
//!
//! - `clock` turns variable frame times into fixed steps
//! - `input` maps keys to held and one-shot actions
//! - `rocket` integrates speed, strafing and tilt
//! - `camera_rig` implements chase and first-person cameras
//! - `starfield`, `asteroids`, `platforms`, `fireworks` are the world content
//! - `day_night` derives sky and light colours from the time of day
//! - `palette` holds the rocket colour presets
//! - `glow` is the 2D particle backdrop that shies away from the mouse
//! - `projects` is the portfolio content and its accordion state

pub mod asteroids;
pub mod camera_rig;
pub mod clock;
pub mod day_night;
pub mod fireworks;
pub mod glow;
pub mod input;
pub mod palette;
pub mod platforms;
pub mod projects;
pub mod rocket;
pub mod starfield;

pub(crate) fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

pub(crate) fn lerp3(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [lerp(a[0], b[0], t), lerp(a[1], b[1], t), lerp(a[2], b[2], t)]
}

pub(crate) fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoothstep_saturates() {
        assert_eq!(smoothstep(0.0, 1.0, -3.0), 0.0);
        assert_eq!(smoothstep(0.0, 1.0, 3.0), 1.0);
        assert!((smoothstep(0.0, 1.0, 0.5) - 0.5).abs() < 1e-6);
    }
}
