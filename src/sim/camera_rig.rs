use cgmath::{Point3, Quaternion, Rad, Rotation, Rotation3, Vector3};
use serde::{Deserialize, Serialize};

use crate::{
    settings::CameraSettings,
    sim::{lerp3, rocket::RocketState},
};

const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;
const LOOK_DISTANCE: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraMode {
    #[default]
    Chase,
    FirstPerson,
}

impl CameraMode {
    pub fn toggled(self) -> Self {
        match self {
            CameraMode::Chase => CameraMode::FirstPerson,
            CameraMode::FirstPerson => CameraMode::Chase,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CameraMode::Chase => "chase",
            CameraMode::FirstPerson => "first person",
        }
    }
}

/// Computes where the camera sits and what it looks at.
#[derive(Debug, Clone)]
pub struct CameraRig {
    pub mode: CameraMode,
    pub eye: Point3<f32>,
    pub target: Point3<f32>,
    yaw: f32,
    pitch: f32,
    placed: bool,
}

impl CameraRig {
    pub fn new(mode: CameraMode) -> Self {
        Self {
            mode,
            eye: Point3::new(0.0, 0.0, 0.0),
            target: Point3::new(0.0, 0.0, -1.0),
            yaw: 0.0,
            pitch: 0.0,
            placed: false,
        }
    }

    pub fn toggle(&mut self) -> CameraMode {
        self.set_mode(self.mode.toggled());
        self.mode
    }

    pub fn set_mode(&mut self, mode: CameraMode) {
        if mode != self.mode {
            self.mode = mode;
            self.yaw = 0.0;
            self.pitch = 0.0;
            self.placed = false;
        }
    }

    pub fn look_angles(&self) -> (f32, f32) {
        (self.yaw, self.pitch)
    }

    /// Mouse delta in physical pixels. Ignored outside first person.
    pub fn look(&mut self, dx: f64, dy: f64, sensitivity: f32) {
        if self.mode != CameraMode::FirstPerson {
            return;
        }
        self.yaw -= dx as f32 * sensitivity;
        self.pitch = (self.pitch - dy as f32 * sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    pub fn step(&mut self, rocket: &RocketState, settings: &CameraSettings) {
        match self.mode {
            CameraMode::Chase => {
                let offset = Vector3::from(settings.chase_offset);
                let desired = rocket.position + offset;
                self.eye = if self.placed {
                    Point3::from(lerp3(self.eye.into(), desired.into(), settings.follow_lerp))
                } else {
                    desired
                };
                self.target = rocket.position;
            }
            CameraMode::FirstPerson => {
                self.eye = rocket.nose();
                self.target = self.eye + self.look_direction() * LOOK_DISTANCE;
            }
        }
        self.placed = true;
    }

    pub fn look_direction(&self) -> Vector3<f32> {
        let rotation =
            Quaternion::from_angle_y(Rad(self.yaw)) * Quaternion::from_angle_x(Rad(self.pitch));
        rotation.rotate_vector(-Vector3::unit_z())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chase_snaps_then_follows() {
        let settings = CameraSettings::default();
        let mut rig = CameraRig::new(CameraMode::Chase);
        let mut rocket = RocketState::default();
        rig.step(&rocket, &settings);
        assert_eq!(rig.eye, Point3::new(10.0, 8.0, 20.0));
        assert_eq!(rig.target, rocket.position);

        rocket.position.z = -10.0;
        rig.step(&rocket, &settings);
        assert!((rig.eye.z - 19.0).abs() < 1e-5);
    }

    #[test]
    fn first_person_sits_on_the_nose() {
        let settings = CameraSettings::default();
        let mut rig = CameraRig::new(CameraMode::FirstPerson);
        let rocket = RocketState::default();
        rig.step(&rocket, &settings);
        assert_eq!(rig.eye, rocket.nose());
        assert!(rig.target.z < rig.eye.z);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut rig = CameraRig::new(CameraMode::FirstPerson);
        rig.look(0.0, -1.0e6, 0.002);
        assert_eq!(rig.look_angles().1, PITCH_LIMIT);
    }

    #[test]
    fn mouse_is_ignored_in_chase() {
        let mut rig = CameraRig::new(CameraMode::Chase);
        rig.look(100.0, 100.0, 0.002);
        assert_eq!(rig.look_angles(), (0.0, 0.0));
    }

    #[test]
    fn toggling_resets_the_look() {
        let mut rig = CameraRig::new(CameraMode::FirstPerson);
        rig.look(200.0, 50.0, 0.002);
        assert_eq!(rig.toggle(), CameraMode::Chase);
        assert_eq!(rig.toggle(), CameraMode::FirstPerson);
        assert_eq!(rig.look_angles(), (0.0, 0.0));
    }

    #[test]
    fn mode_parses_from_yaml() {
        let mode: CameraMode = serde_yaml::from_str("first_person").unwrap();
        assert_eq!(mode, CameraMode::FirstPerson);
    }
}
