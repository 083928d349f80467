//! Runtime settings.
//!
//! Every section falls back to its defaults field by field, so a settings
//! file only has to mention what it changes. Flight and camera rates are
//! tuned per 1/60 s simulation step.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::{camera_rig::CameraMode, projects::Project};

pub const SETTINGS_FILE_PATH: &str = "./settings.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "Ian Rapko".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

/// Flight tuning. Rates are per simulation step (1/60 s).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightSettings {
    pub acceleration: f32,
    pub max_speed: f32,
    pub max_reverse_speed: f32,
    pub drag: f32,
    pub boost_multiplier: f32,
    pub lateral_acceleration: f32,
    pub max_lateral_speed: f32,
    pub lateral_drag: f32,
    pub tilt_factor: f32,
    pub roll_factor: f32,
    pub blend: f32,
    /// Half extent of the flyable corridor on the x and y axes.
    pub bounds: f32,
    pub hit_radius: f32,
}

impl Default for FlightSettings {
    fn default() -> Self {
        Self {
            acceleration: 0.01,
            max_speed: 0.5,
            max_reverse_speed: 0.5,
            drag: 0.98,
            boost_multiplier: 2.0,
            lateral_acceleration: 0.01,
            max_lateral_speed: 0.3,
            lateral_drag: 0.9,
            tilt_factor: 0.2,
            roll_factor: 1.0,
            blend: 0.1,
            bounds: 40.0,
            hit_radius: 1.4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub fov_deg: f32,
    pub near: f32,
    pub far: f32,
    pub chase_offset: [f32; 3],
    pub follow_lerp: f32,
    pub mouse_sensitivity: f32,
    pub mode: CameraMode,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov_deg: 75.0,
            near: 0.1,
            far: 1000.0,
            chase_offset: [10.0, 8.0, 20.0],
            follow_lerp: 0.1,
            mouse_sensitivity: 0.002,
            mode: CameraMode::Chase,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarfieldSettings {
    pub count: usize,
    pub extent: f32,
    pub size: f32,
}

impl Default for StarfieldSettings {
    fn default() -> Self {
        Self {
            count: 2000,
            extent: 200.0,
            size: 0.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AsteroidSettings {
    pub enabled: bool,
    pub count: usize,
    pub min_radius: f32,
    pub max_radius: f32,
    /// Closest distance ahead of the rocket at which asteroids spawn.
    pub near: f32,
    /// Farthest distance ahead of the rocket at which asteroids spawn.
    pub depth: f32,
    pub recycle_distance: f32,
    pub max_spin: f32,
}

impl Default for AsteroidSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            count: 60,
            min_radius: 0.8,
            max_radius: 2.5,
            near: 40.0,
            depth: 300.0,
            recycle_distance: 30.0,
            max_spin: 0.02,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DayNightSettings {
    pub enabled: bool,
    pub period_secs: f32,
    /// 0.0 is sunrise, 0.25 noon, 0.5 sunset, 0.75 midnight.
    pub start_phase: f32,
}

impl Default for DayNightSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            period_secs: 120.0,
            start_phase: 0.75,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FireworkSettings {
    pub particles_per_burst: usize,
    pub lifetime_steps: u32,
    pub gravity: f32,
    pub drag: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    pub capacity: usize,
    pub spark_size: f32,
}

impl Default for FireworkSettings {
    fn default() -> Self {
        Self {
            particles_per_burst: 48,
            lifetime_steps: 90,
            gravity: 0.006,
            drag: 0.98,
            min_speed: 0.2,
            max_speed: 0.45,
            capacity: 1024,
            spark_size: 0.25,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlowSettings {
    pub enabled: bool,
    pub count: usize,
    /// Disc radius in physical pixels.
    pub radius: f32,
    pub repulsion_radius: f32,
    pub repulsion_strength: f32,
    /// Full range of the random drift velocity per step, centred on zero.
    pub drift: f32,
}

impl Default for GlowSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            count: 100,
            radius: 21.0,
            repulsion_radius: 200.0,
            repulsion_strength: 0.5,
            drift: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformSettings {
    pub spacing: f32,
    pub lateral_offset: f32,
    pub interact_radius: f32,
    pub bob_height: f32,
    pub bob_speed: f32,
    pub spin: f32,
}

impl Default for PlatformSettings {
    fn default() -> Self {
        Self {
            spacing: 60.0,
            lateral_offset: 12.0,
            interact_radius: 15.0,
            bob_height: 0.5,
            bob_speed: 0.03,
            spin: 0.005,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub window: WindowSettings,
    pub flight: FlightSettings,
    pub camera: CameraSettings,
    pub starfield: StarfieldSettings,
    pub asteroids: AsteroidSettings,
    pub day_night: DayNightSettings,
    pub fireworks: FireworkSettings,
    pub glow: GlowSettings,
    pub platforms: PlatformSettings,
    pub projects: Vec<Project>,
    pub seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window: WindowSettings::default(),
            flight: FlightSettings::default(),
            camera: CameraSettings::default(),
            starfield: StarfieldSettings::default(),
            asteroids: AsteroidSettings::default(),
            day_night: DayNightSettings::default(),
            fireworks: FireworkSettings::default(),
            glow: GlowSettings::default(),
            platforms: PlatformSettings::default(),
            projects: crate::sim::projects::default_projects(),
            seed: 42,
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to decode YAML settings: {0}")]
    Deserialize(#[from] serde_yaml::Error),
    #[error("invalid setting `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

impl Settings {
    pub fn from_yaml(raw: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_yaml::from_str(raw)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let raw = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&raw)
    }

    /// Missing files silently yield defaults; broken ones are logged first.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            log::info!(
                "No settings file at '{}', using defaults.",
                path.display()
            );
            return Self::default();
        }
        match Self::load(path) {
            Ok(settings) => settings,
            Err(error) => {
                log::warn!(
                    "Failed to load settings from '{}': {}. Falling back to defaults.",
                    path.display(),
                    error
                );
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        fn check(ok: bool, field: &'static str, reason: &'static str) -> Result<(), SettingsError> {
            if ok {
                Ok(())
            } else {
                Err(SettingsError::Invalid { field, reason })
            }
        }
        let f = &self.flight;
        check(f.max_speed > 0.0, "flight.max_speed", "must be positive")?;
        check(
            f.max_reverse_speed >= 0.0,
            "flight.max_reverse_speed",
            "must not be negative",
        )?;
        check(f.acceleration > 0.0, "flight.acceleration", "must be positive")?;
        check(
            f.drag > 0.0 && f.drag <= 1.0,
            "flight.drag",
            "must be in (0, 1]",
        )?;
        check(
            f.lateral_drag > 0.0 && f.lateral_drag <= 1.0,
            "flight.lateral_drag",
            "must be in (0, 1]",
        )?;
        check(
            f.blend > 0.0 && f.blend <= 1.0,
            "flight.blend",
            "must be in (0, 1]",
        )?;
        check(
            f.boost_multiplier >= 1.0,
            "flight.boost_multiplier",
            "must be at least 1",
        )?;
        check(f.bounds > 0.0, "flight.bounds", "must be positive")?;
        check(
            f.max_lateral_speed >= 0.0,
            "flight.max_lateral_speed",
            "must not be negative",
        )?;

        let c = &self.camera;
        check(
            c.fov_deg > 0.0 && c.fov_deg < 180.0,
            "camera.fov_deg",
            "must be in (0, 180)",
        )?;
        check(
            c.near > 0.0 && c.near < c.far,
            "camera.near",
            "must be positive and smaller than camera.far",
        )?;
        check(
            c.follow_lerp > 0.0 && c.follow_lerp <= 1.0,
            "camera.follow_lerp",
            "must be in (0, 1]",
        )?;

        check(self.starfield.count > 0, "starfield.count", "must be positive")?;
        check(self.starfield.extent > 0.0, "starfield.extent", "must be positive")?;

        let a = &self.asteroids;
        check(
            a.min_radius > 0.0 && a.min_radius <= a.max_radius,
            "asteroids.min_radius",
            "must be positive and not exceed asteroids.max_radius",
        )?;
        check(
            a.near < a.depth,
            "asteroids.near",
            "must be smaller than asteroids.depth",
        )?;
        check(a.max_spin >= 0.0, "asteroids.max_spin", "must not be negative")?;

        check(
            self.day_night.period_secs > 0.0,
            "day_night.period_secs",
            "must be positive",
        )?;

        let fw = &self.fireworks;
        check(fw.lifetime_steps > 0, "fireworks.lifetime_steps", "must be positive")?;
        check(
            fw.min_speed <= fw.max_speed,
            "fireworks.min_speed",
            "must not exceed fireworks.max_speed",
        )?;

        check(self.glow.drift >= 0.0, "glow.drift", "must not be negative")?;
        check(
            self.glow.repulsion_radius > 0.0,
            "glow.repulsion_radius",
            "must be positive",
        )?;
        check(self.platforms.spacing > 0.0, "platforms.spacing", "must be positive")?;
        check(
            self.projects.iter().all(|p| !p.title.trim().is_empty()),
            "projects.title",
            "must not be empty",
        )?;
        Ok(())
    }
}
