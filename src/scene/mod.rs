//! The portfolio scene.
//!
//! Every visible part of the scene is its own [`GraphicsFlow`]. They share
//! a [`SceneState`] and talk to each other through [`SceneEvent`]s. The
//! order in [`launch`] matters: flows that read the rocket run before the
//! rocket flow, which clears the frame's input triggers last.

mod asteroids;
mod fireworks;
mod glow;
mod platforms;
mod rocket;
mod sky;
mod starfield;

use std::future::Future;

use cgmath::Point3;

use crate::{
    context::InitContext,
    flow::{self, FlowConsturctor, GraphicsFlow, WindowOptions},
    settings::Settings,
    sim::{
        camera_rig::CameraMode, input::Controls, palette::PaletteChoice, projects::Accordion,
        rocket::RocketState,
    },
};

/// State shared by all flows. The rocket flow is its only writer for the
/// rocket snapshot and the camera mode.
#[derive(Debug, Default)]
pub struct SceneState {
    pub controls: Controls,
    pub rocket: RocketState,
    pub camera_mode: CameraMode,
    /// Project index of the platform within reach, if any.
    pub nearest_platform: Option<usize>,
    pub accordion: Accordion,
    pub palette: PaletteChoice,
    /// Simulated seconds since launch.
    pub elapsed: f32,
    /// Set while the window is occluded. Simulations hold still.
    pub paused: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    AsteroidHit { position: Point3<f32> },
    PlatformOpened { project: usize, position: Point3<f32> },
    Burst { position: Point3<f32>, colours: Vec<[f32; 3]> },
}

fn constructor<F, Fut>(build: F) -> FlowConsturctor<SceneState, SceneEvent>
where
    F: FnOnce(InitContext) -> Fut + 'static,
    Fut: Future<Output = Box<dyn GraphicsFlow<SceneState, SceneEvent>>> + 'static,
{
    Box::new(move |init| Box::pin(build(init)))
}

/// Builds every flow of the scene and runs them until the window closes.
pub fn launch(settings: Settings) -> anyhow::Result<()> {
    let options = WindowOptions {
        title: settings.window.title.clone(),
        width: settings.window.width,
        height: settings.window.height,
    };

    let constructors = vec![
        {
            let settings = settings.clone();
            constructor(move |_| async move {
                Box::new(sky::SkyFlow::new(&settings))
                    as Box<dyn GraphicsFlow<SceneState, SceneEvent>>
            })
        },
        {
            let settings = settings.clone();
            constructor(move |init| async move {
                Box::new(glow::GlowFlow::new(&init, &settings))
                    as Box<dyn GraphicsFlow<SceneState, SceneEvent>>
            })
        },
        {
            let settings = settings.clone();
            constructor(move |init| async move {
                Box::new(starfield::StarfieldFlow::new(&init, &settings))
                    as Box<dyn GraphicsFlow<SceneState, SceneEvent>>
            })
        },
        {
            let settings = settings.clone();
            constructor(move |init| async move {
                Box::new(asteroids::AsteroidFlow::new(&init, &settings))
                    as Box<dyn GraphicsFlow<SceneState, SceneEvent>>
            })
        },
        {
            let settings = settings.clone();
            constructor(move |init| async move {
                Box::new(platforms::PlatformFlow::new(&init, &settings))
                    as Box<dyn GraphicsFlow<SceneState, SceneEvent>>
            })
        },
        {
            let settings = settings.clone();
            constructor(move |init| async move {
                Box::new(fireworks::FireworkFlow::new(&init, &settings))
                    as Box<dyn GraphicsFlow<SceneState, SceneEvent>>
            })
        },
        constructor(move |init| async move {
            Box::new(rocket::RocketFlow::new(&init, &settings))
                as Box<dyn GraphicsFlow<SceneState, SceneEvent>>
        }),
    ];

    flow::run(options, constructors)
}
