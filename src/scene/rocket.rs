use cgmath::{Deg, EuclideanSpace, Quaternion, Rad, Rotation3};
use instant::Duration;
use winit::{
    event::{DeviceEvent, ElementState, MouseButton, WindowEvent},
    keyboard::PhysicalKey,
};

use crate::{
    context::{Context, InitContext},
    data_structures::{
        instance::Instance,
        mesh::{Geometry, Mesh},
        scene_graph::{ContainerNode, MeshNode, SceneNode},
    },
    flow::{GraphicsFlow, Out},
    render::Render,
    scene::{SceneEvent, SceneState},
    settings::{CameraSettings, FlightSettings, Settings},
    sim::{
        camera_rig::{CameraMode, CameraRig},
        clock::FixedStep,
        input::Trigger,
        palette::RocketPalette,
        rocket::RocketState,
    },
};

/// The hull is octagonal.
const SEGMENTS: usize = 8;
const UPPER: usize = 0;
const LOWER: usize = 1;
const NOSE: usize = 2;
const FIRE: usize = 3;
/// Where the flame attaches, at the bottom of the lower hull.
const FIRE_ROOT: f32 = -1.25;

const WELCOME: &str = "Welcome aboard! W/S fly forward and back, A/D and Space/C steer, Shift boosts. \
V switches the camera, E opens the project next to you, Tab or 1-5 repaint the rocket.";

/// The player's rocket: keyboard and mouse input, flight, camera and the
/// rocket model itself.
pub struct RocketFlow {
    rocket: RocketState,
    rig: CameraRig,
    clock: FixedStep,
    flight: FlightSettings,
    camera: CameraSettings,
    root: ContainerNode,
}

fn part(device: &wgpu::Device, name: &str, geometry: &Geometry, local: Instance) -> MeshNode {
    let mut node = MeshNode::new(device, Mesh::upload(device, name, geometry), 1);
    node.set_local_transform(0, local);
    node
}

fn flame(colour: [f32; 3], length: f32, opacity: f32) -> Instance {
    Instance::new()
        .with_position((0.0, FIRE_ROOT - length, 0.0))
        .with_rotation(Quaternion::from_angle_x(Rad(std::f32::consts::PI)))
        .with_scale((1.0, length, 1.0))
        .with_rgb(colour)
        .with_alpha(opacity)
}

/// Solid parts of the rocket, indexed by `UPPER`, `LOWER` and `NOSE`.
fn hull() -> [(&'static str, Geometry, Instance); 3] {
    [
        (
            "rocket upper",
            Geometry::cylinder(1.2, 1.2, 1.5, SEGMENTS),
            Instance::new().with_position((0.0, 1.0, 0.0)),
        ),
        (
            "rocket lower",
            Geometry::cylinder(1.4, 1.4, 1.5, SEGMENTS),
            Instance::new().with_position((0.0, -0.5, 0.0)),
        ),
        (
            "rocket nose",
            Geometry::cone(1.2, 1.2, SEGMENTS),
            Instance::new().with_position((0.0, 2.35, 0.0)),
        ),
    ]
}

impl RocketFlow {
    pub fn new(init: &InitContext, settings: &Settings) -> Self {
        let device = &init.device;
        let mut root = ContainerNode::new(1);
        for (name, geometry, local) in hull() {
            root.add_child(Box::new(part(device, name, &geometry, local)));
        }
        root.add_child(Box::new(
            part(
                device,
                "rocket fire",
                &Geometry::cone(0.7, 2.0, SEGMENTS),
                flame([1.0; 3], 1.0, 0.0),
            )
            .transparent(),
        ));

        Self {
            rocket: RocketState::default(),
            rig: CameraRig::new(settings.camera.mode),
            clock: FixedStep::default(),
            flight: settings.flight.clone(),
            camera: settings.camera.clone(),
            root,
        }
    }

    fn apply_palette(&mut self, palette: &RocketPalette) {
        let children = self.root.get_children_mut();
        let parts = [(UPPER, palette.upper), (LOWER, palette.lower), (NOSE, palette.nose)];
        for (index, colour) in parts {
            let child = &mut children[index];
            if let Some(local) = child.get_local_transform(0) {
                child.set_local_transform(0, local.with_rgb(colour));
            }
        }
    }

    fn sync(&mut self, palette: &RocketPalette, queue: &wgpu::Queue, device: &wgpu::Device) {
        self.root.set_local_transform(
            0,
            Instance::new()
                .with_position(self.rocket.position.to_vec())
                .with_rotation(self.rocket.orientation()),
        );
        let exhaust = self.rocket.exhaust();
        let fire = &mut self.root.get_children_mut()[FIRE];
        fire.set_visible(exhaust.visible);
        fire.set_local_transform(0, flame(palette.fire, exhaust.length, exhaust.opacity));

        self.root.update_world_transform_all();
        self.root.write_to_buffers(queue, device);
    }

    fn camera_out(&self) -> Out<SceneState, SceneEvent> {
        let (eye, target) = (self.rig.eye, self.rig.target);
        Out::configure(move |ctx| ctx.set_camera(eye, target))
    }

    /// Handles this frame's edge-triggered actions.
    fn handle_triggers(&mut self, state: &mut SceneState) -> Out<SceneState, SceneEvent> {
        let mut out = Out::Empty;
        if state.controls.take_trigger(Trigger::ToggleCamera) {
            let mode = self.rig.toggle();
            state.camera_mode = mode;
            log::info!("Camera switched to {}", mode.label());
            match mode {
                CameraMode::Chase => out = out.and(release_pointer()),
                CameraMode::FirstPerson => {
                    log::info!("Click into the window to look around, Escape to let go")
                }
            }
        }
        if state.controls.take_trigger(Trigger::ReleasePointer) {
            out = out.and(release_pointer());
        }
        for trigger in state.controls.take_palette_triggers() {
            let changed = match trigger {
                Trigger::NextPalette => {
                    state.palette.next();
                    true
                }
                Trigger::SelectPalette(index) => state.palette.select(index),
                _ => false,
            };
            if changed {
                let palette = state.palette.current();
                log::info!("Rocket repainted: {}", palette.name);
                self.apply_palette(palette);
                out = out.and(Out::event(SceneEvent::Burst {
                    position: self.rocket.nose(),
                    colours: vec![palette.fire, palette.upper, palette.nose],
                }));
            }
        }
        out
    }
}

fn release_pointer() -> Out<SceneState, SceneEvent> {
    Out::configure(|ctx| ctx.set_pointer_lock(false))
}

impl GraphicsFlow<SceneState, SceneEvent> for RocketFlow {
    fn on_init(
        &mut self,
        ctx: &mut Context,
        state: &mut SceneState,
    ) -> Out<SceneState, SceneEvent> {
        ctx.projection.set_fovy(Deg(self.camera.fov_deg));
        ctx.projection.set_depth_range(self.camera.near, self.camera.far);

        state.camera_mode = self.rig.mode;
        state.rocket = self.rocket;
        self.rig.step(&self.rocket, &self.camera);
        ctx.set_camera(self.rig.eye, self.rig.target);

        let palette = state.palette.current();
        self.apply_palette(palette);
        self.sync(palette, &ctx.queue, &ctx.device);

        log::info!("{}", WELCOME);
        Out::Empty
    }

    fn on_window_events(
        &mut self,
        ctx: &Context,
        state: &mut SceneState,
        event: &WindowEvent,
    ) -> Out<SceneState, SceneEvent> {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    state.controls.handle_key(code, event.state.is_pressed(), event.repeat);
                }
                Out::Empty
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } if self.rig.mode == CameraMode::FirstPerson && !ctx.mouse.pointer_locked => {
                Out::configure(|ctx| ctx.set_pointer_lock(true))
            }
            WindowEvent::Focused(false) => {
                state.controls.clear();
                Out::Empty
            }
            WindowEvent::Occluded(occluded) => {
                state.paused = *occluded;
                log::info!("{}", if *occluded { "Scene paused" } else { "Scene resumed" });
                Out::Empty
            }
            _ => Out::Empty,
        }
    }

    fn on_device_events(
        &mut self,
        ctx: &Context,
        state: &mut SceneState,
        event: &DeviceEvent,
    ) -> Out<SceneState, SceneEvent> {
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            if ctx.mouse.pointer_locked {
                state.controls.add_mouse_delta(*dx, *dy);
            }
        }
        Out::Empty
    }

    fn on_update(
        &mut self,
        ctx: &Context,
        state: &mut SceneState,
        dt: Duration,
    ) -> Out<SceneState, SceneEvent> {
        let out = self.handle_triggers(state);

        let (dx, dy) = state.controls.take_mouse_delta();
        self.rig.look(dx, dy, self.camera.mouse_sensitivity);

        if state.paused {
            self.clock.reset();
            state.controls.end_frame();
            return out;
        }

        let steps = self.clock.advance(dt);
        for _ in 0..steps {
            self.rocket.step(&state.controls, &self.flight);
            self.rig.step(&self.rocket, &self.camera);
        }
        state.rocket = self.rocket;
        state.elapsed += steps as f32 * FixedStep::step_secs();

        self.sync(state.palette.current(), &ctx.queue, &ctx.device);
        state.controls.end_frame();
        out.and(self.camera_out())
    }

    fn on_custom_events(
        &mut self,
        _: &Context,
        state: &mut SceneState,
        event: SceneEvent,
    ) -> Option<SceneEvent> {
        match event {
            SceneEvent::AsteroidHit { position } => {
                self.rocket.bounce(position, &self.flight);
                state.rocket = self.rocket;
                None
            }
            other => Some(other),
        }
    }

    fn on_render<'pass>(&self) -> Render<'_, 'pass> {
        (&self.root as &dyn SceneNode).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn radii(geometry: &Geometry, y: f32) -> Vec<f32> {
        geometry
            .vertices
            .iter()
            .filter(|v| (v.position[1] - y).abs() < 1e-5)
            .map(|v| v.position[0].hypot(v.position[2]))
            .filter(|r| *r > 1e-5)
            .collect()
    }

    #[test]
    fn hull_is_octagonal() {
        for (name, geometry, _) in hull() {
            let sides = if name == "rocket nose" { 2 } else { 4 };
            assert_eq!(geometry.triangle_count(), SEGMENTS * sides, "{}", name);
        }
    }

    #[test]
    fn lower_hull_is_wider_and_straight() {
        let parts = hull();
        let lower = &parts[LOWER].1;
        for y in [0.75, -0.75] {
            let rs = radii(lower, y);
            assert!(!rs.is_empty());
            assert!(rs.iter().all(|r| (r - 1.4).abs() < 1e-4), "{:?}", rs);
        }
        let upper = &parts[UPPER].1;
        assert!(radii(upper, 0.75).iter().all(|r| (r - 1.2).abs() < 1e-4));
    }
}
