use cgmath::{EuclideanSpace, Vector3};
use instant::Duration;

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
    settings::Settings,
    sim::{
        clock::FixedStep,
        input::Trigger,
        platforms::Platforms,
        projects::{Accordion, Project, window_title},
    },
};

const BASE_COLOUR: [f32; 3] = [0.35, 0.4, 0.5];
const CRYSTAL_COLOUR: [f32; 3] = [0.4, 0.8, 1.0];
const NEAR_TINT: [f32; 3] = [1.4, 1.4, 1.1];
const OPEN_TINT: [f32; 3] = [1.6, 1.3, 0.5];
const CRYSTAL_HEIGHT: f32 = 2.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Interaction {
    Opened(usize),
    Closed(usize),
    Nothing,
}

/// Interacting next to a platform toggles its project. Away from every
/// platform it closes whatever is open.
fn interact(accordion: &mut Accordion, nearest: Option<usize>) -> Interaction {
    if let Some(id) = nearest {
        return if accordion.toggle(id) {
            Interaction::Opened(id)
        } else {
            Interaction::Closed(id)
        };
    }
    match accordion.open() {
        Some(id) => {
            accordion.close();
            Interaction::Closed(id)
        }
        None => Interaction::Nothing,
    }
}

pub struct PlatformFlow {
    platforms: Platforms,
    projects: Vec<Project>,
    base_title: String,
    root: ContainerNode,
    clock: FixedStep,
}

impl PlatformFlow {
    pub fn new(init: &InitContext, settings: &Settings) -> Self {
        let projects = settings.projects.clone();
        let platforms = Platforms::new(&settings.platforms, projects.len());
        let amount = platforms.platforms.len();

        let mut base = MeshNode::new(
            &init.device,
            Mesh::upload(&init.device, "platform", &Geometry::cylinder(3.0, 3.0, 0.6, 8)),
            amount,
        );
        base.set_local_transform_all(&mut |i| *i = Instance::new().with_rgb(BASE_COLOUR));
        let mut crystal = MeshNode::new(
            &init.device,
            Mesh::upload(&init.device, "crystal", &Geometry::octahedron(1.0)),
            amount,
        );
        crystal.set_local_transform_all(&mut |i| {
            *i = Instance::new()
                .with_position((0.0, CRYSTAL_HEIGHT, 0.0))
                .with_scale((0.8, 1.4, 0.8))
                .with_rgb(CRYSTAL_COLOUR)
        });

        let mut root = ContainerNode::new(amount);
        root.add_child(Box::new(base));
        root.add_child(Box::new(crystal));

        Self {
            platforms,
            projects,
            base_title: settings.window.title.clone(),
            root,
            clock: FixedStep::default(),
        }
    }

    fn sync(&mut self, state: &SceneState, queue: &wgpu::Queue, device: &wgpu::Device) {
        let instances = self
            .platforms
            .platforms
            .iter()
            .map(|p| {
                let tint = if state.accordion.is_open(p.project) {
                    OPEN_TINT
                } else if state.nearest_platform == Some(p.project) {
                    NEAR_TINT
                } else {
                    [1.0; 3]
                };
                Instance::new()
                    .with_position(p.position.to_vec())
                    .with_rotation(p.rotation())
                    .with_rgb(tint)
            })
            .collect();
        self.root.replace_instances(instances);
        self.root.update_world_transform_all();
        self.root.write_to_buffers(queue, device);
    }

    fn handle_interaction(&self, state: &mut SceneState) -> Out<SceneState, SceneEvent> {
        let interaction = interact(&mut state.accordion, state.nearest_platform);
        let title = window_title(&self.base_title, &self.projects, state.accordion.open());
        let set_title = Out::configure(move |ctx| ctx.set_title(&title));
        match interaction {
            Interaction::Opened(id) => {
                let platforms = &self.platforms.platforms;
                let Some(platform) = platforms.iter().find(|p| p.project == id) else {
                    return set_title;
                };
                if let Some(project) = self.projects.get(id) {
                    log::info!("Opened {}: {}", project.title, project.summary());
                }
                let position = platform.position + Vector3::new(0.0, CRYSTAL_HEIGHT, 0.0);
                set_title.and(Out::event(SceneEvent::PlatformOpened { project: id, position }))
            }
            Interaction::Closed(id) => {
                if let Some(project) = self.projects.get(id) {
                    log::info!("Closed {}", project.title);
                }
                set_title
            }
            Interaction::Nothing => {
                log::debug!("Nothing within reach to interact with");
                Out::Empty
            }
        }
    }
}

impl GraphicsFlow<SceneState, SceneEvent> for PlatformFlow {
    fn on_init(
        &mut self,
        ctx: &mut Context,
        state: &mut SceneState,
    ) -> Out<SceneState, SceneEvent> {
        self.platforms.step();
        self.sync(state, &ctx.queue, &ctx.device);
        Out::Empty
    }

    fn on_update(
        &mut self,
        ctx: &Context,
        state: &mut SceneState,
        dt: Duration,
    ) -> Out<SceneState, SceneEvent> {
        let out = if state.controls.take_trigger(Trigger::Interact) {
            self.handle_interaction(state)
        } else {
            Out::Empty
        };
        if state.paused {
            self.clock.reset();
            return out;
        }

        let steps = self.clock.advance(dt);
        for _ in 0..steps {
            self.platforms.step();
        }

        let nearest = self
            .platforms
            .nearest(state.rocket.position)
            .map(|p| p.project);
        if nearest != state.nearest_platform {
            if let Some(project) = nearest.and_then(|id| self.projects.get(id)) {
                log::info!("Approaching {}, press E to open it", project.title);
            }
            state.nearest_platform = nearest;
        }

        self.sync(state, &ctx.queue, &ctx.device);
        out
    }

    fn on_render<'pass>(&self) -> Render<'_, 'pass> {
        (&self.root as &dyn SceneNode).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interacting_toggles_the_nearest_project() {
        let mut accordion = Accordion::default();
        assert_eq!(interact(&mut accordion, Some(1)), Interaction::Opened(1));
        assert_eq!(accordion.open(), Some(1));
        assert_eq!(interact(&mut accordion, Some(1)), Interaction::Closed(1));
        assert_eq!(accordion.open(), None);
    }

    #[test]
    fn opening_another_project_replaces_the_open_one() {
        let mut accordion = Accordion::default();
        interact(&mut accordion, Some(0));
        assert_eq!(interact(&mut accordion, Some(2)), Interaction::Opened(2));
        assert!(!accordion.is_open(0));
    }

    #[test]
    fn title_tracks_interactions() {
        let projects = crate::sim::projects::default_projects();
        let mut accordion = Accordion::default();

        interact(&mut accordion, Some(2));
        assert_eq!(
            window_title("Folio", &projects, accordion.open()),
            format!("Folio | {}", projects[2].summary())
        );

        interact(&mut accordion, None);
        assert_eq!(window_title("Folio", &projects, accordion.open()), "Folio");
    }

    #[test]
    fn interacting_in_open_space_closes_the_panel() {
        let mut accordion = Accordion::default();
        assert_eq!(interact(&mut accordion, None), Interaction::Nothing);
        interact(&mut accordion, Some(0));
        assert_eq!(interact(&mut accordion, None), Interaction::Closed(0));
        assert_eq!(accordion.open(), None);
    }
}
