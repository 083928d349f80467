use cgmath::EuclideanSpace;
use instant::Duration;

use crate::{
    context::{Context, InitContext},
    data_structures::{
        instance::Instance,
        mesh::{Geometry, Mesh},
        scene_graph::{MeshNode, SceneNode},
    },
    flow::{GraphicsFlow, Out},
    render::Render,
    scene::{SceneEvent, SceneState},
    settings::Settings,
    sim::starfield::Starfield,
};

const STAR_COLOUR: [f32; 3] = [1.0, 1.0, 1.0];

pub struct StarfieldFlow {
    field: Starfield,
    node: MeshNode,
    size: f32,
}

impl StarfieldFlow {
    pub fn new(init: &InitContext, settings: &Settings) -> Self {
        let field = Starfield::new(&settings.starfield, settings.seed);
        let mesh = Mesh::upload(&init.device, "star", &Geometry::octahedron(1.0));
        let node = MeshNode::new(&init.device, mesh, field.stars.len());
        Self {
            field,
            node,
            size: settings.starfield.size,
        }
    }

    fn sync(&mut self, queue: &wgpu::Queue, device: &wgpu::Device) {
        let size = self.size;
        let instances = self
            .field
            .stars
            .iter()
            .map(|star| {
                Instance::new()
                    .with_position(star.to_vec())
                    .with_uniform_scale(size)
                    .with_rgb(STAR_COLOUR)
            })
            .collect();
        self.node.replace_instances(instances);
        self.node.update_world_transform_all();
        self.node.write_to_buffers(queue, device);
    }
}

impl GraphicsFlow<SceneState, SceneEvent> for StarfieldFlow {
    fn on_init(&mut self, ctx: &mut Context, _: &mut SceneState) -> Out<SceneState, SceneEvent> {
        self.sync(&ctx.queue, &ctx.device);
        Out::Empty
    }

    fn on_update(
        &mut self,
        ctx: &Context,
        state: &mut SceneState,
        _: Duration,
    ) -> Out<SceneState, SceneEvent> {
        if self.field.recenter(state.rocket.position) {
            self.sync(&ctx.queue, &ctx.device);
        }
        Out::Empty
    }

    fn on_render<'pass>(&self) -> Render<'_, 'pass> {
        (&self.node as &dyn SceneNode).into()
    }
}
