use cgmath::{EuclideanSpace, Point3};
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
    sim::{clock::FixedStep, fireworks::Fireworks, palette::hex_rgb},
};

const IMPACT_COLOURS: [[f32; 3]; 3] = [hex_rgb(0xff9933), hex_rgb(0xffdd88), hex_rgb(0xcccccc)];
const CELEBRATION_GOLD: [f32; 3] = hex_rgb(0xffd700);

pub struct FireworkFlow {
    fireworks: Fireworks,
    node: MeshNode,
    clock: FixedStep,
    spark_size: f32,
}

impl FireworkFlow {
    pub fn new(init: &InitContext, settings: &Settings) -> Self {
        let mesh = Mesh::upload(&init.device, "spark", &Geometry::icosahedron(1.0));
        Self {
            fireworks: Fireworks::new(&settings.fireworks, settings.seed.wrapping_add(3)),
            node: MeshNode::new(&init.device, mesh, settings.fireworks.capacity).transparent(),
            clock: FixedStep::default(),
            spark_size: settings.fireworks.spark_size,
        }
    }

    fn burst(&mut self, position: Point3<f32>, colours: &[[f32; 3]]) {
        self.fireworks.burst(position, colours);
        log::debug!("Firework burst, {} sparks alive", self.fireworks.sparks.len());
    }

    fn sync(&mut self, queue: &wgpu::Queue, device: &wgpu::Device) {
        let size = self.spark_size;
        let instances = self
            .fireworks
            .sparks
            .iter()
            .map(|spark| {
                Instance::new()
                    .with_position(spark.position.to_vec())
                    .with_uniform_scale(size)
                    .with_rgb(spark.colour)
                    .with_alpha(spark.opacity())
            })
            .collect();
        self.node.replace_instances(instances);
        self.node.update_world_transform_all();
        self.node.write_to_buffers(queue, device);
    }
}

impl GraphicsFlow<SceneState, SceneEvent> for FireworkFlow {
    fn on_init(&mut self, ctx: &mut Context, _: &mut SceneState) -> Out<SceneState, SceneEvent> {
        self.sync(&ctx.queue, &ctx.device);
        Out::Empty
    }

    fn on_update(
        &mut self,
        ctx: &Context,
        state: &mut SceneState,
        dt: Duration,
    ) -> Out<SceneState, SceneEvent> {
        if state.paused {
            self.clock.reset();
            return Out::Empty;
        }
        let steps = self.clock.advance(dt);
        if steps == 0 || (self.fireworks.is_empty() && self.node.instance_count() == 0) {
            return Out::Empty;
        }
        for _ in 0..steps {
            self.fireworks.step();
        }
        self.sync(&ctx.queue, &ctx.device);
        Out::Empty
    }

    fn on_custom_events(
        &mut self,
        _: &Context,
        state: &mut SceneState,
        event: SceneEvent,
    ) -> Option<SceneEvent> {
        match event {
            // The rocket still has to bounce off it.
            SceneEvent::AsteroidHit { position } => {
                self.burst(position, &IMPACT_COLOURS);
                Some(SceneEvent::AsteroidHit { position })
            }
            SceneEvent::PlatformOpened { position, .. } => {
                let palette = state.palette.current();
                let colours = [palette.fire, CELEBRATION_GOLD, palette.upper, palette.nose];
                self.burst(position, &colours);
                None
            }
            SceneEvent::Burst { position, colours } => {
                self.burst(position, &colours);
                None
            }
        }
    }

    fn on_render<'pass>(&self) -> Render<'_, 'pass> {
        (&self.node as &dyn SceneNode).into()
    }
}
