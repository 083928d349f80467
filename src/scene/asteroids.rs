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
    sim::{asteroids::AsteroidField, clock::FixedStep},
};

const ROCK_COLOUR: [f32; 3] = [0.45, 0.42, 0.4];
const ROCK_JITTER: f32 = 0.25;

pub struct AsteroidFlow {
    field: Option<AsteroidField>,
    node: MeshNode,
    clock: FixedStep,
    hit_radius: f32,
}

impl AsteroidFlow {
    pub fn new(init: &InitContext, settings: &Settings) -> Self {
        let field = settings.asteroids.enabled.then(|| {
            AsteroidField::new(
                &settings.asteroids,
                settings.flight.bounds,
                cgmath::Point3::origin(),
                settings.seed.wrapping_add(2),
            )
        });
        let amount = field.as_ref().map_or(0, |f| f.asteroids.len());
        let mesh = Mesh::upload(
            &init.device,
            "asteroid",
            &Geometry::rock(1.0, ROCK_JITTER, settings.seed),
        );
        Self {
            field,
            node: MeshNode::new(&init.device, mesh, amount),
            clock: FixedStep::default(),
            hit_radius: settings.flight.hit_radius,
        }
    }

    fn sync(&mut self, queue: &wgpu::Queue, device: &wgpu::Device) {
        let Some(field) = &self.field else {
            return;
        };
        let instances = field
            .asteroids
            .iter()
            .map(|a| {
                Instance::new()
                    .with_position(a.position.to_vec())
                    .with_rotation(a.rotation())
                    .with_uniform_scale(a.radius)
                    .with_rgb(ROCK_COLOUR)
            })
            .collect();
        self.node.replace_instances(instances);
        self.node.update_world_transform_all();
        self.node.write_to_buffers(queue, device);
    }
}

impl GraphicsFlow<SceneState, SceneEvent> for AsteroidFlow {
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
        let Some(field) = &mut self.field else {
            return Out::Empty;
        };
        if state.paused {
            self.clock.reset();
            return Out::Empty;
        }
        let steps = self.clock.advance(dt);
        let mut out = Out::Empty;
        for _ in 0..steps {
            if let Some(hit) = field.step(state.rocket.position, self.hit_radius) {
                log::info!("Asteroid hit at {:?}", hit.position);
                out = out.and(Out::event(SceneEvent::AsteroidHit { position: hit.position }));
            }
        }
        if steps > 0 {
            self.sync(&ctx.queue, &ctx.device);
        }
        out
    }

    fn on_render<'pass>(&self) -> Render<'_, 'pass> {
        (&self.node as &dyn SceneNode).into()
    }
}
