use instant::Duration;
use winit::event::WindowEvent;

use crate::{
    context::{Context, InitContext},
    flow::{GraphicsFlow, Out},
    pipelines::glow::GlowInstance,
    render::{Glow, Render},
    scene::{SceneEvent, SceneState},
    settings::Settings,
    sim::{clock::FixedStep, glow::GlowField},
};

/// Glowing discs behind the scene that shy away from the cursor.
pub struct GlowFlow {
    field: GlowField,
    clock: FixedStep,
    buffer: wgpu::Buffer,
    enabled: bool,
}

impl GlowFlow {
    pub fn new(init: &InitContext, settings: &Settings) -> Self {
        let field = GlowField::new(
            &settings.glow,
            init.config.width,
            init.config.height,
            settings.seed.wrapping_add(1),
        );
        let buffer = init.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Glow Instance Buffer"),
            size: (field.particles.len().max(1) * std::mem::size_of::<GlowInstance>())
                as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self {
            field,
            clock: FixedStep::default(),
            buffer,
            enabled: settings.glow.enabled,
        }
    }

    fn write(&self, queue: &wgpu::Queue) {
        let radius = self.field.radius();
        let instances: Vec<GlowInstance> = self
            .field
            .particles
            .iter()
            .map(|p| GlowInstance::from_particle(p, radius))
            .collect();
        if !instances.is_empty() {
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&instances));
        }
    }
}

impl GraphicsFlow<SceneState, SceneEvent> for GlowFlow {
    fn on_init(&mut self, ctx: &mut Context, _: &mut SceneState) -> Out<SceneState, SceneEvent> {
        let (width, height) = ctx.window_size();
        self.field.resize(width, height);
        self.write(&ctx.queue);
        Out::Empty
    }

    fn on_window_events(
        &mut self,
        _: &Context,
        _: &mut SceneState,
        event: &WindowEvent,
    ) -> Out<SceneState, SceneEvent> {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.field.set_mouse_window(position.x, position.y)
            }
            WindowEvent::CursorLeft { .. } => self.field.clear_mouse(),
            WindowEvent::Resized(size) => self.field.resize(size.width, size.height),
            _ => (),
        }
        Out::Empty
    }

    fn on_update(
        &mut self,
        ctx: &Context,
        state: &mut SceneState,
        dt: Duration,
    ) -> Out<SceneState, SceneEvent> {
        if !self.enabled || state.paused {
            self.clock.reset();
            return Out::Empty;
        }
        // The cursor is hidden while the pointer is captured.
        if ctx.mouse.pointer_locked {
            self.field.clear_mouse();
        }
        let steps = self.clock.advance(dt);
        for _ in 0..steps {
            self.field.step();
        }
        if steps > 0 {
            self.write(&ctx.queue);
        }
        Out::Empty
    }

    fn on_render<'pass>(&self) -> Render<'_, 'pass> {
        if !self.enabled {
            return Render::None;
        }
        Render::Glow(Glow {
            instance: &self.buffer,
            amount: self.field.particles.len(),
        })
    }
}
