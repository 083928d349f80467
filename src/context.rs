//! GPU and window context.
//!
//! [`Context`] owns everything the frame loop needs: surface, device and
//! queue, the depth buffer, camera and light uniforms and the pipelines.
//! Flows receive it by shared reference in every hook and may mutate it
//! through [`crate::flow::Out::Configure`] or in `on_init`.

use std::sync::Arc;

use anyhow::Context as _;
use cgmath::Point3;
use winit::{dpi::PhysicalPosition, window::CursorGrabMode, window::Window};

use crate::{
    camera::{Camera, CameraResources, Projection},
    data_structures::texture,
    pipelines::{
        Pipelines,
        light::{LightResources, LightUniform},
    },
    sim::day_night::Lighting,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct MouseState {
    pub coords: PhysicalPosition<f64>,
    pub pointer_locked: bool,
}

#[derive(Debug)]
pub struct Context {
    pub(crate) window: Arc<Window>,
    pub(crate) depth_texture: texture::Texture,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub camera: CameraResources,
    pub projection: Projection,
    pub light: LightResources,
    pub pipelines: Pipelines,
    pub clear_colour: wgpu::Color,
    pub tick_duration_millis: u64,
    pub mouse: MouseState,
}

impl Context {
    pub async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let size = window.inner_size();

        log::info!("WGPU setup");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            #[cfg(not(target_arch = "wasm32"))]
            backends: wgpu::Backends::PRIMARY,
            #[cfg(target_arch = "wasm32")]
            backends: wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("Could not create a surface for the window")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("No graphics adapter is compatible with the surface")?;
        log::info!("Using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                // WebGL doesn't support all of wgpu's features, so if
                // we're building for the web we'll have to disable some.
                required_limits: if cfg!(target_arch = "wasm32") {
                    wgpu::Limits::downlevel_webgl2_defaults()
                } else {
                    wgpu::Limits::default()
                },
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("Could not open the graphics device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        // The colours in the shaders are linear, so prefer an Srgb surface.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("The surface reports no texture formats")?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps
                .present_modes
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo),
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        let camera = Camera::new((0.0, 3.0, 10.0), (0.0, 0.0, 0.0));
        let projection = Projection::new(config.width, config.height, cgmath::Deg(75.0), 0.1, 1000.0);
        let camera = CameraResources::new(&device, camera, &projection);
        let light = LightResources::new(LightUniform::default(), &device);
        let pipelines = Pipelines::new(&device, &config, &camera.bind_group_layout, &light.bind_group_layout);

        let depth_texture =
            texture::Texture::create_depth_texture(&device, [config.width, config.height], "depth_texture");

        Ok(Self {
            window,
            depth_texture,
            surface,
            device,
            queue,
            config,
            camera,
            projection,
            light,
            pipelines,
            clear_colour: wgpu::Color::BLACK,
            tick_duration_millis: 1000,
            mouse: MouseState::default(),
        })
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn set_title(&self, title: &str) {
        self.window.set_title(title);
    }

    pub fn set_camera(&mut self, eye: Point3<f32>, target: Point3<f32>) {
        self.camera.camera.eye = eye;
        self.camera.camera.target = target;
    }

    pub fn set_lighting(&mut self, lighting: &Lighting) {
        let [r, g, b] = lighting.clear_colour;
        self.clear_colour = wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: 1.0,
        };
        self.light.uniform = LightUniform {
            direction: lighting.light_direction,
            ambient: lighting.ambient,
            colour: lighting.light_colour,
            intensity: lighting.intensity,
        };
    }

    /// Captures or releases the pointer. Platforms without a hard lock get
    /// a confined cursor instead; if neither works the cursor stays free.
    pub fn set_pointer_lock(&mut self, locked: bool) {
        if locked == self.mouse.pointer_locked {
            return;
        }
        let result = if locked {
            self.window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| self.window.set_cursor_grab(CursorGrabMode::Confined))
        } else {
            self.window.set_cursor_grab(CursorGrabMode::None)
        };
        match result {
            Ok(()) => {
                self.window.set_cursor_visible(!locked);
                self.mouse.pointer_locked = locked;
            }
            Err(e) => log::warn!("Could not change the pointer lock: {}", e),
        }
    }
}

/// Handles a flow constructor may keep: the device and queue are cheap
/// clones of the context's.
#[derive(Debug, Clone)]
pub struct InitContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
}

impl From<&Context> for InitContext {
    fn from(ctx: &Context) -> Self {
        Self {
            device: ctx.device.clone(),
            queue: ctx.queue.clone(),
            config: ctx.config.clone(),
        }
    }
}
