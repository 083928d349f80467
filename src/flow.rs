//! Flow control and application event loop.
//!
//! A "flow" is one self-contained part of the scene: it handles input,
//! advances its own simulation and hands back what it wants drawn. The
//! engine owns the window and GPU context, fans every event out to all
//! flows in registration order and composes their renders.
//!
//! # User-facing types
//!
//! - [`GraphicsFlow<S, E>`] is the trait every part of the scene implements
//! - [`Out<S, E>`] is what a hook returns: async events, state mutations or context changes
//! - [`WindowOptions`] describes the window [`run`] opens
//!
//! # Lifecycle
//!
//! Each frame the loop:
//! 1. forwards pending window/device events to `on_<device/window/custom>_events`
//! 2. calls `on_update` on every flow, then `on_tick` if a tick elapsed
//! 3. uploads the camera and light uniforms
//! 4. collects every flow's `on_render` and sorts it into pipeline batches
//! 5. draws glow, then opaque, then transparent geometry and presents

use std::{fmt::Debug, iter, pin::Pin, sync::Arc};

use instant::{Duration, Instant};

#[cfg(feature = "integration-tests")]
use tokio::runtime::Runtime;
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    window::Window,
};

use crate::{
    context::{Context, InitContext},
    data_structures::{mesh::DrawMesh, texture::Texture},
    render::{Glow, Instanced, Render},
};

///
/// This is the Output Type for every lifecycle hook where a flow can pass async events that are
/// handled according to the platform you're running on.
///
/// `Out::FutEvent` resolves futures of events that are put in the event queue and offered to
/// every flow's `on_custom_events` in order.
///
/// `Out::FutFn` resolves futures of state mutations that are applied without further action.
///
/// `Out::Configure` mutates the Context, for instance the clear colour, the camera or the
/// pointer lock.
///
/// `Out::Batch` bundles several outputs of one hook; they are handled in order.
///
/// `Empty` is the default output used when no eventing/futures need to be handled.
///
pub enum Out<S, E> {
    FutEvent(Vec<Box<dyn Future<Output = E>>>),
    FutFn(Vec<Box<dyn Future<Output = Box<dyn FnOnce(&mut S)>>>>),
    Configure(Box<dyn FnOnce(&mut Context)>),
    Batch(Vec<Out<S, E>>),
    Empty,
}

impl<S, E> Default for Out<S, E> {
    fn default() -> Self {
        Self::Empty
    }
}

impl<S, E> Out<S, E> {
    /// Wraps an already known event.
    pub fn event(event: E) -> Self
    where
        E: 'static,
    {
        Self::FutEvent(vec![Box::new(async move { event })])
    }

    pub fn configure(f: impl FnOnce(&mut Context) + 'static) -> Self {
        Self::Configure(Box::new(f))
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Out::Empty => true,
            Out::Batch(outs) => outs.iter().all(Out::is_empty),
            _ => false,
        }
    }

    /// Appends `other`, flattening empties away.
    pub fn and(self, other: Out<S, E>) -> Self {
        match (self, other) {
            (Out::Empty, other) => other,
            (this, Out::Empty) => this,
            (Out::Batch(mut outs), other) => {
                outs.push(other);
                Out::Batch(outs)
            }
            (this, other) => Out::Batch(vec![this, other]),
        }
    }
}

#[cfg(feature = "integration-tests")]
pub enum ImageTestResult {
    Passed,
    Waiting,
    Failed,
}

/// Trait for implementing one part of the scene.
///
/// # Lifecycle
///
/// 1. `on_init()` is called once when the flow is created; configure the context here
/// 2. `on_window_events()` and `on_device_events()` are called for each winit input event
/// 3. `on_update()` is called every frame
/// 4. `on_tick()` is called every `tick_duration_millis`
/// 5. `on_custom_events()` is called for events emitted by any flow
/// 6. `on_render()` is called each frame and specifies how to render `self`
///
pub trait GraphicsFlow<S, E> {
    /// Initialize the flow and configure the context.
    fn on_init(&mut self, ctx: &mut Context, state: &mut S) -> Out<S, E>;

    /// Update state every frame.
    ///
    /// Called every frame with the elapsed wall time `dt`. Flows that
    /// simulate at a fixed rate accumulate it themselves.
    fn on_update(&mut self, ctx: &Context, state: &mut S, dt: Duration) -> Out<S, E>;

    /// Called every `tick_duration_millis` milliseconds.
    fn on_tick(&mut self, _ctx: &Context, _state: &mut S) -> Out<S, E> {
        Out::Empty
    }

    /// Handle raw device events (mouse motion while the pointer is locked).
    fn on_device_events(&mut self, _ctx: &Context, _state: &mut S, _event: &DeviceEvent) -> Out<S, E> {
        Out::Empty
    }

    /// Handle window events (keyboard, mouse, window resizing, etc.).
    fn on_window_events(&mut self, _ctx: &Context, _state: &mut S, _event: &WindowEvent) -> Out<S, E> {
        Out::Empty
    }

    /// Handle custom application events.
    ///
    /// Returns the event if it was not consumed, allowing it to be passed to
    /// the next flow. Returning `None` means the event was consumed.
    fn on_custom_events(&mut self, _ctx: &Context, _state: &mut S, event: E) -> Option<E> {
        Some(event)
    }

    /// Return renderable objects for this flow.
    fn on_render<'pass>(&self) -> Render<'_, 'pass>;

    #[cfg(feature = "integration-tests")]
    fn render_to_texture(
        &self,
        _ctx: &Context,
        _state: &mut S,
        _texture: &mut image::ImageBuffer<image::Rgba<u8>, wgpu::BufferView>,
    ) -> Result<ImageTestResult, anyhow::Error> {
        Ok(ImageTestResult::Passed)
    }
}

// Dummy impl to make wasm work
impl<State, Event> Debug for dyn GraphicsFlow<State, Event> + 'static {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("GraphicsFlow")
    }
}

/// Type alias for a flow constructor (factory function).
///
/// A flow constructor takes an `InitContext` and asynchronously returns a
/// boxed `GraphicsFlow`. This allows GPU resources to be created before
/// the first frame.
pub type FlowConsturctor<S, E> =
    Box<dyn FnOnce(InitContext) -> Pin<Box<dyn Future<Output = Box<dyn GraphicsFlow<S, E>>>>>>;

#[derive(Debug, Clone)]
pub struct WindowOptions {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            title: String::from("flow"),
            width: 1280,
            height: 720,
        }
    }
}

/// Application state bundle: GPU context, app state, and surface status.
#[derive(Debug)]
pub struct AppState<State: 'static> {
    pub(crate) ctx: Context,
    state: State,
    is_surface_configured: bool,
}

impl<State: Default> AppState<State> {
    async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let ctx = Context::new(window).await?;
        Ok(Self {
            ctx,
            state: State::default(),
            is_surface_configured: false,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.ctx.config.width = width;
            self.ctx.config.height = height;
            self.is_surface_configured = true;
            self.ctx.projection.resize(width, height);
            self.ctx.surface.configure(&self.ctx.device, &self.ctx.config);
            self.ctx.depth_texture =
                Texture::create_depth_texture(&self.ctx.device, [width, height], "depth_texture");
            self.ctx.pipelines.glow.resize(&self.ctx.queue, width, height);
        }
    }

    #[cfg(feature = "integration-tests")]
    fn get_test_texture(&self, extent3d: wgpu::Extent3d, format: wgpu::TextureFormat) -> wgpu::Texture {
        self.ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Golden Image Test Output Texture"),
            size: extent3d,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::COPY_SRC | wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        })
    }

    /// Rows copied out of a texture must be 256 byte aligned.
    #[cfg(feature = "integration-tests")]
    fn get_test_3d_extent(&self) -> wgpu::Extent3d {
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT / 4;
        let width = self.ctx.config.width.div_ceil(align) * align;
        wgpu::Extent3d {
            width,
            height: self.ctx.config.height,
            depth_or_array_layers: 1,
        }
    }

    fn render<Event>(
        &mut self,
        graphics_flows: &mut [Box<dyn GraphicsFlow<State, Event>>],
        #[cfg(feature = "integration-tests")] async_runtime: &Runtime,
        #[cfg(feature = "integration-tests")] proxy: &EventLoopProxy<FlowEvent<State, Event>>,
    ) -> Result<(), wgpu::SurfaceError> {
        // invoke main render loop
        self.ctx.window.request_redraw();

        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return Ok(());
        }

        let output = self.ctx.surface.get_current_texture()?;
        #[cfg(not(feature = "integration-tests"))]
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        #[cfg(feature = "integration-tests")]
        let (tex, view, depth) = {
            let extent3d = self.get_test_3d_extent();
            let tex = self.get_test_texture(extent3d, self.ctx.config.format);
            let view = tex.create_view(&wgpu::TextureViewDescriptor::default());
            let depth = Texture::create_depth_texture(
                &self.ctx.device,
                [extent3d.width, extent3d.height],
                "test_depth_texture",
            );
            (tex, view, depth)
        };
        #[cfg(feature = "integration-tests")]
        let depth_view = &depth.view;
        #[cfg(not(feature = "integration-tests"))]
        let depth_view = &self.ctx.depth_texture.view;

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass: wgpu::RenderPass<'_> = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.ctx.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            let mut basics: Vec<Instanced> = Vec::new();
            let mut trans: Vec<Instanced> = Vec::new();
            let mut glows: Vec<Glow> = Vec::new();
            graphics_flows.iter().for_each(|flow| {
                let render = flow.on_render();
                render.set_pipelines(&self.ctx, &mut render_pass, &mut basics, &mut trans, &mut glows);
            });

            let glow = &self.ctx.pipelines.glow;
            render_pass.set_pipeline(&glow.pipeline);
            render_pass.set_bind_group(0, &glow.screen_bind_group, &[]);
            render_pass.set_vertex_buffer(0, glow.quad.slice(..));
            for disc in glows {
                if disc.amount == 0 {
                    continue;
                }
                render_pass.set_vertex_buffer(1, disc.instance.slice(..));
                render_pass.draw(0..6, 0..disc.amount as u32);
            }

            render_pass.set_pipeline(&self.ctx.pipelines.basic);
            for instanced in basics {
                if instanced.amount == 0 || instanced.instance.size() == 0 {
                    log::warn!("you attempted to render {:?} with zero instances", instanced.mesh.name);
                    continue;
                }
                render_pass.set_vertex_buffer(1, instanced.instance.slice(..));
                render_pass.draw_mesh_instanced(
                    instanced.mesh,
                    0..instanced.amount as u32,
                    &self.ctx.camera.bind_group,
                    &self.ctx.light.bind_group,
                );
            }

            render_pass.set_pipeline(&self.ctx.pipelines.transparent);
            for instanced in trans {
                if instanced.amount == 0 || instanced.instance.size() == 0 {
                    continue;
                }
                render_pass.set_vertex_buffer(1, instanced.instance.slice(..));
                render_pass.draw_mesh_instanced(
                    instanced.mesh,
                    0..instanced.amount as u32,
                    &self.ctx.camera.bind_group,
                    &self.ctx.light.bind_group,
                );
            }
        }

        #[cfg(feature = "integration-tests")]
        let output_buffer = {
            let u32_size = std::mem::size_of::<u32>() as u32;
            let extent3d = self.get_test_3d_extent();
            let output_buffer = self.ctx.device.create_buffer(&wgpu::BufferDescriptor {
                size: (u32_size * extent3d.width * extent3d.height) as wgpu::BufferAddress,
                usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
                label: Some("Golden Image Test Output Buffer"),
                mapped_at_creation: false,
            });
            encoder.copy_texture_to_buffer(
                wgpu::TexelCopyTextureInfo {
                    aspect: wgpu::TextureAspect::All,
                    texture: &tex,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                },
                wgpu::TexelCopyBufferInfo {
                    buffer: &output_buffer,
                    layout: wgpu::TexelCopyBufferLayout {
                        offset: 0,
                        bytes_per_row: Some(u32_size * extent3d.width),
                        rows_per_image: Some(extent3d.height),
                    },
                },
                extent3d,
            );
            output_buffer
        };

        self.ctx.queue.submit(iter::once(encoder.finish()));

        #[cfg(feature = "integration-tests")]
        {
            use std::convert::identity;

            let extent3d = self.get_test_3d_extent();
            let buffer_slice = output_buffer.slice(..);
            let fut_img = async {
                let (tx, rx) = futures_intrusive::channel::shared::oneshot_channel();
                buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
                    tx.send(result).ok();
                });
                self.ctx
                    .device
                    .poll(wgpu::PollType::Wait {
                        submission_index: None,
                        timeout: Some(Duration::from_secs(3)),
                    })
                    .expect("The device did not finish the golden image copy");
                rx.receive()
                    .await
                    .expect("The map callback was dropped")
                    .expect("The golden image buffer could not be mapped");
                let data = buffer_slice.get_mapped_range();
                image::ImageBuffer::<image::Rgba<u8>, _>::from_raw(extent3d.width, extent3d.height, data)
                    .expect("The mapped buffer is smaller than the image")
            };
            let mut img = async_runtime.block_on(fut_img);
            let state = &mut self.state;
            let all_passed = graphics_flows
                .iter_mut()
                .map(|flow| flow.render_to_texture(&self.ctx, state, &mut img))
                .map(|res| match res {
                    Err(e) => panic!("{}", e),
                    Ok(ImageTestResult::Passed) => true,
                    Ok(ImageTestResult::Failed) => panic!("Assertion failed"),
                    Ok(ImageTestResult::Waiting) => false,
                })
                .all(identity);
            if all_passed {
                proxy
                    .send_event(FlowEvent::Exit)
                    .expect("All assertions passed but the winit event-loop could not safely exit")
            }
        }

        output.present();
        Ok(())
    }
}

pub struct App<State: 'static, Event: 'static> {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    proxy: EventLoopProxy<FlowEvent<State, Event>>,
    options: WindowOptions,
    state: Option<AppState<State>>,
    // This will hold the fully initialized flows once they are ready.
    graphics_flows: Vec<Box<dyn GraphicsFlow<State, Event>>>,
    // Taken on the first `resumed`.
    constructors: Option<Vec<FlowConsturctor<State, Event>>>,
    last_time: Instant,
    time_since_tick: Duration,
}

impl<State, Event> App<State, Event>
where
    State: 'static,
    Event: 'static,
{
    fn new(
        event_loop: &EventLoop<FlowEvent<State, Event>>,
        options: WindowOptions,
        constructors: Vec<FlowConsturctor<State, Event>>,
    ) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new()?;
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy,
            options,
            state: None,
            graphics_flows: Vec::new(),
            constructors: Some(constructors),
            last_time: Instant::now(),
            time_since_tick: Duration::from_millis(0),
        })
    }
}

pub(crate) enum FlowEvent<State: 'static, Event: 'static> {
    #[allow(dead_code)]
    Initialized {
        state: AppState<State>,
        flows: Vec<Box<dyn GraphicsFlow<State, Event>>>,
    },
    #[allow(dead_code)]
    Mut(Box<dyn FnOnce(&mut State)>),
    Custom(Event),
    #[allow(dead_code)]
    Exit,
}

impl<State, Event> Debug for FlowEvent<State, Event> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialized { state: _, flows } => f.debug_struct("Initialized").field("flows", flows).finish(),
            Self::Mut(_) => f.write_str("Mut(|&mut State| -> {...})"),
            Self::Custom(_) => f.write_str("Custom(E)"),
            Self::Exit => f.write_str("Exit"),
        }
    }
}

/// Calls `hook` on every flow in order and handles each output before the
/// next flow runs, so later flows see earlier flows' context changes.
fn broadcast<State, Event>(
    #[cfg(not(target_arch = "wasm32"))] async_runtime: &tokio::runtime::Runtime,
    proxy: &EventLoopProxy<FlowEvent<State, Event>>,
    flows: &mut [Box<dyn GraphicsFlow<State, Event>>],
    app_state: &mut AppState<State>,
    mut hook: impl FnMut(&mut dyn GraphicsFlow<State, Event>, &Context, &mut State) -> Out<State, Event>,
) {
    for flow in flows.iter_mut() {
        let out = hook(flow.as_mut(), &app_state.ctx, &mut app_state.state);
        handle_flow_output(
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            &mut app_state.state,
            &mut app_state.ctx,
            proxy.clone(),
            out,
        );
    }
}

fn init_flows<State, Event>(
    #[cfg(not(target_arch = "wasm32"))] async_runtime: &tokio::runtime::Runtime,
    proxy: &EventLoopProxy<FlowEvent<State, Event>>,
    flows: &mut [Box<dyn GraphicsFlow<State, Event>>],
    app_state: &mut AppState<State>,
) {
    for flow in flows.iter_mut() {
        let out = flow.on_init(&mut app_state.ctx, &mut app_state.state);
        handle_flow_output(
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            &mut app_state.state,
            &mut app_state.ctx,
            proxy.clone(),
            out,
        );
    }
}

impl<State: 'static + Default, Event: 'static> ApplicationHandler<FlowEvent<State, Event>> for App<State, Event> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Some(constructors) = self.constructors.take() else {
            return;
        };

        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title(self.options.title.clone());

        #[cfg(not(target_arch = "wasm32"))]
        {
            window_attributes = window_attributes
                .with_inner_size(winit::dpi::LogicalSize::new(self.options.width, self.options.height));
        }

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "canvas";

            let canvas = wgpu::web_sys::window()
                .and_then(|window| window.document())
                .and_then(|document| document.get_element_by_id(CANVAS_ID));
            match canvas {
                Some(canvas) => {
                    window_attributes = window_attributes.with_canvas(Some(canvas.unchecked_into()));
                }
                None => log::warn!("No element with id {:?}, winit will create a canvas", CANVAS_ID),
            }
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Could not create a window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let init_future = async move {
            let app_state = AppState::new(window).await?;
            let flow_futures: Vec<_> = constructors
                .into_iter()
                // The clone in into() leverages the internal Arcs of Device and Queue and thus only clones the ref
                .map(|constructor| constructor((&app_state.ctx).into()))
                .collect();
            let flows: Vec<_> = futures::future::join_all(flow_futures).await;
            anyhow::Ok((app_state, flows))
        };

        #[cfg(not(target_arch = "wasm32"))]
        {
            match self.async_runtime.block_on(init_future) {
                Ok((mut app_state, flows)) => {
                    self.graphics_flows = flows;
                    let size = app_state.ctx.window.inner_size();
                    app_state.resize(size.width, size.height);
                    init_flows(&self.async_runtime, &self.proxy, &mut self.graphics_flows, &mut app_state);
                    self.last_time = Instant::now();
                    self.state = Some(app_state);
                }
                Err(e) => {
                    log::error!("App initialization failed. Cannot create the main context: {:#}", e);
                    event_loop.exit();
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match init_future.await {
                    Ok((state, flows)) => {
                        if proxy.send_event(FlowEvent::Initialized { state, flows }).is_err() {
                            log::error!("The event loop closed before initialization finished");
                        }
                    }
                    Err(e) => log::error!("App initialization failed. Cannot create the main context: {:#}", e),
                }
            });
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: FlowEvent<State, Event>) {
        match event {
            FlowEvent::Initialized { state, flows } => {
                // This is the message from our wasm `spawn_local`
                self.graphics_flows = flows;
                let app_state = self.state.insert(state);

                // Important: Trigger a resize and redraw now that we are initialized
                let size = app_state.ctx.window.inner_size();
                app_state.resize(size.width, size.height);
                init_flows(
                    #[cfg(not(target_arch = "wasm32"))]
                    &self.async_runtime,
                    &self.proxy,
                    &mut self.graphics_flows,
                    app_state,
                );
                self.last_time = Instant::now();
                app_state.ctx.window.request_redraw();
            }
            FlowEvent::Custom(custom_event) => {
                if let Some(state) = &mut self.state {
                    let result = self
                        .graphics_flows
                        .iter_mut()
                        .try_fold(custom_event, |event, flow| {
                            flow.on_custom_events(&state.ctx, &mut state.state, event)
                        });
                    if result.is_some() {
                        log::debug!("Custom event was not consumed this cycle");
                    }
                }
            }
            FlowEvent::Mut(fn_once) => {
                if let Some(state) = &mut self.state {
                    fn_once(&mut state.state);
                }
            }
            FlowEvent::Exit => {
                event_loop.exit();
            }
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        let Some(state) = &mut self.state else {
            return;
        };
        broadcast(
            #[cfg(not(target_arch = "wasm32"))]
            &self.async_runtime,
            &self.proxy,
            &mut self.graphics_flows,
            state,
            |flow, ctx, s| flow.on_device_events(ctx, s, &event),
        );
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: winit::window::WindowId, event: WindowEvent) {
        let Some(state) = &mut self.state else {
            return;
        };

        match &event {
            WindowEvent::CursorMoved { position, .. } => state.ctx.mouse.coords = *position,
            // A lost focus would otherwise leave the cursor trapped.
            WindowEvent::Focused(false) => state.ctx.set_pointer_lock(false),
            WindowEvent::Occluded(_) => self.last_time = Instant::now(),
            _ => (),
        }

        broadcast(
            #[cfg(not(target_arch = "wasm32"))]
            &self.async_runtime,
            &self.proxy,
            &mut self.graphics_flows,
            state,
            |flow, ctx, s| flow.on_window_events(ctx, s, &event),
        );

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::RedrawRequested => {
                let dt = self.last_time.elapsed();
                self.last_time = Instant::now();
                self.time_since_tick += dt;

                broadcast(
                    #[cfg(not(target_arch = "wasm32"))]
                    &self.async_runtime,
                    &self.proxy,
                    &mut self.graphics_flows,
                    state,
                    |flow, ctx, s| flow.on_update(ctx, s, dt),
                );
                if self.time_since_tick >= Duration::from_millis(state.ctx.tick_duration_millis) {
                    broadcast(
                        #[cfg(not(target_arch = "wasm32"))]
                        &self.async_runtime,
                        &self.proxy,
                        &mut self.graphics_flows,
                        state,
                        |flow, ctx, s| flow.on_tick(ctx, s),
                    );
                    self.time_since_tick = Duration::from_millis(0);
                }

                let ctx = &mut state.ctx;
                ctx.camera.write(&ctx.queue, &ctx.projection);
                ctx.light.write(&ctx.queue);

                match state.render(
                    &mut self.graphics_flows,
                    #[cfg(feature = "integration-tests")]
                    &self.async_runtime,
                    #[cfg(feature = "integration-tests")]
                    &self.proxy,
                ) {
                    Ok(()) => (),
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = state.ctx.window.inner_size();
                        state.resize(size.width, size.height);
                    }
                    Err(e) => {
                        log::error!("Unable to render {}", e);
                    }
                }
            }
            _ => {}
        }
    }
}

fn handle_flow_output<State, Event>(
    #[cfg(not(target_arch = "wasm32"))] async_runtime: &tokio::runtime::Runtime,
    state: &mut State,
    ctx: &mut Context,
    proxy: EventLoopProxy<FlowEvent<State, Event>>,
    out: Out<State, Event>,
) {
    match out {
        // Send the events passed by the flow to winit
        Out::FutEvent(futures) => {
            let fut = async move { futures::future::join_all(futures.into_iter().map(Pin::from)).await };
            #[cfg(not(target_arch = "wasm32"))]
            {
                let resolved = async_runtime.block_on(fut);
                for event in resolved {
                    if let Err(err) = proxy.send_event(FlowEvent::Custom(event)) {
                        log::error!("Event loop was closed before all events could be processed: {}", err);
                        return;
                    }
                }
            }

            #[cfg(target_arch = "wasm32")]
            {
                wasm_bindgen_futures::spawn_local(async move {
                    for event in fut.await {
                        if proxy.send_event(FlowEvent::Custom(event)).is_err() {
                            log::error!("Event loop was closed before all events could be processed");
                            return;
                        }
                    }
                });
            }
        }
        // Mutate the state if the arch supports blocking, create an event otherwise
        Out::FutFn(futures) => {
            let events: Vec<Pin<Box<dyn Future<Output = Box<dyn FnOnce(&mut State)>>>>> =
                futures.into_iter().map(Pin::from).collect();
            let fut = async move { futures::future::join_all(events).await };
            #[cfg(not(target_arch = "wasm32"))]
            {
                let resolved: Vec<Box<dyn FnOnce(&mut State)>> = async_runtime.block_on(fut);
                resolved.into_iter().for_each(|mutation| mutation(state));
            }

            #[cfg(target_arch = "wasm32")]
            {
                wasm_bindgen_futures::spawn_local(async move {
                    for mutation in fut.await {
                        if proxy.send_event(FlowEvent::Mut(mutation)).is_err() {
                            log::error!("Event loop was closed before all mutations could be applied");
                            return;
                        }
                    }
                });
            }
        }
        Out::Configure(f) => f(ctx),
        Out::Batch(outs) => {
            for out in outs {
                handle_flow_output(
                    #[cfg(not(target_arch = "wasm32"))]
                    async_runtime,
                    state,
                    ctx,
                    proxy.clone(),
                    out,
                );
            }
        }
        Out::Empty => (),
    }
}

/// Installs the logger once. `RUST_LOG` overrides the `info` default on
/// native targets; later calls are no-ops.
pub fn init_logging() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        #[cfg(not(target_arch = "wasm32"))]
        {
            if let Err(e) =
                env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).try_init()
            {
                println!("Warning: Could not initialize logger: {}", e);
            };
        }

        #[cfg(target_arch = "wasm32")]
        {
            let _ = console_log::init_with_level(log::Level::Info);
        }
    });
}

/// Opens the window and runs the flows until it is closed.
pub fn run<State: 'static + Default, Event: 'static>(
    options: WindowOptions,
    constructors: Vec<FlowConsturctor<State, Event>>,
) -> anyhow::Result<()> {
    init_logging();

    #[cfg(all(feature = "integration-tests", target_os = "linux"))]
    let event_loop: EventLoop<FlowEvent<State, Event>> = {
        use winit::platform::wayland::EventLoopBuilderExtWayland;

        EventLoop::with_user_event().with_any_thread(true).build()?
    };

    #[cfg(all(feature = "integration-tests", target_os = "windows"))]
    let event_loop: EventLoop<FlowEvent<State, Event>> = {
        use winit::platform::windows::EventLoopBuilderExtWindows;

        EventLoop::with_user_event().with_any_thread(true).build()?
    };

    #[cfg(any(
        not(feature = "integration-tests"),
        not(any(target_os = "linux", target_os = "windows"))
    ))]
    let event_loop: EventLoop<FlowEvent<State, Event>> = EventLoop::with_user_event().build()?;

    let mut app: App<State, Event> = App::new(&event_loop, options, constructors)?;

    event_loop.run_app(&mut app)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn and_flattens_empties() {
        let out: Out<(), ()> = Out::Empty.and(Out::Empty);
        assert!(matches!(out, Out::Empty));

        let out: Out<(), ()> = Out::event(()).and(Out::Empty);
        assert!(matches!(out, Out::FutEvent(_)));

        let out: Out<(), ()> = Out::event(()).and(Out::event(())).and(Out::event(()));
        match out {
            Out::Batch(outs) => assert_eq!(outs.len(), 3),
            _ => panic!("expected a batch"),
        }
    }

    #[test]
    fn empty_batches_are_empty() {
        let out: Out<(), ()> = Out::Batch(vec![Out::Empty, Out::Batch(vec![])]);
        assert!(out.is_empty());
        assert!(!Out::<(), ()>::event(()).is_empty());
    }
}
