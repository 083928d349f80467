#![allow(dead_code)]

#[cfg(feature = "integration-tests")]
use rocket_folio::{
    context::Context,
    data_structures::scene_graph::SceneNode,
    flow::{GraphicsFlow, ImageTestResult, Out},
    render::Render,
};

pub(crate) struct State {
    frame_counter: u32,
    init_invocations: u32,
    update_invocations: u32,
    pub dummy_state: String,
}

impl State {
    pub fn new() -> Self {
        Self {
            frame_counter: 0,
            init_invocations: 0,
            update_invocations: 0,
            dummy_state: String::new(),
        }
    }

    pub fn frame(&mut self) {
        self.frame_counter += 1;
    }

    pub fn init(&mut self) {
        self.init_invocations += 1;
    }

    pub fn update(&mut self) {
        self.update_invocations += 1;
    }

    pub fn frame_counter(&self) -> u32 {
        self.frame_counter
    }

    pub fn init_invocations(&self) -> u32 {
        self.init_invocations
    }

    pub fn update_invocations(&self) -> u32 {
        self.update_invocations
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Default)]
pub(crate) struct FrameCounter(pub(crate) u32);

impl FrameCounter {
    pub(crate) fn frame(&self) -> u32 {
        self.0
    }

    pub(crate) fn progress(&mut self) {
        self.0 += 1;
    }
}

#[cfg(feature = "integration-tests")]
pub(crate) type Pixels = image::ImageBuffer<image::Rgba<u8>, wgpu::BufferView>;

#[cfg(feature = "integration-tests")]
pub(crate) type Validate =
    Box<dyn Fn(&Context, &mut FrameCounter, &mut Pixels) -> Result<ImageTestResult, anyhow::Error>>;

/// A flow that renders an optional scene node and checks the frame.
#[cfg(feature = "integration-tests")]
pub(crate) struct TestRender {
    pub(crate) node: Option<Box<dyn SceneNode>>,
    pub(crate) setup: Box<dyn Fn(&mut Context)>,
    pub(crate) validate: Validate,
}

#[cfg(feature = "integration-tests")]
impl TestRender {
    pub(crate) fn new(
        node: Option<Box<dyn SceneNode>>,
        setup: impl Fn(&mut Context) + 'static,
        validate: impl Fn(&Context, &mut FrameCounter, &mut Pixels) -> Result<ImageTestResult, anyhow::Error>
        + 'static,
    ) -> Self {
        Self {
            node,
            setup: Box::new(setup),
            validate: Box::new(validate),
        }
    }
}

#[cfg(feature = "integration-tests")]
impl GraphicsFlow<FrameCounter, ()> for TestRender {
    fn on_init(&mut self, ctx: &mut Context, _: &mut FrameCounter) -> Out<FrameCounter, ()> {
        (self.setup)(ctx);
        if let Some(node) = self.node.as_mut() {
            node.update_world_transform_all();
            node.write_to_buffers(&ctx.queue, &ctx.device);
        }
        Out::Empty
    }

    fn on_update(&mut self, _: &Context, state: &mut FrameCounter, _: std::time::Duration) -> Out<FrameCounter, ()> {
        state.progress();
        Out::Empty
    }

    fn on_render<'pass>(&self) -> Render<'_, 'pass> {
        match self.node.as_deref() {
            Some(node) => node.into(),
            None => Render::None,
        }
    }

    fn render_to_texture(
        &self,
        ctx: &Context,
        state: &mut FrameCounter,
        texture: &mut Pixels,
    ) -> Result<ImageTestResult, anyhow::Error> {
        (self.validate)(ctx, state, texture)
    }
}

/// Converts a clear colour to the pixel it should produce. Surfaces may
/// be BGRA, so only colours with equal channels compare reliably.
#[cfg(feature = "integration-tests")]
pub(crate) fn expected_pixel(colour: wgpu::Color) -> image::Rgba<u8> {
    let f_to_u8 = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    image::Rgba([
        f_to_u8(colour.r),
        f_to_u8(colour.g),
        f_to_u8(colour.b),
        f_to_u8(colour.a),
    ])
}

#[macro_export]
macro_rules! golden_image_test {
    ($graphics_elem:expr) => {{
        use crate::common::test_utils::FrameCounter;
        use rocket_folio::flow::{FlowConsturctor, GraphicsFlow, WindowOptions};
        let constructor: FlowConsturctor<FrameCounter, ()> = Box::new(|init| {
            Box::pin(async move {
                let g_flow: Box<dyn GraphicsFlow<FrameCounter, ()>> = Box::new(($graphics_elem)(init));
                g_flow
            })
        });

        rocket_folio::flow::run(WindowOptions::default(), vec![constructor])
            .expect("Failed to run flow for integration test.");
    }};
}
