//! Render pipelines.
//!
//! - `basic` draws opaque flat shaded meshes
//! - `transparent` draws the same meshes alpha blended
//! - `light` owns the directional light uniform both of them read
//! - `glow` draws additive screen-space discs behind the scene

pub mod basic;
pub mod glow;
pub mod light;
pub mod transparent;

use glow::GlowResources;

#[derive(Debug)]
pub struct Pipelines {
    pub basic: wgpu::RenderPipeline,
    pub transparent: wgpu::RenderPipeline,
    pub glow: GlowResources,
}

impl Pipelines {
    pub fn new(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        camera_layout: &wgpu::BindGroupLayout,
        light_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        Self {
            basic: basic::mk_basic_pipeline(device, config, camera_layout, light_layout),
            transparent: transparent::mk_transparent_pipeline(device, config, camera_layout, light_layout),
            glow: GlowResources::new(device, config),
        }
    }
}
