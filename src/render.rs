//! Render composition and pipeline batching.
//!
//! This module defines the [`Render`] enum, which flows use to specify how
//! they should be drawn. The engine sorts everything into batches per
//! pipeline (glow, opaque, transparent) and draws the batches in that order,
//! so the glow backdrop sits behind the scene and transparent geometry is
//! blended over what is already on screen.
//!
//! # Key types
//!
//! - [`Render<'a, 'pass>`] is the primary enum describing render operations
//! - [`Instanced<'a>`] contains data for instanced rendering (mesh + instance buffer)
//! - [`Glow<'a>`] contains the instance buffer of screen-space glow discs
//!

use wgpu::RenderPass;

use crate::{
    context::Context,
    data_structures::{mesh::Mesh, scene_graph::SceneNode},
};

/// Data for instanced object rendering: a mesh and its instance buffer.
#[derive(Clone)]
pub struct Instanced<'a> {
    pub instance: &'a wgpu::Buffer,
    pub mesh: &'a Mesh,
    pub amount: usize,
}

/// Screen-space glow discs. The quad they are drawn with lives in the
/// pipeline resources.
#[derive(Clone)]
pub struct Glow<'a> {
    pub instance: &'a wgpu::Buffer,
    pub amount: usize,
}

/// Specifies how a flow should be rendered.
///
/// # Variants
///
/// - `None` renders nothing
/// - `Default(Instanced)` renders a single opaque instanced object
/// - `Defaults(Vec<Instanced>)` renders a batch of opaque instanced objects
/// - `Transparent(Instanced)` renders a single alpha blended object
/// - `Transparents(Vec<Instanced>)` renders a batch of alpha blended objects
/// - `Glow(Glow)` renders additive discs behind everything else
/// - `Composed(Vec<Render>)` recursively renders composition of multiple renders
/// - `Custom(...)` invokes a user-defined closure for custom rendering
///
pub enum Render<'a, 'pass>
where
    'pass: 'a,
{
    None,
    Default(Instanced<'a>),
    Defaults(Vec<Instanced<'a>>),
    Transparent(Instanced<'a>),
    Transparents(Vec<Instanced<'a>>),
    Glow(Glow<'a>),
    Composed(Vec<Render<'a, 'pass>>),
    Custom(Box<dyn 'a + FnOnce(&Context, &mut wgpu::RenderPass<'pass>)>),
}

impl<'a, 'pass> Render<'a, 'pass> {
    pub(crate) fn set_pipelines(
        self,
        ctx: &Context,
        render_pass: &mut RenderPass<'pass>,
        basics: &mut Vec<Instanced<'a>>,
        trans: &mut Vec<Instanced<'a>>,
        glows: &mut Vec<Glow<'a>>,
    ) {
        match self {
            Render::Default(instanced) => basics.push(instanced),
            Render::Defaults(mut vec) => basics.append(&mut vec),
            Render::Transparent(instanced) => trans.push(instanced),
            Render::Transparents(mut vec) => trans.append(&mut vec),
            Render::Glow(glow) => glows.push(glow),
            Render::Composed(renders) => renders
                .into_iter()
                .for_each(|render| render.set_pipelines(ctx, render_pass, basics, trans, glows)),
            Render::Custom(f) => f(ctx, render_pass),
            Render::None => (),
        }
    }
}

impl<'a, 'pass> From<&'a dyn SceneNode> for Render<'a, 'pass> {
    fn from(node: &'a dyn SceneNode) -> Self {
        let mut opaque = Vec::new();
        let mut transparent = Vec::new();
        node.collect_render(&mut opaque, &mut transparent);
        Render::Composed(vec![
            Render::Defaults(opaque),
            Render::Transparents(transparent),
        ])
    }
}
