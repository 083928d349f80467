//! rocket-folio
//!
//! An interactive portfolio rendered with wgpu: a low-poly rocket flies
//! through a starfield and an asteroid belt past floating platforms, each
//! holding one project. Runs natively and in the browser through WASM.
//!
//! High-level modules
//! - `camera`: camera, projection and their uniform
//! - `context`: GPU and window context that owns device, queue and pipelines
//! - `data_structures`: meshes, instances, textures and the scene graph
//! - `flow`: the frame loop and the `GraphicsFlow` trait the scene plugs into
//! - `pipelines`: basic, transparent and glow render pipelines
//! - `render`: render composition for pipeline reuse
//! - `scene`: the flows that make up the portfolio
//! - `settings`: YAML backed runtime settings
//! - `sim`: window independent simulation of everything that moves
//!

pub mod camera;
pub mod context;
pub mod data_structures;
pub mod flow;
pub mod pipelines;
pub mod render;
pub mod scene;
pub mod settings;
pub mod sim;

pub use scene::launch;
pub use settings::Settings;
pub use winit::dpi::PhysicalPosition;
pub use winit::event::DeviceEvent;
pub use winit::event::WindowEvent;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Browser entry point. The web build always starts from the defaults.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    launch(Settings::default()).map_err(|e| JsValue::from_str(&e.to_string()))
}
