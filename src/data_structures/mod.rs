//! Engine data structures: meshes, textures, scene graphs, and instances.
//!
//! - `mesh` builds flat-shaded low-poly geometry and uploads it
//! - `texture` wraps the depth buffer
//! - `instance` holds per-instance transformation and tint data
//! - `scene_graph` enables hierarchical scene organization

pub mod instance;
pub mod mesh;
pub mod scene_graph;
pub mod texture;
