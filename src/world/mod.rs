//! World module - meshes and scene configuration
//!
//! - Mesh geometry with per-mesh transform and spin
//! - Wavefront OBJ loading
//! - RON scene files

mod mesh;
mod obj;
mod scene;

pub use mesh::*;
pub use scene::*;
