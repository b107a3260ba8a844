//! Software rasterizer
//!
//! Features:
//! - View-space frustum clipping (Sutherland-Hodgman)
//! - Perspective-correct texture mapping
//! - Flat shading from a single directional light
//! - Z-buffer storing `1 - 1/w`

mod math;
mod types;
mod render;
mod camera;
mod clipping;
mod light;

pub use math::*;
pub use types::*;
pub use render::*;
pub use camera::*;
pub use clipping::*;
pub use light::*;

/// Default window/framebuffer dimensions
pub const WIDTH: usize = 800;
pub const HEIGHT: usize = 600;
