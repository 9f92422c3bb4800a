//! CPU-only triangle rasterizer
//!
//! Features:
//! - Homogeneous 4x4 transforms (row-vector convention)
//! - Backface culling and flat shading from a single light
//! - Near-plane and screen-edge clipping (0, 1 or 2 triangles per plane)
//! - Painter's algorithm ordering by mean depth, no z-test

mod math;
mod types;
mod render;
mod pipeline;

pub use math::*;
pub use types::*;
pub use render::*;
pub use pipeline::*;

/// Default frame dimensions
pub const WIDTH: usize = 640;
pub const HEIGHT: usize = 360;

/// Default projection parameters
pub const NEAR: f32 = 0.05;
pub const FAR: f32 = 1000.0;
pub const FOV: f32 = 90.0;
