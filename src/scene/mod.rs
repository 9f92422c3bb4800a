//! Scene module - everything around the rasterizer core
//!
//! - Frame orchestration (camera, mesh list, per-frame render)
//! - FPS statistics
//! - RON render settings
//! - OBJ mesh loading

mod config;
mod frame;
mod obj;
mod stats;

pub use config::*;
pub use frame::*;
pub use obj::*;
pub use stats::*;
