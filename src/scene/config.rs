//! Render settings and loading
//!
//! Uses RON (Rusty Object Notation). Every field has a default, so a
//! settings file only needs the values it changes.

use std::fs;
use std::path::Path;
use serde::{Serialize, Deserialize};
use crate::rasterizer::{Color, FAR, FOV, HEIGHT, NEAR, WIDTH};

/// Error type for settings loading
#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    ParseError(ron::error::SpannedError),
    /// Values that parse but cannot build a usable projection
    InvalidValue(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::IoError(e)
    }
}

impl From<ron::error::SpannedError> for ConfigError {
    fn from(e: ron::error::SpannedError) -> Self {
        ConfigError::ParseError(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::ParseError(e) => write!(f, "Parse error: {}", e),
            ConfigError::InvalidValue(msg) => write!(f, "Invalid setting: {}", msg),
        }
    }
}

/// Renderer settings, fixed for the lifetime of a scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Frame size in pixels
    pub width: usize,
    pub height: usize,
    /// Near and far plane depths
    pub near: f32,
    pub far: f32,
    /// Field of view in degrees
    pub fov: f32,
    /// Fill triangles with their shaded color
    pub fill: bool,
    /// Outline triangles after filling
    pub wireframe: bool,
    pub wireframe_color: Color,
    /// Camera step per frame along the look direction
    pub move_speed: f32,
    /// Yaw step per frame
    pub turn_speed: f32,
    /// Spin meshes and push them away from the camera over time
    pub auto_spin: bool,
    /// Spin angle added every frame
    pub spin_speed: f32,
    /// Starting distance of spun meshes
    pub model_distance: f32,
    /// How far spun meshes recede per 360 units of angle
    pub model_recede: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: WIDTH,
            height: HEIGHT,
            near: NEAR,
            far: FAR,
            fov: FOV,
            fill: true,
            wireframe: false,
            wireframe_color: Color::WHITE,
            move_speed: 0.1,
            turn_speed: 0.01,
            auto_spin: true,
            spin_speed: 0.01,
            model_distance: 15.0,
            model_recede: 10.0,
        }
    }
}

impl RenderConfig {
    /// Check the projection settings.
    ///
    /// `near` must be positive and below `far`, and `fov` must lie strictly
    /// between 0 and 180 degrees.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.near > 0.0) || !self.near.is_finite() {
            return Err(ConfigError::InvalidValue(format!("near must be > 0, got {}", self.near)));
        }
        if !(self.far > self.near) || !self.far.is_finite() {
            return Err(ConfigError::InvalidValue(format!(
                "far must be greater than near ({}), got {}",
                self.near, self.far
            )));
        }
        if !(self.fov > 0.0 && self.fov < 180.0) {
            return Err(ConfigError::InvalidValue(format!(
                "fov must be between 0 and 180 degrees, got {}",
                self.fov
            )));
        }
        Ok(())
    }
}

/// Load settings from a RON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<RenderConfig, ConfigError> {
    let contents = fs::read_to_string(path.as_ref())?;
    let config = load_config_from_str(&contents)?;
    log::info!("Loaded settings from {}", path.as_ref().display());
    Ok(config)
}

/// Load settings from a RON string
pub fn load_config_from_str(s: &str) -> Result<RenderConfig, ConfigError> {
    let config: RenderConfig = ron::from_str(s)?;
    config.validate()?;
    Ok(config)
}
