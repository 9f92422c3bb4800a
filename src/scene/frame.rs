//! Frame orchestration
//!
//! Owns the framebuffer, camera and mesh list, and drives one complete
//! render per call: input -> camera -> per-mesh pipeline -> screen clip
//! and fill -> image.

use std::sync::Arc;

use image::RgbaImage;

use crate::rasterizer::{
    draw_triangles, project_mesh, Color, Framebuffer, FramebufferError, FrameTransforms, Mat4,
    Mesh, Triangle, Vec3,
};
use super::config::RenderConfig;
use super::stats::FrameStats;

/// Keys held this frame, filled in by the host
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CameraInput {
    pub forward: bool,
    pub backward: bool,
    pub turn_left: bool,
    pub turn_right: bool,
}

/// First-person camera: a position and a yaw about +Y
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub position: Vec3,
    pub yaw: f32,
    /// Unit look direction derived from `yaw`
    pub look_dir: Vec3,
}

impl Camera {
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            yaw: 0.0,
            look_dir: Vec3::FORWARD,
        }
    }

    /// Apply one frame of input.
    ///
    /// Movement follows the look direction from before this frame's turn.
    pub fn update(&mut self, input: &CameraInput, move_speed: f32, turn_speed: f32) {
        let forward = self.look_dir * move_speed;
        if input.forward {
            self.position += forward;
        }
        if input.backward {
            self.position -= forward;
        }
        if input.turn_left {
            self.yaw -= turn_speed;
        }
        if input.turn_right {
            self.yaw += turn_speed;
        }
        self.look_dir = Mat4::rotate_y(self.yaw).transform(Vec3::FORWARD);
    }

    /// World-to-view matrix for the current pose
    pub fn view_matrix(&self) -> Mat4 {
        let target = self.position + self.look_dir;
        Mat4::point_at(self.position, target, Vec3::UP).quick_inverse()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

/// A renderable scene: meshes, camera and the frame they are drawn into
pub struct Scene {
    config: RenderConfig,
    fb: Framebuffer,
    projection: Mat4,
    camera: Camera,
    /// Accumulated spin angle
    angle: f32,
    meshes: Vec<Mesh>,
    draw_list: Vec<Triangle>,
    stats: Arc<FrameStats>,
}

impl Scene {
    /// Allocate the framebuffer and fix the projection for its lifetime
    pub fn new(config: RenderConfig) -> Result<Self, FramebufferError> {
        let fb = Framebuffer::new(config.width, config.height)?;
        let projection = Mat4::projection(
            config.near,
            config.far,
            config.fov,
            config.width as f32,
            config.height as f32,
        );

        Ok(Self {
            config,
            fb,
            projection,
            camera: Camera::new(),
            angle: 0.0,
            meshes: Vec::new(),
            draw_list: Vec::new(),
            stats: Arc::new(FrameStats::new()),
        })
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.fb
    }

    /// Shared handle for whoever runs the once-a-second roll-over
    pub fn stats(&self) -> Arc<FrameStats> {
        Arc::clone(&self.stats)
    }

    pub fn fps(&self) -> u32 {
        self.stats.fps()
    }

    pub fn set_wireframe(&mut self, on: bool) {
        self.config.wireframe = on;
    }

    /// Append a mesh and return its slot
    pub fn add_mesh(&mut self, mesh: Mesh) -> usize {
        self.meshes.push(mesh);
        let index = self.meshes.len() - 1;
        log::info!("Added mesh {} ({} triangles)", index, self.meshes[index].len());
        index
    }

    /// Remove the mesh at `index`.
    ///
    /// The last mesh moves into the freed slot, so order is not kept and
    /// the index of that last mesh changes.
    pub fn remove_mesh(&mut self, index: usize) -> Option<Mesh> {
        if index >= self.meshes.len() {
            log::warn!("No mesh at index {} ({} loaded)", index, self.meshes.len());
            return None;
        }
        let mesh = self.meshes.swap_remove(index);
        log::info!("Removed mesh {}", index);
        Some(mesh)
    }

    pub fn mesh(&self, index: usize) -> Option<&Mesh> {
        self.meshes.get(index)
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Model transform for the current spin angle
    fn world_transform(&self) -> Mat4 {
        if !self.config.auto_spin {
            return Mat4::IDENTITY;
        }
        let mut transform = Mat4::IDENTITY * Mat4::rotate_z(self.angle);
        transform *= Mat4::rotate_x(self.angle);
        transform *= Mat4::translate(
            0.0,
            0.0,
            self.config.model_distance - self.config.model_recede * (self.angle / 360.0),
        );
        transform
    }

    /// Render one frame into the framebuffer
    pub fn render_frame(&mut self, input: &CameraInput) {
        if self.config.auto_spin {
            self.angle += self.config.spin_speed;
        }
        self.fb.clear(Color::BLACK);

        if !self.meshes.is_empty() {
            self.camera.update(input, self.config.move_speed, self.config.turn_speed);

            let frame = FrameTransforms {
                world: self.world_transform(),
                view: self.camera.view_matrix(),
                projection: self.projection,
                camera: self.camera.position,
                near: self.config.near,
                width: self.fb.width,
                height: self.fb.height,
            };

            self.draw_list.clear();
            for mesh in &self.meshes {
                project_mesh(mesh, &frame, &mut self.draw_list);
            }

            let wireframe = self.config.wireframe.then_some(self.config.wireframe_color);
            draw_triangles(&mut self.fb, &mut self.draw_list, self.config.fill, wireframe);
        }

        self.stats.tick();
    }

    /// Render one frame and return it as a displayable image
    pub fn render(&mut self, input: &CameraInput) -> RgbaImage {
        self.render_frame(input);
        self.fb.to_image()
    }
}
