//! Per-mesh geometry pipeline
//!
//! world transform -> backface cull -> flat light -> view -> near clip
//! -> project -> viewport, then a depth-ordered insert into the draw list.

use super::math::{Mat4, Vec3};
use super::types::{Mesh, Triangle};

/// Light shines down -Z, toward a camera that starts looking down +Z
pub const LIGHT_DIR: Vec3 = Vec3::new(0.0, 0.0, -1.0);

/// Everything the pipeline needs for one frame
pub struct FrameTransforms {
    /// Composed model transform applied to every mesh
    pub world: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
    pub camera: Vec3,
    pub near: f32,
    pub width: usize,
    pub height: usize,
}

impl FrameTransforms {
    /// View-space triangle to pixel coordinates, in place
    fn to_screen(&self, tri: &mut Triangle) {
        let half_w = 0.5 * self.width as f32;
        let half_h = 0.5 * self.height as f32;

        for v in tri.p.iter_mut() {
            let mut projected = self.projection.transform(*v);
            let w = projected.w;
            projected /= w;
            projected += Vec3::new(1.0, 1.0, 0.0);
            projected.x *= half_w;
            projected.y *= half_h;
            *v = projected;
        }
    }
}

/// Run one mesh through the pipeline, appending into `draw_list`.
///
/// The mesh is only read; every triangle is copied before it is
/// transformed.
pub fn project_mesh(mesh: &Mesh, frame: &FrameTransforms, draw_list: &mut Vec<Triangle>) {
    let near_point = Vec3::new(0.0, 0.0, frame.near);
    let near_normal = Vec3::new(0.0, 0.0, 1.0);

    for source in &mesh.tris {
        let mut tri = source.map_points(|v| frame.world.transform(v));

        let normal = tri.normal();
        let facing = normal.dot(tri.p[0] - frame.camera);
        // NaN compares false too, so a broken normal is culled
        if !(facing < 0.0) {
            continue;
        }

        let light = normal.dot(LIGHT_DIR.normalized()).clamp(0.0, 1.0);
        tri.color = tri.color.scale(light);

        let viewed = tri.map_points(|v| frame.view.transform(v));

        for mut clipped in viewed.clip_against_plane(near_point, near_normal) {
            frame.to_screen(&mut clipped);
            insert_by_depth(draw_list, clipped);
        }
    }
}

/// Insert before the first entry whose mean depth is not greater than the
/// new triangle's. The list stays in descending mean z: far first, near
/// last, which is the painter's fill order.
pub fn insert_by_depth(draw_list: &mut Vec<Triangle>, tri: Triangle) {
    let z = tri.mean_z();
    match draw_list.iter().position(|other| !(z < other.mean_z())) {
        Some(i) => draw_list.insert(i, tri),
        None => draw_list.push(tri),
    }
}
