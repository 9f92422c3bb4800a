//! Vector and matrix math for the software pipeline
//!
//! Row-vector convention throughout: a point is transformed as `v * M`,
//! so in `A * B` the transform `A` is applied first.

use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

/// Magnitudes below this are treated as zero by `normalize`
const NORMALIZE_EPSILON: f32 = 1e-8;

/// 3D homogeneous vector
///
/// `w` defaults to 1 and only matters around projection: the projection
/// matrix copies view-space z into `w` for the perspective divide.
///
/// Operators (`a + b`, `a * s`, ...) produce a new vector with `w = 1`.
/// The compound forms (`a += b`, `a /= s`, ...) mutate in place and leave
/// `w` untouched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Default for Vec3 {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0, w: 1.0 };
    pub const UP: Vec3 = Vec3 { x: 0.0, y: 1.0, z: 0.0, w: 1.0 };
    pub const FORWARD: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 1.0, w: 1.0 };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z, w: 1.0 }
    }

    pub fn dot(self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn len(self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Normalize in place.
    ///
    /// A (near-)zero or non-finite vector becomes `ZERO` instead of NaN, so a
    /// degenerate face normal dots to 0 and is culled as facing away.
    pub fn normalize(&mut self) {
        let l = self.len();
        if !(l > NORMALIZE_EPSILON) || !l.is_finite() {
            self.x = 0.0;
            self.y = 0.0;
            self.z = 0.0;
            return;
        }
        self.x /= l;
        self.y /= l;
        self.z /= l;
    }

    /// Unit-length copy, same zero-guard as `normalize`
    pub fn normalized(self) -> Vec3 {
        let mut v = Vec3::new(self.x, self.y, self.z);
        v.normalize();
        v
    }

    /// Point where the segment `start -> end` crosses the plane through
    /// `plane_point` with normal `plane_normal`.
    ///
    /// The caller must know the segment straddles the plane; a segment
    /// parallel to it divides by zero.
    pub fn intersect_plane(plane_point: Vec3, plane_normal: Vec3, start: Vec3, end: Vec3) -> Vec3 {
        let n = plane_normal.normalized();
        let d = -n.dot(plane_point);
        let ad = start.dot(n);
        let bd = end.dot(n);
        let t = (-d - ad) / (bd - ad);
        start + (end - start) * t
    }

    /// Signed distance from `point` to the plane; `>= 0` is the normal's side
    pub fn shortest_distance_to_plane(point: Vec3, normal: Vec3, plane_point: Vec3) -> f32 {
        normal.dot(point) - normal.dot(plane_point)
    }
}

impl std::fmt::Display for Vec3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, s: f32) -> Vec3 {
        Vec3::new(self.x * s, self.y * s, self.z * s)
    }
}

impl Div<f32> for Vec3 {
    type Output = Vec3;
    fn div(self, s: f32) -> Vec3 {
        Vec3::new(self.x / s, self.y / s, self.z / s)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, other: Vec3) {
        self.x += other.x;
        self.y += other.y;
        self.z += other.z;
    }
}

impl SubAssign for Vec3 {
    fn sub_assign(&mut self, other: Vec3) {
        self.x -= other.x;
        self.y -= other.y;
        self.z -= other.z;
    }
}

impl MulAssign<f32> for Vec3 {
    fn mul_assign(&mut self, s: f32) {
        self.x *= s;
        self.y *= s;
        self.z *= s;
    }
}

/// Used for the perspective divide: x, y and z are divided, `w` is kept
impl DivAssign<f32> for Vec3 {
    fn div_assign(&mut self, s: f32) {
        self.x /= s;
        self.y /= s;
        self.z /= s;
    }
}

/// `v * M` - transform a homogeneous vector by a matrix
impl Mul<Mat4> for Vec3 {
    type Output = Vec3;
    fn mul(self, m: Mat4) -> Vec3 {
        m.transform(self)
    }
}

/// 4x4 row-major matrix, identity by default
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4 {
    pub m: [[f32; 4]; 4],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4::diagonal(1.0, 1.0, 1.0, 1.0);

    pub const fn diagonal(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self {
            m: [
                [x, 0.0, 0.0, 0.0],
                [0.0, y, 0.0, 0.0],
                [0.0, 0.0, z, 0.0],
                [0.0, 0.0, 0.0, w],
            ],
        }
    }

    /// Transform `v` as a row vector (`v * self`).
    ///
    /// Points need `w = 1`; the perspective divide is up to the caller.
    pub fn transform(&self, v: Vec3) -> Vec3 {
        let m = &self.m;
        Vec3 {
            x: v.x * m[0][0] + v.y * m[1][0] + v.z * m[2][0] + v.w * m[3][0],
            y: v.x * m[0][1] + v.y * m[1][1] + v.z * m[2][1] + v.w * m[3][1],
            z: v.x * m[0][2] + v.y * m[1][2] + v.z * m[2][2] + v.w * m[3][2],
            w: v.x * m[0][3] + v.y * m[1][3] + v.z * m[2][3] + v.w * m[3][3],
        }
    }

    /// Matrix product `a * b`
    pub fn multiply(a: &Mat4, b: &Mat4) -> Mat4 {
        let mut out = Mat4::diagonal(0.0, 0.0, 0.0, 0.0);
        for c in 0..4 {
            for r in 0..4 {
                out.m[r][c] = a.m[r][0] * b.m[0][c]
                    + a.m[r][1] * b.m[1][c]
                    + a.m[r][2] * b.m[2][c]
                    + a.m[r][3] * b.m[3][c];
            }
        }
        out
    }

    /// Rotation about X.
    ///
    /// The angle is wrapped with `% 360` and then fed straight to sin/cos,
    /// so callers effectively pass radians that wrap at 360.
    pub fn rotate_x(angle: f32) -> Mat4 {
        let (s, c) = (angle % 360.0).sin_cos();
        let mut r = Mat4::IDENTITY;
        r.m[1][1] = c;
        r.m[1][2] = s;
        r.m[2][1] = -s;
        r.m[2][2] = c;
        r
    }

    /// Rotation about Y, same angle convention as `rotate_x`
    pub fn rotate_y(angle: f32) -> Mat4 {
        let (s, c) = (angle % 360.0).sin_cos();
        let mut r = Mat4::IDENTITY;
        r.m[0][0] = c;
        r.m[2][0] = s;
        r.m[0][2] = -s;
        r.m[2][2] = c;
        r
    }

    /// Rotation about Z, same angle convention as `rotate_x`
    pub fn rotate_z(angle: f32) -> Mat4 {
        let (s, c) = (angle % 360.0).sin_cos();
        let mut r = Mat4::IDENTITY;
        r.m[0][0] = c;
        r.m[0][1] = s;
        r.m[1][0] = -s;
        r.m[1][1] = c;
        r
    }

    /// Translation lives in the bottom row
    pub fn translate(x: f32, y: f32, z: f32) -> Mat4 {
        let mut t = Mat4::IDENTITY;
        t.m[3][0] = x;
        t.m[3][1] = y;
        t.m[3][2] = z;
        t
    }

    pub fn translate_vec(v: Vec3) -> Mat4 {
        Mat4::translate(v.x, v.y, v.z)
    }

    pub fn scale(x: f32, y: f32, z: f32) -> Mat4 {
        Mat4::diagonal(x, y, z, 1.0)
    }

    pub fn scale_uniform(s: f32) -> Mat4 {
        Mat4::diagonal(s, s, s, 1.0)
    }

    pub fn scale_vec(v: Vec3) -> Mat4 {
        Mat4::diagonal(v.x, v.y, v.z, 1.0)
    }

    /// Perspective projection.
    ///
    /// `aspect` is height over width. The result copies view-space z into
    /// `w`, ready for the perspective divide.
    pub fn projection(near: f32, far: f32, fov_degrees: f32, width: f32, height: f32) -> Mat4 {
        let aspect = height / width;
        let fov_rad = 1.0 / (fov_degrees * 0.5).to_radians().tan();
        let mut p = Mat4::IDENTITY;
        p.m[0][0] = aspect * fov_rad;
        p.m[1][1] = fov_rad;
        p.m[2][2] = far / (far - near);
        p.m[3][2] = (-far * near) / (far - near);
        p.m[2][3] = 1.0;
        p.m[3][3] = 0.0;
        p
    }

    /// Camera-to-world matrix looking from `position` toward `target`
    pub fn point_at(position: Vec3, target: Vec3, up: Vec3) -> Mat4 {
        let forward = (target - position).normalized();

        // Gram-Schmidt: strip the forward component out of `up`
        let new_up = (up - forward * up.dot(forward)).normalized();
        let right = new_up.cross(forward);

        Mat4 {
            m: [
                [right.x, right.y, right.z, 0.0],
                [new_up.x, new_up.y, new_up.z, 0.0],
                [forward.x, forward.y, forward.z, 0.0],
                [position.x, position.y, position.z, 1.0],
            ],
        }
    }

    /// Inverse of a rotation + translation matrix.
    ///
    /// Precondition: `self` has no scale or projection component. Anything
    /// else gives a wrong result; this is not checked.
    pub fn quick_inverse(&self) -> Mat4 {
        let m = &self.m;
        let mut inv = Mat4::IDENTITY;
        for r in 0..3 {
            for c in 0..3 {
                inv.m[r][c] = m[c][r];
            }
        }
        for c in 0..3 {
            inv.m[3][c] = -(m[3][0] * inv.m[0][c] + m[3][1] * inv.m[1][c] + m[3][2] * inv.m[2][c]);
        }
        inv
    }
}

impl Mul for Mat4 {
    type Output = Mat4;
    fn mul(self, other: Mat4) -> Mat4 {
        Mat4::multiply(&self, &other)
    }
}

impl MulAssign for Mat4 {
    fn mul_assign(&mut self, other: Mat4) {
        *self = Mat4::multiply(self, &other);
    }
}
