//! Core types for the rasterizer

use super::math::Vec3;
use serde::{Serialize, Deserialize};

/// RGB color (0-255 per channel)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255 };
    pub const RED: Color = Color { r: 255, g: 0, b: 0 };
    pub const GREEN: Color = Color { r: 0, g: 255, b: 0 };
    pub const BLUE: Color = Color { r: 0, g: 0, b: 255 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Scale each channel by `factor`, truncating and clamping to 0-255
    pub fn scale(self, factor: f32) -> Self {
        let channel = |c: u8| (c as f32 * factor).clamp(0.0, 255.0) as u8;
        Self {
            r: channel(self.r),
            g: channel(self.g),
            b: channel(self.b),
        }
    }

    /// Packed 0x00RRGGBB
    pub fn to_u32(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | (self.b as u32)
    }

    pub fn from_u32(packed: u32) -> Self {
        Self {
            r: (packed >> 16) as u8,
            g: (packed >> 8) as u8,
            b: packed as u8,
        }
    }

    /// Opaque RGBA bytes for image output
    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }
}

/// Integer screen-space bounds, inclusive min and exclusive-in-use max
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BBox {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

/// Result of clipping one triangle against a plane
#[derive(Debug, Clone, PartialEq)]
pub enum Clipped {
    /// Every vertex was outside
    Culled,
    /// Every vertex was inside; this is the input triangle itself
    Whole(Triangle),
    /// One vertex inside: a smaller triangle
    One(Triangle),
    /// Two vertices inside: the clipped quad as two triangles
    Two(Triangle, Triangle),
}

impl Clipped {
    pub fn len(&self) -> usize {
        match self {
            Clipped::Culled => 0,
            Clipped::Whole(_) | Clipped::One(_) => 1,
            Clipped::Two(..) => 2,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl IntoIterator for Clipped {
    type Item = Triangle;
    type IntoIter = std::iter::Flatten<std::array::IntoIter<Option<Triangle>, 2>>;

    fn into_iter(self) -> Self::IntoIter {
        let pair = match self {
            Clipped::Culled => [None, None],
            Clipped::Whole(t) | Clipped::One(t) => [Some(t), None],
            Clipped::Two(a, b) => [Some(a), Some(b)],
        };
        pair.into_iter().flatten()
    }
}

/// Three vertices and a flat fill color
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub p: [Vec3; 3],
    pub color: Color,
}

impl Default for Triangle {
    fn default() -> Self {
        Self {
            p: [Vec3::ZERO; 3],
            color: Color::RED,
        }
    }
}

/// Unsigned area of the triangle (x1,y1) (x2,y2) (x3,y3)
fn area(x1: f32, y1: f32, x2: f32, y2: f32, x3: f32, y3: f32) -> f32 {
    ((x1 * (y2 - y3) + x2 * (y3 - y1) + x3 * (y1 - y2)) / 2.0).abs()
}

/// Round half up, so -0.5 goes to 0 rather than -1
fn round_half_up(v: f32) -> f32 {
    (v + 0.5).floor()
}

impl Triangle {
    /// New red triangle
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self {
            p: [a, b, c],
            color: Color::RED,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Mean of the three vertex depths
    pub fn mean_z(&self) -> f32 {
        (self.p[0].z + self.p[1].z + self.p[2].z) / 3.0
    }

    /// Face normal from the winding `p0 -> p1 -> p2`, unit length or zero
    pub fn normal(&self) -> Vec3 {
        let line1 = self.p[1] - self.p[0];
        let line2 = self.p[2] - self.p[0];
        line1.cross(line2).normalized()
    }

    /// Copy with every vertex run through `f`
    pub fn map_points(&self, f: impl Fn(Vec3) -> Vec3) -> Triangle {
        Triangle {
            p: [f(self.p[0]), f(self.p[1]), f(self.p[2])],
            color: self.color,
        }
    }

    /// Screen-space vertices rounded once to whole pixels
    pub fn rounded_xy(&self) -> [(f32, f32); 3] {
        self.p.map(|v| (round_half_up(v.x), round_half_up(v.y)))
    }

    /// Equal-areas test: (x, y) is inside when the three sub-triangles it
    /// forms add up to the whole. Points on an edge count as inside.
    pub fn point_in_triangle(&self, x: i32, y: i32) -> bool {
        point_in_rounded(&self.rounded_xy(), x, y)
    }

    /// Integer bounding box clamped to `[0, max_x] x [0, max_y]`
    pub fn bbox(&self, max_x: i32, max_y: i32) -> BBox {
        let xs = self.p.map(|v| v.x);
        let ys = self.p.map(|v| v.y);
        let lo = |vals: [f32; 3]| vals.iter().map(|v| v.floor()).fold(f32::INFINITY, f32::min);
        let hi = |vals: [f32; 3]| vals.iter().map(|v| v.ceil()).fold(f32::NEG_INFINITY, f32::max);

        // `as` saturates and maps NaN to 0, the clamp does the rest
        BBox {
            min_x: (lo(xs) as i32).clamp(0, max_x),
            min_y: (lo(ys) as i32).clamp(0, max_y),
            max_x: (hi(xs) as i32).clamp(0, max_x),
            max_y: (hi(ys) as i32).clamp(0, max_y),
        }
    }

    /// Clip against the plane through `plane_point` with normal `plane_normal`.
    ///
    /// Vertices with signed distance `>= 0` are inside. Fully inside hands
    /// back `self` untouched; partial cases build new triangles that keep
    /// the source color.
    pub fn clip_against_plane(self, plane_point: Vec3, plane_normal: Vec3) -> Clipped {
        let n = plane_normal.normalized();

        let mut inside = [Vec3::ZERO; 3];
        let mut outside = [Vec3::ZERO; 3];
        let (mut ni, mut no) = (0, 0);

        for v in self.p {
            if Vec3::shortest_distance_to_plane(v, n, plane_point) >= 0.0 {
                inside[ni] = v;
                ni += 1;
            } else {
                outside[no] = v;
                no += 1;
            }
        }

        match ni {
            0 => Clipped::Culled,
            3 => Clipped::Whole(self),
            1 => {
                let a = Vec3::intersect_plane(plane_point, n, inside[0], outside[0]);
                let b = Vec3::intersect_plane(plane_point, n, inside[0], outside[1]);
                Clipped::One(Triangle::new(inside[0], a, b).with_color(self.color))
            }
            _ => {
                let a = Vec3::intersect_plane(plane_point, n, inside[0], outside[0]);
                let b = Vec3::intersect_plane(plane_point, n, inside[1], outside[0]);
                Clipped::Two(
                    Triangle::new(inside[0], inside[1], a).with_color(self.color),
                    Triangle::new(inside[1], a, b).with_color(self.color),
                )
            }
        }
    }
}

/// Equal-areas test against pre-rounded vertices
pub(crate) fn point_in_rounded(r: &[(f32, f32); 3], x: i32, y: i32) -> bool {
    let (px, py) = (x as f32, y as f32);
    let [(x1, y1), (x2, y2), (x3, y3)] = *r;

    let whole = area(x1, y1, x2, y2, x3, y3);
    let a1 = area(px, py, x2, y2, x3, y3);
    let a2 = area(x1, y1, px, py, x3, y3);
    let a3 = area(x1, y1, x2, y2, px, py);

    whole == a1 + a2 + a3
}

/// An ordered list of triangles, fixed once loaded
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub tris: Vec<Triangle>,
}

impl Mesh {
    pub fn new(tris: Vec<Triangle>) -> Self {
        Self { tris }
    }

    pub fn len(&self) -> usize {
        self.tris.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tris.is_empty()
    }
}
