//! Framebuffer and the screen-space raster pass
//! Screen-edge clipping, bounding-box fill, Bresenham wireframe

use std::collections::TryReserveError;
use std::path::Path;

use image::RgbaImage;

use super::math::Vec3;
use super::types::{point_in_rounded, Color, Triangle};

/// Depth buffer clear value
pub const DEPTH_CLEAR: f32 = 1000.0;

/// Error type for framebuffer setup and export
#[derive(Debug)]
pub enum FramebufferError {
    ZeroSize,
    /// `width * height` does not fit in `usize`
    TooLarge { width: usize, height: usize },
    Alloc(TryReserveError),
    Image(image::ImageError),
}

impl From<TryReserveError> for FramebufferError {
    fn from(e: TryReserveError) -> Self {
        FramebufferError::Alloc(e)
    }
}

impl From<image::ImageError> for FramebufferError {
    fn from(e: image::ImageError) -> Self {
        FramebufferError::Image(e)
    }
}

impl std::fmt::Display for FramebufferError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FramebufferError::ZeroSize => write!(f, "Framebuffer must be at least 1x1"),
            FramebufferError::TooLarge { width, height } => {
                write!(f, "Framebuffer {}x{} is too large", width, height)
            }
            FramebufferError::Alloc(e) => write!(f, "Framebuffer allocation failed: {}", e),
            FramebufferError::Image(e) => write!(f, "Image error: {}", e),
        }
    }
}

impl std::error::Error for FramebufferError {}

/// Framebuffer for software rendering
pub struct Framebuffer {
    pub pixels: Vec<u32>,   // Packed 0x00RRGGBB
    pub zbuffer: Vec<f32>,  // Cleared every frame, never tested against
    pub width: usize,
    pub height: usize,
}

impl Framebuffer {
    /// Allocate color and depth buffers.
    ///
    /// This is the one fatal failure in the renderer: zero dimensions, a
    /// pixel count that overflows, or an allocation that cannot be satisfied.
    pub fn new(width: usize, height: usize) -> Result<Self, FramebufferError> {
        if width == 0 || height == 0 {
            return Err(FramebufferError::ZeroSize);
        }
        let len = width
            .checked_mul(height)
            .ok_or(FramebufferError::TooLarge { width, height })?;

        let mut pixels = Vec::new();
        pixels.try_reserve_exact(len)?;
        pixels.resize(len, Color::BLACK.to_u32());

        let mut zbuffer = Vec::new();
        zbuffer.try_reserve_exact(len)?;
        zbuffer.resize(len, DEPTH_CLEAR);

        Ok(Self { pixels, zbuffer, width, height })
    }

    pub fn clear(&mut self, color: Color) {
        self.pixels.fill(color.to_u32());
        self.zbuffer.fill(DEPTH_CLEAR);
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, color: Color) {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = color.to_u32();
        }
    }

    pub fn get_pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x < self.width && y < self.height {
            Some(Color::from_u32(self.pixels[y * self.width + x]))
        } else {
            None
        }
    }

    /// Draw a line from (x0, y0) to (x1, y1) using Bresenham's algorithm
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let mut x = x0;
        let mut y = y0;

        loop {
            if x >= 0 && y >= 0 {
                self.set_pixel(x as usize, y as usize, color);
            }

            if x == x1 && y == y1 {
                break;
            }

            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 < dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Fill a screen-space triangle with its flat color.
    ///
    /// Scans the clamped bounding box (max edge exclusive) and writes every
    /// pixel that passes the equal-areas test. Later fills overwrite
    /// earlier ones.
    pub fn fill_triangle(&mut self, tri: &Triangle) {
        let bbox = tri.bbox(self.width as i32 - 1, self.height as i32 - 1);
        let rounded = tri.rounded_xy();
        let color = tri.color.to_u32();

        for y in bbox.min_y..bbox.max_y {
            let row = y as usize * self.width;
            for x in bbox.min_x..bbox.max_x {
                if point_in_rounded(&rounded, x, y) {
                    self.pixels[row + x as usize] = color;
                }
            }
        }
    }

    /// Outline a triangle, vertices clamped onto the frame
    pub fn draw_wireframe(&mut self, tri: &Triangle, color: Color) {
        let max_x = (self.width - 1) as f32;
        let max_y = (self.height - 1) as f32;
        let [a, b, c] = tri.p.map(|v| (v.x.clamp(0.0, max_x) as i32, v.y.clamp(0.0, max_y) as i32));

        self.draw_line(a.0, a.1, b.0, b.1, color);
        self.draw_line(a.0, a.1, c.0, c.1, color);
        self.draw_line(b.0, b.1, c.0, c.1, color);
    }

    /// Copy into an RGBA image for display or export
    pub fn to_image(&self) -> RgbaImage {
        let mut raw = Vec::with_capacity(self.pixels.len() * 4);
        for &p in &self.pixels {
            raw.extend_from_slice(&Color::from_u32(p).to_rgba());
        }
        // Length always matches width * height * 4
        RgbaImage::from_raw(self.width as u32, self.height as u32, raw)
            .unwrap_or_else(|| RgbaImage::new(self.width as u32, self.height as u32))
    }

    /// Write the current frame as a PNG
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<(), FramebufferError> {
        self.to_image().save_with_format(path.as_ref(), image::ImageFormat::Png)?;
        log::info!("Saved frame to {}", path.as_ref().display());
        Ok(())
    }
}

/// The four screen edges as (point, inward normal), in clipping order:
/// top, bottom, left, right
pub fn screen_edges(width: usize, height: usize) -> [(Vec3, Vec3); 4] {
    let right = (width - 1) as f32;
    let bottom = (height - 1) as f32;
    [
        (Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)),
        (Vec3::new(0.0, bottom, 0.0), Vec3::new(0.0, -1.0, 0.0)),
        (Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)),
        (Vec3::new(right, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0)),
    ]
}

/// Clip every triangle against all four screen edges.
///
/// Each edge drains the whole list before the next one starts, and the
/// relative order of the survivors is kept, so depth order survives too.
pub fn clip_to_screen(tris: &mut Vec<Triangle>, width: usize, height: usize) {
    for (point, normal) in screen_edges(width, height) {
        let pending = std::mem::take(tris);
        for tri in pending {
            tris.extend(tri.clip_against_plane(point, normal));
        }
    }
}

/// Clip, then fill and/or outline each triangle in list order
pub fn draw_triangles(
    fb: &mut Framebuffer,
    tris: &mut Vec<Triangle>,
    fill: bool,
    wireframe: Option<Color>,
) {
    if tris.is_empty() {
        return;
    }

    clip_to_screen(tris, fb.width, fb.height);

    for tri in tris.iter() {
        if fill {
            fb.fill_triangle(tri);
        }
        if let Some(color) = wireframe {
            fb.draw_wireframe(tri, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen_tri(a: (f32, f32), b: (f32, f32), c: (f32, f32), color: Color) -> Triangle {
        Triangle::new(Vec3::new(a.0, a.1, 0.0), Vec3::new(b.0, b.1, 0.0), Vec3::new(c.0, c.1, 0.0))
            .with_color(color)
    }

    fn count(fb: &Framebuffer, color: Color) -> usize {
        fb.pixels.iter().filter(|&&p| p == color.to_u32()).count()
    }

    #[test]
    fn test_zero_size_is_an_error() {
        assert!(matches!(Framebuffer::new(0, 10), Err(FramebufferError::ZeroSize)));
        assert!(matches!(Framebuffer::new(10, 0), Err(FramebufferError::ZeroSize)));
    }

    #[test]
    fn test_oversized_frame_is_an_error() {
        assert!(matches!(
            Framebuffer::new(usize::MAX / 2, 4),
            Err(FramebufferError::TooLarge { height: 4, .. })
        ));
        assert!(matches!(
            Framebuffer::new(usize::MAX, usize::MAX),
            Err(FramebufferError::TooLarge { .. })
        ));
        // fits in usize but not in memory
        assert!(matches!(Framebuffer::new(usize::MAX / 8, 2), Err(FramebufferError::Alloc(_))));
    }

    #[test]
    fn test_clear_resets_both_buffers() {
        let mut fb = Framebuffer::new(4, 3).unwrap();
        fb.set_pixel(1, 1, Color::RED);
        fb.zbuffer[0] = 1.0;
        fb.clear(Color::BLACK);
        assert_eq!(count(&fb, Color::BLACK), 12);
        assert!(fb.zbuffer.iter().all(|&z| z == DEPTH_CLEAR));
    }

    #[test]
    fn test_fill_triangle_inside_pixels() {
        let mut fb = Framebuffer::new(32, 32).unwrap();
        fb.fill_triangle(&screen_tri((2.0, 2.0), (20.0, 2.0), (2.0, 20.0), Color::GREEN));
        assert_eq!(fb.get_pixel(5, 5), Some(Color::GREEN));
        assert_eq!(fb.get_pixel(2, 2), Some(Color::GREEN));
        assert_eq!(fb.get_pixel(18, 18), Some(Color::BLACK));
        assert_eq!(fb.get_pixel(25, 3), Some(Color::BLACK));
    }

    #[test]
    fn test_later_fill_overwrites() {
        let mut fb = Framebuffer::new(32, 32).unwrap();
        let mut tris = vec![
            screen_tri((0.0, 0.0), (30.0, 0.0), (0.0, 30.0), Color::RED),
            screen_tri((0.0, 0.0), (20.0, 0.0), (0.0, 20.0), Color::BLUE),
        ];
        draw_triangles(&mut fb, &mut tris, true, None);
        assert_eq!(fb.get_pixel(3, 3), Some(Color::BLUE));
        assert_eq!(fb.get_pixel(15, 12), Some(Color::RED));
    }

    #[test]
    fn test_clip_to_screen_keeps_onscreen_and_order() {
        let a = screen_tri((1.0, 1.0), (5.0, 1.0), (1.0, 5.0), Color::RED);
        let b = screen_tri((10.0, 10.0), (14.0, 10.0), (10.0, 14.0), Color::BLUE);
        let mut tris = vec![a, b];
        clip_to_screen(&mut tris, 32, 32);
        assert_eq!(tris, vec![a, b]);
    }

    #[test]
    fn test_clip_to_screen_trims_offscreen_parts() {
        let mut tris = vec![
            screen_tri((-10.0, -10.0), (50.0, 5.0), (5.0, 50.0), Color::RED),
            screen_tri((-40.0, -40.0), (-30.0, -40.0), (-40.0, -30.0), Color::BLUE),
        ];
        clip_to_screen(&mut tris, 32, 24);
        assert!(!tris.is_empty());
        assert!(tris.iter().all(|t| t.color == Color::RED));
        for t in &tris {
            for v in t.p {
                assert!(v.x >= -1e-3 && v.x <= 31.0 + 1e-3);
                assert!(v.y >= -1e-3 && v.y <= 23.0 + 1e-3);
            }
        }
    }

    #[test]
    fn test_offscreen_triangle_draws_nothing() {
        let mut fb = Framebuffer::new(16, 16).unwrap();
        let mut tris = vec![screen_tri((-40.0, -40.0), (-30.0, -40.0), (-40.0, -30.0), Color::RED)];
        draw_triangles(&mut fb, &mut tris, true, Some(Color::WHITE));
        assert_eq!(count(&fb, Color::BLACK), 256);
    }

    #[test]
    fn test_draw_line_endpoints() {
        let mut fb = Framebuffer::new(16, 16).unwrap();
        fb.draw_line(1, 2, 12, 7, Color::WHITE);
        assert_eq!(fb.get_pixel(1, 2), Some(Color::WHITE));
        assert_eq!(fb.get_pixel(12, 7), Some(Color::WHITE));
        // one pixel per column for a shallow line
        assert_eq!(count(&fb, Color::WHITE), 12);
    }

    #[test]
    fn test_draw_line_tie_keeps_row() {
        // error term ties on the second step: x advances, y does not
        let mut fb = Framebuffer::new(4, 4).unwrap();
        fb.draw_line(0, 0, 2, 1, Color::WHITE);
        assert_eq!(fb.get_pixel(1, 0), Some(Color::WHITE));
        assert_eq!(fb.get_pixel(1, 1), Some(Color::BLACK));
        assert_eq!(fb.get_pixel(2, 1), Some(Color::WHITE));
        assert_eq!(count(&fb, Color::WHITE), 3);
    }

    #[test]
    fn test_wireframe_clamps_to_frame() {
        let mut fb = Framebuffer::new(16, 16).unwrap();
        fb.draw_wireframe(&screen_tri((-5.0, -5.0), (40.0, 0.0), (0.0, 40.0), Color::RED), Color::WHITE);
        assert_eq!(fb.get_pixel(0, 0), Some(Color::WHITE));
        assert_eq!(fb.get_pixel(15, 0), Some(Color::WHITE));
        assert_eq!(fb.get_pixel(0, 15), Some(Color::WHITE));
    }

    #[test]
    fn test_to_image_matches_pixels() {
        let mut fb = Framebuffer::new(3, 2).unwrap();
        fb.set_pixel(2, 1, Color::new(10, 20, 30));
        let img = fb.to_image();
        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(img.get_pixel(2, 1).0, [10, 20, 30, 255]);
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0, 255]);
    }

    #[test]
    fn test_save_png_writes_file() {
        let fb = Framebuffer::new(4, 4).unwrap();
        let path = std::env::temp_dir().join(format!("trirast_frame_{}.png", std::process::id()));
        fb.save_png(&path).unwrap();
        assert!(path.exists());
        let _ = std::fs::remove_file(path);
    }
}
