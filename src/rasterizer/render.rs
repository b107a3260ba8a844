//! Framebuffer and triangle rasterization
//!
//! Filled and textured triangles share one scanline walker: vertices are
//! snapped to integer pixels, sorted by Y, and split into a flat-bottom top
//! half and a flat-top bottom half. Each covered pixel is weighted with
//! barycentric coordinates and depth tested against `1 - 1/w`.

use super::math::{barycentric_weights, Vec2, Vec4};
use super::types::{Color, RenderSettings, Texture, Triangle};

/// Size of the vertex markers drawn in vertex mode
pub const VERTEX_MARKER_SIZE: i32 = 6;
/// Spacing of the background grid dots
pub const GRID_SPACING: usize = 10;

/// Color and depth buffers for software rendering
pub struct Framebuffer {
    pub pixels: Vec<u32>,   // packed ARGB
    pub zbuffer: Vec<f32>,  // 1.0 = far, lower is closer
    pub width: usize,
    pub height: usize,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: vec![Color::BLACK.to_argb(); width * height],
            zbuffer: vec![1.0; width * height],
            width,
            height,
        }
    }

    /// Reset both buffers for a new frame
    pub fn clear(&mut self, color: Color) {
        self.pixels.fill(color.to_argb());
        self.zbuffer.fill(1.0);
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            Some(y as usize * self.width + x as usize)
        } else {
            None
        }
    }

    /// Write a pixel; out-of-bounds writes are ignored
    pub fn set_pixel(&mut self, x: i32, y: i32, color: u32) {
        if let Some(idx) = self.index(x, y) {
            self.pixels[idx] = color;
        }
    }

    #[cfg(test)]
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<u32> {
        self.index(x, y).map(|idx| self.pixels[idx])
    }

    /// Stored depth, or 1.0 (far) outside the buffer
    pub fn depth_at(&self, x: i32, y: i32) -> f32 {
        self.index(x, y).map_or(1.0, |idx| self.zbuffer[idx])
    }

    /// Write color and depth only if `depth` is closer than the stored value
    pub fn set_pixel_with_depth(&mut self, x: i32, y: i32, depth: f32, color: u32) -> bool {
        if let Some(idx) = self.index(x, y) {
            if depth < self.zbuffer[idx] {
                self.zbuffer[idx] = depth;
                self.pixels[idx] = color;
                return true;
            }
        }
        false
    }

    /// Fill an axis-aligned rectangle with its top-left corner at (x, y)
    pub fn draw_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: u32) {
        for j in y..y + height {
            for i in x..x + width {
                self.set_pixel(i, j, color);
            }
        }
    }

    /// Dotted background grid
    pub fn draw_grid(&mut self, color: Color) {
        let packed = color.to_argb();
        for y in (0..self.height).step_by(GRID_SPACING) {
            for x in (0..self.width).step_by(GRID_SPACING) {
                self.pixels[y * self.width + x] = packed;
            }
        }
    }

    /// Draw a line from (x0, y0) to (x1, y1) using Bresenham's algorithm
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: u32) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let mut x = x0;
        let mut y = y0;

        loop {
            self.set_pixel(x, y, color);

            if x == x1 && y == y1 {
                break;
            }

            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Color buffer as RGBA bytes for presentation
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|&p| Color::from_argb(p).to_bytes())
            .collect()
    }
}

/// Outline of a projected triangle, not depth tested
pub fn draw_wireframe(fb: &mut Framebuffer, points: &[Vec4; 3], color: u32) {
    for i in 0..3 {
        let a = points[i];
        let b = points[(i + 1) % 3];
        fb.draw_line(a.x as i32, a.y as i32, b.x as i32, b.y as i32, color);
    }
}

/// Square markers on each projected vertex
pub fn draw_vertex_markers(fb: &mut Framebuffer, points: &[Vec4; 3], color: u32) {
    for p in points {
        fb.draw_rect(p.x as i32, p.y as i32, VERTEX_MARKER_SIZE, VERTEX_MARKER_SIZE, color);
    }
}

/// Vertex snapped to the pixel grid, with the attributes interpolated per pixel
#[derive(Debug, Clone, Copy)]
struct ScreenVertex {
    x: i32,
    y: i32,
    point: Vec4,
    uv: Vec2,
}

impl ScreenVertex {
    fn new(p: Vec4, uv: Vec2) -> Self {
        let x = p.x as i32;
        let y = p.y as i32;
        Self {
            x,
            y,
            point: Vec4::new(x as f32, y as f32, p.z, p.w),
            uv,
        }
    }

    fn xy(&self) -> Vec2 {
        Vec2::from(self.point)
    }
}

/// Sort by ascending Y and visit every pixel span of both triangle halves.
///
/// Calls `plot(x, y, sorted)` for `x` in `[x_start, x_end)` on each scanline.
/// Returns without plotting when the snapped triangle has zero area.
fn scanline_triangle<F>(mut v: [ScreenVertex; 3], mut plot: F)
where
    F: FnMut(i32, i32, &[ScreenVertex; 3]),
{
    if v[0].y > v[1].y {
        v.swap(0, 1);
    }
    if v[1].y > v[2].y {
        v.swap(1, 2);
    }
    if v[0].y > v[1].y {
        v.swap(0, 1);
    }

    let area = (v[2].xy() - v[0].xy()).cross(v[1].xy() - v[0].xy());
    if area.abs() < f32::EPSILON {
        return;
    }

    let (x0, y0) = (v[0].x, v[0].y);
    let (x1, y1) = (v[1].x, v[1].y);
    let (x2, y2) = (v[2].x, v[2].y);

    let mut span = |y: i32, x_start: i32, x_end: i32, v: &[ScreenVertex; 3]| {
        let (x_start, x_end) = if x_start > x_end { (x_end, x_start) } else { (x_start, x_end) };
        for x in x_start..x_end {
            plot(x, y, v);
        }
    };

    // flat-bottom top half
    if y1 != y0 {
        let inv_slope_1 = (x1 - x0) as f32 / (y1 - y0).abs() as f32;
        let inv_slope_2 = if y2 != y0 { (x2 - x0) as f32 / (y2 - y0).abs() as f32 } else { 0.0 };
        for y in y0..=y1 {
            let x_start = (x1 as f32 + (y - y1) as f32 * inv_slope_1) as i32;
            let x_end = (x0 as f32 + (y - y0) as f32 * inv_slope_2) as i32;
            span(y, x_start, x_end, &v);
        }
    }

    // flat-top bottom half
    if y2 != y1 {
        let inv_slope_1 = (x2 - x1) as f32 / (y2 - y1).abs() as f32;
        let inv_slope_2 = if y2 != y0 { (x2 - x0) as f32 / (y2 - y0).abs() as f32 } else { 0.0 };
        for y in y1..=y2 {
            let x_start = (x1 as f32 + (y - y1) as f32 * inv_slope_1) as i32;
            let x_end = (x0 as f32 + (y - y0) as f32 * inv_slope_2) as i32;
            span(y, x_start, x_end, &v);
        }
    }
}

/// Interpolated `1/w` at a pixel
fn interpolate_inv_w(v: &[ScreenVertex; 3], weights: (f32, f32, f32)) -> f32 {
    let (alpha, beta, gamma) = weights;
    alpha / v[0].point.w + beta / v[1].point.w + gamma / v[2].point.w
}

fn pixel_weights(x: i32, y: i32, v: &[ScreenVertex; 3]) -> Option<(f32, f32, f32)> {
    let p = Vec2::new(x as f32, y as f32);
    barycentric_weights(v[0].xy(), v[1].xy(), v[2].xy(), p).map(|w| (w.x, w.y, w.z))
}

/// Depth-tested solid fill
pub fn draw_filled_triangle(fb: &mut Framebuffer, points: &[Vec4; 3], color: u32) {
    let vertices = [
        ScreenVertex::new(points[0], Vec2::default()),
        ScreenVertex::new(points[1], Vec2::default()),
        ScreenVertex::new(points[2], Vec2::default()),
    ];

    scanline_triangle(vertices, |x, y, v| {
        let Some(weights) = pixel_weights(x, y, v) else {
            return;
        };
        let depth = 1.0 - interpolate_inv_w(v, weights);
        fb.set_pixel_with_depth(x, y, depth, color);
    });
}

/// Depth-tested, perspective-correct texture mapping
pub fn draw_textured_triangle(
    fb: &mut Framebuffer,
    points: &[Vec4; 3],
    uvs: &[Vec2; 3],
    texture: &Texture,
) {
    // texture rows are stored top to bottom
    let flip = |uv: Vec2| Vec2::new(uv.x, 1.0 - uv.y);
    let vertices = [
        ScreenVertex::new(points[0], flip(uvs[0])),
        ScreenVertex::new(points[1], flip(uvs[1])),
        ScreenVertex::new(points[2], flip(uvs[2])),
    ];

    scanline_triangle(vertices, |x, y, v| {
        let Some(weights) = pixel_weights(x, y, v) else {
            return;
        };
        let (alpha, beta, gamma) = weights;

        let u = (v[0].uv.x / v[0].point.w) * alpha
            + (v[1].uv.x / v[1].point.w) * beta
            + (v[2].uv.x / v[2].point.w) * gamma;
        let t = (v[0].uv.y / v[0].point.w) * alpha
            + (v[1].uv.y / v[1].point.w) * beta
            + (v[2].uv.y / v[2].point.w) * gamma;
        let inv_w = interpolate_inv_w(v, weights);

        let depth = 1.0 - inv_w;
        if depth < fb.depth_at(x, y) {
            let texel = texture.sample(u / inv_w, t / inv_w);
            fb.set_pixel_with_depth(x, y, depth, texel);
        }
    });
}

/// Rasterize a triangle in every enabled mode.
///
/// Modes are drawn in the order fill, wireframe, vertex markers, texture, so
/// outlines and markers stay on top of the flat fill.
pub fn draw_triangle(fb: &mut Framebuffer, triangle: &Triangle, settings: &RenderSettings) {
    if settings.filled {
        draw_filled_triangle(fb, &triangle.points, triangle.color);
    }
    if settings.wireframe {
        draw_wireframe(fb, &triangle.points, Color::WHITE.to_argb());
    }
    if settings.vertices {
        draw_vertex_markers(fb, &triangle.points, Color::YELLOW.to_argb());
    }
    if settings.textured {
        if let Some(texture) = triangle.texture {
            draw_textured_triangle(fb, &triangle.points, &triangle.uvs, texture);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: u32 = 0xFFFF0000;
    const BLUE: u32 = 0xFF0000FF;
    const BG: u32 = 0xFF000000;

    fn tri(w: f32) -> [Vec4; 3] {
        [
            Vec4::new(10.0, 10.0, 0.0, w),
            Vec4::new(50.0, 10.0, 0.0, w),
            Vec4::new(10.0, 50.0, 0.0, w),
        ]
    }

    fn count(fb: &Framebuffer, color: u32) -> usize {
        fb.pixels.iter().filter(|&&p| p == color).count()
    }

    #[test]
    fn test_clear_resets_depth() {
        let mut fb = Framebuffer::new(4, 4);
        fb.set_pixel_with_depth(1, 1, 0.2, RED);
        fb.clear(Color::BLACK);
        assert!(fb.zbuffer.iter().all(|&z| z == 1.0));
        assert_eq!(count(&fb, BG), 16);
    }

    #[test]
    fn test_set_pixel_out_of_bounds_is_noop() {
        let mut fb = Framebuffer::new(4, 4);
        fb.set_pixel(-1, 0, RED);
        fb.set_pixel(4, 0, RED);
        fb.set_pixel(0, 4, RED);
        assert_eq!(count(&fb, RED), 0);
        assert_eq!(fb.depth_at(-3, 2), 1.0);
    }

    #[test]
    fn test_line_endpoints() {
        let mut fb = Framebuffer::new(20, 20);
        fb.draw_line(2, 3, 15, 9, RED);
        assert_eq!(fb.get_pixel(2, 3), Some(RED));
        assert_eq!(fb.get_pixel(15, 9), Some(RED));
        // dominant axis is X: one pixel per column
        assert_eq!(count(&fb, RED), 14);
    }

    #[test]
    fn test_filled_triangle_writes_depth() {
        let mut fb = Framebuffer::new(64, 64);
        draw_filled_triangle(&mut fb, &tri(2.0), RED);
        assert_eq!(fb.get_pixel(15, 15), Some(RED));
        assert!((fb.depth_at(15, 15) - 0.5).abs() < 1e-4);
        // outside the hypotenuse
        assert_eq!(fb.get_pixel(45, 45), Some(BG));
    }

    #[test]
    fn test_near_overwrites_far() {
        let mut fb = Framebuffer::new(64, 64);
        draw_filled_triangle(&mut fb, &tri(10.0), BLUE);
        draw_filled_triangle(&mut fb, &tri(2.0), RED);
        assert_eq!(fb.get_pixel(15, 15), Some(RED));
        assert_eq!(count(&fb, BLUE), 0);
    }

    #[test]
    fn test_far_does_not_overwrite_near() {
        let mut fb = Framebuffer::new(64, 64);
        draw_filled_triangle(&mut fb, &tri(2.0), RED);
        let drawn = count(&fb, RED);
        draw_filled_triangle(&mut fb, &tri(10.0), BLUE);
        assert_eq!(count(&fb, RED), drawn);
        assert_eq!(count(&fb, BLUE), 0);
    }

    #[test]
    fn test_degenerate_triangle_draws_nothing() {
        let mut fb = Framebuffer::new(64, 64);
        let points = [
            Vec4::new(10.0, 10.0, 0.0, 2.0),
            Vec4::new(20.0, 20.0, 0.0, 2.0),
            Vec4::new(30.0, 30.0, 0.0, 2.0),
        ];
        draw_filled_triangle(&mut fb, &points, RED);
        assert_eq!(count(&fb, RED), 0);
        assert!(fb.zbuffer.iter().all(|z| z.is_finite()));
    }

    #[test]
    fn test_textured_triangle_samples_texture() {
        let mut fb = Framebuffer::new(64, 64);
        let texture = Texture::from_argb(1, 1, vec![0xFF00FF00], String::new()).unwrap();
        let uvs = [Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)];
        draw_textured_triangle(&mut fb, &tri(3.0), &uvs, &texture);
        assert_eq!(fb.get_pixel(15, 15), Some(0xFF00FF00));
        assert!(fb.depth_at(15, 15) < 1.0);
    }

    #[test]
    fn test_perspective_correct_uv_between_depths() {
        // left column black, right column white; texel chosen per pixel
        let texture = Texture::from_argb(2, 1, vec![BG, 0xFFFFFFFF], String::new()).unwrap();
        let points = [
            Vec4::new(0.0, 0.0, 0.0, 1.0),
            Vec4::new(60.0, 0.0, 0.0, 9.0),
            Vec4::new(0.0, 60.0, 0.0, 1.0),
        ];
        let uvs = [Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)];
        let mut fb = Framebuffer::new(64, 64);
        draw_textured_triangle(&mut fb, &points, &uvs, &texture);
        // halfway across the screen is still far from u = 0.5 because the
        // far vertex is compressed
        assert!(fb.depth_at(30, 1) < 1.0);
        assert_eq!(fb.get_pixel(30, 1), Some(BG));
    }

    #[test]
    fn test_wireframe_skips_depth() {
        let mut fb = Framebuffer::new(64, 64);
        draw_wireframe(&mut fb, &tri(2.0), RED);
        assert!(count(&fb, RED) > 0);
        assert!(fb.zbuffer.iter().all(|&z| z == 1.0));
    }

    #[test]
    fn test_draw_triangle_skips_missing_texture() {
        let mut fb = Framebuffer::new(64, 64);
        let triangle = Triangle {
            points: tri(2.0),
            uvs: [Vec2::default(); 3],
            color: RED,
            texture: None,
        };
        let settings = RenderSettings {
            vertices: false,
            wireframe: false,
            filled: false,
            textured: true,
            cull_backfaces: true,
            grid: false,
        };
        draw_triangle(&mut fb, &triangle, &settings);
        assert_eq!(count(&fb, BG), 64 * 64);
    }

    #[test]
    fn test_vertex_markers() {
        let mut fb = Framebuffer::new(64, 64);
        draw_vertex_markers(&mut fb, &tri(2.0), RED);
        assert_eq!(count(&fb, RED), 3 * 36);
    }

    fn all_modes_but_texture() -> RenderSettings {
        RenderSettings {
            vertices: true,
            wireframe: true,
            filled: true,
            textured: false,
            cull_backfaces: true,
            grid: false,
        }
    }

    #[test]
    fn test_outlines_stay_on_top_of_fill() {
        let mut fb = Framebuffer::new(64, 64);
        let triangle = Triangle {
            points: tri(2.0),
            uvs: [Vec2::default(); 3],
            color: RED,
            texture: None,
        };
        draw_triangle(&mut fb, &triangle, &all_modes_but_texture());

        // left edge runs from (10, 50) to (10, 10)
        assert_eq!(fb.get_pixel(10, 30), Some(Color::WHITE.to_argb()));
        // marker on the (10, 10) corner covers the outline there
        assert_eq!(fb.get_pixel(12, 12), Some(Color::YELLOW.to_argb()));
        assert_eq!(fb.get_pixel(20, 20), Some(RED));
    }

    #[test]
    fn test_texture_draws_over_outlines() {
        let mut fb = Framebuffer::new(64, 64);
        let texture = Texture::from_argb(1, 1, vec![BLUE], String::new()).unwrap();
        let triangle = Triangle {
            points: tri(2.0),
            uvs: [Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)],
            color: RED,
            texture: Some(&texture),
        };
        let settings = RenderSettings {
            textured: true,
            filled: false,
            ..all_modes_but_texture()
        };
        draw_triangle(&mut fb, &triangle, &settings);

        assert_eq!(fb.get_pixel(20, 20), Some(BLUE));
        assert_eq!(count(&fb, RED), 0);
        // corner marker pixels outside the triangle are untouched
        assert_eq!(fb.get_pixel(52, 12), Some(Color::YELLOW.to_argb()));
    }

    #[test]
    fn test_rgba_bytes() {
        let mut fb = Framebuffer::new(1, 1);
        fb.set_pixel(0, 0, 0x80112233);
        assert_eq!(fb.to_rgba_bytes(), vec![0x11, 0x22, 0x33, 0x80]);
    }
}
