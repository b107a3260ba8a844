//! Core types for the rasterizer

use serde::{Serialize, Deserialize};
use super::math::{Vec2, Vec4};

/// RGBA color (0-255 per channel), stored in buffers as packed 0xAARRGGBB
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };
    pub const YELLOW: Color = Color { r: 255, g: 255, b: 0, a: 255 };
    pub const GRID: Color = Color { r: 0x44, g: 0x44, b: 0x44, a: 255 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn with_alpha(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_argb(packed: u32) -> Self {
        Self {
            a: (packed >> 24) as u8,
            r: (packed >> 16) as u8,
            g: (packed >> 8) as u8,
            b: packed as u8,
        }
    }

    pub fn to_argb(self) -> u32 {
        ((self.a as u32) << 24) | ((self.r as u32) << 16) | ((self.g as u32) << 8) | (self.b as u32)
    }

    /// Multiply R, G and B by `intensity` (clamped to 0.0-1.0); alpha is kept
    pub fn shade(self, intensity: f32) -> Self {
        let i = intensity.clamp(0.0, 1.0);
        Self {
            r: (self.r as f32 * i) as u8,
            g: (self.g as f32 * i) as u8,
            b: (self.b as f32 * i) as u8,
            a: self.a,
        }
    }

    /// Convert to [u8; 4] RGBA bytes for presentation
    pub fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Decoded image with its own dimensions (texels packed as ARGB)
#[derive(Debug, Clone)]
pub struct Texture {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
    pub name: String,
}

impl Texture {
    /// Build a texture from packed ARGB texels.
    ///
    /// Returns `None` when the buffer does not hold exactly `width * height`
    /// texels or either dimension is zero.
    pub fn from_argb(width: usize, height: usize, pixels: Vec<u32>, name: String) -> Option<Self> {
        if width == 0 || height == 0 || pixels.len() != width * height {
            return None;
        }
        Some(Self { width, height, pixels, name })
    }

    /// Load texture from an image file (PNG, JPEG, BMP)
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();
        let img = image::open(path)
            .map_err(|e| format!("Failed to load {}: {}", path.display(), e))?;

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        Self::from_image(img, name)
    }

    fn from_image(img: image::DynamicImage, name: String) -> Result<Self, String> {
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();

        let pixels: Vec<u32> = rgba
            .pixels()
            .map(|p| Color::with_alpha(p[0], p[1], p[2], p[3]).to_argb())
            .collect();

        Self::from_argb(width as usize, height as usize, pixels, name)
            .ok_or_else(|| "Image has no pixels".to_string())
    }

    /// Procedural checkerboard of 4x4 texel squares
    pub fn checkerboard(width: usize, height: usize, color1: Color, color2: Color) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let checker = ((x / 4) + (y / 4)) % 2 == 0;
                pixels.push(if checker { color1 } else { color2 }.to_argb());
            }
        }
        Self { width, height, pixels, name: "checkerboard".to_string() }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Texel coordinates for UV; out-of-range coordinates tile
    pub fn texel_coords(&self, u: f32, v: f32) -> (usize, usize) {
        let tx = ((u * self.width as f32) as i32).unsigned_abs() as usize % self.width;
        let ty = ((v * self.height as f32) as i32).unsigned_abs() as usize % self.height;
        (tx, ty)
    }

    /// Sample texture at UV coordinates (nearest, no filtering)
    pub fn sample(&self, u: f32, v: f32) -> u32 {
        let (tx, ty) = self.texel_coords(u, v);
        self.pixels[ty * self.width + tx]
    }
}

/// Which outputs to draw this frame.
///
/// Assembled from the accumulated toggle state once per frame and passed by
/// value through the render call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// 6x6 markers on each projected vertex
    pub vertices: bool,
    /// Triangle outlines (not depth tested)
    pub wireframe: bool,
    /// Flat-shaded fill
    pub filled: bool,
    /// Perspective-correct texture mapping
    pub textured: bool,
    /// Drop faces pointing away from the camera
    pub cull_backfaces: bool,
    /// Dotted background grid
    pub grid: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            vertices: false,
            wireframe: true,
            filled: false,
            textured: false,
            cull_backfaces: true,
            grid: true,
        }
    }
}

/// Screen-space triangle ready for rasterization
#[derive(Debug, Clone, Copy)]
pub struct Triangle<'a> {
    /// Screen x/y, NDC z, and view-space w
    pub points: [Vec4; 3],
    pub uvs: [Vec2; 3],
    /// Flat-shaded ARGB color
    pub color: u32,
    pub texture: Option<&'a Texture>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argb_roundtrip() {
        let c = Color::with_alpha(0x12, 0x34, 0x56, 0x78);
        assert_eq!(c.to_argb(), 0x78123456);
        assert_eq!(Color::from_argb(0x78123456), c);
    }

    #[test]
    fn test_shade_scales_channels_and_keeps_alpha() {
        let c = Color::from_argb(0xFF804020).shade(0.5);
        assert_eq!(c.to_argb(), 0xFF402010);
    }

    #[test]
    fn test_shade_clamps_intensity() {
        let base = Color::from_argb(0xFFFFFFFF);
        assert_eq!(base.shade(3.0).to_argb(), 0xFFFFFFFF);
        assert_eq!(base.shade(-1.0).to_argb(), 0xFF000000);
    }

    #[test]
    fn test_texture_rejects_mismatched_buffer() {
        assert!(Texture::from_argb(4, 4, vec![0; 15], String::new()).is_none());
        assert!(Texture::from_argb(0, 4, Vec::new(), String::new()).is_none());
        assert!(Texture::from_argb(2, 2, vec![0; 4], String::new()).is_some());
    }

    #[test]
    fn test_texture_sampling_wraps() {
        let tex = Texture::checkerboard(8, 8, Color::WHITE, Color::BLACK);
        // UVs are sampled after the V flip done at triangle setup
        let (u1, v1) = (1.3, -0.2);
        let (u2, v2) = (0.3, 0.8);
        assert_eq!(tex.texel_coords(u1, 1.0 - v1), tex.texel_coords(u2, 1.0 - v2));
        assert_eq!(tex.sample(u1, 1.0 - v1), tex.sample(u2, 1.0 - v2));
    }

    #[test]
    fn test_texture_negative_coords_stay_in_range() {
        let tex = Texture::checkerboard(8, 4, Color::WHITE, Color::BLACK);
        let (tx, ty) = tex.texel_coords(-3.7, -12.1);
        assert!(tx < 8 && ty < 4);
    }

    #[test]
    fn test_render_settings_defaults() {
        let s = RenderSettings::default();
        assert!(s.wireframe && s.cull_backfaces && s.grid);
        assert!(!s.vertices && !s.filled && !s.textured);
    }
}
