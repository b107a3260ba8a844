//! Single directional light and flat shading

use super::math::Vec3;
use super::types::Color;

#[derive(Debug, Clone, Copy)]
pub struct Light {
    pub direction: Vec3,
}

impl Light {
    pub fn new(direction: Vec3) -> Self {
        Self { direction }
    }

    /// Flat-shade intensity for a face normal, clamped to 0.0-1.0
    pub fn intensity(&self, normal: Vec3) -> f32 {
        (-normal.dot(self.direction)).clamp(0.0, 1.0)
    }

    /// Shade a packed ARGB face color once per face
    pub fn shade(&self, color: u32, normal: Vec3) -> u32 {
        light_with_intensity(color, self.intensity(normal))
    }
}

impl Default for Light {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 1.0))
    }
}

/// Scale the RGB channels of a packed ARGB color by `intensity`.
///
/// Channels are unpacked before the multiply, so a channel can never carry
/// into its neighbour.
pub fn light_with_intensity(color: u32, intensity: f32) -> u32 {
    Color::from_argb(color).shade(intensity).to_argb()
}
