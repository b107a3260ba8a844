//! First-person camera driven by yaw/pitch deltas

use super::math::{Mat4, Vec3, Vec4};

/// Camera state
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    /// Facing direction, refreshed from yaw/pitch
    pub direction: Vec3,
    /// Displacement applied by the last forward/backward move
    pub forward_velocity: Vec3,
    pub yaw: f32,
    pub pitch: f32,
}

impl Camera {
    pub fn new(position: Vec3) -> Self {
        let mut cam = Self {
            position,
            direction: Vec3::new(0.0, 0.0, 1.0),
            forward_velocity: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
        };
        cam.update_direction();
        cam
    }

    /// Rotate +Z by pitch (around X) and then yaw (around Y)
    pub fn update_direction(&mut self) {
        let rotation = Mat4::rotation_y(self.yaw) * Mat4::rotation_x(self.pitch);
        self.direction = Vec3::from(rotation * Vec4::from(Vec3::new(0.0, 0.0, 1.0)));
    }

    /// Accumulate a yaw delta (radians)
    pub fn add_yaw(&mut self, delta: f32) {
        self.yaw += delta;
        self.update_direction();
    }

    /// Accumulate a pitch delta (radians)
    pub fn add_pitch(&mut self, delta: f32) {
        self.pitch += delta;
        self.update_direction();
    }

    pub fn look_at_target(&self) -> Vec3 {
        self.position + self.direction
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at(self.position, self.look_at_target(), Vec3::UP)
    }

    /// Move along the facing direction (negative distance moves back)
    pub fn move_forward(&mut self, distance: f32) {
        self.forward_velocity = self.direction * distance;
        self.position = self.position + self.forward_velocity;
    }

    /// Strafe along the camera's right axis
    pub fn move_right(&mut self, distance: f32) {
        let right = Vec3::UP.cross(self.direction).normalize();
        self.position = self.position + right * distance;
    }

    /// Move along world up
    pub fn move_up(&mut self, distance: f32) {
        self.position = self.position + Vec3::UP * distance;
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}
