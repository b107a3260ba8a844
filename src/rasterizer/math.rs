//! Vector and matrix math for the 3D pipeline
//!
//! Matrices are row-major and multiply column vectors: applying `A` then `B`
//! to `v` is `B * A * v`.

use std::ops::{Add, Mul, Sub};
use serde::{Serialize, Deserialize};

/// 3D Vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };
    pub const ONE: Vec3 = Vec3 { x: 1.0, y: 1.0, z: 1.0 };
    pub const UP: Vec3 = Vec3 { x: 0.0, y: 1.0, z: 0.0 };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn len(self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn normalize(self) -> Vec3 {
        let l = self.len();
        if l == 0.0 {
            return Vec3::ZERO;
        }
        Vec3 {
            x: self.x / l,
            y: self.y / l,
            z: self.z / l,
        }
    }

    pub fn scale(self, s: f32) -> Vec3 {
        Vec3 {
            x: self.x * s,
            y: self.y * s,
            z: self.z * s,
        }
    }

    pub fn lerp(self, other: Vec3, t: f32) -> Vec3 {
        Vec3 {
            x: lerp(self.x, other.x, t),
            y: lerp(self.y, other.y, t),
            z: lerp(self.z, other.z, t),
        }
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, s: f32) -> Vec3 {
        self.scale(s)
    }
}

impl From<Vec4> for Vec3 {
    fn from(v: Vec4) -> Self {
        Vec3::new(v.x, v.y, v.z)
    }
}

/// 2D Vector (screen positions and texture coordinates)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Z component of the 3D cross product (signed parallelogram area)
    pub fn cross(self, other: Vec2) -> f32 {
        self.x * other.y - self.y * other.x
    }

    pub fn lerp(self, other: Vec2, t: f32) -> Vec2 {
        Vec2 {
            x: lerp(self.x, other.x, t),
            y: lerp(self.y, other.y, t),
        }
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, other: Vec2) -> Vec2 {
        Vec2 {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl From<Vec4> for Vec2 {
    fn from(v: Vec4) -> Self {
        Vec2::new(v.x, v.y)
    }
}

/// Homogeneous 4D vector; `w` carries the view-space depth after projection
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Vec4 {
    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }
}

impl From<Vec3> for Vec4 {
    /// Promote a point (w = 1)
    fn from(v: Vec3) -> Self {
        Vec4::new(v.x, v.y, v.z, 1.0)
    }
}

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// 4x4 row-major transform matrix
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
    pub const IDENTITY: Mat4 = Mat4 {
        m: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    pub fn scale(sx: f32, sy: f32, sz: f32) -> Self {
        let mut r = Self::IDENTITY;
        r.m[0][0] = sx;
        r.m[1][1] = sy;
        r.m[2][2] = sz;
        r
    }

    pub fn translation(tx: f32, ty: f32, tz: f32) -> Self {
        let mut r = Self::IDENTITY;
        r.m[0][3] = tx;
        r.m[1][3] = ty;
        r.m[2][3] = tz;
        r
    }

    pub fn rotation_x(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        let mut r = Self::IDENTITY;
        r.m[1][1] = c;
        r.m[1][2] = -s;
        r.m[2][1] = s;
        r.m[2][2] = c;
        r
    }

    pub fn rotation_y(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        let mut r = Self::IDENTITY;
        r.m[0][0] = c;
        r.m[0][2] = s;
        r.m[2][0] = -s;
        r.m[2][2] = c;
        r
    }

    pub fn rotation_z(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        let mut r = Self::IDENTITY;
        r.m[0][0] = c;
        r.m[0][1] = -s;
        r.m[1][0] = s;
        r.m[1][1] = c;
        r
    }

    /// Perspective projection for a left-handed view space (+Z forward).
    ///
    /// `aspect` is height / width. The result copies view-space z into `w`,
    /// so [`Mat4::project`] performs the perspective divide.
    pub fn perspective(fov_y: f32, aspect: f32, z_near: f32, z_far: f32) -> Self {
        let tan_half_fov = (fov_y / 2.0).tan();
        let mut r = Mat4 { m: [[0.0; 4]; 4] };
        r.m[0][0] = aspect / tan_half_fov;
        r.m[1][1] = 1.0 / tan_half_fov;
        r.m[2][2] = z_far / (z_far - z_near);
        r.m[2][3] = -(z_far * z_near) / (z_far - z_near);
        r.m[3][2] = 1.0;
        r
    }

    /// View matrix looking from `eye` toward `target`
    pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Self {
        let z = (target - eye).normalize();
        let x = up.cross(z).normalize();
        let y = z.cross(x);

        Mat4 {
            m: [
                [x.x, x.y, x.z, -x.dot(eye)],
                [y.x, y.y, y.z, -y.dot(eye)],
                [z.x, z.y, z.z, -z.dot(eye)],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    pub fn mul_vec4(&self, v: Vec4) -> Vec4 {
        let m = &self.m;
        Vec4 {
            x: m[0][0] * v.x + m[0][1] * v.y + m[0][2] * v.z + m[0][3] * v.w,
            y: m[1][0] * v.x + m[1][1] * v.y + m[1][2] * v.z + m[1][3] * v.w,
            z: m[2][0] * v.x + m[2][1] * v.y + m[2][2] * v.z + m[2][3] * v.w,
            w: m[3][0] * v.x + m[3][1] * v.y + m[3][2] * v.z + m[3][3] * v.w,
        }
    }

    /// Project a view-space point and divide by `w` (skipped when `w == 0`)
    pub fn project(&self, v: Vec4) -> Vec4 {
        let mut result = self.mul_vec4(v);
        if result.w != 0.0 {
            result.x /= result.w;
            result.y /= result.w;
            result.z /= result.w;
        }
        result
    }
}

impl Mul for Mat4 {
    type Output = Mat4;
    fn mul(self, other: Mat4) -> Mat4 {
        let mut r = Mat4 { m: [[0.0; 4]; 4] };
        for i in 0..4 {
            for j in 0..4 {
                r.m[i][j] = self.m[i][0] * other.m[0][j]
                    + self.m[i][1] * other.m[1][j]
                    + self.m[i][2] * other.m[2][j]
                    + self.m[i][3] * other.m[3][j];
            }
        }
        r
    }
}

impl Mul<Vec4> for Mat4 {
    type Output = Vec4;
    fn mul(self, v: Vec4) -> Vec4 {
        self.mul_vec4(v)
    }
}

/// Barycentric weights (alpha, beta, gamma) of `p` in triangle (a, b, c).
///
/// Returns `None` for zero-area triangles so callers never divide by zero.
pub fn barycentric_weights(a: Vec2, b: Vec2, c: Vec2, p: Vec2) -> Option<Vec3> {
    let ab = b - a;
    let ac = c - a;
    let pc = c - p;
    let pb = b - p;
    let ap = p - a;

    let area_abc = ac.cross(ab);
    if area_abc.abs() < f32::EPSILON {
        return None;
    }

    let alpha = pc.cross(pb) / area_abc;
    let beta = ac.cross(ap) / area_abc;
    let gamma = 1.0 - alpha - beta;

    Some(Vec3::new(alpha, beta, gamma))
}

/// Normal of a view-space triangle, from normalized edges
pub fn triangle_normal(v0: Vec3, v1: Vec3, v2: Vec3) -> Vec3 {
    let ab = (v1 - v0).normalize();
    let ac = (v2 - v0).normalize();
    ab.cross(ac).normalize()
}
