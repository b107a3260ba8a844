//! View-space frustum clipping (Sutherland-Hodgman)
//!
//! Planes are a point plus a normal pointing into the visible volume. A
//! triangle is clipped one plane at a time; each pass consumes the previous
//! pass's output, and the surviving convex polygon is fanned back into
//! triangles.

use super::math::{Vec2, Vec3};

/// Worst case for a triangle against six planes is 9; one spare slot.
pub const MAX_POLY_VERTICES: usize = 10;

/// Frustum plane identifiers, in clipping order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneKind {
    Left,
    Right,
    Top,
    Bottom,
    Near,
    Far,
}

impl PlaneKind {
    pub const ALL: [PlaneKind; 6] = [
        PlaneKind::Left,
        PlaneKind::Right,
        PlaneKind::Top,
        PlaneKind::Bottom,
        PlaneKind::Near,
        PlaneKind::Far,
    ];
}

#[derive(Debug, Clone, Copy)]
pub struct FrustumPlane {
    pub point: Vec3,
    pub normal: Vec3,
}

impl FrustumPlane {
    pub fn new(point: Vec3, normal: Vec3) -> Self {
        Self { point, normal }
    }

    /// Positive inside, negative outside
    pub fn signed_distance(&self, position: Vec3) -> f32 {
        (position - self.point).dot(self.normal)
    }
}

/// The six view-space clip planes, fixed for the session
#[derive(Debug, Clone)]
pub struct Frustum {
    planes: [FrustumPlane; 6],
}

impl Frustum {
    /// Build the planes from horizontal/vertical FOV (radians) and near/far distances
    pub fn new(fov_x: f32, fov_y: f32, z_near: f32, z_far: f32) -> Self {
        let (sin_half_x, cos_half_x) = (fov_x / 2.0).sin_cos();
        let (sin_half_y, cos_half_y) = (fov_y / 2.0).sin_cos();
        let origin = Vec3::ZERO;

        Self {
            planes: [
                FrustumPlane::new(origin, Vec3::new(cos_half_x, 0.0, sin_half_x)),
                FrustumPlane::new(origin, Vec3::new(-cos_half_x, 0.0, sin_half_x)),
                FrustumPlane::new(origin, Vec3::new(0.0, -cos_half_y, sin_half_y)),
                FrustumPlane::new(origin, Vec3::new(0.0, cos_half_y, sin_half_y)),
                FrustumPlane::new(Vec3::new(0.0, 0.0, z_near), Vec3::new(0.0, 0.0, 1.0)),
                FrustumPlane::new(Vec3::new(0.0, 0.0, z_far), Vec3::new(0.0, 0.0, -1.0)),
            ],
        }
    }

    pub fn plane(&self, kind: PlaneKind) -> &FrustumPlane {
        &self.planes[kind as usize]
    }

    /// Clip against left, right, top, bottom, near, far in that order
    pub fn clip(&self, polygon: &mut Polygon) {
        for kind in PlaneKind::ALL {
            polygon.clip_against(self.plane(kind));
        }
    }
}

/// Position and texture coordinate carried through clipping
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipVertex {
    pub position: Vec3,
    pub uv: Vec2,
}

impl ClipVertex {
    pub fn new(position: Vec3, uv: Vec2) -> Self {
        Self { position, uv }
    }

    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            position: self.position.lerp(other.position, t),
            uv: self.uv.lerp(other.uv, t),
        }
    }
}

/// Convex polygon with at most [`MAX_POLY_VERTICES`] vertices
#[derive(Debug, Clone)]
pub struct Polygon {
    vertices: Vec<ClipVertex>,
}

impl Polygon {
    pub fn from_triangle(positions: [Vec3; 3], uvs: [Vec2; 3]) -> Self {
        let mut polygon = Self { vertices: Vec::with_capacity(MAX_POLY_VERTICES) };
        for (position, uv) in positions.into_iter().zip(uvs) {
            polygon.push(ClipVertex::new(position, uv));
        }
        polygon
    }

    /// # Panics
    /// Panics when the polygon already holds [`MAX_POLY_VERTICES`] vertices.
    pub fn push(&mut self, vertex: ClipVertex) {
        assert!(
            self.len() < MAX_POLY_VERTICES,
            "clip polygon exceeded {} vertices",
            MAX_POLY_VERTICES
        );
        self.vertices.push(vertex);
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn vertices(&self) -> &[ClipVertex] {
        &self.vertices
    }

    /// One Sutherland-Hodgman pass. A vertex exactly on the plane counts as
    /// outside and only survives through an intersection.
    pub fn clip_against(&mut self, plane: &FrustumPlane) {
        let input = std::mem::take(&mut self.vertices);
        self.vertices = Vec::with_capacity(MAX_POLY_VERTICES);

        let Some(last) = input.last() else {
            return;
        };

        let mut previous = *last;
        let mut previous_dot = plane.signed_distance(previous.position);

        for current in input {
            let current_dot = plane.signed_distance(current.position);

            if current_dot * previous_dot < 0.0 {
                let t = previous_dot / (previous_dot - current_dot);
                self.push(previous.lerp(&current, t));
            }

            if current_dot > 0.0 {
                self.push(current);
            }

            previous = current;
            previous_dot = current_dot;
        }
    }

    /// Fan from vertex 0: `n` vertices give `n - 2` triangles
    pub fn triangles(&self) -> impl Iterator<Item = [ClipVertex; 3]> + '_ {
        let v = self.vertices();
        let count = self.len().saturating_sub(2);
        (0..count).map(move |i| [v[0], v[i + 1], v[i + 2]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn frustum() -> Frustum {
        Frustum::new(FRAC_PI_2, FRAC_PI_2, 1.0, 10.0)
    }

    fn uvs() -> [Vec2; 3] {
        [Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.5, 1.0)]
    }

    fn area(tri: &[ClipVertex; 3]) -> f32 {
        let ab = tri[1].position - tri[0].position;
        let ac = tri[2].position - tri[0].position;
        ab.cross(ac).len() / 2.0
    }

    #[test]
    fn test_inside_triangle_unchanged() {
        let positions = [
            Vec3::new(-1.0, 0.0, 5.0),
            Vec3::new(1.0, 0.0, 5.0),
            Vec3::new(0.0, 1.0, 6.0),
        ];
        let mut polygon = Polygon::from_triangle(positions, uvs());
        frustum().clip(&mut polygon);

        assert_eq!(polygon.len(), 3);
        let tris: Vec<_> = polygon.triangles().collect();
        assert_eq!(tris.len(), 1);
        for (v, p) in polygon.vertices().iter().zip(positions) {
            assert_eq!(v.position, p);
        }
    }

    #[test]
    fn test_outside_triangle_removed() {
        // entirely behind the near plane
        let positions = [
            Vec3::new(-1.0, 0.0, 0.5),
            Vec3::new(1.0, 0.0, 0.5),
            Vec3::new(0.0, 1.0, 0.2),
        ];
        let mut polygon = Polygon::from_triangle(positions, uvs());
        frustum().clip(&mut polygon);

        assert!(polygon.is_empty());
        assert_eq!(polygon.triangles().count(), 0);
    }

    #[test]
    fn test_straddling_triangle_becomes_quad() {
        let positions = [
            Vec3::new(-1.0, 0.0, 5.0),
            Vec3::new(1.0, 0.0, 5.0),
            Vec3::new(0.0, 0.0, 15.0),
        ];
        let mut polygon = Polygon::from_triangle(positions, uvs());
        frustum().clip(&mut polygon);

        assert_eq!(polygon.len(), 4);
        let tris: Vec<_> = polygon.triangles().collect();
        assert_eq!(tris.len(), 2);

        // trapezoid between z=5 (width 2) and z=10 (width 1)
        let total: f32 = tris.iter().map(area).sum();
        assert!((total - 7.5).abs() < 1e-4);

        for v in polygon.vertices() {
            assert!(v.position.z <= 10.0 + 1e-5);
        }
    }

    #[test]
    fn test_intersection_interpolates_uv() {
        let positions = [
            Vec3::new(-1.0, 0.0, 5.0),
            Vec3::new(1.0, 0.0, 5.0),
            Vec3::new(0.0, 0.0, 15.0),
        ];
        let mut polygon = Polygon::from_triangle(positions, uvs());
        polygon.clip_against(frustum().plane(PlaneKind::Far));

        // first emitted vertex is halfway along the edge v2 -> v0
        let first = polygon.vertices()[0];
        assert!((first.position.z - 10.0).abs() < 1e-5);
        assert!((first.uv.x - 0.25).abs() < 1e-5);
        assert!((first.uv.y - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_vertex_on_plane_counts_as_outside() {
        let positions = [
            Vec3::new(-1.0, 0.0, 5.0),
            Vec3::new(1.0, 0.0, 5.0),
            Vec3::new(0.0, 0.0, 10.0),
        ];
        let mut polygon = Polygon::from_triangle(positions, uvs());
        polygon.clip_against(frustum().plane(PlaneKind::Far));

        assert_eq!(polygon.len(), 2);
        assert_eq!(polygon.triangles().count(), 0);
    }

    #[test]
    fn test_side_planes_face_inward() {
        let f = frustum();
        let ahead = Vec3::new(0.0, 0.0, 5.0);
        for kind in PlaneKind::ALL {
            assert!(f.plane(kind).signed_distance(ahead) > 0.0, "{:?}", kind);
        }
        assert!(f.plane(PlaneKind::Left).signed_distance(Vec3::new(-10.0, 0.0, 5.0)) < 0.0);
        assert!(f.plane(PlaneKind::Right).signed_distance(Vec3::new(10.0, 0.0, 5.0)) < 0.0);
        assert!(f.plane(PlaneKind::Top).signed_distance(Vec3::new(0.0, 10.0, 5.0)) < 0.0);
        assert!(f.plane(PlaneKind::Bottom).signed_distance(Vec3::new(0.0, -10.0, 5.0)) < 0.0);
    }

    #[test]
    fn test_large_triangle_stays_within_capacity() {
        // crosses all four side planes
        let positions = [
            Vec3::new(-100.0, -100.0, 5.0),
            Vec3::new(100.0, -100.0, 5.0),
            Vec3::new(0.0, 100.0, 6.0),
        ];
        let mut polygon = Polygon::from_triangle(positions, uvs());
        frustum().clip(&mut polygon);

        assert!(polygon.len() >= 3 && polygon.len() <= MAX_POLY_VERTICES);
        assert!(polygon.triangles().count() <= MAX_POLY_VERTICES - 2);
    }

    #[test]
    #[should_panic(expected = "exceeded")]
    fn test_overflow_panics() {
        let mut polygon = Polygon::from_triangle([Vec3::ZERO; 3], uvs());
        for _ in 0..MAX_POLY_VERTICES {
            polygon.push(ClipVertex::new(Vec3::ZERO, Vec2::default()));
        }
    }
}
