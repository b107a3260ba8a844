//! Mesh geometry and per-mesh transform state

use crate::rasterizer::{Mat4, Texture, Vec2, Vec3};

/// Face color used when the geometry source provides none
pub const DEFAULT_FACE_COLOR: u32 = 0xFFFFFFFF;

/// Triangle face with 1-based vertex indices
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    pub a: usize,
    pub b: usize,
    pub c: usize,
    pub a_uv: Vec2,
    pub b_uv: Vec2,
    pub c_uv: Vec2,
    /// Packed ARGB base color
    pub color: u32,
}

impl Face {
    pub fn new(a: usize, b: usize, c: usize, uvs: [Vec2; 3]) -> Self {
        Self {
            a,
            b,
            c,
            a_uv: uvs[0],
            b_uv: uvs[1],
            c_uv: uvs[2],
            color: DEFAULT_FACE_COLOR,
        }
    }

    /// Zero-based indices into the vertex list.
    ///
    /// Only valid for faces accepted by [`Mesh::new`], which rejects index 0.
    pub fn vertex_indices(&self) -> [usize; 3] {
        [self.a - 1, self.b - 1, self.c - 1]
    }

    pub fn uvs(&self) -> [Vec2; 3] {
        [self.a_uv, self.b_uv, self.c_uv]
    }
}

/// Error type for mesh construction and loading
#[derive(Debug)]
pub enum MeshError {
    Obj(tobj::LoadError),
    IndexOutOfRange { face: usize, index: usize, len: usize },
}

impl From<tobj::LoadError> for MeshError {
    fn from(e: tobj::LoadError) -> Self {
        MeshError::Obj(e)
    }
}

impl std::fmt::Display for MeshError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MeshError::Obj(e) => write!(f, "OBJ error: {}", e),
            MeshError::IndexOutOfRange { face, index, len } => write!(
                f,
                "face {} references vertex {} but the mesh has {} vertices",
                face, index, len
            ),
        }
    }
}

impl std::error::Error for MeshError {}

/// Geometry plus transform state. Only the transform changes per frame.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub name: String,
    vertices: Vec<Vec3>,
    faces: Vec<Face>,
    pub texture: Option<Texture>,
    pub scale: Vec3,
    /// Euler angles in radians
    pub rotation: Vec3,
    pub translation: Vec3,
    /// Rotation added per second by [`Mesh::update`]
    pub spin: Vec3,
}

impl Mesh {
    /// Build a mesh, checking every face index lies in `1..=vertices.len()`
    pub fn new(name: impl Into<String>, vertices: Vec<Vec3>, faces: Vec<Face>) -> Result<Self, MeshError> {
        let len = vertices.len();
        for (face_idx, face) in faces.iter().enumerate() {
            for index in [face.a, face.b, face.c] {
                if index == 0 || index > len {
                    return Err(MeshError::IndexOutOfRange { face: face_idx, index, len });
                }
            }
        }

        Ok(Self {
            name: name.into(),
            vertices,
            faces,
            texture: None,
            scale: Vec3::ONE,
            rotation: Vec3::ZERO,
            translation: Vec3::ZERO,
            spin: Vec3::ZERO,
        })
    }

    pub fn with_transform(mut self, scale: Vec3, rotation: Vec3, translation: Vec3) -> Self {
        self.scale = scale;
        self.rotation = rotation;
        self.translation = translation;
        self
    }

    pub fn with_texture(mut self, texture: Texture) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Face vertices in model space
    pub fn face_vertices(&self, face: &Face) -> [Vec3; 3] {
        face.vertex_indices().map(|i| self.vertices[i])
    }

    /// `Translation * RotZ * RotY * RotX * Scale`
    pub fn world_matrix(&self) -> Mat4 {
        Mat4::translation(self.translation.x, self.translation.y, self.translation.z)
            * Mat4::rotation_z(self.rotation.z)
            * Mat4::rotation_y(self.rotation.y)
            * Mat4::rotation_x(self.rotation.x)
            * Mat4::scale(self.scale.x, self.scale.y, self.scale.z)
    }

    /// Advance the spin animation by `delta_time` seconds
    pub fn update(&mut self, delta_time: f32) {
        self.rotation = self.rotation + self.spin * delta_time;
    }

    /// Unit cube centered on the origin, faces wound clockwise seen from outside
    pub fn cube() -> Self {
        let vertices = vec![
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(-1.0, 1.0, -1.0),
            Vec3::new(1.0, 1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(1.0, -1.0, 1.0),
            Vec3::new(-1.0, 1.0, 1.0),
            Vec3::new(-1.0, -1.0, 1.0),
        ];

        let first = [Vec2::new(0.0, 1.0), Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0)];
        let second = [Vec2::new(0.0, 1.0), Vec2::new(1.0, 0.0), Vec2::new(1.0, 1.0)];

        // front, right, back, left, top, bottom
        let quads: [([usize; 3], [usize; 3]); 6] = [
            ([1, 2, 3], [1, 3, 4]),
            ([4, 3, 5], [4, 5, 6]),
            ([6, 5, 7], [6, 7, 8]),
            ([8, 7, 2], [8, 2, 1]),
            ([2, 7, 5], [2, 5, 3]),
            ([6, 8, 1], [6, 1, 4]),
        ];

        let faces = quads
            .iter()
            .flat_map(|([a, b, c], [d, e, f])| {
                [Face::new(*a, *b, *c, first), Face::new(*d, *e, *f, second)]
            })
            .collect();

        Self {
            name: "cube".to_string(),
            vertices,
            faces,
            texture: None,
            scale: Vec3::ONE,
            rotation: Vec3::ZERO,
            translation: Vec3::ZERO,
            spin: Vec3::ZERO,
        }
    }
}
