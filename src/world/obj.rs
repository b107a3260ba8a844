//! Wavefront OBJ loading
//!
//! Parsing is done by `tobj`; models are flattened into one [`Mesh`] with
//! 1-based faces and per-corner UVs.

use std::path::Path;
use crate::rasterizer::{Vec2, Vec3};
use super::mesh::{Face, Mesh, MeshError};

/// Load every model in an OBJ file into a single mesh
pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<Mesh, MeshError> {
    let path = path.as_ref();
    let options = tobj::LoadOptions {
        triangulate: true,
        ignore_points: true,
        ignore_lines: true,
        ..Default::default()
    };

    // materials are not used; faces carry their own color
    let (models, _materials) = tobj::load_obj(path, &options)?;

    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    mesh_from_models(name, &models)
}

/// Flatten triangulated `tobj` models into one mesh
pub fn mesh_from_models(name: String, models: &[tobj::Model]) -> Result<Mesh, MeshError> {
    let mut vertices = Vec::new();
    let mut faces = Vec::new();

    for model in models {
        let m = &model.mesh;
        let offset = vertices.len();

        vertices.extend(m.positions.chunks_exact(3).map(|p| Vec3::new(p[0], p[1], p[2])));
        let texcoords: Vec<Vec2> = m
            .texcoords
            .chunks_exact(2)
            .map(|t| Vec2::new(t[0], t[1]))
            .collect();

        // separate texcoord indices unless the model was loaded single-indexed
        let uv_indices = if m.texcoord_indices.len() == m.indices.len() {
            &m.texcoord_indices
        } else {
            &m.indices
        };
        let uv_at = |k: usize| {
            uv_indices
                .get(k)
                .and_then(|&i| texcoords.get(i as usize))
                .copied()
                .unwrap_or_default()
        };

        for (tri, corners) in m.indices.chunks_exact(3).enumerate() {
            let k = tri * 3;
            faces.push(Face::new(
                offset + corners[0] as usize + 1,
                offset + corners[1] as usize + 1,
                offset + corners[2] as usize + 1,
                [uv_at(k), uv_at(k + 1), uv_at(k + 2)],
            ));
        }
    }

    Mesh::new(name, vertices, faces)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad_model() -> tobj::Model {
        let mesh = tobj::Mesh {
            positions: vec![
                0.0, 0.0, 0.0,
                1.0, 0.0, 0.0,
                1.0, 1.0, 0.0,
                0.0, 1.0, 0.0,
            ],
            indices: vec![0, 1, 2, 0, 2, 3],
            texcoords: vec![0.0, 0.0, 1.0, 1.0],
            texcoord_indices: vec![0, 1, 1, 0, 1, 0],
            ..Default::default()
        };
        tobj::Model::new(mesh, "quad".to_string())
    }

    #[test]
    fn test_faces_become_one_based() {
        let mesh = mesh_from_models("quad".to_string(), &[quad_model()]).unwrap();
        assert_eq!(mesh.vertices().len(), 4);
        assert_eq!(mesh.faces().len(), 2);
        let face = mesh.faces()[1];
        assert_eq!((face.a, face.b, face.c), (1, 3, 4));
        assert_eq!(face.b_uv, Vec2::new(1.0, 1.0));
        assert_eq!(face.c_uv, Vec2::new(0.0, 0.0));
    }

    #[test]
    fn test_models_are_offset() {
        let mesh = mesh_from_models("two".to_string(), &[quad_model(), quad_model()]).unwrap();
        assert_eq!(mesh.vertices().len(), 8);
        assert_eq!(mesh.faces()[2].a, 5);
    }

    #[test]
    fn test_missing_texcoords_default_to_zero() {
        let mut model = quad_model();
        model.mesh.texcoords.clear();
        model.mesh.texcoord_indices.clear();
        let mesh = mesh_from_models("bare".to_string(), &[model]).unwrap();
        assert_eq!(mesh.faces()[0].a_uv, Vec2::default());
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(matches!(load_obj("does/not/exist.obj"), Err(MeshError::Obj(_))));
    }
}
