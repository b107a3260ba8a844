//! Per-frame geometry pipeline
//!
//! Mesh faces go through world and view transforms, backface culling,
//! view-space frustum clipping, projection and screen mapping, then flat
//! shading. The resulting screen-space triangles are rasterized in every
//! enabled render mode.

use std::path::Path;
use tracing::{debug, warn};
use crate::rasterizer::{
    draw_triangle, triangle_normal, Camera, Color, Framebuffer, Frustum, Light, Mat4,
    Polygon, RenderSettings, Triangle, Vec2, Vec3, Vec4,
};
use crate::world::{Mesh, SceneConfig, SceneError, MAX_MESHES};

/// Triangles rasterized per frame; the rest of the frame is dropped
pub const MAX_TRIANGLES_PER_FRAME: usize = 10_000;

/// Everything needed to turn meshes into pixels
pub struct RenderContext {
    pub camera: Camera,
    pub light: Light,
    meshes: Vec<Mesh>,
    pub frustum: Frustum,
    pub projection: Mat4,
    pub width: usize,
    pub height: usize,
}

impl RenderContext {
    /// `fov_y` in radians. The horizontal field of view is derived from the
    /// viewport aspect ratio.
    pub fn new(width: usize, height: usize, fov_y: f32, z_near: f32, z_far: f32) -> Self {
        let aspect_x = width as f32 / height as f32;
        let aspect_y = height as f32 / width as f32;
        let fov_x = 2.0 * ((fov_y / 2.0).tan() * aspect_x).atan();

        Self {
            camera: Camera::default(),
            light: Light::default(),
            meshes: Vec::new(),
            frustum: Frustum::new(fov_x, fov_y, z_near, z_far),
            projection: Mat4::perspective(fov_y, aspect_y, z_near, z_far),
            width,
            height,
        }
    }

    /// Build the context and every mesh a scene describes
    pub fn from_scene(scene: &SceneConfig, base_dir: &Path) -> Result<Self, SceneError> {
        scene.validate()?;
        let mut ctx = Self::new(scene.width, scene.height, scene.fov_y(), scene.z_near, scene.z_far);
        ctx.camera = Camera::new(scene.camera_position);
        ctx.light = Light::new(scene.light_direction.normalize());

        for mesh in scene.build_meshes(base_dir)? {
            ctx.add_mesh(mesh)?;
        }
        Ok(ctx)
    }

    pub fn add_mesh(&mut self, mesh: Mesh) -> Result<(), SceneError> {
        if self.meshes.len() >= MAX_MESHES {
            return Err(SceneError::TooManyMeshes(self.meshes.len() + 1));
        }
        self.meshes.push(mesh);
        Ok(())
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    /// Advance mesh animation by `delta_time` seconds
    pub fn update(&mut self, delta_time: f32) {
        for mesh in &mut self.meshes {
            mesh.update(delta_time);
        }
    }

    /// Map a projected NDC point to pixels, flipping Y so +Y is up.
    /// `w` is kept for perspective-correct interpolation.
    pub fn to_screen(&self, ndc: Vec4) -> Vec4 {
        let half_w = self.width as f32 / 2.0;
        let half_h = self.height as f32 / 2.0;
        Vec4::new(ndc.x * half_w + half_w, -ndc.y * half_h + half_h, ndc.z, ndc.w)
    }

    /// Transform, cull, clip, project and shade every face of every mesh
    pub fn collect_triangles(&self, settings: &RenderSettings) -> Vec<Triangle<'_>> {
        let view = self.camera.view_matrix();
        let mut triangles = Vec::new();

        for mesh in &self.meshes {
            let world_view = view * mesh.world_matrix();

            for face in mesh.faces() {
                let [v0, v1, v2] = mesh
                    .face_vertices(face)
                    .map(|v| Vec3::from(world_view * Vec4::from(v)));

                let normal = triangle_normal(v0, v1, v2);

                // camera sits at the view-space origin
                if settings.cull_backfaces && normal.dot(Vec3::ZERO - v0) < 0.0 {
                    continue;
                }

                let mut polygon = Polygon::from_triangle([v0, v1, v2], face.uvs());
                self.frustum.clip(&mut polygon);
                if polygon.is_empty() {
                    continue;
                }

                let color = self.light.shade(face.color, normal);

                for clipped in polygon.triangles() {
                    if triangles.len() >= MAX_TRIANGLES_PER_FRAME {
                        warn!(
                            limit = MAX_TRIANGLES_PER_FRAME,
                            mesh = %mesh.name,
                            "Triangle limit reached, dropping the rest of the frame"
                        );
                        return triangles;
                    }

                    let points = clipped.map(|cv| {
                        self.to_screen(self.projection.project(Vec4::from(cv.position)))
                    });
                    let uvs: [Vec2; 3] = clipped.map(|cv| cv.uv);

                    triangles.push(Triangle {
                        points,
                        uvs,
                        color,
                        texture: mesh.texture.as_ref(),
                    });
                }
            }
        }

        triangles
    }

    /// Clear the framebuffer and draw one frame
    pub fn render_frame(&self, fb: &mut Framebuffer, settings: &RenderSettings) {
        fb.clear(Color::BLACK);
        if settings.grid {
            fb.draw_grid(Color::GRID);
        }

        let triangles = self.collect_triangles(settings);
        debug!(count = triangles.len(), "Rasterizing triangles");

        for triangle in &triangles {
            draw_triangle(fb, triangle, settings);
        }
    }
}
