//! Scene loading and saving
//!
//! Uses RON (Rusty Object Notation) for human-readable scene files. Every
//! field has a default, so a scene file only needs what it changes.

use std::fs;
use std::path::Path;
use serde::{Serialize, Deserialize};
use tracing::{info, warn};
use crate::rasterizer::{Color, RenderSettings, Texture, Vec3};
use super::mesh::{Mesh, MeshError};
use super::obj::load_obj;

/// Upper bound on meshes in one scene
pub const MAX_MESHES: usize = 10;

/// Side length of the built-in checkerboard texture
const CHECKERBOARD_SIZE: usize = 64;

/// Error type for scene loading
#[derive(Debug)]
pub enum SceneError {
    IoError(std::io::Error),
    ParseError(ron::error::SpannedError),
    SerializeError(ron::Error),
    MeshError(MeshError),
    TooManyMeshes(usize),
    InvalidConfig(String),
}

impl From<std::io::Error> for SceneError {
    fn from(e: std::io::Error) -> Self {
        SceneError::IoError(e)
    }
}

impl From<ron::error::SpannedError> for SceneError {
    fn from(e: ron::error::SpannedError) -> Self {
        SceneError::ParseError(e)
    }
}

impl From<ron::Error> for SceneError {
    fn from(e: ron::Error) -> Self {
        SceneError::SerializeError(e)
    }
}

impl From<MeshError> for SceneError {
    fn from(e: MeshError) -> Self {
        SceneError::MeshError(e)
    }
}

impl std::fmt::Display for SceneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneError::IoError(e) => write!(f, "IO error: {}", e),
            SceneError::ParseError(e) => write!(f, "Parse error: {}", e),
            SceneError::SerializeError(e) => write!(f, "Serialize error: {}", e),
            SceneError::MeshError(e) => write!(f, "Mesh error: {}", e),
            SceneError::TooManyMeshes(n) => {
                write!(f, "Scene has {} meshes, at most {} are supported", n, MAX_MESHES)
            }
            SceneError::InvalidConfig(msg) => write!(f, "Invalid scene: {}", msg),
        }
    }
}

impl std::error::Error for SceneError {}

/// Where a mesh's geometry comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MeshSource {
    /// Built-in unit cube
    Cube,
    /// Path to an OBJ file, relative to the scene file
    Obj(String),
}

/// Where a mesh's texture comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TextureSource {
    /// Built-in black and white checkerboard
    Checkerboard,
    /// Image path, relative to the scene file
    File(String),
}

impl TextureSource {
    pub fn load(&self, base_dir: &Path) -> Result<Texture, String> {
        match self {
            TextureSource::Checkerboard => Ok(Texture::checkerboard(
                CHECKERBOARD_SIZE,
                CHECKERBOARD_SIZE,
                Color::WHITE,
                Color::new(0x80, 0x80, 0x80),
            )),
            TextureSource::File(path) => Texture::from_file(base_dir.join(path)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    pub source: MeshSource,
    pub texture: Option<TextureSource>,
    pub scale: Vec3,
    /// Euler angles in radians
    pub rotation: Vec3,
    pub translation: Vec3,
    /// Radians per second
    pub spin: Vec3,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            source: MeshSource::Cube,
            texture: None,
            scale: Vec3::ONE,
            rotation: Vec3::ZERO,
            translation: Vec3::new(0.0, 0.0, 5.0),
            spin: Vec3::ZERO,
        }
    }
}

impl MeshConfig {
    /// Load geometry and texture. A texture that fails to load is logged and
    /// skipped; the mesh still renders in the other modes.
    pub fn build(&self, base_dir: &Path) -> Result<Mesh, SceneError> {
        let mesh = match &self.source {
            MeshSource::Cube => Mesh::cube(),
            MeshSource::Obj(path) => load_obj(base_dir.join(path))?,
        };
        let mut mesh = mesh.with_transform(self.scale, self.rotation, self.translation);
        mesh.spin = self.spin;

        if let Some(source) = &self.texture {
            match source.load(base_dir) {
                Ok(texture) => {
                    info!(mesh = %mesh.name, texture = %texture.name, width = texture.width(), height = texture.height(), "Loaded texture");
                    mesh = mesh.with_texture(texture);
                }
                Err(e) => warn!(mesh = %mesh.name, error = %e, "Texture unavailable, textured mode disabled for mesh"),
            }
        }

        info!(
            mesh = %mesh.name,
            vertices = mesh.vertices().len(),
            faces = mesh.faces().len(),
            "Loaded mesh"
        );
        Ok(mesh)
    }
}

/// Window, projection, lighting, and mesh setup for one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub width: usize,
    pub height: usize,
    /// Target frames per second; 0 disables frame pacing
    pub fps: u32,
    pub fov_y_degrees: f32,
    pub z_near: f32,
    pub z_far: f32,
    pub light_direction: Vec3,
    pub camera_position: Vec3,
    pub render: RenderSettings,
    pub meshes: Vec<MeshConfig>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            width: crate::rasterizer::WIDTH,
            height: crate::rasterizer::HEIGHT,
            fps: 60,
            fov_y_degrees: 60.0,
            z_near: 0.5,
            z_far: 60.0,
            light_direction: Vec3::new(0.0, 0.0, 1.0),
            camera_position: Vec3::ZERO,
            render: RenderSettings::default(),
            meshes: vec![MeshConfig {
                texture: Some(TextureSource::Checkerboard),
                spin: Vec3::new(0.3, 0.5, 0.0),
                ..MeshConfig::default()
            }],
        }
    }
}

impl SceneConfig {
    /// Vertical field of view in radians
    pub fn fov_y(&self) -> f32 {
        self.fov_y_degrees.to_radians()
    }

    /// Reject values the projection and presentation cannot handle
    pub fn validate(&self) -> Result<(), SceneError> {
        let max = u16::MAX as usize;
        if self.width == 0 || self.height == 0 || self.width > max || self.height > max {
            return Err(SceneError::InvalidConfig(format!(
                "viewport {}x{} must be between 1 and {} on each side",
                self.width, self.height, max
            )));
        }
        if self.z_near.is_nan() || self.z_near <= 0.0 {
            return Err(SceneError::InvalidConfig(format!(
                "z_near {} must be positive",
                self.z_near
            )));
        }
        if self.z_far.is_nan() || self.z_far <= self.z_near {
            return Err(SceneError::InvalidConfig(format!(
                "z_far {} must be greater than z_near {}",
                self.z_far, self.z_near
            )));
        }
        if !(0.0..180.0).contains(&self.fov_y_degrees) || self.fov_y_degrees == 0.0 {
            return Err(SceneError::InvalidConfig(format!(
                "fov_y_degrees {} must be between 0 and 180",
                self.fov_y_degrees
            )));
        }
        Ok(())
    }

    /// Build every mesh in the scene
    pub fn build_meshes(&self, base_dir: &Path) -> Result<Vec<Mesh>, SceneError> {
        if self.meshes.len() > MAX_MESHES {
            return Err(SceneError::TooManyMeshes(self.meshes.len()));
        }
        self.meshes.iter().map(|m| m.build(base_dir)).collect()
    }
}

/// Load a scene from a RON file
pub fn load_scene<P: AsRef<Path>>(path: P) -> Result<SceneConfig, SceneError> {
    let contents = fs::read_to_string(path)?;
    load_scene_from_str(&contents)
}

/// Load a scene from a RON string
pub fn load_scene_from_str(s: &str) -> Result<SceneConfig, SceneError> {
    let scene: SceneConfig = ron::from_str(s)?;
    scene.validate()?;
    Ok(scene)
}

/// Save a scene to a RON file
pub fn save_scene<P: AsRef<Path>>(scene: &SceneConfig, path: P) -> Result<(), SceneError> {
    let config = ron::ser::PrettyConfig::new()
        .depth_limit(4)
        .indentor("  ".to_string());

    let contents = ron::ser::to_string_pretty(scene, config)?;
    fs::write(path, contents)?;
    Ok(())
}
