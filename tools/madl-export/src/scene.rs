//! Scene Model: the captured character handed over by the authoring tool
//!
//! The exporter never mutates a scene. It is deserialized from JSON, so any
//! capture script that can emit this shape can drive the exporter.
//!
//! Matrices are column-major `[[f32; 4]; 4]` (as `glam::Mat4::from_cols_array_2d`).

use anyhow::{Context, Result};
use glam::Mat4;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ExportError;

/// Default playback rate when the scene does not specify one
pub const DEFAULT_FPS: u8 = 30;

const IDENTITY: [[f32; 4]; 4] = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

fn identity() -> [[f32; 4]; 4] {
    IDENTITY
}

fn default_fps() -> u8 {
    DEFAULT_FPS
}

/// Complete captured scene
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneModel {
    pub armatures: Vec<Armature>,
    #[serde(default)]
    pub meshes: Vec<SceneMesh>,
    #[serde(default)]
    pub materials: Vec<Material>,
    #[serde(default)]
    pub animations: Vec<PoseTrack>,
    #[serde(default = "default_fps")]
    pub fps: u8,
}

impl SceneModel {
    /// The one armature being exported
    pub fn armature(&self) -> Result<&Armature, ExportError> {
        match self.armatures.as_slice() {
            [] => Err(ExportError::NoArmature),
            [armature] => Ok(armature),
            many => Err(ExportError::MultipleArmatures {
                names: many.iter().map(|a| a.name.clone()).collect(),
            }),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse scene JSON")
    }
}

/// Load a scene snapshot from a JSON file
pub fn load_scene(path: &Path) -> Result<SceneModel> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read scene: {:?}", path))?;
    SceneModel::from_json(&json).with_context(|| format!("Invalid scene file: {:?}", path))
}

/// Skeleton object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Armature {
    pub name: String,
    pub bones: Vec<SceneBone>,
}

impl Armature {
    pub fn bone_index(&self, name: &str) -> Option<usize> {
        self.bones.iter().position(|b| b.name == name)
    }

    /// Armature-space rest transform of a bone
    pub fn bone_matrix(&self, index: usize) -> Mat4 {
        Mat4::from_cols_array_2d(&self.bones[index].matrix)
    }
}

/// Rest-pose bone, in armature space
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneBone {
    pub name: String,
    #[serde(default)]
    pub parent: Option<usize>,
    /// Head position
    pub head: [f32; 3],
    /// Full rest transform
    #[serde(default = "identity")]
    pub matrix: [[f32; 4]; 4],
}

/// What a mesh is used for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeshRole {
    #[default]
    Render,
    /// Collision proxy; its vertex groups become physics hulls
    Physics,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneMesh {
    pub name: String,
    #[serde(default)]
    pub role: MeshRole,
    /// Object-to-world transform
    #[serde(default = "identity")]
    pub world: [[f32; 4]; 4],
    /// Vertex group names, bound to bones by name
    #[serde(default)]
    pub vertex_groups: Vec<String>,
    pub vertices: Vec<SceneVertex>,
    #[serde(default)]
    pub triangles: Vec<SceneTriangle>,
}

impl SceneMesh {
    pub fn world_matrix(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.world)
    }

    /// Whether this mesh is the collision proxy
    pub fn is_physics_proxy(&self, marker: &str) -> bool {
        self.role == MeshRole::Physics || (!marker.is_empty() && self.name.contains(marker))
    }

    /// Resolve every vertex group to its bone index
    ///
    /// Groups are resolved lazily by callers; unmatched groups are only an error
    /// once a vertex actually references them.
    pub fn group_bones(&self, armature: &Armature) -> Vec<Option<usize>> {
        self.vertex_groups
            .iter()
            .map(|group| armature.bone_index(group))
            .collect()
    }

    /// Bone bound to `group`, via a table from [`Self::group_bones`]
    pub fn bone_for_group(
        &self,
        bindings: &[Option<usize>],
        group: usize,
    ) -> Result<usize, ExportError> {
        match bindings.get(group) {
            Some(Some(bone)) => Ok(*bone),
            Some(None) => Err(ExportError::UnboundVertexGroup {
                mesh: self.name.clone(),
                group: self.vertex_groups[group].clone(),
            }),
            None => Err(ExportError::IndexOutOfRange {
                mesh: self.name.clone(),
                what: "vertex group",
                index: group,
                len: self.vertex_groups.len(),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneVertex {
    pub position: [f32; 3],
    #[serde(default)]
    pub normal: [f32; 3],
    #[serde(default)]
    pub uv: [f32; 2],
    #[serde(default)]
    pub influences: Vec<Influence>,
}

impl SceneVertex {
    /// Exactly one influence at full weight
    pub fn single_full_influence(&self) -> Option<usize> {
        match self.influences.as_slice() {
            [only] if only.weight == 1.0 => Some(only.group),
            _ => None,
        }
    }
}

/// Skin weight of one vertex group on one vertex
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Influence {
    pub group: usize,
    pub weight: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneTriangle {
    pub vertices: [usize; 3],
    /// Index into [`SceneModel::materials`]
    #[serde(default)]
    pub material: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    /// Base color image, relative to the scene file
    #[serde(default)]
    pub base_color: Option<PathBuf>,
    #[serde(default)]
    pub emission: Option<PathBuf>,
}

/// Sampled action: one full-skeleton pose per integer frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoseTrack {
    pub name: String,
    #[serde(default)]
    pub first_frame: u32,
    /// Overrides the scene rate for this track
    #[serde(default)]
    pub fps: Option<u8>,
    /// `frames[i][bone]`, relative to the rest pose
    pub frames: Vec<Vec<BoneSample>>,
}

/// Pose-space bone transform (zero = rest)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoneSample {
    #[serde(default)]
    pub location: [f32; 3],
    /// XYZ Euler angles in radians
    #[serde(default)]
    pub rotation: [f32; 3],
}
