//! Geometry classification (triangles -> rigid / skinned buckets)
//!
//! A triangle is rigid when each of its vertices has exactly one influence at
//! weight 1.0; everything else is skinned. Buckets are keyed by
//! (mesh, material, bone) and keep first-encounter order so exports are
//! deterministic.

use glam::{Mat3, Mat4, Vec3};
use hashbrown::HashMap;
use madl_common::{RigidVertex, SkinnedVertex};

use crate::error::ExportError;
use crate::scene::{Armature, SceneMesh, SceneModel, SceneTriangle, SceneVertex};
use crate::skeleton::{BoneSpace, check_bone_count};

/// Identity of one output mesh record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BucketKey {
    /// Index into [`SceneModel::meshes`]
    pub mesh: usize,
    /// Index into [`SceneModel::materials`]
    pub material: Option<usize>,
    /// Rigid: the owning bone. Skinned: first influence, for naming only.
    pub bone: Option<usize>,
}

/// Non-indexed triangle list for one key
#[derive(Debug, Clone)]
pub struct Bucket<V> {
    pub key: BucketKey,
    pub vertices: Vec<V>,
}

#[derive(Debug, Clone)]
pub struct Classified {
    pub rigid: Vec<Bucket<RigidVertex>>,
    pub skinned: Vec<Bucket<SkinnedVertex>>,
}

impl Classified {
    pub fn rigid_triangles(&self) -> usize {
        self.rigid.iter().map(|b| b.vertices.len() / 3).sum()
    }

    pub fn skinned_triangles(&self) -> usize {
        self.skinned.iter().map(|b| b.vertices.len() / 3).sum()
    }
}

/// Ordered bucket list with keyed lookup
struct BucketSet<V> {
    buckets: Vec<Bucket<V>>,
    lookup: HashMap<BucketKey, usize>,
}

impl<V> BucketSet<V> {
    fn new() -> Self {
        Self {
            buckets: Vec::new(),
            lookup: HashMap::new(),
        }
    }

    fn vertices(&mut self, key: BucketKey) -> &mut Vec<V> {
        let slot = *self.lookup.entry(key).or_insert_with(|| {
            self.buckets.push(Bucket {
                key,
                vertices: Vec::new(),
            });
            self.buckets.len() - 1
        });
        &mut self.buckets[slot].vertices
    }
}

/// Classify every triangle of the given meshes
///
/// `meshes` are indices into `scene.meshes`; the physics proxy is left out by the caller.
pub fn classify(
    scene: &SceneModel,
    armature: &Armature,
    meshes: &[usize],
) -> Result<Classified, ExportError> {
    check_bone_count(armature)?;
    let space = BoneSpace::new(armature);
    let mut rigid = BucketSet::new();
    let mut skinned = BucketSet::new();

    for &mesh_index in meshes {
        let mesh = &scene.meshes[mesh_index];
        let ctx = MeshContext::new(mesh, armature, &space);

        for triangle in &mesh.triangles {
            let corners = ctx.corners(triangle, scene.materials.len())?;

            if let Some(bone) = ctx.rigid_bone(&corners)? {
                let key = BucketKey {
                    mesh: mesh_index,
                    material: triangle.material,
                    bone: Some(bone),
                };
                let out = rigid.vertices(key);
                for vertex in corners {
                    out.push(ctx.rigid_vertex(bone, vertex));
                }
            } else {
                let key = BucketKey {
                    mesh: mesh_index,
                    material: triangle.material,
                    bone: ctx.first_influence_bone(&corners)?,
                };
                let converted = corners
                    .iter()
                    .zip(triangle.vertices)
                    .map(|(vertex, index)| ctx.skinned_vertex(index, vertex))
                    .collect::<Result<Vec<_>, _>>()?;
                skinned.vertices(key).extend(converted);
            }
        }
    }

    let classified = Classified {
        rigid: rigid.buckets,
        skinned: skinned.buckets,
    };
    tracing::debug!(
        "Classified {} rigid triangles into {} buckets, {} skinned triangles into {} buckets",
        classified.rigid_triangles(),
        classified.rigid.len(),
        classified.skinned_triangles(),
        classified.skinned.len()
    );
    Ok(classified)
}

/// Per-mesh lookups shared by all of its triangles
struct MeshContext<'a> {
    mesh: &'a SceneMesh,
    space: &'a BoneSpace,
    bindings: Vec<Option<usize>>,
    world: Mat4,
    normal_world: Mat3,
}

impl<'a> MeshContext<'a> {
    fn new(mesh: &'a SceneMesh, armature: &Armature, space: &'a BoneSpace) -> Self {
        let world = mesh.world_matrix();
        Self {
            mesh,
            space,
            bindings: mesh.group_bones(armature),
            world,
            normal_world: Mat3::from_mat4(world),
        }
    }

    fn out_of_range(&self, what: &'static str, index: usize, len: usize) -> ExportError {
        ExportError::IndexOutOfRange {
            mesh: self.mesh.name.clone(),
            what,
            index,
            len,
        }
    }

    fn corners(
        &self,
        triangle: &SceneTriangle,
        material_count: usize,
    ) -> Result<[&'a SceneVertex; 3], ExportError> {
        if let Some(material) = triangle.material {
            if material >= material_count {
                return Err(self.out_of_range("material", material, material_count));
            }
        }
        let mesh: &'a SceneMesh = self.mesh;
        let vertices = &mesh.vertices;
        let fetch = |i: usize| {
            vertices
                .get(i)
                .ok_or_else(|| self.out_of_range("vertex", i, vertices.len()))
        };
        let [a, b, c] = triangle.vertices;
        Ok([fetch(a)?, fetch(b)?, fetch(c)?])
    }

    /// Bone owning a rigid triangle, or `None` if the triangle is skinned
    ///
    /// Every corner's group must bind to a bone; the first corner's bone owns
    /// the triangle.
    fn rigid_bone(&self, corners: &[&SceneVertex; 3]) -> Result<Option<usize>, ExportError> {
        let Some(groups) = corners
            .iter()
            .map(|v| v.single_full_influence())
            .collect::<Option<Vec<_>>>()
        else {
            return Ok(None);
        };
        let bones = groups
            .into_iter()
            .map(|group| self.mesh.bone_for_group(&self.bindings, group))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(bones.first().copied())
    }

    fn first_influence_bone(
        &self,
        corners: &[&SceneVertex; 3],
    ) -> Result<Option<usize>, ExportError> {
        corners
            .iter()
            .find_map(|v| v.influences.first())
            .map(|influence| self.mesh.bone_for_group(&self.bindings, influence.group))
            .transpose()
    }

    fn rigid_vertex(&self, bone: usize, vertex: &SceneVertex) -> RigidVertex {
        RigidVertex {
            position: self.space.point(bone, &self.world, vertex.position),
            normal: self.space.normal(bone, &self.world, vertex.normal),
            uv: vertex.uv,
        }
    }

    fn skinned_vertex(
        &self,
        index: usize,
        vertex: &SceneVertex,
    ) -> Result<SkinnedVertex, ExportError> {
        if vertex.influences.len() > u8::MAX as usize {
            return Err(ExportError::TooManyInfluences {
                mesh: self.mesh.name.clone(),
                vertex: index,
                count: vertex.influences.len(),
            });
        }

        let mut weights = Vec::with_capacity(vertex.influences.len());
        let mut bones = Vec::with_capacity(vertex.influences.len());
        for influence in &vertex.influences {
            let bone = self.mesh.bone_for_group(&self.bindings, influence.group)?;
            weights.push(influence.weight);
            // check_bone_count keeps every bone index below 256
            bones.push(bone as u8);
        }

        Ok(SkinnedVertex {
            weights,
            bones,
            position: self
                .world
                .transform_point3(Vec3::from(vertex.position))
                .to_array(),
            normal: (self.normal_world * Vec3::from(vertex.normal))
                .normalize_or_zero()
                .to_array(),
            uv: vertex.uv,
        })
    }
}
