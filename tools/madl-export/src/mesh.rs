//! Geometry encoding (buckets -> rigid / skinned mesh records)

use hashbrown::HashMap;
use madl_common::{NO_TEXTURE, RigidMeshRecord, SkinnedMeshRecord};

use crate::classify::Classified;
use crate::scene::SceneModel;

/// Result of in-memory geometry conversion
#[derive(Debug, Clone, Default)]
pub struct ConvertedGeometry {
    pub rigid: Vec<RigidMeshRecord>,
    pub skinned: Vec<SkinnedMeshRecord>,
}

/// Turn classified buckets into mesh records
///
/// `textures` maps a material index to its texture record index; materials
/// without an entry serialize [`NO_TEXTURE`].
pub fn encode_geometry(
    scene: &SceneModel,
    classified: &Classified,
    textures: &HashMap<usize, i8>,
) -> ConvertedGeometry {
    let texture_for = |material: Option<usize>| {
        material
            .and_then(|m| textures.get(&m).copied())
            .unwrap_or(NO_TEXTURE)
    };

    let rigid: Vec<RigidMeshRecord> = classified
        .rigid
        .iter()
        .zip(1u32..)
        .map(|(bucket, index)| {
            debug_assert_eq!(bucket.vertices.len() % 3, 0);
            // Rigid buckets always carry their bone
            let bone = bucket.key.bone.unwrap_or_default();
            RigidMeshRecord {
                index,
                name: format!("{}_sm_{}", scene.meshes[bucket.key.mesh].name, bone),
                bone_index: bone as u32,
                position: [0.0; 3],
                angle: [0.0; 3],
                vertices: bucket.vertices.clone(),
                texture: texture_for(bucket.key.material),
            }
        })
        .collect();

    let skinned: Vec<SkinnedMeshRecord> = classified
        .skinned
        .iter()
        .zip(1u32..)
        .map(|(bucket, index)| {
            debug_assert_eq!(bucket.vertices.len() % 3, 0);
            SkinnedMeshRecord {
                index,
                name: format!("{}_dm_{}", scene.meshes[bucket.key.mesh].name, index),
                vertices: bucket.vertices.clone(),
                texture: texture_for(bucket.key.material),
            }
        })
        .collect();

    for record in &rigid {
        tracing::debug!(
            "Rigid mesh {} '{}': bone {}, {} vertices, texture {}",
            record.index,
            record.name,
            record.bone_index,
            record.vertices.len(),
            record.texture
        );
    }
    for record in &skinned {
        tracing::debug!(
            "Skinned mesh {} '{}': {} vertices, texture {}",
            record.index,
            record.name,
            record.vertices.len(),
            record.texture
        );
    }

    ConvertedGeometry { rigid, skinned }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{Bucket, BucketKey};
    use crate::scene::{SceneMesh, SceneModel};
    use madl_common::{RigidVertex, SkinnedVertex};

    fn scene() -> SceneModel {
        let mesh = |name: &str| SceneMesh {
            name: name.into(),
            role: Default::default(),
            world: glam::Mat4::IDENTITY.to_cols_array_2d(),
            vertex_groups: vec![],
            vertices: vec![],
            triangles: vec![],
        };
        SceneModel {
            meshes: vec![mesh("body"), mesh("head")],
            ..Default::default()
        }
    }

    fn key(mesh: usize, material: Option<usize>, bone: Option<usize>) -> BucketKey {
        BucketKey {
            mesh,
            material,
            bone,
        }
    }

    #[test]
    fn test_names_indices_and_textures() {
        let classified = Classified {
            rigid: vec![
                Bucket {
                    key: key(0, Some(0), Some(3)),
                    vertices: vec![RigidVertex::default(); 3],
                },
                Bucket {
                    key: key(1, Some(1), Some(0)),
                    vertices: vec![RigidVertex::default(); 6],
                },
            ],
            skinned: vec![
                Bucket {
                    key: key(1, None, Some(2)),
                    vertices: vec![SkinnedVertex::default(); 3],
                },
                Bucket {
                    key: key(0, Some(0), None),
                    vertices: vec![SkinnedVertex::default(); 3],
                },
            ],
        };
        let mut textures = HashMap::new();
        textures.insert(0usize, 1i8);

        let out = encode_geometry(&scene(), &classified, &textures);

        assert_eq!(out.rigid.len(), 2);
        assert_eq!(out.rigid[0].index, 1);
        assert_eq!(out.rigid[0].name, "body_sm_3");
        assert_eq!(out.rigid[0].bone_index, 3);
        assert_eq!(out.rigid[0].texture, 1);
        assert_eq!(out.rigid[0].position, [0.0; 3]);
        assert_eq!(out.rigid[1].index, 2);
        assert_eq!(out.rigid[1].name, "head_sm_0");
        // Material 1 resolved to no texture
        assert_eq!(out.rigid[1].texture, NO_TEXTURE);

        assert_eq!(out.skinned[0].index, 1);
        assert_eq!(out.skinned[0].name, "head_dm_1");
        assert_eq!(out.skinned[0].texture, NO_TEXTURE);
        assert_eq!(out.skinned[1].name, "body_dm_2");
        assert_eq!(out.skinned[1].texture, 1);
    }

    #[test]
    fn test_empty_classification() {
        let classified = Classified {
            rigid: vec![],
            skinned: vec![],
        };
        let out = encode_geometry(&scene(), &classified, &HashMap::new());
        assert!(out.rigid.is_empty());
        assert!(out.skinned.is_empty());
    }
}
