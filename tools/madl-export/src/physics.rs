//! Physics encoding (collision proxy -> per-bone hull point sets)
//!
//! Every non-empty vertex group of the proxy mesh becomes one hull, holding the
//! bone-local positions of its member vertices. Hull building itself happens
//! downstream.

use madl_common::HullRecord;

use crate::error::ExportError;
use crate::scene::{Armature, SceneMesh};
use crate::skeleton::BoneSpace;

/// Default name fragment that marks the collision proxy
pub const DEFAULT_PHYSICS_MARKER: &str = "phy";

/// Index of the single collision proxy among `meshes`
pub fn find_physics_proxy(meshes: &[SceneMesh], marker: &str) -> Result<usize, ExportError> {
    let proxies: Vec<usize> = meshes
        .iter()
        .enumerate()
        .filter(|(_, m)| m.is_physics_proxy(marker))
        .map(|(i, _)| i)
        .collect();

    match proxies.as_slice() {
        [] => Err(ExportError::MissingPhysicsProxy {
            marker: marker.to_string(),
        }),
        [only] => Ok(*only),
        many => Err(ExportError::DuplicatePhysicsProxy {
            names: many.iter().map(|&i| meshes[i].name.clone()).collect(),
        }),
    }
}

/// Build one hull per non-empty vertex group, in group order
pub fn encode_physics(
    proxy: &SceneMesh,
    armature: &Armature,
) -> Result<Vec<HullRecord>, ExportError> {
    let bindings = proxy.group_bones(armature);
    let space = BoneSpace::new(armature);
    let world = proxy.world_matrix();

    // Reject dangling group references before grouping
    for vertex in &proxy.vertices {
        if let Some(bad) = vertex
            .influences
            .iter()
            .find(|i| i.group >= proxy.vertex_groups.len())
        {
            return Err(ExportError::IndexOutOfRange {
                mesh: proxy.name.clone(),
                what: "vertex group",
                index: bad.group,
                len: proxy.vertex_groups.len(),
            });
        }
    }

    let mut hulls = Vec::new();
    for group in 0..proxy.vertex_groups.len() {
        let members: Vec<[f32; 3]> = proxy
            .vertices
            .iter()
            .filter(|v| v.influences.iter().any(|i| i.group == group))
            .map(|v| v.position)
            .collect();
        if members.is_empty() {
            continue;
        }

        let bone = proxy.bone_for_group(&bindings, group)?;
        let index = hulls.len() as u32 + 1;
        let points: Vec<[f32; 3]> = members
            .into_iter()
            .map(|p| space.point(bone, &world, p))
            .collect();

        tracing::debug!(
            "Hull {} on bone '{}': {} points",
            index,
            armature.bones[bone].name,
            points.len()
        );
        hulls.push(HullRecord {
            index,
            name: format!("{}_phy_{}", proxy.name, index),
            bone_index: bone as u32,
            position: [0.0; 3],
            angle: [0.0; 3],
            points,
        });
    }

    tracing::info!("Physics '{}': {} hulls", proxy.name, hulls.len());
    Ok(hulls)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Influence, MeshRole, SceneBone, SceneVertex};
    use glam::{Mat4, Vec3};

    fn armature() -> Armature {
        Armature {
            name: "rig".into(),
            bones: vec![
                SceneBone {
                    name: "root".into(),
                    parent: None,
                    head: [0.0; 3],
                    matrix: Mat4::IDENTITY.to_cols_array_2d(),
                },
                SceneBone {
                    name: "leg".into(),
                    parent: Some(0),
                    head: [1.0, 0.0, 0.0],
                    matrix: Mat4::from_translation(Vec3::X).to_cols_array_2d(),
                },
            ],
        }
    }

    fn mesh(name: &str, role: MeshRole) -> SceneMesh {
        SceneMesh {
            name: name.into(),
            role,
            world: Mat4::IDENTITY.to_cols_array_2d(),
            vertex_groups: vec![],
            vertices: vec![],
            triangles: vec![],
        }
    }

    fn vertex(position: [f32; 3], groups: &[usize]) -> SceneVertex {
        SceneVertex {
            position,
            influences: groups
                .iter()
                .map(|&group| Influence { group, weight: 1.0 })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_find_proxy() {
        let meshes = vec![mesh("body", MeshRole::Render), mesh("body_phy", MeshRole::Render)];
        assert_eq!(find_physics_proxy(&meshes, "phy").unwrap(), 1);

        let meshes = vec![mesh("hitbox", MeshRole::Physics), mesh("body", MeshRole::Render)];
        assert_eq!(find_physics_proxy(&meshes, "phy").unwrap(), 0);
    }

    #[test]
    fn test_missing_and_duplicate_proxy() {
        let meshes = vec![mesh("body", MeshRole::Render)];
        let err = find_physics_proxy(&meshes, "phy").unwrap_err();
        assert!(matches!(err, ExportError::MissingPhysicsProxy { .. }));
        assert_eq!(err.kind(), crate::error::ErrorKind::Configuration);

        let meshes = vec![mesh("a_phy", MeshRole::Render), mesh("b_phy", MeshRole::Render)];
        let err = find_physics_proxy(&meshes, "phy").unwrap_err();
        assert!(err.to_string().contains("a_phy"));
        assert!(err.to_string().contains("b_phy"));
    }

    #[test]
    fn test_hulls_per_nonempty_group() {
        let mut proxy = mesh("body_phy", MeshRole::Physics);
        proxy.vertex_groups = vec!["leg".into(), "unused".into(), "root".into()];
        proxy.vertices = vec![
            vertex([1.0, 0.0, 0.0], &[0]),
            vertex([0.0, 0.0, 0.0], &[2]),
            vertex([2.0, 1.0, 0.0], &[0, 2]),
        ];

        let hulls = encode_physics(&proxy, &armature()).unwrap();
        assert_eq!(hulls.len(), 2);

        assert_eq!(hulls[0].index, 1);
        assert_eq!(hulls[0].name, "body_phy_phy_1");
        assert_eq!(hulls[0].bone_index, 1);
        // Bone-local: leg sits at x = 1
        assert_eq!(hulls[0].points, vec![[0.0, 0.0, 0.0], [1.0, 1.0, 0.0]]);

        assert_eq!(hulls[1].index, 2);
        assert_eq!(hulls[1].bone_index, 0);
        assert_eq!(hulls[1].points, vec![[0.0, 0.0, 0.0], [2.0, 1.0, 0.0]]);
    }

    #[test]
    fn test_unbound_group_with_members() {
        let mut proxy = mesh("body_phy", MeshRole::Physics);
        proxy.vertex_groups = vec!["tail".into()];
        proxy.vertices = vec![vertex([0.0; 3], &[0])];
        assert!(matches!(
            encode_physics(&proxy, &armature()),
            Err(ExportError::UnboundVertexGroup { .. })
        ));
    }

    #[test]
    fn test_dangling_group_reference() {
        let mut proxy = mesh("body_phy", MeshRole::Physics);
        proxy.vertex_groups = vec!["root".into()];
        proxy.vertices = vec![vertex([0.0; 3], &[4])];
        assert!(matches!(
            encode_physics(&proxy, &armature()),
            Err(ExportError::IndexOutOfRange { index: 4, .. })
        ));
    }
}
