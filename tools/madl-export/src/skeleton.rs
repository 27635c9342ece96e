//! Skeleton extraction (armature -> bone records)
//!
//! Bones keep the armature's order. Each record stores its head position and
//! XYZ Euler angle relative to the parent bone; roots store absolute values.

use glam::{EulerRot, Mat3, Mat4, Vec3};
use madl_common::BoneRecord;

use crate::error::ExportError;
use crate::scene::Armature;

/// Skinned vertices and animation entries address bones with a u8
pub const MAX_BONES: usize = 256;

/// Reject skeletons the format cannot address
pub fn check_bone_count(armature: &Armature) -> Result<(), ExportError> {
    if armature.bones.len() > MAX_BONES {
        return Err(ExportError::TooManyBones {
            armature: armature.name.clone(),
            count: armature.bones.len(),
            max: MAX_BONES,
        });
    }
    Ok(())
}

/// XYZ Euler angles of a transform's rotation part
pub fn euler_xyz(matrix: &Mat4) -> Vec3 {
    let (_, rotation, _) = matrix.to_scale_rotation_translation();
    let (x, y, z) = rotation.to_euler(EulerRot::XYZ);
    Vec3::new(x, y, z)
}

/// Convert the armature into parent-relative bone records
pub fn encode_skeleton(armature: &Armature) -> Result<Vec<BoneRecord>, ExportError> {
    check_bone_count(armature)?;

    let mut records = Vec::with_capacity(armature.bones.len());
    for (index, bone) in armature.bones.iter().enumerate() {
        let head = Vec3::from(bone.head);
        let angle = euler_xyz(&armature.bone_matrix(index));

        let (parent, position, angle) = match bone.parent {
            None => (-1, head, angle),
            Some(parent) if parent < index => {
                let parent_bone = &armature.bones[parent];
                let parent_angle = euler_xyz(&armature.bone_matrix(parent));
                (
                    parent as i32,
                    head - Vec3::from(parent_bone.head),
                    angle - parent_angle,
                )
            }
            Some(parent) => {
                return Err(ExportError::InvalidParent {
                    bone: bone.name.clone(),
                    parent,
                });
            }
        };

        records.push(BoneRecord {
            index: index as u32,
            name: bone.name.clone(),
            parent,
            position: position.to_array(),
            angle: angle.to_array(),
        });
    }

    tracing::info!("Skeleton '{}': {} bones", armature.name, records.len());
    Ok(records)
}

/// Inverse rest transforms, for moving mesh data into bone-local space
pub struct BoneSpace {
    inverse: Vec<Mat4>,
}

impl BoneSpace {
    pub fn new(armature: &Armature) -> Self {
        let inverse = (0..armature.bones.len())
            .map(|i| armature.bone_matrix(i).inverse())
            .collect();
        Self { inverse }
    }

    /// Mesh-local point -> bone-local point
    pub fn point(&self, bone: usize, mesh_world: &Mat4, p: [f32; 3]) -> [f32; 3] {
        (self.inverse[bone] * *mesh_world)
            .transform_point3(Vec3::from(p))
            .to_array()
    }

    /// Mesh-local normal -> bone-local normal
    pub fn normal(&self, bone: usize, mesh_world: &Mat4, n: [f32; 3]) -> [f32; 3] {
        let linear = Mat3::from_mat4(self.inverse[bone]) * Mat3::from_mat4(*mesh_world);
        (linear * Vec3::from(n)).normalize_or_zero().to_array()
    }
}
