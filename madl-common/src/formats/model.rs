//! MADL skeleton/geometry container (.madl)
//!
//! # Layout
//! ```text
//! Header (68 bytes)          - see ModelHeader
//! Bones[bone_count]          - 64 bytes each
//! RigidMeshes[count]         - variable, self-sized by record_length
//! SkinnedMeshes[count]       - variable, self-sized by record_length
//! ```
//!
//! Bone record (64 bytes):
//! ```text
//! index u32 · name [u8; 32] · parent i32 · position f32×3 · angle f32×3
//! ```
//!
//! Rigid mesh record (74 + 32 × vertex_count bytes):
//! ```text
//! record_length u32 · index u32 · name [u8; 32] · is_parented u8 · bone_index u32
//! position f32×3 · angle f32×3 · vertex_count u32
//! vertices × { position f32×3 · normal f32×3 · uv f32×2 }
//! texture i8
//! ```
//!
//! Skinned mesh record (45 + Σ vertex_length bytes):
//! ```text
//! record_length u32 · index u32 · name [u8; 32] · vertex_count u32
//! vertices × { vertex_length u32 · bone_count u8 · weights f32×n · bones u8×n
//!              position f32×3 · normal f32×3 · uv f32×2 }
//! texture i8
//! ```
//!
//! Vertex lists are non-indexed triangle lists: every three vertices form one triangle.
//! `record_length` and `vertex_length` cover the whole record including the length field.

use anyhow::{Context, Result, bail};

use super::bytes::{ByteReader, NAME_LEN, encode_name, put_f32s};
use super::header::ModelHeader;
use super::{check_container, check_record_length};
use crate::format::MODEL_FORMAT;

/// Size of one bone record in bytes
pub const BONE_RECORD_SIZE: usize = 4 + NAME_LEN + 4 + 12 + 12;

/// Size of one rigid vertex in bytes (position + normal + uv)
pub const RIGID_VERTEX_SIZE: usize = 32;

/// Fixed part of a rigid mesh record (everything except the vertices)
pub const RIGID_MESH_FIXED_SIZE: usize = 4 + 4 + NAME_LEN + 1 + 4 + 12 + 12 + 4 + 1;

/// Fixed part of a skinned vertex (everything except weights and bone indices)
pub const SKINNED_VERTEX_FIXED_SIZE: usize = 4 + 1 + 32;

/// Fixed part of a skinned mesh record (everything except the vertices)
pub const SKINNED_MESH_FIXED_SIZE: usize = 4 + 4 + NAME_LEN + 4 + 1;

/// Texture index meaning "no texture"
pub const NO_TEXTURE: i8 = -1;

/// One skeleton bone, transform relative to its parent
#[derive(Debug, Clone, PartialEq)]
pub struct BoneRecord {
    pub index: u32,
    pub name: String,
    /// Parent bone index, -1 for a root
    pub parent: i32,
    pub position: [f32; 3],
    /// Euler XYZ angle delta from the parent
    pub angle: [f32; 3],
}

impl BoneRecord {
    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.index.to_le_bytes());
        out.extend_from_slice(&encode_name(&self.name));
        out.extend_from_slice(&self.parent.to_le_bytes());
        put_f32s(out, &self.position);
        put_f32s(out, &self.angle);
    }

    pub fn read(r: &mut ByteReader) -> Option<Self> {
        Some(Self {
            index: r.u32()?,
            name: r.name()?,
            parent: r.i32()?,
            position: r.vec3()?,
            angle: r.vec3()?,
        })
    }
}

/// Rigid vertex in bone-local space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RigidVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl RigidVertex {
    fn write_to(&self, out: &mut Vec<u8>) {
        put_f32s(out, &self.position);
        put_f32s(out, &self.normal);
        put_f32s(out, &self.uv);
    }

    fn read(r: &mut ByteReader) -> Option<Self> {
        Some(Self {
            position: r.vec3()?,
            normal: r.vec3()?,
            uv: r.vec2()?,
        })
    }
}

/// Geometry rigidly attached to a single bone
#[derive(Debug, Clone, PartialEq)]
pub struct RigidMeshRecord {
    pub index: u32,
    pub name: String,
    pub bone_index: u32,
    /// Offset from the bone; always zero at export time
    pub position: [f32; 3],
    pub angle: [f32; 3],
    /// Non-indexed triangle list
    pub vertices: Vec<RigidVertex>,
    /// Texture record index, or [`NO_TEXTURE`]
    pub texture: i8,
}

impl RigidMeshRecord {
    pub fn encoded_len(&self) -> usize {
        RIGID_MESH_FIXED_SIZE + self.vertices.len() * RIGID_VERTEX_SIZE
    }

    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&(self.encoded_len() as u32).to_le_bytes());
        out.extend_from_slice(&self.index.to_le_bytes());
        out.extend_from_slice(&encode_name(&self.name));
        out.push(1); // is_parented
        out.extend_from_slice(&self.bone_index.to_le_bytes());
        put_f32s(out, &self.position);
        put_f32s(out, &self.angle);
        out.extend_from_slice(&(self.vertices.len() as u32).to_le_bytes());
        for vertex in &self.vertices {
            vertex.write_to(out);
        }
        out.extend_from_slice(&self.texture.to_le_bytes());
    }

    pub fn read(r: &mut ByteReader) -> Result<Self> {
        let start = r.position();
        let record_length = r.u32().context("Truncated rigid mesh record")?;
        let index = r.u32().context("Truncated rigid mesh record")?;
        let record = (|| {
            let name = r.name()?;
            let _is_parented = r.u8()?;
            let bone_index = r.u32()?;
            let position = r.vec3()?;
            let angle = r.vec3()?;
            let count = r.u32()? as usize;
            let vertices = (0..count)
                .map(|_| RigidVertex::read(r))
                .collect::<Option<Vec<_>>>()?;
            let texture = r.i8()?;
            Some(Self {
                index,
                name,
                bone_index,
                position,
                angle,
                vertices,
                texture,
            })
        })()
        .with_context(|| format!("Truncated rigid mesh record {}", index))?;
        check_record_length("Rigid mesh", index, record_length, r.position() - start)?;
        Ok(record)
    }
}

/// Vertex blended across one or more bones
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SkinnedVertex {
    /// One weight per influencing bone
    pub weights: Vec<f32>,
    /// Bone indices, parallel to `weights`
    pub bones: Vec<u8>,
    /// Model-space position
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl SkinnedVertex {
    pub fn encoded_len(&self) -> usize {
        SKINNED_VERTEX_FIXED_SIZE + self.bones.len() * 5
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&(self.encoded_len() as u32).to_le_bytes());
        out.push(self.bones.len() as u8);
        put_f32s(out, &self.weights);
        out.extend_from_slice(&self.bones);
        put_f32s(out, &self.position);
        put_f32s(out, &self.normal);
        put_f32s(out, &self.uv);
    }

    fn read(r: &mut ByteReader) -> Option<(u32, Self)> {
        let vertex_length = r.u32()?;
        let bone_count = r.u8()? as usize;
        let weights = (0..bone_count)
            .map(|_| r.f32())
            .collect::<Option<Vec<_>>>()?;
        let bones = r.take(bone_count)?.to_vec();
        let vertex = Self {
            weights,
            bones,
            position: r.vec3()?,
            normal: r.vec3()?,
            uv: r.vec2()?,
        };
        Some((vertex_length, vertex))
    }
}

/// Geometry blended across several bones
#[derive(Debug, Clone, PartialEq)]
pub struct SkinnedMeshRecord {
    pub index: u32,
    pub name: String,
    /// Non-indexed triangle list
    pub vertices: Vec<SkinnedVertex>,
    /// Texture record index, or [`NO_TEXTURE`]
    pub texture: i8,
}

impl SkinnedMeshRecord {
    pub fn encoded_len(&self) -> usize {
        SKINNED_MESH_FIXED_SIZE
            + self
                .vertices
                .iter()
                .map(SkinnedVertex::encoded_len)
                .sum::<usize>()
    }

    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&(self.encoded_len() as u32).to_le_bytes());
        out.extend_from_slice(&self.index.to_le_bytes());
        out.extend_from_slice(&encode_name(&self.name));
        out.extend_from_slice(&(self.vertices.len() as u32).to_le_bytes());
        for vertex in &self.vertices {
            vertex.write_to(out);
        }
        out.extend_from_slice(&self.texture.to_le_bytes());
    }

    pub fn read(r: &mut ByteReader) -> Result<Self> {
        let start = r.position();
        let record_length = r.u32().context("Truncated skinned mesh record")?;
        let index = r.u32().context("Truncated skinned mesh record")?;
        let name = r
            .name()
            .with_context(|| format!("Truncated skinned mesh record {}", index))?;
        let count = r
            .u32()
            .with_context(|| format!("Truncated skinned mesh record {}", index))?;

        let mut vertices = Vec::with_capacity(count as usize);
        for i in 0..count {
            let vertex_start = r.position();
            let (vertex_length, vertex) = SkinnedVertex::read(r).with_context(|| {
                format!("Truncated vertex {} in skinned mesh record {}", i, index)
            })?;
            if vertex_length as usize != r.position() - vertex_start {
                bail!(
                    "Skinned mesh record {} vertex {} declares {} bytes but occupies {}",
                    index,
                    i,
                    vertex_length,
                    r.position() - vertex_start
                );
            }
            vertices.push(vertex);
        }
        let texture = r
            .i8()
            .with_context(|| format!("Truncated skinned mesh record {}", index))?;
        check_record_length("Skinned mesh", index, record_length, r.position() - start)?;

        Ok(Self {
            index,
            name,
            vertices,
            texture,
        })
    }
}

/// Fully decoded `.madl` file
#[derive(Debug, Clone, PartialEq)]
pub struct ModelFile {
    pub header: ModelHeader,
    pub bones: Vec<BoneRecord>,
    pub rigid_meshes: Vec<RigidMeshRecord>,
    pub skinned_meshes: Vec<SkinnedMeshRecord>,
}

impl ModelFile {
    pub fn checksum(&self) -> i32 {
        self.header.container.checksum
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let header = ModelHeader::from_bytes(bytes).context("Truncated MADL header")?;
        check_container(&header.container, &MODEL_FORMAT)?;

        let mut r = ByteReader::at(bytes, header.bone_offset as usize)
            .context("Bone offset is past the end of the file")?;
        let bones = (0..header.bone_count)
            .map(|i| BoneRecord::read(&mut r).with_context(|| format!("Truncated bone {}", i)))
            .collect::<Result<Vec<_>>>()?;

        let mut r = ByteReader::at(bytes, header.rigid_mesh_offset as usize)
            .context("Rigid mesh offset is past the end of the file")?;
        let rigid_meshes = (0..header.rigid_mesh_count)
            .map(|_| RigidMeshRecord::read(&mut r))
            .collect::<Result<Vec<_>>>()?;

        let mut r = ByteReader::at(bytes, header.skinned_mesh_offset as usize)
            .context("Skinned mesh offset is past the end of the file")?;
        let skinned_meshes = (0..header.skinned_mesh_count)
            .map(|_| SkinnedMeshRecord::read(&mut r))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            header,
            bones,
            rigid_meshes,
            skinned_meshes,
        })
    }
}
