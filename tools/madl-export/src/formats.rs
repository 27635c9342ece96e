//! Container writers for MADL asset files
//!
//! Re-exports the record types from madl-common. Every writer lays out its
//! sections back to back and derives header offsets from the section sizes.

pub use madl_common::formats::*;
pub use madl_common::{ANIMATION_FORMAT, MODEL_FORMAT, PHYSICS_FORMAT, TEXTURE_FORMAT};

use anyhow::{Context, Result};
use std::io::Write;

fn to_u32(len: usize, what: &str) -> Result<u32> {
    u32::try_from(len).with_context(|| format!("{} section is larger than 4 GiB", what))
}

/// Write a complete `.madl` file (skeleton + geometry)
pub fn write_madl_model<W: Write>(
    w: &mut W,
    checksum: i32,
    name: &str,
    bones: &[BoneRecord],
    rigid: &[RigidMeshRecord],
    skinned: &[SkinnedMeshRecord],
) -> Result<()> {
    let mut bone_section = Vec::with_capacity(bones.len() * BONE_RECORD_SIZE);
    for bone in bones {
        bone.write_to(&mut bone_section);
    }
    let mut rigid_section = Vec::new();
    for mesh in rigid {
        mesh.write_to(&mut rigid_section);
    }
    let mut skinned_section = Vec::new();
    for mesh in skinned {
        mesh.write_to(&mut skinned_section);
    }

    let mut header = ModelHeader::new(ContainerHeader::new(&MODEL_FORMAT, checksum), name);
    header.bone_count = to_u32(bones.len(), "Bone")?;
    header.bone_offset = ModelHeader::SIZE as u32;
    header.rigid_mesh_count = to_u32(rigid.len(), "Rigid mesh")?;
    header.rigid_mesh_offset = header.bone_offset + to_u32(bone_section.len(), "Bone")?;
    header.skinned_mesh_count = to_u32(skinned.len(), "Skinned mesh")?;
    header.skinned_mesh_offset = header
        .rigid_mesh_offset
        .checked_add(to_u32(rigid_section.len(), "Rigid mesh")?)
        .context("Model file is larger than 4 GiB")?;

    w.write_all(&header.to_bytes())?;
    w.write_all(&bone_section)?;
    w.write_all(&rigid_section)?;
    w.write_all(&skinned_section)?;
    Ok(())
}

/// Header plus one section of self-sized records
fn write_section<W: Write>(
    w: &mut W,
    format: &madl_common::ContainerFormat,
    checksum: i32,
    count: usize,
    section: &[u8],
) -> Result<()> {
    let header = SectionHeader::new(
        ContainerHeader::new(format, checksum),
        to_u32(count, format.extension)?,
    );
    to_u32(section.len(), format.extension)?;
    w.write_all(&header.to_bytes())?;
    w.write_all(section)?;
    Ok(())
}

/// Write a complete `.mtex` file
pub fn write_madl_textures<W: Write>(
    w: &mut W,
    checksum: i32,
    textures: &[TextureRecord],
) -> Result<()> {
    let mut section = Vec::new();
    for texture in textures {
        texture.write_to(&mut section);
    }
    write_section(w, &TEXTURE_FORMAT, checksum, textures.len(), &section)
}

/// Write a complete `.mphy` file
pub fn write_madl_physics<W: Write>(w: &mut W, checksum: i32, hulls: &[HullRecord]) -> Result<()> {
    let mut section = Vec::new();
    for hull in hulls {
        hull.write_to(&mut section);
    }
    write_section(w, &PHYSICS_FORMAT, checksum, hulls.len(), &section)
}

/// Write a complete `.mani` file
pub fn write_madl_animation<W: Write>(
    w: &mut W,
    checksum: i32,
    sequences: &[AnimationSequence],
) -> Result<()> {
    let mut section = Vec::new();
    for sequence in sequences {
        if sequence.frames.is_empty() {
            anyhow::bail!("Sequence '{}' has no frames", sequence.name);
        }
        sequence.write_to(&mut section);
    }
    write_section(w, &ANIMATION_FORMAT, checksum, sequences.len(), &section)
}
