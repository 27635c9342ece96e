//! Container inspection (decode any MADL family file and summarize it)

use anyhow::{Context, Result};
use std::path::Path;

use madl_common::{
    AnimationFile, ContainerFormat, ContainerHeader, ContainerKind, ModelFile, PhysicsFile,
    TextureFile,
};

/// Decode a container by its tag and describe its contents, one line per entry
pub fn summarize(bytes: &[u8]) -> Result<Vec<String>> {
    let header = ContainerHeader::from_bytes(bytes).context("File is too short for a header")?;
    let format = ContainerFormat::from_tag(header.tag)
        .with_context(|| format!("Unknown container tag 0x{:08X}", header.tag))?;

    let mut lines = vec![format!(
        "{} v{} checksum {}",
        format.extension, header.version, header.checksum
    )];

    match format.kind {
        ContainerKind::Model => {
            let model = ModelFile::from_bytes(bytes)?;
            lines.push(format!(
                "'{}': {} bones, {} rigid meshes, {} skinned meshes",
                model.header.name(),
                model.bones.len(),
                model.rigid_meshes.len(),
                model.skinned_meshes.len()
            ));
            for bone in &model.bones {
                lines.push(format!(
                    "  bone {} '{}' parent {}",
                    bone.index, bone.name, bone.parent
                ));
            }
            for mesh in &model.rigid_meshes {
                lines.push(format!(
                    "  rigid {} '{}' bone {}, {} triangles, texture {}",
                    mesh.index,
                    mesh.name,
                    mesh.bone_index,
                    mesh.vertices.len() / 3,
                    mesh.texture
                ));
            }
            for mesh in &model.skinned_meshes {
                lines.push(format!(
                    "  skinned {} '{}', {} triangles, texture {}",
                    mesh.index,
                    mesh.name,
                    mesh.vertices.len() / 3,
                    mesh.texture
                ));
            }
        }
        ContainerKind::Texture => {
            let file = TextureFile::from_bytes(bytes)?;
            lines.push(format!("{} textures", file.textures.len()));
            for texture in &file.textures {
                lines.push(format!(
                    "  texture {} '{}', base {} bytes, emission {}",
                    texture.index,
                    texture.name,
                    texture.base.len(),
                    texture
                        .emission
                        .as_ref()
                        .map_or("none".to_string(), |e| format!("{} bytes", e.len()))
                ));
            }
        }
        ContainerKind::Physics => {
            let file = PhysicsFile::from_bytes(bytes)?;
            lines.push(format!("{} hulls", file.hulls.len()));
            for hull in &file.hulls {
                lines.push(format!(
                    "  hull {} '{}' bone {}, {} points",
                    hull.index,
                    hull.name,
                    hull.bone_index,
                    hull.points.len()
                ));
            }
        }
        ContainerKind::Animation => {
            let file = AnimationFile::from_bytes(bytes)?;
            lines.push(format!("{} sequences", file.sequences.len()));
            for sequence in &file.sequences {
                let entries: usize = sequence.frames.iter().map(|f| f.deltas.len()).sum();
                lines.push(format!(
                    "  sequence {} '{}', {} frames @ {} fps, {} bone deltas",
                    sequence.index,
                    sequence.name,
                    sequence.frames.len(),
                    sequence.fps,
                    entries
                ));
            }
        }
    }
    Ok(lines)
}

/// Decode a file and log its summary
pub fn inspect_file(path: &Path) -> Result<()> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {:?}", path))?;
    let lines = summarize(&bytes).with_context(|| format!("Failed to decode {:?}", path))?;
    for line in lines {
        tracing::info!("{}", line);
    }
    Ok(())
}
