//! Texture encoding (materials -> texture records)
//!
//! Image payloads are opaque bytes. Producing them is delegated to an
//! [`ImageResolver`]; a resolver failure only costs that material its image.

use hashbrown::{HashMap, HashSet};
use madl_common::TextureRecord;
use rayon::prelude::*;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{ExportError, ResourceError};
use crate::scene::{Material, SceneModel};

/// Highest texture index a mesh record can hold (i8)
pub const MAX_TEXTURES: usize = i8::MAX as usize;

/// Payload encoding of exported images
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextureFormat {
    #[default]
    Png,
    Jpeg,
    /// Valve texture, produced by the external VTFCmd tool
    Vtf,
}

impl TextureFormat {
    fn image_format(self) -> Option<image::ImageFormat> {
        match self {
            Self::Png => Some(image::ImageFormat::Png),
            Self::Jpeg => Some(image::ImageFormat::Jpeg),
            Self::Vtf => None,
        }
    }
}

/// Which image of a material is being resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSlot {
    BaseColor,
    Emission,
}

impl ImageSlot {
    pub fn path(self, material: &Material) -> Option<&Path> {
        match self {
            Self::BaseColor => material.base_color.as_deref(),
            Self::Emission => material.emission.as_deref(),
        }
    }
}

/// Produces the encoded image bytes for one material slot
///
/// `Ok(None)` means the material has no image in that slot.
pub trait ImageResolver: Send + Sync {
    fn resolve(
        &self,
        material: &Material,
        slot: ImageSlot,
    ) -> Result<Option<Vec<u8>>, ResourceError>;
}

/// Reads already-encoded PNG/JPEG files next to the scene
pub struct FileImageResolver {
    root: PathBuf,
    format: TextureFormat,
}

impl FileImageResolver {
    pub fn new(root: impl Into<PathBuf>, format: TextureFormat) -> Self {
        Self {
            root: root.into(),
            format,
        }
    }
}

impl ImageResolver for FileImageResolver {
    fn resolve(
        &self,
        material: &Material,
        slot: ImageSlot,
    ) -> Result<Option<Vec<u8>>, ResourceError> {
        let Some(relative) = slot.path(material) else {
            return Ok(None);
        };
        let path = self.root.join(relative);
        let bytes = std::fs::read(&path).map_err(|source| ResourceError::Read {
            material: material.name.clone(),
            path: path.clone(),
            source,
        })?;

        match (image::guess_format(&bytes), self.format.image_format()) {
            (Ok(found), Some(expected)) if found != expected => tracing::warn!(
                "Material '{}': {:?} is {:?}, expected {:?}",
                material.name,
                path,
                found,
                expected
            ),
            (Err(_), Some(expected)) => tracing::warn!(
                "Material '{}': {:?} is not a recognizable {:?} image",
                material.name,
                path,
                expected
            ),
            _ => {}
        }
        Ok(Some(bytes))
    }
}

/// Converts source images to VTF with the external VTFCmd tool
pub struct VtfCmdResolver {
    root: PathBuf,
    tool: PathBuf,
}

impl VtfCmdResolver {
    pub fn new(root: impl Into<PathBuf>, tool: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            tool: tool.into(),
        }
    }

    fn convert(&self, material: &Material, source: &Path) -> Result<Vec<u8>, ResourceError> {
        let read_error = |path: &Path, source: std::io::Error| ResourceError::Read {
            material: material.name.clone(),
            path: path.to_path_buf(),
            source,
        };

        let work = tempfile::tempdir().map_err(|e| read_error(source, e))?;
        let status = Command::new(&self.tool)
            .arg("-file")
            .arg(source)
            .arg("-output")
            .arg(work.path())
            .args(["-format", "dxt1"])
            .args(["-alphaformat", "dxt1_onebitalpha"])
            .args(["-nothumbnail", "-noreflectivity", "-nomipmaps"])
            .stdout(Stdio::null())
            .status()
            .map_err(|source| ResourceError::Launch {
                material: material.name.clone(),
                tool: self.tool.clone(),
                source,
            })?;

        if !status.success() {
            return Err(ResourceError::ToolFailed {
                material: material.name.clone(),
                tool: self.tool.clone(),
                path: source.to_path_buf(),
                status,
            });
        }

        let stem = source.file_stem().unwrap_or(source.as_os_str());
        let output = work.path().join(stem).with_extension("vtf");
        std::fs::read(&output).map_err(|e| read_error(&output, e))
    }
}

impl ImageResolver for VtfCmdResolver {
    fn resolve(
        &self,
        material: &Material,
        slot: ImageSlot,
    ) -> Result<Option<Vec<u8>>, ResourceError> {
        match slot.path(material) {
            Some(relative) => self.convert(material, &self.root.join(relative)).map(Some),
            None => Ok(None),
        }
    }
}

/// Result of texture encoding
#[derive(Debug, Clone, Default)]
pub struct ConvertedTextures {
    pub records: Vec<TextureRecord>,
    /// Material index -> texture record index
    pub by_material: HashMap<usize, i8>,
}

/// Materials used by the given meshes, in first-encounter order
pub fn referenced_materials(scene: &SceneModel, meshes: &[usize]) -> Vec<usize> {
    let mut seen = HashSet::new();
    meshes
        .iter()
        .flat_map(|&m| &scene.meshes[m].triangles)
        .filter_map(|t| t.material)
        .filter(|&m| seen.insert(m))
        .collect()
}

/// Resolve one slot, downgrading failures to "no image"
fn resolve_slot(
    resolver: &dyn ImageResolver,
    material: &Material,
    slot: ImageSlot,
) -> Option<Vec<u8>> {
    match resolver.resolve(material, slot) {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::warn!("{} ({:?} image skipped)", err, slot);
            None
        }
    }
}

/// Build one texture record per referenced material that has a base image
///
/// Resolution runs in parallel across materials; record order follows `referenced`.
pub fn encode_textures(
    scene: &SceneModel,
    referenced: &[usize],
    resolver: &dyn ImageResolver,
) -> Result<ConvertedTextures, ExportError> {
    let resolved: Vec<(usize, Option<Vec<u8>>, Option<Vec<u8>>)> = referenced
        .par_iter()
        .map(|&m| {
            let material = &scene.materials[m];
            let base = resolve_slot(resolver, material, ImageSlot::BaseColor);
            // Emission rides on the base record
            let emission = base
                .as_ref()
                .and_then(|_| resolve_slot(resolver, material, ImageSlot::Emission));
            (m, base, emission)
        })
        .collect();

    let mut out = ConvertedTextures::default();
    for (material, base, emission) in resolved {
        let Some(base) = base else {
            tracing::debug!(
                "Material '{}' has no base image",
                scene.materials[material].name
            );
            continue;
        };
        let index = out.records.len() + 1;
        if index > MAX_TEXTURES {
            return Err(ExportError::TooManyTextures { count: index });
        }
        out.by_material.insert(material, index as i8);
        out.records.push(TextureRecord {
            index: index as u32,
            name: scene.materials[material].name.clone(),
            base,
            emission,
        });
    }

    tracing::info!(
        "Textures: {} records from {} materials",
        out.records.len(),
        referenced.len()
    );
    Ok(out)
}
