//! Export pipeline (scene -> four in-memory containers)
//!
//! Texture, physics and animation encoding are independent and run in parallel;
//! the geometry encoder waits for the texture index map. Nothing touches disk
//! until every container has been built.

use anyhow::{Context, Result};
use hashbrown::HashMap;
use std::path::{Path, PathBuf};

use crate::animation::encode_animations;
use crate::classify::classify;
use crate::formats::{
    write_madl_animation, write_madl_model, write_madl_physics, write_madl_textures,
};
use crate::mesh::encode_geometry;
use crate::physics::{DEFAULT_PHYSICS_MARKER, encode_physics, find_physics_proxy};
use crate::scene::SceneModel;
use crate::skeleton::encode_skeleton;
use crate::texture::{ConvertedTextures, ImageResolver, encode_textures, referenced_materials};
use madl_common::{ANIMATION_FORMAT, MODEL_FORMAT, PHYSICS_FORMAT, TEXTURE_FORMAT};

/// What to produce besides the model container
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Write `.mtex` and bind mesh texture indices
    pub textures: bool,
    /// Write `.mphy` from the collision proxy (which is then left out of geometry)
    pub physics: bool,
    /// Write `.mani` when the scene has tracks
    pub animation: bool,
    /// Name fragment identifying the collision proxy
    pub physics_marker: String,
    /// Overrides the scene frame rate
    pub fps: Option<u8>,
    /// Fixed checksum; random when `None`
    pub checksum: Option<i32>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            textures: true,
            physics: false,
            animation: true,
            physics_marker: DEFAULT_PHYSICS_MARKER.to_string(),
            fps: None,
            checksum: None,
        }
    }
}

/// All containers of one export, fully encoded
#[derive(Debug, Clone)]
pub struct ExportedAsset {
    /// Armature name, stored in the model header
    pub name: String,
    /// Correlation token shared by every container
    pub checksum: i32,
    pub model: Vec<u8>,
    pub textures: Option<Vec<u8>>,
    pub physics: Option<Vec<u8>>,
    pub animation: Option<Vec<u8>>,
}

impl ExportedAsset {
    /// Containers that were produced, with their file extensions
    pub fn containers(&self) -> Vec<(&'static str, &[u8])> {
        let mut out = vec![(MODEL_FORMAT.extension, self.model.as_slice())];
        for (extension, bytes) in [
            (TEXTURE_FORMAT.extension, &self.textures),
            (PHYSICS_FORMAT.extension, &self.physics),
            (ANIMATION_FORMAT.extension, &self.animation),
        ] {
            if let Some(bytes) = bytes {
                out.push((extension, bytes.as_slice()));
            }
        }
        out
    }

    /// Write `<stem>.<ext>` for every container into `dir`
    pub fn write_files(&self, dir: &Path, stem: &str) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {:?}", dir))?;

        let mut written = Vec::new();
        for (extension, bytes) in self.containers() {
            let path = dir.join(format!("{}.{}", stem, extension));
            std::fs::write(&path, bytes)
                .with_context(|| format!("Failed to write {:?}", path))?;
            tracing::info!("  -> {:?} ({} bytes)", path, bytes.len());
            written.push(path);
        }
        Ok(written)
    }
}

/// Run the whole pipeline in memory
///
/// Fatal scene problems surface as [`crate::ExportError`] inside the `anyhow`
/// error; use `downcast_ref` to inspect the kind.
pub fn export_to_memory(
    scene: &SceneModel,
    resolver: &dyn ImageResolver,
    options: &ExportOptions,
) -> Result<ExportedAsset> {
    let checksum = options.checksum.unwrap_or_else(rand::random::<i32>);
    let armature = scene.armature()?;
    let bones = encode_skeleton(armature)?;

    let proxy = if options.physics {
        Some(find_physics_proxy(&scene.meshes, &options.physics_marker)?)
    } else {
        None
    };
    let render_meshes: Vec<usize> = (0..scene.meshes.len())
        .filter(|&i| Some(i) != proxy)
        .collect();
    let classified = classify(scene, armature, &render_meshes)?;

    let fps = options.fps.unwrap_or(scene.fps);
    let export_animation = options.animation && !scene.animations.is_empty();

    let (textures, (hulls, sequences)) = rayon::join(
        || {
            options
                .textures
                .then(|| {
                    let referenced = referenced_materials(scene, &render_meshes);
                    encode_textures(scene, &referenced, resolver)
                })
                .transpose()
        },
        || {
            rayon::join(
                || {
                    proxy
                        .map(|p| encode_physics(&scene.meshes[p], armature))
                        .transpose()
                },
                || {
                    export_animation
                        .then(|| encode_animations(&scene.animations, armature, fps))
                        .transpose()
                },
            )
        },
    );
    let textures = textures?;
    let hulls = hulls?;
    let sequences = sequences?;

    let empty = ConvertedTextures::default();
    let texture_map: &HashMap<usize, i8> = &textures.as_ref().unwrap_or(&empty).by_material;
    let geometry = encode_geometry(scene, &classified, texture_map);

    let mut model = Vec::new();
    write_madl_model(
        &mut model,
        checksum,
        &armature.name,
        &bones,
        &geometry.rigid,
        &geometry.skinned,
    )?;
    tracing::info!(
        "Model '{}': {} bones, {} rigid meshes, {} skinned meshes",
        armature.name,
        bones.len(),
        geometry.rigid.len(),
        geometry.skinned.len()
    );

    let textures = textures
        .map(|t| -> Result<Vec<u8>> {
            let mut out = Vec::new();
            write_madl_textures(&mut out, checksum, &t.records)?;
            Ok(out)
        })
        .transpose()?;
    let physics = hulls
        .map(|h| -> Result<Vec<u8>> {
            let mut out = Vec::new();
            write_madl_physics(&mut out, checksum, &h)?;
            Ok(out)
        })
        .transpose()?;
    let animation = sequences
        .map(|s| -> Result<Vec<u8>> {
            let mut out = Vec::new();
            write_madl_animation(&mut out, checksum, &s)?;
            Ok(out)
        })
        .transpose()?;

    Ok(ExportedAsset {
        name: armature.name.clone(),
        checksum,
        model,
        textures,
        physics,
        animation,
    })
}

/// Export and write `<stem>.madl` and companions into `dir`
pub fn export_to_files(
    scene: &SceneModel,
    resolver: &dyn ImageResolver,
    options: &ExportOptions,
    dir: &Path,
    stem: &str,
) -> Result<Vec<PathBuf>> {
    let asset = export_to_memory(scene, resolver, options)?;
    tracing::info!("Writing '{}' (checksum {})", stem, asset.checksum);
    asset.write_files(dir, stem)
}
