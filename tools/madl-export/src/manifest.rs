//! Manifest parsing and build orchestration
//!
//! Parses export.toml and drives one scene export. Relative paths in the
//! manifest are resolved against the manifest's directory.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::export::{ExportOptions, export_to_files};
use crate::physics::DEFAULT_PHYSICS_MARKER;
use crate::scene::load_scene;
use crate::texture::{FileImageResolver, ImageResolver, TextureFormat, VtfCmdResolver};

/// Root manifest structure
#[derive(Debug, Deserialize)]
pub struct Manifest {
    pub scene: SceneEntry,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub textures: TextureConfig,
    /// Directory the manifest was loaded from
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct SceneEntry {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    /// Output file stem; defaults to the scene file stem
    #[serde(default)]
    pub stem: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            stem: None,
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("build/")
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub textures: bool,
    pub physics: bool,
    pub animation: bool,
    pub physics_marker: String,
    pub fps: Option<u8>,
    pub checksum: Option<i32>,
}

impl Default for ExportConfig {
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

impl ExportConfig {
    pub fn options(&self) -> ExportOptions {
        ExportOptions {
            textures: self.textures,
            physics: self.physics,
            animation: self.animation,
            physics_marker: self.physics_marker.clone(),
            fps: self.fps,
            checksum: self.checksum,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TextureConfig {
    #[serde(default)]
    pub format: TextureFormat,
    /// VTFCmd executable, required for `format = "vtf"`
    #[serde(default)]
    pub vtfcmd: Option<PathBuf>,
}

impl Manifest {
    pub fn scene_path(&self) -> PathBuf {
        self.base_dir.join(&self.scene.path)
    }

    /// Directory image paths in the scene are relative to
    pub fn scene_dir(&self) -> PathBuf {
        self.scene_path()
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    pub fn output_dir(&self, output_override: Option<&Path>) -> PathBuf {
        match output_override {
            Some(dir) => dir.to_path_buf(),
            None => self.base_dir.join(&self.output.dir),
        }
    }

    pub fn stem(&self) -> String {
        self.output.stem.clone().unwrap_or_else(|| scene_stem(&self.scene.path))
    }

    /// Image resolver for the configured texture format
    pub fn resolver(&self) -> Result<Box<dyn ImageResolver>> {
        let root = self.scene_dir();
        let resolver: Box<dyn ImageResolver> = match self.textures.format {
            TextureFormat::Vtf => {
                let tool = self
                    .textures
                    .vtfcmd
                    .as_ref()
                    .context("textures.format = \"vtf\" requires textures.vtfcmd")?;
                Box::new(VtfCmdResolver::new(root, self.base_dir.join(tool)))
            }
            format => Box::new(FileImageResolver::new(root, format)),
        };
        Ok(resolver)
    }
}

/// File stem of a scene path, without a trailing `.scene`
pub fn scene_stem(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "asset".to_string());
    match stem.strip_suffix(".scene") {
        Some(base) if !base.is_empty() => base.to_string(),
        _ => stem,
    }
}

/// Load and parse a manifest file
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest: {:?}", path))?;
    let mut manifest: Manifest = toml::from_str(&content)
        .with_context(|| format!("Failed to parse manifest: {:?}", path))?;
    manifest.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    Ok(manifest)
}

/// Validate a manifest without building
pub fn validate(manifest: &Manifest) -> Result<()> {
    let scene = manifest.scene_path();
    if !scene.exists() {
        anyhow::bail!("Scene source not found: {:?}", scene);
    }
    if manifest.export.fps == Some(0) {
        anyhow::bail!("export.fps must be greater than 0");
    }
    if manifest.export.physics && manifest.export.physics_marker.is_empty() {
        tracing::warn!(
            "export.physics_marker is empty, only meshes with role \"physics\" qualify"
        );
    }
    if manifest.textures.format == TextureFormat::Vtf {
        match &manifest.textures.vtfcmd {
            None => anyhow::bail!("textures.format = \"vtf\" requires textures.vtfcmd"),
            Some(tool) if !manifest.base_dir.join(tool).exists() => {
                anyhow::bail!("VTFCmd not found: {:?}", tool)
            }
            Some(_) => {}
        }
    }
    Ok(())
}

/// Export the manifest's scene
pub fn build(manifest: &Manifest, output_override: Option<&Path>) -> Result<Vec<PathBuf>> {
    let scene_path = manifest.scene_path();
    tracing::info!("Exporting scene: {:?}", scene_path);
    let scene = load_scene(&scene_path)?;
    let resolver = manifest.resolver()?;

    export_to_files(
        &scene,
        resolver.as_ref(),
        &manifest.export.options(),
        &manifest.output_dir(output_override),
        &manifest.stem(),
    )
    .with_context(|| format!("Export of {:?} failed", scene_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_minimal_manifest_defaults() {
        let manifest: Manifest = toml::from_str("[scene]\npath = \"hero.scene.json\"\n").unwrap();
        assert_eq!(manifest.output.dir, PathBuf::from("build/"));
        assert!(manifest.export.textures);
        assert!(!manifest.export.physics);
        assert!(manifest.export.animation);
        assert_eq!(manifest.export.physics_marker, "phy");
        assert_eq!(manifest.textures.format, TextureFormat::Png);
        assert_eq!(manifest.stem(), "hero");
    }

    #[test]
    fn test_full_manifest() {
        let source = r#"
            [scene]
            path = "scenes/hero.json"

            [output]
            dir = "out"
            stem = "character"

            [export]
            physics = true
            fps = 24
            checksum = -5

            [textures]
            format = "vtf"
            vtfcmd = "tools/VTFCmd.exe"
        "#;
        let manifest: Manifest = toml::from_str(source).unwrap();
        assert_eq!(manifest.stem(), "character");
        assert_eq!(manifest.output_dir(None), PathBuf::from("out"));
        assert_eq!(
            manifest.output_dir(Some(Path::new("elsewhere"))),
            PathBuf::from("elsewhere")
        );

        let options = manifest.export.options();
        assert!(options.physics && options.textures);
        assert_eq!(options.fps, Some(24));
        assert_eq!(options.checksum, Some(-5));
        assert_eq!(manifest.textures.format, TextureFormat::Vtf);
    }

    #[test]
    fn test_scene_stem() {
        assert_eq!(scene_stem(Path::new("a/hero.scene.json")), "hero");
        assert_eq!(scene_stem(Path::new("hero.json")), "hero");
        assert_eq!(scene_stem(Path::new(".scene.json")), ".scene");
    }

    #[test]
    fn test_load_resolves_relative_to_manifest() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("export.toml");
        std::fs::write(&path, "[scene]\npath = \"hero.json\"\n").unwrap();

        let manifest = load_manifest(&path).unwrap();
        assert_eq!(manifest.scene_path(), dir.path().join("hero.json"));
        assert_eq!(manifest.output_dir(None), dir.path().join("build/"));

        // Scene does not exist yet
        assert!(validate(&manifest).is_err());
        std::fs::write(dir.path().join("hero.json"), "{}").unwrap();
        assert!(validate(&manifest).is_ok());
    }

    #[test]
    fn test_vtf_requires_tool() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("hero.json"), "{}").unwrap();
        let path = dir.path().join("export.toml");
        std::fs::write(
            &path,
            "[scene]\npath = \"hero.json\"\n[textures]\nformat = \"vtf\"\n",
        )
        .unwrap();

        let manifest = load_manifest(&path).unwrap();
        assert!(validate(&manifest).is_err());
        assert!(manifest.resolver().is_err());
    }

    #[test]
    fn test_malformed_manifest() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("export.toml");
        std::fs::write(&path, "[output]\ndir = \"x\"\n").unwrap();
        assert!(load_manifest(&path).is_err());
    }
}
