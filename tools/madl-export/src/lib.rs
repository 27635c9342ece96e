//! madl-export library
//!
//! Converts a captured character scene into the MADL container family
//! (.madl, .mtex, .mphy, .mani). Usable from other tools without the CLI.

pub mod animation;
pub mod classify;
pub mod error;
pub mod export;
pub mod formats;
pub mod inspect;
pub mod manifest;
pub mod mesh;
pub mod physics;
pub mod scene;
pub mod skeleton;
pub mod texture;

// Re-export container constants from madl-common
pub use madl_common::{ContainerFormat, ContainerKind, FORMAT_VERSION};

// Re-export the error model
pub use error::{ErrorKind, ExportError, ResourceError};

// Re-export the pipeline entry points
pub use export::{ExportOptions, ExportedAsset, export_to_files, export_to_memory};

// Re-export scene capture types
pub use scene::{SceneModel, load_scene};

// Re-export image resolution
pub use texture::{FileImageResolver, ImageResolver, ImageSlot, TextureFormat, VtfCmdResolver};
