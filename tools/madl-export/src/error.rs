//! Export error types
//!
//! Fatal failures are [`ExportError`]s and abort the export before any file is
//! written. Per-material image failures are [`ResourceError`]s, which the texture
//! encoder downgrades to warnings.

use std::path::PathBuf;
use std::process::ExitStatus;

/// Broad classification of an export failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The scene does not describe a single, well-bound character
    Configuration,
    /// An image or external tool could not produce texture data
    Resource,
    /// Scene data is internally inconsistent or overflows the format
    Integrity,
}

/// Fatal export failure
#[derive(Debug, Clone, thiserror::Error)]
pub enum ExportError {
    #[error("No armature in scene")]
    NoArmature,

    #[error("Scene has {} armatures ({}), exactly one is required", .names.len(), .names.join(", "))]
    MultipleArmatures { names: Vec<String> },

    #[error("No physics proxy mesh (role \"physics\" or name containing '{marker}')")]
    MissingPhysicsProxy { marker: String },

    #[error("Multiple physics proxy meshes: {}", .names.join(", "))]
    DuplicatePhysicsProxy { names: Vec<String> },

    #[error("Vertex group '{group}' on mesh '{mesh}' does not match any bone")]
    UnboundVertexGroup { mesh: String, group: String },

    #[error("Bone '{bone}' has parent {parent}, which is not an earlier bone")]
    InvalidParent { bone: String, parent: usize },

    #[error("Armature '{armature}' has {count} bones, but maximum is {max}")]
    TooManyBones {
        armature: String,
        count: usize,
        max: usize,
    },

    #[error("Mesh '{mesh}': {what} index {index} out of range (have {len})")]
    IndexOutOfRange {
        mesh: String,
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Mesh '{mesh}': vertex {vertex} has {count} influences, but maximum is 255")]
    TooManyInfluences {
        mesh: String,
        vertex: usize,
        count: usize,
    },

    #[error("{count} texture records, but a mesh can only reference 127")]
    TooManyTextures { count: usize },

    #[error("Animation '{track}': {reason}")]
    MalformedTrack { track: String, reason: String },
}

impl ExportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoArmature
            | Self::MultipleArmatures { .. }
            | Self::MissingPhysicsProxy { .. }
            | Self::DuplicatePhysicsProxy { .. }
            | Self::UnboundVertexGroup { .. } => ErrorKind::Configuration,
            Self::InvalidParent { .. }
            | Self::TooManyBones { .. }
            | Self::IndexOutOfRange { .. }
            | Self::TooManyInfluences { .. }
            | Self::TooManyTextures { .. }
            | Self::MalformedTrack { .. } => ErrorKind::Integrity,
        }
    }

    pub(crate) fn malformed_track(track: &str, reason: impl Into<String>) -> Self {
        Self::MalformedTrack {
            track: track.to_string(),
            reason: reason.into(),
        }
    }
}

/// Failure to produce image bytes for one material slot
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("Material '{material}': failed to read {path:?}: {source}")]
    Read {
        material: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Material '{material}': failed to run {tool:?}: {source}")]
    Launch {
        material: String,
        tool: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Material '{material}': {tool:?} exited with {status} converting {path:?}")]
    ToolFailed {
        material: String,
        tool: PathBuf,
        path: PathBuf,
        status: ExitStatus,
    },
}

impl ResourceError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Resource
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(ExportError::NoArmature.kind(), ErrorKind::Configuration);
        assert_eq!(
            ExportError::UnboundVertexGroup {
                mesh: "body".into(),
                group: "tail".into()
            }
            .kind(),
            ErrorKind::Configuration
        );
        assert_eq!(
            ExportError::TooManyTextures { count: 128 }.kind(),
            ErrorKind::Integrity
        );
    }

    #[test]
    fn test_messages_name_the_entity() {
        let err = ExportError::UnboundVertexGroup {
            mesh: "body".into(),
            group: "tail".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("body"));
        assert!(msg.contains("tail"));

        let err = ExportError::MultipleArmatures {
            names: vec!["a".into(), "b".into()],
        };
        assert_eq!(
            err.to_string(),
            "Scene has 2 armatures (a, b), exactly one is required"
        );
    }
}
