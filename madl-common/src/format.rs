//! Container format descriptors for MADL character assets.
//!
//! This module defines the `ContainerFormat` struct which serves as the single source of truth
//! for all container constants (tags, version, file extensions, header sizes).
//!
//! # Example
//!
//! ```
//! use madl_common::MODEL_FORMAT;
//!
//! assert_eq!(MODEL_FORMAT.extension, "madl");
//! assert_eq!(MODEL_FORMAT.tag, b"MADL");
//! assert_eq!(MODEL_FORMAT.tag_u32(), 1279541581);
//! ```

/// Version written into every container header.
pub const FORMAT_VERSION: u32 = 1;

/// Descriptor for one of the four companion containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerFormat {
    /// Which container this is
    pub kind: ContainerKind,

    /// ASCII tag at the start of the file, read as a little-endian u32
    pub tag: &'static [u8; 4],

    /// Format version for backward compatibility
    pub version: u32,

    /// File extension without dot (e.g., "madl")
    pub extension: &'static str,

    /// Size of the fixed header in bytes (first section starts here)
    pub header_size: usize,
}

/// The four companion containers produced by one export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// Skeleton + rigid/skinned geometry
    Model,
    /// Texture payloads
    Texture,
    /// Physics hull point sets
    Physics,
    /// Delta-encoded animation sequences
    Animation,
}

impl ContainerFormat {
    const fn new(
        kind: ContainerKind,
        tag: &'static [u8; 4],
        extension: &'static str,
        header_size: usize,
    ) -> Self {
        Self {
            kind,
            tag,
            version: FORMAT_VERSION,
            extension,
            header_size,
        }
    }

    /// Tag as the little-endian integer stored in the file.
    pub const fn tag_u32(&self) -> u32 {
        u32::from_le_bytes(*self.tag)
    }

    /// Look up a format by the tag found at the start of a file.
    pub fn from_tag(tag: u32) -> Option<&'static ContainerFormat> {
        ContainerKind::ALL
            .iter()
            .map(|kind| kind.format())
            .find(|format| format.tag_u32() == tag)
    }
}

impl ContainerKind {
    /// All container kinds in file-family order.
    pub const ALL: [ContainerKind; 4] = [
        ContainerKind::Model,
        ContainerKind::Texture,
        ContainerKind::Physics,
        ContainerKind::Animation,
    ];

    pub const fn format(self) -> &'static ContainerFormat {
        match self {
            ContainerKind::Model => &MODEL_FORMAT,
            ContainerKind::Texture => &TEXTURE_FORMAT,
            ContainerKind::Physics => &PHYSICS_FORMAT,
            ContainerKind::Animation => &ANIMATION_FORMAT,
        }
    }
}

/// Skeleton/geometry container: `.madl`, tag `MADL`, 68-byte header.
pub const MODEL_FORMAT: ContainerFormat =
    ContainerFormat::new(ContainerKind::Model, b"MADL", "madl", 68);

/// Texture container: `.mtex`, tag `MTEX`, 20-byte header.
pub const TEXTURE_FORMAT: ContainerFormat =
    ContainerFormat::new(ContainerKind::Texture, b"MTEX", "mtex", 20);

/// Physics hull container: `.mphy`, tag `MPHY`, 20-byte header.
pub const PHYSICS_FORMAT: ContainerFormat =
    ContainerFormat::new(ContainerKind::Physics, b"MPHY", "mphy", 20);

/// Animation container: `.mani`, tag `MANI`, 20-byte header.
pub const ANIMATION_FORMAT: ContainerFormat =
    ContainerFormat::new(ContainerKind::Animation, b"MANI", "mani", 20);
