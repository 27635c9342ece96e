//! Container header structures
//!
//! # Layout
//! ```text
//! Common prefix (12 bytes):
//! 0x00: tag u32
//! 0x04: version u32
//! 0x08: checksum i32
//!
//! Model header (68 bytes):
//! 0x0C: name [u8; 32]
//! 0x2C: bone_count u32
//! 0x30: bone_offset u32
//! 0x34: rigid_mesh_count u32
//! 0x38: rigid_mesh_offset u32
//! 0x3C: skinned_mesh_count u32
//! 0x40: skinned_mesh_offset u32
//!
//! Section header (20 bytes, texture / physics / animation):
//! 0x0C: count u32
//! 0x10: offset u32
//! ```

use super::bytes::{NAME_LEN, decode_name, encode_name};
use crate::format::ContainerFormat;

/// Tag, version and checksum shared by all four containers (12 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerHeader {
    pub tag: u32,
    pub version: u32,
    /// Random per-export correlation token
    pub checksum: i32,
}

impl ContainerHeader {
    pub const SIZE: usize = 12;

    pub fn new(format: &ContainerFormat, checksum: i32) -> Self {
        Self {
            tag: format.tag_u32(),
            version: format.version,
            checksum,
        }
    }

    /// Write header to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&self.tag.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.version.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.checksum.to_le_bytes());
        bytes
    }

    /// Read header from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        Some(Self {
            tag: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            version: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
            checksum: i32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]),
        })
    }
}

/// Primary (`.madl`) header (68 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelHeader {
    pub container: ContainerHeader,
    /// Asset name, UTF-8 NUL-padded
    pub name: [u8; NAME_LEN],
    pub bone_count: u32,
    pub bone_offset: u32,
    pub rigid_mesh_count: u32,
    pub rigid_mesh_offset: u32,
    pub skinned_mesh_count: u32,
    pub skinned_mesh_offset: u32,
}

impl ModelHeader {
    pub const SIZE: usize = 68;

    pub fn new(container: ContainerHeader, name: &str) -> Self {
        Self {
            container,
            name: encode_name(name),
            bone_count: 0,
            bone_offset: Self::SIZE as u32,
            rigid_mesh_count: 0,
            rigid_mesh_offset: Self::SIZE as u32,
            skinned_mesh_count: 0,
            skinned_mesh_offset: Self::SIZE as u32,
        }
    }

    pub fn name(&self) -> String {
        decode_name(&self.name)
    }

    /// Write header to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..12].copy_from_slice(&self.container.to_bytes());
        bytes[12..44].copy_from_slice(&self.name);
        let fields = [
            self.bone_count,
            self.bone_offset,
            self.rigid_mesh_count,
            self.rigid_mesh_offset,
            self.skinned_mesh_count,
            self.skinned_mesh_offset,
        ];
        for (i, field) in fields.iter().enumerate() {
            let at = 44 + i * 4;
            bytes[at..at + 4].copy_from_slice(&field.to_le_bytes());
        }
        bytes
    }

    /// Read header from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        let container = ContainerHeader::from_bytes(bytes)?;
        let mut name = [0u8; NAME_LEN];
        name.copy_from_slice(&bytes[12..44]);
        let field = |i: usize| {
            let at = 44 + i * 4;
            u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
        };
        Some(Self {
            container,
            name,
            bone_count: field(0),
            bone_offset: field(1),
            rigid_mesh_count: field(2),
            rigid_mesh_offset: field(3),
            skinned_mesh_count: field(4),
            skinned_mesh_offset: field(5),
        })
    }
}

/// Single-section header used by `.mtex`, `.mphy` and `.mani` (20 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionHeader {
    pub container: ContainerHeader,
    /// Number of records in the section
    pub count: u32,
    /// Absolute byte offset of the first record
    pub offset: u32,
}

impl SectionHeader {
    pub const SIZE: usize = 20;

    pub fn new(container: ContainerHeader, count: u32) -> Self {
        Self {
            container,
            count,
            offset: Self::SIZE as u32,
        }
    }

    /// Write header to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..12].copy_from_slice(&self.container.to_bytes());
        bytes[12..16].copy_from_slice(&self.count.to_le_bytes());
        bytes[16..20].copy_from_slice(&self.offset.to_le_bytes());
        bytes
    }

    /// Read header from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        Some(Self {
            container: ContainerHeader::from_bytes(bytes)?,
            count: u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]),
            offset: u32::from_le_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]),
        })
    }
}
