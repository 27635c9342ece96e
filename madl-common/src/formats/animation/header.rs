//! Sequence header structure and operations

use crate::formats::bytes::{NAME_LEN, decode_name, encode_name};

/// Per-sequence header (41 bytes), followed by `frame_count` frames
///
/// Note: Not packed - we use explicit byte serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceHeader {
    pub index: u32,
    pub name: [u8; NAME_LEN],
    /// Number of frames that follow
    pub frame_count: u32,
    /// Playback rate
    pub fps: u8,
}

impl SequenceHeader {
    pub const SIZE: usize = 4 + NAME_LEN + 4 + 1;

    pub fn new(index: u32, name: &str, frame_count: u32, fps: u8) -> Self {
        Self {
            index,
            name: encode_name(name),
            frame_count,
            fps,
        }
    }

    pub fn name(&self) -> String {
        decode_name(&self.name)
    }

    /// Write header to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&self.index.to_le_bytes());
        bytes[4..36].copy_from_slice(&self.name);
        bytes[36..40].copy_from_slice(&self.frame_count.to_le_bytes());
        bytes[40] = self.fps;
        bytes
    }

    /// Read header from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        let mut name = [0u8; NAME_LEN];
        name.copy_from_slice(&bytes[4..36]);
        Some(Self {
            index: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            name,
            frame_count: u32::from_le_bytes([bytes[36], bytes[37], bytes[38], bytes[39]]),
            fps: bytes[40],
        })
    }

    /// Validate header
    pub fn validate(&self) -> bool {
        self.frame_count > 0 && self.fps > 0
    }
}
