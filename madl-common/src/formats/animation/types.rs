//! Animation data types

use anyhow::{Context, Result, bail};

use super::header::SequenceHeader;
use crate::format::ANIMATION_FORMAT;
use crate::formats::bytes::ByteReader;
use crate::formats::check_container;
use crate::formats::header::SectionHeader;

/// Channel flag: position X changed
pub const CHANNEL_POS_X: u8 = 1 << 0;
/// Channel flag: position Y changed
pub const CHANNEL_POS_Y: u8 = 1 << 1;
/// Channel flag: position Z changed
pub const CHANNEL_POS_Z: u8 = 1 << 2;
/// Channel flag: rotation X (Euler) changed
pub const CHANNEL_ROT_X: u8 = 1 << 3;
/// Channel flag: rotation Y (Euler) changed
pub const CHANNEL_ROT_Y: u8 = 1 << 4;
/// Channel flag: rotation Z (Euler) changed
pub const CHANNEL_ROT_Z: u8 = 1 << 5;

/// All valid channel bits
pub const CHANNEL_MASK: u8 = 0b0011_1111;

/// Channels per bone (posX, posY, posZ, rotX, rotY, rotZ)
pub const CHANNEL_COUNT: usize = 6;

/// Frame number + changed bone count
pub const FRAME_HEADER_SIZE: usize = 4;

/// Changed channels of one bone in one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoneDelta {
    /// Which channels are present (`CHANNEL_*` bits)
    pub mask: u8,
    pub bone: u8,
    /// f16 bits of the present channels, in channel order
    pub values: Vec<u16>,
}

impl BoneDelta {
    pub fn encoded_len(&self) -> usize {
        2 + self.values.len() * 2
    }

    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.push(self.mask);
        out.push(self.bone);
        for value in &self.values {
            out.extend_from_slice(&value.to_le_bytes());
        }
    }

    pub fn read(r: &mut ByteReader) -> Option<Self> {
        let mask = r.u8()?;
        if mask & !CHANNEL_MASK != 0 || mask == 0 {
            return None;
        }
        let bone = r.u8()?;
        let values = (0..mask.count_ones())
            .map(|_| r.u16())
            .collect::<Option<Vec<_>>>()?;
        Some(Self { mask, bone, values })
    }
}

/// One frame of a sequence: only bones with at least one changed channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationFrame {
    pub frame: u16,
    pub deltas: Vec<BoneDelta>,
}

impl AnimationFrame {
    pub fn encoded_len(&self) -> usize {
        FRAME_HEADER_SIZE + self.deltas.iter().map(BoneDelta::encoded_len).sum::<usize>()
    }

    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.frame.to_le_bytes());
        out.extend_from_slice(&(self.deltas.len() as u16).to_le_bytes());
        for delta in &self.deltas {
            delta.write_to(out);
        }
    }

    pub fn read(r: &mut ByteReader) -> Option<Self> {
        let frame = r.u16()?;
        let count = r.u16()?;
        let deltas = (0..count)
            .map(|_| BoneDelta::read(r))
            .collect::<Option<Vec<_>>>()?;
        Some(Self { frame, deltas })
    }
}

/// A named clip of delta-encoded frames
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationSequence {
    pub index: u32,
    pub name: String,
    pub fps: u8,
    pub frames: Vec<AnimationFrame>,
}

impl AnimationSequence {
    pub fn header(&self) -> SequenceHeader {
        SequenceHeader::new(self.index, &self.name, self.frames.len() as u32, self.fps)
    }

    pub fn encoded_len(&self) -> usize {
        SequenceHeader::SIZE
            + self
                .frames
                .iter()
                .map(AnimationFrame::encoded_len)
                .sum::<usize>()
    }

    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.header().to_bytes());
        for frame in &self.frames {
            frame.write_to(out);
        }
    }

    pub fn read(r: &mut ByteReader) -> Result<Self> {
        let header = r
            .take(SequenceHeader::SIZE)
            .and_then(SequenceHeader::from_bytes)
            .context("Truncated sequence header")?;
        if !header.validate() {
            bail!(
                "Sequence {} '{}' has {} frames at {} fps",
                header.index,
                header.name(),
                header.frame_count,
                header.fps
            );
        }
        let mut frames = Vec::with_capacity(header.frame_count as usize);
        for i in 0..header.frame_count {
            let frame = AnimationFrame::read(r).with_context(|| {
                format!(
                    "Malformed frame {} in sequence {} '{}'",
                    i,
                    header.index,
                    header.name()
                )
            })?;
            frames.push(frame);
        }
        Ok(Self {
            index: header.index,
            name: header.name(),
            fps: header.fps,
            frames,
        })
    }
}

/// Fully decoded `.mani` file
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationFile {
    pub header: SectionHeader,
    pub sequences: Vec<AnimationSequence>,
}

impl AnimationFile {
    pub fn checksum(&self) -> i32 {
        self.header.container.checksum
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let header = SectionHeader::from_bytes(bytes).context("Truncated MANI header")?;
        check_container(&header.container, &ANIMATION_FORMAT)?;

        let mut r = ByteReader::at(bytes, header.offset as usize)
            .context("Sequence offset is past the end of the file")?;
        let sequences = (0..header.count)
            .map(|_| AnimationSequence::read(&mut r))
            .collect::<Result<Vec<_>>>()?;
        if r.remaining() != 0 {
            bail!("{} trailing bytes after the last sequence", r.remaining());
        }

        Ok(Self { header, sequences })
    }
}
