//! MADL physics hull container (.mphy)
//!
//! Position-only point sets, one per bone, to be fed to a convex-hull builder.
//!
//! # Layout
//! ```text
//! Header (20 bytes)          - see SectionHeader
//! Hulls[count]:
//!   record_length u32        - 73 + 12 × point_count
//!   index u32
//!   name [u8; 32]
//!   is_parented u8
//!   bone_index u32
//!   position f32×3           - offset from the bone, zero at export
//!   angle f32×3
//!   point_count u32
//!   points [f32×3; point_count] (bone-local)
//! ```

use anyhow::{Context, Result};

use super::bytes::{ByteReader, NAME_LEN, encode_name, put_f32s};
use super::header::SectionHeader;
use super::{check_container, check_record_length};
use crate::format::PHYSICS_FORMAT;

/// Fixed part of a hull record (everything except the points)
pub const HULL_RECORD_FIXED_SIZE: usize = 4 + 4 + NAME_LEN + 1 + 4 + 12 + 12 + 4;

/// Convex point set bound to one bone
#[derive(Debug, Clone, PartialEq)]
pub struct HullRecord {
    pub index: u32,
    pub name: String,
    pub bone_index: u32,
    pub position: [f32; 3],
    pub angle: [f32; 3],
    /// Bone-local points
    pub points: Vec<[f32; 3]>,
}

impl HullRecord {
    pub fn encoded_len(&self) -> usize {
        HULL_RECORD_FIXED_SIZE + self.points.len() * 12
    }

    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&(self.encoded_len() as u32).to_le_bytes());
        out.extend_from_slice(&self.index.to_le_bytes());
        out.extend_from_slice(&encode_name(&self.name));
        out.push(1); // is_parented
        out.extend_from_slice(&self.bone_index.to_le_bytes());
        put_f32s(out, &self.position);
        put_f32s(out, &self.angle);
        out.extend_from_slice(&(self.points.len() as u32).to_le_bytes());
        for point in &self.points {
            put_f32s(out, point);
        }
    }

    pub fn read(r: &mut ByteReader) -> Result<Self> {
        let start = r.position();
        let record_length = r.u32().context("Truncated hull record")?;
        let index = r.u32().context("Truncated hull record")?;
        let record = (|| {
            let name = r.name()?;
            let _is_parented = r.u8()?;
            let bone_index = r.u32()?;
            let position = r.vec3()?;
            let angle = r.vec3()?;
            let count = r.u32()? as usize;
            let points = (0..count).map(|_| r.vec3()).collect::<Option<Vec<_>>>()?;
            Some(Self {
                index,
                name,
                bone_index,
                position,
                angle,
                points,
            })
        })()
        .with_context(|| format!("Truncated hull record {}", index))?;
        check_record_length("Hull", index, record_length, r.position() - start)?;
        Ok(record)
    }
}

/// Fully decoded `.mphy` file
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicsFile {
    pub header: SectionHeader,
    pub hulls: Vec<HullRecord>,
}

impl PhysicsFile {
    pub fn checksum(&self) -> i32 {
        self.header.container.checksum
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let header = SectionHeader::from_bytes(bytes).context("Truncated MPHY header")?;
        check_container(&header.container, &PHYSICS_FORMAT)?;

        let mut r = ByteReader::at(bytes, header.offset as usize)
            .context("Hull offset is past the end of the file")?;
        let hulls = (0..header.count)
            .map(|_| HullRecord::read(&mut r))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { header, hulls })
    }
}
