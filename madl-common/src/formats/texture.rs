//! MADL texture container (.mtex)
//!
//! One record per unique material with a resolvable base image. Image payloads are
//! opaque encoded bytes (PNG, JPEG, VTF) and are never transcoded.
//!
//! # Layout
//! ```text
//! Header (20 bytes)          - see SectionHeader
//! Textures[count]:
//!   record_length u32        - 49 + base_length + emission_length
//!   index u32
//!   name [u8; 32]
//!   base_length u32
//!   base [u8; base_length]
//!   has_emission u8
//!   emission_length u32
//!   emission [u8; emission_length]
//! ```

use anyhow::{Context, Result};

use super::bytes::{ByteReader, NAME_LEN, encode_name};
use super::header::SectionHeader;
use super::{check_container, check_record_length};
use crate::format::TEXTURE_FORMAT;

/// Fixed part of a texture record (everything except the two payloads)
pub const TEXTURE_RECORD_FIXED_SIZE: usize = 4 + 4 + NAME_LEN + 4 + 1 + 4;

/// Base-color image plus optional emission image for one material
#[derive(Debug, Clone, PartialEq)]
pub struct TextureRecord {
    pub index: u32,
    pub name: String,
    /// Encoded base-color image bytes
    pub base: Vec<u8>,
    /// Encoded emission image bytes, if the material has one
    pub emission: Option<Vec<u8>>,
}

impl TextureRecord {
    pub fn encoded_len(&self) -> usize {
        TEXTURE_RECORD_FIXED_SIZE + self.base.len() + self.emission.as_ref().map_or(0, Vec::len)
    }

    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&(self.encoded_len() as u32).to_le_bytes());
        out.extend_from_slice(&self.index.to_le_bytes());
        out.extend_from_slice(&encode_name(&self.name));
        out.extend_from_slice(&(self.base.len() as u32).to_le_bytes());
        out.extend_from_slice(&self.base);
        match &self.emission {
            Some(emission) => {
                out.push(1);
                out.extend_from_slice(&(emission.len() as u32).to_le_bytes());
                out.extend_from_slice(emission);
            }
            None => {
                out.push(0);
                out.extend_from_slice(&0u32.to_le_bytes());
            }
        }
    }

    pub fn read(r: &mut ByteReader) -> Result<Self> {
        let start = r.position();
        let record_length = r.u32().context("Truncated texture record")?;
        let index = r.u32().context("Truncated texture record")?;
        let record = (|| {
            let name = r.name()?;
            let base = r.byte_run()?;
            let has_emission = r.u8()? != 0;
            let emission = r.byte_run()?;
            Some(Self {
                index,
                name,
                base,
                emission: has_emission.then_some(emission),
            })
        })()
        .with_context(|| format!("Truncated texture record {}", index))?;
        check_record_length("Texture", index, record_length, r.position() - start)?;
        Ok(record)
    }
}

/// Fully decoded `.mtex` file
#[derive(Debug, Clone, PartialEq)]
pub struct TextureFile {
    pub header: SectionHeader,
    pub textures: Vec<TextureRecord>,
}

impl TextureFile {
    pub fn checksum(&self) -> i32 {
        self.header.container.checksum
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let header = SectionHeader::from_bytes(bytes).context("Truncated MTEX header")?;
        check_container(&header.container, &TEXTURE_FORMAT)?;

        let mut r = ByteReader::at(bytes, header.offset as usize)
            .context("Texture offset is past the end of the file")?;
        let textures = (0..header.count)
            .map(|_| TextureRecord::read(&mut r))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { header, textures })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_size() {
        assert_eq!(TEXTURE_RECORD_FIXED_SIZE, 49);
    }

    #[test]
    fn test_payload_bytes_are_verbatim() {
        // PNG signature contains bytes >= 0x80 that a text round-trip would expand
        let png_signature = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        let record = TextureRecord {
            index: 1,
            name: "skin".into(),
            base: png_signature.clone(),
            emission: None,
        };
        let mut out = Vec::new();
        record.write_to(&mut out);
        assert_eq!(out.len(), 49 + 8);
        assert_eq!(&out[44..52], png_signature.as_slice());

        let parsed = TextureRecord::read(&mut ByteReader::new(&out)).unwrap();
        assert_eq!(parsed.base, png_signature);
        assert_eq!(parsed.emission, None);
    }

    #[test]
    fn test_emission_roundtrip() {
        let record = TextureRecord {
            index: 2,
            name: "visor".into(),
            base: vec![0xFF; 16],
            emission: Some(vec![0xC3, 0xA9, 0x00]),
        };
        let mut out = Vec::new();
        record.write_to(&mut out);
        assert_eq!(out.len(), record.encoded_len());
        assert_eq!(out[44 + 16], 1);

        let parsed = TextureRecord::read(&mut ByteReader::new(&out)).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_truncated_payload() {
        let record = TextureRecord {
            index: 3,
            name: "t".into(),
            base: vec![1; 32],
            emission: None,
        };
        let mut out = Vec::new();
        record.write_to(&mut out);
        out.truncate(60);
        let err = TextureRecord::read(&mut ByteReader::new(&out)).unwrap_err();
        assert!(err.to_string().contains("record 3"));
    }
}
