//! MADL binary container formats
//!
//! Four companion files share one layout discipline:
//!
//! ```text
//! 0x00: tag u32        - ASCII tag read as little-endian ("MADL", "MTEX", "MPHY", "MANI")
//! 0x04: version u32
//! 0x08: checksum i32   - per-export correlation token, identical across the family
//! 0x0C: type-specific header (section counts and byte offsets)
//!       section payloads
//! ```
//!
//! All integers and floats are little-endian. Offsets are absolute from the start of the file.
//!
//! Fixed-size headers expose `SIZE`, `to_bytes()` and `from_bytes()`. Variable-length
//! records expose `encoded_len()`, `write_to()` and `read()`; whole files are decoded
//! with `*File::from_bytes`.

pub mod animation;
mod bytes;
mod header;
pub mod model;
pub mod physics;
pub mod texture;

pub use animation::*;
pub use bytes::{ByteReader, NAME_LEN, decode_name, encode_name};
pub use header::{ContainerHeader, ModelHeader, SectionHeader};
pub use model::*;
pub use physics::*;
pub use texture::*;

use anyhow::{Result, bail};

use crate::format::ContainerFormat;

/// Check the common prefix of a container against the expected format.
pub(crate) fn check_container(header: &ContainerHeader, format: &ContainerFormat) -> Result<()> {
    if header.tag != format.tag_u32() {
        bail!(
            "Not a {} container: tag {:?}, expected {:?}",
            format.extension,
            header.tag.to_le_bytes(),
            format.tag
        );
    }
    if header.version != format.version {
        bail!(
            "Unsupported {} version {} (expected {})",
            format.extension,
            header.version,
            format.version
        );
    }
    Ok(())
}

/// Validate a `recordLength` field against the bytes actually consumed.
pub(crate) fn check_record_length(
    what: &str,
    index: u32,
    declared: u32,
    consumed: usize,
) -> Result<()> {
    if declared as usize != consumed {
        bail!(
            "{} record {} declares {} bytes but occupies {}",
            what,
            index,
            declared,
            consumed
        );
    }
    Ok(())
}
