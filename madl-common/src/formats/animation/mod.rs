//! MADL animation container (.mani)
//!
//! Sparse, delta-encoded bone tracks with half-precision channel values.
//!
//! # Layout
//! ```text
//! Header (20 bytes)             - see SectionHeader (count = sequence count)
//! Sequences[count]:
//!   index u32
//!   name [u8; 32]
//!   frame_count u32
//!   fps u8
//!   Frames[frame_count]:
//!     frame_number u16
//!     changed_bone_count u16
//!     Entries[changed_bone_count]:
//!       change_mask u8          - bit per channel: posX posY posZ rotX rotY rotZ
//!       bone_index u8
//!       values f16 × popcount(change_mask), in channel order
//! ```
//!
//! Each entry stores the difference from the previous frame's sample; the first frame
//! is relative to the rest pose. Bones whose channels are all unchanged are omitted.

mod encoding;
mod header;
mod types;


// Re-export public API
pub use encoding::{decode_bone_delta, encode_bone_delta, f16_to_f32, f32_to_f16};
pub use header::SequenceHeader;
pub use types::{
    AnimationFile, AnimationFrame, AnimationSequence, BoneDelta, CHANNEL_COUNT, CHANNEL_MASK,
    CHANNEL_POS_X, CHANNEL_POS_Y, CHANNEL_POS_Z, CHANNEL_ROT_X, CHANNEL_ROT_Y, CHANNEL_ROT_Z,
    FRAME_HEADER_SIZE,
};
