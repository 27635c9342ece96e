//! Encoding and decoding functions for animation data

use super::types::{BoneDelta, CHANNEL_COUNT};
use half::f16;

// ============================================================================
// Half-Float (f16) Conversion
// ============================================================================

/// Convert f32 to f16 bits
#[inline]
pub fn f32_to_f16(value: f32) -> u16 {
    f16::from_f32(value).to_bits()
}

/// Convert f16 bits to f32
#[inline]
pub fn f16_to_f32(bits: u16) -> f32 {
    f16::from_bits(bits).to_f32()
}

// ============================================================================
// Sparse Channel Encoding
// ============================================================================

/// Encode one bone's per-channel deltas `[posX, posY, posZ, rotX, rotY, rotZ]`
///
/// A channel is present when its delta is non-zero after rounding to f16, so
/// deltas below the f16 range never set a bit. Returns `None` when nothing
/// changed, so the bone is omitted from the frame.
pub fn encode_bone_delta(bone: u8, delta: [f32; CHANNEL_COUNT]) -> Option<BoneDelta> {
    let mut mask = 0u8;
    let mut values = Vec::new();
    for (channel, &value) in delta.iter().enumerate() {
        let bits = f32_to_f16(value);
        // Both signed zeros count as unchanged
        if bits & 0x7FFF != 0 {
            mask |= 1 << channel;
            values.push(bits);
        }
    }
    (mask != 0).then_some(BoneDelta { mask, bone, values })
}

/// Expand a bone delta back to all six channels (absent channels are 0.0)
pub fn decode_bone_delta(delta: &BoneDelta) -> [f32; CHANNEL_COUNT] {
    let mut out = [0.0; CHANNEL_COUNT];
    let mut values = delta.values.iter();
    for (channel, slot) in out.iter_mut().enumerate() {
        if delta.mask & (1 << channel) != 0 {
            if let Some(&bits) = values.next() {
                *slot = f16_to_f32(bits);
            }
        }
    }
    out
}
