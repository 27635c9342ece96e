//! Shared types and utilities for MADL character assets
//!
//! This crate provides the binary container formats shared between:
//! - `madl-export` (asset pipeline)
//! - any runtime that loads the four companion files
//!
//! # Modules
//!
//! - [`format`] - Container constants (tags, versions, file extensions)
//! - [`formats`] - Headers, record types, and container decoding

pub mod format;
pub mod formats;

// Re-export container constants
pub use format::{
    ANIMATION_FORMAT, ContainerFormat, ContainerKind, FORMAT_VERSION, MODEL_FORMAT,
    PHYSICS_FORMAT, TEXTURE_FORMAT,
};

// Re-export commonly used format items
pub use formats::{
    AnimationFile, AnimationFrame, AnimationSequence, BONE_RECORD_SIZE, BoneDelta,
    BoneRecord, ByteReader, CHANNEL_COUNT, CHANNEL_MASK, CHANNEL_POS_X, CHANNEL_POS_Y,
    CHANNEL_POS_Z, CHANNEL_ROT_X, CHANNEL_ROT_Y, CHANNEL_ROT_Z, ContainerHeader, HullRecord,
    ModelFile, ModelHeader, NAME_LEN, NO_TEXTURE, PhysicsFile, RigidMeshRecord, RigidVertex,
    SectionHeader, SequenceHeader, SkinnedMeshRecord, SkinnedVertex, TextureFile, TextureRecord,
    decode_bone_delta, decode_name, encode_bone_delta, encode_name, f16_to_f32, f32_to_f16,
};
