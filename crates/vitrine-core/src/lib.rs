//! Vitrine Core - Foundational types for the Vitrine showcase
//!
//! This crate provides the types every other Vitrine crate depends on:
//! - `Vec3`, `Transform`, `Aabb` - Spatial types and column-major matrix helpers
//! - `ContentHash` - SHA-256 hashing of loaded asset bytes
//! - `ShowcaseConfig` - TOML configuration with defaults for every field
//! - `CharacterSlot` - the fixed index space of the three characters
//! - Error types and Result alias

mod config;
mod error;
mod hash;
mod slot;
mod types;

pub use config::{
    BackgroundConfig, CameraConfig, CharacterConfig, InputConfig, ShowcaseConfig,
    CHARACTER_COUNT,
};
pub use error::{Result, VitrineError};
pub use hash::ContentHash;
pub use slot::CharacterSlot;
pub use types::{
    mat4_mul, mat4_transform_point, quat_from_yaw, Aabb, Color, Mat4, Transform, Vec3,
    IDENTITY,
};
