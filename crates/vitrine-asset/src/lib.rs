//! Vitrine Asset - Loading models and textures off the UI thread
//!
//! - `import_gltf` turns a GLB/glTF file into CPU-side meshes, materials,
//!   the node hierarchy, skins and node-level animation clips
//! - `decode_texture` decodes an image file to RGBA8
//! - `ThreadedLoader` runs both on worker threads and hands results back
//!   through `poll()`
//! - `LoadingManager` aggregates a batch into progress and completion events

mod error;
mod gltf_import;
mod loader;
mod manager;
mod texture;
mod types;

pub use error::AssetLoadError;
pub use gltf_import::{import_gltf, import_gltf_slice};
pub use loader::{
    load_blocking, AssetKey, AssetKind, AssetLoader, AssetRequest, LoadResult, LoadedAsset,
    ThreadedLoader,
};
pub use manager::{LoadEvent, LoadingManager};
pub use texture::{decode_texture, LoadedTexture};
pub use types::{
    AlphaMode, ChannelProperty, ImportedChannel, ImportedClip, ImportedKeyframe, ImportedMaterial,
    ImportedMesh, ImportedModel, ImportedNode, ImportedSkin, ImportedTexture, Interpolation,
};
