//! What the renderer draws this frame

use vitrine_asset::AssetKey;
use vitrine_core::{Color, Mat4};

/// Procedural meshes owned by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinMesh {
    /// Small sphere used when no marker model is available
    MarkerCore,
    GlowDisc,
    Arrow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshRef {
    /// One primitive of a loaded model
    Model { key: AssetKey, primitive: usize },
    Builtin(BuiltinMesh),
}

/// Per-draw material changes applied on top of the mesh's own material
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialOverride {
    pub color: Color,
    pub opacity: f32,
    /// Skip lighting (emissive marker parts)
    pub unlit: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderItem {
    pub mesh: MeshRef,
    pub world: Mat4,
    pub material: Option<MaterialOverride>,
    /// Joint palette for skinned primitives, applied before `world`
    pub joints: Option<Vec<Mat4>>,
}

impl RenderItem {
    pub fn is_transparent(&self) -> bool {
        self.material.is_some_and(|m| m.opacity < 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrine_core::IDENTITY;

    fn item(material: Option<MaterialOverride>) -> RenderItem {
        RenderItem {
            mesh: MeshRef::Builtin(BuiltinMesh::GlowDisc),
            world: IDENTITY,
            material,
            joints: None,
        }
    }

    #[test]
    fn transparency_comes_from_override_opacity() {
        assert!(!item(None).is_transparent());

        let faded = MaterialOverride {
            color: Color::WHITE,
            opacity: 0.4,
            unlit: true,
        };
        assert!(item(Some(faded)).is_transparent());
        assert!(!item(Some(MaterialOverride { opacity: 1.0, ..faded })).is_transparent());
    }
}
