//! Import result types

use vitrine_core::{mat4_mul, Aabb, ContentHash, Mat4, Transform, Vec3, IDENTITY};

/// A model imported from a GLB/glTF file
#[derive(Debug, Clone)]
pub struct ImportedModel {
    pub name: String,
    /// SHA-256 of the source file bytes
    pub hash: ContentHash,
    pub meshes: Vec<ImportedMesh>,
    pub materials: Vec<ImportedMaterial>,
    pub textures: Vec<ImportedTexture>,
    /// Scene graph nodes with their bind-pose transforms
    pub nodes: Vec<ImportedNode>,
    /// Indices of top-level nodes in the default scene
    pub root_nodes: Vec<usize>,
    /// Skins referenced by `ImportedNode::skin_index`
    pub skins: Vec<ImportedSkin>,
    /// Node-level animation clips; skinned meshes follow their joint nodes
    pub clips: Vec<ImportedClip>,
}

impl ImportedModel {
    /// Bind-pose local transforms, one per node
    pub fn bind_pose(&self) -> Vec<Transform> {
        self.nodes.iter().map(|n| n.transform()).collect()
    }

    /// Model-space matrix of every node given per-node local transforms.
    ///
    /// Nodes not reachable from a root keep the identity matrix.
    pub fn world_matrices(&self, locals: &[Transform]) -> Vec<Mat4> {
        let mut world = vec![IDENTITY; self.nodes.len()];
        let mut stack: Vec<(usize, Mat4)> =
            self.root_nodes.iter().map(|&i| (i, IDENTITY)).collect();

        while let Some((index, parent)) = stack.pop() {
            let Some(node) = self.nodes.get(index) else {
                continue;
            };
            let local = locals
                .get(index)
                .copied()
                .unwrap_or_else(|| node.transform())
                .to_matrix();
            let m = mat4_mul(&parent, &local);
            world[index] = m;
            for &child in &node.children {
                stack.push((child, m));
            }
        }

        world
    }

    /// Model-space bounds of every mesh under the given pose
    pub fn bounds_with(&self, world: &[Mat4]) -> Option<Aabb> {
        self.nodes
            .iter()
            .enumerate()
            .flat_map(|(i, node)| {
                let m = world.get(i).copied().unwrap_or(IDENTITY);
                node.mesh_primitive_indices.iter().map(move |&p| (p, m))
            })
            .filter_map(|(p, m)| self.meshes.get(p)?.bounds.map(|b| b.transformed(&m)))
            .reduce(|a, b| a.union(&b))
    }

    /// Model-space bounds in the bind pose
    pub fn bounds(&self) -> Option<Aabb> {
        let world = self.world_matrices(&self.bind_pose());
        self.bounds_with(&world)
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|m| m.positions.len()).sum()
    }
}

/// One glTF primitive with its vertex data
#[derive(Debug, Clone)]
pub struct ImportedMesh {
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
    pub material_index: Option<usize>,
    pub bounds: Option<Aabb>,
    /// Per-vertex indices into the skin's joint list, empty for rigid meshes
    pub joints: Vec<[u16; 4]>,
    /// Per-vertex joint weights, parallel to `joints`
    pub weights: Vec<[f32; 4]>,
}

impl ImportedMesh {
    pub fn is_skinned(&self) -> bool {
        !self.joints.is_empty() && self.joints.len() == self.weights.len()
    }
}

/// A glTF skin: the joint nodes and their inverse bind matrices
#[derive(Debug, Clone)]
pub struct ImportedSkin {
    pub name: String,
    /// Indices into ImportedModel.nodes
    pub joints: Vec<usize>,
    /// One per joint; identity when the file omits them
    pub inverse_bind_matrices: Vec<Mat4>,
}

/// A node from the glTF scene graph
#[derive(Debug, Clone)]
pub struct ImportedNode {
    pub name: String,
    pub translation: [f32; 3],
    pub rotation: [f32; 4], // quaternion [x, y, z, w]
    pub scale: [f32; 3],
    pub mesh_primitive_indices: Vec<usize>, // indices into ImportedModel.meshes
    pub children: Vec<usize>,              // indices into ImportedModel.nodes
    pub skin_index: Option<usize>,         // index into ImportedModel.skins
}

impl ImportedNode {
    pub fn transform(&self) -> Transform {
        Transform::from_position(Vec3::from_array(self.translation))
            .with_rotation(self.rotation)
            .with_scale(Vec3::from_array(self.scale))
    }
}

/// Which node property a channel animates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelProperty {
    Translation,
    Rotation,
    Scale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    Step,
    #[default]
    Linear,
    CubicSpline,
}

/// A single keyframe; 3 floats for translation/scale, 4 for rotation (xyzw)
#[derive(Debug, Clone, Default)]
pub struct ImportedKeyframe {
    pub time: f32,
    pub value: Vec<f32>,
    /// Cubic spline tangents, per unit time
    pub in_tangent: Option<Vec<f32>>,
    pub out_tangent: Option<Vec<f32>>,
}

impl ImportedKeyframe {
    pub fn new(time: f32, value: Vec<f32>) -> Self {
        Self {
            time,
            value,
            in_tangent: None,
            out_tangent: None,
        }
    }
}

/// Keyframes driving one property of one node
#[derive(Debug, Clone)]
pub struct ImportedChannel {
    pub node_index: usize,
    pub property: ChannelProperty,
    pub interpolation: Interpolation,
    pub keyframes: Vec<ImportedKeyframe>,
}

#[derive(Debug, Clone)]
pub struct ImportedClip {
    pub name: String,
    pub duration: f32,
    pub channels: Vec<ImportedChannel>,
}

/// An embedded texture, always expanded to RGBA8
#[derive(Debug, Clone)]
pub struct ImportedTexture {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// glTF alpha rendering mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlphaMode {
    Opaque,
    Mask,
    Blend,
}

#[derive(Debug, Clone)]
pub struct ImportedMaterial {
    pub name: String,
    pub base_color: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
    /// Index into ImportedModel.textures
    pub base_color_texture: Option<usize>,
    pub emissive: [f32; 3],
    pub alpha_mode: AlphaMode,
    pub alpha_cutoff: f32,
}

impl Default for ImportedMaterial {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            base_color: [0.8, 0.8, 0.8, 1.0],
            metallic: 0.0,
            roughness: 0.5,
            base_color_texture: None,
            emissive: [0.0; 3],
            alpha_mode: AlphaMode::Opaque,
            alpha_cutoff: 0.5,
        }
    }
}
