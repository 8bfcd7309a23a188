//! GPU mesh cache: uploads imported primitives and the builtin marker meshes

use crate::primitives::{
    create_arrow_mesh, create_disc_mesh, create_sphere_mesh, Mesh, SkinnedVertex, Vertex,
    ARROW_LENGTH, ARROW_WIDTH, GLOW_DISC_RADIUS, MARKER_CORE_RADIUS,
};
use bytemuck::Pod;
use std::collections::HashMap;
use vitrine_asset::{AssetKey, ImportedMaterial, ImportedMesh, ImportedModel};
use vitrine_scene::{BuiltinMesh, MeshRef};
use wgpu::util::DeviceExt;

/// A single GPU-resident primitive with its material
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
    pub material: ImportedMaterial,
    /// Vertex buffer holds `SkinnedVertex` and needs a joint palette
    pub skinned: bool,
}

impl GpuMesh {
    fn upload<V: Pod>(
        device: &wgpu::Device,
        label: &str,
        vertices: &[V],
        indices: &[u32],
        material: ImportedMaterial,
        skinned: bool,
    ) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", label)),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Index Buffer", label)),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
            material,
            skinned,
        }
    }
}

/// Interleave an imported primitive; missing normals point up, missing UVs are zero
pub fn build_mesh(mesh: &ImportedMesh) -> Mesh {
    let vertices = mesh
        .positions
        .iter()
        .enumerate()
        .map(|(i, &position)| Vertex {
            position,
            normal: mesh.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
            uv: mesh.uvs.get(i).copied().unwrap_or([0.0, 0.0]),
        })
        .collect();
    Mesh {
        vertices,
        indices: mesh.indices.clone(),
    }
}

/// Interleave a skinned primitive; vertices without joint data follow joint 0
pub fn build_skinned_vertices(mesh: &ImportedMesh) -> Vec<SkinnedVertex> {
    mesh.positions
        .iter()
        .enumerate()
        .map(|(i, &position)| SkinnedVertex {
            position,
            normal: mesh.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
            uv: mesh.uvs.get(i).copied().unwrap_or([0.0, 0.0]),
            joints: mesh.joints.get(i).map_or([0; 4], |j| j.map(u32::from)),
            weights: mesh.weights.get(i).copied().unwrap_or([1.0, 0.0, 0.0, 0.0]),
        })
        .collect()
}

/// Builtin geometry for one marker part
pub fn builtin_mesh(kind: BuiltinMesh) -> Mesh {
    match kind {
        BuiltinMesh::MarkerCore => create_sphere_mesh(MARKER_CORE_RADIUS, 16, 12),
        BuiltinMesh::GlowDisc => create_disc_mesh(GLOW_DISC_RADIUS, 32),
        BuiltinMesh::Arrow => create_arrow_mesh(ARROW_LENGTH, ARROW_WIDTH),
    }
}

/// GPU meshes keyed by the render-list mesh reference
#[derive(Default)]
pub struct MeshCache {
    meshes: HashMap<MeshRef, GpuMesh>,
}

impl MeshCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upload every primitive of an imported model
    pub fn upload_model(&mut self, device: &wgpu::Device, key: AssetKey, model: &ImportedModel) {
        for (primitive, mesh) in model.meshes.iter().enumerate() {
            if mesh.indices.is_empty() {
                continue;
            }
            let material = mesh
                .material_index
                .and_then(|i| model.materials.get(i))
                .cloned()
                .unwrap_or_default();
            let label = format!("{}/{}", key, mesh.name);
            let gpu = if mesh.is_skinned() {
                GpuMesh::upload(device, &label, &build_skinned_vertices(mesh), &mesh.indices, material, true)
            } else {
                let built = build_mesh(mesh);
                GpuMesh::upload(device, &label, &built.vertices, &built.indices, material, false)
            };
            self.meshes.insert(MeshRef::Model { key, primitive }, gpu);
        }
        tracing::debug!("Uploaded {} primitives for {}", model.meshes.len(), key);
    }

    /// Upload the procedural marker meshes
    pub fn upload_builtins(&mut self, device: &wgpu::Device) {
        for kind in [BuiltinMesh::MarkerCore, BuiltinMesh::GlowDisc, BuiltinMesh::Arrow] {
            let material = ImportedMaterial {
                name: format!("{:?}", kind),
                base_color: [1.0; 4],
                ..Default::default()
            };
            let mesh = builtin_mesh(kind);
            self.meshes.insert(
                MeshRef::Builtin(kind),
                GpuMesh::upload(device, &format!("{:?}", kind), &mesh.vertices, &mesh.indices, material, false),
            );
        }
    }

    pub fn get(&self, mesh: &MeshRef) -> Option<&GpuMesh> {
        self.meshes.get(mesh)
    }

    /// Check if any primitive of a model is cached
    pub fn contains_model(&self, key: AssetKey) -> bool {
        self.meshes
            .keys()
            .any(|m| matches!(m, MeshRef::Model { key: k, .. } if *k == key))
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Drop every buffer
    pub fn clear(&mut self) {
        self.meshes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_attributes_get_defaults() {
        let mesh = ImportedMesh {
            name: "tri".into(),
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            normals: vec![[0.0, 0.0, 1.0]],
            uvs: vec![],
            indices: vec![0, 1, 2],
            material_index: None,
            bounds: None,
            joints: vec![],
            weights: vec![],
        };
        let built = build_mesh(&mesh);
        assert_eq!(built.vertex_count(), 3);
        assert_eq!(built.vertices[0].normal, [0.0, 0.0, 1.0]);
        assert_eq!(built.vertices[2].normal, [0.0, 1.0, 0.0]);
        assert_eq!(built.vertices[1].uv, [0.0, 0.0]);
        assert_eq!(built.indices, vec![0, 1, 2]);
    }

    #[test]
    fn skinned_vertices_widen_joint_indices() {
        let mesh = ImportedMesh {
            name: "arm".into(),
            positions: vec![[0.0; 3], [0.0, 1.0, 0.0]],
            normals: vec![],
            uvs: vec![],
            indices: vec![],
            material_index: None,
            bounds: None,
            joints: vec![[0, 0, 0, 0], [1, 2, 0, 0]],
            weights: vec![[1.0, 0.0, 0.0, 0.0], [0.75, 0.25, 0.0, 0.0]],
        };
        let vertices = build_skinned_vertices(&mesh);
        assert_eq!(vertices.len(), 2);
        assert_eq!(vertices[1].joints, [1, 2, 0, 0]);
        assert_eq!(vertices[1].weights, [0.75, 0.25, 0.0, 0.0]);
        assert_eq!(vertices[0].normal, [0.0, 1.0, 0.0]);
        assert_eq!(std::mem::size_of::<SkinnedVertex>(), 64);
    }

    #[test]
    fn builtins_are_not_empty() {
        for kind in [BuiltinMesh::MarkerCore, BuiltinMesh::GlowDisc, BuiltinMesh::Arrow] {
            let mesh = builtin_mesh(kind);
            assert!(mesh.index_count() >= 3, "{kind:?}");
            assert_eq!(mesh.index_count() % 3, 0);
        }
    }
}
