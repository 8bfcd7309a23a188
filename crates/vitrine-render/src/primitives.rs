//! Procedural meshes for the marker parts

use bytemuck::{Pod, Zeroable};
use std::f32::consts::{PI, TAU};

/// A vertex with position, normal and UV coordinates
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    const ATTRIBS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x2,
    ];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// A vertex bound to up to four joints
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct SkinnedVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub joints: [u32; 4],
    pub weights: [f32; 4],
}

impl SkinnedVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x2,
        3 => Uint32x4,
        4 => Float32x4,
    ];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SkinnedVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// A mesh with vertices and indices
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }
}

pub const MARKER_CORE_RADIUS: f32 = 0.08;
pub const GLOW_DISC_RADIUS: f32 = 0.16;
pub const ARROW_LENGTH: f32 = 0.07;
pub const ARROW_WIDTH: f32 = 0.05;

/// UV sphere centred on the origin
pub fn create_sphere_mesh(radius: f32, segments: u32, rings: u32) -> Mesh {
    let segments = segments.max(3);
    let rings = rings.max(2);
    let mut vertices = Vec::with_capacity(((segments + 1) * (rings + 1)) as usize);

    for ring in 0..=rings {
        let v = ring as f32 / rings as f32;
        let phi = v * PI;
        for seg in 0..=segments {
            let u = seg as f32 / segments as f32;
            let theta = u * TAU;
            let normal = [phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin()];
            vertices.push(Vertex {
                position: [normal[0] * radius, normal[1] * radius, normal[2] * radius],
                normal,
                uv: [u, v],
            });
        }
    }

    let stride = segments + 1;
    let mut indices = Vec::with_capacity((segments * rings * 6) as usize);
    for ring in 0..rings {
        for seg in 0..segments {
            let a = ring * stride + seg;
            let b = a + stride;
            indices.extend_from_slice(&[a, a + 1, b, a + 1, b + 1, b]);
        }
    }

    Mesh { vertices, indices }
}

/// Flat disc in the XY plane facing +Z
pub fn create_disc_mesh(radius: f32, segments: u32) -> Mesh {
    let segments = segments.max(3);
    let normal = [0.0, 0.0, 1.0];
    let mut vertices = vec![Vertex {
        position: [0.0; 3],
        normal,
        uv: [0.5, 0.5],
    }];
    for seg in 0..segments {
        let angle = seg as f32 / segments as f32 * TAU;
        let (s, c) = angle.sin_cos();
        vertices.push(Vertex {
            position: [c * radius, s * radius, 0.0],
            normal,
            uv: [0.5 + c * 0.5, 0.5 - s * 0.5],
        });
    }

    let indices = (0..segments)
        .flat_map(|seg| [0, seg + 1, (seg + 1) % segments + 1])
        .collect();

    Mesh { vertices, indices }
}

/// Flat triangular arrowhead in the XY plane, pointing along +X
pub fn create_arrow_mesh(length: f32, width: f32) -> Mesh {
    let normal = [0.0, 0.0, 1.0];
    let half_l = length / 2.0;
    let half_w = width / 2.0;
    let vertices = vec![
        Vertex {
            position: [half_l, 0.0, 0.0],
            normal,
            uv: [1.0, 0.5],
        },
        Vertex {
            position: [-half_l, half_w, 0.0],
            normal,
            uv: [0.0, 0.0],
        },
        Vertex {
            position: [-half_l, -half_w, 0.0],
            normal,
            uv: [0.0, 1.0],
        },
    ];
    Mesh {
        vertices,
        indices: vec![0, 1, 2],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn length(v: [f32; 3]) -> f32 {
        (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
    }

    #[test]
    fn sphere_vertices_lie_on_radius() {
        let mesh = create_sphere_mesh(0.5, 12, 8);
        assert_eq!(mesh.vertex_count(), 13 * 9);
        assert_eq!(mesh.index_count(), 12 * 8 * 6);
        for v in &mesh.vertices {
            assert!((length(v.position) - 0.5).abs() < 1e-5);
            assert!((length(v.normal) - 1.0).abs() < 1e-5);
        }
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertex_count()));
    }

    #[test]
    fn disc_faces_positive_z() {
        let mesh = create_disc_mesh(1.0, 16);
        assert_eq!(mesh.vertex_count(), 17);
        assert_eq!(mesh.index_count(), 48);
        assert!(mesh.vertices.iter().all(|v| v.position[2] == 0.0 && v.normal == [0.0, 0.0, 1.0]));
        // The last triangle wraps back to the first rim vertex
        assert_eq!(&mesh.indices[45..], &[0, 16, 1]);
    }

    #[test]
    fn arrow_tip_is_on_positive_x() {
        let mesh = create_arrow_mesh(0.1, 0.04);
        let tip = mesh
            .vertices
            .iter()
            .max_by(|a, b| a.position[0].total_cmp(&b.position[0]))
            .unwrap();
        assert_eq!(tip.position, [0.05, 0.0, 0.0]);
        assert_eq!(mesh.index_count(), 3);
    }
}
