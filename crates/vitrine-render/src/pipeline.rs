//! Render pipeline setup and the uniform blocks it binds

use crate::context::DEPTH_FORMAT;
use crate::primitives::{SkinnedVertex, Vertex};
use bytemuck::{Pod, Zeroable};
use vitrine_asset::{AlphaMode, ImportedMaterial};
use vitrine_core::{Mat4, IDENTITY};
use vitrine_scene::{LightRig, MaterialOverride};

/// Transform uniform buffer data (bind group 0)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct TransformUniforms {
    pub view_proj: Mat4,
    pub model: Mat4,
    pub model_inv_transpose: Mat4,
    pub camera_pos: [f32; 3],
    pub _pad: f32,
}

impl TransformUniforms {
    pub fn new(view_proj: Mat4, model: Mat4, camera_pos: [f32; 3]) -> Self {
        Self {
            view_proj,
            model,
            model_inv_transpose: mat4_inv_transpose(&model),
            camera_pos,
            _pad: 0.0,
        }
    }
}

impl Default for TransformUniforms {
    fn default() -> Self {
        Self::new(IDENTITY, IDENTITY, [0.0; 3])
    }
}

/// Material uniform buffer data (bind group 1)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct MaterialUniforms {
    pub base_color: [f32; 4],
    pub emissive: [f32; 3],
    pub opacity: f32,
    pub metallic: f32,
    pub roughness: f32,
    pub unlit: u32,
    pub has_base_color_tex: u32,
    /// Fragments below this alpha are discarded; 0 disables the test
    pub alpha_cutoff: f32,
    pub _pad0: f32,
    pub _pad1: f32,
    pub _pad2: f32,
}

impl MaterialUniforms {
    /// Material for one draw: the mesh's own material, then any per-draw override
    pub fn resolve(material: &ImportedMaterial, overrides: Option<MaterialOverride>, has_texture: bool) -> Self {
        let mut uniforms = Self {
            base_color: material.base_color,
            emissive: material.emissive,
            opacity: 1.0,
            metallic: material.metallic,
            roughness: material.roughness,
            unlit: 0,
            has_base_color_tex: has_texture as u32,
            alpha_cutoff: match material.alpha_mode {
                AlphaMode::Mask => material.alpha_cutoff,
                _ => 0.0,
            },
            _pad0: 0.0,
            _pad1: 0.0,
            _pad2: 0.0,
        };

        if let Some(o) = overrides {
            uniforms.base_color = o.color.to_array();
            uniforms.opacity = o.opacity;
            uniforms.unlit = o.unlit as u32;
            uniforms.has_base_color_tex = 0;
        }
        uniforms
    }

    pub fn is_transparent(&self) -> bool {
        self.opacity < 1.0
    }
}

/// A directional light, pointing from the scene towards the light
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct DirectionalLight {
    pub direction: [f32; 3],
    pub intensity: f32,
    pub color: [f32; 3],
    pub _pad0: f32,
}

/// A point light with inverse-square falloff
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct PointLight {
    pub position: [f32; 3],
    pub intensity: f32,
    pub color: [f32; 3],
    pub _pad0: f32,
}

pub const MAX_DIRECTIONAL_LIGHTS: usize = 4;
pub const MAX_POINT_LIGHTS: usize = 4;

/// Combined light uniform buffer (bind group 2)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct LightUniforms {
    pub directional_lights: [DirectionalLight; MAX_DIRECTIONAL_LIGHTS],
    pub point_lights: [PointLight; MAX_POINT_LIGHTS],
    pub directional_count: u32,
    pub point_count: u32,
    pub _pad: [u32; 2],
    /// Flat ambient, rgb premultiplied by intensity
    pub ambient: [f32; 4],
    /// Hemisphere sky colour, intensity in w
    pub ambient_sky: [f32; 4],
    /// Hemisphere ground colour
    pub ambient_ground: [f32; 4],
}

impl LightUniforms {
    pub fn from_rig(rig: &LightRig) -> Self {
        let mut lights = Self::zeroed();

        for (slot, light) in lights.directional_lights.iter_mut().zip(&rig.directional) {
            *slot = DirectionalLight {
                direction: light.direction().to_array(),
                intensity: light.intensity,
                color: light.color.rgb(),
                _pad0: 0.0,
            };
        }
        lights.directional_count = rig.directional.len().min(MAX_DIRECTIONAL_LIGHTS) as u32;

        for (slot, light) in lights.point_lights.iter_mut().zip(&rig.points) {
            *slot = PointLight {
                position: light.position.to_array(),
                intensity: light.intensity,
                color: light.color.rgb(),
                _pad0: 0.0,
            };
        }
        lights.point_count = rig.points.len().min(MAX_POINT_LIGHTS) as u32;

        let [r, g, b] = rig.ambient.color.rgb();
        let k = rig.ambient.intensity;
        lights.ambient = [r * k, g * k, b * k, 1.0];

        let [r, g, b] = rig.hemisphere.sky.rgb();
        lights.ambient_sky = [r, g, b, rig.hemisphere.intensity];
        let [r, g, b] = rig.hemisphere.ground.rgb();
        lights.ambient_ground = [r, g, b, 1.0];

        lights
    }
}

/// The mesh pipelines: opaque draws, and alpha-blended draws without depth
/// writes, each for rigid and skinned vertex layouts.
///
/// Skinned pipelines add bind group 3, the joint palette as a storage buffer.
pub struct RenderPipeline {
    pub opaque: wgpu::RenderPipeline,
    pub transparent: wgpu::RenderPipeline,
    pub skinned_opaque: wgpu::RenderPipeline,
    pub skinned_transparent: wgpu::RenderPipeline,
    pub transform_bind_group_layout: wgpu::BindGroupLayout,
    pub material_bind_group_layout: wgpu::BindGroupLayout,
    pub light_bind_group_layout: wgpu::BindGroupLayout,
    pub joint_bind_group_layout: wgpu::BindGroupLayout,
}

impl RenderPipeline {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        let transform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[uniform_entry(
                    0,
                    wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                )],
                label: Some("Transform Bind Group Layout"),
            });

        let material_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[
                    uniform_entry(0, wgpu::ShaderStages::FRAGMENT),
                    texture_entry(1),
                    sampler_entry(2),
                ],
                label: Some("Material Bind Group Layout"),
            });

        let light_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[uniform_entry(0, wgpu::ShaderStages::FRAGMENT)],
                label: Some("Light Bind Group Layout"),
            });

        let joint_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
                label: Some("Joint Bind Group Layout"),
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Pipeline Layout"),
            bind_group_layouts: &[
                &transform_bind_group_layout,
                &material_bind_group_layout,
                &light_bind_group_layout,
            ],
            push_constant_ranges: &[],
        });

        let skinned_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Skinned Mesh Pipeline Layout"),
            bind_group_layouts: &[
                &transform_bind_group_layout,
                &material_bind_group_layout,
                &light_bind_group_layout,
                &joint_bind_group_layout,
            ],
            push_constant_ranges: &[],
        });

        let build = |label: &str, blend: Option<wgpu::BlendState>, depth_write: bool, skinned: bool| {
            let (layout, entry_point, vertex_layout) = if skinned {
                (&skinned_pipeline_layout, "vs_skinned", SkinnedVertex::desc())
            } else {
                (&pipeline_layout, "vs_main", Vertex::desc())
            };
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some(entry_point),
                    buffers: &[vertex_layout],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    // glTF materials may be double-sided and marker discs are
                    // seen from either side
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: depth_write,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };

        let opaque = build("Opaque Mesh Pipeline", Some(wgpu::BlendState::REPLACE), true, false);
        let transparent = build(
            "Transparent Mesh Pipeline",
            Some(wgpu::BlendState::ALPHA_BLENDING),
            false,
            false,
        );
        let skinned_opaque = build(
            "Skinned Opaque Mesh Pipeline",
            Some(wgpu::BlendState::REPLACE),
            true,
            true,
        );
        let skinned_transparent = build(
            "Skinned Transparent Mesh Pipeline",
            Some(wgpu::BlendState::ALPHA_BLENDING),
            false,
            true,
        );

        Self {
            opaque,
            transparent,
            skinned_opaque,
            skinned_transparent,
            transform_bind_group_layout,
            material_bind_group_layout,
            light_bind_group_layout,
            joint_bind_group_layout,
        }
    }

    /// Pipeline for a draw given its vertex layout and blending
    pub fn select(&self, skinned: bool, transparent: bool) -> &wgpu::RenderPipeline {
        match (skinned, transparent) {
            (false, false) => &self.opaque,
            (false, true) => &self.transparent,
            (true, false) => &self.skinned_opaque,
            (true, true) => &self.skinned_transparent,
        }
    }
}

pub(crate) fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

pub(crate) fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

pub(crate) fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

/// Inverse-transpose of the upper 3x3, embedded in a 4x4 for upload.
/// Singular matrices fall back to identity.
pub fn mat4_inv_transpose(m: &Mat4) -> Mat4 {
    let a = m[0][0]; let b = m[1][0]; let c = m[2][0];
    let d = m[0][1]; let e = m[1][1]; let f = m[2][1];
    let g = m[0][2]; let h = m[1][2]; let i = m[2][2];

    let det = a * (e * i - f * h) - b * (d * i - f * g) + c * (d * h - e * g);
    if det.abs() < 1e-10 {
        return IDENTITY;
    }
    let inv_det = 1.0 / det;

    let cof00 = (e * i - f * h) * inv_det;
    let cof01 = (f * g - d * i) * inv_det;
    let cof02 = (d * h - e * g) * inv_det;
    let cof10 = (c * h - b * i) * inv_det;
    let cof11 = (a * i - c * g) * inv_det;
    let cof12 = (b * g - a * h) * inv_det;
    let cof20 = (b * f - c * e) * inv_det;
    let cof21 = (c * d - a * f) * inv_det;
    let cof22 = (a * e - b * d) * inv_det;

    [
        [cof00, cof10, cof20, 0.0],
        [cof01, cof11, cof21, 0.0],
        [cof02, cof12, cof22, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrine_core::Color;

    #[test]
    fn uniform_sizes_match_wgsl_layout() {
        assert_eq!(std::mem::size_of::<TransformUniforms>(), 208);
        assert_eq!(std::mem::size_of::<MaterialUniforms>(), 64);
        assert_eq!(std::mem::size_of::<LightUniforms>(), 4 * 32 + 4 * 32 + 16 + 48);
    }

    #[test]
    fn light_rig_fills_uniforms() {
        let lights = LightUniforms::from_rig(&LightRig::showcase());
        assert_eq!(lights.directional_count, 3);
        assert_eq!(lights.point_count, 3);
        assert!((lights.ambient[0] - 0.4).abs() < 1e-6);
        assert_eq!(lights.ambient_sky[3], 0.8);

        let key = lights.directional_lights[0];
        assert_eq!(key.intensity, 1.2);
        let len = (key.direction[0].powi(2) + key.direction[1].powi(2) + key.direction[2].powi(2)).sqrt();
        assert!((len - 1.0).abs() < 1e-5);

        let cyan = lights.point_lights[1];
        assert_eq!(cyan.position, [2.0, 0.2, 1.0]);
        assert_eq!(cyan.color[0], 0.0);
    }

    #[test]
    fn override_replaces_colour_and_opacity() {
        let material = ImportedMaterial {
            base_color: [0.2, 0.3, 0.4, 1.0],
            ..Default::default()
        };
        let plain = MaterialUniforms::resolve(&material, None, true);
        assert_eq!(plain.base_color, [0.2, 0.3, 0.4, 1.0]);
        assert_eq!(plain.has_base_color_tex, 1);
        assert!(!plain.is_transparent());

        let glow = MaterialUniforms::resolve(
            &material,
            Some(MaterialOverride {
                color: Color::from_hex(0xff0080),
                opacity: 0.4,
                unlit: true,
            }),
            true,
        );
        assert_eq!(glow.unlit, 1);
        assert_eq!(glow.has_base_color_tex, 0);
        assert_eq!(glow.opacity, 0.4);
        assert!(glow.is_transparent());
    }

    #[test]
    fn mask_materials_carry_cutoff() {
        let material = ImportedMaterial {
            alpha_mode: AlphaMode::Mask,
            alpha_cutoff: 0.5,
            ..Default::default()
        };
        assert_eq!(MaterialUniforms::resolve(&material, None, false).alpha_cutoff, 0.5);
    }

    #[test]
    fn inv_transpose_of_uniform_scale() {
        let mut m = IDENTITY;
        m[0][0] = 2.0;
        m[1][1] = 2.0;
        m[2][2] = 2.0;
        let it = mat4_inv_transpose(&m);
        assert!((it[0][0] - 0.5).abs() < 1e-6);
        assert!((it[1][1] - 0.5).abs() < 1e-6);
        assert_eq!(it[0][1], 0.0);
    }
}
