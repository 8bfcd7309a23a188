//! Draws a showcase render list: background panorama, then opaque meshes,
//! then transparent meshes back to front

use crate::context::{RenderContext, RenderError};
use crate::gpu_mesh::{GpuMesh, MeshCache};
use crate::pipeline::{LightUniforms, MaterialUniforms, RenderPipeline, TransformUniforms};
use crate::sky_pipeline::{SkyPipeline, SkyUniforms};
use crate::texture::{GpuTexture, TextureCache};
use vitrine_asset::{AlphaMode, AssetKey, ImportedModel, LoadedTexture};
use vitrine_scene::{mat4_inverse, Camera, LightRig, MeshRef, RenderItem};
use wgpu::util::DeviceExt;

/// Clear colour behind everything when no panorama is loaded
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.02,
    g: 0.02,
    b: 0.05,
    a: 1.0,
};

struct SkyResources {
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    texture_bind_group: wgpu::BindGroup,
    _texture: GpuTexture,
}

/// Per-draw GPU state built for one frame
struct PreparedDraw<'a> {
    mesh: &'a GpuMesh,
    transparent: bool,
    _transform_buffer: wgpu::Buffer,
    transform_bind_group: wgpu::BindGroup,
    _material_buffer: wgpu::Buffer,
    material_bind_group: wgpu::BindGroup,
    /// Joint palette for skinned meshes; None draws with the identity palette
    joints: Option<(wgpu::Buffer, wgpu::BindGroup)>,
}

pub struct SceneRenderer {
    pipeline: RenderPipeline,
    sky_pipeline: SkyPipeline,
    mesh_cache: MeshCache,
    texture_cache: TextureCache,
    light_uniforms: LightUniforms,
    light_buffer: wgpu::Buffer,
    light_bind_group: wgpu::BindGroup,
    /// Bound for skinned meshes drawn without a palette
    _identity_joint_buffer: wgpu::Buffer,
    identity_joint_bind_group: wgpu::BindGroup,
    sky: Option<SkyResources>,
    disposed: bool,
}

impl SceneRenderer {
    pub fn new(context: &RenderContext, lights: &LightRig) -> Result<Self, RenderError> {
        let device = &context.device;
        let pipeline = RenderPipeline::new(device, context.format());
        let sky_pipeline = SkyPipeline::new(device, context.format());
        let texture_cache = TextureCache::new(device, &context.queue)?;

        let mut mesh_cache = MeshCache::new();
        mesh_cache.upload_builtins(device);

        let light_uniforms = LightUniforms::from_rig(lights);
        let light_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Light Uniform Buffer"),
            contents: bytemuck::cast_slice(&[light_uniforms]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let light_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &pipeline.light_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: light_buffer.as_entire_binding(),
            }],
            label: Some("Light Bind Group"),
        });

        let (identity_joint_buffer, identity_joint_bind_group) =
            joint_bind_group(device, &pipeline, &[vitrine_core::IDENTITY; IDENTITY_PALETTE_LEN]);

        Ok(Self {
            pipeline,
            sky_pipeline,
            mesh_cache,
            texture_cache,
            light_uniforms,
            light_buffer,
            light_bind_group,
            _identity_joint_buffer: identity_joint_buffer,
            identity_joint_bind_group,
            sky: None,
            disposed: false,
        })
    }

    /// Replace the light rig
    pub fn set_lights(&mut self, queue: &wgpu::Queue, lights: &LightRig) {
        self.light_uniforms = LightUniforms::from_rig(lights);
        queue.write_buffer(&self.light_buffer, 0, bytemuck::cast_slice(&[self.light_uniforms]));
    }

    /// Upload a loaded model's primitives and textures
    pub fn upload_model(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        key: AssetKey,
        model: &ImportedModel,
    ) {
        if self.disposed {
            return;
        }
        self.mesh_cache.upload_model(device, key, model);
        self.texture_cache.upload_model(device, queue, key, model);
        tracing::info!(
            "Uploaded {} ({} vertices, {} textures)",
            key,
            model.vertex_count(),
            model.textures.len()
        );
    }

    pub fn has_model(&self, key: AssetKey) -> bool {
        self.mesh_cache.contains_model(key)
    }

    /// Use an equirectangular image as the scene background
    pub fn set_background_texture(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        texture: &LoadedTexture,
    ) -> Result<(), RenderError> {
        if self.disposed {
            return Ok(());
        }
        let gpu = GpuTexture::from_rgba(
            device,
            queue,
            &format!("Background {}", texture.name),
            texture.width,
            texture.height,
            &texture.rgba,
            wgpu::AddressMode::Repeat,
        )?;

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sky Uniform Buffer"),
            contents: bytemuck::cast_slice(&[SkyUniforms {
                inv_view_proj: vitrine_core::IDENTITY,
            }]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &self.sky_pipeline.uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
            label: Some("Sky Uniform Bind Group"),
        });
        let texture_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &self.sky_pipeline.texture_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&gpu.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&gpu.sampler),
                },
            ],
            label: Some("Sky Texture Bind Group"),
        });

        tracing::info!("Background texture {} ({}x{})", texture.name, texture.width, texture.height);
        self.sky = Some(SkyResources {
            uniform_buffer,
            uniform_bind_group,
            texture_bind_group,
            _texture: gpu,
        });
        Ok(())
    }

    fn prepare_draw<'a>(
        &'a self,
        device: &wgpu::Device,
        item: &RenderItem,
        view_proj: vitrine_core::Mat4,
        camera_pos: [f32; 3],
    ) -> Option<PreparedDraw<'a>> {
        let mesh = self.mesh_cache.get(&item.mesh)?;

        let texture = match (item.mesh, mesh.material.base_color_texture) {
            (MeshRef::Model { key, .. }, Some(index)) if item.material.is_none() => {
                self.texture_cache.get(key, index)
            }
            _ => None,
        };
        let material = MaterialUniforms::resolve(&mesh.material, item.material, texture.is_some());
        let texture = texture.unwrap_or(&self.texture_cache.default_white);
        let transparent = material.is_transparent()
            || (item.material.is_none() && mesh.material.alpha_mode == AlphaMode::Blend);

        let transform = TransformUniforms::new(view_proj, item.world, camera_pos);
        let transform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Transform Uniform Buffer"),
            contents: bytemuck::cast_slice(&[transform]),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let transform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &self.pipeline.transform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: transform_buffer.as_entire_binding(),
            }],
            label: Some("Transform Bind Group"),
        });

        let material_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Material Uniform Buffer"),
            contents: bytemuck::cast_slice(&[material]),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let material_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &self.pipeline.material_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: material_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
            label: Some("Material Bind Group"),
        });

        let joints = match &item.joints {
            Some(palette) if mesh.skinned && !palette.is_empty() => {
                Some(joint_bind_group(device, &self.pipeline, palette))
            }
            _ => None,
        };

        Some(PreparedDraw {
            mesh,
            transparent,
            _transform_buffer: transform_buffer,
            transform_bind_group,
            _material_buffer: material_buffer,
            material_bind_group,
            joints,
        })
    }

    /// Render one frame into `target_view`
    pub fn render(
        &self,
        context: &RenderContext,
        camera: &Camera,
        items: &[RenderItem],
        target_view: &wgpu::TextureView,
    ) {
        if self.disposed {
            return;
        }
        let device = &context.device;
        let view_proj = camera.view_projection_matrix();
        let camera_pos = camera.position_array();

        if let Some(sky) = &self.sky {
            let uniforms = SkyUniforms {
                inv_view_proj: mat4_inverse(&camera.rotation_only_view_projection()),
            };
            context
                .queue
                .write_buffer(&sky.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));
        }

        let prepared: Vec<Option<PreparedDraw>> = items
            .iter()
            .map(|item| self.prepare_draw(device, item, view_proj, camera_pos))
            .collect();
        let order = draw_order(items, camera_pos, |i| {
            prepared[i].as_ref().is_some_and(|d| d.transparent)
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Scene Encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &context.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if let Some(sky) = &self.sky {
                pass.set_pipeline(&self.sky_pipeline.pipeline);
                pass.set_bind_group(0, &sky.uniform_bind_group, &[]);
                pass.set_bind_group(1, &sky.texture_bind_group, &[]);
                pass.draw(0..3, 0..1);
            }

            pass.set_bind_group(2, &self.light_bind_group, &[]);
            let mut current = None;
            for index in order {
                let Some(draw) = &prepared[index] else {
                    continue;
                };
                let variant = (draw.mesh.skinned, draw.transparent);
                if current != Some(variant) {
                    pass.set_pipeline(self.pipeline.select(variant.0, variant.1));
                    current = Some(variant);
                }
                pass.set_bind_group(0, &draw.transform_bind_group, &[]);
                pass.set_bind_group(1, &draw.material_bind_group, &[]);
                if draw.mesh.skinned {
                    let joints = draw
                        .joints
                        .as_ref()
                        .map_or(&self.identity_joint_bind_group, |(_, group)| group);
                    pass.set_bind_group(3, joints, &[]);
                }
                pass.set_vertex_buffer(0, draw.mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(draw.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..draw.mesh.index_count, 0, 0..1);
            }
        }

        context.queue.submit(std::iter::once(encoder.finish()));
    }

    /// Release every mesh buffer and texture; later renders draw nothing
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.mesh_cache.clear();
        self.texture_cache.clear();
        self.sky = None;
        tracing::info!("Scene renderer disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn mesh_cache(&self) -> &MeshCache {
        &self.mesh_cache
    }
}

/// Joint indices a skinned vertex may name without a palette of its own
const IDENTITY_PALETTE_LEN: usize = 256;

/// Upload a joint palette as a storage buffer bound to group 3
fn joint_bind_group(
    device: &wgpu::Device,
    pipeline: &RenderPipeline,
    palette: &[vitrine_core::Mat4],
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Joint Palette Buffer"),
        contents: bytemuck::cast_slice(palette),
        usage: wgpu::BufferUsages::STORAGE,
    });
    let group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: &pipeline.joint_bind_group_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
        label: Some("Joint Palette Bind Group"),
    });
    (buffer, group)
}

/// Indices of `items` in draw order: opaque items as given, then
/// transparent items sorted farthest first
pub fn draw_order(
    items: &[RenderItem],
    camera_pos: [f32; 3],
    is_transparent: impl Fn(usize) -> bool,
) -> Vec<usize> {
    let (mut transparent, opaque): (Vec<usize>, Vec<usize>) =
        (0..items.len()).partition(|&i| is_transparent(i));

    let distance_sq = |i: usize| {
        let t = items[i].world[3];
        let d = [t[0] - camera_pos[0], t[1] - camera_pos[1], t[2] - camera_pos[2]];
        d[0] * d[0] + d[1] * d[1] + d[2] * d[2]
    };
    transparent.sort_by(|&a, &b| distance_sq(b).total_cmp(&distance_sq(a)));

    opaque.into_iter().chain(transparent).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrine_core::IDENTITY;
    use vitrine_scene::BuiltinMesh;

    fn item_at(z: f32) -> RenderItem {
        let mut world = IDENTITY;
        world[3] = [0.0, 0.0, z, 1.0];
        RenderItem {
            mesh: MeshRef::Builtin(BuiltinMesh::GlowDisc),
            world,
            material: None,
            joints: None,
        }
    }

    #[test]
    fn opaque_first_then_far_to_near() {
        let items = vec![item_at(0.0), item_at(-3.0), item_at(1.0), item_at(-1.0)];
        let transparent = [false, true, false, true];
        let order = draw_order(&items, [0.0, 0.0, 5.0], |i| transparent[i]);
        assert_eq!(order, vec![0, 2, 1, 3]);
    }

    #[test]
    fn empty_list_orders_nothing() {
        assert!(draw_order(&[], [0.0; 3], |_| false).is_empty());
    }
}
