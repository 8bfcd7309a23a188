//! GPU textures: model base-colour maps, the background panorama and a
//! white fallback

use crate::context::RenderError;
use std::collections::HashMap;
use vitrine_asset::{AssetKey, ImportedModel};
use wgpu::util::DeviceExt;

/// A GPU-resident texture with its view and sampler
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl GpuTexture {
    /// Upload tightly packed RGBA8 pixels
    pub fn from_rgba(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        width: u32,
        height: u32,
        rgba: &[u8],
        address_mode_u: wgpu::AddressMode,
    ) -> Result<Self, RenderError> {
        let expected = rgba_len(width, height);
        if width == 0 || height == 0 || rgba.len() != expected {
            return Err(RenderError::InvalidTexture {
                name: label.to_string(),
                expected,
                actual: rgba.len(),
            });
        }

        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            rgba,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{} Sampler", label)),
            address_mode_u,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Ok(Self {
            texture,
            view,
            sampler,
        })
    }
}

fn rgba_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * 4
}

/// Base-colour textures of uploaded models, keyed by (asset, texture index)
pub struct TextureCache {
    textures: HashMap<(AssetKey, usize), GpuTexture>,
    /// 1x1 white, bound when a material has no texture
    pub default_white: GpuTexture,
}

impl TextureCache {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Result<Self, RenderError> {
        let default_white = GpuTexture::from_rgba(
            device,
            queue,
            "Default White",
            1,
            1,
            &[255, 255, 255, 255],
            wgpu::AddressMode::Repeat,
        )?;
        Ok(Self {
            textures: HashMap::new(),
            default_white,
        })
    }

    /// Upload every texture of a model. A texture that fails validation is
    /// skipped with a warning; its materials render untextured.
    pub fn upload_model(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        key: AssetKey,
        model: &ImportedModel,
    ) {
        for (index, imported) in model.textures.iter().enumerate() {
            let label = format!("{}:{}", key, imported.name);
            match GpuTexture::from_rgba(
                device,
                queue,
                &label,
                imported.width,
                imported.height,
                &imported.rgba,
                wgpu::AddressMode::Repeat,
            ) {
                Ok(texture) => {
                    self.textures.insert((key, index), texture);
                }
                Err(e) => tracing::warn!("Skipping texture {}: {}", label, e),
            }
        }
    }

    pub fn get(&self, key: AssetKey, index: usize) -> Option<&GpuTexture> {
        self.textures.get(&(key, index))
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Release every model texture; the white fallback stays
    pub fn clear(&mut self) {
        self.textures.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgba_length_is_four_bytes_per_pixel() {
        assert_eq!(rgba_len(4, 2), 32);
        assert_eq!(rgba_len(0, 10), 0);
    }
}
