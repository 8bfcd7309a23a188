//! glTF/GLB file importer

use crate::types::{
    AlphaMode, ChannelProperty, ImportedChannel, ImportedClip, ImportedKeyframe,
    ImportedMaterial, ImportedMesh, ImportedModel, ImportedNode, ImportedSkin, ImportedTexture,
    Interpolation,
};
use std::path::Path;
use vitrine_core::{Aabb, ContentHash, Result, VitrineError, IDENTITY};

/// Import a glTF or GLB file from disk
pub fn import_gltf<P: AsRef<Path>>(path: P) -> Result<ImportedModel> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;

    let name = path
        .file_stem()
        .and_then(|n| n.to_str())
        .unwrap_or("unnamed")
        .to_string();

    // Relative buffer URIs need the base directory, data URIs and GLB do not
    let imported = if path.extension().and_then(|e| e.to_str()) == Some("gltf") {
        gltf::import(path)
    } else {
        gltf::import_slice(&bytes)
    }
    .map_err(|e| VitrineError::ImportError(format!("Failed to import glTF: {}", e)))?;

    Ok(build_model(name, ContentHash::from_bytes(&bytes), imported))
}

/// Import a self-contained GLB (or glTF with data URIs) from memory
pub fn import_gltf_slice(name: &str, bytes: &[u8]) -> Result<ImportedModel> {
    let imported = gltf::import_slice(bytes)
        .map_err(|e| VitrineError::ImportError(format!("Failed to import glTF: {}", e)))?;
    Ok(build_model(name.to_string(), ContentHash::from_bytes(bytes), imported))
}

fn build_model(
    name: String,
    hash: ContentHash,
    (document, buffers, images): (gltf::Document, Vec<gltf::buffer::Data>, Vec<gltf::image::Data>),
) -> ImportedModel {
    // glTF mesh index -> range of primitive indices in `meshes`
    let mut meshes = Vec::new();
    let mut mesh_primitives: Vec<Vec<usize>> = Vec::new();

    for mesh in document.meshes() {
        let mesh_name = mesh
            .name()
            .map(String::from)
            .unwrap_or_else(|| format!("mesh_{}", mesh.index()));

        let mut primitive_indices = Vec::new();
        for primitive in mesh.primitives() {
            let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

            let positions: Vec<[f32; 3]> = reader
                .read_positions()
                .map(|iter| iter.collect())
                .unwrap_or_default();

            let normals: Vec<[f32; 3]> = reader
                .read_normals()
                .map(|iter| iter.collect())
                .unwrap_or_default();

            let uvs: Vec<[f32; 2]> = reader
                .read_tex_coords(0)
                .map(|iter| iter.into_f32().collect())
                .unwrap_or_default();

            let indices: Vec<u32> = reader
                .read_indices()
                .map(|iter| iter.into_u32().collect())
                .unwrap_or_else(|| (0..positions.len() as u32).collect());

            let joints: Vec<[u16; 4]> = reader
                .read_joints(0)
                .map(|iter| iter.into_u16().collect())
                .unwrap_or_default();

            let weights: Vec<[f32; 4]> = reader
                .read_weights(0)
                .map(|iter| iter.into_f32().collect())
                .unwrap_or_default();

            primitive_indices.push(meshes.len());
            meshes.push(ImportedMesh {
                name: mesh_name.clone(),
                bounds: Aabb::from_positions(&positions),
                positions,
                normals,
                uvs,
                indices,
                material_index: primitive.material().index(),
                joints,
                weights,
            });
        }
        mesh_primitives.push(primitive_indices);
    }

    let nodes: Vec<ImportedNode> = document
        .nodes()
        .map(|node| {
            let (translation, rotation, scale) = node.transform().decomposed();
            ImportedNode {
                name: node
                    .name()
                    .map(String::from)
                    .unwrap_or_else(|| format!("node_{}", node.index())),
                translation,
                rotation,
                scale,
                mesh_primitive_indices: node
                    .mesh()
                    .and_then(|m| mesh_primitives.get(m.index()).cloned())
                    .unwrap_or_default(),
                children: node.children().map(|c| c.index()).collect(),
                skin_index: node.skin().map(|s| s.index()),
            }
        })
        .collect();

    let skins = document
        .skins()
        .map(|skin| {
            let joints: Vec<usize> = skin.joints().map(|j| j.index()).collect();
            let reader = skin.reader(|b| Some(&buffers[b.index()]));
            let mut inverse_bind_matrices: Vec<_> = reader
                .read_inverse_bind_matrices()
                .map(|iter| iter.collect())
                .unwrap_or_default();
            inverse_bind_matrices.resize(joints.len(), IDENTITY);
            ImportedSkin {
                name: skin
                    .name()
                    .map(String::from)
                    .unwrap_or_else(|| format!("skin_{}", skin.index())),
                joints,
                inverse_bind_matrices,
            }
        })
        .collect();

    let root_nodes = match document.default_scene().or_else(|| document.scenes().next()) {
        Some(scene) => scene.nodes().map(|n| n.index()).collect(),
        None => {
            let mut is_child = vec![false; nodes.len()];
            for node in &nodes {
                for &c in &node.children {
                    if let Some(flag) = is_child.get_mut(c) {
                        *flag = true;
                    }
                }
            }
            (0..nodes.len()).filter(|&i| !is_child[i]).collect()
        }
    };

    let textures: Vec<ImportedTexture> = document
        .textures()
        .map(|texture| {
            let source = texture.source().index();
            let name = texture
                .name()
                .map(String::from)
                .unwrap_or_else(|| format!("texture_{}", texture.index()));
            match images.get(source) {
                Some(image) => ImportedTexture {
                    name,
                    width: image.width,
                    height: image.height,
                    rgba: to_rgba8(image),
                },
                None => white_texture(name),
            }
        })
        .collect();

    let materials = document
        .materials()
        .map(|material| {
            let pbr = material.pbr_metallic_roughness();
            ImportedMaterial {
                name: material
                    .name()
                    .map(String::from)
                    .unwrap_or_else(|| format!("material_{}", material.index().unwrap_or(0))),
                base_color: pbr.base_color_factor(),
                metallic: pbr.metallic_factor(),
                roughness: pbr.roughness_factor(),
                base_color_texture: pbr.base_color_texture().map(|info| info.texture().index()),
                emissive: material.emissive_factor(),
                alpha_mode: match material.alpha_mode() {
                    gltf::material::AlphaMode::Opaque => AlphaMode::Opaque,
                    gltf::material::AlphaMode::Mask => AlphaMode::Mask,
                    gltf::material::AlphaMode::Blend => AlphaMode::Blend,
                },
                alpha_cutoff: material.alpha_cutoff().unwrap_or(0.5),
            }
        })
        .collect();

    let clips = document
        .animations()
        .map(|anim| import_clip(&anim, &buffers))
        .collect();

    let model = ImportedModel {
        name,
        hash,
        meshes,
        materials,
        textures,
        nodes,
        root_nodes,
        skins,
        clips,
    };

    tracing::debug!(
        "Imported '{}' ({}): {} meshes, {} nodes, {} skins, {} clips, {} vertices",
        model.name,
        model.hash,
        model.meshes.len(),
        model.nodes.len(),
        model.skins.len(),
        model.clips.len(),
        model.vertex_count()
    );

    model
}

fn import_clip(anim: &gltf::Animation<'_>, buffers: &[gltf::buffer::Data]) -> ImportedClip {
    let mut channels = Vec::new();
    let mut duration = 0.0f32;

    for channel in anim.channels() {
        let target = channel.target();
        let reader = channel.reader(|b| Some(&buffers[b.index()]));

        let Some(inputs) = reader.read_inputs() else {
            continue;
        };
        let times: Vec<f32> = inputs.collect();
        let Some(outputs) = reader.read_outputs() else {
            continue;
        };

        let (property, values): (ChannelProperty, Vec<Vec<f32>>) = match outputs {
            gltf::animation::util::ReadOutputs::Translations(it) => (
                ChannelProperty::Translation,
                it.map(|v| v.to_vec()).collect(),
            ),
            gltf::animation::util::ReadOutputs::Rotations(it) => (
                ChannelProperty::Rotation,
                it.into_f32().map(|v| v.to_vec()).collect(),
            ),
            gltf::animation::util::ReadOutputs::Scales(it) => {
                (ChannelProperty::Scale, it.map(|v| v.to_vec()).collect())
            }
            // Morph target weights are not animated
            gltf::animation::util::ReadOutputs::MorphTargetWeights(_) => continue,
        };

        let interpolation = match channel.sampler().interpolation() {
            gltf::animation::Interpolation::Step => Interpolation::Step,
            gltf::animation::Interpolation::Linear => Interpolation::Linear,
            gltf::animation::Interpolation::CubicSpline => Interpolation::CubicSpline,
        };

        // Cubic spline packs [in_tangent, value, out_tangent] per keyframe
        let keyframes: Vec<ImportedKeyframe> = if interpolation == Interpolation::CubicSpline {
            times
                .iter()
                .zip(values.chunks_exact(3))
                .map(|(&time, c)| ImportedKeyframe {
                    time,
                    value: c[1].clone(),
                    in_tangent: Some(c[0].clone()),
                    out_tangent: Some(c[2].clone()),
                })
                .collect()
        } else {
            times
                .iter()
                .zip(values)
                .map(|(&time, value)| ImportedKeyframe::new(time, value))
                .collect()
        };

        if let Some(&last) = times.last() {
            duration = duration.max(last);
        }

        channels.push(ImportedChannel {
            node_index: target.node().index(),
            property,
            interpolation,
            keyframes,
        });
    }

    ImportedClip {
        name: anim
            .name()
            .map(String::from)
            .unwrap_or_else(|| format!("clip_{}", anim.index())),
        duration,
        channels,
    }
}

fn white_texture(name: String) -> ImportedTexture {
    ImportedTexture {
        name,
        width: 1,
        height: 1,
        rgba: vec![255; 4],
    }
}

/// Expand any glTF image format to RGBA8
fn to_rgba8(image: &gltf::image::Data) -> Vec<u8> {
    use gltf::image::Format;

    let pixel_count = (image.width * image.height) as usize;
    let mut rgba = Vec::with_capacity(pixel_count * 4);
    let data = &image.pixels;

    match image.format {
        Format::R8G8B8A8 => return data.clone(),
        Format::R8G8B8 => {
            for c in data.chunks_exact(3) {
                rgba.extend_from_slice(&[c[0], c[1], c[2], 255]);
            }
        }
        Format::R8G8 => {
            for c in data.chunks_exact(2) {
                rgba.extend_from_slice(&[c[0], c[1], 0, 255]);
            }
        }
        Format::R8 => {
            for &v in data {
                rgba.extend_from_slice(&[v, v, v, 255]);
            }
        }
        Format::R16G16B16A16 | Format::R16G16B16 | Format::R16G16 | Format::R16 => {
            let channels = match image.format {
                Format::R16 => 1,
                Format::R16G16 => 2,
                Format::R16G16B16 => 3,
                _ => 4,
            };
            // Little-endian u16, keep the high byte
            for px in data.chunks_exact(channels * 2) {
                let mut out = [0u8, 0, 0, 255];
                for ch in 0..channels {
                    out[ch] = px[ch * 2 + 1];
                }
                if channels == 1 {
                    out[1] = out[0];
                    out[2] = out[0];
                }
                rgba.extend_from_slice(&out);
            }
        }
        Format::R32G32B32FLOAT | Format::R32G32B32A32FLOAT => {
            let channels = if matches!(image.format, Format::R32G32B32FLOAT) { 3 } else { 4 };
            for px in data.chunks_exact(channels * 4) {
                let mut out = [0u8, 0, 0, 255];
                for ch in 0..channels {
                    let v = f32::from_le_bytes([
                        px[ch * 4],
                        px[ch * 4 + 1],
                        px[ch * 4 + 2],
                        px[ch * 4 + 3],
                    ]);
                    out[ch] = (v.clamp(0.0, 1.0) * 255.0) as u8;
                }
                rgba.extend_from_slice(&out);
            }
        }
    }

    rgba
}
