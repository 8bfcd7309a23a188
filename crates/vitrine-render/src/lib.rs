//! Vitrine Render - wgpu renderer for the showcase
//!
//! Consumes the flat render list produced by `vitrine_scene::Showcase`:
//! imported model primitives and builtin marker meshes, each with a world
//! matrix, an optional material override and, for skinned primitives, a
//! joint palette applied in the vertex shader. Lighting is Lambert plus a
//! Blinn-Phong highlight under the showcase light rig; the background is an
//! equirectangular panorama drawn at the far plane.

mod context;
mod gpu_mesh;
mod pipeline;
mod primitives;
mod scene_renderer;
mod sky_pipeline;
mod texture;

pub use context::{RenderContext, RenderError, DEPTH_FORMAT};
pub use gpu_mesh::{build_mesh, build_skinned_vertices, builtin_mesh, GpuMesh, MeshCache};
pub use pipeline::{
    mat4_inv_transpose, DirectionalLight, LightUniforms, MaterialUniforms, PointLight,
    RenderPipeline, TransformUniforms,
};
pub use primitives::{
    create_arrow_mesh, create_disc_mesh, create_sphere_mesh, Mesh, SkinnedVertex, Vertex,
};
pub use scene_renderer::{draw_order, SceneRenderer};
pub use sky_pipeline::{SkyPipeline, SkyUniforms};
pub use texture::{GpuTexture, TextureCache};

#[cfg(test)]
mod tests {
    #[test]
    fn shader_wgsl_parses() {
        let source = include_str!("shader.wgsl");
        naga::front::wgsl::parse_str(source).expect("shader.wgsl failed to parse");
    }

    #[test]
    fn shader_has_rigid_and_skinned_entry_points() {
        let module = naga::front::wgsl::parse_str(include_str!("shader.wgsl")).unwrap();
        let names: Vec<&str> = module.entry_points.iter().map(|e| e.name.as_str()).collect();
        assert!(names.contains(&"vs_main"));
        assert!(names.contains(&"vs_skinned"));
        assert!(names.contains(&"fs_main"));
    }

    #[test]
    fn sky_shader_wgsl_parses() {
        let source = include_str!("sky_shader.wgsl");
        naga::front::wgsl::parse_str(source).expect("sky_shader.wgsl failed to parse");
    }
}
