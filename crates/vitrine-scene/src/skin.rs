//! Joint palettes and CPU-side vertex skinning
//!
//! Joints are ordinary nodes, so the animation mixer already poses them.
//! A palette entry maps a bind-pose vertex into the skinned mesh node's
//! space: `inverse(mesh_node) * joint * inverse_bind`. The renderer keeps
//! drawing with the mesh node's world matrix and applies the palette in the
//! vertex shader; picking and marker bounds use the same palette here.

use crate::camera::mat4_inverse;
use vitrine_asset::{ImportedMesh, ImportedSkin};
use vitrine_core::{mat4_mul, Mat4, IDENTITY};

/// Joint matrices for `skin` given every node's world matrix
pub fn joint_palette(skin: &ImportedSkin, mesh_node_world: &Mat4, world: &[Mat4]) -> Vec<Mat4> {
    let to_mesh = mat4_inverse(mesh_node_world);
    skin.joints
        .iter()
        .zip(&skin.inverse_bind_matrices)
        .map(|(&joint, inverse_bind)| {
            let joint_world = world.get(joint).copied().unwrap_or(IDENTITY);
            mat4_mul(&mat4_mul(&to_mesh, &joint_world), inverse_bind)
        })
        .collect()
}

/// Weighted blend of the palette entries a vertex is bound to.
///
/// Out-of-range joint indices contribute nothing; a vertex with no usable
/// weight stays in bind pose.
pub fn skin_matrix(palette: &[Mat4], joints: [u16; 4], weights: [f32; 4]) -> Mat4 {
    let mut m = [[0.0f32; 4]; 4];
    let mut total = 0.0;
    for (&joint, &weight) in joints.iter().zip(&weights) {
        let Some(bone) = palette.get(joint as usize) else {
            continue;
        };
        if weight == 0.0 {
            continue;
        }
        total += weight;
        for col in 0..4 {
            for row in 0..4 {
                m[col][row] += bone[col][row] * weight;
            }
        }
    }
    if total <= 0.0 {
        IDENTITY
    } else {
        m
    }
}

/// Posed positions of a skinned mesh, in the mesh node's space
pub fn skin_positions(mesh: &ImportedMesh, palette: &[Mat4]) -> Vec<[f32; 3]> {
    mesh.positions
        .iter()
        .enumerate()
        .map(|(i, &p)| {
            let joints = mesh.joints.get(i).copied().unwrap_or_default();
            let weights = mesh.weights.get(i).copied().unwrap_or_default();
            vitrine_core::mat4_transform_point(&skin_matrix(palette, joints, weights), p)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translation(x: f32, y: f32, z: f32) -> Mat4 {
        let mut m = IDENTITY;
        m[3] = [x, y, z, 1.0];
        m
    }

    fn two_joint_skin() -> ImportedSkin {
        ImportedSkin {
            name: "rig".into(),
            joints: vec![1, 2],
            inverse_bind_matrices: vec![IDENTITY, translation(0.0, -1.0, 0.0)],
        }
    }

    #[test]
    fn bind_pose_palette_is_identity() {
        let world = [IDENTITY, IDENTITY, translation(0.0, 1.0, 0.0)];
        let palette = joint_palette(&two_joint_skin(), &IDENTITY, &world);
        assert_eq!(palette, vec![IDENTITY, IDENTITY]);
    }

    #[test]
    fn palette_is_relative_to_the_mesh_node() {
        // Mesh node and joints all moved together: nothing deforms
        let world = [
            translation(5.0, 0.0, 0.0),
            translation(5.0, 0.0, 0.0),
            translation(5.0, 1.0, 0.0),
        ];
        let palette = joint_palette(&two_joint_skin(), &world[0], &world);
        for m in palette {
            assert!((m[3][0]).abs() < 1e-5 && (m[3][1]).abs() < 1e-5, "{m:?}");
        }
    }

    #[test]
    fn weights_blend_bones() {
        let palette = [IDENTITY, translation(0.0, 2.0, 0.0)];
        let m = skin_matrix(&palette, [0, 1, 0, 0], [0.5, 0.5, 0.0, 0.0]);
        assert!((m[3][1] - 1.0).abs() < 1e-6);
        assert!((m[1][1] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn unweighted_vertices_stay_put() {
        let palette = [translation(3.0, 0.0, 0.0)];
        assert_eq!(skin_matrix(&palette, [0; 4], [0.0; 4]), IDENTITY);
        assert_eq!(skin_matrix(&palette, [9, 0, 0, 0], [1.0, 0.0, 0.0, 0.0]), IDENTITY);
    }
}
