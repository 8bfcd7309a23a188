//! Placed models: the animated characters and the static background

use crate::animation::AnimationMixer;
use crate::camera::mat4_inverse;
use crate::picking::{ray_aabb, ray_triangle, Pickable, Ray};
use crate::skin::{joint_palette, skin_positions};
use vitrine_asset::ImportedModel;
use vitrine_core::{mat4_mul, Aabb, CharacterSlot, Mat4, Transform, IDENTITY};

/// One primitive of a placed model under the current pose
#[derive(Debug, Clone, PartialEq)]
pub struct MeshInstance {
    pub primitive: usize,
    /// World matrix of the node that owns the primitive
    pub world: Mat4,
    /// Joint palette for skinned primitives, in the owning node's space
    pub joints: Option<Vec<Mat4>>,
    /// Skinned vertex positions, in the owning node's space
    posed: Option<Vec<[f32; 3]>>,
}

/// An imported model placed in the world, with its current node pose
#[derive(Debug, Clone)]
pub struct PlacedModel {
    pub model: ImportedModel,
    pub transform: Transform,
    pose: Vec<Transform>,
    /// World matrix of every node under the current pose
    world: Vec<Mat4>,
    instances: Vec<MeshInstance>,
}

impl PlacedModel {
    pub fn new(model: ImportedModel, transform: Transform) -> Self {
        let pose = model.bind_pose();
        let mut placed = Self {
            model,
            transform,
            pose,
            world: Vec::new(),
            instances: Vec::new(),
        };
        placed.refresh();
        placed
    }

    fn refresh(&mut self) {
        let root = self.transform.to_matrix();
        self.world = self
            .model
            .world_matrices(&self.pose)
            .iter()
            .map(|m| mat4_mul(&root, m))
            .collect();

        let model = &self.model;
        let world = &self.world;
        let mut instances = Vec::new();
        for (i, node) in model.nodes.iter().enumerate() {
            let node_world = world.get(i).copied().unwrap_or(IDENTITY);
            let palette = node
                .skin_index
                .and_then(|s| model.skins.get(s))
                .map(|skin| joint_palette(skin, &node_world, world));

            for &primitive in &node.mesh_primitive_indices {
                let skinned = match (&palette, model.meshes.get(primitive)) {
                    (Some(palette), Some(mesh)) if mesh.is_skinned() => {
                        Some((palette.clone(), skin_positions(mesh, palette)))
                    }
                    _ => None,
                };
                let (joints, posed) = skinned.unzip();
                instances.push(MeshInstance {
                    primitive,
                    world: node_world,
                    joints,
                    posed,
                });
            }
        }
        self.instances = instances;
    }

    /// Replace the node pose, starting from bind pose, via `f`
    pub fn set_pose(&mut self, f: impl FnOnce(&mut [Transform])) {
        self.pose = self.model.bind_pose();
        f(&mut self.pose);
        self.refresh();
    }

    pub fn node_world(&self, node: usize) -> Option<&Mat4> {
        self.world.get(node)
    }

    /// Every primitive to draw, with its world matrix and joint palette
    pub fn instances(&self) -> &[MeshInstance] {
        &self.instances
    }

    /// Vertex positions of an instance in its node's space, posed if skinned
    fn positions<'a>(&'a self, instance: &'a MeshInstance) -> Option<&'a [[f32; 3]]> {
        match &instance.posed {
            Some(posed) => Some(posed.as_slice()),
            None => self.model.meshes.get(instance.primitive).map(|m| m.positions.as_slice()),
        }
    }

    fn local_bounds(&self, instance: &MeshInstance) -> Option<Aabb> {
        match &instance.posed {
            Some(posed) => Aabb::from_positions(posed),
            None => self.model.meshes.get(instance.primitive)?.bounds,
        }
    }

    /// World-space bounds of every mesh under the current pose
    pub fn bounds(&self) -> Option<Aabb> {
        self.instances
            .iter()
            .filter_map(|inst| self.local_bounds(inst).map(|b| b.transformed(&inst.world)))
            .reduce(|a, b| a.union(&b))
    }

    /// Any triangle hit by the ray
    pub fn intersects(&self, ray: &Ray) -> bool {
        self.instances.iter().any(|inst| {
            let (Some(mesh), Some(positions), Some(local_bounds)) = (
                self.model.meshes.get(inst.primitive),
                self.positions(inst),
                self.local_bounds(inst),
            ) else {
                return false;
            };
            if ray_aabb(ray, &local_bounds.transformed(&inst.world)).is_none() {
                return false;
            }

            let local_ray = ray.transformed(&mat4_inverse(&inst.world));
            mesh.indices.chunks_exact(3).any(|tri| {
                let (Some(&a), Some(&b), Some(&c)) = (
                    positions.get(tri[0] as usize),
                    positions.get(tri[1] as usize),
                    positions.get(tri[2] as usize),
                ) else {
                    return false;
                };
                ray_triangle(&local_ray, a, b, c).is_some()
            })
        })
    }
}

/// One of the three animated characters
#[derive(Debug, Clone)]
pub struct Character {
    pub slot: CharacterSlot,
    pub path: String,
    pub placed: PlacedModel,
    mixer: AnimationMixer,
}

impl Character {
    pub fn new(slot: CharacterSlot, path: impl Into<String>, model: ImportedModel, transform: Transform) -> Self {
        let mixer = AnimationMixer::new(&model.clips);
        Self {
            slot,
            path: path.into(),
            placed: PlacedModel::new(model, transform),
            mixer,
        }
    }

    /// Advance the animation and re-pose the node hierarchy
    pub fn update(&mut self, dt: f32) {
        if self.mixer.is_empty() {
            return;
        }
        self.mixer.update(dt);
        let mixer = &self.mixer;
        self.placed.set_pose(|pose| mixer.apply(pose));
    }

    pub fn mixer(&self) -> &AnimationMixer {
        &self.mixer
    }

    pub fn bounds(&self) -> Option<Aabb> {
        self.placed.bounds()
    }
}

impl Pickable for Character {
    fn slot(&self) -> CharacterSlot {
        self.slot
    }

    fn intersects(&self, ray: &Ray) -> bool {
        self.placed.intersects(ray)
    }
}
