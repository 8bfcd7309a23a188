//! Pointer picking via ray casts
//!
//! Unprojects surface coordinates through the camera's inverse
//! view-projection matrix and tests the ray against characters and markers.

use crate::camera::Camera;
use vitrine_core::{Aabb, CharacterSlot, Mat4};

/// A ray in 3D space
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: [f32; 3],
    pub direction: [f32; 3],
}

impl Ray {
    /// Ray through a point on the render surface.
    ///
    /// `x`, `y` are measured from the surface's top-left corner, in the same
    /// units as `width` and `height`.
    pub fn from_screen(x: f32, y: f32, width: f32, height: f32, camera: &Camera) -> Self {
        let (ndc_x, ndc_y) = to_ndc(x, y, width, height);
        Self::from_ndc(ndc_x, ndc_y, camera)
    }

    pub fn from_ndc(ndc_x: f32, ndc_y: f32, camera: &Camera) -> Self {
        let inv_vp = camera.inverse_view_projection_matrix();

        // Depth range is [0, 1]
        let near = unproject(&inv_vp, [ndc_x, ndc_y, 0.0, 1.0]);
        let far = unproject(&inv_vp, [ndc_x, ndc_y, 1.0, 1.0]);

        let dir = [far[0] - near[0], far[1] - near[1], far[2] - near[2]];
        let len = (dir[0] * dir[0] + dir[1] * dir[1] + dir[2] * dir[2]).sqrt();
        let direction = if len > 1e-8 {
            [dir[0] / len, dir[1] / len, dir[2] / len]
        } else {
            [0.0, 0.0, -1.0]
        };

        Self {
            origin: near,
            direction,
        }
    }

    /// The same ray expressed in another space (direction is not renormalized,
    /// so hit distances stay comparable along the ray)
    pub fn transformed(&self, m: &Mat4) -> Self {
        let o = self.origin;
        let d = self.direction;
        Self {
            origin: [
                m[0][0] * o[0] + m[1][0] * o[1] + m[2][0] * o[2] + m[3][0],
                m[0][1] * o[0] + m[1][1] * o[1] + m[2][1] * o[2] + m[3][1],
                m[0][2] * o[0] + m[1][2] * o[1] + m[2][2] * o[2] + m[3][2],
            ],
            direction: [
                m[0][0] * d[0] + m[1][0] * d[1] + m[2][0] * d[2],
                m[0][1] * d[0] + m[1][1] * d[1] + m[2][1] * d[2],
                m[0][2] * d[0] + m[1][2] * d[1] + m[2][2] * d[2],
            ],
        }
    }
}

/// Surface coordinates to normalized device coordinates (+Y up)
pub fn to_ndc(x: f32, y: f32, width: f32, height: f32) -> (f32, f32) {
    let w = width.max(1.0);
    let h = height.max(1.0);
    (2.0 * x / w - 1.0, 1.0 - 2.0 * y / h)
}

fn unproject(inv_vp: &Mat4, clip: [f32; 4]) -> [f32; 3] {
    let mut out = [0.0f32; 4];
    for (row, value) in out.iter_mut().enumerate() {
        *value = (0..4).map(|col| inv_vp[col][row] * clip[col]).sum();
    }
    let w = if out[3].abs() > 1e-12 { out[3] } else { 1.0 };
    [out[0] / w, out[1] / w, out[2] / w]
}

/// Ray-AABB intersection using the slab method.
/// Returns the distance to the nearest hit in front of the origin.
pub fn ray_aabb(ray: &Ray, aabb: &Aabb) -> Option<f32> {
    let mut tmin = f32::NEG_INFINITY;
    let mut tmax = f32::INFINITY;

    for i in 0..3 {
        if ray.direction[i].abs() < 1e-8 {
            if ray.origin[i] < aabb.min[i] || ray.origin[i] > aabb.max[i] {
                return None;
            }
        } else {
            let inv_d = 1.0 / ray.direction[i];
            let mut t1 = (aabb.min[i] - ray.origin[i]) * inv_d;
            let mut t2 = (aabb.max[i] - ray.origin[i]) * inv_d;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }
            tmin = tmin.max(t1);
            tmax = tmax.min(t2);
            if tmin > tmax {
                return None;
            }
        }
    }

    if tmax < 0.0 {
        None
    } else if tmin >= 0.0 {
        Some(tmin)
    } else {
        Some(tmax)
    }
}

/// Möller–Trumbore ray/triangle test, two-sided
pub fn ray_triangle(ray: &Ray, a: [f32; 3], b: [f32; 3], c: [f32; 3]) -> Option<f32> {
    let sub = |p: [f32; 3], q: [f32; 3]| [p[0] - q[0], p[1] - q[1], p[2] - q[2]];
    let cross = |p: [f32; 3], q: [f32; 3]| {
        [
            p[1] * q[2] - p[2] * q[1],
            p[2] * q[0] - p[0] * q[2],
            p[0] * q[1] - p[1] * q[0],
        ]
    };
    let dot = |p: [f32; 3], q: [f32; 3]| p[0] * q[0] + p[1] * q[1] + p[2] * q[2];

    let e1 = sub(b, a);
    let e2 = sub(c, a);
    let p = cross(ray.direction, e2);
    let det = dot(e1, p);
    if det.abs() < 1e-10 {
        return None;
    }
    let inv_det = 1.0 / det;

    let s = sub(ray.origin, a);
    let u = dot(s, p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = cross(s, e1);
    let v = dot(ray.direction, q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = dot(e2, q) * inv_det;
    (t > 0.0).then_some(t)
}

/// Ray-sphere intersection, nearest hit in front of the origin
pub fn ray_sphere(ray: &Ray, center: [f32; 3], radius: f32) -> Option<f32> {
    let oc = [
        ray.origin[0] - center[0],
        ray.origin[1] - center[1],
        ray.origin[2] - center[2],
    ];
    let d = ray.direction;
    let a = d[0] * d[0] + d[1] * d[1] + d[2] * d[2];
    let b = oc[0] * d[0] + oc[1] * d[1] + oc[2] * d[2];
    let c = oc[0] * oc[0] + oc[1] * oc[1] + oc[2] * oc[2] - radius * radius;
    let disc = b * b - a * c;
    if disc < 0.0 || a <= 0.0 {
        return None;
    }
    let sqrt = disc.sqrt();
    let near = (-b - sqrt) / a;
    let far = (-b + sqrt) / a;
    if near > 0.0 {
        Some(near)
    } else if far > 0.0 {
        Some(far)
    } else {
        None
    }
}

/// Something a picking ray can select
pub trait Pickable {
    fn slot(&self) -> CharacterSlot;
    fn intersects(&self, ray: &Ray) -> bool;
}

/// Characters are tested before markers; within each group the first
/// entry with any hit wins, regardless of distance.
pub fn pick(ray: &Ray, characters: &[&dyn Pickable], markers: &[&dyn Pickable]) -> Option<CharacterSlot> {
    characters
        .iter()
        .chain(markers.iter())
        .find(|target| target.intersects(ray))
        .map(|target| target.slot())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Always(CharacterSlot, bool);

    impl Pickable for Always {
        fn slot(&self) -> CharacterSlot {
            self.0
        }
        fn intersects(&self, _ray: &Ray) -> bool {
            self.1
        }
    }

    fn forward_ray() -> Ray {
        Ray {
            origin: [0.0, 0.0, 5.0],
            direction: [0.0, 0.0, -1.0],
        }
    }

    #[test]
    fn center_ray_points_at_target() {
        let camera = Camera::default();
        let ray = Ray::from_screen(640.0, 360.0, 1280.0, 720.0, &camera);
        let to_target = (camera.target - camera.position).normalized();
        assert!((ray.direction[0] - to_target.x).abs() < 1e-3);
        assert!((ray.direction[1] - to_target.y).abs() < 1e-3);
        assert!((ray.direction[2] - to_target.z).abs() < 1e-3);
    }

    #[test]
    fn ndc_corners() {
        assert_eq!(to_ndc(0.0, 0.0, 100.0, 50.0), (-1.0, 1.0));
        assert_eq!(to_ndc(100.0, 50.0, 100.0, 50.0), (1.0, -1.0));
    }

    #[test]
    fn aabb_hit_and_miss() {
        let ray = forward_ray();
        let hit = Aabb::from_min_max([-1.0, -1.0, -1.0], [1.0, 1.0, 1.0]);
        assert!((ray_aabb(&ray, &hit).unwrap() - 4.0).abs() < 1e-6);

        let miss = Aabb::from_min_max([2.0, 2.0, -1.0], [3.0, 3.0, 1.0]);
        assert!(ray_aabb(&ray, &miss).is_none());

        let behind = Aabb::from_min_max([-1.0, -1.0, 6.0], [1.0, 1.0, 7.0]);
        assert!(ray_aabb(&ray, &behind).is_none());
    }

    #[test]
    fn triangle_hit_and_miss() {
        let ray = forward_ray();
        let t = ray_triangle(&ray, [-1.0, -1.0, 0.0], [1.0, -1.0, 0.0], [0.0, 1.0, 0.0]);
        assert!((t.unwrap() - 5.0).abs() < 1e-6);
        assert!(ray_triangle(&ray, [2.0, 2.0, 0.0], [3.0, 2.0, 0.0], [2.0, 3.0, 0.0]).is_none());
    }

    #[test]
    fn sphere_hit_from_outside() {
        let ray = forward_ray();
        let t = ray_sphere(&ray, [0.0, 0.0, 0.0], 0.5).unwrap();
        assert!((t - 4.5).abs() < 1e-6);
        assert!(ray_sphere(&ray, [0.0, 2.0, 0.0], 0.5).is_none());
    }

    #[test]
    fn characters_win_over_markers() {
        let banging = Always(CharacterSlot::Banging, true);
        let sleeping_marker = Always(CharacterSlot::Sleeping, true);
        let slot = pick(&forward_ray(), &[&banging], &[&sleeping_marker]);
        assert_eq!(slot, Some(CharacterSlot::Banging));
    }

    #[test]
    fn first_hit_in_order_wins() {
        let a = Always(CharacterSlot::Sleeping, false);
        let b = Always(CharacterSlot::Typing, true);
        let c = Always(CharacterSlot::Banging, true);
        assert_eq!(pick(&forward_ray(), &[&a, &b, &c], &[]), Some(CharacterSlot::Typing));
        assert_eq!(pick(&forward_ray(), &[&a], &[]), None);
    }

    #[test]
    fn transformed_ray_moves_origin() {
        let m: Mat4 = [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [1.0, 2.0, 3.0, 1.0],
        ];
        let r = forward_ray().transformed(&m);
        assert_eq!(r.origin, [1.0, 2.0, 8.0]);
        assert_eq!(r.direction, [0.0, 0.0, -1.0]);
    }
}
