//! Floating click markers above the characters
//!
//! Every animated value is a pure function of elapsed time `t`, the
//! character index `i` and, for arrows, the arrow index `k`.

use crate::picking::{ray_sphere, Pickable, Ray};
use std::f32::consts::TAU;
use vitrine_core::{mat4_mul, Aabb, CharacterSlot, Color, Mat4, Vec3};

/// Height of the marker's rest position above the character's top
pub const HOVER_HEIGHT: f32 = 0.5;
pub const BOUNCE_AMPLITUDE: f32 = 0.15;
pub const ARROW_COUNT: usize = 6;
pub const ARROW_RADIUS: f32 = 0.2;
/// Middle glow disc size relative to the outer glow's rest size
pub const MIDDLE_GLOW_SCALE: f32 = 0.7;
/// Radius of the sphere used for marker hit-testing
pub const PICK_RADIUS: f32 = 0.3;

/// Which visual piece of a marker a part is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerElement {
    Core,
    OuterGlow,
    MiddleGlow,
    Arrow(usize),
}

/// One sub-element with its current animated state, in marker-local space
/// (the local XY plane faces the camera)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerPart {
    pub element: MarkerElement,
    pub offset: [f32; 3],
    /// Rotation about the local Z axis, radians
    pub spin: f32,
    pub scale: f32,
    pub opacity: f32,
    pub color: Color,
}

impl MarkerPart {
    fn new(element: MarkerElement, color: Color) -> Self {
        Self {
            element,
            offset: [0.0; 3],
            spin: 0.0,
            scale: 1.0,
            opacity: 1.0,
            color,
        }
    }
}

/// Bounce: `top + 0.5 + sin(t*3 + i*0.8) * 0.15`
pub fn marker_position(bounds: &Aabb, t: f32, i: usize) -> Vec3 {
    let center = bounds.center();
    let bounce = (t * 3.0 + i as f32 * 0.8).sin() * BOUNCE_AMPLITUDE;
    Vec3::new(center[0], bounds.max[1] + HOVER_HEIGHT + bounce, center[2])
}

/// (opacity, scale) of the outer glow disc
pub fn outer_glow(t: f32, i: usize) -> (f32, f32) {
    let i = i as f32;
    (
        0.2 + (t * 4.0 + i).sin() * 0.2,
        1.0 + (t * 3.0 + i * 0.5).sin() * 0.1,
    )
}

pub fn middle_glow_opacity(t: f32, i: usize) -> f32 {
    0.4 + (t * 5.0 + i as f32 * 0.7).sin() * 0.2
}

/// Angle on the ring of arrow `k`
pub fn arrow_angle(t: f32, k: usize) -> f32 {
    (k as f32 / ARROW_COUNT as f32) * TAU + t * 0.5
}

/// Arrow opacity, phase-shifted by `6 + k`
pub fn arrow_opacity(t: f32, k: usize) -> f32 {
    0.6 + (t * 6.0 + (ARROW_COUNT + k) as f32).sin() * 0.2
}

#[derive(Debug, Clone)]
pub struct Marker {
    pub slot: CharacterSlot,
    pub position: Vec3,
    /// Rotation turning local +Z towards the camera (column-major, no translation)
    pub facing: Mat4,
    pub parts: Vec<MarkerPart>,
}

impl Marker {
    pub fn new(slot: CharacterSlot) -> Self {
        let mut parts = vec![
            MarkerPart::new(MarkerElement::Core, Color::from_hex(0xffffff)),
            MarkerPart::new(MarkerElement::OuterGlow, Color::from_hex(0x2afadf)),
            MarkerPart {
                scale: MIDDLE_GLOW_SCALE,
                ..MarkerPart::new(MarkerElement::MiddleGlow, Color::from_hex(0xff0080))
            },
        ];
        parts.extend(
            (0..ARROW_COUNT).map(|k| MarkerPart::new(MarkerElement::Arrow(k), Color::from_hex(0x2afadf))),
        );

        Self {
            slot,
            position: Vec3::ZERO,
            facing: vitrine_core::IDENTITY,
            parts,
        }
    }

    /// Recompute position, orientation and every part for time `t`
    pub fn update(&mut self, t: f32, bounds: &Aabb, camera_position: Vec3) {
        let i = self.slot.index();
        self.position = marker_position(bounds, t, i);
        self.facing = look_at_rotation(self.position, camera_position);

        for part in &mut self.parts {
            match part.element {
                MarkerElement::Core => {}
                MarkerElement::OuterGlow => {
                    let (opacity, scale) = outer_glow(t, i);
                    part.opacity = opacity;
                    part.scale = scale;
                }
                MarkerElement::MiddleGlow => {
                    part.opacity = middle_glow_opacity(t, i);
                }
                MarkerElement::Arrow(k) => {
                    let angle = arrow_angle(t, k);
                    part.offset = [angle.cos() * ARROW_RADIUS, angle.sin() * ARROW_RADIUS, 0.0];
                    part.spin = angle;
                    part.opacity = arrow_opacity(t, k);
                }
            }
        }
    }

    pub fn part(&self, element: MarkerElement) -> Option<&MarkerPart> {
        self.parts.iter().find(|p| p.element == element)
    }

    /// World matrix of one part: T(position) * R(facing) * T(offset) * Rz(spin) * S(scale)
    pub fn part_matrix(&self, part: &MarkerPart) -> Mat4 {
        let mut base = self.facing;
        base[3] = [self.position.x, self.position.y, self.position.z, 1.0];

        let (s, c) = part.spin.sin_cos();
        let k = part.scale;
        let local: Mat4 = [
            [c * k, s * k, 0.0, 0.0],
            [-s * k, c * k, 0.0, 0.0],
            [0.0, 0.0, k, 0.0],
            [part.offset[0], part.offset[1], part.offset[2], 1.0],
        ];
        mat4_mul(&base, &local)
    }
}

impl Pickable for Marker {
    fn slot(&self) -> CharacterSlot {
        self.slot
    }

    fn intersects(&self, ray: &Ray) -> bool {
        ray_sphere(ray, self.position.to_array(), PICK_RADIUS).is_some()
    }
}

/// Rotation whose +Z axis points from `from` towards `to`
fn look_at_rotation(from: Vec3, to: Vec3) -> Mat4 {
    let z = (to - from).normalized();
    if z.length() < 0.5 {
        return vitrine_core::IDENTITY;
    }
    let mut x = Vec3::UP.cross(&z);
    if x.length() < 1e-6 {
        // Looking straight up or down
        x = Vec3::new(1.0, 0.0, 0.0);
    }
    let x = x.normalized();
    let y = z.cross(&x);

    [
        [x.x, x.y, x.z, 0.0],
        [y.x, y.y, y.z, 0.0],
        [z.x, z.y, z.z, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrine_core::mat4_transform_point;

    fn bounds() -> Aabb {
        Aabb::from_min_max([-0.5, -0.5, -0.3], [0.5, 2.0, 0.3])
    }

    #[test]
    fn bounce_stays_within_band() {
        let b = bounds();
        for i in 0..3 {
            for step in 0..2000 {
                let t = step as f32 * 0.01;
                let y = marker_position(&b, t, i).y;
                assert!(y >= b.max[1] + 0.35 - 1e-5 && y <= b.max[1] + 0.65 + 1e-5, "t={t} i={i} y={y}");
            }
        }
    }

    #[test]
    fn marker_centered_over_bounds() {
        let p = marker_position(&bounds(), 0.0, 0);
        assert_eq!((p.x, p.z), (0.0, 0.0));
        assert!((p.y - 2.5).abs() < 1e-6);
    }

    #[test]
    fn glow_values_at_known_times() {
        let (opacity, scale) = outer_glow(0.0, 0);
        assert!((opacity - 0.2).abs() < 1e-6);
        assert!((scale - 1.0).abs() < 1e-6);
        assert!((middle_glow_opacity(0.0, 0) - 0.4).abs() < 1e-6);
        for step in 0..500 {
            let t = step as f32 * 0.037;
            let (o, s) = outer_glow(t, 2);
            assert!((0.0..=0.4 + 1e-6).contains(&o));
            assert!((0.9 - 1e-6..=1.1 + 1e-6).contains(&s));
        }
    }

    #[test]
    fn arrows_ring_the_core() {
        let mut marker = Marker::new(CharacterSlot::Typing);
        marker.update(1.3, &bounds(), Vec3::new(0.0, 1.0, 5.0));

        let arrows: Vec<&MarkerPart> = marker
            .parts
            .iter()
            .filter(|p| matches!(p.element, MarkerElement::Arrow(_)))
            .collect();
        assert_eq!(arrows.len(), ARROW_COUNT);

        for part in arrows {
            let MarkerElement::Arrow(k) = part.element else {
                unreachable!()
            };
            let r = (part.offset[0].powi(2) + part.offset[1].powi(2)).sqrt();
            assert!((r - ARROW_RADIUS).abs() < 1e-6);
            assert!((part.spin - arrow_angle(1.3, k)).abs() < 1e-6);
            assert!((part.opacity - arrow_opacity(1.3, k)).abs() < 1e-6);
        }
    }

    #[test]
    fn arrow_spacing_is_even() {
        let step = arrow_angle(0.0, 1) - arrow_angle(0.0, 0);
        assert!((step - TAU / 6.0).abs() < 1e-6);
        assert!((arrow_angle(2.0, 0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn update_is_deterministic() {
        let mut a = Marker::new(CharacterSlot::Banging);
        let mut b = Marker::new(CharacterSlot::Banging);
        let cam = Vec3::new(0.0, 1.0, 5.0);
        a.update(0.7, &bounds(), cam);
        a.update(3.1, &bounds(), cam);
        b.update(3.1, &bounds(), cam);
        assert_eq!(a.position, b.position);
        assert_eq!(a.parts, b.parts);
    }

    #[test]
    fn marker_faces_camera() {
        let mut marker = Marker::new(CharacterSlot::Sleeping);
        let camera = Vec3::new(3.0, 2.5, 4.0);
        marker.update(0.0, &bounds(), camera);
        let z = marker.facing[2];
        let to_camera = (camera - marker.position).normalized();
        assert!((z[0] - to_camera.x).abs() < 1e-5);
        assert!((z[1] - to_camera.y).abs() < 1e-5);
        assert!((z[2] - to_camera.z).abs() < 1e-5);
    }

    #[test]
    fn part_matrix_places_arrow_on_ring() {
        let mut marker = Marker::new(CharacterSlot::Sleeping);
        marker.update(0.0, &bounds(), Vec3::new(0.0, 2.5, 10.0));
        let arrow = *marker.part(MarkerElement::Arrow(0)).unwrap();
        let p = mat4_transform_point(&marker.part_matrix(&arrow), [0.0, 0.0, 0.0]);
        assert!((p[0] - (marker.position.x + ARROW_RADIUS)).abs() < 1e-4);
        assert!((p[1] - marker.position.y).abs() < 1e-4);
    }
}
