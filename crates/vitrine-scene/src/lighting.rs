//! The fixed showcase light rig

use vitrine_core::{Color, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: Color,
    pub intensity: f32,
}

/// Light arriving from `position` towards the origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub name: &'static str,
    pub position: Vec3,
    pub color: Color,
    pub intensity: f32,
}

impl DirectionalLight {
    /// Unit vector pointing from the scene towards the light
    pub fn direction(&self) -> Vec3 {
        self.position.normalized()
    }
}

/// Omni light with inverse-square falloff
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Color,
    pub intensity: f32,
}

/// Sky/ground gradient ambient term
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HemisphereLight {
    pub sky: Color,
    pub ground: Color,
    pub intensity: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LightRig {
    pub ambient: AmbientLight,
    pub directional: Vec<DirectionalLight>,
    pub points: Vec<PointLight>,
    pub hemisphere: HemisphereLight,
}

impl LightRig {
    /// Ambient, key/fill/rim directionals, three accent points and a hemisphere
    pub fn showcase() -> Self {
        Self {
            ambient: AmbientLight {
                color: Color::WHITE,
                intensity: 0.4,
            },
            directional: vec![
                DirectionalLight {
                    name: "key",
                    position: Vec3::new(5.0, 10.0, 5.0),
                    color: Color::WHITE,
                    intensity: 1.2,
                },
                DirectionalLight {
                    name: "fill",
                    position: Vec3::new(-5.0, 5.0, 2.0),
                    color: Color::WHITE,
                    intensity: 0.8,
                },
                DirectionalLight {
                    name: "rim",
                    position: Vec3::new(0.0, 8.0, -5.0),
                    color: Color::WHITE,
                    intensity: 0.6,
                },
            ],
            points: vec![
                PointLight {
                    position: Vec3::new(0.0, 0.8, -1.0),
                    color: Color::WHITE,
                    intensity: 1.5,
                },
                PointLight {
                    position: Vec3::new(2.0, 0.2, 1.0),
                    color: Color::from_hex(0x00ccff),
                    intensity: 1.2,
                },
                PointLight {
                    position: Vec3::new(-2.0, 1.5, 2.0),
                    color: Color::from_hex(0xff66cc),
                    intensity: 0.8,
                },
            ],
            hemisphere: HemisphereLight {
                sky: Color::WHITE,
                ground: Color::from_hex(0x333333),
                intensity: 0.8,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rig_has_expected_light_counts() {
        let rig = LightRig::showcase();
        assert_eq!(rig.directional.len(), 3);
        assert_eq!(rig.points.len(), 3);
        assert_eq!(rig.ambient.intensity, 0.4);
        assert_eq!(rig.hemisphere.intensity, 0.8);
    }

    #[test]
    fn key_light_direction_is_normalized() {
        let key = LightRig::showcase().directional[0];
        assert_eq!(key.name, "key");
        assert!((key.direction().length() - 1.0).abs() < 1e-6);
        assert!(key.direction().y > 0.0);
    }
}
