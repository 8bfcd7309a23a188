//! Damped horizontal orbit around a fixed target
//!
//! The camera offset from the target is kept in spherical coordinates
//! (radius, azimuth `theta` about +Y measured from +Z, polar `phi` from +Y).
//! Rotation requests accumulate into a pending delta that is eased in by
//! `damping` every update, so a single wheel notch glides to rest.

use crate::camera::Camera;
use vitrine_core::Vec3;

/// The two rotation primitives input handlers may drive
pub trait RotationControl {
    /// Rotate the view left by `angle` radians (azimuth decreases)
    fn rotate_left(&mut self, angle: f32);
    /// Rotate the view up by `angle` radians (polar angle decreases)
    fn rotate_up(&mut self, angle: f32);
}

#[derive(Debug, Clone)]
pub struct DampedOrbit {
    target: Vec3,
    radius: f32,
    theta: f32,
    phi: f32,
    min_polar: f32,
    max_polar: f32,
    delta_theta: f32,
    delta_phi: f32,
    damping: f32,
    enabled: bool,
}

impl DampedOrbit {
    /// Orbit the camera's current position around its target.
    ///
    /// The polar angle is locked to its value at construction, so only
    /// horizontal rotation remains.
    pub fn new(camera: &Camera, damping: f32) -> Self {
        let offset = camera.position - camera.target;
        let radius = offset.length();
        let theta = offset.x.atan2(offset.z);
        let phi = if radius > 0.0 {
            (offset.y / radius).clamp(-1.0, 1.0).acos()
        } else {
            0.0
        };

        Self {
            target: camera.target,
            radius,
            theta,
            phi,
            min_polar: phi,
            max_polar: phi,
            delta_theta: 0.0,
            delta_phi: 0.0,
            damping,
            enabled: true,
        }
    }

    pub fn azimuth(&self) -> f32 {
        self.theta
    }

    pub fn polar(&self) -> f32 {
        self.phi
    }

    /// Leftward rotation requested but not yet applied
    pub fn pending_left(&self) -> f32 {
        -self.delta_theta
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Detach from input; later rotation requests are ignored
    pub fn dispose(&mut self) {
        self.enabled = false;
        self.delta_theta = 0.0;
        self.delta_phi = 0.0;
    }

    /// Ease in a fraction of the pending rotation and reposition the camera.
    ///
    /// Returns true when the camera moved.
    pub fn update(&mut self, camera: &mut Camera) -> bool {
        if !self.enabled {
            return false;
        }

        let step_theta = self.delta_theta * self.damping;
        let step_phi = self.delta_phi * self.damping;
        self.theta += step_theta;
        self.phi = (self.phi + step_phi).clamp(self.min_polar, self.max_polar);

        self.delta_theta *= 1.0 - self.damping;
        self.delta_phi *= 1.0 - self.damping;
        if self.delta_theta.abs() < 1e-6 {
            self.delta_theta = 0.0;
        }
        if self.delta_phi.abs() < 1e-6 {
            self.delta_phi = 0.0;
        }

        let sin_phi = self.phi.sin();
        camera.position = Vec3::new(
            self.target.x + self.radius * sin_phi * self.theta.sin(),
            self.target.y + self.radius * self.phi.cos(),
            self.target.z + self.radius * sin_phi * self.theta.cos(),
        );
        camera.target = self.target;

        step_theta != 0.0 || step_phi != 0.0
    }
}

impl RotationControl for DampedOrbit {
    fn rotate_left(&mut self, angle: f32) {
        if self.enabled {
            self.delta_theta -= angle;
        }
    }

    fn rotate_up(&mut self, angle: f32) {
        if self.enabled {
            self.delta_phi -= angle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orbit() -> (DampedOrbit, Camera) {
        let camera = Camera::default();
        (DampedOrbit::new(&camera, 0.05), camera)
    }

    #[test]
    fn initial_position_is_preserved() {
        let (mut orbit, mut camera) = orbit();
        orbit.update(&mut camera);
        assert!((camera.position.x - 0.0).abs() < 1e-5);
        assert!((camera.position.y - 1.0).abs() < 1e-5);
        assert!((camera.position.z - 5.0).abs() < 1e-5);
    }

    #[test]
    fn rotation_converges_to_requested_angle() {
        let (mut orbit, mut camera) = orbit();
        let start = orbit.azimuth();
        orbit.rotate_left(0.2);
        for _ in 0..1000 {
            orbit.update(&mut camera);
        }
        assert!((orbit.azimuth() - (start - 0.2)).abs() < 1e-4);
        assert_eq!(orbit.pending_left(), 0.0);
    }

    #[test]
    fn first_update_applies_damping_fraction() {
        let (mut orbit, mut camera) = orbit();
        orbit.rotate_left(1.0);
        orbit.update(&mut camera);
        assert!((orbit.azimuth() + 0.05).abs() < 1e-6);
        assert!((orbit.pending_left() - 0.95).abs() < 1e-6);
    }

    #[test]
    fn polar_angle_is_locked() {
        let (mut orbit, mut camera) = orbit();
        let polar = orbit.polar();
        orbit.rotate_up(0.5);
        for _ in 0..200 {
            orbit.update(&mut camera);
        }
        assert_eq!(orbit.polar(), polar);
        assert!((camera.position.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn disposed_orbit_ignores_input() {
        let (mut orbit, mut camera) = orbit();
        orbit.dispose();
        orbit.rotate_left(1.0);
        assert_eq!(orbit.pending_left(), 0.0);
        assert!(!orbit.update(&mut camera));
    }
}
