//! Perspective camera with responsive projection parameters

use vitrine_core::{mat4_mul, CameraConfig, Mat4, Vec3, IDENTITY};

/// Field of view and near plane chosen from the viewport width
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionParams {
    /// Vertical field of view in degrees
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl ProjectionParams {
    /// Narrow viewports (below the breakpoint) get the wider mobile lens
    pub fn for_width(width: f32, config: &CameraConfig) -> Self {
        if width < config.mobile_breakpoint {
            Self {
                fov: config.mobile_fov,
                near: config.mobile_near,
                far: config.far,
            }
        } else {
            Self {
                fov: config.desktop_fov,
                near: config.desktop_near,
                far: config.far,
            }
        }
    }
}

/// A 3D perspective camera looking at a target point
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Field of view in degrees
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Aspect ratio (width / height)
    pub aspect: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default(), 1280.0, 720.0)
    }
}

impl Camera {
    /// Build the showcase camera for a viewport of the given logical size
    pub fn from_config(config: &CameraConfig, width: f32, height: f32) -> Self {
        let params = ProjectionParams::for_width(width, config);
        Self {
            position: Vec3::from_array(config.position),
            target: Vec3::from_array(config.target),
            up: Vec3::UP,
            fov: params.fov,
            near: params.near,
            far: params.far,
            aspect: aspect_ratio(width, height),
        }
    }

    pub fn apply_params(&mut self, params: ProjectionParams) {
        self.fov = params.fov;
        self.near = params.near;
        self.far = params.far;
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.aspect = aspect_ratio(width, height);
    }

    pub fn params(&self) -> ProjectionParams {
        ProjectionParams {
            fov: self.fov,
            near: self.near,
            far: self.far,
        }
    }

    /// Get camera position as an array for GPU upload
    pub fn position_array(&self) -> [f32; 3] {
        self.position.to_array()
    }

    /// Get the view matrix (4x4, column-major)
    pub fn view_matrix(&self) -> Mat4 {
        let f = (self.target - self.position).normalized();
        let s = f.cross(&self.up).normalized();
        let u = s.cross(&f);

        [
            [s.x, u.x, -f.x, 0.0],
            [s.y, u.y, -f.y, 0.0],
            [s.z, u.z, -f.z, 0.0],
            [
                -s.dot(&self.position),
                -u.dot(&self.position),
                f.dot(&self.position),
                1.0,
            ],
        ]
    }

    /// Get the projection matrix (4x4, column-major).
    ///
    /// Depth maps to [0, 1]: z_view = -near -> 0, z_view = -far -> 1.
    pub fn projection_matrix(&self) -> Mat4 {
        let f = 1.0 / (self.fov.to_radians() / 2.0).tan();
        let range = self.near - self.far;

        [
            [f / self.aspect, 0.0, 0.0, 0.0],
            [0.0, f, 0.0, 0.0],
            [0.0, 0.0, self.far / range, -1.0],
            [0.0, 0.0, self.near * self.far / range, 0.0],
        ]
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        mat4_mul(&self.projection_matrix(), &self.view_matrix())
    }

    /// Inverse of the combined view-projection matrix (for unprojecting)
    pub fn inverse_view_projection_matrix(&self) -> Mat4 {
        mat4_inverse(&self.view_projection_matrix())
    }

    /// View matrix with translation removed, for the sky sphere
    pub fn rotation_only_view_projection(&self) -> Mat4 {
        let mut view = self.view_matrix();
        view[3] = [0.0, 0.0, 0.0, 1.0];
        mat4_mul(&self.projection_matrix(), &view)
    }
}

fn aspect_ratio(width: f32, height: f32) -> f32 {
    if width > 0.0 && height > 0.0 {
        width / height
    } else {
        1.0
    }
}

/// Inverse of a 4x4 column-major matrix by cofactor expansion.
///
/// Singular matrices return the identity.
pub fn mat4_inverse(m: &Mat4) -> Mat4 {
    let s = |col: usize, row: usize| -> f32 { m[col][row] };

    let c00 = s(2, 2) * s(3, 3) - s(3, 2) * s(2, 3);
    let c02 = s(1, 2) * s(3, 3) - s(3, 2) * s(1, 3);
    let c03 = s(1, 2) * s(2, 3) - s(2, 2) * s(1, 3);

    let c04 = s(2, 1) * s(3, 3) - s(3, 1) * s(2, 3);
    let c06 = s(1, 1) * s(3, 3) - s(3, 1) * s(1, 3);
    let c07 = s(1, 1) * s(2, 3) - s(2, 1) * s(1, 3);

    let c08 = s(2, 1) * s(3, 2) - s(3, 1) * s(2, 2);
    let c10 = s(1, 1) * s(3, 2) - s(3, 1) * s(1, 2);
    let c11 = s(1, 1) * s(2, 2) - s(2, 1) * s(1, 2);

    let c12 = s(2, 0) * s(3, 3) - s(3, 0) * s(2, 3);
    let c14 = s(1, 0) * s(3, 3) - s(3, 0) * s(1, 3);
    let c15 = s(1, 0) * s(2, 3) - s(2, 0) * s(1, 3);

    let c16 = s(2, 0) * s(3, 2) - s(3, 0) * s(2, 2);
    let c18 = s(1, 0) * s(3, 2) - s(3, 0) * s(1, 2);
    let c19 = s(1, 0) * s(2, 2) - s(2, 0) * s(1, 2);

    let c20 = s(2, 0) * s(3, 1) - s(3, 0) * s(2, 1);
    let c22 = s(1, 0) * s(3, 1) - s(3, 0) * s(1, 1);
    let c23 = s(1, 0) * s(2, 1) - s(2, 0) * s(1, 1);

    let f0 = [c00, c00, c02, c03];
    let f1 = [c04, c04, c06, c07];
    let f2 = [c08, c08, c10, c11];
    let f3 = [c12, c12, c14, c15];
    let f4 = [c16, c16, c18, c19];
    let f5 = [c20, c20, c22, c23];

    let v0 = [s(1, 0), s(0, 0), s(0, 0), s(0, 0)];
    let v1 = [s(1, 1), s(0, 1), s(0, 1), s(0, 1)];
    let v2 = [s(1, 2), s(0, 2), s(0, 2), s(0, 2)];
    let v3 = [s(1, 3), s(0, 3), s(0, 3), s(0, 3)];

    let mut inv = [[0.0f32; 4]; 4];
    let sign_a = [1.0, -1.0, 1.0, -1.0];
    let sign_b = [-1.0, 1.0, -1.0, 1.0];

    for i in 0..4 {
        inv[0][i] = sign_a[i] * (v1[i] * f0[i] - v2[i] * f1[i] + v3[i] * f2[i]);
        inv[1][i] = sign_b[i] * (v0[i] * f0[i] - v2[i] * f3[i] + v3[i] * f4[i]);
        inv[2][i] = sign_a[i] * (v0[i] * f1[i] - v1[i] * f3[i] + v3[i] * f5[i]);
        inv[3][i] = sign_b[i] * (v0[i] * f2[i] - v1[i] * f4[i] + v2[i] * f5[i]);
    }

    let det = s(0, 0) * inv[0][0] + s(1, 0) * inv[0][1] + s(2, 0) * inv[0][2] + s(3, 0) * inv[0][3];
    if det.abs() < 1e-10 {
        return IDENTITY;
    }

    let inv_det = 1.0 / det;
    for col in &mut inv {
        for val in col.iter_mut() {
            *val *= inv_det;
        }
    }
    inv
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrine_core::mat4_transform_point;

    #[test]
    fn narrow_viewport_selects_mobile_lens() {
        let config = CameraConfig::default();
        let params = ProjectionParams::for_width(500.0, &config);
        assert_eq!(params.fov, 95.0);
        assert_eq!(params.near, 0.5);
        assert_eq!(params.far, 2000.0);
    }

    #[test]
    fn wide_viewport_selects_desktop_lens() {
        let config = CameraConfig::default();
        let params = ProjectionParams::for_width(1200.0, &config);
        assert_eq!(params.fov, 75.0);
        assert_eq!(params.near, 0.1);
    }

    #[test]
    fn breakpoint_width_is_desktop() {
        let params = ProjectionParams::for_width(768.0, &CameraConfig::default());
        assert_eq!(params.fov, 75.0);
    }

    #[test]
    fn camera_starts_at_config_position() {
        let camera = Camera::from_config(&CameraConfig::default(), 1200.0, 600.0);
        assert_eq!(camera.position, Vec3::new(0.0, 1.0, 5.0));
        assert!((camera.aspect - 2.0).abs() < 1e-6);
    }

    #[test]
    fn inverse_round_trips_view_projection() {
        let camera = Camera::default();
        let vp = camera.view_projection_matrix();
        let product = mat4_mul(&camera.inverse_view_projection_matrix(), &vp);
        for (i, col) in product.iter().enumerate() {
            for (j, v) in col.iter().enumerate() {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((v - expected).abs() < 1e-3, "[{i}][{j}] = {v}");
            }
        }
    }

    #[test]
    fn target_projects_to_screen_center() {
        let camera = Camera::default();
        let vp = camera.view_projection_matrix();
        // Homogeneous divide by w for the origin
        let clip_w = vp[3][3];
        let p = mat4_transform_point(&vp, [0.0, 0.0, 0.0]);
        assert!((p[0] / clip_w).abs() < 1e-5);
        assert!((p[1] / clip_w).abs() < 1e-5);
        let depth = p[2] / clip_w;
        assert!(depth > 0.0 && depth < 1.0);
    }

    #[test]
    fn zero_sized_viewport_keeps_unit_aspect() {
        let mut camera = Camera::default();
        camera.set_viewport(0.0, 0.0);
        assert_eq!(camera.aspect, 1.0);
    }
}
