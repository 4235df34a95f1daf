use foundation::math::{Mat4, Vec3, mat4_look_at_rh, mat4_mul, mat4_perspective_rh_z0};

use crate::config::CameraConfig;

/// Output size of the render surface, in CSS pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f64 {
        if self.height <= 0.0 {
            1.0
        } else {
            (self.width / self.height).max(1e-6)
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub fov_y_rad: f64,
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
    pub position: Vec3,
    pub target: Vec3,
}

impl PerspectiveCamera {
    pub fn new(config: &CameraConfig, viewport: Viewport) -> Self {
        Self {
            fov_y_rad: config.fov_deg.to_radians(),
            aspect: viewport.aspect(),
            near: config.near,
            far: config.far,
            position: Vec3::new(0.0, 0.0, config.distance),
            target: Vec3::ZERO,
        }
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.aspect = viewport.aspect();
    }

    pub fn view_proj(&self) -> Mat4 {
        let view = mat4_look_at_rh(self.position, self.target, Vec3::new(0.0, 1.0, 0.0));
        let proj = mat4_perspective_rh_z0(self.fov_y_rad, self.aspect, self.near, self.far);
        mat4_mul(proj, view)
    }
}

#[cfg(test)]
mod tests {
    use super::{PerspectiveCamera, Viewport};
    use crate::config::CameraConfig;
    use foundation::math::{Vec3, mat4_transform_point};

    #[test]
    fn default_camera_sits_five_units_back() {
        let cam = PerspectiveCamera::new(&CameraConfig::default(), Viewport::new(1600.0, 900.0));
        assert_eq!(cam.position, Vec3::new(0.0, 0.0, 5.0));
        assert!((cam.fov_y_rad - 75f64.to_radians()).abs() < 1e-12);
        assert!((cam.aspect - 16.0 / 9.0).abs() < 1e-12);
    }

    #[test]
    fn zero_height_viewport_falls_back_to_square() {
        assert_eq!(Viewport::new(100.0, 0.0).aspect(), 1.0);
    }

    #[test]
    fn origin_projects_to_screen_center() {
        let cam = PerspectiveCamera::new(&CameraConfig::default(), Viewport::new(800.0, 600.0));
        let clip = mat4_transform_point(cam.view_proj(), [0.0, 0.0, 0.0]);
        assert!(clip[3] > 0.0);
        assert!((clip[0] / clip[3]).abs() < 1e-6);
        assert!((clip[1] / clip[3]).abs() < 1e-6);
        let depth = clip[2] / clip[3];
        assert!((0.0..=1.0).contains(&depth));
    }
}
