use glam::{Mat4, Vec3};

use crate::scene::CameraConfig;

/// Orbit camera constrained the way the demos configure their controls:
/// clamped polar and azimuth angles, clamped dolly distance, no panning.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    config: CameraConfig,
    distance: f32,
    /// Angle from the +Y axis, radians.
    polar: f32,
    /// Angle around +Y measured from +Z, radians.
    azimuth: f32,
    aspect: f32,
}

const MIN_POLAR: f32 = 1e-3;

impl OrbitCamera {
    pub fn new(config: CameraConfig, width: u32, height: u32) -> Self {
        let offset = config.position - config.target;
        let distance = offset.length().max(f32::EPSILON);
        let polar = (offset.y / distance).clamp(-1.0, 1.0).acos();
        let azimuth = offset.x.atan2(offset.z);
        let mut camera = Self {
            config,
            distance,
            polar,
            azimuth,
            aspect: 1.0,
        };
        camera.set_viewport(width, height);
        camera.apply_limits();
        camera
    }

    /// Recomputes the aspect ratio from a new viewport size.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.aspect = if height == 0 {
            1.0
        } else {
            width as f32 / height as f32
        };
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Rotates by mouse-drag deltas, in radians.
    pub fn rotate(&mut self, d_azimuth: f32, d_polar: f32) {
        self.azimuth += d_azimuth;
        self.polar += d_polar;
        self.apply_limits();
    }

    /// Dollies in or out; positive zooms in.
    pub fn zoom(&mut self, amount: f32) {
        self.distance -= amount;
        self.apply_limits();
    }

    fn apply_limits(&mut self) {
        self.polar = self.polar.clamp(MIN_POLAR, self.config.max_polar);
        self.azimuth = self
            .azimuth
            .clamp(self.config.min_azimuth, self.config.max_azimuth);
        self.distance = self
            .distance
            .clamp(self.config.min_distance, self.config.max_distance);
    }

    pub fn position(&self) -> Vec3 {
        let sin_polar = self.polar.sin();
        let offset = Vec3::new(
            sin_polar * self.azimuth.sin(),
            self.polar.cos(),
            sin_polar * self.azimuth.cos(),
        ) * self.distance;
        self.config.target + offset
    }

    pub fn target(&self) -> Vec3 {
        self.config.target
    }

    pub fn view_proj(&self) -> Mat4 {
        let view = Mat4::look_at_rh(self.position(), self.config.target, Vec3::Y);
        let projection = Mat4::perspective_rh(
            self.config.fov_deg.to_radians(),
            self.aspect.max(0.01),
            self.config.near,
            self.config.far,
        );
        projection * view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::showcase_scene;

    fn camera() -> OrbitCamera {
        OrbitCamera::new(showcase_scene().camera, 1280, 720)
    }

    #[test]
    fn viewport_sets_the_aspect_ratio() {
        let mut camera = camera();
        assert!((camera.aspect() - 1280.0 / 720.0).abs() < 1e-6);
        camera.set_viewport(800, 600);
        assert!((camera.aspect() - 800.0 / 600.0).abs() < 1e-6);
        camera.set_viewport(100, 0);
        assert_eq!(camera.aspect(), 1.0);
    }

    #[test]
    fn initial_pose_reconstructs_the_configured_position() {
        let camera = camera();
        let expected = showcase_scene().camera.position;
        assert!((camera.position() - expected).length() < 1e-4);
    }

    #[test]
    fn azimuth_is_clamped_to_the_configured_range() {
        let mut camera = camera();
        camera.rotate(10.0, 0.0);
        let config = showcase_scene().camera;
        let offset = camera.position() - camera.target();
        let azimuth = offset.x.atan2(offset.z);
        assert!(azimuth <= config.max_azimuth + 1e-5);
        camera.rotate(-20.0, 0.0);
        let offset = camera.position() - camera.target();
        let azimuth = offset.x.atan2(offset.z);
        assert!(azimuth >= config.min_azimuth - 1e-5);
    }

    #[test]
    fn polar_never_goes_below_the_horizon() {
        let mut camera = camera();
        camera.rotate(0.0, 10.0);
        // polar is clamped to PI/2, so the camera stays at or above the target plane
        assert!(camera.position().y >= camera.target().y - 1e-4);
    }

    #[test]
    fn zoom_respects_distance_limits() {
        let mut camera = camera();
        let config = showcase_scene().camera;
        camera.zoom(100.0);
        let near = (camera.position() - camera.target()).length();
        assert!((near - config.min_distance).abs() < 1e-4);
        camera.zoom(-100.0);
        let far = (camera.position() - camera.target()).length();
        assert!((far - config.max_distance).abs() < 1e-4);
    }

    #[test]
    fn view_proj_is_finite() {
        let camera = camera();
        let matrix = camera.view_proj();
        assert!(matrix.to_cols_array().iter().all(|v| v.is_finite()));
    }
}
