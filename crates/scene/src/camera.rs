use glam::{Mat4, Vec3};

/// Perspective camera that always looks at a target point.
///
/// The projection matrix is cached; after changing `fov_degrees`, `aspect`,
/// `near` or `far`, call [`PerspectiveCamera::update_projection`].
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    projection: Mat4,
}

impl PerspectiveCamera {
    pub fn new(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            position: Vec3::ZERO,
            target: Vec3::NEG_Z,
            fov_degrees,
            aspect,
            near,
            far,
            projection: Mat4::IDENTITY,
        };
        camera.update_projection();
        camera
    }

    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }

    /// Recompute the cached projection from the current parameters.
    pub fn update_projection(&mut self) {
        self.projection = Mat4::perspective_rh(
            self.fov_degrees.to_radians(),
            self.aspect,
            self.near,
            self.far,
        );
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_is_cached_until_updated() {
        let mut cam = PerspectiveCamera::new(75.0, 16.0 / 9.0, 0.1, 200.0);
        let before = cam.projection_matrix();
        cam.aspect = 1.0;
        assert_eq!(cam.projection_matrix(), before);
        cam.update_projection();
        assert_ne!(cam.projection_matrix(), before);
        assert_eq!(
            cam.projection_matrix(),
            Mat4::perspective_rh(75.0_f32.to_radians(), 1.0, 0.1, 200.0)
        );
    }

    #[test]
    fn target_lands_on_view_axis() {
        let mut cam = PerspectiveCamera::new(75.0, 1.0, 0.1, 200.0);
        cam.position = Vec3::new(-1.5, 2.0, 30.0);
        cam.look_at(Vec3::ZERO);
        let in_view = cam.view_matrix().transform_point3(Vec3::ZERO);
        assert!(in_view.x.abs() < 1e-4);
        assert!(in_view.y.abs() < 1e-4);
        assert!(in_view.z < 0.0);
    }

    #[test]
    fn view_projection_is_finite() {
        let mut cam = PerspectiveCamera::new(75.0, 1.5, 0.1, 200.0);
        cam.position = Vec3::new(0.0, 0.0, 30.0);
        cam.look_at(Vec3::ZERO);
        let vp = cam.view_projection();
        assert!(vp.is_finite());
    }
}
