use crate::config::LightConfig;
use glam::Vec3;
use glowgrid_common::{Color, Transform};

/// One-sided rectangular area light. Emits along its local -Z axis.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaLight {
    pub color: Color,
    pub intensity: f32,
    pub width: f32,
    pub height: f32,
    pub transform: Transform,
}

impl AreaLight {
    pub fn new(color: Color, intensity: f32, width: f32, height: f32) -> Self {
        Self {
            color,
            intensity,
            width,
            height,
            transform: Transform::default(),
        }
    }

    pub fn from_config(config: &LightConfig) -> Self {
        let mut light = Self::new(config.color, config.intensity, config.width, config.height);
        light.transform.position = config.position;
        light.rotate_y(config.yaw_degrees.to_radians());
        light
    }

    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.transform.position = position;
    }

    pub fn rotate_y(&mut self, angle: f32) {
        self.transform.rotate_y(angle);
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// World-space half-width and half-height vectors of the rectangle.
    pub fn half_extents(&self) -> (Vec3, Vec3) {
        let rotation = self.transform.rotation;
        (
            rotation * Vec3::X * (self.width * 0.5),
            rotation * Vec3::Y * (self.height * 0.5),
        )
    }

    pub fn emission_direction(&self) -> Vec3 {
        self.transform.rotation * Vec3::NEG_Z
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;

    #[test]
    fn default_rect_light_faces_camera() {
        let light = AreaLight::from_config(&SceneConfig::default().rect_light);
        assert_eq!(light.position(), Vec3::new(0.0, 0.0, -1.0));
        assert!((light.emission_direction() - Vec3::Z).length() < 1e-5);
        assert_eq!(light.area(), 900.0);
    }

    #[test]
    fn half_extents_follow_size_and_rotation() {
        let mut light = AreaLight::new(Color::WHITE, 1.0, 4.0, 2.0);
        let (hw, hh) = light.half_extents();
        assert_eq!(hw, Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(hh, Vec3::new(0.0, 1.0, 0.0));

        light.rotate_y(std::f32::consts::PI);
        let (hw, hh) = light.half_extents();
        assert!((hw - Vec3::new(-2.0, 0.0, 0.0)).length() < 1e-5);
        assert!((hh - Vec3::new(0.0, 1.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn zero_sized_light_has_no_extent() {
        let light = AreaLight::new(Color::WHITE, 1.0, 0.0, 0.0);
        let (hw, hh) = light.half_extents();
        assert_eq!(hw.length(), 0.0);
        assert_eq!(hh.length(), 0.0);
    }
}
