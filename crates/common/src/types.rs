use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Spatial transform: position, rotation, scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Identity rotation and scale, placed at `position`.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Rotate about the local Y axis by `angle` radians.
    pub fn rotate_y(&mut self, angle: f32) {
        self.rotation *= Quat::from_rotation_y(angle);
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_default_is_identity() {
        let t = Transform::default();
        assert_eq!(t.position, Vec3::ZERO);
        assert_eq!(t.rotation, Quat::IDENTITY);
        assert_eq!(t.scale, Vec3::ONE);
    }

    #[test]
    fn rotate_y_half_turn_flips_forward() {
        let mut t = Transform::default();
        t.rotate_y(std::f32::consts::PI);
        let forward = t.rotation * Vec3::NEG_Z;
        assert!((forward - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn matrix_carries_translation() {
        let t = Transform::from_position(Vec3::new(4.0, -8.0, 0.0));
        let m = t.matrix();
        assert_eq!(m.w_axis.truncate(), Vec3::new(4.0, -8.0, 0.0));
    }
}
