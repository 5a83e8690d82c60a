//! 3D Transform (position, rotation, scale)
//!
//! A Transform places a world root or the portal quad in world space.

use serde::{Deserialize, Serialize};
use shardgate_math::{Mat4, Quat, Vec3};

/// A 3D transform with position, rotation, and per-axis scale
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    /// Position in world space
    pub position: Vec3,
    /// Rotation as a unit quaternion
    pub rotation: Quat,
    /// Per-axis scale
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    /// Create an identity transform
    pub fn identity() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    /// Create a transform with just a position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::identity()
        }
    }

    /// Create a transform with position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            scale: Vec3::ONE,
        }
    }

    /// Replace the scale
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Local-to-world matrix (scale, then rotation, then translation)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Transform a point from local space to world space
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        self.rotation * (p * self.scale) + self.position
    }

    /// Transform a direction from local space to world space (no translation)
    pub fn transform_direction(&self, d: Vec3) -> Vec3 {
        self.rotation * (d * self.scale)
    }

    /// Compose: apply `self` in the space of `parent`
    pub fn then_parent(&self, parent: &Transform) -> Transform {
        Transform {
            position: parent.transform_point(self.position),
            rotation: parent.rotation * self.rotation,
            scale: parent.scale * self.scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_identity_transform() {
        let t = Transform::identity();
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(t.transform_point(p), p);
    }

    #[test]
    fn test_point_matches_matrix() {
        let t = Transform::from_position_rotation(
            Vec3::new(0.0, 1.5, 0.0),
            Quat::from_rotation_y(0.7),
        )
        .with_scale(Vec3::new(2.0, 3.0, 1.0));
        let p = Vec3::new(-0.5, 0.25, 0.0);
        let via_matrix = t.to_matrix().transform_point3(p);
        assert!((t.transform_point(p) - via_matrix).length() < EPSILON);
    }

    #[test]
    fn test_direction_ignores_translation() {
        let t = Transform::from_position(Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(t.transform_direction(Vec3::X), Vec3::X);
    }

    #[test]
    fn test_then_parent() {
        let child = Transform::from_position(Vec3::new(0.0, 0.0, -5.0));
        let parent = Transform::from_position(Vec3::new(0.0, 1.0, 0.0));
        let world = child.then_parent(&parent);
        assert!((world.position - Vec3::new(0.0, 1.0, -5.0)).length() < EPSILON);
    }
}
