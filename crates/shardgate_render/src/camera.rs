//! Perspective camera shared by the main view and the portal view
//!
//! The main camera uses a symmetric projection rebuilt from its field of view.
//! The portal camera copies the main camera's pose and clip planes every frame
//! and then has its projection replaced by the frustum fitter.

use shardgate_input::FlightCamera;
use shardgate_math::{symmetric_projection, Mat4, Quat, Vec3, Vec4};

/// Perspective camera
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub rotation: Quat,
    /// Vertical field of view in degrees
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    projection: Mat4,
    /// Projection was set explicitly and is no longer derived from `fov_y`
    custom_projection: bool,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new(45.0, 16.0 / 9.0, 0.1, 60.0)
    }
}

impl PerspectiveCamera {
    /// Create a camera at (0, 0, 5) looking down -Z
    pub fn new(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            rotation: Quat::IDENTITY,
            fov_y,
            aspect,
            near,
            far,
            projection: Mat4::IDENTITY,
            custom_projection: false,
        };
        camera.update_projection();
        camera
    }

    /// Rebuild the symmetric projection from fov/aspect/near/far
    pub fn update_projection(&mut self) {
        self.projection = symmetric_projection(self.fov_y.to_radians(), self.aspect, self.near, self.far);
        self.custom_projection = false;
    }

    /// Replace the projection (off-axis fit)
    pub fn set_projection(&mut self, projection: Mat4) {
        self.projection = projection;
        self.custom_projection = true;
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn has_custom_projection(&self) -> bool {
        self.custom_projection
    }

    /// Update the aspect ratio after a viewport resize
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.aspect = width as f32 / height as f32;
        if !self.custom_projection {
            self.update_projection();
        }
    }

    /// World-to-camera matrix
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position).inverse()
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view_matrix()
    }

    /// Direction the camera looks along (-Z in camera space)
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// Copy pose, field of view and clip planes from another camera
    ///
    /// The projection is rebuilt symmetric; the fitter overrides it afterwards.
    pub fn copy_from(&mut self, other: &PerspectiveCamera) {
        self.position = other.position;
        self.rotation = other.rotation;
        self.fov_y = other.fov_y;
        self.aspect = other.aspect;
        self.near = other.near;
        self.far = other.far;
        self.update_projection();
    }

    /// Rotate so the camera faces `target` with +Y as up
    ///
    /// Ignored when `target` coincides with the camera position.
    pub fn look_at_point(&mut self, target: Vec3) {
        let dir = target - self.position;
        if dir.length_squared() <= f32::EPSILON {
            return;
        }
        let forward = dir.normalize();
        // Pick another up vector when looking straight up or down
        let up = if forward.cross(Vec3::Y).length_squared() <= 1e-8 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        let view = Mat4::look_to_rh(self.position, forward, up);
        self.rotation = Quat::from_mat4(&view.inverse()).normalize();
    }

    /// World-space picking ray through a normalized device coordinate
    ///
    /// `ndc` is in `[-1, 1]²` with +Y up. Returns `(origin, direction)`.
    pub fn screen_ray(&self, ndc_x: f32, ndc_y: f32) -> Option<(Vec3, Vec3)> {
        let inv = self.view_projection().inverse();
        if !inv.is_finite() {
            return None;
        }
        let near = inv * Vec4::new(ndc_x, ndc_y, -1.0, 1.0);
        let far = inv * Vec4::new(ndc_x, ndc_y, 1.0, 1.0);
        if near.w.abs() <= f32::EPSILON || far.w.abs() <= f32::EPSILON {
            return None;
        }
        let near = near.truncate() / near.w;
        let far = far.truncate() / far.w;
        let dir = (far - near).try_normalize()?;
        Some((near, dir))
    }
}

impl FlightCamera for PerspectiveCamera {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn look_at(&mut self, target: Vec3) {
        self.look_at_point(target);
    }
}
