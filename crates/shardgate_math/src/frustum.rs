//! Off-axis perspective projection
//!
//! Fits an asymmetric frustum so that its near-plane rectangle covers a
//! portal quad exactly as seen from an eye point (generalized perspective
//! projection, Kooima 2008). Matrices use the OpenGL clip convention
//! (NDC depth in -1..1), the same convention as the main camera projection.

use glam::{Mat3, Mat4, Quat, Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// Smallest eye-to-plane distance used when building a frustum.
///
/// An eye lying on the portal plane would otherwise divide by zero.
pub const MIN_PLANE_DISTANCE: f32 = 1e-4;

/// Minimum parallelogram area for a corner set to count as non-degenerate
const MIN_CORNER_AREA: f32 = 1e-8;

/// Three world-space corners of a portal quad
///
/// The fourth corner (top-right) is implied: `bottom_right + top_left - bottom_left`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PortalCorners {
    pub bottom_left: Vec3,
    pub bottom_right: Vec3,
    pub top_left: Vec3,
}

impl PortalCorners {
    /// Create a corner set
    pub fn new(bottom_left: Vec3, bottom_right: Vec3, top_left: Vec3) -> Self {
        Self {
            bottom_left,
            bottom_right,
            top_left,
        }
    }

    /// The implied fourth corner
    pub fn top_right(&self) -> Vec3 {
        self.bottom_right + self.top_left - self.bottom_left
    }

    /// Center of the quad
    pub fn center(&self) -> Vec3 {
        (self.bottom_right + self.top_left) * 0.5
    }

    /// Unnormalized plane normal (right x up); its length is the quad area
    pub fn area_normal(&self) -> Vec3 {
        (self.bottom_right - self.bottom_left).cross(self.top_left - self.bottom_left)
    }

    /// Check whether the corners span a non-zero area
    pub fn is_degenerate(&self) -> bool {
        let n = self.area_normal();
        !n.is_finite() || n.length_squared() < MIN_CORNER_AREA * MIN_CORNER_AREA
    }

    /// Unit normal of the portal plane, or `None` for degenerate corners
    pub fn normal(&self) -> Option<Vec3> {
        if self.is_degenerate() {
            None
        } else {
            Some(self.area_normal().normalize())
        }
    }

    /// Signed distance from `point` to the portal plane along the normal
    pub fn signed_distance(&self, point: Vec3) -> Option<f32> {
        self.normal().map(|n| (point - self.bottom_left).dot(n))
    }

    /// All four corners in counter-clockwise order starting at bottom-left
    pub fn quad(&self) -> [Vec3; 4] {
        [self.bottom_left, self.bottom_right, self.top_right(), self.top_left]
    }
}

/// How the fitted camera is oriented
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitOrientation {
    /// Rotate the camera so it looks along the portal's negative normal.
    /// The near-plane rectangle then matches the portal exactly.
    #[default]
    AlignToPortal,
    /// Keep the camera's own rotation and fit the frustum to the bounding
    /// rectangle of the portal's projection onto the camera's near plane.
    KeepCamera,
}

/// Near-plane extents of a perspective frustum
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrustumBounds {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
    pub near: f32,
    pub far: f32,
}

impl FrustumBounds {
    /// Build symmetric bounds from a vertical field of view (radians)
    pub fn symmetric(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        let top = near * (fov_y * 0.5).tan();
        let right = top * aspect;
        Self {
            left: -right,
            right,
            bottom: -top,
            top,
            near,
            far,
        }
    }

    /// Near-plane width
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    /// Near-plane height
    pub fn height(&self) -> f32 {
        self.top - self.bottom
    }

    /// Vertical field of view these bounds imply, in radians
    ///
    /// Only meaningful for symmetric-ish frusta; used for logging and for
    /// keeping the camera's `fov` field roughly in sync after a fit.
    pub fn estimated_fov_y(&self) -> f32 {
        2.0 * (self.height() * 0.5 / self.near).atan()
    }

    /// Build the projection matrix for these bounds
    pub fn projection(&self) -> Mat4 {
        off_axis_projection(self)
    }
}

/// Result of a successful frustum fit
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrustumFit {
    /// Near-plane bounds
    pub bounds: FrustumBounds,
    /// Projection matrix built from `bounds`
    pub projection: Mat4,
    /// Camera rotation the bounds were computed for
    pub rotation: Quat,
    /// Eye-to-plane distance actually used (clamped to [`MIN_PLANE_DISTANCE`])
    pub plane_distance: f32,
}

/// Reasons a fit cannot be produced
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FitError {
    /// Corners are collinear or coincident
    DegenerateCorners,
    /// Corners or eye contain NaN/infinite components
    NonFinite,
    /// near/far planes are not `0 < near < far`
    InvalidClipPlanes,
}

impl std::fmt::Display for FitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FitError::DegenerateCorners => write!(f, "portal corners are degenerate"),
            FitError::NonFinite => write!(f, "non-finite portal corner or eye position"),
            FitError::InvalidClipPlanes => write!(f, "invalid near/far clip planes"),
        }
    }
}

impl std::error::Error for FitError {}

/// Build an asymmetric perspective projection from near-plane bounds
///
/// Equivalent to `glFrustum(left, right, bottom, top, near, far)`.
pub fn off_axis_projection(b: &FrustumBounds) -> Mat4 {
    let rl = b.right - b.left;
    let tb = b.top - b.bottom;
    let nf = b.near - b.far;

    Mat4::from_cols(
        Vec4::new(2.0 * b.near / rl, 0.0, 0.0, 0.0),
        Vec4::new(0.0, 2.0 * b.near / tb, 0.0, 0.0),
        Vec4::new(
            (b.right + b.left) / rl,
            (b.top + b.bottom) / tb,
            (b.far + b.near) / nf,
            -1.0,
        ),
        Vec4::new(0.0, 0.0, 2.0 * b.far * b.near / nf, 0.0),
    )
}

/// Build a symmetric perspective projection (the main camera's projection)
pub fn symmetric_projection(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    off_axis_projection(&FrustumBounds::symmetric(fov_y, aspect, near, far))
}

/// Fit a frustum to `corners` as seen from `eye`
///
/// With [`FitOrientation::AlignToPortal`] the returned rotation maps the camera's
/// local axes onto the portal basis (right, up, normal) and the projected
/// portal exactly fills NDC `[-1, 1]²`. With [`FitOrientation::KeepCamera`]
/// `camera_rotation` is kept and the bounds enclose the portal's projection.
///
/// An eye closer than [`MIN_PLANE_DISTANCE`] to the plane is pushed out to that
/// distance (keeping its side of the plane) instead of dividing by zero.
pub fn fit_corners(
    eye: Vec3,
    corners: &PortalCorners,
    near: f32,
    far: f32,
    orientation: FitOrientation,
    camera_rotation: Quat,
) -> Result<FrustumFit, FitError> {
    if !(eye.is_finite()
        && corners.bottom_left.is_finite()
        && corners.bottom_right.is_finite()
        && corners.top_left.is_finite())
    {
        return Err(FitError::NonFinite);
    }
    if !(near > 0.0 && far > near) {
        return Err(FitError::InvalidClipPlanes);
    }
    if corners.is_degenerate() {
        return Err(FitError::DegenerateCorners);
    }

    match orientation {
        FitOrientation::AlignToPortal => Ok(fit_aligned(eye, corners, near, far)),
        FitOrientation::KeepCamera => Ok(fit_keep_rotation(eye, corners, near, far, camera_rotation)),
    }
}

fn clamp_distance(d: f32) -> f32 {
    if d.abs() < MIN_PLANE_DISTANCE {
        MIN_PLANE_DISTANCE.copysign(d)
    } else {
        d
    }
}

fn fit_aligned(eye: Vec3, corners: &PortalCorners, near: f32, far: f32) -> FrustumFit {
    let vr = (corners.bottom_right - corners.bottom_left).normalize();
    let vn = corners.area_normal().normalize();
    // Orthogonalize up so a slightly sheared quad still yields a rotation
    let vu = vn.cross(vr);

    let va = corners.bottom_left - eye;
    let vb = corners.bottom_right - eye;
    let vc = corners.top_left - eye;

    let d = clamp_distance(-va.dot(vn));
    let scale = near / d;

    let bounds = FrustumBounds {
        left: vr.dot(va) * scale,
        right: vr.dot(vb) * scale,
        bottom: vu.dot(va) * scale,
        top: vu.dot(vc) * scale,
        near,
        far,
    };

    FrustumFit {
        bounds,
        projection: off_axis_projection(&bounds),
        rotation: Quat::from_mat3(&Mat3::from_cols(vr, vu, vn)).normalize(),
        plane_distance: d,
    }
}

fn fit_keep_rotation(
    eye: Vec3,
    corners: &PortalCorners,
    near: f32,
    far: f32,
    rotation: Quat,
) -> FrustumFit {
    let inv = rotation.inverse();
    let mut left = f32::INFINITY;
    let mut right = f32::NEG_INFINITY;
    let mut bottom = f32::INFINITY;
    let mut top = f32::NEG_INFINITY;

    for corner in corners.quad() {
        let local = inv * (corner - eye);
        // Camera looks down -Z; points behind the eye are clamped onto the near side
        let depth = (-local.z).max(MIN_PLANE_DISTANCE);
        let x = local.x * near / depth;
        let y = local.y * near / depth;
        left = left.min(x);
        right = right.max(x);
        bottom = bottom.min(y);
        top = top.max(y);
    }

    let plane_distance = clamp_distance(
        corners
            .signed_distance(eye)
            .unwrap_or(MIN_PLANE_DISTANCE),
    );

    // A zero-width projection (portal seen edge-on) would make a singular matrix
    let min_extent = near * 1e-4;
    if right - left < min_extent {
        let mid = (left + right) * 0.5;
        left = mid - min_extent;
        right = mid + min_extent;
    }
    if top - bottom < min_extent {
        let mid = (top + bottom) * 0.5;
        bottom = mid - min_extent;
        top = mid + min_extent;
    }

    let bounds = FrustumBounds {
        left,
        right,
        bottom,
        top,
        near,
        far,
    };

    FrustumFit {
        bounds,
        projection: off_axis_projection(&bounds),
        rotation,
        plane_distance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn unit_square() -> PortalCorners {
        PortalCorners::new(
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(-1.0, 1.0, 0.0),
        )
    }

    /// Project a world point through a fitted camera at `eye`
    fn project(fit: &FrustumFit, eye: Vec3, p: Vec3) -> Vec3 {
        let view = Mat4::from_rotation_translation(fit.rotation, eye).inverse();
        fit.projection.project_point3(view.transform_point3(p))
    }

    #[test]
    fn test_centered_square_bounds() {
        let fit = fit_corners(
            Vec3::new(0.0, 0.0, 5.0),
            &unit_square(),
            0.1,
            100.0,
            FitOrientation::AlignToPortal,
            Quat::IDENTITY,
        )
        .unwrap();

        assert!(approx_eq(fit.bounds.left, -0.02), "left = {}", fit.bounds.left);
        assert!(approx_eq(fit.bounds.right, 0.02), "right = {}", fit.bounds.right);
        assert!(approx_eq(fit.bounds.bottom, -0.02), "bottom = {}", fit.bounds.bottom);
        assert!(approx_eq(fit.bounds.top, 0.02), "top = {}", fit.bounds.top);
        assert!(approx_eq(fit.plane_distance, 5.0));
        assert!(approx_eq(fit.bounds.left / fit.bounds.near, -1.0 / 5.0));
    }

    #[test]
    fn test_corners_fill_ndc_square() {
        let corners = unit_square();
        for eye in [
            Vec3::new(0.0, 0.0, 5.0),
            Vec3::new(3.0, -2.0, 4.0),
            Vec3::new(-0.7, 1.9, 0.5),
            Vec3::new(0.2, 0.1, -6.0),
        ] {
            let fit = fit_corners(eye, &corners, 0.1, 100.0, FitOrientation::AlignToPortal, Quat::IDENTITY)
                .unwrap();
            let expected = [
                (corners.bottom_left, -1.0, -1.0),
                (corners.bottom_right, 1.0, -1.0),
                (corners.top_left, -1.0, 1.0),
                (corners.top_right(), 1.0, 1.0),
            ];
            for (p, ex, ey) in expected {
                let ndc = project(&fit, eye, p);
                assert!(
                    approx_eq(ndc.x, ex) && approx_eq(ndc.y, ey),
                    "eye {:?}: corner {:?} projected to {:?}",
                    eye,
                    p,
                    ndc
                );
            }
        }
    }

    #[test]
    fn test_rotated_portal_fills_ndc_square() {
        let rotation = Quat::from_euler(glam::EulerRot::YXZ, 0.6, -0.3, 0.2);
        let translation = Vec3::new(2.0, 1.5, -3.0);
        let t = |p: Vec3| rotation * (p * Vec3::new(2.0, 3.0, 1.0)) + translation;
        let corners = PortalCorners::new(
            t(Vec3::new(-0.5, -0.5, 0.0)),
            t(Vec3::new(0.5, -0.5, 0.0)),
            t(Vec3::new(-0.5, 0.5, 0.0)),
        );
        let eye = translation + rotation * Vec3::new(0.4, -0.2, 6.0);

        let fit = fit_corners(eye, &corners, 0.1, 60.0, FitOrientation::AlignToPortal, Quat::IDENTITY)
            .unwrap();
        let tr = project(&fit, eye, corners.top_right());
        let bl = project(&fit, eye, corners.bottom_left);
        assert!(approx_eq(tr.x, 1.0) && approx_eq(tr.y, 1.0), "top right {:?}", tr);
        assert!(approx_eq(bl.x, -1.0) && approx_eq(bl.y, -1.0), "bottom left {:?}", bl);
    }

    #[test]
    fn test_collinear_corners_rejected() {
        let corners = PortalCorners::new(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
        );
        let result = fit_corners(Vec3::Z, &corners, 0.1, 100.0, FitOrientation::AlignToPortal, Quat::IDENTITY);
        assert_eq!(result, Err(FitError::DegenerateCorners));
    }

    #[test]
    fn test_eye_on_plane_is_clamped() {
        let fit = fit_corners(
            Vec3::new(0.0, 0.0, 0.0),
            &unit_square(),
            0.1,
            100.0,
            FitOrientation::AlignToPortal,
            Quat::IDENTITY,
        )
        .unwrap();
        assert_eq!(fit.plane_distance, MIN_PLANE_DISTANCE);
        assert!(fit.projection.is_finite());
    }

    #[test]
    fn test_invalid_clip_planes() {
        let result = fit_corners(Vec3::Z, &unit_square(), 1.0, 0.5, FitOrientation::AlignToPortal, Quat::IDENTITY);
        assert_eq!(result, Err(FitError::InvalidClipPlanes));
    }

    #[test]
    fn test_non_finite_eye() {
        let result = fit_corners(
            Vec3::new(f32::NAN, 0.0, 1.0),
            &unit_square(),
            0.1,
            100.0,
            FitOrientation::AlignToPortal,
            Quat::IDENTITY,
        );
        assert_eq!(result, Err(FitError::NonFinite));
    }

    #[test]
    fn test_keep_camera_encloses_portal() {
        let eye = Vec3::new(0.0, 0.0, 5.0);
        let rotation = Quat::from_rotation_y(0.1);
        let fit = fit_corners(eye, &unit_square(), 0.1, 100.0, FitOrientation::KeepCamera, rotation).unwrap();
        assert_eq!(fit.rotation, rotation);

        for p in unit_square().quad() {
            let ndc = project(&fit, eye, p);
            assert!(ndc.x >= -1.0 - EPSILON && ndc.x <= 1.0 + EPSILON, "x out of range: {:?}", ndc);
            assert!(ndc.y >= -1.0 - EPSILON && ndc.y <= 1.0 + EPSILON, "y out of range: {:?}", ndc);
        }
    }

    #[test]
    fn test_symmetric_projection_matches_bounds() {
        let b = FrustumBounds::symmetric(45f32.to_radians(), 1.5, 0.1, 60.0);
        assert!(approx_eq(b.left, -b.right));
        assert!(approx_eq(b.estimated_fov_y(), 45f32.to_radians()));

        let m = symmetric_projection(45f32.to_radians(), 1.5, 0.1, 60.0);
        // Symmetric frustum has no off-axis skew terms
        assert!(approx_eq(m.z_axis.x, 0.0));
        assert!(approx_eq(m.z_axis.y, 0.0));
        assert!(approx_eq(m.z_axis.w, -1.0));
    }

    #[test]
    fn test_corner_helpers() {
        let c = unit_square();
        assert_eq!(c.top_right(), Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(c.center(), Vec3::ZERO);
        assert_eq!(c.normal(), Some(Vec3::Z));
        assert!(approx_eq(c.signed_distance(Vec3::new(0.0, 0.0, 2.0)).unwrap(), 2.0));
    }
}
