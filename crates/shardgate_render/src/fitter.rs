//! Portal camera frustum fitting
//!
//! Each frame the portal camera copies the main camera, moves to the eye
//! position and gets an off-axis projection whose near plane is exactly the
//! portal rectangle. A frame with unusable corners reuses the last good fit.

use shardgate_core::PortalError;
use shardgate_math::{fit_corners, FitOrientation, FrustumFit, PortalCorners, Vec3};

use crate::camera::PerspectiveCamera;

/// Result of one fit attempt
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FitStatus {
    /// Fresh projection from this frame's corners
    Fitted,
    /// Corners were unusable; the previous projection was applied again
    Reused,
}

/// Fits the portal camera's frustum to the portal corners
#[derive(Clone, Debug, Default)]
pub struct FrustumFitter {
    orientation: FitOrientation,
    last_fit: Option<FrustumFit>,
}

impl FrustumFitter {
    pub fn new(orientation: FitOrientation) -> Self {
        Self {
            orientation,
            last_fit: None,
        }
    }

    pub fn orientation(&self) -> FitOrientation {
        self.orientation
    }

    pub fn last_fit(&self) -> Option<&FrustumFit> {
        self.last_fit.as_ref()
    }

    /// Place `camera` at `eye` and fit its projection to `corners`
    ///
    /// `camera`'s near/far planes are used and its current rotation is kept
    /// for [`FitOrientation::KeepCamera`]. Fails with
    /// [`PortalError::DegenerateFrustum`] only when there is no earlier fit to
    /// fall back to.
    pub fn fit(
        &mut self,
        camera: &mut PerspectiveCamera,
        eye: Vec3,
        corners: &PortalCorners,
    ) -> Result<FitStatus, PortalError> {
        camera.position = eye;
        match fit_corners(eye, corners, camera.near, camera.far, self.orientation, camera.rotation) {
            Ok(fit) => {
                self.apply(camera, &fit);
                self.last_fit = Some(fit);
                Ok(FitStatus::Fitted)
            }
            Err(err) => {
                let previous = self.last_fit.ok_or(PortalError::DegenerateFrustum)?;
                log::debug!("Skipping frustum fit ({}), reusing previous frustum", err);
                self.apply(camera, &previous);
                Ok(FitStatus::Reused)
            }
        }
    }

    fn apply(&self, camera: &mut PerspectiveCamera, fit: &FrustumFit) {
        camera.set_projection(fit.projection);
        if self.orientation == FitOrientation::AlignToPortal {
            camera.rotation = fit.rotation;
        }
    }

    /// Forget the previous fit (scene teardown)
    pub fn reset(&mut self) {
        self.last_fit = None;
    }
}
