//! Portal error taxonomy
//!
//! None of these are fatal. Every variant maps to "skip this step for the
//! current frame and keep the last good result".

use std::fmt;

use shardgate_math::FitError;

/// Error type for portal operations
#[derive(Clone, Debug, PartialEq)]
pub enum PortalError {
    /// Portal geometry has no bounding box yet (empty silhouette, unloaded mesh)
    GeometryNotReady,
    /// Portal corners are collinear or coincident; the previous frustum stays in use
    DegenerateFrustum,
    /// Off-screen render target could not be allocated at the requested size
    TargetAllocation {
        width: u32,
        height: u32,
        reason: String,
    },
    /// A toggle arrived while the previous transition was still running
    ReentrantToggle,
    /// A world switch needs at least two worlds
    InvalidWorldCount(usize),
}

impl fmt::Display for PortalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortalError::GeometryNotReady => write!(f, "Portal geometry not ready"),
            PortalError::DegenerateFrustum => write!(f, "Portal corners are degenerate"),
            PortalError::TargetAllocation { width, height, reason } => {
                write!(f, "Render target allocation failed at {}x{}: {}", width, height, reason)
            }
            PortalError::ReentrantToggle => write!(f, "Toggle ignored while a transition is running"),
            PortalError::InvalidWorldCount(n) => write!(f, "Need at least 2 worlds, got {}", n),
        }
    }
}

impl std::error::Error for PortalError {}

impl From<FitError> for PortalError {
    fn from(_: FitError) -> Self {
        PortalError::DegenerateFrustum
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_allocation() {
        let err = PortalError::TargetAllocation {
            width: 8192,
            height: 8192,
            reason: "out of memory".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("8192x8192"));
        assert!(msg.contains("out of memory"));
    }

    #[test]
    fn test_display_world_count() {
        let msg = format!("{}", PortalError::InvalidWorldCount(1));
        assert!(msg.contains("got 1"));
    }

    #[test]
    fn test_from_fit_error() {
        let err: PortalError = FitError::DegenerateCorners.into();
        assert_eq!(err, PortalError::DegenerateFrustum);
    }
}
