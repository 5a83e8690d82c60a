//! Portal Mathematics Library
//!
//! This crate provides the 3D math used by the shardgate portal renderer.
//! Vector, matrix and quaternion types come from [`glam`] and are re-exported
//! here so downstream crates share one math vocabulary.
//!
//! ## Core Types
//!
//! - [`PortalCorners`] - Bottom-left, bottom-right and top-left corners of a portal
//! - [`FrustumBounds`] - Near-plane extents of an asymmetric perspective frustum
//! - [`FrustumFit`] - Result of fitting a frustum to a portal from an eye point
//! - [`Aabb`] - Axis-aligned bounding box
//!
//! ## Helpers
//!
//! - [`frustum`] - Off-axis (generalized) perspective projection
//! - [`easing`] - Interpolation and easing curves used by camera flights and fades

pub mod bounds;
pub mod easing;
pub mod frustum;

pub use bounds::{ray_parallelogram_hit, Aabb};
pub use frustum::{
    fit_corners, off_axis_projection, symmetric_projection, FitError, FitOrientation,
    FrustumBounds, FrustumFit, PortalCorners, MIN_PLANE_DISTANCE,
};

pub use glam::{Mat3, Mat4, Quat, Vec2, Vec3, Vec4};
