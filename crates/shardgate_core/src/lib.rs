//! Core types for the shardgate portal
//!
//! This crate provides the scene-side state the portal renderer works from:
//!
//! - [`Transform`] - Position, rotation, and scale in 3D space
//! - [`World`] / [`Worlds`] - Resident scene subtrees keyed by [`WorldKey`]
//! - [`PortalQuad`] - The traversable surface and its local geometry
//! - [`PortalSurfaceTracker`] - Per-frame world corners of the portal quad
//! - [`TransitionState`] / [`WorldSwitch`] - Which world is current, and the
//!   single transition function that changes it
//! - [`ResourceRegistry`] - Shared materials keyed by configuration hash
//! - [`SceneTemplate`] - Loadable/saveable RON scene description
//! - [`PortalError`] - Error taxonomy for portal operations

mod error;
mod portal;
mod registry;
mod scene;
mod transform;
mod transition;
mod world;

pub use error::PortalError;
pub use portal::{corners_from_bounds, PortalGeometry, PortalQuad, PortalSurfaceTracker};
pub use registry::{ResourceKey, ResourceRegistry};
pub use scene::{PortalStage, SceneLoadError, SceneSaveError, SceneTemplate, WorldTemplate};
pub use transform::Transform;
pub use transition::{TransitionEvent, TransitionOutcome, TransitionState, WorldId, WorldSwitch};
pub use world::{World, WorldDirty, WorldKey, WorldMarkers, Worlds};

// Re-export commonly used math types for convenience
pub use shardgate_math::{Aabb, PortalCorners, Quat, Vec3};
