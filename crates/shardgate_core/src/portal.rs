//! Portal quad and per-frame corner tracking
//!
//! The portal surface is either a plain rectangle or an extruded silhouette.
//! Either way the frustum fit only needs three world-space corners of its
//! local bounding box on the z = 0 plane, recomputed every frame because the
//! quad may be animated.

use serde::{Deserialize, Serialize};
use shardgate_math::{ray_parallelogram_hit, Aabb, PortalCorners, Vec3};

use crate::error::PortalError;
use crate::registry::ResourceKey;
use crate::Transform;

/// Local-space shape of the portal surface
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PortalGeometry {
    /// Plane centered on the local origin, facing +Z
    Rectangle { width: f32, height: f32 },
    /// Closed 2D outline extruded along +Z by `depth`
    Silhouette { outline: Vec<[f32; 2]>, depth: f32 },
}

impl Default for PortalGeometry {
    fn default() -> Self {
        PortalGeometry::Rectangle {
            width: 4.0,
            height: 6.0,
        }
    }
}

impl PortalGeometry {
    /// Local bounding box, or `None` while there is no geometry to bound
    pub fn compute_bounds(&self) -> Option<Aabb> {
        match self {
            PortalGeometry::Rectangle { width, height } => {
                if !(width.is_finite() && height.is_finite()) {
                    return None;
                }
                let half = Vec3::new(width.abs() * 0.5, height.abs() * 0.5, 0.0);
                Some(Aabb::new(-half, half))
            }
            PortalGeometry::Silhouette { outline, depth } => {
                let bounds = Aabb::from_points(outline.iter().map(|p| Vec3::new(p[0], p[1], 0.0)))?;
                let z = depth.max(0.0);
                Some(Aabb::new(bounds.min, Vec3::new(bounds.max.x, bounds.max.y, z)))
            }
        }
    }

    /// True when the rectangle has no area
    pub fn is_zero_area(&self) -> bool {
        match self.compute_bounds() {
            Some(bounds) => bounds.is_flat_in_xy(),
            None => true,
        }
    }
}

/// World-space corners of a local bounding box on its z = 0 plane
pub fn corners_from_bounds(bounds: &Aabb, transform: &Transform) -> PortalCorners {
    let m = transform.to_matrix();
    PortalCorners::new(
        m.transform_point3(Vec3::new(bounds.min.x, bounds.min.y, 0.0)),
        m.transform_point3(Vec3::new(bounds.max.x, bounds.min.y, 0.0)),
        m.transform_point3(Vec3::new(bounds.min.x, bounds.max.y, 0.0)),
    )
}

/// The traversable portal surface
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PortalQuad {
    pub geometry: PortalGeometry,
    pub transform: Transform,
    /// Registry key of the bound portal material
    #[serde(skip)]
    pub material: Option<ResourceKey>,
}

impl Default for PortalQuad {
    fn default() -> Self {
        Self {
            geometry: PortalGeometry::default(),
            transform: Transform::from_position(Vec3::new(0.0, 1.5, 0.0)),
            material: None,
        }
    }
}

impl PortalQuad {
    pub fn new(geometry: PortalGeometry, transform: Transform) -> Self {
        Self {
            geometry,
            transform,
            material: None,
        }
    }

    /// Current world-space corners, computed without any cache
    pub fn corners(&self) -> Option<PortalCorners> {
        self.geometry
            .compute_bounds()
            .map(|b| corners_from_bounds(&b, &self.transform))
    }

    /// Ray parameter where a pointer ray hits the portal surface
    pub fn hit_test(&self, ray_origin: Vec3, ray_dir: Vec3) -> Option<f32> {
        let corners = self.corners()?;
        ray_parallelogram_hit(
            ray_origin,
            ray_dir,
            corners.bottom_left,
            corners.bottom_right - corners.bottom_left,
            corners.top_left - corners.bottom_left,
        )
    }
}

/// Derives the portal's world corners each frame
///
/// The local bounding box is computed once and cached; geometry is static in
/// local space. Call [`invalidate`](Self::invalidate) after replacing it.
#[derive(Debug, Default)]
pub struct PortalSurfaceTracker {
    bounds: Option<Aabb>,
}

impl PortalSurfaceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// World-space bottom-left, bottom-right and top-left corners
    ///
    /// Fails with [`PortalError::GeometryNotReady`] while the geometry has no
    /// bounding box; the next frame retries.
    pub fn corners(&mut self, quad: &PortalQuad) -> Result<PortalCorners, PortalError> {
        let bounds = match self.bounds {
            Some(bounds) => bounds,
            None => {
                let bounds = quad
                    .geometry
                    .compute_bounds()
                    .ok_or(PortalError::GeometryNotReady)?;
                log::debug!("Cached portal bounds {:?}", bounds);
                self.bounds = Some(bounds);
                bounds
            }
        };
        Ok(corners_from_bounds(&bounds, &quad.transform))
    }

    /// Cached local bounds, if computed
    pub fn bounds(&self) -> Option<&Aabb> {
        self.bounds.as_ref()
    }

    /// Drop the cached bounds so the next call recomputes them
    pub fn invalidate(&mut self) {
        self.bounds = None;
    }
}
