//! Bounding boxes and ray picking

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Create a box from its extremes
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Smallest box containing every point, or `None` for an empty iterator
    pub fn from_points<I: IntoIterator<Item = Vec3>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Self { min, max })
    }

    /// Box size along each axis
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Box center
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// True when the box has zero extent on X or Y (the portal's local plane)
    pub fn is_flat_in_xy(&self) -> bool {
        let s = self.size();
        s.x <= f32::EPSILON || s.y <= f32::EPSILON
    }
}

/// Intersect a ray with the parallelogram spanned from `origin` by `edge_u` and `edge_v`
///
/// Returns the ray parameter `t >= 0` of the hit, or `None` when the ray is
/// parallel to the plane, points away from it, or passes outside the edges.
pub fn ray_parallelogram_hit(
    ray_origin: Vec3,
    ray_dir: Vec3,
    origin: Vec3,
    edge_u: Vec3,
    edge_v: Vec3,
) -> Option<f32> {
    let normal = edge_u.cross(edge_v);
    let denom = normal.dot(ray_dir);
    if denom.abs() < 1e-8 {
        return None;
    }
    let t = normal.dot(origin - ray_origin) / denom;
    if t < 0.0 {
        return None;
    }

    let hit = ray_origin + ray_dir * t - origin;
    let uu = edge_u.length_squared();
    let vv = edge_v.length_squared();
    let uv = edge_u.dot(edge_v);
    let wu = hit.dot(edge_u);
    let wv = hit.dot(edge_v);
    let det = uu * vv - uv * uv;
    if det.abs() < 1e-12 {
        return None;
    }

    let s = (wu * vv - wv * uv) / det;
    let r = (wv * uu - wu * uv) / det;
    if (0.0..=1.0).contains(&s) && (0.0..=1.0).contains(&r) {
        Some(t)
    } else {
        None
    }
}
