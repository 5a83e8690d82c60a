//! Offscreen render target sizing
//!
//! The portal's offscreen target tracks `viewport * quality_multiplier`. It is
//! only reallocated when that request changes, and falls back to the plain
//! viewport size when the scaled allocation fails.

use serde::{Deserialize, Serialize};
use shardgate_core::PortalError;

use crate::renderer::{SceneRenderer, TargetDescriptor, TargetHandle, TextureHandle};

/// Color format of the offscreen target
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetFormat {
    /// 16-bit float per channel, for HDR post-processing
    #[default]
    HalfFloat,
    /// 8-bit sRGB
    Rgba8,
}

impl TargetFormat {
    pub fn wgpu_format(self) -> wgpu::TextureFormat {
        match self {
            TargetFormat::HalfFloat => wgpu::TextureFormat::Rgba16Float,
            TargetFormat::Rgba8 => wgpu::TextureFormat::Rgba8UnormSrgb,
        }
    }

    pub fn bytes_per_pixel(self) -> u64 {
        match self {
            TargetFormat::HalfFloat => 8,
            TargetFormat::Rgba8 => 4,
        }
    }
}

/// What [`RenderTarget::ensure_size`] did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResizeOutcome {
    /// Same request as last time; nothing allocated
    Unchanged,
    /// Allocated at the scaled size
    Allocated { width: u32, height: u32 },
    /// Scaled allocation failed; allocated at 1.0x instead
    FellBack { width: u32, height: u32 },
}

impl ResizeOutcome {
    pub fn reallocated(&self) -> bool {
        !matches!(self, ResizeOutcome::Unchanged)
    }
}

/// Scale one viewport dimension, never below 1 pixel
pub fn scaled_dimension(size: u32, multiplier: f32) -> u32 {
    let scaled = (size as f32 * multiplier).round();
    if scaled.is_finite() && scaled >= 1.0 {
        scaled as u32
    } else {
        1
    }
}

fn sanitize_multiplier(multiplier: f32) -> f32 {
    if multiplier.is_finite() && multiplier > 0.0 {
        multiplier
    } else {
        1.0
    }
}

/// The portal's offscreen render target
#[derive(Debug)]
pub struct RenderTarget {
    handle: Option<TargetHandle>,
    format: TargetFormat,
    depth: bool,
    width: u32,
    height: u32,
    /// Last `(viewport, multiplier)` request, successful or not
    requested: Option<((u32, u32), f32)>,
    allocations: u64,
}

impl RenderTarget {
    pub fn new(format: TargetFormat, depth: bool) -> Self {
        Self {
            handle: None,
            format,
            depth,
            width: 0,
            height: 0,
            requested: None,
            allocations: 0,
        }
    }

    pub fn handle(&self) -> Option<TargetHandle> {
        self.handle
    }

    pub fn format(&self) -> TargetFormat {
        self.format
    }

    /// Allocated size in pixels, `(0, 0)` before the first allocation
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Color buffer size in bytes
    pub fn byte_size(&self) -> u64 {
        self.width as u64 * self.height as u64 * self.format.bytes_per_pixel()
    }

    /// Number of successful allocations so far
    pub fn allocation_count(&self) -> u64 {
        self.allocations
    }

    pub fn texture<R: SceneRenderer + ?Sized>(&self, renderer: &R) -> Option<TextureHandle> {
        self.handle.and_then(|h| renderer.target_texture(h))
    }

    /// Make the target match `viewport * multiplier`
    ///
    /// Repeating the previous request is a no-op. The old target is released
    /// only after its replacement exists, so a failed resize keeps the last
    /// good target bound to this object.
    pub fn ensure_size<R: SceneRenderer + ?Sized>(
        &mut self,
        renderer: &mut R,
        viewport: (u32, u32),
        multiplier: f32,
    ) -> Result<ResizeOutcome, PortalError> {
        let multiplier = sanitize_multiplier(multiplier);
        let request = (viewport, multiplier);
        if self.handle.is_some() && self.requested == Some(request) {
            return Ok(ResizeOutcome::Unchanged);
        }
        self.requested = Some(request);

        let width = scaled_dimension(viewport.0, multiplier);
        let height = scaled_dimension(viewport.1, multiplier);

        match self.allocate(renderer, width, height) {
            Ok(()) => {
                log::info!("Allocated portal target {}x{} ({:?})", width, height, self.format);
                Ok(ResizeOutcome::Allocated { width, height })
            }
            Err(err) if multiplier != 1.0 => {
                log::warn!(
                    "Portal target {}x{} failed ({}), falling back to 1.0x",
                    width,
                    height,
                    err
                );
                let width = scaled_dimension(viewport.0, 1.0);
                let height = scaled_dimension(viewport.1, 1.0);
                self.allocate(renderer, width, height)
                    .map_err(|e| PortalError::TargetAllocation {
                        width,
                        height,
                        reason: e.to_string(),
                    })?;
                Ok(ResizeOutcome::FellBack { width, height })
            }
            Err(err) => {
                log::warn!("Portal target {}x{} failed: {}", width, height, err);
                Err(PortalError::TargetAllocation {
                    width,
                    height,
                    reason: err.to_string(),
                })
            }
        }
    }

    fn allocate<R: SceneRenderer + ?Sized>(
        &mut self,
        renderer: &mut R,
        width: u32,
        height: u32,
    ) -> Result<(), crate::RenderError> {
        let desc = TargetDescriptor {
            width,
            height,
            format: self.format,
            depth: self.depth,
        };
        let handle = renderer.create_target(&desc)?;
        if let Some(old) = self.handle.replace(handle) {
            renderer.destroy_target(old);
        }
        self.width = width;
        self.height = height;
        self.allocations += 1;
        Ok(())
    }

    /// Release the target
    pub fn release<R: SceneRenderer + ?Sized>(&mut self, renderer: &mut R) {
        if let Some(handle) = self.handle.take() {
            renderer.destroy_target(handle);
        }
        self.width = 0;
        self.height = 0;
        self.requested = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RecordingRenderer;

    #[test]
    fn test_scaled_dimension() {
        assert_eq!(scaled_dimension(800, 1.5), 1200);
        assert_eq!(scaled_dimension(801, 0.5), 401);
        assert_eq!(scaled_dimension(10, 0.0), 1);
        assert_eq!(scaled_dimension(10, f32::NAN), 1);
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(TargetFormat::HalfFloat.wgpu_format(), wgpu::TextureFormat::Rgba16Float);
        assert_eq!(TargetFormat::HalfFloat.bytes_per_pixel(), 8);
        assert_eq!(TargetFormat::Rgba8.bytes_per_pixel(), 4);
    }

    #[test]
    fn test_ensure_size_is_idempotent() {
        let mut renderer = RecordingRenderer::new();
        let mut target = RenderTarget::new(TargetFormat::HalfFloat, true);

        let first = target.ensure_size(&mut renderer, (800, 600), 1.5).unwrap();
        assert_eq!(first, ResizeOutcome::Allocated { width: 1200, height: 900 });
        let bytes = target.byte_size();
        assert_eq!(bytes, 1200 * 900 * 8);

        let second = target.ensure_size(&mut renderer, (800, 600), 1.5).unwrap();
        assert_eq!(second, ResizeOutcome::Unchanged);
        assert_eq!(target.byte_size(), bytes);
        assert_eq!(target.allocation_count(), 1);
        assert_eq!(renderer.live_targets(), 1);
    }

    #[test]
    fn test_resize_replaces_old_target() {
        let mut renderer = RecordingRenderer::new();
        let mut target = RenderTarget::new(TargetFormat::Rgba8, false);
        target.ensure_size(&mut renderer, (800, 600), 1.0).unwrap();
        let old = target.handle();
        let outcome = target.ensure_size(&mut renderer, (1024, 768), 1.0).unwrap();
        assert!(outcome.reallocated());
        assert_ne!(target.handle(), old);
        assert_eq!(target.size(), (1024, 768));
        assert_eq!(renderer.live_targets(), 1);
    }

    #[test]
    fn test_falls_back_to_unscaled() {
        let mut renderer = RecordingRenderer::with_max_dimension(2048);
        let mut target = RenderTarget::new(TargetFormat::HalfFloat, true);
        let outcome = target.ensure_size(&mut renderer, (1920, 1080), 2.0).unwrap();
        assert_eq!(outcome, ResizeOutcome::FellBack { width: 1920, height: 1080 });
        assert_eq!(target.size(), (1920, 1080));

        // Same request again does not retry the failing allocation
        assert_eq!(
            target.ensure_size(&mut renderer, (1920, 1080), 2.0).unwrap(),
            ResizeOutcome::Unchanged
        );
        assert_eq!(target.allocation_count(), 1);
    }

    #[test]
    fn test_total_failure_keeps_previous_target() {
        let mut renderer = RecordingRenderer::with_max_dimension(1024);
        let mut target = RenderTarget::new(TargetFormat::HalfFloat, false);
        target.ensure_size(&mut renderer, (800, 600), 1.0).unwrap();
        let good = target.handle();

        let err = target.ensure_size(&mut renderer, (4000, 3000), 1.0).unwrap_err();
        assert!(matches!(err, PortalError::TargetAllocation { width: 4000, height: 3000, .. }));
        assert_eq!(target.handle(), good);
        assert_eq!(target.size(), (800, 600));
    }

    #[test]
    fn test_invalid_multiplier_treated_as_one() {
        let mut renderer = RecordingRenderer::new();
        let mut target = RenderTarget::new(TargetFormat::HalfFloat, false);
        target.ensure_size(&mut renderer, (640, 480), -3.0).unwrap();
        assert_eq!(target.size(), (640, 480));
    }

    #[test]
    fn test_release() {
        let mut renderer = RecordingRenderer::new();
        let mut target = RenderTarget::new(TargetFormat::HalfFloat, false);
        target.ensure_size(&mut renderer, (640, 480), 1.0).unwrap();
        target.release(&mut renderer);
        assert!(target.handle().is_none());
        assert_eq!(renderer.live_targets(), 0);
        assert_eq!(target.byte_size(), 0);
    }
}
