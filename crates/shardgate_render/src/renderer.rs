//! The renderer seam
//!
//! Drawing the scene graph is done by an external renderer. The portal only
//! needs to bind targets, clear them and draw the resident worlds through a
//! camera; [`SceneRenderer`] is that surface.

use shardgate_core::Worlds;

use crate::camera::PerspectiveCamera;
use crate::error::RenderError;
use crate::target::TargetFormat;

/// Opaque handle to an offscreen render target
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetHandle(pub u64);

/// Opaque handle to a sampleable color texture
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(pub u64);

/// Requested render target layout
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetDescriptor {
    pub width: u32,
    pub height: u32,
    pub format: TargetFormat,
    /// Attach a depth buffer
    pub depth: bool,
}

/// External renderer used by the capture pass
///
/// `None` as a render target means the on-screen surface.
pub trait SceneRenderer {
    /// Allocate an offscreen color (and optional depth) target
    fn create_target(&mut self, desc: &TargetDescriptor) -> Result<TargetHandle, RenderError>;

    /// Release a target; unknown handles are ignored
    fn destroy_target(&mut self, target: TargetHandle);

    /// Color texture of `target`
    fn target_texture(&self, target: TargetHandle) -> Option<TextureHandle>;

    /// Currently bound render target
    fn render_target(&self) -> Option<TargetHandle>;

    fn set_render_target(&mut self, target: Option<TargetHandle>);

    /// Clear the bound target
    fn clear(&mut self) -> Result<(), RenderError>;

    /// Draw every visible world into the bound target through `camera`
    fn render(&mut self, worlds: &Worlds, camera: &PerspectiveCamera) -> Result<(), RenderError>;
}
