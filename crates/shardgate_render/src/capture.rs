//! Offscreen capture of the other world
//!
//! The capture pass renders the whole scene through the portal camera with
//! the current world hidden and the other world shown, into the portal's
//! offscreen target. Renderer target binding and both visibility flags are
//! held by guards, so they are restored on every exit path including unwinds
//! out of the renderer.

use serde::{Deserialize, Serialize};
use shardgate_core::{PortalError, WorldKey, Worlds};

use crate::camera::PerspectiveCamera;
use crate::renderer::{SceneRenderer, TargetHandle, TextureHandle};
use crate::target::{RenderTarget, ResizeOutcome, TargetFormat};

/// Offscreen target settings
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    /// Target size relative to the viewport
    pub quality_multiplier: f32,
    pub format: TargetFormat,
    /// Attach a depth buffer to the target
    pub depth: bool,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            quality_multiplier: 1.5,
            format: TargetFormat::HalfFloat,
            depth: true,
        }
    }
}

/// Texture produced by a capture attempt
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Captured {
    /// Rendered this frame
    Fresh(TextureHandle),
    /// Capture skipped or failed; last good texture
    Stale(TextureHandle),
    /// Nothing has been captured yet
    Unavailable,
}

impl Captured {
    pub fn texture(&self) -> Option<TextureHandle> {
        match self {
            Captured::Fresh(t) | Captured::Stale(t) => Some(*t),
            Captured::Unavailable => None,
        }
    }

    pub fn is_fresh(&self) -> bool {
        matches!(self, Captured::Fresh(_))
    }
}

/// Restores the renderer's previous target on drop
struct TargetBinding<'a, R: SceneRenderer + ?Sized> {
    renderer: &'a mut R,
    previous: Option<TargetHandle>,
}

impl<'a, R: SceneRenderer + ?Sized> TargetBinding<'a, R> {
    fn bind(renderer: &'a mut R, target: TargetHandle) -> Self {
        let previous = renderer.render_target();
        renderer.set_render_target(Some(target));
        Self { renderer, previous }
    }
}

impl<R: SceneRenderer + ?Sized> Drop for TargetBinding<'_, R> {
    fn drop(&mut self) {
        self.renderer.set_render_target(self.previous);
    }
}

/// Hides one world and shows another, restoring both flags on drop
struct VisibilitySwap<'a> {
    worlds: &'a mut Worlds,
    saved: Vec<(WorldKey, bool)>,
}

impl<'a> VisibilitySwap<'a> {
    fn new(worlds: &'a mut Worlds, hide: WorldKey, show: WorldKey) -> Self {
        let saved = [hide, show]
            .into_iter()
            .filter_map(|key| worlds.is_visible(key).map(|visible| (key, visible)))
            .collect();
        worlds.set_visible(hide, false);
        worlds.set_visible(show, true);
        Self { worlds, saved }
    }

    fn worlds(&self) -> &Worlds {
        self.worlds
    }
}

impl Drop for VisibilitySwap<'_> {
    fn drop(&mut self) {
        for (key, visible) in self.saved.iter().rev() {
            self.worlds.set_visible(*key, *visible);
        }
    }
}

/// Renders the other world into the portal's offscreen target
#[derive(Debug)]
pub struct OffscreenCapture {
    settings: CaptureSettings,
    target: RenderTarget,
    last_texture: Option<TextureHandle>,
    last_resize: Option<ResizeOutcome>,
    captures: u64,
}

impl OffscreenCapture {
    pub fn new(settings: CaptureSettings) -> Self {
        Self {
            settings,
            target: RenderTarget::new(settings.format, settings.depth),
            last_texture: None,
            last_resize: None,
            captures: 0,
        }
    }

    pub fn settings(&self) -> &CaptureSettings {
        &self.settings
    }

    /// Change the quality multiplier; the target resizes on the next capture
    pub fn set_quality_multiplier(&mut self, multiplier: f32) {
        self.settings.quality_multiplier = multiplier;
    }

    pub fn target(&self) -> &RenderTarget {
        &self.target
    }

    /// Last texture produced, if any
    pub fn texture(&self) -> Option<TextureHandle> {
        self.last_texture
    }

    /// What the most recent capture did to the target size
    pub fn last_resize(&self) -> Option<ResizeOutcome> {
        self.last_resize
    }

    /// Number of successful captures
    pub fn capture_count(&self) -> u64 {
        self.captures
    }

    fn stale(&self) -> Captured {
        match self.last_texture {
            Some(texture) => Captured::Stale(texture),
            None => Captured::Unavailable,
        }
    }

    /// Skip this frame's capture, keeping the last good texture
    pub fn skip(&self, reason: &PortalError) -> Captured {
        log::debug!("Portal capture skipped: {}", reason);
        self.stale()
    }

    /// Render `other` (with `current` hidden) through `camera`
    ///
    /// Every failure degrades to the previous texture.
    pub fn capture<R: SceneRenderer + ?Sized>(
        &mut self,
        renderer: &mut R,
        worlds: &mut Worlds,
        camera: &PerspectiveCamera,
        viewport: (u32, u32),
        current: WorldKey,
        other: WorldKey,
    ) -> Captured {
        self.last_resize = None;
        match self
            .target
            .ensure_size(renderer, viewport, self.settings.quality_multiplier)
        {
            Ok(outcome) => self.last_resize = Some(outcome),
            Err(err) => log::warn!("Portal target unavailable: {}", err),
        }
        let Some(handle) = self.target.handle() else {
            return self.stale();
        };

        let rendered = {
            let binding = TargetBinding::bind(renderer, handle);
            let swap = VisibilitySwap::new(worlds, current, other);
            match binding.renderer.clear() {
                Ok(()) => binding.renderer.render(swap.worlds(), camera),
                Err(err) => Err(err),
            }
        };

        if let Err(err) = rendered {
            log::warn!("Portal capture failed: {}", err);
            return self.stale();
        }

        match self.target.texture(renderer) {
            Some(texture) => {
                self.last_texture = Some(texture);
                self.captures += 1;
                Captured::Fresh(texture)
            }
            None => self.stale(),
        }
    }

    /// Release the offscreen target
    pub fn release<R: SceneRenderer + ?Sized>(&mut self, renderer: &mut R) {
        self.target.release(renderer);
        self.last_texture = None;
        self.last_resize = None;
    }
}
