//! Portal frame system
//!
//! Runs the per-frame portal work in a fixed order:
//! 1. World visibility from the switch state
//! 2. Portal corners from the quad's current transform
//! 3. Portal camera copied from the main camera and fitted to the corners
//! 4. Offscreen capture of the other world
//! 5. Material uniforms for the portal surface
//! 6. Main on-screen pass

use std::sync::Arc;

use bitflags::bitflags;
use shardgate_core::{PortalError, PortalStage, PortalSurfaceTracker, ResourceRegistry, WorldSwitch};
use shardgate_math::FitOrientation;
use shardgate_render::{
    compose, CaptureSettings, Captured, FitStatus, FrustumFitter, OffscreenCapture, PerspectiveCamera,
    PortalFrameInput, PortalMaterialParams, PortalUniforms, SceneRenderer, TextureHandle,
};

bitflags! {
    /// What happened during one portal frame
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct FrameFlags: u8 {
        /// The other world was rendered into the portal target
        const CAPTURED = 1 << 0;
        /// The portal shows a texture from an earlier frame (or none)
        const STALE_TEXTURE = 1 << 1;
        /// Corners were unusable and the previous frustum was kept
        const FRUSTUM_REUSED = 1 << 2;
        /// The offscreen target was (re)allocated
        const TARGET_RESIZED = 1 << 3;
        /// The current world changed since the previous frame
        const WORLD_TOGGLED = 1 << 4;
    }
}

/// Result of [`PortalSystem::run_frame`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub flags: FrameFlags,
    /// Texture the portal surface samples this frame
    pub texture: Option<TextureHandle>,
    pub uniforms: PortalUniforms,
}

/// Owns the portal camera, capture target and shared portal material
pub struct PortalSystem {
    tracker: PortalSurfaceTracker,
    fitter: FrustumFitter,
    capture: OffscreenCapture,
    portal_camera: PerspectiveCamera,
    materials: ResourceRegistry<PortalMaterialParams>,
    material: Arc<PortalMaterialParams>,
    last_toggle_count: u64,
    time: f32,
}

impl PortalSystem {
    pub fn new(
        capture: CaptureSettings,
        orientation: FitOrientation,
        material: PortalMaterialParams,
    ) -> Self {
        Self {
            tracker: PortalSurfaceTracker::new(),
            fitter: FrustumFitter::new(orientation),
            capture: OffscreenCapture::new(capture),
            portal_camera: PerspectiveCamera::default(),
            materials: ResourceRegistry::new(),
            material: Arc::new(material),
            last_toggle_count: 0,
            time: 0.0,
        }
    }

    /// Register the portal material in the shared registry and bind it to the stage's quad
    pub fn attach(&mut self, stage: &mut PortalStage) {
        let params = (*self.material).clone();
        match params.key() {
            Ok(key) => {
                self.material = self.materials.get_or_create(key, || params);
                stage.portal.material = Some(key);
            }
            Err(e) => log::warn!("Portal material not registered: {}", e),
        }
    }

    pub fn portal_camera(&self) -> &PerspectiveCamera {
        &self.portal_camera
    }

    pub fn capture(&self) -> &OffscreenCapture {
        &self.capture
    }

    pub fn material(&self) -> &PortalMaterialParams {
        &self.material
    }

    pub fn set_quality_multiplier(&mut self, multiplier: f32) {
        self.capture.set_quality_multiplier(multiplier);
    }

    /// Depth of the portal plane in world space
    ///
    /// `None` while the quad has no geometry to bound.
    pub fn plane_depth(&mut self, stage: &PortalStage) -> Option<f32> {
        self.tracker.corners(&stage.portal).ok().map(|c| c.center().z)
    }

    /// Run one frame of portal work and the main pass
    pub fn run_frame<R: SceneRenderer + ?Sized>(
        &mut self,
        renderer: &mut R,
        stage: &mut PortalStage,
        switch: &WorldSwitch,
        main_camera: &PerspectiveCamera,
        viewport: (u32, u32),
        dt: f32,
    ) -> FrameReport {
        let mut flags = FrameFlags::empty();
        self.time += dt.max(0.0);

        if switch.toggle_count() != self.last_toggle_count {
            self.last_toggle_count = switch.toggle_count();
            flags |= FrameFlags::WORLD_TOGGLED;
        }

        switch.apply_visibility(&mut stage.worlds);

        let captured = match self.prepare_camera(stage, main_camera) {
            Ok(status) => {
                if status == FitStatus::Reused {
                    flags |= FrameFlags::FRUSTUM_REUSED;
                }
                let captured = self.capture.capture(
                    renderer,
                    &mut stage.worlds,
                    &self.portal_camera,
                    viewport,
                    switch.current_key(),
                    switch.other_key(),
                );
                if self.capture.last_resize().is_some_and(|r| r.reallocated()) {
                    flags |= FrameFlags::TARGET_RESIZED;
                }
                captured
            }
            Err(err) => self.capture.skip(&err),
        };

        match captured {
            Captured::Fresh(_) => flags |= FrameFlags::CAPTURED,
            Captured::Stale(_) | Captured::Unavailable => flags |= FrameFlags::STALE_TEXTURE,
        }

        let uniforms = compose(
            &self.material,
            &PortalFrameInput {
                camera_position: main_camera.position,
                transition_ratio: switch.state().travel_progress(),
                time: self.time,
            },
        );

        if let Err(e) = renderer.render(&stage.worlds, main_camera) {
            log::warn!("Main pass failed: {}", e);
        }

        FrameReport {
            flags,
            texture: captured.texture(),
            uniforms,
        }
    }

    /// Corners, then the fitted portal camera
    fn prepare_camera(
        &mut self,
        stage: &PortalStage,
        main_camera: &PerspectiveCamera,
    ) -> Result<FitStatus, PortalError> {
        let corners = self.tracker.corners(&stage.portal)?;
        self.portal_camera.copy_from(main_camera);
        self.fitter
            .fit(&mut self.portal_camera, main_camera.position, &corners)
    }

    /// Release GPU resources and shared materials (scene teardown)
    pub fn release<R: SceneRenderer + ?Sized>(&mut self, renderer: &mut R) {
        self.capture.release(renderer);
        self.materials.clear();
        self.fitter.reset();
        self.tracker.invalidate();
    }
}
