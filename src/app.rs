//! Portal application state
//!
//! Ties the stage, world switch, camera flight and portal system together and
//! applies input actions. The renderer is passed in per frame so the same
//! state can drive a GPU renderer or the headless recording one.

use shardgate_core::{PortalStage, SceneLoadError, SceneTemplate, WorldSwitch};
use shardgate_input::CameraFlightController;
use shardgate_particles::CpuSimulation;
use shardgate_render::{PerspectiveCamera, SceneRenderer};

use crate::config::AppConfig;
use crate::input::InputAction;
use crate::scene::default_stage;
use crate::systems::{FrameReport, PortalSystem, SimulationResult, SimulationSystem};

/// Error building the application
#[derive(Debug)]
pub enum AppError {
    /// Scene template could not be loaded or instantiated
    Scene(SceneLoadError),
    /// Stage could not form a world switch
    Portal(shardgate_core::PortalError),
}

impl From<SceneLoadError> for AppError {
    fn from(e: SceneLoadError) -> Self {
        AppError::Scene(e)
    }
}

impl From<shardgate_core::PortalError> for AppError {
    fn from(e: shardgate_core::PortalError) -> Self {
        AppError::Portal(e)
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Scene(e) => write!(f, "Scene error: {}", e),
            AppError::Portal(e) => write!(f, "Portal error: {}", e),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Scene(e) => Some(e),
            AppError::Portal(e) => Some(e),
        }
    }
}

/// Combined frame output
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameOutput {
    pub simulation: SimulationResult,
    pub portal: FrameReport,
}

/// Main application state
pub struct PortalApp {
    config: AppConfig,
    stage: PortalStage,
    switch: WorldSwitch,
    camera: PerspectiveCamera,
    flight: CameraFlightController,
    simulation: SimulationSystem,
    portal: PortalSystem,
    viewport: (u32, u32),
    hovered: bool,
}

impl PortalApp {
    /// Build from config with the scene from `run.scene`, or the built-in stage
    pub fn new(config: AppConfig) -> Result<Self, AppError> {
        let template = match &config.run.scene {
            Some(path) => SceneTemplate::load(path)?,
            None => default_stage(&config.particles),
        };
        Self::with_template(config, &template)
    }

    pub fn with_template(config: AppConfig, template: &SceneTemplate) -> Result<Self, AppError> {
        let mut stage = template.instantiate()?;
        let switch = stage
            .world_switch(config.transition.max_stage)?
            .with_show_other_during_blend(config.transition.show_other_during_blend);

        let mut portal = PortalSystem::new(
            config.portal.capture_settings(),
            config.portal.fit_orientation,
            config.material.to_params(),
        );
        portal.attach(&mut stage);

        // Arrival happens where the camera crosses the portal plane
        let portal_z = portal.plane_depth(&stage).unwrap_or(0.0);
        let mut camera = config.camera.to_camera(&config.viewport);
        let settings = config.flight.to_settings(&config.camera, portal_z);
        camera.look_at_point(settings.look_at);
        let flight = CameraFlightController::new(settings);

        let mut simulation = SimulationSystem::new(config.run.max_delta, config.particles.animation_duration);
        simulation.attach(&stage, |_| CpuSimulation::new());
        let viewport = config.viewport.size();

        log::info!(
            "Stage '{}' ready: {} worlds, flight {:?}",
            stage.name,
            stage.worlds.len(),
            settings.mode
        );

        Ok(Self {
            config,
            stage,
            switch,
            camera,
            flight,
            simulation,
            portal,
            viewport,
            hovered: false,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn stage(&self) -> &PortalStage {
        &self.stage
    }

    pub fn switch(&self) -> &WorldSwitch {
        &self.switch
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn flight(&self) -> &CameraFlightController {
        &self.flight
    }

    pub fn simulation(&self) -> &SimulationSystem {
        &self.simulation
    }

    pub fn portal(&self) -> &PortalSystem {
        &self.portal
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    /// Whether the pointer is over the portal surface
    pub fn is_portal_hovered(&self) -> bool {
        self.hovered
    }

    /// Apply an input action; returns false when the app should exit
    pub fn handle_action(&mut self, action: InputAction) -> bool {
        match action {
            InputAction::Exit => return false,
            InputAction::Reset => {
                self.switch.reset();
                self.flight.reset(&mut self.camera);
                log::info!("Reset to first world");
            }
            InputAction::TogglePause => {
                let paused = self.flight.toggle_pause();
                log::info!("Flight {}", if paused { "paused" } else { "resumed" });
            }
            InputAction::Scroll(delta) => {
                self.flight.process_scroll(delta);
            }
            InputAction::PortalClicked => {
                if self.flight.click(&mut self.switch) {
                    log::debug!("Portal click accepted");
                }
            }
            InputAction::PortalHover(hovered) => {
                if hovered != self.hovered {
                    self.hovered = hovered;
                    log::debug!("Portal {}", if hovered { "hovered" } else { "left" });
                }
            }
            InputAction::Resize { width, height } => {
                self.viewport = (width, height);
                self.camera.set_aspect(width, height);
            }
        }
        true
    }

    /// Simulate and render one frame
    pub fn frame<R: SceneRenderer + ?Sized>(&mut self, renderer: &mut R, raw_dt: f32) -> FrameOutput {
        if let Some(z) = self.portal.plane_depth(&self.stage) {
            self.flight.set_portal_z(z);
        }
        let simulation = self
            .simulation
            .update(raw_dt, &mut self.flight, &mut self.camera, &mut self.switch);
        let portal = self.portal.run_frame(
            renderer,
            &mut self.stage,
            &self.switch,
            &self.camera,
            self.viewport,
            simulation.dt,
        );
        FrameOutput { simulation, portal }
    }

    /// Wall-clock delta for real-time runs
    pub fn measure_delta(&mut self) -> f32 {
        self.simulation.measure_delta()
    }

    /// Release renderer resources (scene teardown)
    pub fn shutdown<R: SceneRenderer + ?Sized>(&mut self, renderer: &mut R) {
        self.portal.release(renderer);
        self.simulation.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FlightModeKind;
    use crate::systems::FrameFlags;
    use shardgate_render::RecordingRenderer;
    use winit::event::MouseScrollDelta;

    #[test]
    fn test_default_app_runs_frames() {
        let mut app = PortalApp::new(AppConfig::default()).unwrap();
        let mut renderer = RecordingRenderer::new();
        let out = app.frame(&mut renderer, 1.0 / 60.0);
        assert!(out.portal.flags.contains(FrameFlags::CAPTURED));
        assert!(app.stage().portal.material.is_some());
        // Both default worlds use the same damping kernel
        assert_eq!(app.simulation().kernel_count(), 1);
        assert_eq!(app.simulation().emitter_count(), 2);
        let blue = app.simulation().service("blue_shards").unwrap();
        assert_eq!(blue.upload_count(), 1);
        assert_eq!(blue.steps(), 1);
        app.shutdown(&mut renderer);
        assert_eq!(renderer.live_targets(), 0);
    }

    #[test]
    fn test_exit_action() {
        let mut app = PortalApp::new(AppConfig::default()).unwrap();
        assert!(app.handle_action(InputAction::TogglePause));
        assert!(app.flight().is_paused());
        assert!(!app.handle_action(InputAction::Exit));
    }

    #[test]
    fn test_resize_action() {
        let mut app = PortalApp::new(AppConfig::default()).unwrap();
        app.handle_action(InputAction::Resize { width: 1000, height: 500 });
        assert_eq!(app.viewport(), (1000, 500));
        assert!((app.camera().aspect - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_scroll_action_moves_target() {
        let mut config = AppConfig::default();
        config.flight.mode = FlightModeKind::Scroll;
        let mut app = PortalApp::new(config).unwrap();
        let before = app.flight().scroll_target_z();
        app.handle_action(InputAction::Scroll(MouseScrollDelta::LineDelta(0.0, -1.0)));
        assert!(app.flight().scroll_target_z() < before);
    }

    #[test]
    fn test_reset_action() {
        let mut app = PortalApp::new(AppConfig::default()).unwrap();
        let mut renderer = RecordingRenderer::new();
        // 5 units at 2 u/s with capped 0.1 s frames: arrival after ~25 frames
        for _ in 0..40 {
            app.frame(&mut renderer, 0.1);
        }
        assert_eq!(app.switch().toggle_count(), 1);
        app.handle_action(InputAction::Reset);
        assert_eq!(app.switch().state().current(), shardgate_core::WorldId::A);
        assert_eq!(app.camera().position.z, 5.0);
    }

    #[test]
    fn test_click_toggles_in_autopilot() {
        let mut app = PortalApp::new(AppConfig::default()).unwrap();
        let mut renderer = RecordingRenderer::new();
        app.frame(&mut renderer, 0.016);
        assert!(app.handle_action(InputAction::PortalClicked));
        assert_eq!(app.switch().toggle_count(), 1);

        let out = app.frame(&mut renderer, 0.016);
        assert!(out.simulation.world_toggled);
        assert!(out.portal.flags.contains(FrameFlags::WORLD_TOGGLED));
        assert_eq!(app.switch().state().current(), shardgate_core::WorldId(1));
    }

    #[test]
    fn test_arrival_follows_moved_portal() {
        let mut app = PortalApp::new(AppConfig::default()).unwrap();
        let mut renderer = RecordingRenderer::new();
        app.frame(&mut renderer, 0.1);

        // Push the portal back 2 units after the flight started
        app.stage.portal.transform.position.z = -2.0;
        let mut toggled_from = None;
        for _ in 0..60 {
            let before = app.camera().position.z;
            app.frame(&mut renderer, 0.1);
            if app.switch().toggle_count() == 1 && toggled_from.is_none() {
                toggled_from = Some(before);
            }
        }
        // the toggle frame started within one 0.2-unit step of the moved plane
        let z = toggled_from.unwrap();
        assert!(z > -2.0 && z < -1.7, "toggled from z {}", z);
    }

    #[test]
    fn test_hover_state() {
        let mut app = PortalApp::new(AppConfig::default()).unwrap();
        assert!(!app.is_portal_hovered());
        app.handle_action(InputAction::PortalHover(true));
        assert!(app.is_portal_hovered());
        app.handle_action(InputAction::PortalHover(false));
        assert!(!app.is_portal_hovered());
    }
}
