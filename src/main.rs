//! Shardgate - headless portal runner
//!
//! Runs the configured number of frames against the recording renderer and
//! logs world swaps. In click-tween mode a click on the screen center is
//! issued whenever the camera is idle.

use shardgate::app::PortalApp;
use shardgate::config::{AppConfig, FlightModeKind};
use shardgate::input::InputMapper;
use shardgate::systems::FrameFlags;
use shardgate_render::RecordingRenderer;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, MouseButton};

fn main() {
    let (config, load_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    // Initialize logging; RUST_LOG overrides the configured level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.debug.log_level.as_str()))
        .init();
    if let Some(e) = load_error {
        log::warn!("Failed to load config: {}. Using defaults.", e);
    }
    log::info!("Starting Shardgate");

    let frames = config.run.frames;
    let fixed_delta = config.run.fixed_delta;
    let click_mode = config.flight.mode == FlightModeKind::ClickTween;

    let mut app = match PortalApp::new(config) {
        Ok(app) => app,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };
    let mut renderer = RecordingRenderer::new();

    let mut stale_frames = 0u32;
    for frame in 0..frames {
        if click_mode {
            // The headless pointer rests at the viewport center
            let (width, height) = app.viewport();
            let center = PhysicalPosition::new(width as f64 / 2.0, height as f64 / 2.0);
            let size = PhysicalSize::new(width, height);
            let hover = InputMapper::map_cursor_moved(center, size, app.camera(), &app.stage().portal);
            app.handle_action(hover);

            if !app.flight().is_tweening() && !app.switch().state().is_transitioning() {
                if let Some(action) = InputMapper::map_mouse_button(
                    MouseButton::Left,
                    ElementState::Pressed,
                    center,
                    size,
                    app.camera(),
                    &app.stage().portal,
                ) {
                    app.handle_action(action);
                }
            }
        }

        let dt = if fixed_delta > 0.0 { fixed_delta } else { app.measure_delta() };
        let out = app.frame(&mut renderer, dt);

        if out.portal.flags.contains(FrameFlags::WORLD_TOGGLED) {
            let state = app.switch().state();
            log::info!(
                "Frame {}: now in world {} (stage {})",
                frame,
                state.current().0,
                state.stage()
            );
        }
        if out.portal.flags.contains(FrameFlags::STALE_TEXTURE) {
            stale_frames += 1;
        }
    }

    log::info!(
        "Ran {} frames: {} toggles, {} emitters, {} draws, {} stale portal frames",
        frames,
        app.switch().toggle_count(),
        app.simulation().emitter_count(),
        renderer.records().len(),
        stale_frames
    );
    app.shutdown(&mut renderer);
}
