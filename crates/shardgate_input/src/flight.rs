//! Camera flight toward the portal
//!
//! The viewer camera travels along z toward the portal plane in one of three
//! modes:
//! - Autopilot: constant speed every frame
//! - Scroll: wheel notches move a target depth, the camera follows with
//!   frame-rate independent exponential smoothing
//! - Click tween: an eased 1.5 s flight to the portal and back
//!
//! Arrival at the portal plane toggles the world switch exactly once per
//! crossing, then the camera returns to its start offset.

use serde::{Deserialize, Serialize};
use shardgate_core::{TransitionEvent, WorldSwitch};
use shardgate_math::easing::{damp_factor, lerp};
use shardgate_math::Vec3;
use winit::event::MouseScrollDelta;

use crate::tween::{Tween, TweenPurpose, Tweener};

/// Pixels of smooth-scroll travel that count as one wheel notch
const PIXELS_PER_NOTCH: f32 = 100.0;

/// How the camera advances toward the portal
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlightMode {
    /// Constant speed in units per second
    Autopilot { speed: f32 },
    /// Each wheel-down notch moves the target `step` units closer; `rate` is
    /// the smoothing rate per second
    Scroll { step: f32, rate: f32 },
    /// Eased flight of `duration` seconds each way
    ClickTween { duration: f32 },
}

impl Default for FlightMode {
    fn default() -> Self {
        FlightMode::Autopilot { speed: 2.0 }
    }
}

/// Camera the flight controller can drive
pub trait FlightCamera {
    fn position(&self) -> Vec3;
    fn set_position(&mut self, position: Vec3);
    fn look_at(&mut self, target: Vec3);
}

/// One-shot detector for the camera reaching the portal plane
///
/// Fires once when the camera gets within `epsilon` of the plane (or past
/// it), then stays disarmed until the camera is back at the start offset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArrivalDetector {
    start_z: f32,
    portal_z: f32,
    epsilon: f32,
    armed: bool,
}

impl ArrivalDetector {
    pub fn new(start_z: f32, portal_z: f32, epsilon: f32) -> Self {
        Self {
            start_z,
            portal_z,
            epsilon: epsilon.abs(),
            armed: true,
        }
    }

    /// Distance from start to portal
    pub fn total_distance(&self) -> f32 {
        (self.start_z - self.portal_z).abs()
    }

    /// Remaining travel toward the portal; negative once past it
    pub fn remaining(&self, z: f32) -> f32 {
        let toward = (self.portal_z - self.start_z).signum();
        (self.portal_z - z) * toward
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Feed the camera depth; true exactly on the arrival frame
    pub fn check(&mut self, z: f32) -> bool {
        if !z.is_finite() || self.total_distance() <= self.epsilon {
            return false;
        }
        let remaining = self.remaining(z);
        if !self.armed {
            if remaining >= self.total_distance() - self.epsilon {
                self.armed = true;
            } else {
                return false;
            }
        }
        if remaining <= self.epsilon {
            self.armed = false;
            return true;
        }
        false
    }

    /// Normalized progress toward the portal: 0 at the start, 1 at the plane
    pub fn transition_ratio(&self, z: f32) -> f32 {
        let total = self.total_distance();
        if total <= f32::EPSILON {
            return 0.0;
        }
        1.0 - ((z - self.portal_z).abs() / total).clamp(0.0, 1.0)
    }
}

/// Settings for [`CameraFlightController`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlightSettings {
    pub mode: FlightMode,
    /// Camera start position; its z is the start offset
    pub start: Vec3,
    /// Depth of the portal plane
    pub portal_z: f32,
    /// Point the camera looks at during tweens
    pub look_at: Vec3,
    pub arrival_epsilon: f32,
}

impl Default for FlightSettings {
    fn default() -> Self {
        Self {
            mode: FlightMode::default(),
            start: Vec3::new(0.0, 0.0, 5.0),
            portal_z: 0.0,
            look_at: Vec3::new(0.0, 0.0, -5.0),
            arrival_epsilon: 1e-3,
        }
    }
}

/// What happened during one flight update
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FlightUpdate {
    /// Camera reached the portal this frame
    pub arrived: bool,
    /// The arrival swapped worlds (false when debounced)
    pub toggled: bool,
    /// The return tween finished this frame
    pub return_finished: bool,
    /// 0 at the start offset, 1 at the portal
    pub transition_ratio: f32,
    pub position: Vec3,
}

/// Drives the viewer camera toward the portal
pub struct CameraFlightController {
    settings: FlightSettings,
    detector: ArrivalDetector,
    scroll_target_z: f32,
    tweener: Tweener,
    paused: bool,
    pending_click: bool,
}

impl CameraFlightController {
    pub fn new(settings: FlightSettings) -> Self {
        Self {
            detector: ArrivalDetector::new(settings.start.z, settings.portal_z, settings.arrival_epsilon),
            scroll_target_z: settings.start.z,
            tweener: Tweener::new(),
            paused: false,
            pending_click: false,
            settings,
        }
    }

    pub fn settings(&self) -> &FlightSettings {
        &self.settings
    }

    pub fn mode(&self) -> FlightMode {
        self.settings.mode
    }

    /// Switch flight mode, dropping any running tween
    pub fn set_mode(&mut self, mode: FlightMode) {
        self.settings.mode = mode;
        self.tweener.cancel();
        self.pending_click = false;
        log::info!("Flight mode set to {:?}", mode);
    }

    /// Follow the portal plane as the portal quad moves
    pub fn set_portal_z(&mut self, portal_z: f32) {
        if portal_z != self.settings.portal_z {
            self.settings.portal_z = portal_z;
            self.detector = ArrivalDetector {
                armed: self.detector.armed,
                ..ArrivalDetector::new(self.settings.start.z, portal_z, self.settings.arrival_epsilon)
            };
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Pause or resume autopilot travel; returns the new paused state
    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    pub fn scroll_target_z(&self) -> f32 {
        self.scroll_target_z
    }

    pub fn detector(&self) -> &ArrivalDetector {
        &self.detector
    }

    pub fn is_tweening(&self) -> bool {
        self.tweener.is_running()
    }

    /// Process a winit wheel event; returns true if consumed
    pub fn process_scroll(&mut self, delta: MouseScrollDelta) -> bool {
        let notches = match delta {
            MouseScrollDelta::LineDelta(_, y) => -y,
            MouseScrollDelta::PixelDelta(pos) => -(pos.y as f32) / PIXELS_PER_NOTCH,
        };
        self.scroll(notches)
    }

    /// Advance the scroll target by `notches` wheel-down notches (negative = back)
    pub fn scroll(&mut self, notches: f32) -> bool {
        let FlightMode::Scroll { step, .. } = self.settings.mode else {
            return false;
        };
        if !notches.is_finite() || notches == 0.0 {
            return false;
        }
        let toward = (self.settings.portal_z - self.settings.start.z).signum();
        let total = self.detector.total_distance();
        // travel so far, allowed to overshoot the plane by one step
        let travelled = (self.scroll_target_z - self.settings.start.z) * toward + notches * step;
        let travelled = travelled.clamp(0.0, total + step);
        self.scroll_target_z = self.settings.start.z + travelled * toward;
        true
    }

    /// Handle a click on the portal surface; returns true if it was accepted
    ///
    /// In click-tween mode the click requests an eased flight to the portal,
    /// starting on the next update. A click during an approach restarts it
    /// from the current pose. In the other modes the click swaps worlds
    /// directly. Clicks are dropped while a world transition or the return
    /// flight is running.
    pub fn click(&mut self, switch: &mut WorldSwitch) -> bool {
        if switch.state().is_transitioning() {
            log::debug!("Click ignored: world transition still running");
            return false;
        }
        match self.settings.mode {
            FlightMode::ClickTween { .. } => {
                if self.tweener.active().is_some_and(|t| t.purpose == TweenPurpose::Return) {
                    log::debug!("Click ignored: camera is returning");
                    return false;
                }
                self.pending_click = true;
                true
            }
            FlightMode::Autopilot { .. } | FlightMode::Scroll { .. } => switch.toggle().is_ok(),
        }
    }

    /// Put the camera back at the start offset and re-arm arrival detection
    pub fn reset<C: FlightCamera>(&mut self, camera: &mut C) {
        self.tweener.cancel();
        self.pending_click = false;
        self.scroll_target_z = self.settings.start.z;
        camera.set_position(self.settings.start);
        self.detector.check(self.settings.start.z);
    }

    /// Advance the camera by `dt` seconds and run arrival detection
    pub fn update<C: FlightCamera>(&mut self, camera: &mut C, switch: &mut WorldSwitch, dt: f32) -> FlightUpdate {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let mut update = FlightUpdate::default();

        if self.pending_click {
            self.pending_click = false;
            self.start_approach(camera);
        }

        let mut position = camera.position();
        match self.settings.mode {
            FlightMode::Autopilot { speed } => {
                if !self.paused {
                    let toward = (self.settings.portal_z - self.settings.start.z).signum();
                    position.z += toward * speed * dt;
                    camera.set_position(position);
                }
            }
            FlightMode::Scroll { rate, .. } => {
                position.z = lerp(position.z, self.scroll_target_z, damp_factor(rate, dt));
                camera.set_position(position);
            }
            FlightMode::ClickTween { .. } => {
                if let Some((purpose, sample)) = self.tweener.advance(dt) {
                    position = sample.position;
                    camera.set_position(position);
                    camera.look_at(sample.look_at);
                    if purpose == TweenPurpose::Return && sample.finished {
                        switch.handle(TransitionEvent::EndTransition);
                        update.return_finished = true;
                    }
                }
            }
        }

        if self.detector.check(position.z) {
            update.arrived = true;
            update.toggled = switch.toggle().is_ok();
            self.after_arrival(camera, switch, update.toggled);
            position = camera.position();
        }

        update.transition_ratio = self.detector.transition_ratio(position.z);
        switch.handle(TransitionEvent::Progress(update.transition_ratio));
        update.position = position;
        update
    }

    fn start_approach<C: FlightCamera>(&mut self, camera: &mut C) {
        let FlightMode::ClickTween { duration } = self.settings.mode else {
            return;
        };
        let from = camera.position();
        let to = Vec3::new(self.settings.start.x, self.settings.start.y, self.settings.portal_z);
        self.tweener.start(Tween::new(
            TweenPurpose::Approach,
            (from, self.settings.look_at),
            (to, self.settings.look_at),
            duration,
        ));
    }

    fn after_arrival<C: FlightCamera>(&mut self, camera: &mut C, switch: &mut WorldSwitch, toggled: bool) {
        match self.settings.mode {
            FlightMode::ClickTween { duration } => {
                if toggled {
                    switch.handle(TransitionEvent::BeginTransition);
                }
                self.tweener.start(Tween::new(
                    TweenPurpose::Return,
                    (camera.position(), self.settings.look_at),
                    (self.settings.start, self.settings.look_at),
                    duration,
                ));
            }
            FlightMode::Autopilot { .. } | FlightMode::Scroll { .. } => {
                self.scroll_target_z = self.settings.start.z;
                camera.set_position(self.settings.start);
                self.detector.check(self.settings.start.z);
            }
        }
    }
}
