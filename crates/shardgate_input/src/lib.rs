//! Camera flight input
//!
//! This crate moves the viewer camera toward the portal and reports arrival:
//! autopilot travel, wheel-driven travel with smoothing, and click-triggered
//! eased flights.

mod flight;
mod tween;

pub use flight::{ArrivalDetector, CameraFlightController, FlightCamera, FlightMode, FlightSettings, FlightUpdate};
pub use tween::{Tween, TweenPurpose, TweenSample, Tweener};
