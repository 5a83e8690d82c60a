//! Application systems
//!
//! Per-frame systems kept out of the application state for testability.

mod portal;
mod simulation;

pub use portal::{FrameFlags, FrameReport, PortalSystem};
pub use simulation::{SimulationResult, SimulationSystem};
