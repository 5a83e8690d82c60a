//! Particle kernels and initial-state generators
//!
//! The GPU particle simulation itself (double-buffered position/velocity
//! textures stepped by small kernels) is an external service. This crate
//! supplies what that service consumes:
//! - Per-step velocity kernels as a tagged enum ([`VelocityKernel`])
//! - Seeded initial-state generators for positions and velocities
//! - Shard placement for the procedurally generated shard objects
//! - The explosion animation curve that drives kernel uniforms each frame
//! - A CPU reference simulation for headless runs

pub mod animation;
pub mod cpu;
pub mod generators;
pub mod kernel;
pub mod layout;
pub mod service;

pub use animation::{ExplosionAnimation, ParticleFrameUniforms};
pub use cpu::{CpuSimulation, SimulationError};
pub use generators::{texture_side, InitialState, PositionGenerator, VelocityGenerator};
pub use kernel::{AnimatedDampingParams, KernelError, UniformValue, VelocityKernel};
pub use layout::{ShardLayout, ShardLayoutConfig, ShardPlacement};
pub use service::{EmitterConfig, SimulationService, SimulationTextures};
