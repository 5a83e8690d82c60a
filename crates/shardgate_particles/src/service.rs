//! Interface to the external particle simulation engine
//!
//! The engine owns the double-buffered position and velocity textures and runs
//! the step loop. This side only describes emitters, uploads their initial
//! state and hands over the kernel plus per-frame uniforms.

use serde::{Deserialize, Serialize};

use crate::animation::ParticleFrameUniforms;
use crate::generators::{InitialState, PositionGenerator, VelocityGenerator};
use crate::kernel::{KernelError, VelocityKernel};

/// Opaque handles to the engine's current output textures
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SimulationTextures {
    pub position: u64,
    pub velocity: u64,
    /// Texture side length
    pub side: u32,
}

/// Description of one particle emitter
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    pub name: String,
    pub count: usize,
    pub seed: u64,
    pub positions: PositionGenerator,
    pub velocities: VelocityGenerator,
    pub kernel: VelocityKernel,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            name: "shards".to_string(),
            count: 64,
            seed: 0,
            positions: PositionGenerator::default(),
            velocities: VelocityGenerator::default(),
            kernel: VelocityKernel::default(),
        }
    }
}

impl EmitterConfig {
    /// Generate this emitter's initial texture contents
    pub fn initial_state(&self) -> InitialState {
        InitialState::generate(self.count, &self.positions, &self.velocities, self.seed)
    }

    /// Reject emitters whose kernel parameters are out of range
    pub fn validate(&self) -> Result<(), KernelError> {
        self.kernel.validate()
    }
}

/// The external double-buffered simulation engine
pub trait SimulationService {
    type Error: std::error::Error;

    /// Upload initial positions and velocities, replacing any previous state
    fn upload_initial(&mut self, state: &InitialState) -> Result<(), Self::Error>;

    /// Run one simulation step with the given kernel and frame uniforms
    fn step(&mut self, kernel: &VelocityKernel, uniforms: &ParticleFrameUniforms) -> Result<(), Self::Error>;

    /// Textures produced by the most recent step
    fn textures(&self) -> Option<SimulationTextures>;
}
