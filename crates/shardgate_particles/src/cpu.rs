//! CPU reference simulation
//!
//! Runs the same kernels as the GPU engine on plain vectors. Used by the
//! headless runner and by tests to check what the kernels do to a burst.

use shardgate_math::Vec4;

use crate::animation::ParticleFrameUniforms;
use crate::generators::InitialState;
use crate::kernel::VelocityKernel;
use crate::service::{SimulationService, SimulationTextures};

/// Error from the CPU simulation
#[derive(Clone, Debug, PartialEq)]
pub enum SimulationError {
    /// `step` was called before any state was uploaded
    NotInitialized,
    /// Position and velocity buffers differ in length
    SizeMismatch { positions: usize, velocities: usize },
}

impl std::fmt::Display for SimulationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimulationError::NotInitialized => write!(f, "Simulation stepped before upload"),
            SimulationError::SizeMismatch { positions, velocities } => write!(
                f,
                "Initial state has {} positions but {} velocities",
                positions, velocities
            ),
        }
    }
}

impl std::error::Error for SimulationError {}

/// Position/velocity integration on the CPU
#[derive(Clone, Debug, Default)]
pub struct CpuSimulation {
    positions: Vec<Vec4>,
    velocities: Vec<Vec4>,
    side: u32,
    uploads: u64,
    steps: u64,
}

impl CpuSimulation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn positions(&self) -> &[Vec4] {
        &self.positions
    }

    pub fn velocities(&self) -> &[Vec4] {
        &self.velocities
    }

    /// Steps run since the last upload
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn upload_count(&self) -> u64 {
        self.uploads
    }
}

impl SimulationService for CpuSimulation {
    type Error = SimulationError;

    fn upload_initial(&mut self, state: &InitialState) -> Result<(), SimulationError> {
        if state.positions.len() != state.velocities.len() {
            return Err(SimulationError::SizeMismatch {
                positions: state.positions.len(),
                velocities: state.velocities.len(),
            });
        }
        self.positions = state.positions.iter().map(|p| Vec4::from(*p)).collect();
        self.velocities = state.velocities.iter().map(|v| Vec4::from(*v)).collect();
        self.side = state.side;
        self.uploads += 1;
        self.steps = 0;
        Ok(())
    }

    fn step(&mut self, kernel: &VelocityKernel, uniforms: &ParticleFrameUniforms) -> Result<(), SimulationError> {
        if self.uploads == 0 {
            return Err(SimulationError::NotInitialized);
        }
        let kernel = kernel.with_frame(uniforms.damping, uniforms.animation_value);
        for (p, v) in self.positions.iter_mut().zip(self.velocities.iter_mut()) {
            *v = kernel.apply(*v, uniforms.delta);
            *p += Vec4::new(v.x, v.y, v.z, 0.0) * uniforms.delta;
        }
        self.steps += 1;
        Ok(())
    }

    fn textures(&self) -> Option<SimulationTextures> {
        // ping-pong pair: even ids are positions, odd ids velocities
        (self.steps > 0).then_some(SimulationTextures {
            position: (self.steps % 2) * 2,
            velocity: (self.steps % 2) * 2 + 1,
            side: self.side,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::EmitterConfig;

    #[test]
    fn test_step_before_upload_fails() {
        let mut sim = CpuSimulation::new();
        let uniforms = ParticleFrameUniforms { damping: 1.0, animation_value: 0.0, time: 0.0, delta: 0.1 };
        assert_eq!(
            sim.step(&VelocityKernel::default(), &uniforms),
            Err(SimulationError::NotInitialized)
        );
        assert!(sim.textures().is_none());
    }

    #[test]
    fn test_mismatched_state_rejected() {
        let mut state = EmitterConfig::default().initial_state();
        state.velocities.pop();
        let mut sim = CpuSimulation::new();
        assert!(matches!(
            sim.upload_initial(&state),
            Err(SimulationError::SizeMismatch { .. })
        ));
        assert_eq!(sim.upload_count(), 0);
    }

    #[test]
    fn test_textures_ping_pong() {
        let mut sim = CpuSimulation::new();
        sim.upload_initial(&EmitterConfig::default().initial_state()).unwrap();
        let uniforms = ParticleFrameUniforms { damping: 1.0, animation_value: 0.0, time: 0.0, delta: 0.016 };
        sim.step(&VelocityKernel::default(), &uniforms).unwrap();
        let first = sim.textures().unwrap();
        sim.step(&VelocityKernel::default(), &uniforms).unwrap();
        let second = sim.textures().unwrap();
        assert_ne!(first.position, second.position);
        assert_eq!(first.side, second.side);
    }
}
