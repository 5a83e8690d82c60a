//! Per-step velocity kernels
//!
//! Each kernel is a short update evaluated once per particle per frame by the
//! external simulation. Kernels are plain data: they can be validated, have
//! their uniforms listed, and be evaluated on the CPU without a renderer.

use serde::{Deserialize, Serialize};
use shardgate_math::easing::{lerp, smoothstep};
use shardgate_math::Vec4;

/// A named uniform value handed to the simulation service
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
    Float(f32),
}

/// Parameters of the animated damping kernel
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimatedDampingParams {
    /// Velocity multiplier per step (1.0 = no damping)
    pub damping: f32,
    /// Noise amplitude (carried for the GPU kernel, unused by the CPU path)
    pub noise_strength: f32,
    /// Noise frequency (carried for the GPU kernel, unused by the CPU path)
    pub noise_scale: f32,
    /// Explosion animation progress, 0..1
    pub animation_value: f32,
}

impl Default for AnimatedDampingParams {
    fn default() -> Self {
        Self {
            damping: 1.0,
            noise_strength: 0.1,
            noise_scale: 2.0,
            animation_value: 0.0,
        }
    }
}

/// Velocity update kernels understood by the simulation service
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum VelocityKernel {
    /// Leave velocities untouched
    Passthrough,
    /// Damp xyz and accumulate a spin multiplier in w
    ///
    /// The spin multiplier starts at 20x and eases down to 1x as the
    /// explosion animation reaches 0.6.
    AnimatedDamping(AnimatedDampingParams),
}

impl Default for VelocityKernel {
    fn default() -> Self {
        VelocityKernel::AnimatedDamping(AnimatedDampingParams::default())
    }
}

/// Kernel parameter validation failure
#[derive(Clone, Debug, PartialEq)]
pub enum KernelError {
    /// A parameter is NaN or infinite
    NonFinite(&'static str),
    /// A parameter is outside its allowed range
    OutOfRange { name: &'static str, value: f32 },
}

impl std::fmt::Display for KernelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KernelError::NonFinite(name) => write!(f, "kernel parameter '{}' is not finite", name),
            KernelError::OutOfRange { name, value } => {
                write!(f, "kernel parameter '{}' out of range: {}", name, value)
            }
        }
    }
}

impl std::error::Error for KernelError {}

const ANIMATED_DAMPING_WGSL: &str = "\
vel = vec4<f32>(vel.xyz * damping, vel.w);
let spin = mix(20.0, 1.0, smoothstep(0.0, 0.6, animationValue));
vel.w = vel.w + delta * spin;";

const PASSTHROUGH_WGSL: &str = "";

impl VelocityKernel {
    /// Kernel name used by the simulation service to cache compiled programs
    pub fn name(&self) -> &'static str {
        match self {
            VelocityKernel::Passthrough => "Passthrough",
            VelocityKernel::AnimatedDamping(_) => "AnimatedDamping",
        }
    }

    /// Body of the velocity update, spliced into the service's step shader
    pub fn wgsl_body(&self) -> &'static str {
        match self {
            VelocityKernel::Passthrough => PASSTHROUGH_WGSL,
            VelocityKernel::AnimatedDamping(_) => ANIMATED_DAMPING_WGSL,
        }
    }

    /// Uniforms the kernel body reads, in declaration order
    pub fn uniforms(&self) -> Vec<(&'static str, UniformValue)> {
        match self {
            VelocityKernel::Passthrough => Vec::new(),
            VelocityKernel::AnimatedDamping(p) => vec![
                ("damping", UniformValue::Float(p.damping)),
                ("noiseStrength", UniformValue::Float(p.noise_strength)),
                ("noiseScale", UniformValue::Float(p.noise_scale)),
                ("animationValue", UniformValue::Float(p.animation_value)),
            ],
        }
    }

    /// Check parameter ranges
    pub fn validate(&self) -> Result<(), KernelError> {
        match self {
            VelocityKernel::Passthrough => Ok(()),
            VelocityKernel::AnimatedDamping(p) => {
                for (name, value) in [
                    ("damping", p.damping),
                    ("noise_strength", p.noise_strength),
                    ("noise_scale", p.noise_scale),
                    ("animation_value", p.animation_value),
                ] {
                    if !value.is_finite() {
                        return Err(KernelError::NonFinite(name));
                    }
                }
                if !(0.0..=1.0).contains(&p.damping) {
                    return Err(KernelError::OutOfRange { name: "damping", value: p.damping });
                }
                if !(0.0..=1.0).contains(&p.animation_value) {
                    return Err(KernelError::OutOfRange {
                        name: "animation_value",
                        value: p.animation_value,
                    });
                }
                Ok(())
            }
        }
    }

    /// Apply the per-frame uniforms produced by the explosion animation
    pub fn with_frame(self, damping: f32, animation_value: f32) -> Self {
        match self {
            VelocityKernel::Passthrough => self,
            VelocityKernel::AnimatedDamping(p) => VelocityKernel::AnimatedDamping(AnimatedDampingParams {
                damping,
                animation_value,
                ..p
            }),
        }
    }

    /// CPU evaluation of the kernel for one particle
    pub fn apply(&self, velocity: Vec4, delta: f32) -> Vec4 {
        match self {
            VelocityKernel::Passthrough => velocity,
            VelocityKernel::AnimatedDamping(p) => {
                let spin = lerp(20.0, 1.0, smoothstep(0.0, 0.6, p.animation_value));
                Vec4::new(
                    velocity.x * p.damping,
                    velocity.y * p.damping,
                    velocity.z * p.damping,
                    velocity.w + delta * spin,
                )
            }
        }
    }
}
