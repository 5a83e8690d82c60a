//! Shared explosion animation driving particle and shard uniforms

use serde::{Deserialize, Serialize};
use shardgate_math::easing::{lerp, smoothstep};

/// Uniforms handed to the velocity kernel each frame
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParticleFrameUniforms {
    pub damping: f32,
    pub animation_value: f32,
    pub time: f32,
    pub delta: f32,
}

/// Animation value running 0 -> 1 over a fixed duration with an ease-out curve
///
/// One instance is shared by every emitter and the shard group so they stay
/// in lockstep.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExplosionAnimation {
    duration: f32,
    elapsed: f32,
}

impl Default for ExplosionAnimation {
    fn default() -> Self {
        Self::new(10.0)
    }
}

impl ExplosionAnimation {
    /// Create an animation of `duration` seconds; non-positive durations finish immediately
    pub fn new(duration: f32) -> Self {
        Self {
            duration: duration.max(0.0),
            elapsed: 0.0,
        }
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Current animation value in 0..1
    pub fn value(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        let t = (self.elapsed / self.duration).clamp(0.0, 1.0);
        // quadratic ease-out
        1.0 - (1.0 - t) * (1.0 - t)
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Restart from zero
    pub fn restart(&mut self) {
        self.elapsed = 0.0;
    }

    /// Advance by `delta` seconds and return this frame's kernel uniforms
    pub fn advance(&mut self, delta: f32) -> ParticleFrameUniforms {
        let delta = delta.max(0.0);
        self.elapsed = (self.elapsed + delta).min(self.duration.max(0.0));
        self.uniforms(delta)
    }

    /// Uniforms for the current value without advancing
    pub fn uniforms(&self, delta: f32) -> ParticleFrameUniforms {
        let v = self.value();
        ParticleFrameUniforms {
            damping: lerp(1.0, 0.95, smoothstep(0.5, 0.7, v)),
            animation_value: v,
            time: self.elapsed,
            delta,
        }
    }

    /// Spin speed of the shard group in radians per second
    pub fn group_spin_speed(&self) -> f32 {
        lerp(5.0, 0.1, smoothstep(0.0, 0.6, self.value())) * 0.2
    }
}
