//! Initial-state generators for particle emitters
//!
//! Generators produce the initial contents of the simulation's position and
//! velocity textures. Output is laid out row-major in a square texture of side
//! [`texture_side`]; texels past `count` are zero.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use shardgate_math::Vec3;

/// Side length of the square texture holding `count` particles
pub fn texture_side(count: usize) -> u32 {
    if count == 0 {
        return 1;
    }
    let side = (count as f64).sqrt().ceil() as u32;
    side.max(1)
}

/// Where particles start
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum PositionGenerator {
    /// Uniformly inside a ball
    RandomSphere { radius: f32, center: [f32; 3] },
    /// Inside a spherical shell: distance from center in `radius * (1 - rim) ..= radius`
    SphericalShell { radius: f32, rim: f32, center: [f32; 3] },
}

impl Default for PositionGenerator {
    fn default() -> Self {
        PositionGenerator::RandomSphere {
            radius: 0.05,
            center: [0.0; 3],
        }
    }
}

/// How particles start moving
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum VelocityGenerator {
    /// Outward from `center` at `speed`, direction perturbed by up to `jitter`
    ///
    /// The w component is the spin accumulator and starts at 0.
    Radial { speed: f32, center: [f32; 3], jitter: f32 },
    /// All particles at rest
    Still,
}

impl Default for VelocityGenerator {
    fn default() -> Self {
        VelocityGenerator::Radial {
            speed: 2.0,
            center: [0.0; 3],
            jitter: 0.3,
        }
    }
}

/// Initial texture contents for one emitter
#[derive(Clone, Debug, PartialEq)]
pub struct InitialState {
    /// Texture side length
    pub side: u32,
    /// Number of live particles
    pub count: usize,
    /// RGBA texels: xyz position, w = 1.0 for live particles
    pub positions: Vec<[f32; 4]>,
    /// RGBA texels: xyz velocity, w = spin accumulator
    pub velocities: Vec<[f32; 4]>,
}

impl InitialState {
    /// Generate the initial state for `count` particles
    ///
    /// The same seed always produces the same state.
    pub fn generate(
        count: usize,
        positions: &PositionGenerator,
        velocities: &VelocityGenerator,
        seed: u64,
    ) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let side = texture_side(count);
        let texels = (side * side) as usize;

        let mut pos_out = vec![[0.0f32; 4]; texels];
        let mut vel_out = vec![[0.0f32; 4]; texels];

        for i in 0..count {
            let p = positions.sample(&mut rng);
            let v = velocities.sample(&mut rng, p);
            pos_out[i] = [p.x, p.y, p.z, 1.0];
            vel_out[i] = [v.x, v.y, v.z, 0.0];
        }

        Self {
            side,
            count,
            positions: pos_out,
            velocities: vel_out,
        }
    }
}

impl PositionGenerator {
    /// Draw one position
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Vec3 {
        match *self {
            PositionGenerator::RandomSphere { radius, center } => {
                Vec3::from(center) + random_in_unit_sphere(rng) * radius
            }
            PositionGenerator::SphericalShell { radius, rim, center } => {
                Vec3::from(center) + random_in_shell(rng, radius, rim)
            }
        }
    }
}

impl VelocityGenerator {
    /// Draw one velocity for a particle starting at `position`
    pub fn sample<R: Rng>(&self, rng: &mut R, position: Vec3) -> Vec3 {
        match *self {
            VelocityGenerator::Still => Vec3::ZERO,
            VelocityGenerator::Radial { speed, center, jitter } => {
                let outward = (position - Vec3::from(center)).normalize_or_zero();
                let base = if outward == Vec3::ZERO {
                    random_unit_vector(rng)
                } else {
                    outward
                };
                let dir = (base + random_unit_vector(rng) * jitter).normalize_or_zero();
                let dir = if dir == Vec3::ZERO { base } else { dir };
                dir * speed
            }
        }
    }
}

/// Uniform point inside the unit ball
pub(crate) fn random_in_unit_sphere<R: Rng>(rng: &mut R) -> Vec3 {
    loop {
        let v = Vec3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        );
        if v.length_squared() <= 1.0 {
            return v;
        }
    }
}

/// Uniform direction
pub(crate) fn random_unit_vector<R: Rng>(rng: &mut R) -> Vec3 {
    let theta = rng.gen_range(0.0..std::f32::consts::TAU);
    let cos_phi: f32 = rng.gen_range(-1.0..=1.0);
    let sin_phi = (1.0 - cos_phi * cos_phi).max(0.0).sqrt();
    Vec3::new(sin_phi * theta.cos(), sin_phi * theta.sin(), cos_phi)
}

/// Point in a spherical shell, radius drawn uniformly from the rim range
pub(crate) fn random_in_shell<R: Rng>(rng: &mut R, radius: f32, rim: f32) -> Vec3 {
    let min_radius = radius * (1.0 - rim.clamp(0.0, 1.0));
    let r = if radius > min_radius {
        rng.gen_range(min_radius..=radius)
    } else {
        radius
    };
    random_unit_vector(rng) * r
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_texture_side() {
        assert_eq!(texture_side(0), 1);
        assert_eq!(texture_side(1), 1);
        assert_eq!(texture_side(64), 8);
        assert_eq!(texture_side(65), 9);
        assert_eq!(texture_side(128), 12);
    }

    #[test]
    fn test_generate_layout_and_padding() {
        let state = InitialState::generate(
            10,
            &PositionGenerator::default(),
            &VelocityGenerator::default(),
            7,
        );
        assert_eq!(state.side, 4);
        assert_eq!(state.positions.len(), 16);
        assert_eq!(state.velocities.len(), 16);
        // live texels flagged in w, padding zeroed
        assert!(state.positions[..10].iter().all(|p| p[3] == 1.0));
        assert!(state.positions[10..].iter().all(|p| *p == [0.0; 4]));
        assert!(state.velocities.iter().all(|v| v[3] == 0.0));
    }

    #[test]
    fn test_generate_is_deterministic() {
        let a = InitialState::generate(32, &PositionGenerator::default(), &VelocityGenerator::default(), 42);
        let b = InitialState::generate(32, &PositionGenerator::default(), &VelocityGenerator::default(), 42);
        let c = InitialState::generate(32, &PositionGenerator::default(), &VelocityGenerator::default(), 43);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_random_sphere_within_radius() {
        let state = InitialState::generate(
            100,
            &PositionGenerator::RandomSphere { radius: 0.05, center: [1.0, 0.0, 0.0] },
            &VelocityGenerator::Still,
            1,
        );
        for p in &state.positions[..100] {
            let d = Vec3::new(p[0] - 1.0, p[1], p[2]).length();
            assert!(d <= 0.05 + 1e-6, "distance {}", d);
        }
    }

    #[test]
    fn test_shell_respects_rim() {
        let mut rng = StdRng::seed_from_u64(3);
        let gen = PositionGenerator::SphericalShell { radius: 2.0, rim: 0.5, center: [0.0; 3] };
        for _ in 0..200 {
            let d = gen.sample(&mut rng).length();
            assert!(d >= 1.0 - 1e-4 && d <= 2.0 + 1e-4, "distance {}", d);
        }
    }

    #[test]
    fn test_radial_velocity_speed_and_direction() {
        let mut rng = StdRng::seed_from_u64(9);
        let gen = VelocityGenerator::Radial { speed: 2.0, center: [0.0; 3], jitter: 0.3 };
        for _ in 0..50 {
            let p = Vec3::new(0.0, 0.0, 1.0);
            let v = gen.sample(&mut rng, p);
            assert!((v.length() - 2.0).abs() < 1e-4);
            // jitter 0.3 can't flip a particle inward
            assert!(v.z > 0.0);
        }
    }
}
