//! Procedural shard placement
//!
//! Shards are spread through a spherical shell by farthest-point sampling over
//! a pool of random candidates. When no candidate is far enough from the
//! placed shards, a bounded number of random positions is tried instead.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use shardgate_math::Vec3;

use crate::generators::random_in_shell;

/// Shard placement settings
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShardLayoutConfig {
    /// Minimum distance between two shards
    pub min_distance: f32,
    /// Random attempts before accepting a crowded position
    pub max_position_attempts: u32,
    /// Outer radius of the shell
    pub radius: f32,
    /// Shell thickness as a fraction of the radius
    pub rim: f32,
}

impl Default for ShardLayoutConfig {
    fn default() -> Self {
        Self {
            min_distance: 0.1,
            max_position_attempts: 100,
            radius: 0.5,
            rim: 0.5,
        }
    }
}

/// Where one shard sits and how it faces the camera
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShardPlacement {
    pub position: Vec3,
    /// XY scale; z is always 1
    pub scale: Vec3,
    /// Pitch/yaw offset from facing the camera, each within ±π/4
    pub camera_offset: Vec3,
    /// Roll around the facing axis, within ±π
    pub base_rotation_z: f32,
}

/// A generated set of shard placements
#[derive(Clone, Debug, PartialEq)]
pub struct ShardLayout {
    pub placements: Vec<ShardPlacement>,
}

impl ShardLayout {
    /// Place `count` shards, deterministically for a given seed
    pub fn generate(count: usize, config: &ShardLayoutConfig, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let positions = sample_positions(&mut rng, count, config);

        let placements = positions
            .into_iter()
            .map(|position| {
                let xy = rng.gen_range(2.0..2.2);
                ShardPlacement {
                    position,
                    scale: Vec3::new(xy, xy, 1.0),
                    camera_offset: camera_offset(&mut rng),
                    base_rotation_z: (rng.gen::<f32>() - 0.5) * std::f32::consts::TAU,
                }
            })
            .collect();

        Self { placements }
    }

    /// Smallest distance between any two placed shards
    pub fn min_spacing(&self) -> Option<f32> {
        let mut best: Option<f32> = None;
        for (i, a) in self.placements.iter().enumerate() {
            for b in &self.placements[i + 1..] {
                let d = a.position.distance(b.position);
                best = Some(best.map_or(d, |m| m.min(d)));
            }
        }
        best
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }
}

fn camera_offset<R: Rng>(rng: &mut R) -> Vec3 {
    let quarter = std::f32::consts::FRAC_PI_2;
    Vec3::new(
        (rng.gen::<f32>() - 0.5) * quarter,
        (rng.gen::<f32>() - 0.5) * quarter,
        0.0,
    )
}

fn min_distance_to(position: Vec3, placed: &[Vec3]) -> f32 {
    placed
        .iter()
        .map(|p| p.distance(position))
        .fold(f32::INFINITY, f32::min)
}

fn sample_positions<R: Rng>(rng: &mut R, count: usize, config: &ShardLayoutConfig) -> Vec<Vec3> {
    let candidate_count = (count * 20).max(100);
    let candidates: Vec<Vec3> = (0..candidate_count)
        .map(|_| random_in_shell(rng, config.radius, config.rim))
        .collect();

    let mut placed: Vec<Vec3> = Vec::with_capacity(count);
    for _ in 0..count {
        if placed.is_empty() {
            placed.push(random_in_shell(rng, config.radius, config.rim));
            continue;
        }

        let best = candidates
            .iter()
            .map(|c| (*c, min_distance_to(*c, &placed)))
            .fold(None, |best: Option<(Vec3, f32)>, (c, d)| match best {
                Some((_, bd)) if bd >= d => best,
                _ => Some((c, d)),
            });

        match best {
            Some((candidate, distance)) if distance >= config.min_distance => placed.push(candidate),
            _ => {
                let mut position = random_in_shell(rng, config.radius, config.rim);
                let mut attempts = 1;
                while min_distance_to(position, &placed) < config.min_distance
                    && attempts < config.max_position_attempts
                {
                    position = random_in_shell(rng, config.radius, config.rim);
                    attempts += 1;
                }
                if min_distance_to(position, &placed) < config.min_distance {
                    log::debug!(
                        "Shard {} placed closer than {} after {} attempts",
                        placed.len(),
                        config.min_distance,
                        attempts
                    );
                }
                placed.push(position);
            }
        }
    }
    placed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_count() {
        let layout = ShardLayout::generate(12, &ShardLayoutConfig::default(), 5);
        assert_eq!(layout.len(), 12);
        assert!(ShardLayout::generate(0, &ShardLayoutConfig::default(), 5).is_empty());
    }

    #[test]
    fn test_positions_inside_shell() {
        let config = ShardLayoutConfig::default();
        let layout = ShardLayout::generate(16, &config, 11);
        for p in &layout.placements {
            let r = p.position.length();
            assert!(r >= 0.25 - 1e-4 && r <= 0.5 + 1e-4, "radius {}", r);
        }
    }

    #[test]
    fn test_sparse_layout_respects_min_distance() {
        // A handful of shards in a large shell is always satisfiable
        let config = ShardLayoutConfig {
            radius: 5.0,
            rim: 0.5,
            min_distance: 0.5,
            ..Default::default()
        };
        let layout = ShardLayout::generate(8, &config, 21);
        let spacing = layout.min_spacing().unwrap();
        assert!(spacing >= 0.5, "spacing {}", spacing);
    }

    #[test]
    fn test_offsets_and_scales_in_range() {
        let layout = ShardLayout::generate(20, &ShardLayoutConfig::default(), 2);
        let quarter_pi = std::f32::consts::FRAC_PI_4;
        for p in &layout.placements {
            assert!(p.camera_offset.x.abs() <= quarter_pi);
            assert!(p.camera_offset.y.abs() <= quarter_pi);
            assert_eq!(p.camera_offset.z, 0.0);
            assert!(p.base_rotation_z.abs() <= std::f32::consts::PI);
            assert!(p.scale.x >= 2.0 && p.scale.x < 2.2);
            assert_eq!(p.scale.x, p.scale.y);
            assert_eq!(p.scale.z, 1.0);
        }
    }

    #[test]
    fn test_same_seed_same_layout() {
        let config = ShardLayoutConfig::default();
        assert_eq!(ShardLayout::generate(6, &config, 99), ShardLayout::generate(6, &config, 99));
    }
}
