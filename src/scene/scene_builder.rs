//! SceneBuilder - Declarative portal stage construction
//!
//! Provides a fluent API for building scene templates with worlds, particle
//! emitters and the portal quad.

use shardgate_core::{PortalGeometry, PortalQuad, SceneTemplate, Transform, WorldMarkers, WorldTemplate};
use shardgate_math::Vec3;
use shardgate_particles::{EmitterConfig, PositionGenerator, ShardLayoutConfig, VelocityGenerator};

use crate::config::ParticlesConfig;

/// Builder for portal scene templates
///
/// # Example
/// ```ignore
/// let template = SceneBuilder::new("demo")
///     .add_world("blue_box", Vec3::new(0.0, 0.0, -5.0))
///     .add_world("red_sphere", Vec3::new(0.0, 0.0, -5.0))
///     .with_portal_rectangle(4.0, 6.0, Vec3::new(0.0, 1.5, 0.0))
///     .build();
/// ```
pub struct SceneBuilder {
    template: SceneTemplate,
}

impl SceneBuilder {
    /// Create a builder with no worlds and the default portal
    pub fn new(name: &str) -> Self {
        Self {
            template: SceneTemplate::new(name, PortalQuad::default()),
        }
    }

    /// Add a world whose root sits at `position`
    pub fn add_world(mut self, name: &str, position: Vec3) -> Self {
        self.template
            .worlds
            .push(WorldTemplate::new(name).with_transform(Transform::from_position(position)));
        self
    }

    /// Set start/end anchors on the most recently added world
    pub fn with_markers(mut self, start: Vec3, end: Vec3) -> Self {
        if let Some(world) = self.template.worlds.last_mut() {
            world.markers = WorldMarkers {
                start: Some(start),
                end: Some(end),
            };
        }
        self
    }

    /// Attach a particle emitter to the most recently added world
    pub fn add_emitter(mut self, emitter: EmitterConfig) -> Self {
        if let Some(world) = self.template.worlds.last_mut() {
            world.emitters.push(emitter);
        }
        self
    }

    /// Spread `count` generated shards around the most recently added world
    pub fn with_shards(mut self, count: usize, config: &ShardLayoutConfig, seed: u64) -> Self {
        if let Some(world) = self.template.worlds.pop() {
            self.template.worlds.push(world.with_shards(count, config, seed));
        }
        self
    }

    /// Use a rectangular portal of `width` x `height` centered at `position`
    pub fn with_portal_rectangle(mut self, width: f32, height: f32, position: Vec3) -> Self {
        self.template.portal = PortalQuad::new(
            PortalGeometry::Rectangle { width, height },
            Transform::from_position(position),
        );
        self
    }

    /// Finish building
    pub fn build(self) -> SceneTemplate {
        self.template
    }
}

/// Shard burst emitter for one world
fn burst_emitter(name: &str, particles: &ParticlesConfig, seed_offset: u64) -> EmitterConfig {
    EmitterConfig {
        name: name.to_string(),
        count: particles.count,
        seed: particles.seed.wrapping_add(seed_offset),
        positions: PositionGenerator::SphericalShell {
            radius: 0.5,
            rim: 0.5,
            center: [0.0, 0.0, 0.0],
        },
        velocities: VelocityGenerator::default(),
        ..EmitterConfig::default()
    }
}

/// The built-in two-world stage
///
/// A blue box world and a red sphere world, both 5 units behind the portal,
/// viewed through a 4x6 portal at (0, 1.5, 0).
pub fn default_stage(particles: &ParticlesConfig) -> SceneTemplate {
    let layout = ShardLayoutConfig::default();
    SceneBuilder::new("shardgate")
        .add_world("blue_box", Vec3::new(0.0, 0.0, -5.0))
        .with_markers(Vec3::new(0.0, 0.0, 0.5), Vec3::new(0.0, 0.0, -3.0))
        .add_emitter(burst_emitter("blue_shards", particles, 0))
        .with_shards(particles.shards, &layout, particles.seed)
        .add_world("red_sphere", Vec3::new(0.0, 0.0, -5.0))
        .with_markers(Vec3::new(0.0, 0.0, 0.5), Vec3::new(0.0, 0.0, -3.0))
        .add_emitter(burst_emitter("red_shards", particles, 1))
        .with_shards(particles.shards, &layout, particles.seed.wrapping_add(1))
        .with_portal_rectangle(4.0, 6.0, Vec3::new(0.0, 1.5, 0.0))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_stage_is_valid() {
        let template = default_stage(&ParticlesConfig::default());
        assert!(template.validate().is_ok());
        assert_eq!(template.worlds.len(), 2);
        assert_eq!(template.worlds[0].name, "blue_box");
        assert_eq!(template.worlds[1].name, "red_sphere");
        assert_eq!(
            template.portal.geometry,
            PortalGeometry::Rectangle { width: 4.0, height: 6.0 }
        );
        assert_eq!(template.portal.transform.position, Vec3::new(0.0, 1.5, 0.0));
    }

    #[test]
    fn test_emitters_use_distinct_seeds() {
        let template = default_stage(&ParticlesConfig::default());
        let a = &template.worlds[0].emitters[0];
        let b = &template.worlds[1].emitters[0];
        assert_ne!(a.seed, b.seed);
        assert_eq!(a.count, 64);
    }

    #[test]
    fn test_builder_ignores_modifiers_without_world() {
        let template = SceneBuilder::new("empty")
            .with_markers(Vec3::ZERO, Vec3::ONE)
            .add_emitter(EmitterConfig::default())
            .with_shards(4, &ShardLayoutConfig::default(), 0)
            .build();
        assert!(template.worlds.is_empty());
    }

    #[test]
    fn test_default_stage_places_shards() {
        let particles = ParticlesConfig::default();
        let stage = default_stage(&particles).instantiate().unwrap();
        for (_, world) in stage.worlds.iter() {
            assert_eq!(world.shards.len(), particles.shards);
            for shard in &world.shards {
                assert!(shard.position.length() <= 0.5 + 1e-4);
            }
        }
        let blue = stage.worlds.get(stage.world_keys[0]).unwrap();
        let red = stage.worlds.get(stage.world_keys[1]).unwrap();
        assert_ne!(blue.shards, red.shards);
    }

    #[test]
    fn test_stage_instantiates() {
        let stage = default_stage(&ParticlesConfig::default()).instantiate().unwrap();
        assert_eq!(stage.worlds.len(), 2);
        assert!(stage.worlds.find_by_name("red_sphere").is_some());
    }
}
