//! World container
//!
//! Each World is a self-contained scene subtree (lights, geometry, particle
//! emitters). Worlds stay resident for the whole portal session; only their
//! visibility flags change from frame to frame.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use shardgate_math::Vec3;
use shardgate_particles::{EmitterConfig, ShardPlacement};
use slotmap::{new_key_type, SlotMap};

use crate::Transform;

new_key_type! {
    /// Key to a world in [`Worlds`]
    ///
    /// Generational: a key to a removed world returns `None` instead of
    /// aliasing whatever world reuses the slot.
    pub struct WorldKey;
}

bitflags! {
    /// What changed on a world since the renderer last synced it
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct WorldDirty: u8 {
        const NONE = 0;
        /// Visibility flag flipped
        const VISIBILITY = 1 << 0;
        /// Root transform moved
        const TRANSFORM = 1 << 1;
        const ALL = Self::VISIBILITY.bits() | Self::TRANSFORM.bits();
    }
}

/// Anchors a world carries for camera travel
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldMarkers {
    /// Where the camera starts its flight in this world
    pub start: Option<Vec3>,
    /// Where the flight ends
    pub end: Option<Vec3>,
}

/// A named scene subtree
#[derive(Clone, Debug)]
pub struct World {
    pub name: String,
    visible: bool,
    root: Transform,
    pub markers: WorldMarkers,
    pub emitters: Vec<EmitterConfig>,
    /// Shard objects spread around the world's center
    pub shards: Vec<ShardPlacement>,
    dirty: WorldDirty,
}

impl World {
    /// Create a visible world at the origin
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visible: true,
            root: Transform::identity(),
            markers: WorldMarkers::default(),
            emitters: Vec::new(),
            shards: Vec::new(),
            dirty: WorldDirty::ALL,
        }
    }

    /// Set the root transform (builder)
    pub fn with_transform(mut self, root: Transform) -> Self {
        self.root = root;
        self
    }

    /// Set the travel markers (builder)
    pub fn with_markers(mut self, markers: WorldMarkers) -> Self {
        self.markers = markers;
        self
    }

    /// Add a particle emitter (builder)
    pub fn with_emitter(mut self, emitter: EmitterConfig) -> Self {
        self.emitters.push(emitter);
        self
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Set visibility, marking the world dirty only when the flag changes
    pub fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            self.visible = visible;
            self.dirty |= WorldDirty::VISIBILITY;
        }
    }

    pub fn root(&self) -> &Transform {
        &self.root
    }

    pub fn set_root(&mut self, root: Transform) {
        self.root = root;
        self.dirty |= WorldDirty::TRANSFORM;
    }

    pub fn dirty(&self) -> WorldDirty {
        self.dirty
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = WorldDirty::NONE;
    }
}

/// All resident worlds, iterated in insertion order
#[derive(Default)]
pub struct Worlds {
    worlds: SlotMap<WorldKey, World>,
    order: Vec<WorldKey>,
}

impl Worlds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a world and return its key
    pub fn insert(&mut self, world: World) -> WorldKey {
        let key = self.worlds.insert(world);
        self.order.push(key);
        key
    }

    /// Remove a world and return it
    pub fn remove(&mut self, key: WorldKey) -> Option<World> {
        let world = self.worlds.remove(key)?;
        self.order.retain(|k| *k != key);
        Some(world)
    }

    pub fn get(&self, key: WorldKey) -> Option<&World> {
        self.worlds.get(key)
    }

    pub fn get_mut(&mut self, key: WorldKey) -> Option<&mut World> {
        self.worlds.get_mut(key)
    }

    /// Find a world's key by name
    pub fn find_by_name(&self, name: &str) -> Option<WorldKey> {
        self.order
            .iter()
            .copied()
            .find(|k| self.worlds.get(*k).is_some_and(|w| w.name == name))
    }

    /// Visibility of a world, `None` for a stale key
    pub fn is_visible(&self, key: WorldKey) -> Option<bool> {
        self.worlds.get(key).map(World::is_visible)
    }

    /// Set a world's visibility; returns false for a stale key
    pub fn set_visible(&mut self, key: WorldKey, visible: bool) -> bool {
        match self.worlds.get_mut(key) {
            Some(world) => {
                world.set_visible(visible);
                true
            }
            None => false,
        }
    }

    /// Keys in insertion order
    pub fn keys(&self) -> &[WorldKey] {
        &self.order
    }

    /// Worlds in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (WorldKey, &World)> + '_ {
        self.order
            .iter()
            .filter_map(move |k| self.worlds.get(*k).map(|w| (*k, w)))
    }

    /// Number of currently visible worlds
    pub fn visible_count(&self) -> usize {
        self.worlds.values().filter(|w| w.is_visible()).count()
    }

    pub fn len(&self) -> usize {
        self.worlds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.worlds.is_empty()
    }
}
