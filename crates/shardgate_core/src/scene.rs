//! Scene templates
//!
//! A [`SceneTemplate`] describes the resident worlds, their particle emitters
//! and the portal quad. Templates are loaded from and saved to RON files and
//! instantiated into a [`PortalStage`].

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

use shardgate_particles::{EmitterConfig, ShardLayout, ShardLayoutConfig, ShardPlacement};

use crate::error::PortalError;
use crate::portal::PortalQuad;
use crate::transition::WorldSwitch;
use crate::world::{World, WorldKey, WorldMarkers, Worlds};
use crate::Transform;

/// Serializable description of one world
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldTemplate {
    pub name: String,
    #[serde(default)]
    pub transform: Transform,
    #[serde(default)]
    pub markers: WorldMarkers,
    #[serde(default)]
    pub emitters: Vec<EmitterConfig>,
    #[serde(default)]
    pub shards: Vec<ShardPlacement>,
}

impl WorldTemplate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::identity(),
            markers: WorldMarkers::default(),
            emitters: Vec::new(),
            shards: Vec::new(),
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_markers(mut self, markers: WorldMarkers) -> Self {
        self.markers = markers;
        self
    }

    pub fn with_emitter(mut self, emitter: EmitterConfig) -> Self {
        self.emitters.push(emitter);
        self
    }

    /// Replace the shards with a generated layout
    pub fn with_shards(mut self, count: usize, config: &ShardLayoutConfig, seed: u64) -> Self {
        self.shards = ShardLayout::generate(count, config, seed).placements;
        self
    }

    /// Build the runtime world
    pub fn to_world(&self) -> World {
        let mut world = World::new(self.name.clone())
            .with_transform(self.transform)
            .with_markers(self.markers);
        world.emitters = self.emitters.clone();
        world.shards = self.shards.clone();
        world
    }
}

/// A loadable/saveable portal scene
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneTemplate {
    pub name: String,
    pub worlds: Vec<WorldTemplate>,
    #[serde(default)]
    pub portal: PortalQuad,
}

/// Instantiated scene: resident worlds plus the portal quad
pub struct PortalStage {
    pub name: String,
    pub worlds: Worlds,
    /// World keys in template order; the first starts as current
    pub world_keys: Vec<WorldKey>,
    pub portal: PortalQuad,
}

impl PortalStage {
    /// World switch over this stage's worlds
    pub fn world_switch(&self, max_stage: u8) -> Result<WorldSwitch, PortalError> {
        WorldSwitch::new(self.world_keys.clone(), max_stage)
    }
}

impl SceneTemplate {
    /// Create a template with no worlds
    pub fn new(name: impl Into<String>, portal: PortalQuad) -> Self {
        Self {
            name: name.into(),
            worlds: Vec::new(),
            portal,
        }
    }

    /// Add a world (builder)
    pub fn with_world(mut self, world: WorldTemplate) -> Self {
        self.worlds.push(world);
        self
    }

    /// Load a template from a RON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SceneLoadError> {
        let contents = fs::read_to_string(path)?;
        let template: SceneTemplate = ron::from_str(&contents)?;
        template.validate()?;
        Ok(template)
    }

    /// Save the template to a RON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SceneSaveError> {
        let pretty = ron::ser::PrettyConfig::new()
            .struct_names(true)
            .enumerate_arrays(false);
        let contents = ron::ser::to_string_pretty(self, pretty)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Check the template can be instantiated
    pub fn validate(&self) -> Result<(), SceneLoadError> {
        if self.worlds.len() < 2 {
            return Err(SceneLoadError::Invalid(format!(
                "scene '{}' needs at least 2 worlds, found {}",
                self.name,
                self.worlds.len()
            )));
        }
        for (i, world) in self.worlds.iter().enumerate() {
            if self.worlds[..i].iter().any(|w| w.name == world.name) {
                return Err(SceneLoadError::Invalid(format!("duplicate world name '{}'", world.name)));
            }
            for emitter in &world.emitters {
                emitter.validate().map_err(|e| {
                    SceneLoadError::Invalid(format!("emitter '{}' in '{}': {}", emitter.name, world.name, e))
                })?;
            }
        }
        if self.portal.geometry.is_zero_area() {
            return Err(SceneLoadError::Invalid("portal geometry has zero area".to_string()));
        }
        Ok(())
    }

    /// Create the runtime stage
    pub fn instantiate(&self) -> Result<PortalStage, SceneLoadError> {
        self.validate()?;
        let mut worlds = Worlds::new();
        let world_keys = self
            .worlds
            .iter()
            .map(|template| worlds.insert(template.to_world()))
            .collect();
        log::info!("Instantiated scene '{}' with {} worlds", self.name, self.worlds.len());
        Ok(PortalStage {
            name: self.name.clone(),
            worlds,
            world_keys,
            portal: self.portal.clone(),
        })
    }
}

/// Error loading a scene template
#[derive(Debug)]
pub enum SceneLoadError {
    /// IO error (file not found, permission denied, etc.)
    Io(io::Error),
    /// Parse error (invalid RON syntax)
    Parse(ron::error::SpannedError),
    /// Template parsed but cannot be instantiated
    Invalid(String),
}

impl From<io::Error> for SceneLoadError {
    fn from(e: io::Error) -> Self {
        SceneLoadError::Io(e)
    }
}

impl From<ron::error::SpannedError> for SceneLoadError {
    fn from(e: ron::error::SpannedError) -> Self {
        SceneLoadError::Parse(e)
    }
}

impl std::fmt::Display for SceneLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneLoadError::Io(e) => write!(f, "IO error: {}", e),
            SceneLoadError::Parse(e) => write!(f, "Parse error: {}", e),
            SceneLoadError::Invalid(msg) => write!(f, "Invalid scene: {}", msg),
        }
    }
}

impl std::error::Error for SceneLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SceneLoadError::Io(e) => Some(e),
            SceneLoadError::Parse(e) => Some(e),
            SceneLoadError::Invalid(_) => None,
        }
    }
}

/// Error saving a scene template
#[derive(Debug)]
pub enum SceneSaveError {
    /// IO error (permission denied, disk full, etc.)
    Io(io::Error),
    /// Serialization error
    Serialize(ron::Error),
}

impl From<io::Error> for SceneSaveError {
    fn from(e: io::Error) -> Self {
        SceneSaveError::Io(e)
    }
}

impl From<ron::Error> for SceneSaveError {
    fn from(e: ron::Error) -> Self {
        SceneSaveError::Serialize(e)
    }
}

impl std::fmt::Display for SceneSaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneSaveError::Io(e) => write!(f, "IO error: {}", e),
            SceneSaveError::Serialize(e) => write!(f, "Serialize error: {}", e),
        }
    }
}

impl std::error::Error for SceneSaveError {}
