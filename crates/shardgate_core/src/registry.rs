//! Shared resource registry
//!
//! Material instances (portal materials, particle materials) are shared
//! between every object created from the same configuration. The registry is
//! owned by the stage that creates them and cleared when that stage is torn
//! down.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::Serialize;

/// 64-bit hash of a resource configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey(pub u64);

impl ResourceKey {
    /// Hash any hashable configuration
    pub fn of<T: Hash + ?Sized>(config: &T) -> Self {
        let mut hasher = DefaultHasher::new();
        config.hash(&mut hasher);
        ResourceKey(hasher.finish())
    }

    /// Hash a serializable configuration through its RON text
    ///
    /// Works for configs holding floats, which are not `Hash`.
    pub fn of_config<T: Serialize + ?Sized>(config: &T) -> Result<Self, ron::Error> {
        let text = ron::to_string(config)?;
        Ok(Self::of(text.as_str()))
    }
}

/// Registry of shared resources keyed by configuration hash
pub struct ResourceRegistry<T> {
    entries: HashMap<ResourceKey, Arc<T>>,
    created: u64,
}

impl<T> Default for ResourceRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ResourceRegistry<T> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            created: 0,
        }
    }

    /// Return the resource for `key`, creating it on first request
    pub fn get_or_create<F>(&mut self, key: ResourceKey, create: F) -> Arc<T>
    where
        F: FnOnce() -> T,
    {
        if let Some(existing) = self.entries.get(&key) {
            return Arc::clone(existing);
        }
        self.created += 1;
        let resource = Arc::new(create());
        self.entries.insert(key, Arc::clone(&resource));
        resource
    }

    /// Fallible variant of [`get_or_create`](Self::get_or_create)
    pub fn try_get_or_create<F, E>(&mut self, key: ResourceKey, create: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        if let Some(existing) = self.entries.get(&key) {
            return Ok(Arc::clone(existing));
        }
        let resource = Arc::new(create()?);
        self.created += 1;
        self.entries.insert(key, Arc::clone(&resource));
        Ok(resource)
    }

    pub fn get(&self, key: ResourceKey) -> Option<Arc<T>> {
        self.entries.get(&key).cloned()
    }

    pub fn contains(&self, key: ResourceKey) -> bool {
        self.entries.contains_key(&key)
    }

    /// Number of distinct resources held
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// How many resources were ever created (cache misses)
    pub fn created_count(&self) -> u64 {
        self.created
    }

    /// Release every resource; outstanding `Arc`s stay valid
    pub fn clear(&mut self) {
        if !self.entries.is_empty() {
            log::debug!("Releasing {} shared resources", self.entries.len());
        }
        self.entries.clear();
    }
}
