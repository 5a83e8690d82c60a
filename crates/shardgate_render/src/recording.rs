//! Headless renderer that records what it was asked to draw
//!
//! Used by the headless runner and by tests. Target allocation is checked
//! against wgpu limits the same way a GPU-backed renderer would.

use std::collections::HashMap;

use shardgate_core::Worlds;
use shardgate_math::Vec3;

use crate::camera::PerspectiveCamera;
use crate::error::RenderError;
use crate::gpu::validate_descriptor;
use crate::renderer::{SceneRenderer, TargetDescriptor, TargetHandle, TextureHandle};

/// One recorded draw
#[derive(Clone, Debug, PartialEq)]
pub struct RenderRecord {
    /// Target bound at draw time, `None` for the screen
    pub target: Option<TargetHandle>,
    /// Names of the worlds visible at draw time
    pub visible: Vec<String>,
    pub camera_position: Vec3,
}

/// Renderer that allocates nothing and records draws
#[derive(Debug)]
pub struct RecordingRenderer {
    limits: wgpu::Limits,
    targets: HashMap<TargetHandle, TargetDescriptor>,
    next_id: u64,
    bound: Option<TargetHandle>,
    records: Vec<RenderRecord>,
    clears: u64,
    fail_renders: bool,
}

impl Default for RecordingRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingRenderer {
    /// Renderer with default wgpu limits
    pub fn new() -> Self {
        Self::with_limits(wgpu::Limits::default())
    }

    pub fn with_limits(limits: wgpu::Limits) -> Self {
        Self {
            limits,
            targets: HashMap::new(),
            next_id: 1,
            bound: None,
            records: Vec::new(),
            clears: 0,
            fail_renders: false,
        }
    }

    /// Renderer whose targets may not exceed `max` pixels on a side
    pub fn with_max_dimension(max: u32) -> Self {
        Self::with_limits(wgpu::Limits {
            max_texture_dimension_2d: max,
            ..wgpu::Limits::default()
        })
    }

    /// Make every subsequent `render` call fail
    pub fn set_fail_renders(&mut self, fail: bool) {
        self.fail_renders = fail;
    }

    pub fn records(&self) -> &[RenderRecord] {
        &self.records
    }

    /// Draws made into offscreen targets
    pub fn offscreen_records(&self) -> impl Iterator<Item = &RenderRecord> {
        self.records.iter().filter(|r| r.target.is_some())
    }

    pub fn clear_count(&self) -> u64 {
        self.clears
    }

    pub fn live_targets(&self) -> usize {
        self.targets.len()
    }

    pub fn target_descriptor(&self, target: TargetHandle) -> Option<&TargetDescriptor> {
        self.targets.get(&target)
    }
}

impl SceneRenderer for RecordingRenderer {
    fn create_target(&mut self, desc: &TargetDescriptor) -> Result<TargetHandle, RenderError> {
        validate_descriptor(desc, &self.limits)?;
        let handle = TargetHandle(self.next_id);
        self.next_id += 1;
        self.targets.insert(handle, *desc);
        Ok(handle)
    }

    fn destroy_target(&mut self, target: TargetHandle) {
        self.targets.remove(&target);
        if self.bound == Some(target) {
            self.bound = None;
        }
    }

    fn target_texture(&self, target: TargetHandle) -> Option<TextureHandle> {
        self.targets.contains_key(&target).then_some(TextureHandle(target.0))
    }

    fn render_target(&self) -> Option<TargetHandle> {
        self.bound
    }

    fn set_render_target(&mut self, target: Option<TargetHandle>) {
        self.bound = target;
    }

    fn clear(&mut self) -> Result<(), RenderError> {
        self.clears += 1;
        Ok(())
    }

    fn render(&mut self, worlds: &Worlds, camera: &PerspectiveCamera) -> Result<(), RenderError> {
        if self.fail_renders {
            return Err(RenderError::Other("recording renderer set to fail".to_string()));
        }
        let visible = worlds
            .iter()
            .filter(|(_, world)| world.is_visible())
            .map(|(_, world)| world.name.clone())
            .collect();
        self.records.push(RenderRecord {
            target: self.bound,
            visible,
            camera_position: camera.position,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::TargetFormat;
    use shardgate_core::World;

    #[test]
    fn test_records_visible_worlds() {
        let mut worlds = Worlds::new();
        worlds.insert(World::new("blue"));
        let red = worlds.insert(World::new("red"));
        worlds.set_visible(red, false);

        let mut renderer = RecordingRenderer::new();
        renderer.render(&worlds, &PerspectiveCamera::default()).unwrap();
        assert_eq!(renderer.records()[0].visible, vec!["blue".to_string()]);
        assert_eq!(renderer.records()[0].target, None);
    }

    #[test]
    fn test_target_lifecycle() {
        let mut renderer = RecordingRenderer::with_max_dimension(512);
        let desc = TargetDescriptor {
            width: 256,
            height: 256,
            format: TargetFormat::Rgba8,
            depth: false,
        };
        let handle = renderer.create_target(&desc).unwrap();
        assert!(renderer.target_texture(handle).is_some());
        renderer.set_render_target(Some(handle));
        renderer.destroy_target(handle);
        assert_eq!(renderer.render_target(), None);
        assert!(renderer.target_texture(handle).is_none());

        let too_big = TargetDescriptor { width: 1024, ..desc };
        assert!(renderer.create_target(&too_big).is_err());
    }
}
