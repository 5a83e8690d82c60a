//! Scene construction utilities
//!
//! This module provides a declarative API for building portal stages.

mod scene_builder;

pub use scene_builder::{default_stage, SceneBuilder};
