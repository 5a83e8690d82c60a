//! Shardgate - a see-through portal between two resident worlds
//!
//! The binary and integration tests share these modules:
//! - [`config`] - Layered TOML/env configuration
//! - [`app`] - Application state and input handling
//! - [`systems`] - Per-frame simulation and portal systems
//! - [`scene`] - Built-in stage construction
//! - [`input`] - Raw input to semantic actions

pub mod app;
pub mod config;
pub mod input;
pub mod scene;
pub mod systems;
