//! Portal rendering
//!
//! This crate renders the other world into an offscreen target and prepares
//! the portal surface material:
//!
//! - [`PerspectiveCamera`] - Main and portal camera
//! - [`FrustumFitter`] - Off-axis projection fitted to the portal corners
//! - [`RenderTarget`] - Offscreen target sized to the viewport
//! - [`OffscreenCapture`] - The hidden pass with visibility swap and restore
//! - [`material`] - Portal surface uniforms and CPU shading
//! - [`SceneRenderer`] - The external renderer seam
//! - [`RecordingRenderer`] - Headless renderer that records draws

pub mod camera;
pub mod capture;
pub mod error;
pub mod fitter;
pub mod gpu;
pub mod material;
pub mod recording;
pub mod renderer;
pub mod target;

pub use camera::PerspectiveCamera;
pub use capture::{CaptureSettings, Captured, OffscreenCapture};
pub use error::RenderError;
pub use fitter::{FitStatus, FrustumFitter};
pub use material::{compose, shade, FresnelConfig, PortalFrameInput, PortalMaterialParams, PortalUniforms};
pub use recording::{RecordingRenderer, RenderRecord};
pub use renderer::{SceneRenderer, TargetDescriptor, TargetHandle, TextureHandle};
pub use target::{RenderTarget, ResizeOutcome, TargetFormat};
