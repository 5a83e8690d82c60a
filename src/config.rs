//! Application configuration
//!
//! Configuration is loaded from multiple sources with the following priority (lowest to highest):
//! 1. `config/default.toml` (version controlled)
//! 2. `config/user.toml` (gitignored, user overrides)
//! 3. Environment variables (`SG_SECTION__KEY`)

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

use shardgate_input::{FlightMode, FlightSettings};
use shardgate_math::{easing::rate_from_frame_factor, FitOrientation, Vec3};
use shardgate_render::{CaptureSettings, FresnelConfig, PerspectiveCamera, PortalMaterialParams, TargetFormat};

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub viewport: ViewportConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub portal: PortalConfig,
    #[serde(default)]
    pub flight: FlightConfig,
    #[serde(default)]
    pub material: MaterialConfig,
    #[serde(default)]
    pub transition: TransitionConfig,
    #[serde(default)]
    pub particles: ParticlesConfig,
    /// Headless runner settings
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub debug: DebugConfig,
}

impl AppConfig {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. `config/default.toml`
    /// 2. `config/user.toml`
    /// 3. Environment variables (`SG_*`)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific config directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let default_path = config_dir.join("default.toml");
        let user_path = config_dir.join("user.toml");

        let mut figment = Figment::new();

        if default_path.exists() {
            figment = figment.merge(Toml::file(&default_path));
        }

        if user_path.exists() {
            figment = figment.merge(Toml::file(&user_path));
        }

        // SG_PORTAL__QUALITY_MULTIPLIER=2.0 -> portal.quality_multiplier = 2.0
        figment = figment.merge(Env::prefixed("SG_").split("__"));

        figment.extract().map_err(ConfigError::from)
    }

    /// Load, falling back to defaults on any error
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            log::warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }
}

/// Viewport size in pixels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

impl ViewportConfig {
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Camera configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Starting position [x, y, z]
    pub start_position: [f32; 3],
    /// Field of view in degrees
    pub fov: f32,
    /// Near clipping plane
    pub near: f32,
    /// Far clipping plane
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            start_position: [0.0, 0.0, 5.0],
            fov: 45.0,
            near: 0.1,
            far: 60.0,
        }
    }
}

impl CameraConfig {
    /// Main camera for a viewport
    pub fn to_camera(&self, viewport: &ViewportConfig) -> PerspectiveCamera {
        let aspect = if viewport.height == 0 {
            1.0
        } else {
            viewport.width as f32 / viewport.height as f32
        };
        let mut camera = PerspectiveCamera::new(self.fov, aspect, self.near, self.far);
        camera.position = Vec3::from(self.start_position);
        camera
    }
}

/// Portal capture configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// Offscreen target size relative to the viewport
    pub quality_multiplier: f32,
    /// Half-float offscreen target (otherwise 8-bit)
    pub hdr: bool,
    /// Attach a depth buffer to the offscreen target
    pub depth: bool,
    pub fit_orientation: FitOrientation,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            quality_multiplier: 1.5,
            hdr: true,
            depth: true,
            fit_orientation: FitOrientation::AlignToPortal,
        }
    }
}

impl PortalConfig {
    pub fn capture_settings(&self) -> CaptureSettings {
        CaptureSettings {
            quality_multiplier: self.quality_multiplier,
            format: if self.hdr {
                TargetFormat::HalfFloat
            } else {
                TargetFormat::Rgba8
            },
            depth: self.depth,
        }
    }
}

/// Camera flight mode selector
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlightModeKind {
    #[default]
    Autopilot,
    Scroll,
    ClickTween,
}

/// Camera flight configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightConfig {
    pub mode: FlightModeKind,
    /// Autopilot speed in units per second
    pub speed: f32,
    /// Units per wheel notch
    pub scroll_step: f32,
    /// Scroll smoothing rate per second
    pub smoothing_rate: f32,
    /// Click tween duration in seconds, each way
    pub tween_duration: f32,
    pub arrival_epsilon: f32,
    /// Point the camera looks at during click tweens
    pub look_at: [f32; 3],
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            mode: FlightModeKind::Autopilot,
            speed: 2.0,
            scroll_step: 0.5,
            // 0.1 per frame at 60 fps
            smoothing_rate: rate_from_frame_factor(0.1, 60.0),
            tween_duration: 1.5,
            arrival_epsilon: 1e-3,
            look_at: [0.0, 0.0, -5.0],
        }
    }
}

impl FlightConfig {
    pub fn flight_mode(&self) -> FlightMode {
        match self.mode {
            FlightModeKind::Autopilot => FlightMode::Autopilot { speed: self.speed },
            FlightModeKind::Scroll => FlightMode::Scroll {
                step: self.scroll_step,
                rate: self.smoothing_rate,
            },
            FlightModeKind::ClickTween => FlightMode::ClickTween {
                duration: self.tween_duration,
            },
        }
    }

    /// Flight settings toward a portal plane at depth `portal_z`
    pub fn to_settings(&self, camera: &CameraConfig, portal_z: f32) -> FlightSettings {
        FlightSettings {
            mode: self.flight_mode(),
            start: Vec3::from(camera.start_position),
            portal_z,
            look_at: Vec3::from(self.look_at),
            arrival_epsilon: self.arrival_epsilon,
        }
    }
}

/// Portal surface material configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialConfig {
    pub fresnel_enabled: bool,
    pub fresnel_power: f32,
    pub fresnel_intensity: f32,
    /// `#rrggbb`
    pub fresnel_color: String,
    pub scratch_blend: f32,
}

impl Default for MaterialConfig {
    fn default() -> Self {
        let params = PortalMaterialParams::default();
        Self {
            fresnel_enabled: params.fresnel.enabled,
            fresnel_power: params.fresnel.power,
            fresnel_intensity: params.fresnel.intensity,
            fresnel_color: params.fresnel.color,
            scratch_blend: params.scratch_blend,
        }
    }
}

impl MaterialConfig {
    pub fn to_params(&self) -> PortalMaterialParams {
        PortalMaterialParams {
            fresnel: FresnelConfig {
                enabled: self.fresnel_enabled,
                power: self.fresnel_power,
                intensity: self.fresnel_intensity,
                color: self.fresnel_color.clone(),
            },
            scratch_blend: self.scratch_blend,
        }
    }
}

/// World switch configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    /// Number of stages the toggle cycles through
    pub max_stage: u8,
    /// Show the other world directly while a transition runs
    pub show_other_during_blend: bool,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            max_stage: 4,
            show_other_during_blend: false,
        }
    }
}

/// Particle configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticlesConfig {
    /// Particles per emitter
    pub count: usize,
    /// Shards placed around each world
    pub shards: usize,
    pub seed: u64,
    /// Explosion animation length in seconds
    pub animation_duration: f32,
}

impl Default for ParticlesConfig {
    fn default() -> Self {
        Self {
            count: 64,
            shards: 12,
            seed: 7,
            animation_duration: 10.0,
        }
    }
}

/// Headless runner configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Frames to simulate
    pub frames: u32,
    /// Fixed frame delta in seconds
    pub fixed_delta: f32,
    /// Largest delta a single frame may advance
    pub max_delta: f32,
    /// Optional RON scene template; the built-in stage is used when empty
    pub scene: Option<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            frames: 600,
            fixed_delta: 1.0 / 60.0,
            max_delta: 0.1,
            scene: None,
        }
    }
}

/// Debug configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Configuration error
#[derive(Debug)]
pub struct ConfigError {
    message: String,
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError {
            message: e.to_string(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Configuration error: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}
