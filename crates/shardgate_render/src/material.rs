//! Portal surface material
//!
//! The portal quad samples the captured texture and adds a small amount of
//! surface effect on top: a fresnel rim and a screen-blended scratch overlay.
//! [`compose`] turns material parameters and per-frame state into the uniform
//! block the shader reads; [`shade`] is the same shading evaluated on the CPU.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};
use shardgate_core::ResourceKey;
use shardgate_math::{Vec3, Vec4};

/// Grey the surface effects start from
pub const BASE_GREY: f32 = 0.2;
/// Share of the effect color added to the captured color
pub const EFFECT_WEIGHT: f32 = 0.3;
/// Largest finite half-float value
pub const HALF_FLOAT_MAX: f32 = 65504.0;
/// Rec. 601 luma weights
pub const LUMINANCE: Vec3 = Vec3::new(0.299, 0.587, 0.114);

/// Fresnel rim settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FresnelConfig {
    pub enabled: bool,
    pub power: f32,
    pub intensity: f32,
    /// `#rrggbb` sRGB color
    pub color: String,
}

impl Default for FresnelConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            power: 2.5,
            intensity: 0.45,
            color: "#7b5ca3".to_string(),
        }
    }
}

/// Parse a `#rrggbb` color into sRGB components in 0..1
pub fn parse_hex_color(hex: &str) -> Option<[f32; 3]> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok().map(|v| v as f32 / 255.0);
    Some([channel(0)?, channel(2)?, channel(4)?])
}

/// sRGB transfer function to linear
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Static portal material parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalMaterialParams {
    pub fresnel: FresnelConfig,
    /// Weight of the scratch overlay; 0 disables it
    pub scratch_blend: f32,
}

impl Default for PortalMaterialParams {
    fn default() -> Self {
        Self {
            fresnel: FresnelConfig::default(),
            scratch_blend: 0.3,
        }
    }
}

impl PortalMaterialParams {
    /// Registry key shared by every portal using these parameters
    pub fn key(&self) -> Result<ResourceKey, ron::Error> {
        ResourceKey::of_config(self)
    }

    /// Linear fresnel color; unparsable colors fall back to the default
    pub fn fresnel_color(&self) -> [f32; 3] {
        let srgb = parse_hex_color(&self.fresnel.color).unwrap_or_else(|| {
            log::warn!("Invalid fresnel color '{}', using default", self.fresnel.color);
            [123.0 / 255.0, 92.0 / 255.0, 163.0 / 255.0]
        });
        srgb.map(srgb_to_linear)
    }
}

/// Per-frame material inputs
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PortalFrameInput {
    pub camera_position: Vec3,
    /// 0 at the flight start, 1 at the portal plane
    pub transition_ratio: f32,
    pub time: f32,
}

/// Uniform block for the portal surface shader
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct PortalUniforms {
    pub camera_position: [f32; 3],
    pub fresnel_power: f32,
    pub fresnel_color: [f32; 3],
    pub fresnel_intensity: f32,
    pub scratch_blend: f32,
    pub transition_ratio: f32,
    pub time: f32,
    pub _padding: f32,
}

/// Build this frame's uniforms
pub fn compose(params: &PortalMaterialParams, input: &PortalFrameInput) -> PortalUniforms {
    let fresnel = &params.fresnel;
    let intensity = if fresnel.enabled { fresnel.intensity.max(0.0) } else { 0.0 };
    let ratio = if input.transition_ratio.is_finite() {
        input.transition_ratio.clamp(0.0, 1.0)
    } else {
        0.0
    };
    PortalUniforms {
        camera_position: input.camera_position.to_array(),
        fresnel_power: fresnel.power,
        fresnel_color: params.fresnel_color(),
        fresnel_intensity: intensity,
        scratch_blend: params.scratch_blend.clamp(0.0, 1.0),
        transition_ratio: ratio,
        time: input.time,
        _padding: 0.0,
    }
}

/// Screen blend of `base` with `blend`
fn blend_screen(base: Vec3, blend: Vec3) -> Vec3 {
    Vec3::ONE - (Vec3::ONE - base) * (Vec3::ONE - blend)
}

/// CPU evaluation of the portal surface color at one fragment
///
/// `scratch` is the overlay texel (white when no overlay is bound).
pub fn shade(
    uniforms: &PortalUniforms,
    captured: Vec4,
    scratch: Vec3,
    world_position: Vec3,
    normal: Vec3,
) -> Vec4 {
    let view = (Vec3::from(uniforms.camera_position) - world_position).normalize_or_zero();
    let normal = normal.normalize_or_zero();
    let fresnel = (1.0 - view.dot(normal).max(0.0)).powf(uniforms.fresnel_power);
    let mut color = Vec3::splat(BASE_GREY)
        + Vec3::from(uniforms.fresnel_color) * fresnel * uniforms.fresnel_intensity;

    if uniforms.scratch_blend > 0.0 {
        let gray = Vec3::splat(scratch.dot(LUMINANCE));
        color = color.lerp(blend_screen(color, gray), uniforms.scratch_blend);
    }

    let color = color.clamp(Vec3::ZERO, Vec3::splat(HALF_FLOAT_MAX));
    (captured.truncate() + color * EFFECT_WEIGHT).extend(captured.w)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_uniforms_size() {
        assert_eq!(std::mem::size_of::<PortalUniforms>(), 48);
        assert_eq!(std::mem::size_of::<PortalUniforms>() % 16, 0);
    }

    #[test]
    fn test_parse_hex_color() {
        let [r, g, b] = parse_hex_color("#7b5ca3").unwrap();
        assert!((r - 123.0 / 255.0).abs() < EPSILON);
        assert!((g - 92.0 / 255.0).abs() < EPSILON);
        assert!((b - 163.0 / 255.0).abs() < EPSILON);
        assert!(parse_hex_color("ffffff").is_some());
        assert!(parse_hex_color("#fff").is_none());
        assert!(parse_hex_color("#gg0000").is_none());
    }

    #[test]
    fn test_compose_defaults() {
        let params = PortalMaterialParams::default();
        let u = compose(
            &params,
            &PortalFrameInput {
                camera_position: Vec3::new(0.0, 0.0, 5.0),
                transition_ratio: 0.25,
                time: 1.0,
            },
        );
        assert_eq!(u.fresnel_power, 2.5);
        assert_eq!(u.fresnel_intensity, 0.45);
        assert_eq!(u.scratch_blend, 0.3);
        assert_eq!(u.transition_ratio, 0.25);
        assert_eq!(u.camera_position, [0.0, 0.0, 5.0]);
        assert!(u.fresnel_color.iter().all(|c| *c > 0.0 && *c < 1.0));
    }

    #[test]
    fn test_compose_sanitizes_ratio_and_disabled_fresnel() {
        let mut params = PortalMaterialParams::default();
        params.fresnel.enabled = false;
        let mut input = PortalFrameInput {
            transition_ratio: f32::NAN,
            ..Default::default()
        };
        assert_eq!(compose(&params, &input).transition_ratio, 0.0);
        assert_eq!(compose(&params, &input).fresnel_intensity, 0.0);
        input.transition_ratio = 3.0;
        assert_eq!(compose(&params, &input).transition_ratio, 1.0);
    }

    #[test]
    fn test_shade_head_on_without_scratch() {
        let mut params = PortalMaterialParams::default();
        params.scratch_blend = 0.0;
        let u = compose(
            &params,
            &PortalFrameInput {
                camera_position: Vec3::new(0.0, 0.0, 5.0),
                ..Default::default()
            },
        );
        // Facing the camera: no fresnel, only the base grey
        let out = shade(&u, Vec4::new(0.5, 0.25, 0.0, 0.75), Vec3::ONE, Vec3::ZERO, Vec3::Z);
        assert!((out.x - (0.5 + 0.2 * 0.3)).abs() < EPSILON);
        assert!((out.y - (0.25 + 0.2 * 0.3)).abs() < EPSILON);
        assert!((out.z - 0.06).abs() < EPSILON);
        assert_eq!(out.w, 0.75);
    }

    #[test]
    fn test_shade_grazing_adds_fresnel() {
        let u = compose(
            &PortalMaterialParams::default(),
            &PortalFrameInput {
                camera_position: Vec3::new(5.0, 0.0, 0.0),
                ..Default::default()
            },
        );
        let head_on = compose(
            &PortalMaterialParams::default(),
            &PortalFrameInput {
                camera_position: Vec3::new(0.0, 0.0, 5.0),
                ..Default::default()
            },
        );
        let captured = Vec4::new(0.0, 0.0, 0.0, 1.0);
        let grazing = shade(&u, captured, Vec3::ZERO, Vec3::ZERO, Vec3::Z);
        let front = shade(&head_on, captured, Vec3::ZERO, Vec3::ZERO, Vec3::Z);
        assert!(grazing.z > front.z);
    }

    #[test]
    fn test_scratch_screen_blend() {
        let mut params = PortalMaterialParams::default();
        params.fresnel.enabled = false;
        params.scratch_blend = 1.0;
        let u = compose(
            &params,
            &PortalFrameInput {
                camera_position: Vec3::new(0.0, 0.0, 5.0),
                ..Default::default()
            },
        );
        let captured = Vec4::ZERO;
        // White scratch screens to white
        let white = shade(&u, captured, Vec3::ONE, Vec3::ZERO, Vec3::Z);
        assert!((white.x - EFFECT_WEIGHT).abs() < EPSILON);
        // Black scratch leaves the base grey
        let black = shade(&u, captured, Vec3::ZERO, Vec3::ZERO, Vec3::Z);
        assert!((black.x - BASE_GREY * EFFECT_WEIGHT).abs() < EPSILON);
    }

    #[test]
    fn test_effects_clamped() {
        let mut params = PortalMaterialParams::default();
        params.fresnel.intensity = 1.0e9;
        params.scratch_blend = 0.0;
        let u = compose(
            &params,
            &PortalFrameInput {
                camera_position: Vec3::new(5.0, 0.0, 0.0),
                ..Default::default()
            },
        );
        let out = shade(&u, Vec4::ZERO, Vec3::ZERO, Vec3::ZERO, Vec3::Z);
        assert!(out.x <= HALF_FLOAT_MAX * EFFECT_WEIGHT + 1.0);
        assert!(out.is_finite());
    }

    #[test]
    fn test_same_params_share_key() {
        let a = PortalMaterialParams::default();
        let mut b = PortalMaterialParams::default();
        assert_eq!(a.key().unwrap(), b.key().unwrap());
        b.scratch_blend = 0.5;
        assert_ne!(a.key().unwrap(), b.key().unwrap());
    }
}
