//! Integration tests for configuration loading
//!
//! Tests that verify config loading from files and environment variables.

use shardgate::config::{AppConfig, FlightModeKind};
use serial_test::serial;

#[test]
#[serial]
fn test_env_override() {
    std::env::set_var("SG_PORTAL__QUALITY_MULTIPLIER", "2.0");
    let config = AppConfig::load().unwrap();
    std::env::remove_var("SG_PORTAL__QUALITY_MULTIPLIER");
    assert_eq!(config.portal.quality_multiplier, 2.0);
}

#[test]
#[serial]
fn test_env_override_enum() {
    std::env::set_var("SG_FLIGHT__MODE", "click_tween");
    let config = AppConfig::load().unwrap();
    std::env::remove_var("SG_FLIGHT__MODE");
    assert_eq!(config.flight.mode, FlightModeKind::ClickTween);
}

#[test]
#[serial]
fn test_default_file_matches_defaults() {
    let config = AppConfig::load_from("config").unwrap();
    let defaults = AppConfig::default();
    assert_eq!(config.viewport, defaults.viewport);
    assert_eq!(config.camera, defaults.camera);
    assert_eq!(config.portal, defaults.portal);
    assert_eq!(config.material, defaults.material);
    assert_eq!(config.transition, defaults.transition);
    assert_eq!(config.particles, defaults.particles);
    assert_eq!(config.flight.mode, defaults.flight.mode);
    assert_eq!(config.flight.speed, defaults.flight.speed);
}

#[test]
#[serial]
fn test_missing_directory_uses_defaults() {
    let config = AppConfig::load_from("/nonexistent/shardgate-config").unwrap();
    assert_eq!(config.viewport.size(), (1280, 720));
}

#[test]
#[serial]
fn test_invalid_value_is_an_error() {
    std::env::set_var("SG_VIEWPORT__WIDTH", "wide");
    let result = AppConfig::load_from("/nonexistent/shardgate-config");
    std::env::remove_var("SG_VIEWPORT__WIDTH");
    let err = result.unwrap_err();
    assert!(err.to_string().starts_with("Configuration error"));
}
