//! Integration-level unit tests for the SettingsEngine public API.
//!
//! These tests go through the trait interface and check default loading,
//! persistence across engine instances, validation and reset.

use floatshell::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use floatshell::types::errors::SettingsError;
use floatshell::types::settings::ShellSettings;
use tempfile::TempDir;

/// Builds an engine backed by a temp directory the caller keeps alive.
fn engine_in_temp(dir: &TempDir) -> SettingsEngine {
    SettingsEngine::new(Some(dir.path().join("settings.json")))
}

/// Without a config file, `load()` returns the built-in defaults.
#[test]
fn test_load_defaults_when_no_config_file_exists() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);

    let settings = engine.load().unwrap();

    assert_eq!(
        settings,
        ShellSettings::default(),
        "Loading without a config file must return default settings"
    );
    assert!(settings.window.always_on_top);
    assert_eq!(settings.general.landing_url, "https://duckduckgo.com");
}

/// A change made through `set_value` is visible to a fresh engine on the same file.
#[test]
fn test_set_value_persists_changes() {
    let dir = TempDir::new().unwrap();

    {
        let mut engine = engine_in_temp(&dir);
        engine.load().unwrap();
        engine
            .set_value("window.opacity", serde_json::json!(0.8))
            .unwrap();
        engine
            .set_value("timing.close_timeout_ms", serde_json::json!(500))
            .unwrap();
    }

    {
        let mut engine2 = engine_in_temp(&dir);
        let loaded = engine2.load().unwrap();
        assert_eq!(loaded.window.opacity, 0.8);
        assert_eq!(loaded.timing.close_timeout_ms, 500);
    }
}

/// A value of the wrong type leaves the current settings untouched.
#[test]
fn test_wrong_type_is_rejected() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);
    engine.load().unwrap();

    let result = engine.set_value("window.always_on_top", serde_json::json!("yes"));

    assert!(matches!(result, Err(SettingsError::InvalidValue(_))));
    assert!(engine.get_settings().window.always_on_top);
}

#[test]
fn test_opacity_below_floor_is_rejected() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);
    engine.load().unwrap();

    assert!(engine.set_value("window.opacity", serde_json::json!(0.05)).is_err());
    assert!(engine.set_value("window.width", serde_json::json!(0)).is_err());
    assert_eq!(*engine.get_settings(), ShellSettings::default());
}

/// Settings written by hand with an out-of-range zoom fail to load.
#[test]
fn test_out_of_range_file_fails_to_load() {
    let dir = TempDir::new().unwrap();
    let mut settings = ShellSettings::default();
    settings.zoom.default_zoom_percent = 10;
    std::fs::write(
        dir.path().join("settings.json"),
        serde_json::to_string(&settings).unwrap(),
    )
    .unwrap();

    let mut engine = engine_in_temp(&dir);

    assert!(matches!(engine.load(), Err(SettingsError::InvalidValue(_))));
}

/// `reset()` reverts every value and persists the defaults.
#[test]
fn test_reset_restores_defaults() {
    let dir = TempDir::new().unwrap();

    {
        let mut engine = engine_in_temp(&dir);
        engine.load().unwrap();
        engine
            .set_value("general.restore_session", serde_json::json!(false))
            .unwrap();
        engine
            .set_value("zoom.default_zoom_percent", serde_json::json!(150))
            .unwrap();
        assert!(!engine.get_settings().general.restore_session);

        engine.reset().unwrap();

        assert_eq!(
            *engine.get_settings(),
            ShellSettings::default(),
            "In-memory settings must equal defaults after reset"
        );
    }

    {
        let mut engine2 = engine_in_temp(&dir);
        assert_eq!(engine2.load().unwrap(), ShellSettings::default());
    }
}

/// Saving creates missing parent directories.
#[test]
fn test_save_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("deeper").join("settings.json");
    let engine = SettingsEngine::new(Some(path.clone()));

    engine.save().unwrap();

    assert!(path.exists());
    assert_eq!(engine.get_config_path(), path.as_path());
}
