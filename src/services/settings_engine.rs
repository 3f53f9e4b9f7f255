// Floatshell Settings Engine
// Loads, edits and persists ShellSettings as JSON at the platform config path.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::platform;
use crate::services::zoom_ledger::{MAX_DEFAULT_FACTOR, MIN_DEFAULT_FACTOR};
use crate::types::errors::SettingsError;
use crate::types::settings::ShellSettings;

/// Lowest window opacity the shell accepts.
pub const MIN_OPACITY: f64 = 0.2;

/// Trait defining the settings engine interface.
pub trait SettingsEngineTrait {
    fn load(&mut self) -> Result<ShellSettings, SettingsError>;
    fn save(&self) -> Result<(), SettingsError>;
    fn get_settings(&self) -> &ShellSettings;
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError>;
    fn reset(&mut self) -> Result<(), SettingsError>;
    fn get_config_path(&self) -> &Path;
}

/// Settings engine backed by a JSON file.
pub struct SettingsEngine {
    config_path: PathBuf,
    settings: ShellSettings,
}

impl SettingsEngine {
    /// Uses `path_override` if given, otherwise `<config dir>/settings.json`.
    pub fn new(path_override: Option<PathBuf>) -> Self {
        let config_path =
            path_override.unwrap_or_else(|| platform::get_config_dir().join("settings.json"));
        Self {
            config_path,
            settings: ShellSettings::default(),
        }
    }
}

/// Rejects values that deserialize fine but make no sense for the shell.
pub fn validate(settings: &ShellSettings) -> Result<(), SettingsError> {
    let min_zoom = (MIN_DEFAULT_FACTOR * 100.0).round() as u32;
    let max_zoom = (MAX_DEFAULT_FACTOR * 100.0).round() as u32;
    if !(min_zoom..=max_zoom).contains(&settings.zoom.default_zoom_percent) {
        return Err(SettingsError::InvalidValue(format!(
            "zoom.default_zoom_percent must be within {}..={}",
            min_zoom, max_zoom
        )));
    }
    if !(MIN_OPACITY..=1.0).contains(&settings.window.opacity) {
        return Err(SettingsError::InvalidValue(format!(
            "window.opacity must be within {}..=1.0",
            MIN_OPACITY
        )));
    }
    if settings.window.width == 0 || settings.window.height == 0 {
        return Err(SettingsError::InvalidValue("window size must be non-zero".to_string()));
    }
    Ok(())
}

impl SettingsEngineTrait for SettingsEngine {
    /// Missing file means defaults. A malformed or out-of-range file is an error.
    fn load(&mut self) -> Result<ShellSettings, SettingsError> {
        if !self.config_path.exists() {
            debug!("No settings at {}; using defaults", self.config_path.display());
            self.settings = ShellSettings::default();
            return Ok(self.settings.clone());
        }

        let content = fs::read_to_string(&self.config_path)
            .map_err(|e| SettingsError::IoError(format!("Failed to read config file: {}", e)))?;
        let settings: ShellSettings = serde_json::from_str(&content).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to parse config file: {}", e))
        })?;
        validate(&settings)?;

        info!("Loaded settings from {}", self.config_path.display());
        self.settings = settings;
        Ok(self.settings.clone())
    }

    fn save(&self) -> Result<(), SettingsError> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SettingsError::IoError(format!("Failed to create config directory: {}", e))
            })?;
        }
        let json = serde_json::to_string_pretty(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;
        fs::write(&self.config_path, json)
            .map_err(|e| SettingsError::IoError(format!("Failed to write config file: {}", e)))
    }

    fn get_settings(&self) -> &ShellSettings {
        &self.settings
    }

    /// Updates one setting by dot-notation path (`"zoom.default_zoom_percent"`) and saves.
    ///
    /// The whole settings tree is re-deserialized and validated, so a wrong type or an
    /// out-of-range value leaves the current settings untouched.
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError> {
        if key.is_empty() {
            return Err(SettingsError::InvalidKey("Key cannot be empty".to_string()));
        }

        let mut tree = serde_json::to_value(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;

        let (parents, leaf) = match key.rsplit_once('.') {
            Some((parents, leaf)) => (parents.split('.').collect::<Vec<_>>(), leaf),
            None => (Vec::new(), key),
        };
        let mut node = &mut tree;
        for part in parents {
            node = node
                .get_mut(part)
                .ok_or_else(|| SettingsError::InvalidKey(format!("Key '{}' not found in settings", key)))?;
        }
        let map = node.as_object_mut().ok_or_else(|| {
            SettingsError::InvalidKey(format!("Key '{}' does not name a settings section", key))
        })?;
        // Shortcut bindings may be added; everything else must already exist.
        if !map.contains_key(leaf) && !key.starts_with("shortcuts.") {
            return Err(SettingsError::InvalidKey(format!("Key '{}' not found in settings", key)));
        }
        map.insert(leaf.to_string(), value);

        let updated: ShellSettings = serde_json::from_value(tree).map_err(|e| {
            SettingsError::InvalidValue(format!("Invalid value for key '{}': {}", key, e))
        })?;
        validate(&updated)?;

        debug!("Setting {} updated", key);
        self.settings = updated;
        self.save()
    }

    fn reset(&mut self) -> Result<(), SettingsError> {
        self.settings = ShellSettings::default();
        self.save()
    }

    fn get_config_path(&self) -> &Path {
        &self.config_path
    }
}
