use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Top-level shell settings container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShellSettings {
    pub general: GeneralSettings,
    pub window: WindowSettings,
    pub appearance: AppearanceSettings,
    pub zoom: ZoomSettings,
    #[serde(default)]
    pub timing: TimingSettings,
    pub shortcuts: HashMap<String, String>,
}

impl Default for ShellSettings {
    fn default() -> Self {
        Self {
            general: GeneralSettings::default(),
            window: WindowSettings::default(),
            appearance: AppearanceSettings::default(),
            zoom: ZoomSettings::default(),
            timing: TimingSettings::default(),
            shortcuts: Self::default_shortcuts(),
        }
    }
}

impl ShellSettings {
    /// Returns the default keyboard shortcuts.
    pub fn default_shortcuts() -> HashMap<String, String> {
        let mut shortcuts = HashMap::new();
        shortcuts.insert("new_tab".to_string(), "Ctrl+T".to_string());
        shortcuts.insert("close_tab".to_string(), "Ctrl+W".to_string());
        shortcuts.insert("reload".to_string(), "Ctrl+R".to_string());
        shortcuts.insert("back".to_string(), "Alt+Left".to_string());
        shortcuts.insert("forward".to_string(), "Alt+Right".to_string());
        shortcuts.insert("search".to_string(), "Ctrl+F".to_string());
        shortcuts.insert("settings".to_string(), "Ctrl+Comma".to_string());
        shortcuts.insert("zoom_in".to_string(), "Ctrl+Plus".to_string());
        shortcuts.insert("zoom_out".to_string(), "Ctrl+Minus".to_string());
        shortcuts.insert("zoom_reset".to_string(), "Ctrl+0".to_string());
        shortcuts.insert("toggle_navbar".to_string(), "Ctrl+Shift+L".to_string());
        shortcuts.insert("toggle_detached".to_string(), "Ctrl+Shift+D".to_string());
        shortcuts.insert("fullscreen".to_string(), "F11".to_string());
        shortcuts.insert("next_tab".to_string(), "Ctrl+Tab".to_string());
        shortcuts.insert("prev_tab".to_string(), "Ctrl+Shift+Tab".to_string());
        shortcuts.insert("close_overlay".to_string(), "Escape".to_string());
        shortcuts
    }
}

/// General shell settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralSettings {
    /// Loaded when a tab is created with a blank url.
    pub landing_url: String,
    pub restore_session: bool,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            landing_url: "https://duckduckgo.com".to_string(),
            restore_session: true,
        }
    }
}

/// Floating window settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WindowSettings {
    pub width: u32,
    pub height: u32,
    pub always_on_top: bool,
    /// Window opacity in [0.2, 1.0].
    pub opacity: f64,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 800,
            always_on_top: true,
            opacity: 1.0,
        }
    }
}

/// Appearance and visual settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppearanceSettings {
    pub theme: ThemeMode,
    pub accent_color: String,
}

impl Default for AppearanceSettings {
    fn default() -> Self {
        Self {
            theme: ThemeMode::System,
            accent_color: "#2f81f7".to_string(),
        }
    }
}

/// Theme mode selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ThemeMode {
    Dark,
    Light,
    System,
}

/// Zoom settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ZoomSettings {
    /// Process-wide default zoom, in percent [50, 200].
    pub default_zoom_percent: u32,
}

impl Default for ZoomSettings {
    fn default() -> Self {
        Self { default_zoom_percent: 100 }
    }
}

/// Timer tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimingSettings {
    pub update_coalesce_ms: u64,
    pub close_timeout_ms: u64,
    pub session_save_debounce_ms: u64,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            update_coalesce_ms: 50,
            close_timeout_ms: 2000,
            session_save_debounce_ms: 1000,
        }
    }
}
