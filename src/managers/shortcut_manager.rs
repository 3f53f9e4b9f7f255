// Floatshell Shortcut Manager
// Keyboard bindings from the `shortcuts` settings section, with conflict detection,
// Ctrl to Cmd adaptation on macOS, and resolution of a pressed chord to a `Command`.

use std::collections::HashMap;

use log::{debug, warn};

use crate::types::command::Command;
use crate::types::errors::ShortcutError;
use crate::types::layout::OverlayMode;
use crate::types::settings::ShellSettings;

/// Trait defining shortcut management operations.
pub trait ShortcutManagerTrait {
    fn register_shortcut(&mut self, action: &str, keys: &str) -> Result<(), ShortcutError>;
    fn unregister_shortcut(&mut self, action: &str) -> Result<(), ShortcutError>;
    fn get_shortcut(&self, action: &str) -> Option<&str>;
    fn list_shortcuts(&self) -> &HashMap<String, String>;
    fn reset_to_defaults(&mut self);
    fn has_conflict(&self, keys: &str, exclude_action: Option<&str>) -> Option<String>;
    fn resolve(&self, keys: &str) -> Option<Command>;
}

/// Command bound to a named shortcut action.
pub fn command_for_action(action: &str) -> Option<Command> {
    let command = match action {
        "new_tab" => Command::CreateTab { url: None },
        "close_tab" => Command::CloseActiveTab,
        "next_tab" => Command::NextTab,
        "prev_tab" => Command::PrevTab,
        "reload" => Command::Reload { id: None },
        "back" => Command::Back { id: None },
        "forward" => Command::Forward { id: None },
        "search" => Command::SetOverlayMode { mode: OverlayMode::Search },
        "settings" => Command::SetOverlayMode { mode: OverlayMode::Settings },
        "close_overlay" => Command::SetOverlayMode { mode: OverlayMode::None },
        "zoom_in" => Command::ZoomIn,
        "zoom_out" => Command::ZoomOut,
        "zoom_reset" => Command::ZoomReset,
        "toggle_navbar" => Command::ToggleNavBar,
        "toggle_detached" => Command::ToggleDetachedMode,
        "fullscreen" => Command::ToggleFullscreen,
        _ => return None,
    };
    Some(command)
}

/// Canonical chord spelling: modifiers in a fixed order, then the key.
///
/// `"shift+ctrl+t"` and `"Ctrl+Shift+T"` both become `"Ctrl+Shift+T"`.
pub fn normalize_keys(keys: &str) -> Option<String> {
    const MODIFIERS: [&str; 5] = ["Ctrl", "Cmd", "Alt", "Shift", "Super"];

    let mut modifiers = [false; MODIFIERS.len()];
    let mut key: Option<String> = None;
    for part in keys.split('+').map(str::trim) {
        if part.is_empty() {
            return None;
        }
        match MODIFIERS.iter().position(|m| m.eq_ignore_ascii_case(part)) {
            Some(i) => modifiers[i] = true,
            None if key.is_none() => key = Some(capitalize(part)),
            None => return None,
        }
    }
    let key = key?;
    let mut parts: Vec<&str> = MODIFIERS
        .iter()
        .zip(modifiers)
        .filter_map(|(name, on)| on.then_some(*name))
        .collect();
    parts.push(&key);
    Some(parts.join("+"))
}

fn capitalize(part: &str) -> String {
    let mut chars = part.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn adapt_for_platform(keys: &str) -> String {
    if cfg!(target_os = "macos") {
        keys.replace("Ctrl+", "Cmd+")
    } else {
        keys.to_string()
    }
}

/// Shortcut bindings, action name to canonical chord.
pub struct ShortcutManager {
    shortcuts: HashMap<String, String>,
}

impl ShortcutManager {
    pub fn new() -> Self {
        Self::from_bindings(&ShellSettings::default_shortcuts())
    }

    /// Loads bindings from settings. Malformed or conflicting entries are skipped.
    pub fn from_bindings(bindings: &HashMap<String, String>) -> Self {
        let mut manager = Self { shortcuts: HashMap::new() };
        let mut actions: Vec<&String> = bindings.keys().collect();
        actions.sort();
        for action in actions {
            if let Err(e) = manager.register_shortcut(action, &bindings[action]) {
                warn!("Skipping shortcut '{}': {}", action, e);
            }
        }
        manager
    }
}

impl Default for ShortcutManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ShortcutManagerTrait for ShortcutManager {
    fn register_shortcut(&mut self, action: &str, keys: &str) -> Result<(), ShortcutError> {
        let normalized = normalize_keys(keys)
            .ok_or_else(|| ShortcutError::InvalidKeys(format!("'{}' is not a key chord", keys)))?;
        if let Some(conflicting_action) = self.has_conflict(&normalized, Some(action)) {
            return Err(ShortcutError::Conflict(format!(
                "'{}' is already bound to '{}'",
                keys, conflicting_action
            )));
        }
        self.shortcuts.insert(action.to_string(), adapt_for_platform(&normalized));
        Ok(())
    }

    fn unregister_shortcut(&mut self, action: &str) -> Result<(), ShortcutError> {
        self.shortcuts
            .remove(action)
            .map(|_| ())
            .ok_or_else(|| ShortcutError::NotFound(action.to_string()))
    }

    fn get_shortcut(&self, action: &str) -> Option<&str> {
        self.shortcuts.get(action).map(|s| s.as_str())
    }

    fn list_shortcuts(&self) -> &HashMap<String, String> {
        &self.shortcuts
    }

    fn reset_to_defaults(&mut self) {
        *self = Self::new();
    }

    fn has_conflict(&self, keys: &str, exclude_action: Option<&str>) -> Option<String> {
        let wanted = adapt_for_platform(&normalize_keys(keys)?);
        self.shortcuts
            .iter()
            .find(|(action, bound)| **bound == wanted && Some(action.as_str()) != exclude_action)
            .map(|(action, _)| action.clone())
    }

    /// Command for a pressed chord, if one is bound to a known action.
    fn resolve(&self, keys: &str) -> Option<Command> {
        let pressed = adapt_for_platform(&normalize_keys(keys)?);
        let (action, _) = self.shortcuts.iter().find(|(_, bound)| **bound == pressed)?;
        let command = command_for_action(action);
        if command.is_none() {
            debug!("Shortcut action '{}' has no command", action);
        }
        command
    }
}
