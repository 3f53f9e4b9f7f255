use thiserror::Error;

use super::tab::TabId;

// === TabError ===

/// Errors related to tab directory operations.
#[derive(Debug, Error)]
pub enum TabError {
    /// Tab with the given ID was not found.
    #[error("Tab not found: {0}")]
    NotFound(TabId),
    /// A tab with the given ID already exists.
    #[error("Tab already exists: {0}")]
    AlreadyExists(TabId),
}

// === SurfaceError ===

/// Errors raised by content surfaces and the surface registry.
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// The content engine refused to instantiate a surface.
    #[error("Surface creation failed: {0}")]
    CreationFailed(String),
    /// A content surface is already registered for this tab.
    #[error("Surface already registered for tab {0}")]
    AlreadyRegistered(TabId),
    /// Graceful close did not settle before the deadline.
    #[error("Graceful close timed out for tab {0}")]
    CloseTimeout(TabId),
    /// Any other failure reported by the rendering engine.
    #[error("Surface engine error: {0}")]
    Engine(String),
}

// === SessionError ===

/// Errors related to session persistence.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Database operation failed.
    #[error("Session database error: {0}")]
    DatabaseError(String),
    /// Serialization or deserialization failed.
    #[error("Session serialization error: {0}")]
    SerializationError(String),
}

impl From<rusqlite::Error> for SessionError {
    fn from(e: rusqlite::Error) -> Self {
        SessionError::DatabaseError(e.to_string())
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(e: serde_json::Error) -> Self {
        SessionError::SerializationError(e.to_string())
    }
}

// === SettingsError ===

/// Errors related to the settings file.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Reading or writing the config file failed.
    #[error("Settings I/O error: {0}")]
    IoError(String),
    /// The config file could not be (de)serialized.
    #[error("Settings serialization error: {0}")]
    SerializationError(String),
    /// The dot-notation key does not name a setting.
    #[error("Invalid settings key: {0}")]
    InvalidKey(String),
    /// The value has the wrong shape for the key.
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
}

// === ShortcutError ===

/// Errors related to keyboard shortcut management.
#[derive(Debug, Error)]
pub enum ShortcutError {
    /// Shortcut for the given action was not found.
    #[error("Shortcut not found for action: {0}")]
    NotFound(String),
    /// The shortcut keys conflict with an existing binding.
    #[error("Shortcut conflict: {0}")]
    Conflict(String),
    /// The provided key combination is invalid.
    #[error("Invalid shortcut keys: {0}")]
    InvalidKeys(String),
}
