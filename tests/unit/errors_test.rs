use floatshell::types::errors::*;

// === TabError Tests ===

#[test]
fn tab_error_not_found_display() {
    let err = TabError::NotFound(12);
    assert_eq!(err.to_string(), "Tab not found: 12");
}

#[test]
fn tab_error_already_exists_display() {
    let err = TabError::AlreadyExists(3);
    assert_eq!(err.to_string(), "Tab already exists: 3");
}

#[test]
fn tab_error_implements_error_trait() {
    let err: Box<dyn std::error::Error> = Box::new(TabError::NotFound(1));
    assert!(err.source().is_none());
}

// === SurfaceError Tests ===

#[test]
fn surface_error_display_variants() {
    assert_eq!(
        SurfaceError::CreationFailed("engine refused".to_string()).to_string(),
        "Surface creation failed: engine refused"
    );
    assert_eq!(
        SurfaceError::AlreadyRegistered(4).to_string(),
        "Surface already registered for tab 4"
    );
    assert_eq!(
        SurfaceError::CloseTimeout(5).to_string(),
        "Graceful close timed out for tab 5"
    );
    assert_eq!(
        SurfaceError::Engine("gone".to_string()).to_string(),
        "Surface engine error: gone"
    );
}

#[test]
fn surface_error_boxes_into_dyn_error() {
    fn fails() -> Result<(), Box<dyn std::error::Error>> {
        Err(SurfaceError::CreationFailed("x".to_string()))?;
        Ok(())
    }
    assert_eq!(fails().unwrap_err().to_string(), "Surface creation failed: x");
}

// === SessionError Tests ===

#[test]
fn session_error_from_rusqlite() {
    let err: SessionError = rusqlite::Error::QueryReturnedNoRows.into();
    assert!(matches!(err, SessionError::DatabaseError(_)));
    assert!(err.to_string().starts_with("Session database error:"));
}

#[test]
fn session_error_from_serde_json() {
    let parse = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
    let err: SessionError = parse.into();
    assert!(matches!(err, SessionError::SerializationError(_)));
}

// === SettingsError Tests ===

#[test]
fn settings_error_display_variants() {
    assert_eq!(
        SettingsError::IoError("disk full".to_string()).to_string(),
        "Settings I/O error: disk full"
    );
    assert_eq!(
        SettingsError::SerializationError("bad json".to_string()).to_string(),
        "Settings serialization error: bad json"
    );
    assert_eq!(
        SettingsError::InvalidKey("window.nope".to_string()).to_string(),
        "Invalid settings key: window.nope"
    );
    assert_eq!(
        SettingsError::InvalidValue("opacity".to_string()).to_string(),
        "Invalid settings value: opacity"
    );
}

// === ShortcutError Tests ===

#[test]
fn shortcut_error_display_variants() {
    assert_eq!(
        ShortcutError::NotFound("zoom_in".to_string()).to_string(),
        "Shortcut not found for action: zoom_in"
    );
    assert_eq!(
        ShortcutError::Conflict("Ctrl+T".to_string()).to_string(),
        "Shortcut conflict: Ctrl+T"
    );
    assert_eq!(
        ShortcutError::InvalidKeys("Ctrl+".to_string()).to_string(),
        "Invalid shortcut keys: Ctrl+"
    );
}
