//! Tests for panel message handling against a headless App.

use floatshell::app::App;
use floatshell::command_handler::{event_to_json, handle_message, parse_command};
use floatshell::host::headless::{HeadlessFactory, HeadlessHost, HeadlessWindow, ManualClock};
use floatshell::services::settings_engine::SettingsEngine;
use floatshell::types::command::Command;
use floatshell::types::events::ShellEvent;
use floatshell::types::geometry::Size;
use floatshell::types::layout::OverlayMode;
use serde_json::Value;
use tempfile::TempDir;

fn app(dir: &TempDir) -> (HeadlessHost, App<HeadlessFactory, HeadlessWindow>) {
    let host = HeadlessHost::new(Size::new(1000.0, 800.0));
    let settings = SettingsEngine::new(Some(dir.path().join("settings.json")));
    let mut app = App::new(
        host.factory(),
        host.window(),
        Box::new(ManualClock::new()),
        settings,
        None,
    )
    .unwrap();
    app.startup().unwrap();
    (host, app)
}

#[test]
fn test_get_state_has_expected_keys() {
    let dir = TempDir::new().unwrap();
    let (_host, mut app) = app(&dir);

    let state = handle_message(&mut app, r#"{"cmd":"get_state"}"#).unwrap();

    assert_eq!(state["tabs"].as_array().map(Vec::len), Some(1));
    assert_eq!(state["activeTabId"], state["tabs"][0]["id"]);
    assert_eq!(state["navbarVisible"], true);
    assert_eq!(state["fullscreen"], false);
    assert_eq!(state["detached"], false);
    assert_eq!(state["zoom"], 100);
}

#[test]
fn test_create_tab_replies_with_new_id() {
    let dir = TempDir::new().unwrap();
    let (_host, mut app) = app(&dir);

    let reply = handle_message(&mut app, r#"{"cmd":"create_tab","url":"https://example.com"}"#).unwrap();

    let id = reply["id"].as_u64().unwrap();
    assert_eq!(app.lifecycle.active_tab_id(), Some(id));
    assert_eq!(app.lifecycle.tabs().len(), 2);
}

#[test]
fn test_plain_command_replies_ok() {
    let dir = TempDir::new().unwrap();
    let (_host, mut app) = app(&dir);

    let reply = handle_message(&mut app, r#"{"cmd":"set_overlay_mode","mode":"settings"}"#).unwrap();

    assert_eq!(reply["ok"], true);
    assert_eq!(app.lifecycle.overlay_mode(), OverlayMode::Settings);
}

#[test]
fn test_set_setting_applies_to_window() {
    let dir = TempDir::new().unwrap();
    let (host, mut app) = app(&dir);

    handle_message(
        &mut app,
        r#"{"cmd":"set_setting","key":"window.always_on_top","value":false}"#,
    )
    .unwrap();

    assert!(!host.window_record().always_on_top);
    assert!(!app.settings().window.always_on_top);
}

#[test]
fn test_set_setting_rejects_bad_key() {
    let dir = TempDir::new().unwrap();
    let (_host, mut app) = app(&dir);

    let result = handle_message(&mut app, r#"{"cmd":"set_setting","key":"window.nope","value":1}"#);

    assert!(result.is_err());
}

#[test]
fn test_get_settings_returns_tree() {
    let dir = TempDir::new().unwrap();
    let (_host, mut app) = app(&dir);

    let settings = handle_message(&mut app, r#"{"cmd":"get_settings"}"#).unwrap();

    assert_eq!(settings["timing"]["close_timeout_ms"], 2000);
}

#[test]
fn test_shortcut_is_handled() {
    let dir = TempDir::new().unwrap();
    let (_host, mut app) = app(&dir);

    let reply = handle_message(&mut app, r#"{"cmd":"shortcut","keys":"F11"}"#).unwrap();
    assert_eq!(reply["handled"], true);
    assert!(app.lifecycle.is_fullscreen());

    let reply = handle_message(&mut app, r#"{"cmd":"shortcut","keys":"Ctrl+Alt+Q"}"#).unwrap();
    assert_eq!(reply["handled"], false);
}

#[test]
fn test_invalid_messages_are_refused() {
    let dir = TempDir::new().unwrap();
    let (_host, mut app) = app(&dir);

    assert!(handle_message(&mut app, "not json").is_err());
    assert!(handle_message(&mut app, r#"{"url":"https://example.com"}"#).is_err());
    let err = handle_message(&mut app, r#"{"cmd":"warp_drive"}"#).unwrap_err();
    assert!(err.contains("warp_drive"));
}

#[test]
fn test_set_default_zoom_is_saved_to_settings() {
    let dir = TempDir::new().unwrap();
    let (_host, mut app) = app(&dir);

    app.execute(Command::SetDefaultZoomFactor { percentage: 150 }).unwrap();

    assert_eq!(app.settings().zoom.default_zoom_percent, 150);
    assert!(dir.path().join("settings.json").exists());
}

#[test]
fn test_parse_command_reads_navigate() {
    assert_eq!(
        parse_command(r#"{"cmd":"navigate","id":3,"url":"example.com"}"#),
        Some(Command::Navigate { id: Some(3), url: "example.com".to_string() })
    );
}

#[test]
fn test_event_to_json_tags_type() {
    let json = event_to_json(&ShellEvent::TabNavigated {
        tab_id: 4,
        url: "https://example.com/".to_string(),
    });
    let value: Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["type"], "tab-navigated");
    assert_eq!(value["url"], "https://example.com/");
}
