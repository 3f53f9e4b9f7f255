// Floatshell panel message handler
// Panels post `{"cmd": "...", ...}` JSON. Shell commands go to the lifecycle
// manager; `get_state`, `get_settings`, `set_setting` and `shortcut` are handled
// here against the `App`. Kept free of any UI so it can be tested headless.

use log::{debug, warn};
use serde_json::{json, Value};

use crate::app::App;
use crate::host::{SurfaceFactory, WindowChrome};
use crate::types::command::Command;
use crate::types::events::ShellEvent;

/// Parses a shell command message, or `None` if it is not one.
pub fn parse_command(raw: &str) -> Option<Command> {
    match serde_json::from_str::<Command>(raw) {
        Ok(command) => Some(command),
        Err(e) => {
            debug!("Not a shell command ({}): {}", e, raw);
            None
        }
    }
}

/// Serializes a notification for delivery to the panels.
pub fn event_to_json(event: &ShellEvent) -> String {
    serde_json::to_string(event).unwrap_or_else(|e| {
        warn!("Could not serialize {:?}: {}", event, e);
        String::from("{}")
    })
}

/// Snapshot of the shell state the panels render from.
pub fn state_json<F: SurfaceFactory, W: WindowChrome>(app: &mut App<F, W>) -> Value {
    let lifecycle = &mut app.lifecycle;
    let zoom = lifecycle.active_zoom_percentage();
    json!({
        "tabs": lifecycle.tabs(),
        "activeTabId": lifecycle.active_tab_id(),
        "navbarVisible": lifecycle.show_nav(),
        "fullscreen": lifecycle.is_fullscreen(),
        "detached": lifecycle.is_detached(),
        "overlayMode": lifecycle.overlay_mode(),
        "zoom": zoom,
    })
}

/// Handles one raw panel message.
///
/// Returns `Ok(Value)` to reply with, or `Err(String)` describing why it was refused.
pub fn handle_message<F: SurfaceFactory, W: WindowChrome>(
    app: &mut App<F, W>,
    raw: &str,
) -> Result<Value, String> {
    let message: Value = serde_json::from_str(raw).map_err(|e| format!("invalid json: {}", e))?;
    let cmd = message
        .get("cmd")
        .and_then(|v| v.as_str())
        .ok_or("missing cmd")?
        .to_owned();

    match cmd.as_str() {
        "get_state" => Ok(state_json(app)),
        "get_settings" => serde_json::to_value(app.settings()).map_err(|e| e.to_string()),
        "set_setting" => {
            let key = message.get("key").and_then(|v| v.as_str()).ok_or("missing key")?;
            let value = message.get("value").cloned().ok_or("missing value")?;
            app.apply_setting(key, value).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "shortcut" => {
            let keys = message.get("keys").and_then(|v| v.as_str()).ok_or("missing keys")?;
            let handled = app.handle_key(keys).map_err(|e| e.to_string())?;
            Ok(json!({"handled": handled}))
        }
        _ => {
            let command: Command =
                serde_json::from_value(message).map_err(|e| format!("unknown command '{}': {}", cmd, e))?;
            let created_before = app.lifecycle.tabs().len();
            app.execute(command).map_err(|e| e.to_string())?;
            match cmd.as_str() {
                "create_tab" if app.lifecycle.tabs().len() > created_before => {
                    Ok(json!({"id": app.lifecycle.active_tab_id()}))
                }
                _ => Ok(json!({"ok": true})),
            }
        }
    }
}
