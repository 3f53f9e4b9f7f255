// Floatshell desktop entry point
// Desktop entry point: one always-on-top `tao` window with `wry` child webviews.
// Architecture:
// - Every engine callback posts a `UserEvent` through the loop proxy; nothing
//   touches the `App` outside the event loop closure.
// - After each loop event the app ticks, then shell events are fanned out to the
//   navbar and overlay panels as JSON.
// - The loop sleeps until the app's next deadline (coalescing, close timeouts,
//   debounced session saves).

use std::rc::Rc;

use log::{debug, info, warn};
use serde_json::{json, Value};
use tao::event::{Event, WindowEvent};
use tao::event_loop::{ControlFlow, EventLoop, EventLoopBuilder};
use tao::window::{Fullscreen, Window, WindowBuilder};

use super::surfaces::{TaoChrome, WryFactory};
use crate::app::App;
use crate::command_handler::{event_to_json, handle_message, state_json};
use crate::host::SystemClock;
use crate::managers::session_manager::SqliteSessionStore;
use crate::platform;
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::types::command::Command;
use crate::types::events::ShellEvent;
use crate::types::layout::PanelKind;

type DesktopApp = App<WryFactory, TaoChrome>;

#[derive(Debug)]
pub enum UserEvent {
    /// Raw IPC message from the navbar or overlay.
    Panel { kind: PanelKind, raw: String },
    /// Key chord forwarded from a content page.
    Key(String),
    /// Something queued surface events; tick now.
    Wake,
}

fn post_to_panel(app: &mut DesktopApp, kind: PanelKind, json: &str) {
    match kind {
        PanelKind::Navbar => app.lifecycle.navbar_mut().post(json),
        PanelKind::Overlay => app.lifecycle.overlay_mut().post(json),
    }
}

fn handle_panel_message(app: &mut DesktopApp, window: &Window, kind: PanelKind, raw: &str) {
    let cmd = serde_json::from_str::<Value>(raw)
        .ok()
        .and_then(|v| v.get("cmd").and_then(|c| c.as_str()).map(str::to_string));
    if cmd.as_deref() == Some("drag_window") {
        if let Err(e) = window.drag_window() {
            debug!("Window drag refused: {}", e);
        }
        return;
    }

    let reply = match handle_message(app, raw) {
        Ok(reply) => reply,
        Err(e) => {
            warn!("Panel message refused: {}", e);
            return;
        }
    };
    let wrapped = match cmd.as_deref() {
        Some("get_state") => {
            let mut state = reply;
            if let Some(map) = state.as_object_mut() {
                map.insert("type".to_string(), json!("state"));
            }
            state
        }
        Some("get_settings") => json!({"type": "settings", "settings": reply}),
        _ => return,
    };
    post_to_panel(app, kind, &wrapped.to_string());
}

/// Fans shell events out to both panels and acts on the ones the window owns.
fn deliver_events(app: &mut DesktopApp, window: &Window) {
    loop {
        let events = app.drain_events();
        if events.is_empty() {
            return;
        }
        for event in events {
            let json = event_to_json(&event);
            post_to_panel(app, PanelKind::Navbar, &json);
            post_to_panel(app, PanelKind::Overlay, &json);

            match event {
                ShellEvent::NewWindowRequested { url } => {
                    if let Err(e) = app.execute(Command::CreateTab { url: Some(url) }) {
                        warn!("Popup not opened: {}", e);
                    }
                }
                ShellEvent::FullscreenEntered => window.set_fullscreen(Some(Fullscreen::Borderless(None))),
                ShellEvent::FullscreenLeft => window.set_fullscreen(None),
                ShellEvent::OverlayModeChanged { .. } => {
                    // A rebuilt overlay has no state yet.
                    let mut state = state_json(app);
                    if let Some(map) = state.as_object_mut() {
                        map.insert("type".to_string(), json!("state"));
                    }
                    post_to_panel(app, PanelKind::Overlay, &state.to_string());
                }
                _ => {}
            }
        }
    }
}

/// Opens the floating window and runs until it closes.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut settings_engine = SettingsEngine::new(None);
    if let Err(e) = settings_engine.load() {
        warn!("Settings not loaded, using defaults: {}", e);
    }
    let settings = settings_engine.get_settings().clone();

    let event_loop: EventLoop<UserEvent> = EventLoopBuilder::with_user_event().build();
    let proxy = event_loop.create_proxy();

    let window = Rc::new(
        WindowBuilder::new()
            .with_title("Floatshell")
            .with_inner_size(tao::dpi::LogicalSize::new(
                settings.window.width as f64,
                settings.window.height as f64,
            ))
            .with_always_on_top(settings.window.always_on_top)
            .build(&event_loop)?,
    );

    let store = match SqliteSessionStore::open(&platform::get_session_db_path()) {
        Ok(store) => Some(store),
        Err(e) => {
            warn!("Session persistence disabled: {}", e);
            None
        }
    };

    let factory = WryFactory::new(window.clone(), proxy);
    let chrome = TaoChrome::new(window.clone());
    let mut app: DesktopApp = App::new(factory, chrome, Box::new(SystemClock), settings_engine, store)?;
    app.startup()?;
    deliver_events(&mut app, &window);
    info!("Floatshell window open");

    event_loop.run(move |event, _, control_flow| {
        match event {
            Event::WindowEvent { event: WindowEvent::CloseRequested, .. } => {
                app.shutdown();
                *control_flow = ControlFlow::Exit;
                return;
            }
            Event::WindowEvent { event: WindowEvent::Resized(_), .. } => {
                app.lifecycle.on_window_resize();
            }
            Event::UserEvent(UserEvent::Panel { kind, raw }) => {
                handle_panel_message(&mut app, &window, kind, &raw);
            }
            Event::UserEvent(UserEvent::Key(keys)) => match app.handle_key(&keys) {
                Ok(handled) => debug!("Key {} handled: {}", keys, handled),
                Err(e) => warn!("Shortcut {} failed: {}", keys, e),
            },
            Event::UserEvent(UserEvent::Wake) => {}
            _ => {}
        }

        app.tick();
        deliver_events(&mut app, &window);

        *control_flow = match app.next_deadline() {
            Some(deadline) => ControlFlow::WaitUntil(deadline),
            None => ControlFlow::Wait,
        };
    })
}
