//! Floatshell binary.
//!
//! With the `gui` feature it opens the floating window. Without it, it runs a
//! console walkthrough of the shell core on the headless host.

#[cfg(feature = "gui")]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(e) = floatshell::ui::webview_app::run() {
        log::error!("Floatshell exited with an error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "gui"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!();
    println!("Floatshell v{} (headless demo)", env!("CARGO_PKG_VERSION"));
    println!();

    if let Err(e) = demo::run() {
        eprintln!("Demo failed: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "gui"))]
mod demo {
    use std::time::Duration;

    use floatshell::app::App;
    use floatshell::command_handler::{event_to_json, handle_message};
    use floatshell::host::headless::{HeadlessFactory, HeadlessHost, HeadlessWindow, ManualClock};
    use floatshell::managers::session_manager::SqliteSessionStore;
    use floatshell::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
    use floatshell::types::events::SurfaceEvent;
    use floatshell::types::geometry::Size;

    type DemoApp = App<HeadlessFactory, HeadlessWindow>;

    fn section(name: &str) {
        println!("--- {} ---", name);
    }

    fn send(app: &mut DemoApp, raw: &str) -> Result<(), String> {
        let reply = handle_message(app, raw)?;
        println!("  > {}  => {}", raw, reply);
        Ok(())
    }

    fn print_events(app: &mut DemoApp) {
        for event in app.drain_events() {
            println!("  < {}", event_to_json(&event));
        }
    }

    pub fn run() -> Result<(), Box<dyn std::error::Error>> {
        let dir = std::env::temp_dir().join(format!("floatshell-demo-{}", std::process::id()));
        let mut settings = SettingsEngine::new(Some(dir.join("settings.json")));
        settings.load()?;

        let host = HeadlessHost::new(Size::new(1000.0, 800.0));
        let clock = ManualClock::new();
        let store = SqliteSessionStore::open(dir.join("session.db"))?;
        let mut app = App::new(host.factory(), host.window(), Box::new(clock.clone()), settings, Some(store))?;

        section("Startup");
        app.startup()?;
        print_events(&mut app);

        section("Tabs");
        send(&mut app, r#"{"cmd":"create_tab","url":"rust-lang.org"}"#)?;
        send(&mut app, r#"{"cmd":"create_tab","url":"floating windows"}"#)?;
        send(&mut app, r#"{"cmd":"prev_tab"}"#)?;
        print_events(&mut app);

        section("Page events (coalesced)");
        if let Some(active) = app.lifecycle.active_tab_id() {
            let serial = active;
            host.emit(serial, SurfaceEvent::LoadStarted);
            host.emit(serial, SurfaceEvent::TitleChanged { title: "Rust".to_string() });
            host.emit(serial, SurfaceEvent::LoadFinished);
        }
        app.tick();
        clock.advance(Duration::from_millis(60));
        app.tick();
        print_events(&mut app);

        section("Layout");
        send(&mut app, r#"{"cmd":"toggle_nav_bar"}"#)?;
        send(&mut app, r#"{"cmd":"enter_fullscreen"}"#)?;
        send(&mut app, r#"{"cmd":"leave_fullscreen"}"#)?;
        send(&mut app, r#"{"cmd":"set_overlay_mode","mode":"search"}"#)?;
        send(&mut app, r#"{"cmd":"set_overlay_mode","mode":"none"}"#)?;
        send(&mut app, r#"{"cmd":"toggle_detached_mode"}"#)?;
        send(&mut app, r#"{"cmd":"toggle_detached_mode"}"#)?;
        print_events(&mut app);
        println!("  window: {:?}", host.window_record());

        section("Zoom");
        send(&mut app, r#"{"cmd":"zoom_in"}"#)?;
        send(&mut app, r#"{"cmd":"zoom_in"}"#)?;
        send(&mut app, r#"{"cmd":"zoom_reset"}"#)?;
        print_events(&mut app);

        section("State");
        send(&mut app, r#"{"cmd":"get_state"}"#)?;

        section("Shutdown");
        send(&mut app, r#"{"cmd":"close_active_tab"}"#)?;
        app.shutdown();
        println!("  live surfaces after shutdown: {}", host.live_surfaces().len());

        let _ = std::fs::remove_dir_all(&dir);
        Ok(())
    }
}
