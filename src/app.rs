// Floatshell App Core
// Holds the lifecycle manager together with settings, shortcuts and session
// persistence, and runs the startup / tick / shutdown sequence for any host.

use std::time::{Duration, Instant};

use log::{debug, error, info, warn};

use crate::host::{Clock, SurfaceFactory, WindowChrome};
use crate::managers::lifecycle_manager::{LifecycleConfig, LifecycleManager};
use crate::managers::session_manager::{SessionManager, SessionStore, SqliteSessionStore};
use crate::managers::shortcut_manager::{ShortcutManager, ShortcutManagerTrait};
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::types::command::Command;
use crate::types::errors::{SettingsError, SurfaceError};
use crate::types::events::ShellEvent;
use crate::types::settings::ShellSettings;

/// Central application struct for one floating window.
pub struct App<F: SurfaceFactory, W: WindowChrome> {
    pub lifecycle: LifecycleManager<F, W>,
    pub settings_engine: SettingsEngine,
    pub shortcut_manager: ShortcutManager,
    session: Option<SessionManager<SqliteSessionStore>>,
}

impl<F: SurfaceFactory, W: WindowChrome> App<F, W> {
    /// Builds the app from already-loaded settings.
    ///
    /// `store` is `None` when sessions are not persisted (demo, tests).
    pub fn new(
        factory: F,
        chrome: W,
        clock: Box<dyn Clock>,
        settings_engine: SettingsEngine,
        store: Option<SqliteSessionStore>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let settings = settings_engine.get_settings().clone();
        let lifecycle =
            LifecycleManager::new(factory, chrome, clock, LifecycleConfig::from_settings(&settings))?;
        let debounce = Duration::from_millis(settings.timing.session_save_debounce_ms);

        Ok(Self {
            lifecycle,
            shortcut_manager: ShortcutManager::from_bindings(&settings.shortcuts),
            session: store.map(|store| SessionManager::new(store, debounce)),
            settings_engine,
        })
    }

    pub fn settings(&self) -> &ShellSettings {
        self.settings_engine.get_settings()
    }

    /// Startup sequence: window chrome, zoom checkpoint, then tabs.
    ///
    /// Restores the saved session when enabled; an empty or missing session opens
    /// one landing tab.
    pub fn startup(&mut self) -> Result<(), SurfaceError> {
        let settings = self.settings().clone();
        let chrome = self.lifecycle.chrome_mut();
        chrome.set_always_on_top(settings.window.always_on_top);
        chrome.set_opacity(settings.window.opacity);

        let mut restored = 0;
        if let Some(session) = &self.session {
            match session.store().load_zoom_offsets() {
                Ok(entries) => self.lifecycle.restore_zoom_offsets(entries),
                Err(e) => warn!("Could not load zoom offsets: {}", e),
            }
            if settings.general.restore_session {
                match session.restore() {
                    Ok(Some(data)) => restored = self.lifecycle.restore_session(&data),
                    Ok(None) => debug!("No saved session"),
                    Err(e) => warn!("Could not restore session: {}", e),
                }
            }
        }

        if restored == 0 {
            self.lifecycle.create_tab("")?;
        }
        // Restoring is not a change worth writing back.
        self.lifecycle.take_session_dirty();
        info!("Started with {} tabs", self.lifecycle.tabs().len());
        Ok(())
    }

    /// One pass of timed work. Hosts call this from their event loop.
    pub fn tick(&mut self) {
        self.lifecycle.tick();
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let now = self.lifecycle.now();
        if self.lifecycle.take_session_dirty() {
            session.mark_dirty(now);
        }
        let lifecycle = &self.lifecycle;
        if let Err(e) = session.save_if_due(now, || lifecycle.session_snapshot()) {
            error!("Session save failed: {}", e);
        }
    }

    /// When the host should call [`App::tick`] next.
    pub fn next_deadline(&self) -> Option<Instant> {
        let session = self.session.as_ref().and_then(|s| s.next_deadline());
        match (self.lifecycle.next_deadline(), session) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Runs a command. A new default zoom is also written to settings.
    pub fn execute(&mut self, command: Command) -> Result<(), SurfaceError> {
        if let Command::SetDefaultZoomFactor { percentage } = &command {
            let value = serde_json::json!(percentage);
            if let Err(e) = self.settings_engine.set_value("zoom.default_zoom_percent", value) {
                warn!("Default zoom not saved: {}", e);
            }
        }
        self.lifecycle.execute(command)
    }

    /// Runs whatever command the chord is bound to. Returns whether one was.
    pub fn handle_key(&mut self, keys: &str) -> Result<bool, SurfaceError> {
        match self.shortcut_manager.resolve(keys) {
            Some(command) => {
                debug!("Shortcut {} -> {:?}", keys, command);
                self.execute(command)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Changes one setting and applies it to the running shell.
    pub fn apply_setting(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError> {
        self.settings_engine.set_value(key, value)?;
        let settings = self.settings().clone();
        match key {
            "window.always_on_top" => self.lifecycle.chrome_mut().set_always_on_top(settings.window.always_on_top),
            "window.opacity" => self.lifecycle.chrome_mut().set_opacity(settings.window.opacity),
            "zoom.default_zoom_percent" => {
                self.lifecycle.set_default_zoom_factor(settings.zoom.default_zoom_percent)
            }
            k if k.starts_with("shortcuts.") => {
                self.shortcut_manager = ShortcutManager::from_bindings(&settings.shortcuts);
            }
            _ => debug!("Setting {} applies on next start", key),
        }
        Ok(())
    }

    pub fn drain_events(&mut self) -> Vec<ShellEvent> {
        self.lifecycle.drain_events()
    }

    /// Shutdown sequence: final session and zoom checkpoint, then surface teardown.
    pub fn shutdown(&mut self) {
        self.lifecycle.flush_pending_updates();
        if let Some(session) = self.session.as_mut() {
            let snapshot = self.lifecycle.session_snapshot();
            if let Err(e) = session.save_now(&snapshot) {
                error!("Final session save failed: {}", e);
            }
            if let Err(e) = session.store().save_zoom_offsets(&self.lifecycle.zoom_ledger().entries()) {
                error!("Zoom checkpoint failed: {}", e);
            }
        }
        self.lifecycle.shutdown();
        info!("Shutdown complete");
    }
}
