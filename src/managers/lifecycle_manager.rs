// Floatshell Lifecycle Manager
// Composes the tab directory, the surface registry and the zoom ledger, and is the
// only component that calls across them. Every operation runs on the host's
// control thread. Surface events arrive asynchronously through an inbox and are
// handled when the host calls `LifecycleManager::tick`.
//
// State is the composite `{active tab, show_nav, fullscreen, overlay panel, detached}`.
// Fullscreen is layered over the navbar preference and never rewrites it; detached
// mode remembers the preference and restores it on exit.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use log::{debug, error, info, warn};

use crate::host::{Clock, ContentSurface, SubscriptionSet, Surface, SurfaceFactory, WindowChrome};
use crate::managers::surface_registry::SurfaceRegistry;
use crate::managers::tab_directory::{TabDirectory, TabDirectoryTrait};
use crate::managers::update_coalescer::UpdateCoalescer;
use crate::services::url_input::{normalize_url, title_from_url};
use crate::services::zoom_ledger::{
    domain_of, percentage_to_factor, zoom_percentage, ZoomLedger, ZoomLedgerTrait, ZOOM_STEP,
};
use crate::types::command::Command;
use crate::types::errors::SurfaceError;
use crate::types::events::{ShellEvent, SurfaceEvent, SurfaceEventKind, ERR_ABORTED};
use crate::types::layout::{LayoutMode, OverlayMode, OverlayPanel, PanelKind};
use crate::types::session::{SessionData, SessionTab};
use crate::types::settings::ShellSettings;
use crate::types::tab::{Tab, TabId, TabPatch, DEFAULT_TAB_TITLE};

/// Tunables for the lifecycle manager.
#[derive(Debug, Clone, PartialEq)]
pub struct LifecycleConfig {
    /// Loaded when a tab is created with a blank url.
    pub landing_url: String,
    pub default_zoom_factor: f64,
    /// How long metadata updates are merged before one flush.
    pub coalesce_window: Duration,
    /// How long a graceful close may take before the surface is destroyed.
    pub close_timeout: Duration,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            landing_url: "about:blank".to_string(),
            default_zoom_factor: 1.0,
            coalesce_window: Duration::from_millis(50),
            close_timeout: Duration::from_millis(2000),
        }
    }
}

impl LifecycleConfig {
    pub fn from_settings(settings: &ShellSettings) -> Self {
        Self {
            landing_url: settings.general.landing_url.clone(),
            default_zoom_factor: percentage_to_factor(settings.zoom.default_zoom_percent),
            coalesce_window: Duration::from_millis(settings.timing.update_coalesce_ms),
            close_timeout: Duration::from_millis(settings.timing.close_timeout_ms),
        }
    }
}

struct InboundEvent {
    tab_id: TabId,
    event: SurfaceEvent,
}

/// A surface that has left the directory and registry and is shutting down.
struct ClosingSurface<C> {
    tab_id: TabId,
    surface: C,
    deadline: Instant,
}

/// The view-hierarchy state machine.
pub struct LifecycleManager<F: SurfaceFactory, W: WindowChrome> {
    factory: F,
    chrome: W,
    clock: Box<dyn Clock>,
    config: LifecycleConfig,
    directory: TabDirectory,
    registry: SurfaceRegistry<F::Content, F::Panel>,
    zoom: ZoomLedger,
    coalescer: UpdateCoalescer,
    /// Url each surface was last sent to or reported, ahead of the coalesced directory.
    shown_urls: HashMap<TabId, String>,
    closing: Vec<ClosingSurface<F::Content>>,
    inbox_tx: Sender<InboundEvent>,
    inbox_rx: Receiver<InboundEvent>,
    outbox: Vec<ShellEvent>,
    show_nav: bool,
    is_fullscreen: bool,
    overlay_panel: Option<OverlayPanel>,
    detached: bool,
    nav_before_detached: Option<bool>,
    session_dirty: bool,
}

impl<F: SurfaceFactory, W: WindowChrome> LifecycleManager<F, W> {
    /// Creates the navbar and overlay panels and lays them out for the initial state.
    pub fn new(
        mut factory: F,
        chrome: W,
        clock: Box<dyn Clock>,
        config: LifecycleConfig,
    ) -> Result<Self, SurfaceError> {
        let navbar = factory.create_panel(PanelKind::Navbar)?;
        let overlay = factory.create_panel(PanelKind::Overlay)?;
        let layout = LayoutMode {
            fullscreen: false,
            navbar_visible: true,
            overlay_mode: OverlayMode::None,
        };
        let registry = SurfaceRegistry::new(navbar, overlay, chrome.window_size(), layout);
        let (inbox_tx, inbox_rx) = mpsc::channel();

        Ok(Self {
            factory,
            chrome,
            clock,
            zoom: ZoomLedger::new(config.default_zoom_factor),
            coalescer: UpdateCoalescer::new(config.coalesce_window),
            shown_urls: HashMap::new(),
            config,
            directory: TabDirectory::new(),
            registry,
            closing: Vec::new(),
            inbox_tx,
            inbox_rx,
            outbox: Vec::new(),
            show_nav: true,
            is_fullscreen: false,
            overlay_panel: None,
            detached: false,
            nav_before_detached: None,
            session_dirty: false,
        })
    }

    // ─── Tabs ───

    /// Creates a tab, loads `url` (or the landing url when blank) and activates it.
    pub fn create_tab(&mut self, url: &str) -> Result<TabId, SurfaceError> {
        self.open_tab(url, true, true)
    }

    /// Creates a tab without switching to it. The first tab is still activated.
    pub fn create_background_tab(&mut self, url: &str) -> Result<TabId, SurfaceError> {
        self.open_tab(url, false, false)
    }

    fn open_tab(&mut self, url: &str, activate: bool, focus_address_bar: bool) -> Result<TabId, SurfaceError> {
        let target = normalize_url(url).unwrap_or_else(|| self.config.landing_url.clone());

        // Surface first: a refused surface must leave no trace in the directory.
        let mut surface = self.factory.create_surface(&target).map_err(|e| {
            error!("Could not create a surface for {}: {}", target, e);
            e
        })?;

        let tab_id = self.directory.allocate_id();
        let subscriptions = self.wire_surface(tab_id, &mut surface);
        if self.detached {
            surface.set_input_enabled(false);
        }
        self.registry.add_content_surface(tab_id, surface, subscriptions)?;

        if let Err(e) = self.directory.insert_tab(Tab::new(tab_id, &target), activate) {
            error!("Directory rejected new tab {}: {}", tab_id, e);
            if let Some(surface) = self.registry.remove_content_surface(tab_id) {
                surface.force_destroy();
            }
            return Err(SurfaceError::Engine(e.to_string()));
        }

        if self.directory.active_tab_id() == Some(tab_id) {
            self.registry.set_active_tab(tab_id);
        }
        self.shown_urls.insert(tab_id, target.clone());
        self.apply_zoom_to(tab_id, &target);

        info!("Created tab {} ({})", tab_id, target);
        if focus_address_bar && self.show_nav && !self.detached {
            self.outbox.push(ShellEvent::FocusAddressBar);
        }
        self.emit_tabs_changed();
        self.session_dirty = true;
        Ok(tab_id)
    }

    /// Subscribes the manager's inbox to every event kind the surface raises.
    fn wire_surface(&self, tab_id: TabId, surface: &mut F::Content) -> SubscriptionSet {
        let mut subscriptions = SubscriptionSet::new();
        for kind in SurfaceEventKind::ALL {
            let tx = self.inbox_tx.clone();
            subscriptions.push(surface.subscribe(
                kind,
                Box::new(move |event| {
                    let _ = tx.send(InboundEvent { tab_id, event });
                }),
            ));
        }
        subscriptions
    }

    /// Closes a tab. Unknown ids are a logged no-op.
    pub fn close_tab(&mut self, tab_id: TabId) {
        if !self.directory.contains(tab_id) {
            if let Some(surface) = self.registry.remove_content_surface(tab_id) {
                error!("Tab {} had a surface but no directory entry; closing it", tab_id);
                self.begin_close(tab_id, surface);
            } else {
                warn!("close_tab: tab {} not found", tab_id);
            }
            return;
        }

        let was_active = self.directory.active_tab_id() == Some(tab_id);
        if let Err(e) = self.directory.remove_tab(tab_id) {
            warn!("close_tab: {}", e);
            return;
        }
        self.coalescer.discard(tab_id);
        self.shown_urls.remove(&tab_id);

        match self.registry.remove_content_surface(tab_id) {
            Some(surface) => self.begin_close(tab_id, surface),
            None => error!("Tab {} had no surface in the registry", tab_id),
        }

        if was_active {
            if let Some(next) = self.directory.active_tab_id() {
                self.registry.set_active_tab(next);
                self.emit_active_zoom();
            }
        }

        info!("Closed tab {}", tab_id);
        self.emit_tabs_changed();
        self.session_dirty = true;
    }

    fn begin_close(&mut self, tab_id: TabId, mut surface: F::Content) {
        surface.begin_close();
        if surface.poll_closed() {
            debug!("Surface for tab {} closed immediately", tab_id);
            return;
        }
        let deadline = self.clock.now() + self.config.close_timeout;
        self.closing.push(ClosingSurface { tab_id, surface, deadline });
    }

    /// Makes `tab_id` the active tab. Switching to the active tab only re-announces the list.
    pub fn switch_tab(&mut self, tab_id: TabId) {
        if !self.directory.contains(tab_id) {
            warn!("switch_tab: tab {} not found", tab_id);
            return;
        }
        if self.directory.active_tab_id() == Some(tab_id) {
            if self.registry.active_tab() != Some(tab_id) {
                error!("Registry active tab disagrees with directory; resyncing to {}", tab_id);
                self.registry.set_active_tab(tab_id);
            }
            self.emit_tabs_changed();
            return;
        }

        if let Err(e) = self.directory.set_active(tab_id) {
            warn!("switch_tab: {}", e);
            return;
        }
        self.registry.set_active_tab(tab_id);
        debug!("Switched to tab {}", tab_id);
        self.emit_active_zoom();
        self.emit_tabs_changed();
        self.session_dirty = true;
    }

    fn switch_relative(&mut self, offset: isize) {
        match self.directory.relative_tab(offset) {
            Some(tab_id) => self.switch_tab(tab_id),
            None => debug!("No tab to switch to"),
        }
    }

    /// Loads `url` in a tab, active or not. The directory url is updated right away.
    pub fn navigate(&mut self, tab_id: TabId, url: &str) {
        if !self.directory.contains(tab_id) {
            warn!("navigate: tab {} not found", tab_id);
            return;
        }
        let target = normalize_url(url).unwrap_or_else(|| self.config.landing_url.clone());

        // An older navigation still waiting to flush must not overwrite this one.
        self.pump_surface_events();
        self.coalescer.drop_url(tab_id);

        let mut patch = TabPatch::url(target.clone());
        if self.directory.get_tab(tab_id).is_some_and(|t| t.title == DEFAULT_TAB_TITLE) {
            patch.title = Some(title_from_url(&target));
        }
        if let Err(e) = self.directory.apply_patch(tab_id, &patch) {
            warn!("navigate: {}", e);
            return;
        }

        match self.registry.surface_mut(tab_id) {
            Some(surface) => surface.load_url(&target),
            None => error!("Tab {} has no surface to navigate", tab_id),
        }
        self.shown_urls.insert(tab_id, target.clone());
        self.apply_zoom_to(tab_id, &target);
        self.emit_tabs_changed();
        self.session_dirty = true;
    }

    pub fn reload(&mut self, tab_id: TabId) {
        self.with_surface(tab_id, "reload", |s| s.reload());
    }

    pub fn back(&mut self, tab_id: TabId) {
        self.with_surface(tab_id, "back", |s| s.go_back());
    }

    pub fn forward(&mut self, tab_id: TabId) {
        self.with_surface(tab_id, "forward", |s| s.go_forward());
    }

    fn with_surface(&mut self, tab_id: TabId, op: &str, f: impl FnOnce(&mut F::Content)) {
        if !self.directory.contains(tab_id) {
            warn!("{}: tab {} not found", op, tab_id);
            return;
        }
        match self.registry.surface_mut(tab_id) {
            Some(surface) => f(surface),
            None => error!("{}: tab {} has no surface", op, tab_id),
        }
    }

    // ─── Layout ───

    /// Re-lays out every surface at the current window size.
    pub fn on_window_resize(&mut self) {
        self.relayout();
    }

    pub fn enter_fullscreen(&mut self) {
        if self.is_fullscreen {
            return;
        }
        self.is_fullscreen = true;
        self.chrome.set_platform_button_visibility(false);
        self.relayout();
        info!("Entered fullscreen");
        self.outbox.push(ShellEvent::FullscreenEntered);
    }

    /// Leaves fullscreen. Decorations come back only if the navbar preference is on.
    pub fn leave_fullscreen(&mut self) {
        if !self.is_fullscreen {
            return;
        }
        self.is_fullscreen = false;
        self.chrome.set_platform_button_visibility(self.show_nav);
        self.relayout();
        info!("Left fullscreen");
        self.outbox.push(ShellEvent::FullscreenLeft);
    }

    /// Sets the navbar preference.
    ///
    /// In detached mode the value is remembered and applied when detached mode ends.
    pub fn set_nav_bar_visible(&mut self, visible: bool) {
        if self.detached {
            if self.nav_before_detached != Some(visible) {
                debug!("Navbar preference {} deferred until detached mode ends", visible);
                self.nav_before_detached = Some(visible);
            }
            return;
        }
        self.apply_nav_visibility(visible);
    }

    fn apply_nav_visibility(&mut self, visible: bool) {
        if self.show_nav == visible {
            return;
        }
        self.show_nav = visible;
        if !self.is_fullscreen {
            self.chrome.set_platform_button_visibility(visible);
        }
        self.relayout();
        debug!("Navbar visible: {}", visible);
        self.outbox.push(ShellEvent::NavbarVisibilityChanged { visible });
    }

    /// Flips detached (click-through) mode.
    pub fn toggle_detached_mode(&mut self) {
        if self.detached {
            self.detached = false;
            let restore = self.nav_before_detached.take().unwrap_or(true);
            self.registry.for_each_content_mut(|_, s| s.set_input_enabled(true));
            self.chrome.set_click_through(false);
            self.apply_nav_visibility(restore);
            self.relayout();
            info!("Left detached mode");
        } else {
            self.detached = true;
            self.nav_before_detached = Some(self.show_nav);
            self.apply_nav_visibility(false);
            self.registry.for_each_content_mut(|_, s| s.set_input_enabled(false));
            self.chrome.set_click_through(true);
            self.relayout();
            info!("Entered detached mode");
        }
        self.outbox.push(ShellEvent::DetachedModeChanged { detached: self.detached });
    }

    /// Opens the settings or search panel, or closes any panel for `None`.
    ///
    /// The drag strip is derived from the navbar state and cannot be requested.
    pub fn set_overlay_mode(&mut self, mode: OverlayMode) {
        let panel = match mode {
            OverlayMode::Settings => Some(OverlayPanel::Settings),
            OverlayMode::Search => Some(OverlayPanel::Search),
            OverlayMode::None => None,
            OverlayMode::DragStrip => {
                warn!("set_overlay_mode: the drag strip is managed automatically");
                return;
            }
        };
        if self.overlay_panel == panel {
            return;
        }
        if let (Some(open), Some(next)) = (self.overlay_panel, panel) {
            debug!("Closing {:?} panel before opening {:?}", open, next);
        }
        self.overlay_panel = panel;
        self.relayout();
        if panel.is_some() {
            self.registry.overlay_mut().focus();
        }
    }

    fn effective_overlay(&self) -> OverlayMode {
        match self.overlay_panel {
            Some(panel) => panel.into(),
            None if self.detached => OverlayMode::None,
            None if self.is_fullscreen || !self.show_nav => OverlayMode::DragStrip,
            None => OverlayMode::None,
        }
    }

    pub fn layout_mode(&self) -> LayoutMode {
        LayoutMode {
            fullscreen: self.is_fullscreen,
            navbar_visible: self.show_nav,
            overlay_mode: self.effective_overlay(),
        }
    }

    /// Reads the window size now and applies bounds for the current state.
    fn relayout(&mut self) {
        let before = self.registry.overlay_mode();
        let size = self.chrome.window_size();
        self.registry.recompute_all_bounds(size, self.layout_mode());
        let after = self.registry.overlay_mode();
        if before != after {
            self.outbox.push(ShellEvent::OverlayModeChanged { mode: after });
        }
    }

    // ─── Zoom ───

    pub fn zoom_in(&mut self) {
        self.step_zoom(ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.step_zoom(-ZOOM_STEP);
    }

    /// Forgets the active domain's offset, returning it to the default factor.
    pub fn zoom_reset(&mut self) {
        let Some(domain) = self.active_domain("zoom_reset") else {
            return;
        };
        self.zoom.clear_offset(&domain);
        self.apply_zoom_for_domain(&domain);
        self.emit_active_zoom();
    }

    fn step_zoom(&mut self, delta: f64) {
        let Some(domain) = self.active_domain("zoom") else {
            return;
        };
        let offset = self.zoom.step_offset(&domain, delta);
        debug!("Zoom offset for {} -> {}", domain, offset);
        self.apply_zoom_for_domain(&domain);
        self.emit_active_zoom();
    }

    /// Sets the process-wide default zoom (percent, 50–200) and re-applies it everywhere.
    pub fn set_default_zoom_factor(&mut self, percentage: u32) {
        let factor = self.zoom.set_default_factor(percentage_to_factor(percentage));
        info!("Default zoom factor -> {}", factor);
        self.apply_zoom_everywhere();
        self.emit_active_zoom();
    }

    /// Url a tab's surface is showing: its last navigation, or the directory url.
    fn shown_url(&self, tab_id: TabId) -> Option<String> {
        match self.shown_urls.get(&tab_id) {
            Some(url) => Some(url.clone()),
            None => self.directory.get_tab(tab_id).map(|t| t.url.clone()),
        }
    }

    fn shown_tabs(&self) -> Vec<(TabId, String)> {
        self.directory
            .tab_ids()
            .into_iter()
            .filter_map(|tab_id| self.shown_url(tab_id).map(|url| (tab_id, url)))
            .collect()
    }

    fn active_domain(&self, op: &str) -> Option<String> {
        let Some(url) = self.directory.active_tab_id().and_then(|id| self.shown_url(id)) else {
            warn!("{}: no active tab", op);
            return None;
        };
        let domain = domain_of(&url);
        if domain.is_none() {
            debug!("{}: {} has no domain to key zoom on", op, url);
        }
        domain
    }

    fn apply_zoom_for_domain(&mut self, domain: &str) {
        for (tab_id, url) in self.shown_tabs() {
            if domain_of(&url).as_deref() == Some(domain) {
                self.apply_zoom_to(tab_id, &url);
            }
        }
    }

    fn apply_zoom_everywhere(&mut self) {
        for (tab_id, url) in self.shown_tabs() {
            self.apply_zoom_to(tab_id, &url);
        }
    }

    fn apply_zoom_to(&mut self, tab_id: TabId, url: &str) {
        let factor = self.zoom_for_url(url);
        if let Some(surface) = self.registry.surface_mut(tab_id) {
            let (min, max) = surface.zoom_range();
            surface.set_zoom(factor.clamp(min, max));
        }
    }

    fn zoom_for_url(&self, url: &str) -> f64 {
        match domain_of(url) {
            Some(domain) => self.zoom.effective_zoom(&domain),
            None => self.zoom.default_factor(),
        }
    }

    /// Zoom currently applied to a tab's surface, after engine clamping.
    pub fn applied_zoom(&mut self, tab_id: TabId) -> Option<f64> {
        let url = self.shown_url(tab_id)?;
        let factor = self.zoom_for_url(&url);
        let (min, max) = self.registry.surface_mut(tab_id)?.zoom_range();
        Some(factor.clamp(min, max))
    }

    fn emit_active_zoom(&mut self) {
        let percentage = self.active_zoom_percentage();
        self.outbox.push(ShellEvent::ZoomChanged { percentage });
    }

    /// Loads a zoom checkpoint and re-applies it to live surfaces.
    pub fn restore_zoom_offsets(&mut self, entries: Vec<(String, f64)>) {
        self.zoom.restore(entries);
        self.apply_zoom_everywhere();
    }

    // ─── Event pump ───

    /// Drains surface events, flushes due metadata updates and finishes pending closes.
    pub fn tick(&mut self) {
        let now = self.clock.now();
        self.pump_surface_events();
        self.flush_updates(now, false);
        self.service_closing(now);
    }

    /// Flushes every pending metadata update regardless of the coalescing window.
    pub fn flush_pending_updates(&mut self) {
        self.pump_surface_events();
        let now = self.clock.now();
        self.flush_updates(now, true);
    }

    /// Earliest moment `tick` has timed work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        let closes = self.closing.iter().map(|c| c.deadline).min();
        match (self.coalescer.next_deadline(), closes) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn pump_surface_events(&mut self) {
        while let Ok(InboundEvent { tab_id, event }) = self.inbox_rx.try_recv() {
            self.handle_surface_event(tab_id, event);
        }
    }

    fn handle_surface_event(&mut self, tab_id: TabId, event: SurfaceEvent) {
        // Tabs mid-teardown do not exist.
        if !self.directory.contains(tab_id) {
            debug!("Dropping {:?} for closed tab {}", event.kind(), tab_id);
            return;
        }
        let now = self.clock.now();
        match event {
            SurfaceEvent::Navigated { url } => {
                self.shown_urls.insert(tab_id, url.clone());
                self.apply_zoom_to(tab_id, &url);
                self.coalescer.push(tab_id, TabPatch::url(url), now);
            }
            SurfaceEvent::TitleChanged { title } => {
                self.coalescer.push(tab_id, TabPatch::title(title), now);
            }
            SurfaceEvent::FaviconChanged { favicon } => {
                self.coalescer.push(tab_id, TabPatch::favicon(favicon), now);
            }
            SurfaceEvent::LoadStarted => {
                self.coalescer.push(tab_id, TabPatch::loading(true), now);
            }
            SurfaceEvent::LoadFinished => {
                self.coalescer.push(tab_id, TabPatch::loading(false), now);
            }
            SurfaceEvent::LoadFailed { code, description, url } => {
                if code == ERR_ABORTED {
                    debug!("Tab {} load of {} aborted", tab_id, url);
                    return;
                }
                warn!("Tab {} failed to load {}: {} ({})", tab_id, url, description, code);
                self.coalescer.push(tab_id, TabPatch::loading(false), now);
                self.outbox.push(ShellEvent::TabLoadFailed {
                    tab_id,
                    error_code: code,
                    description,
                    url,
                });
            }
            SurfaceEvent::FullscreenRequested { enabled } => {
                debug!("Tab {} requested fullscreen: {}", tab_id, enabled);
                if enabled {
                    self.enter_fullscreen();
                } else {
                    self.leave_fullscreen();
                }
            }
            SurfaceEvent::ProcessGone { details } => {
                error!("Tab {} content process gone: {}", tab_id, details);
                self.coalescer.push(tab_id, TabPatch::loading(false), now);
                self.outbox.push(ShellEvent::TabCrashed { tab_id, details });
            }
            SurfaceEvent::NewWindowRequested { url } => {
                debug!("Tab {} asked to open {}", tab_id, url);
                self.outbox.push(ShellEvent::NewWindowRequested { url });
            }
        }
    }

    fn flush_updates(&mut self, now: Instant, force: bool) {
        let due = if force {
            self.coalescer.drain_all()
        } else {
            self.coalescer.take_due(now)
        };
        if due.is_empty() {
            return;
        }

        let mut any_changed = false;
        for (tab_id, patch) in due {
            let changed = match self.directory.apply_patch(tab_id, &patch) {
                Ok(changed) => changed,
                Err(e) => {
                    debug!("Dropping update: {}", e);
                    continue;
                }
            };
            if changed.is_empty() {
                continue;
            }
            any_changed = true;
            if let Some(url) = changed.url {
                self.outbox.push(ShellEvent::TabNavigated { tab_id, url });
            }
            if let Some(title) = changed.title {
                self.outbox.push(ShellEvent::TabTitleChanged { tab_id, title });
            }
            if let Some(favicon) = changed.favicon {
                self.outbox.push(ShellEvent::TabFaviconChanged { tab_id, favicon });
            }
        }
        if any_changed {
            self.emit_tabs_changed();
            self.session_dirty = true;
        }
    }

    fn service_closing(&mut self, now: Instant) {
        for mut closing in std::mem::take(&mut self.closing) {
            if closing.surface.poll_closed() {
                debug!("Surface for tab {} closed", closing.tab_id);
            } else if now >= closing.deadline {
                warn!("{}; destroying it", SurfaceError::CloseTimeout(closing.tab_id));
                closing.surface.force_destroy();
            } else {
                self.closing.push(closing);
            }
        }
    }

    /// Number of surfaces still shutting down.
    pub fn closing_count(&self) -> usize {
        self.closing.len()
    }

    // ─── Consistency ───

    /// Brings the registry in line with the directory, which is authoritative.
    ///
    /// Returns the number of discrepancies repaired.
    pub fn reconcile(&mut self) -> usize {
        let mut repaired = 0;

        for tab_id in self.registry.content_ids() {
            if !self.directory.contains(tab_id) {
                error!("Orphan surface for tab {}; closing it", tab_id);
                self.shown_urls.remove(&tab_id);
                if let Some(surface) = self.registry.remove_content_surface(tab_id) {
                    self.begin_close(tab_id, surface);
                }
                repaired += 1;
            }
        }

        for tab in self.directory.get_all_tabs().to_vec() {
            if self.registry.contains(tab.id) {
                continue;
            }
            error!("Tab {} has no surface; recreating it", tab.id);
            repaired += 1;
            let recreated = match self.factory.create_surface(&tab.url) {
                Ok(mut surface) => {
                    let subscriptions = self.wire_surface(tab.id, &mut surface);
                    if self.detached {
                        surface.set_input_enabled(false);
                    }
                    self.registry.add_content_surface(tab.id, surface, subscriptions)
                }
                Err(e) => Err(e),
            };
            match recreated {
                Ok(()) => {
                    self.shown_urls.insert(tab.id, tab.url.clone());
                    self.apply_zoom_to(tab.id, &tab.url);
                }
                Err(e) => {
                    error!("Could not recreate surface for tab {}: {}; dropping the tab", tab.id, e);
                    self.coalescer.discard(tab.id);
                    self.shown_urls.remove(&tab.id);
                    if let Err(e) = self.directory.remove_tab(tab.id) {
                        warn!("reconcile: {}", e);
                    }
                }
            }
        }

        if let Some(active) = self.directory.active_tab_id() {
            if self.registry.active_tab() != Some(active) {
                error!("Registry active tab disagrees with directory; resyncing to {}", active);
                self.registry.set_active_tab(active);
                repaired += 1;
            }
        }

        if repaired > 0 {
            self.emit_tabs_changed();
        }
        repaired
    }

    // ─── Commands ───

    /// Dispatches one command. Only tab creation can fail.
    pub fn execute(&mut self, command: Command) -> Result<(), SurfaceError> {
        match command {
            Command::CreateTab { url } => {
                self.create_tab(url.as_deref().unwrap_or(""))?;
            }
            Command::CloseTab { id } => self.close_tab(id),
            Command::CloseActiveTab => match self.active_tab_id() {
                Some(id) => self.close_tab(id),
                None => warn!("close_active_tab: no active tab"),
            },
            Command::SwitchTab { id } => self.switch_tab(id),
            Command::NextTab => self.switch_relative(1),
            Command::PrevTab => self.switch_relative(-1),
            Command::Navigate { id, url } => {
                if let Some(id) = self.target_tab(id, "navigate") {
                    self.navigate(id, &url);
                }
            }
            Command::Reload { id } => {
                if let Some(id) = self.target_tab(id, "reload") {
                    self.reload(id);
                }
            }
            Command::Back { id } => {
                if let Some(id) = self.target_tab(id, "back") {
                    self.back(id);
                }
            }
            Command::Forward { id } => {
                if let Some(id) = self.target_tab(id, "forward") {
                    self.forward(id);
                }
            }
            Command::SetNavBarVisible { visible } => self.set_nav_bar_visible(visible),
            Command::ToggleNavBar => {
                let current = if self.detached {
                    self.nav_before_detached.unwrap_or(true)
                } else {
                    self.show_nav
                };
                self.set_nav_bar_visible(!current);
            }
            Command::WindowResized => self.on_window_resize(),
            Command::EnterFullscreen => self.enter_fullscreen(),
            Command::LeaveFullscreen => self.leave_fullscreen(),
            Command::ToggleFullscreen => {
                if self.is_fullscreen {
                    self.leave_fullscreen();
                } else {
                    self.enter_fullscreen();
                }
            }
            Command::ToggleDetachedMode => self.toggle_detached_mode(),
            Command::SetOverlayMode { mode } => self.set_overlay_mode(mode),
            Command::ZoomIn => self.zoom_in(),
            Command::ZoomOut => self.zoom_out(),
            Command::ZoomReset => self.zoom_reset(),
            Command::SetDefaultZoomFactor { percentage } => self.set_default_zoom_factor(percentage),
        }
        Ok(())
    }

    fn target_tab(&self, id: Option<TabId>, op: &str) -> Option<TabId> {
        let target = id.or(self.directory.active_tab_id());
        if target.is_none() {
            warn!("{}: no tab to act on", op);
        }
        target
    }

    // ─── Session ───

    /// Snapshot of the open tabs for the persistence collaborator.
    pub fn session_snapshot(&self) -> SessionData {
        SessionData {
            tabs: self
                .directory
                .get_all_tabs()
                .iter()
                .map(|t| SessionTab {
                    id: t.id,
                    url: t.url.clone(),
                    title: t.title.clone(),
                    favicon: t.favicon.clone(),
                })
                .collect(),
            active_tab_id: self.directory.active_tab_id(),
            timestamp: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs() as i64,
        }
    }

    /// Recreates the tabs of a saved session. Returns how many came back.
    ///
    /// Tabs whose surface cannot be created are skipped. The saved active tab is
    /// activated when it was restored, otherwise the first restored tab stays active.
    pub fn restore_session(&mut self, session: &SessionData) -> usize {
        let mut restored_active = None;
        let mut restored = 0;

        for saved in &session.tabs {
            let tab_id = match self.open_tab(&saved.url, false, false) {
                Ok(id) => id,
                Err(e) => {
                    warn!("Skipping saved tab {}: {}", saved.url, e);
                    continue;
                }
            };
            restored += 1;
            let patch = TabPatch {
                title: Some(saved.title.clone()),
                favicon: Some(saved.favicon.clone()),
                ..TabPatch::default()
            };
            if let Err(e) = self.directory.apply_patch(tab_id, &patch) {
                warn!("restore_session: {}", e);
            }
            if session.active_tab_id == Some(saved.id) {
                restored_active = Some(tab_id);
            }
        }

        if let Some(tab_id) = restored_active {
            self.switch_tab(tab_id);
        }
        info!("Restored {} of {} saved tabs", restored, session.tabs.len());
        self.emit_tabs_changed();
        restored
    }

    /// True once since the tab list last changed in a way worth saving.
    pub fn take_session_dirty(&mut self) -> bool {
        std::mem::take(&mut self.session_dirty)
    }

    /// Tears down every content surface. Pending graceful closes are not awaited.
    pub fn shutdown(&mut self) {
        self.flush_pending_updates();
        for (tab_id, mut surface) in self.registry.take_all_content() {
            surface.begin_close();
            if !surface.poll_closed() {
                debug!("Destroying surface for tab {} at shutdown", tab_id);
                surface.force_destroy();
            }
        }
        for closing in std::mem::take(&mut self.closing) {
            let mut surface = closing.surface;
            if !surface.poll_closed() {
                surface.force_destroy();
            }
        }
        for tab_id in self.directory.tab_ids() {
            if let Err(e) = self.directory.remove_tab(tab_id) {
                warn!("shutdown: {}", e);
            }
        }
        self.shown_urls.clear();
        info!("Lifecycle manager shut down");
    }

    // ─── Notifications & accessors ───

    fn emit_tabs_changed(&mut self) {
        self.outbox.push(ShellEvent::TabsChanged {
            tabs: self.directory.get_all_tabs().to_vec(),
            active_tab_id: self.directory.active_tab_id(),
        });
    }

    /// Takes every notification emitted since the last call.
    pub fn drain_events(&mut self) -> Vec<ShellEvent> {
        std::mem::take(&mut self.outbox)
    }

    pub fn active_tab_id(&self) -> Option<TabId> {
        self.directory.active_tab_id()
    }

    pub fn tabs(&self) -> &[Tab] {
        self.directory.get_all_tabs()
    }

    pub fn tab(&self, tab_id: TabId) -> Option<&Tab> {
        self.directory.get_tab(tab_id)
    }

    pub fn show_nav(&self) -> bool {
        self.show_nav
    }

    pub fn is_fullscreen(&self) -> bool {
        self.is_fullscreen
    }

    pub fn is_detached(&self) -> bool {
        self.detached
    }

    pub fn overlay_mode(&self) -> OverlayMode {
        self.registry.overlay_mode()
    }

    pub fn registry(&self) -> &SurfaceRegistry<F::Content, F::Panel> {
        &self.registry
    }

    /// Direct registry access that bypasses the directory. Test support only.
    #[doc(hidden)]
    pub fn registry_mut(&mut self) -> &mut SurfaceRegistry<F::Content, F::Panel> {
        &mut self.registry
    }

    pub fn zoom_ledger(&self) -> &ZoomLedger {
        &self.zoom
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    /// Current time on the manager's clock.
    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    /// Zoom of the active tab in percent, or the default when there is none.
    pub fn active_zoom_percentage(&mut self) -> u32 {
        let factor = match self.directory.active_tab_id() {
            Some(tab_id) => self.applied_zoom(tab_id).unwrap_or(self.zoom.default_factor()),
            None => self.zoom.default_factor(),
        };
        zoom_percentage(factor)
    }

    pub fn chrome_mut(&mut self) -> &mut W {
        &mut self.chrome
    }

    /// Navbar panel, for hosts that push notifications into it.
    pub fn navbar_mut(&mut self) -> &mut F::Panel {
        self.registry.navbar_mut()
    }

    pub fn overlay_mut(&mut self) -> &mut F::Panel {
        self.registry.overlay_mut()
    }
}
