// Floatshell wry surfaces
// wry child webviews and the tao window behind the host traits.
// Every panel and tab is a child webview of the single floating window. Page
// callbacks run on the event loop thread; they feed `ListenerSlots` and wake the
// loop so the lifecycle manager drains its inbox on the next tick.

use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, warn};
use tao::event_loop::EventLoopProxy;
use tao::window::Window;
use wry::dpi::{LogicalPosition, LogicalSize};
use wry::{PageLoadEvent, WebView, WebViewBuilder};

use super::panels::{input_guard_script, navbar_html, overlay_html, CONTENT_JS};
use super::webview_app::UserEvent;
use crate::host::{ContentSurface, Listener, ListenerSlots, Subscription, Surface, SurfaceFactory, WindowChrome};
use crate::types::errors::SurfaceError;
use crate::types::events::{SurfaceEvent, SurfaceEventKind};
use crate::types::geometry::{Rect, Size};
use crate::types::layout::PanelKind;

fn to_wry_rect(bounds: Rect) -> wry::Rect {
    wry::Rect {
        position: LogicalPosition::new(bounds.x, bounds.y).into(),
        size: LogicalSize::new(bounds.width, bounds.height).into(),
    }
}

fn log_failure(op: &str, result: wry::Result<()>) {
    if let Err(e) = result {
        debug!("webview {} failed: {}", op, e);
    }
}

// ─── Panels ───

/// Navbar or overlay panel. The webview is built on attach and dropped on detach,
/// so a freshly attached overlay stacks above every existing tab.
pub struct WryPanel {
    kind: PanelKind,
    window: Rc<Window>,
    proxy: EventLoopProxy<UserEvent>,
    webview: Option<WebView>,
    bounds: Rect,
    visible: bool,
}

impl WryPanel {
    /// Delivers a notification to the panel page.
    pub fn post(&self, json: &str) {
        if let Some(webview) = &self.webview {
            let script = format!("window.__floatshell && window.__floatshell.receive({})", json);
            log_failure("post", webview.evaluate_script(&script));
        }
    }

    pub fn kind(&self) -> PanelKind {
        self.kind
    }

    fn build(&self) -> wry::Result<WebView> {
        let proxy = self.proxy.clone();
        let kind = self.kind;
        let html = match kind {
            PanelKind::Navbar => navbar_html(),
            PanelKind::Overlay => overlay_html(),
        };
        WebViewBuilder::new()
            .with_html(html)
            .with_bounds(to_wry_rect(self.bounds))
            .with_visible(self.visible)
            .with_transparent(kind == PanelKind::Overlay)
            .with_devtools(cfg!(debug_assertions))
            .with_ipc_handler(move |request: wry::http::Request<String>| {
                let _ = proxy.send_event(UserEvent::Panel { kind, raw: request.body().clone() });
            })
            .build_as_child(&*self.window)
    }
}

impl Surface for WryPanel {
    fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
        if let Some(webview) = &self.webview {
            log_failure("set_bounds", webview.set_bounds(to_wry_rect(bounds)));
        }
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        if let Some(webview) = &self.webview {
            log_failure("set_visible", webview.set_visible(visible));
        }
    }

    fn attach(&mut self) {
        if self.webview.is_some() {
            return;
        }
        match self.build() {
            Ok(webview) => self.webview = Some(webview),
            Err(e) => warn!("Could not build the {:?} panel: {}", self.kind, e),
        }
    }

    fn detach(&mut self) {
        self.webview = None;
    }

    fn focus(&mut self) {
        if let Some(webview) = &self.webview {
            log_failure("focus", webview.focus());
        }
    }
}

// ─── Content ───

#[derive(Default)]
struct CloseState {
    requested: AtomicBool,
    settled: AtomicBool,
}

/// One tab's page.
pub struct WrySurface {
    webview: WebView,
    slots: ListenerSlots,
    close: Arc<CloseState>,
    attached: bool,
    visible: bool,
}

impl Surface for WrySurface {
    fn set_bounds(&mut self, bounds: Rect) {
        log_failure("set_bounds", self.webview.set_bounds(to_wry_rect(bounds)));
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        log_failure("set_visible", self.webview.set_visible(visible && self.attached));
    }

    fn attach(&mut self) {
        self.attached = true;
        log_failure("set_visible", self.webview.set_visible(self.visible));
    }

    fn detach(&mut self) {
        self.attached = false;
        log_failure("set_visible", self.webview.set_visible(false));
    }

    fn focus(&mut self) {
        log_failure("focus", self.webview.focus());
    }
}

impl ContentSurface for WrySurface {
    fn load_url(&mut self, url: &str) {
        log_failure("load_url", self.webview.load_url(url));
    }

    fn reload(&mut self) {
        log_failure("reload", self.webview.evaluate_script("location.reload()"));
    }

    fn go_back(&mut self) {
        log_failure("back", self.webview.evaluate_script("history.back()"));
    }

    fn go_forward(&mut self) {
        log_failure("forward", self.webview.evaluate_script("history.forward()"));
    }

    fn set_zoom(&mut self, factor: f64) {
        log_failure("zoom", self.webview.zoom(factor));
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        log_failure("input guard", self.webview.evaluate_script(&input_guard_script(enabled)));
    }

    fn subscribe(&mut self, kind: SurfaceEventKind, listener: Listener) -> Subscription {
        self.slots.subscribe(kind, listener)
    }

    /// Navigates to `about:blank`; the close settles when that load finishes.
    fn begin_close(&mut self) {
        self.close.requested.store(true, Ordering::SeqCst);
        if let Err(e) = self.webview.load_url("about:blank") {
            debug!("Blanking page failed ({}); closing now", e);
            self.close.settled.store(true, Ordering::SeqCst);
        }
    }

    fn poll_closed(&mut self) -> bool {
        self.close.settled.load(Ordering::SeqCst)
    }

    fn force_destroy(self) {
        drop(self.webview);
    }
}

/// Builds panels and tab webviews inside the floating window.
pub struct WryFactory {
    window: Rc<Window>,
    proxy: EventLoopProxy<UserEvent>,
}

impl WryFactory {
    pub fn new(window: Rc<Window>, proxy: EventLoopProxy<UserEvent>) -> Self {
        Self { window, proxy }
    }
}

/// Page messages sent by [`CONTENT_JS`].
fn handle_content_message(slots: &ListenerSlots, proxy: &EventLoopProxy<UserEvent>, raw: &str) {
    let Ok(message) = serde_json::from_str::<serde_json::Value>(raw) else {
        return;
    };
    match message.get("kind").and_then(|k| k.as_str()) {
        Some("favicon") => {
            let favicon = message.get("href").and_then(|h| h.as_str()).map(str::to_string);
            slots.emit(SurfaceEvent::FaviconChanged { favicon });
        }
        Some("fullscreen") => {
            let enabled = message.get("enabled").and_then(|v| v.as_bool()).unwrap_or(false);
            slots.emit(SurfaceEvent::FullscreenRequested { enabled });
        }
        Some("key") => {
            if let Some(keys) = message.get("keys").and_then(|k| k.as_str()) {
                let _ = proxy.send_event(UserEvent::Key(keys.to_string()));
            }
        }
        _ => debug!("Unknown page message: {}", raw),
    }
}

impl SurfaceFactory for WryFactory {
    type Content = WrySurface;
    type Panel = WryPanel;

    fn create_panel(&mut self, kind: PanelKind) -> Result<WryPanel, SurfaceError> {
        Ok(WryPanel {
            kind,
            window: self.window.clone(),
            proxy: self.proxy.clone(),
            webview: None,
            bounds: Rect::ZERO,
            visible: false,
        })
    }

    fn create_surface(&mut self, initial_url: &str) -> Result<WrySurface, SurfaceError> {
        let slots = ListenerSlots::new();
        let close = Arc::new(CloseState::default());

        let (load_slots, load_close, load_proxy) = (slots.clone(), close.clone(), self.proxy.clone());
        let (title_slots, title_proxy) = (slots.clone(), self.proxy.clone());
        let (ipc_slots, ipc_proxy) = (slots.clone(), self.proxy.clone());
        let (popup_slots, popup_proxy) = (slots.clone(), self.proxy.clone());

        let webview = WebViewBuilder::new()
            .with_url(initial_url)
            .with_visible(false)
            .with_initialization_script(CONTENT_JS)
            .with_devtools(cfg!(debug_assertions))
            .with_on_page_load_handler(move |event, url| {
                if load_close.requested.load(Ordering::SeqCst) {
                    if matches!(event, PageLoadEvent::Finished) && url.starts_with("about:blank") {
                        load_close.settled.store(true, Ordering::SeqCst);
                    }
                    return;
                }
                match event {
                    PageLoadEvent::Started => {
                        load_slots.emit(SurfaceEvent::LoadStarted);
                        load_slots.emit(SurfaceEvent::Navigated { url });
                    }
                    PageLoadEvent::Finished => {
                        load_slots.emit(SurfaceEvent::LoadFinished);
                    }
                }
                let _ = load_proxy.send_event(UserEvent::Wake);
            })
            .with_document_title_changed_handler(move |title| {
                title_slots.emit(SurfaceEvent::TitleChanged { title });
                let _ = title_proxy.send_event(UserEvent::Wake);
            })
            .with_ipc_handler(move |request: wry::http::Request<String>| {
                handle_content_message(&ipc_slots, &ipc_proxy, request.body());
                let _ = ipc_proxy.send_event(UserEvent::Wake);
            })
            .with_new_window_req_handler(move |url, _features| {
                popup_slots.emit(SurfaceEvent::NewWindowRequested { url });
                let _ = popup_proxy.send_event(UserEvent::Wake);
                wry::NewWindowResponse::Deny
            })
            .build_as_child(&*self.window)
            .map_err(|e| SurfaceError::CreationFailed(e.to_string()))?;

        Ok(WrySurface {
            webview,
            slots,
            close,
            attached: false,
            visible: false,
        })
    }
}

// ─── Window ───

/// The floating tao window.
pub struct TaoChrome {
    window: Rc<Window>,
}

impl TaoChrome {
    pub fn new(window: Rc<Window>) -> Self {
        Self { window }
    }
}

impl WindowChrome for TaoChrome {
    fn set_platform_button_visibility(&mut self, visible: bool) {
        self.window.set_decorations(visible);
    }

    fn set_click_through(&mut self, enabled: bool) {
        if let Err(e) = self.window.set_ignore_cursor_events(enabled) {
            warn!("Click-through not supported here: {}", e);
        }
    }

    fn window_size(&self) -> Size {
        let size = self.window.inner_size().to_logical::<f64>(self.window.scale_factor());
        Size::new(size.width, size.height)
    }

    fn set_always_on_top(&mut self, on_top: bool) {
        self.window.set_always_on_top(on_top);
    }

    // tao exposes no window-level alpha.
    fn set_opacity(&mut self, opacity: f64) {
        debug!("Window opacity {} not applied", opacity);
    }
}
