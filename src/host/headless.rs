// Floatshell in-memory host
// Every surface, panel and window call is recorded in a shared `HeadlessWorld`
// so callers can inspect what the lifecycle manager did, and inject surface events
// as if a page had produced them. Content surfaces are numbered by creation order
// starting at 1.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use super::{Clock, ContentSurface, Listener, ListenerSlots, Subscription, Surface, SurfaceFactory, WindowChrome};
use crate::types::errors::SurfaceError;
use crate::types::events::{SurfaceEvent, SurfaceEventKind};
use crate::types::geometry::{Rect, Size};
use crate::types::layout::PanelKind;

/// Everything recorded about one surface.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceRecord {
    pub bounds: Rect,
    pub visible: bool,
    pub attached: bool,
    pub focus_count: u32,
    pub raise_count: u32,
    pub url: String,
    pub loads: Vec<String>,
    pub reload_count: u32,
    pub back_count: u32,
    pub forward_count: u32,
    pub zoom: f64,
    pub input_enabled: bool,
    pub close_requested: bool,
    pub closed: bool,
    pub force_destroyed: bool,
}

impl Default for SurfaceRecord {
    fn default() -> Self {
        Self {
            bounds: Rect::ZERO,
            visible: false,
            attached: false,
            focus_count: 0,
            raise_count: 0,
            url: String::new(),
            loads: Vec::new(),
            reload_count: 0,
            back_count: 0,
            forward_count: 0,
            zoom: 1.0,
            input_enabled: true,
            close_requested: false,
            closed: false,
            force_destroyed: false,
        }
    }
}

/// Recorded window chrome state.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowRecord {
    pub size: Size,
    pub platform_buttons_visible: bool,
    pub click_through: bool,
    pub always_on_top: bool,
    pub opacity: f64,
}

struct HeadlessWorld {
    content: BTreeMap<u64, SurfaceRecord>,
    slots: HashMap<u64, ListenerSlots>,
    panels: HashMap<PanelKind, SurfaceRecord>,
    window: WindowRecord,
    next_serial: u64,
    fail_next_create: bool,
    hang_on_close: bool,
    zoom_range: (f64, f64),
}

/// Shared handle onto the recorded world.
#[derive(Clone)]
pub struct HeadlessHost {
    world: Arc<Mutex<HeadlessWorld>>,
}

impl HeadlessHost {
    pub fn new(window_size: Size) -> Self {
        let world = HeadlessWorld {
            content: BTreeMap::new(),
            slots: HashMap::new(),
            panels: HashMap::new(),
            window: WindowRecord {
                size: window_size,
                platform_buttons_visible: true,
                click_through: false,
                always_on_top: false,
                opacity: 1.0,
            },
            next_serial: 0,
            fail_next_create: false,
            hang_on_close: false,
            zoom_range: (0.25, 5.0),
        };
        Self { world: Arc::new(Mutex::new(world)) }
    }

    pub fn factory(&self) -> HeadlessFactory {
        HeadlessFactory { world: self.world.clone() }
    }

    pub fn window(&self) -> HeadlessWindow {
        HeadlessWindow { world: self.world.clone() }
    }

    /// Record of the content surface with the given creation serial.
    pub fn surface(&self, serial: u64) -> Option<SurfaceRecord> {
        self.lock().content.get(&serial).cloned()
    }

    pub fn panel(&self, kind: PanelKind) -> Option<SurfaceRecord> {
        self.lock().panels.get(&kind).cloned()
    }

    pub fn window_record(&self) -> WindowRecord {
        self.lock().window.clone()
    }

    /// Serials of surfaces that exist and have not been closed or destroyed.
    pub fn live_surfaces(&self) -> Vec<u64> {
        self.lock()
            .content
            .iter()
            .filter(|(_, r)| !r.closed && !r.force_destroyed)
            .map(|(serial, _)| *serial)
            .collect()
    }

    /// Serials of live surfaces currently visible.
    pub fn visible_surfaces(&self) -> Vec<u64> {
        self.lock()
            .content
            .iter()
            .filter(|(_, r)| r.visible && !r.closed && !r.force_destroyed)
            .map(|(serial, _)| *serial)
            .collect()
    }

    pub fn listener_count(&self, serial: u64) -> usize {
        let slots = self.lock().slots.get(&serial).cloned();
        slots.map(|s| s.len()).unwrap_or(0)
    }

    /// Fires an event from the surface's execution context. Returns listeners reached.
    pub fn emit(&self, serial: u64, event: SurfaceEvent) -> usize {
        // Emit outside the world lock: listeners may be anything.
        let slots = self.lock().slots.get(&serial).cloned();
        slots.map(|s| s.emit(event)).unwrap_or(0)
    }

    pub fn set_window_size(&self, size: Size) {
        self.lock().window.size = size;
    }

    /// Makes the next `create_surface` call fail.
    pub fn fail_next_create(&self) {
        self.lock().fail_next_create = true;
    }

    /// When set, graceful closes never settle.
    pub fn set_hang_on_close(&self, hang: bool) {
        self.lock().hang_on_close = hang;
    }

    pub fn set_zoom_range(&self, min: f64, max: f64) {
        self.lock().zoom_range = (min, max);
    }

    fn lock(&self) -> MutexGuard<'_, HeadlessWorld> {
        lock_world(&self.world)
    }
}

fn lock_world(world: &Mutex<HeadlessWorld>) -> MutexGuard<'_, HeadlessWorld> {
    match world.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Surface factory over the headless world.
pub struct HeadlessFactory {
    world: Arc<Mutex<HeadlessWorld>>,
}

impl SurfaceFactory for HeadlessFactory {
    type Content = HeadlessSurface;
    type Panel = HeadlessPanel;

    fn create_panel(&mut self, kind: PanelKind) -> Result<HeadlessPanel, SurfaceError> {
        lock_world(&self.world).panels.insert(kind, SurfaceRecord::default());
        Ok(HeadlessPanel { kind, world: self.world.clone() })
    }

    fn create_surface(&mut self, initial_url: &str) -> Result<HeadlessSurface, SurfaceError> {
        let mut world = lock_world(&self.world);
        if world.fail_next_create {
            world.fail_next_create = false;
            return Err(SurfaceError::CreationFailed("headless engine refused".to_string()));
        }
        world.next_serial += 1;
        let serial = world.next_serial;
        let slots = ListenerSlots::new();
        world.slots.insert(serial, slots.clone());
        world.content.insert(
            serial,
            SurfaceRecord {
                url: initial_url.to_string(),
                loads: vec![initial_url.to_string()],
                ..SurfaceRecord::default()
            },
        );
        Ok(HeadlessSurface { serial, world: self.world.clone(), slots })
    }
}

/// A recorded navbar or overlay panel.
pub struct HeadlessPanel {
    kind: PanelKind,
    world: Arc<Mutex<HeadlessWorld>>,
}

impl HeadlessPanel {
    fn with_record(&mut self, f: impl FnOnce(&mut SurfaceRecord)) {
        if let Some(record) = lock_world(&self.world).panels.get_mut(&self.kind) {
            f(record);
        }
    }
}

impl Surface for HeadlessPanel {
    fn set_bounds(&mut self, bounds: Rect) {
        self.with_record(|r| r.bounds = bounds);
    }

    fn set_visible(&mut self, visible: bool) {
        self.with_record(|r| r.visible = visible);
    }

    fn attach(&mut self) {
        self.with_record(|r| r.attached = true);
    }

    fn detach(&mut self) {
        self.with_record(|r| r.attached = false);
    }

    fn raise(&mut self) {
        self.with_record(|r| r.raise_count += 1);
    }

    fn focus(&mut self) {
        self.with_record(|r| r.focus_count += 1);
    }
}

/// A recorded content surface.
pub struct HeadlessSurface {
    serial: u64,
    world: Arc<Mutex<HeadlessWorld>>,
    slots: ListenerSlots,
}

impl HeadlessSurface {
    pub fn serial(&self) -> u64 {
        self.serial
    }

    fn with_record(&mut self, f: impl FnOnce(&mut SurfaceRecord)) {
        if let Some(record) = lock_world(&self.world).content.get_mut(&self.serial) {
            f(record);
        }
    }
}

impl Surface for HeadlessSurface {
    fn set_bounds(&mut self, bounds: Rect) {
        self.with_record(|r| r.bounds = bounds);
    }

    fn set_visible(&mut self, visible: bool) {
        self.with_record(|r| r.visible = visible);
    }

    fn attach(&mut self) {
        self.with_record(|r| r.attached = true);
    }

    fn detach(&mut self) {
        self.with_record(|r| {
            r.attached = false;
            r.visible = false;
        });
    }

    fn raise(&mut self) {
        self.with_record(|r| r.raise_count += 1);
    }

    fn focus(&mut self) {
        self.with_record(|r| r.focus_count += 1);
    }
}

impl ContentSurface for HeadlessSurface {
    fn load_url(&mut self, url: &str) {
        self.with_record(|r| {
            r.url = url.to_string();
            r.loads.push(url.to_string());
        });
    }

    fn reload(&mut self) {
        self.with_record(|r| r.reload_count += 1);
    }

    fn go_back(&mut self) {
        self.with_record(|r| r.back_count += 1);
    }

    fn go_forward(&mut self) {
        self.with_record(|r| r.forward_count += 1);
    }

    fn set_zoom(&mut self, factor: f64) {
        self.with_record(|r| r.zoom = factor);
    }

    fn zoom_range(&self) -> (f64, f64) {
        lock_world(&self.world).zoom_range
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.with_record(|r| r.input_enabled = enabled);
    }

    fn subscribe(&mut self, kind: SurfaceEventKind, listener: Listener) -> Subscription {
        self.slots.subscribe(kind, listener)
    }

    fn begin_close(&mut self) {
        self.with_record(|r| r.close_requested = true);
    }

    fn poll_closed(&mut self) -> bool {
        let mut world = lock_world(&self.world);
        let hang = world.hang_on_close;
        match world.content.get_mut(&self.serial) {
            Some(record) if record.close_requested && !hang => {
                record.closed = true;
                true
            }
            Some(_) => false,
            None => true,
        }
    }

    fn force_destroy(mut self) {
        self.with_record(|r| r.force_destroyed = true);
    }
}

/// Recorded window chrome.
pub struct HeadlessWindow {
    world: Arc<Mutex<HeadlessWorld>>,
}

impl WindowChrome for HeadlessWindow {
    fn set_platform_button_visibility(&mut self, visible: bool) {
        lock_world(&self.world).window.platform_buttons_visible = visible;
    }

    fn set_click_through(&mut self, enabled: bool) {
        lock_world(&self.world).window.click_through = enabled;
    }

    fn window_size(&self) -> Size {
        lock_world(&self.world).window.size
    }

    fn set_always_on_top(&mut self, on_top: bool) {
        lock_world(&self.world).window.always_on_top = on_top;
    }

    fn set_opacity(&mut self, opacity: f64) {
        lock_world(&self.world).window.opacity = opacity;
    }
}

/// Clock that only moves when told to.
#[derive(Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self { now: Arc::new(Mutex::new(Instant::now())) }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = match self.now.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        match self.now.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}
