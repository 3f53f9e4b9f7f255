// Floatshell host collaborator contracts
// The lifecycle manager never renders anything itself. It drives surfaces, a window
// and a clock supplied by the host through the traits in this module:
// - `Surface` / `ContentSurface`: a layered rendering surface (navbar, overlay, tab)
// - `SurfaceFactory`: instantiates surfaces
// - `WindowChrome`: platform window decorations and input routing
// - `Clock`: time source, swappable for deterministic tests
//
// `headless` provides an in-memory host used by the demo binary and the tests;
// the `ui` module (feature `gui`) provides the wry/tao host.

pub mod headless;

use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Instant;

use crate::types::errors::SurfaceError;
use crate::types::events::{SurfaceEvent, SurfaceEventKind};
use crate::types::geometry::{Rect, Size};
use crate::types::layout::PanelKind;

/// Callback invoked with events of one subscribed kind.
pub type Listener = Box<dyn FnMut(SurfaceEvent) + Send>;

/// Base operations every layered surface supports.
pub trait Surface {
    fn set_bounds(&mut self, bounds: Rect);
    fn set_visible(&mut self, visible: bool);
    /// Joins the window's visible layer stack.
    fn attach(&mut self);
    /// Leaves the layer stack entirely so the surface cannot receive input.
    fn detach(&mut self);
    /// Moves the surface to the top of its native z-order.
    fn raise(&mut self) {}
    fn focus(&mut self);
}

/// A content tab surface with its own isolated execution context.
pub trait ContentSurface: Surface {
    fn load_url(&mut self, url: &str);
    fn reload(&mut self);
    fn go_back(&mut self);
    fn go_forward(&mut self);
    fn set_zoom(&mut self, factor: f64);
    /// Zoom factors the engine accepts, inclusive.
    fn zoom_range(&self) -> (f64, f64) {
        (0.25, 5.0)
    }
    /// Blocks or restores pointer interaction with the page.
    fn set_input_enabled(&mut self, enabled: bool);
    fn subscribe(&mut self, kind: SurfaceEventKind, listener: Listener) -> Subscription;
    /// Starts the engine's own shutdown sequence.
    fn begin_close(&mut self);
    /// True once the graceful shutdown has settled.
    fn poll_closed(&mut self) -> bool;
    /// Terminates the surface without waiting.
    fn force_destroy(self)
    where
        Self: Sized;
}

/// Instantiates surfaces for the lifecycle manager.
pub trait SurfaceFactory {
    type Content: ContentSurface;
    type Panel: Surface;

    fn create_panel(&mut self, kind: PanelKind) -> Result<Self::Panel, SurfaceError>;
    fn create_surface(&mut self, initial_url: &str) -> Result<Self::Content, SurfaceError>;
}

/// Platform window chrome the lifecycle manager toggles.
pub trait WindowChrome {
    /// Shows or hides the platform's window buttons and decorations.
    fn set_platform_button_visibility(&mut self, visible: bool);
    /// Makes the whole window ignore the mouse.
    fn set_click_through(&mut self, enabled: bool);
    /// Current content size in logical units.
    fn window_size(&self) -> Size;
    fn set_always_on_top(&mut self, _on_top: bool) {}
    fn set_opacity(&mut self, _opacity: f64) {}
}

/// Time source.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Handle returned by `ContentSurface::subscribe`.
///
/// Unsubscribes when dropped or when `unsubscribe` is called.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self { cancel: Some(Box::new(cancel)) }
    }

    /// A subscription with nothing to tear down.
    pub fn noop() -> Self {
        Self { cancel: None }
    }

    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// All subscriptions held for one tab, torn down together.
#[derive(Debug, Default)]
pub struct SubscriptionSet {
    subscriptions: Vec<Subscription>,
}

impl SubscriptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, subscription: Subscription) {
        self.subscriptions.push(subscription);
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    pub fn clear(&mut self) {
        for subscription in self.subscriptions.drain(..) {
            subscription.unsubscribe();
        }
    }
}

struct ListenerEntry {
    id: u64,
    kind: SurfaceEventKind,
    listener: Listener,
}

#[derive(Default)]
struct ListenerTable {
    next_id: u64,
    entries: Vec<ListenerEntry>,
}

/// Listener bookkeeping shared by surface implementations.
///
/// Cloning shares the same table, so an engine callback can hold one clone and emit
/// while the surface hands out subscriptions from another.
#[derive(Clone, Default)]
pub struct ListenerSlots {
    table: Arc<Mutex<ListenerTable>>,
}

impl ListenerSlots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, kind: SurfaceEventKind, listener: Listener) -> Subscription {
        let id = {
            let mut table = lock(&self.table);
            table.next_id += 1;
            let id = table.next_id;
            table.entries.push(ListenerEntry { id, kind, listener });
            id
        };
        let weak: Weak<Mutex<ListenerTable>> = Arc::downgrade(&self.table);
        Subscription::new(move || {
            if let Some(table) = weak.upgrade() {
                lock(&table).entries.retain(|e| e.id != id);
            }
        })
    }

    /// Delivers the event to every listener of its kind. Returns how many received it.
    pub fn emit(&self, event: SurfaceEvent) -> usize {
        let kind = event.kind();
        let mut table = lock(&self.table);
        let mut delivered = 0;
        for entry in table.entries.iter_mut().filter(|e| e.kind == kind) {
            (entry.listener)(event.clone());
            delivered += 1;
        }
        delivered
    }

    pub fn len(&self) -> usize {
        lock(&self.table).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// A panicking listener must not wedge every later emit.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
