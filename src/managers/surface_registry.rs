// Floatshell Surface Registry
// Owns the navbar, the overlay and one content surface per tab, and is the single
// source of truth for what is layered into the window and in what order.
//
// Layer stack, bottom to top:
// `[content surfaces..., navbar, overlay?]`
// The active content surface sits at the top of the content band. The overlay is
// only in the stack while its mode is not `None`.

use std::collections::HashMap;

use log::{debug, warn};

use crate::host::{ContentSurface, Surface, SubscriptionSet};
use crate::services::bounds_calculator::{
    calculate_content_bounds, calculate_navbar_bounds, calculate_overlay_bounds,
};
use crate::types::errors::SurfaceError;
use crate::types::geometry::{Rect, Size};
use crate::types::layout::{LayoutMode, OverlayMode};
use crate::types::tab::TabId;

/// Identity of one entry in the layer stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerId {
    Content(TabId),
    Navbar,
    Overlay,
}

struct ContentEntry<C> {
    surface: C,
    visible: bool,
    bounds: Rect,
    subscriptions: SubscriptionSet,
}

struct PanelEntry<P> {
    surface: P,
    visible: bool,
    bounds: Rect,
}

/// Registry of every surface layered into the window.
pub struct SurfaceRegistry<C: ContentSurface, P: Surface> {
    navbar: PanelEntry<P>,
    overlay: PanelEntry<P>,
    content: HashMap<TabId, ContentEntry<C>>,
    layer_stack: Vec<LayerId>,
    active: Option<TabId>,
    window_size: Size,
    layout: LayoutMode,
}

impl<C: ContentSurface, P: Surface> SurfaceRegistry<C, P> {
    /// Takes ownership of the two singleton panels and lays them out for `layout`.
    pub fn new(navbar: P, overlay: P, window_size: Size, layout: LayoutMode) -> Self {
        let mut registry = Self {
            navbar: PanelEntry { surface: navbar, visible: false, bounds: Rect::ZERO },
            overlay: PanelEntry { surface: overlay, visible: false, bounds: Rect::ZERO },
            content: HashMap::new(),
            layer_stack: vec![LayerId::Navbar],
            active: None,
            window_size,
            layout: LayoutMode { overlay_mode: OverlayMode::None, ..layout },
        };
        registry.navbar.surface.attach();
        registry.overlay.surface.detach();
        registry.overlay.surface.set_visible(false);
        registry.sync_navbar(true);
        registry.set_overlay_mode(layout.overlay_mode);
        registry.apply_bounds();
        registry
    }

    /// Registers a content surface for a tab.
    ///
    /// The surface joins the stack above existing content and below the navbar. It is
    /// visible (and active) only if it is the first content surface; otherwise hidden.
    pub fn add_content_surface(
        &mut self,
        tab_id: TabId,
        mut surface: C,
        subscriptions: SubscriptionSet,
    ) -> Result<(), SurfaceError> {
        if self.content.contains_key(&tab_id) {
            warn!("Surface for tab {} already registered; destroying the duplicate", tab_id);
            let mut subscriptions = subscriptions;
            subscriptions.clear();
            surface.force_destroy();
            return Err(SurfaceError::AlreadyRegistered(tab_id));
        }

        let first = self.content.is_empty();
        let bounds = calculate_content_bounds(self.window_size, &self.layout);
        surface.set_bounds(bounds);
        surface.attach();
        surface.set_visible(first);

        let insert_at = self.content_band_top();
        self.layer_stack.insert(insert_at, LayerId::Content(tab_id));
        self.content.insert(
            tab_id,
            ContentEntry { surface, visible: first, bounds, subscriptions },
        );

        if first {
            self.active = Some(tab_id);
            self.raise_panels();
            if let Some(entry) = self.content.get_mut(&tab_id) {
                entry.surface.focus();
            }
        }
        debug!("Registered surface for tab {} (visible: {})", tab_id, first);
        Ok(())
    }

    /// Unregisters a tab's surface and hands it back for closing.
    ///
    /// Order: leave the layer stack, then drop listeners. The caller closes the handle.
    pub fn remove_content_surface(&mut self, tab_id: TabId) -> Option<C> {
        let Some(mut entry) = self.content.remove(&tab_id) else {
            warn!("remove_content_surface: no surface for tab {}", tab_id);
            return None;
        };

        self.layer_stack.retain(|layer| *layer != LayerId::Content(tab_id));
        entry.surface.set_visible(false);
        entry.surface.detach();
        entry.subscriptions.clear();

        if self.active == Some(tab_id) {
            self.active = None;
        }
        debug!("Unregistered surface for tab {}", tab_id);
        Some(entry.surface)
    }

    /// Shows `tab_id` and hides the previously active surface.
    ///
    /// Returns `true` if the active surface changed. Already active is a no-op.
    pub fn set_active_tab(&mut self, tab_id: TabId) -> bool {
        if self.active == Some(tab_id) {
            return false;
        }
        if !self.content.contains_key(&tab_id) {
            warn!("set_active_tab: no surface for tab {}", tab_id);
            return false;
        }

        if let Some(previous) = self.active.and_then(|id| self.content.get_mut(&id)) {
            previous.visible = false;
            previous.surface.set_visible(false);
        }

        self.layer_stack.retain(|layer| *layer != LayerId::Content(tab_id));
        let insert_at = self.content_band_top();
        self.layer_stack.insert(insert_at, LayerId::Content(tab_id));

        if let Some(entry) = self.content.get_mut(&tab_id) {
            entry.surface.raise();
            entry.visible = true;
            entry.surface.set_visible(true);
        }
        self.raise_panels();
        if let Some(entry) = self.content.get_mut(&tab_id) {
            entry.surface.focus();
        }

        self.active = Some(tab_id);
        true
    }

    /// Shows or collapses the navbar and re-lays out every surface.
    pub fn set_navbar_mode(&mut self, visible: bool) {
        if self.layout.navbar_visible == visible {
            return;
        }
        self.layout.navbar_visible = visible;
        self.sync_navbar(false);
        self.apply_bounds();
    }

    /// Attaches the overlay in `mode`, or removes it from the stack for `None`.
    pub fn set_overlay_mode(&mut self, mode: OverlayMode) {
        if self.layout.overlay_mode == mode {
            return;
        }
        let was_attached = self.layout.overlay_mode != OverlayMode::None;
        self.layout.overlay_mode = mode;

        match (was_attached, mode != OverlayMode::None) {
            (false, true) => {
                self.layer_stack.push(LayerId::Overlay);
                self.overlay.surface.attach();
                self.overlay.surface.raise();
                self.overlay.visible = true;
                self.overlay.surface.set_visible(true);
            }
            (true, false) => {
                self.layer_stack.retain(|layer| *layer != LayerId::Overlay);
                self.overlay.visible = false;
                self.overlay.surface.set_visible(false);
                self.overlay.surface.detach();
                self.overlay.bounds = Rect::ZERO;
            }
            _ => {}
        }
        debug!("Overlay mode -> {:?}", mode);
        self.apply_bounds();
    }

    /// Re-applies bounds to every tracked surface, hidden ones included.
    pub fn recompute_all_bounds(&mut self, window_size: Size, layout: LayoutMode) {
        self.window_size = window_size;
        if self.layout.fullscreen != layout.fullscreen || self.layout.navbar_visible != layout.navbar_visible {
            self.layout.fullscreen = layout.fullscreen;
            self.layout.navbar_visible = layout.navbar_visible;
            self.sync_navbar(false);
        }
        if self.layout.overlay_mode != layout.overlay_mode {
            // set_overlay_mode applies bounds itself
            self.set_overlay_mode(layout.overlay_mode);
            return;
        }
        self.apply_bounds();
    }

    /// Unregisters every content surface, leaving only the panels.
    pub fn take_all_content(&mut self) -> Vec<(TabId, C)> {
        let ids: Vec<TabId> = self.content_ids();
        ids.into_iter()
            .filter_map(|id| self.remove_content_surface(id).map(|s| (id, s)))
            .collect()
    }

    pub fn surface_mut(&mut self, tab_id: TabId) -> Option<&mut C> {
        self.content.get_mut(&tab_id).map(|e| &mut e.surface)
    }

    pub fn for_each_content_mut(&mut self, mut f: impl FnMut(TabId, &mut C)) {
        for (id, entry) in self.content.iter_mut() {
            f(*id, &mut entry.surface);
        }
    }

    pub fn contains(&self, tab_id: TabId) -> bool {
        self.content.contains_key(&tab_id)
    }

    /// Content tab ids in layer order, bottom first.
    pub fn content_ids(&self) -> Vec<TabId> {
        self.layer_stack
            .iter()
            .filter_map(|layer| match layer {
                LayerId::Content(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    pub fn content_count(&self) -> usize {
        self.content.len()
    }

    pub fn active_tab(&self) -> Option<TabId> {
        self.active
    }

    pub fn is_visible(&self, tab_id: TabId) -> bool {
        self.content.get(&tab_id).is_some_and(|e| e.visible)
    }

    pub fn visible_content(&self) -> Vec<TabId> {
        self.content_ids().into_iter().filter(|id| self.is_visible(*id)).collect()
    }

    pub fn bounds_of(&self, tab_id: TabId) -> Option<Rect> {
        self.content.get(&tab_id).map(|e| e.bounds)
    }

    pub fn subscription_count(&self, tab_id: TabId) -> usize {
        self.content.get(&tab_id).map(|e| e.subscriptions.len()).unwrap_or(0)
    }

    pub fn navbar_bounds(&self) -> Rect {
        self.navbar.bounds
    }

    pub fn navbar_visible(&self) -> bool {
        self.navbar.visible
    }

    /// Overlay bounds, or `None` while the overlay is out of the stack.
    pub fn overlay_bounds(&self) -> Option<Rect> {
        self.layer_stack.contains(&LayerId::Overlay).then_some(self.overlay.bounds)
    }

    pub fn overlay_mode(&self) -> OverlayMode {
        self.layout.overlay_mode
    }

    pub fn layout(&self) -> LayoutMode {
        self.layout
    }

    pub fn window_size(&self) -> Size {
        self.window_size
    }

    pub fn layer_stack(&self) -> &[LayerId] {
        &self.layer_stack
    }

    pub fn navbar_mut(&mut self) -> &mut P {
        &mut self.navbar.surface
    }

    pub fn overlay_mut(&mut self) -> &mut P {
        &mut self.overlay.surface
    }

    /// Index where the next content layer goes: just under the navbar.
    fn content_band_top(&self) -> usize {
        self.layer_stack
            .iter()
            .position(|layer| *layer == LayerId::Navbar)
            .unwrap_or(self.layer_stack.len())
    }

    fn raise_panels(&mut self) {
        self.navbar.surface.raise();
        if self.layer_stack.contains(&LayerId::Overlay) {
            self.overlay.surface.raise();
        }
    }

    fn sync_navbar(&mut self, force: bool) {
        let shown = self.layout.navbar_shown();
        if force || self.navbar.visible != shown {
            self.navbar.visible = shown;
            self.navbar.surface.set_visible(shown);
        }
    }

    fn apply_bounds(&mut self) {
        let size = self.window_size;
        let layout = self.layout;

        self.navbar.bounds = calculate_navbar_bounds(size, &layout);
        self.navbar.surface.set_bounds(self.navbar.bounds);

        if let Some(bounds) = calculate_overlay_bounds(size, &layout) {
            self.overlay.bounds = bounds;
            self.overlay.surface.set_bounds(bounds);
        }

        let content_bounds = calculate_content_bounds(size, &layout);
        for entry in self.content.values_mut() {
            entry.bounds = content_bounds;
            entry.surface.set_bounds(content_bounds);
        }
    }
}
