// Floatshell Bounds Calculator
// Pure functions from window content size and layout mode to the rectangles of
// the navbar, overlay and content surfaces. No side effects.

use crate::types::geometry::{Rect, Size};
use crate::types::layout::{LayoutMode, OverlayMode};

/// Navbar height when shown.
pub const NAVBAR_HEIGHT: f64 = 38.0;
/// Navbar height when collapsed. The overlay drag strip takes over dragging.
pub const NAVBAR_HIDDEN_HEIGHT: f64 = 0.0;
/// Height of the drag strip overlay.
pub const DRAG_STRIP_HEIGHT: f64 = 15.0;
/// Height of the search strip.
pub const SEARCH_HEIGHT: f64 = 52.0;
pub const SEARCH_MIN_WIDTH: f64 = 280.0;
pub const SEARCH_MAX_WIDTH: f64 = 420.0;
/// Fraction of the window width the search strip prefers.
const SEARCH_WIDTH_RATIO: f64 = 0.4;

/// Effective navbar height for a layout mode.
pub fn navbar_height(layout: &LayoutMode) -> f64 {
    if layout.fullscreen {
        0.0
    } else if layout.navbar_visible {
        NAVBAR_HEIGHT
    } else {
        NAVBAR_HIDDEN_HEIGHT
    }
}

/// Navbar spans the full width at the top of the window.
pub fn calculate_navbar_bounds(window: Size, layout: &LayoutMode) -> Rect {
    let height = navbar_height(layout).min(window.height.max(0.0));
    Rect::new(0.0, 0.0, window.width.max(0.0), height)
}

/// Every content surface gets the space below the navbar.
pub fn calculate_content_bounds(window: Size, layout: &LayoutMode) -> Rect {
    let top = navbar_height(layout).min(window.height.max(0.0));
    Rect::new(
        0.0,
        top,
        window.width.max(0.0),
        (window.height - top).max(0.0),
    )
}

/// Overlay bounds for the layout's overlay mode. `None` yields `None`: the overlay
/// is not part of the layer stack at all.
pub fn calculate_overlay_bounds(window: Size, layout: &LayoutMode) -> Option<Rect> {
    let width = window.width.max(0.0);
    let height = window.height.max(0.0);
    match layout.overlay_mode {
        OverlayMode::None => None,
        OverlayMode::Settings => Some(Rect::new(0.0, 0.0, width, height)),
        OverlayMode::Search => {
            let top = navbar_height(layout).min(height);
            let strip_width = (width * SEARCH_WIDTH_RATIO)
                .clamp(SEARCH_MIN_WIDTH, SEARCH_MAX_WIDTH)
                .min(width);
            let strip_height = SEARCH_HEIGHT.min(height - top);
            Some(Rect::new(width - strip_width, top, strip_width, strip_height))
        }
        OverlayMode::DragStrip => Some(Rect::new(0.0, 0.0, width, DRAG_STRIP_HEIGHT.min(height))),
    }
}
