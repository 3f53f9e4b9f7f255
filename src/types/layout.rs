use serde::{Deserialize, Serialize};

/// What the overlay surface is currently showing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OverlayMode {
    /// Overlay is detached from the layer stack.
    #[default]
    None,
    Settings,
    Search,
    /// Thin strip that keeps the window draggable while the navbar is collapsed.
    DragStrip,
}

/// User-opened overlay panels. Mutually exclusive.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum OverlayPanel {
    Settings,
    Search,
}

impl From<OverlayPanel> for OverlayMode {
    fn from(panel: OverlayPanel) -> Self {
        match panel {
            OverlayPanel::Settings => OverlayMode::Settings,
            OverlayPanel::Search => OverlayMode::Search,
        }
    }
}

/// Derived layout inputs for the bounds calculator. Never stored as state of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayoutMode {
    pub fullscreen: bool,
    pub navbar_visible: bool,
    pub overlay_mode: OverlayMode,
}

impl LayoutMode {
    /// Fullscreen collapses the navbar no matter what the preference says.
    pub fn navbar_shown(&self) -> bool {
        self.navbar_visible && !self.fullscreen
    }
}

/// The two singleton chrome surfaces.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum PanelKind {
    Navbar,
    Overlay,
}
