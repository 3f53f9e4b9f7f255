use serde::Serialize;

use super::layout::OverlayMode;
use super::tab::{Tab, TabId};

/// Navigation aborted by the user or superseded by another load. Not an error.
pub const ERR_ABORTED: i32 = -3;

/// Events raised by a content surface's own execution context.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    Navigated { url: String },
    TitleChanged { title: String },
    FaviconChanged { favicon: Option<String> },
    LoadStarted,
    LoadFinished,
    LoadFailed { code: i32, description: String, url: String },
    FullscreenRequested { enabled: bool },
    ProcessGone { details: String },
    NewWindowRequested { url: String },
}

/// Subscription channel a listener attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceEventKind {
    Navigated,
    TitleChanged,
    FaviconChanged,
    LoadState,
    LoadFailed,
    Fullscreen,
    ProcessGone,
    NewWindow,
}

impl SurfaceEventKind {
    pub const ALL: [SurfaceEventKind; 8] = [
        SurfaceEventKind::Navigated,
        SurfaceEventKind::TitleChanged,
        SurfaceEventKind::FaviconChanged,
        SurfaceEventKind::LoadState,
        SurfaceEventKind::LoadFailed,
        SurfaceEventKind::Fullscreen,
        SurfaceEventKind::ProcessGone,
        SurfaceEventKind::NewWindow,
    ];
}

impl SurfaceEvent {
    pub fn kind(&self) -> SurfaceEventKind {
        match self {
            SurfaceEvent::Navigated { .. } => SurfaceEventKind::Navigated,
            SurfaceEvent::TitleChanged { .. } => SurfaceEventKind::TitleChanged,
            SurfaceEvent::FaviconChanged { .. } => SurfaceEventKind::FaviconChanged,
            SurfaceEvent::LoadStarted | SurfaceEvent::LoadFinished => SurfaceEventKind::LoadState,
            SurfaceEvent::LoadFailed { .. } => SurfaceEventKind::LoadFailed,
            SurfaceEvent::FullscreenRequested { .. } => SurfaceEventKind::Fullscreen,
            SurfaceEvent::ProcessGone { .. } => SurfaceEventKind::ProcessGone,
            SurfaceEvent::NewWindowRequested { .. } => SurfaceEventKind::NewWindow,
        }
    }
}

/// Notifications emitted by the lifecycle manager for panels and the host.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ShellEvent {
    TabsChanged { tabs: Vec<Tab>, active_tab_id: Option<TabId> },
    TabNavigated { tab_id: TabId, url: String },
    TabTitleChanged { tab_id: TabId, title: String },
    TabFaviconChanged { tab_id: TabId, favicon: Option<String> },
    TabLoadFailed { tab_id: TabId, error_code: i32, description: String, url: String },
    TabCrashed { tab_id: TabId, details: String },
    FullscreenEntered,
    FullscreenLeft,
    ZoomChanged { percentage: u32 },
    NavbarVisibilityChanged { visible: bool },
    DetachedModeChanged { detached: bool },
    OverlayModeChanged { mode: OverlayMode },
    NewWindowRequested { url: String },
    /// Ask the navbar to put the caret in its url field.
    FocusAddressBar,
}
