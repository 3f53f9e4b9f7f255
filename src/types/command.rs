use serde::{Deserialize, Serialize};

use super::layout::OverlayMode;
use super::tab::TabId;

/// Commands accepted by the lifecycle manager.
///
/// Deserializes from the `{"cmd": "...", ...}` messages the navbar and overlay post.
/// Commands that take an optional `id` act on the active tab when it is absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    CreateTab {
        #[serde(default)]
        url: Option<String>,
    },
    CloseTab { id: TabId },
    CloseActiveTab,
    SwitchTab { id: TabId },
    NextTab,
    PrevTab,
    Navigate {
        #[serde(default)]
        id: Option<TabId>,
        url: String,
    },
    Reload {
        #[serde(default)]
        id: Option<TabId>,
    },
    Back {
        #[serde(default)]
        id: Option<TabId>,
    },
    Forward {
        #[serde(default)]
        id: Option<TabId>,
    },
    SetNavBarVisible { visible: bool },
    ToggleNavBar,
    WindowResized,
    EnterFullscreen,
    LeaveFullscreen,
    ToggleFullscreen,
    ToggleDetachedMode,
    SetOverlayMode { mode: OverlayMode },
    ZoomIn,
    ZoomOut,
    ZoomReset,
    SetDefaultZoomFactor { percentage: u32 },
}
