use serde::{Deserialize, Serialize};

use super::tab::TabId;

/// Complete session data for save/restore.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SessionData {
    pub tabs: Vec<SessionTab>,
    pub active_tab_id: Option<TabId>,
    pub timestamp: i64,
}

/// A tab's state as stored in a session.
///
/// `id` is the id the tab had when the snapshot was taken; restored tabs get fresh ids.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionTab {
    pub id: TabId,
    pub url: String,
    pub title: String,
    pub favicon: Option<String>,
}
