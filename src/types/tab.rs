use serde::{Deserialize, Serialize};

/// Process-lifetime tab identifier. Allocated monotonically, never reused.
pub type TabId = u64;

/// Title shown until the page reports its own.
pub const DEFAULT_TAB_TITLE: &str = "New Tab";

/// Represents a browser tab with its current metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tab {
    pub id: TabId,
    pub url: String,
    pub title: String,
    pub favicon: Option<String>,
    pub loading: bool,
}

impl Tab {
    pub fn new(id: TabId, url: &str) -> Self {
        Self {
            id,
            url: url.to_string(),
            title: DEFAULT_TAB_TITLE.to_string(),
            favicon: None,
            loading: false,
        }
    }
}

/// A partial metadata update for one tab.
///
/// `favicon` is doubly optional: `None` leaves it untouched, `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabPatch {
    pub url: Option<String>,
    pub title: Option<String>,
    pub favicon: Option<Option<String>>,
    pub loading: Option<bool>,
}

impl TabPatch {
    pub fn url(url: impl Into<String>) -> Self {
        Self { url: Some(url.into()), ..Self::default() }
    }

    pub fn title(title: impl Into<String>) -> Self {
        Self { title: Some(title.into()), ..Self::default() }
    }

    pub fn favicon(favicon: Option<String>) -> Self {
        Self { favicon: Some(favicon), ..Self::default() }
    }

    pub fn loading(loading: bool) -> Self {
        Self { loading: Some(loading), ..Self::default() }
    }

    /// Folds a newer patch into this one; later fields win.
    pub fn merge(&mut self, newer: TabPatch) {
        if newer.url.is_some() {
            self.url = newer.url;
        }
        if newer.title.is_some() {
            self.title = newer.title;
        }
        if newer.favicon.is_some() {
            self.favicon = newer.favicon;
        }
        if newer.loading.is_some() {
            self.loading = newer.loading;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.url.is_none() && self.title.is_none() && self.favicon.is_none() && self.loading.is_none()
    }
}
