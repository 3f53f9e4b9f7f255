// Floatshell Tab Directory
// Ordered tab metadata and the active tab. Ids are allocated here and never reused.

use crate::types::errors::TabError;
use crate::types::tab::{Tab, TabId, TabPatch};

/// Trait defining the tab directory interface.
pub trait TabDirectoryTrait {
    fn allocate_id(&mut self) -> TabId;
    fn insert_tab(&mut self, tab: Tab, activate: bool) -> Result<(), TabError>;
    fn remove_tab(&mut self, tab_id: TabId) -> Result<Tab, TabError>;
    fn set_active(&mut self, tab_id: TabId) -> Result<(), TabError>;
    fn apply_patch(&mut self, tab_id: TabId, patch: &TabPatch) -> Result<TabPatch, TabError>;
    fn get_tab(&self, tab_id: TabId) -> Option<&Tab>;
    fn get_all_tabs(&self) -> &[Tab];
    fn get_active_tab(&self) -> Option<&Tab>;
    fn active_tab_id(&self) -> Option<TabId>;
    fn index_of(&self, tab_id: TabId) -> Option<usize>;
    fn relative_tab(&self, offset: isize) -> Option<TabId>;
    fn tab_count(&self) -> usize;
}

/// Ordered list of tab metadata. The sole mutator of tab metadata.
#[derive(Debug, Clone)]
pub struct TabDirectory {
    tabs: Vec<Tab>,
    active_tab_id: Option<TabId>,
    next_id: TabId,
}

impl TabDirectory {
    pub fn new() -> Self {
        Self {
            tabs: Vec::new(),
            active_tab_id: None,
            next_id: 1,
        }
    }

    pub fn contains(&self, tab_id: TabId) -> bool {
        self.index_of(tab_id).is_some()
    }

    pub fn tab_ids(&self) -> Vec<TabId> {
        self.tabs.iter().map(|t| t.id).collect()
    }
}

impl Default for TabDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl TabDirectoryTrait for TabDirectory {
    /// Reserves the next id. Ids are never reused within a process.
    fn allocate_id(&mut self) -> TabId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Appends a tab. The first tab always becomes active.
    fn insert_tab(&mut self, tab: Tab, activate: bool) -> Result<(), TabError> {
        if self.contains(tab.id) {
            return Err(TabError::AlreadyExists(tab.id));
        }
        let id = tab.id;
        if id >= self.next_id {
            self.next_id = id + 1;
        }
        self.tabs.push(tab);
        if activate || self.active_tab_id.is_none() {
            self.active_tab_id = Some(id);
        }
        Ok(())
    }

    /// Removes a tab. If it was active, the tab that slides into its index takes over,
    /// clamped to the end of the list; no tabs left means no active tab.
    fn remove_tab(&mut self, tab_id: TabId) -> Result<Tab, TabError> {
        let index = self.index_of(tab_id).ok_or(TabError::NotFound(tab_id))?;
        let tab = self.tabs.remove(index);

        if self.active_tab_id == Some(tab_id) {
            self.active_tab_id = if self.tabs.is_empty() {
                None
            } else {
                Some(self.tabs[index.min(self.tabs.len() - 1)].id)
            };
        }
        Ok(tab)
    }

    fn set_active(&mut self, tab_id: TabId) -> Result<(), TabError> {
        if !self.contains(tab_id) {
            return Err(TabError::NotFound(tab_id));
        }
        self.active_tab_id = Some(tab_id);
        Ok(())
    }

    /// Applies a patch and returns only the fields that actually changed.
    fn apply_patch(&mut self, tab_id: TabId, patch: &TabPatch) -> Result<TabPatch, TabError> {
        let tab = self
            .tabs
            .iter_mut()
            .find(|t| t.id == tab_id)
            .ok_or(TabError::NotFound(tab_id))?;

        let mut changed = TabPatch::default();
        if let Some(url) = &patch.url {
            if &tab.url != url {
                tab.url = url.clone();
                changed.url = Some(url.clone());
            }
        }
        if let Some(title) = &patch.title {
            if &tab.title != title {
                tab.title = title.clone();
                changed.title = Some(title.clone());
            }
        }
        if let Some(favicon) = &patch.favicon {
            if &tab.favicon != favicon {
                tab.favicon = favicon.clone();
                changed.favicon = Some(favicon.clone());
            }
        }
        if let Some(loading) = patch.loading {
            if tab.loading != loading {
                tab.loading = loading;
                changed.loading = Some(loading);
            }
        }
        Ok(changed)
    }

    fn get_tab(&self, tab_id: TabId) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.id == tab_id)
    }

    fn get_all_tabs(&self) -> &[Tab] {
        &self.tabs
    }

    fn get_active_tab(&self) -> Option<&Tab> {
        self.active_tab_id.and_then(|id| self.get_tab(id))
    }

    fn active_tab_id(&self) -> Option<TabId> {
        self.active_tab_id
    }

    fn index_of(&self, tab_id: TabId) -> Option<usize> {
        self.tabs.iter().position(|t| t.id == tab_id)
    }

    /// Tab `offset` positions away from the active one, wrapping around.
    fn relative_tab(&self, offset: isize) -> Option<TabId> {
        let active = self.active_tab_id?;
        let index = self.index_of(active)? as isize;
        let len = self.tabs.len() as isize;
        let target = (index + offset).rem_euclid(len);
        Some(self.tabs[target as usize].id)
    }

    fn tab_count(&self) -> usize {
        self.tabs.len()
    }
}
