// Floatshell Update Coalescer
// Pages fire title, favicon, url and loading changes in bursts while loading.
// Patches are merged per tab and released together by a single scheduled flush,
// one window after the first patch of the burst. The final state is never dropped.

use std::time::{Duration, Instant};

use crate::types::tab::{TabId, TabPatch};

#[derive(Debug, Clone)]
pub struct UpdateCoalescer {
    window: Duration,
    pending: Vec<(TabId, TabPatch)>,
    flush_at: Option<Instant>,
}

impl UpdateCoalescer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: Vec::new(),
            flush_at: None,
        }
    }

    /// Merges a patch into the tab's pending update and schedules a flush if none is.
    pub fn push(&mut self, tab_id: TabId, patch: TabPatch, now: Instant) {
        if patch.is_empty() {
            return;
        }
        match self.pending.iter_mut().find(|(id, _)| *id == tab_id) {
            Some((_, pending)) => pending.merge(patch),
            None => self.pending.push((tab_id, patch)),
        }
        if self.flush_at.is_none() {
            self.flush_at = Some(now + self.window);
        }
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.flush_at.is_some_and(|at| now >= at)
    }

    /// Releases every pending patch if the flush deadline has passed.
    pub fn take_due(&mut self, now: Instant) -> Vec<(TabId, TabPatch)> {
        if self.is_due(now) {
            self.drain_all()
        } else {
            Vec::new()
        }
    }

    /// Releases every pending patch immediately.
    pub fn drain_all(&mut self) -> Vec<(TabId, TabPatch)> {
        self.flush_at = None;
        std::mem::take(&mut self.pending)
    }

    /// Drops anything pending for a tab that no longer exists.
    pub fn discard(&mut self, tab_id: TabId) {
        self.pending.retain(|(id, _)| *id != tab_id);
        if self.pending.is_empty() {
            self.flush_at = None;
        }
    }

    /// Forgets a pending url for a tab, keeping its other fields.
    ///
    /// Used when a tab is sent somewhere new before an older navigation flushed.
    pub fn drop_url(&mut self, tab_id: TabId) {
        if let Some((_, pending)) = self.pending.iter_mut().find(|(id, _)| *id == tab_id) {
            pending.url = None;
        }
        self.pending.retain(|(_, patch)| !patch.is_empty());
        if self.pending.is_empty() {
            self.flush_at = None;
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.flush_at
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
