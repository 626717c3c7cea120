//! # Undo/Redo Stack
//!
//! Snapshot history shared by every open tab.
//!
//! ## Design
//!
//! - Each entry is a full serialized tree tagged with the tab it belongs to
//! - A pointer marks the current entry; pushing truncates everything after it
//! - Pushing a state equal to the tab's latest recorded state is ignored
//! - Undo steps the pointer back and restores the *previous state of the
//!   same tab*, so edits in one tab never rewind another
//! - An entry with no earlier entry for its tab is a baseline and is skipped,
//!   as are entries of tabs that have since been closed
//!
//! ## Example
//!
//! ```text
//! entries:  [T1a, T2a, T1b]        pointer → T1b
//! undo   →  restore T1a into tab 1 pointer → T2a
//! redo   →  restore T1b into tab 1 pointer → T1b
//! ```

use crate::workbench::TabId;

/// Default number of retained snapshots
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// One recorded state of one tab
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub tab: TabId,
    pub state: String,
}

/// Undo/redo stack for document editing
#[derive(Debug)]
pub struct UndoStack {
    entries: Vec<HistoryEntry>,

    /// Index of the current entry (meaningless while `entries` is empty)
    pointer: usize,

    /// Maximum number of entries (0 = unlimited)
    max_levels: usize,
}

impl UndoStack {
    /// Create a new undo stack with default max levels (100)
    pub fn new() -> Self {
        Self::with_max_levels(DEFAULT_HISTORY_LIMIT)
    }

    /// Create an undo stack with custom max levels
    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            entries: Vec::new(),
            pointer: 0,
            max_levels,
        }
    }

    /// Record `state` for `tab`; returns false when it was a duplicate
    pub fn push(&mut self, tab: TabId, state: String) -> bool {
        if let Some(latest) = self.latest_for(tab) {
            if latest.state == state {
                return false;
            }
        }

        // New action invalidates the redo tail
        if !self.entries.is_empty() {
            self.entries.truncate(self.pointer + 1);
        }
        self.entries.push(HistoryEntry { tab, state });
        self.pointer = self.entries.len() - 1;

        // Trim if exceeded max levels
        if self.max_levels > 0 && self.entries.len() > self.max_levels {
            self.entries.remove(0);
            self.pointer -= 1;
        }

        true
    }

    /// Step back; returns the tab to restore and the state to restore into it
    pub fn undo(&mut self, is_open: impl Fn(TabId) -> bool) -> Option<(TabId, String)> {
        if self.entries.is_empty() {
            return None;
        }

        while self.pointer > 0 {
            let tab = self.entries[self.pointer].tab;
            let earlier = self.entries[..self.pointer].iter().rposition(|e| e.tab == tab);
            self.pointer -= 1;

            if let Some(index) = earlier {
                if is_open(tab) {
                    return Some((tab, self.entries[index].state.clone()));
                }
            }
        }
        None
    }

    /// Step forward; returns the tab to restore and the state to restore into it
    pub fn redo(&mut self, is_open: impl Fn(TabId) -> bool) -> Option<(TabId, String)> {
        while self.pointer + 1 < self.entries.len() {
            self.pointer += 1;
            let entry = &self.entries[self.pointer];

            if !self.is_baseline(self.pointer) && is_open(entry.tab) {
                return Some((entry.tab, entry.state.clone()));
            }
        }
        None
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty() && (1..=self.pointer).any(|i| !self.is_baseline(i))
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        (self.pointer + 1..self.entries.len()).any(|i| !self.is_baseline(i))
    }

    /// Number of recorded snapshots
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Current entry
    pub fn current(&self) -> Option<&HistoryEntry> {
        self.entries.get(self.pointer)
    }

    /// Clear all undo/redo history
    pub fn clear(&mut self) {
        self.entries.clear();
        self.pointer = 0;
    }

    /// Latest state recorded for `tab` at or before the pointer
    fn latest_for(&self, tab: TabId) -> Option<&HistoryEntry> {
        if self.entries.is_empty() {
            return None;
        }
        self.entries[..=self.pointer].iter().rev().find(|e| e.tab == tab)
    }

    /// No earlier entry exists for the entry's tab
    fn is_baseline(&self, index: usize) -> bool {
        let tab = self.entries[index].tab;
        !self.entries[..index].iter().any(|e| e.tab == tab)
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}
