//! # Workbench
//!
//! The set of open schema tabs, the active one, and the history shared by
//! all of them.
//!
//! Structural mutations are committed to the history as soon as they are
//! applied. Plain attribute edits are committed by the caller once the edit
//! is finished (the renderer does it on blur), so typing a word does not
//! produce one undo step per keystroke.

use crate::document::Document;
use crate::mutations::{DocumentUpdate, Mutation, MutationOutcome};
use crate::persistence::{self, PersistedState};
use crate::undo_stack::{UndoStack, DEFAULT_HISTORY_LIMIT};
use crate::EditorError;
use schemaforge_common::StateStore;
use schemaforge_parser::{parse_document_str, SchemaDocument, IMPORTED_TITLE};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

/// Stable identity of a tab for its whole lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TabId(pub u64);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tab-{}", self.0)
    }
}

/// One open document
#[derive(Debug)]
pub struct Tab {
    pub id: TabId,
    pub document: Document,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkbenchSettings {
    /// Whether new documents emit `$schema`
    pub include_schema_dialect: bool,

    /// Retained history snapshots (0 = unlimited)
    pub history_limit: usize,
}

impl Default for WorkbenchSettings {
    fn default() -> Self {
        Self {
            include_schema_dialect: true,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

/// Editing state for every open tab
#[derive(Debug)]
pub struct Workbench {
    tabs: Vec<Tab>,
    active: usize,
    next_tab: u64,
    history: UndoStack,
    settings: WorkbenchSettings,
}

impl Workbench {
    /// One fresh default tab
    pub fn new(settings: WorkbenchSettings) -> Self {
        let schema = new_schema(&settings);
        Self::with_documents(vec![schema], 0, settings)
    }

    /// Open `schemas` as tabs; an empty list yields one default tab
    pub fn with_documents(schemas: Vec<SchemaDocument>, active: usize, settings: WorkbenchSettings) -> Self {
        let schemas = if schemas.is_empty() {
            vec![new_schema(&settings)]
        } else {
            schemas
        };

        let mut workbench = Self {
            tabs: Vec::with_capacity(schemas.len()),
            active: 0,
            next_tab: 0,
            history: UndoStack::with_max_levels(settings.history_limit),
            settings,
        };
        for schema in schemas {
            let id = workbench.allocate_tab();
            workbench.tabs.push(Tab {
                id,
                document: Document::new(schema),
            });
        }
        // every tab gets a baseline so its first edit can be undone
        for index in 0..workbench.tabs.len() {
            workbench.active = index;
            workbench.commit();
        }
        workbench.active = active.min(workbench.tabs.len() - 1);
        workbench
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active(&self) -> &Tab {
        &self.tabs[self.active]
    }

    pub fn document(&self) -> &Document {
        &self.active().document
    }

    pub fn settings(&self) -> &WorkbenchSettings {
        &self.settings
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    /// Open a new default tab and make it active
    pub fn add_tab(&mut self) -> TabId {
        let mut schema = new_schema(&self.settings);
        schema.title = format!("Schema {}", self.tabs.len() + 1);

        let id = self.allocate_tab();
        self.tabs.push(Tab {
            id,
            document: Document::new(schema),
        });
        self.active = self.tabs.len() - 1;
        self.commit();
        debug!(tab = %id, "opened tab");
        id
    }

    /// Close the tab at `index`; the last tab can never be closed
    pub fn close_tab(&mut self, index: usize) -> Result<(), EditorError> {
        if index >= self.tabs.len() {
            return Err(EditorError::TabOutOfRange {
                index,
                len: self.tabs.len(),
            });
        }
        if self.tabs.len() == 1 {
            return Err(EditorError::LastTab);
        }

        let closed = self.tabs.remove(index);
        if index <= self.active && self.active > 0 {
            self.active -= 1;
        }
        debug!(tab = %closed.id, "closed tab");
        Ok(())
    }

    /// Switch tabs; out-of-range indices are ignored
    pub fn activate(&mut self, index: usize) -> bool {
        if index >= self.tabs.len() {
            return false;
        }
        self.active = index;
        true
    }

    /// Apply a mutation to the active tab
    pub fn apply(&mut self, mutation: &Mutation) -> Result<MutationOutcome, EditorError> {
        let outcome = self.tabs[self.active].document.apply(mutation)?;
        if outcome.is_structural() {
            self.commit();
        }
        Ok(outcome)
    }

    /// Record the active tab's current state in the history
    pub fn commit(&mut self) -> bool {
        let tab = self.active();
        match tab.document.snapshot() {
            Ok(state) => {
                let id = tab.id;
                self.history.push(id, state)
            }
            Err(e) => {
                warn!(error = %e, "could not snapshot tab");
                false
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo(&mut self) -> Result<bool, EditorError> {
        let tabs = &self.tabs;
        let step = self.history.undo(|id| tabs.iter().any(|t| t.id == id));
        self.restore(step)
    }

    pub fn redo(&mut self) -> Result<bool, EditorError> {
        let tabs = &self.tabs;
        let step = self.history.redo(|id| tabs.iter().any(|t| t.id == id));
        self.restore(step)
    }

    /// Replace the active tab with an imported JSON Schema text
    ///
    /// Nothing changes when the text fails to parse. An untitled schema
    /// gets [`IMPORTED_TITLE`] for its tab.
    pub fn import_document(&mut self, source: &str) -> Result<(), EditorError> {
        let ids = self.document().schema().ids;
        let mut parsed = parse_document_str(source, ids)?;
        if parsed.value.title.is_empty() {
            parsed.value.title = IMPORTED_TITLE.to_string();
        }

        self.tabs[self.active].document.replace(parsed.value);
        self.commit();
        info!(warnings = parsed.warnings.len(), "imported schema document");
        Ok(())
    }

    /// Reset the active tab, keeping its root kind
    pub fn clear_active(&mut self) -> Result<MutationOutcome, EditorError> {
        self.apply(&Mutation::UpdateDocument {
            update: DocumentUpdate::Clear,
        })
    }

    /// Reopen saved tabs, or start fresh when nothing was saved
    pub fn load<S: StateStore>(store: &mut S, settings: WorkbenchSettings) -> Result<Self, EditorError> {
        match persistence::load_state(store)? {
            Some(state) => {
                info!(tabs = state.schemas.len(), "restored workbench");
                Ok(Self::with_documents(state.schemas, state.active_index, settings))
            }
            None => Ok(Self::new(settings)),
        }
    }

    pub fn save<S: StateStore>(&self, store: &mut S) -> Result<(), EditorError> {
        let state = PersistedState {
            schemas: self.tabs.iter().map(|t| t.document.schema().clone()).collect(),
            active_index: self.active,
        };
        persistence::save_state(store, &state)
    }

    /// Forget saved state and start over with one default tab
    pub fn reset<S: StateStore>(&mut self, store: &mut S) -> Result<(), EditorError> {
        persistence::clear_state(store)?;
        *self = Self::new(self.settings.clone());
        Ok(())
    }

    fn restore(&mut self, step: Option<(TabId, String)>) -> Result<bool, EditorError> {
        let Some((id, state)) = step else {
            return Ok(false);
        };
        let Some(tab) = self.tabs.iter_mut().find(|t| t.id == id) else {
            return Ok(false);
        };
        tab.document.restore(&state)?;
        debug!(tab = %id, "restored snapshot");
        Ok(true)
    }

    fn allocate_tab(&mut self) -> TabId {
        let id = TabId(self.next_tab);
        self.next_tab += 1;
        id
    }
}

fn new_schema(settings: &WorkbenchSettings) -> SchemaDocument {
    let mut schema = SchemaDocument::default();
    schema.include_schema_dialect = settings.include_schema_dialect;
    schema
}
