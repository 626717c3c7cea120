//! # Schemaforge Editor
//!
//! Editing engine for JSON Schema documents.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ parser: JSON Schema ⇄ editable tree         │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: tabs, mutations, history            │
//! │  - Locate nodes by identity                 │
//! │  - Apply mutations with validation          │
//! │  - Propagate definition renames             │
//! │  - Per-tab snapshot undo/redo               │
//! │  - Persist and migrate open tabs            │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ rendered JSON Schema + identity map         │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Tree is source of truth**: The rendered schema is a derived view
//! 2. **Identities are stable**: A node keeps its id across every edit
//! 3. **Stale edits are harmless**: Unknown ids turn mutations into no-ops
//! 4. **Failures are atomic**: A rejected mutation or import changes nothing
//!
//! ## Usage
//!
//! ```rust,ignore
//! use schemaforge_editor::{Mutation, Workbench, WorkbenchSettings};
//! use schemaforge_parser::SeqSlot;
//!
//! let mut workbench = Workbench::new(WorkbenchSettings::default());
//!
//! // Add a property to the root object
//! let outcome = workbench.apply(&Mutation::AddChild {
//!     parent_id: None,
//!     slot: SeqSlot::Root,
//! })?;
//!
//! // Render
//! let schema = workbench.document().output();
//!
//! // Undo
//! workbench.undo()?;
//! ```

mod document;
mod errors;
pub mod locate;
mod mutations;
pub mod persistence;
mod post_effects;
mod undo_stack;
mod workbench;

pub use document::Document;
pub use errors::EditorError;
pub use locate::{Edge, Found, Location};
pub use mutations::{
    AttributeUpdate, Branch, Direction, DocumentUpdate, Mutation, MutationError, MutationOutcome, MutationResult,
};
pub use persistence::{PersistedState, LEGACY_STATE_KEY, STATE_KEY};
pub use post_effects::{PostEffect, PostEffectEngine, PropagateDefinitionRename, DEFINITIONS_REF_PREFIX};
pub use undo_stack::{HistoryEntry, UndoStack, DEFAULT_HISTORY_LIMIT};
pub use workbench::{Tab, TabId, Workbench, WorkbenchSettings};

// Re-export common types for convenience
pub use schemaforge_parser::{SchemaDocument, SchemaNode};
