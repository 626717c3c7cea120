//! Saving and restoring the set of open tabs.
//!
//! State lives under [`STATE_KEY`] as `{schemas, activeSchemaIndex}`.
//! Stores written before tabs existed hold a single document under
//! [`LEGACY_STATE_KEY`]; it is migrated on first load. Boolean exclusive
//! bounds from either format are upgraded to numeric ones while loading.

use crate::EditorError;
use schemaforge_common::StateStore;
use schemaforge_parser::{upgrade_stored_bounds, SchemaDocument};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

pub const STATE_KEY: &str = "jsonSchemaBuilderState_v2";
pub const LEGACY_STATE_KEY: &str = "jsonSchemaBuilderState";

/// Everything needed to reopen the workbench
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    #[serde(default)]
    pub schemas: Vec<SchemaDocument>,
    #[serde(rename = "activeSchemaIndex", default)]
    pub active_index: usize,
}

/// Read saved state, migrating the single-document format if needed
pub fn load_state<S: StateStore>(store: &mut S) -> Result<Option<PersistedState>, EditorError> {
    if let Some(mut raw) = store.load::<Value>(STATE_KEY)? {
        if let Some(schemas) = raw.get_mut("schemas") {
            upgrade_stored_bounds(schemas);
        }
        return Ok(Some(serde_json::from_value(raw)?));
    }

    let Some(raw) = store.load::<Value>(LEGACY_STATE_KEY)? else {
        return Ok(None);
    };
    let legacy = SchemaDocument::from_stored(raw)?;

    let state = PersistedState {
        schemas: vec![legacy],
        active_index: 0,
    };
    store.save(STATE_KEY, &state)?;
    store.remove(LEGACY_STATE_KEY)?;
    info!("migrated single-document state to tabbed format");

    Ok(Some(state))
}

pub fn save_state<S: StateStore>(store: &mut S, state: &PersistedState) -> Result<(), EditorError> {
    store.save(STATE_KEY, state)?;
    Ok(())
}

/// Forget saved state in both formats
pub fn clear_state<S: StateStore>(store: &mut S) -> Result<(), EditorError> {
    store.remove(STATE_KEY)?;
    store.remove(LEGACY_STATE_KEY)?;
    Ok(())
}
