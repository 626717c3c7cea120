use schemaforge_editor::{WorkbenchSettings, DEFAULT_HISTORY_LIMIT};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

pub const DEFAULT_CONFIG_NAME: &str = "schemaforge.config.json";
pub const DEFAULT_STATE_DIR: &str = ".schemaforge";

/// Schemaforge configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Emit the `$schema` declaration in new documents
    pub include_schema_dialect: bool,

    /// Undo stack cap (0 = unlimited)
    pub history_limit: usize,

    /// Pretty-print indentation
    pub indent: usize,

    /// Interpreter used for Pydantic conversion
    pub python: String,

    /// Where the saved workbench lives
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_dir: Option<String>,
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            debug!(path = %config_path.display(), "loaded config");
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn workbench_settings(&self) -> WorkbenchSettings {
        WorkbenchSettings {
            include_schema_dialect: self.include_schema_dialect,
            history_limit: self.history_limit,
        }
    }

    pub fn get_state_dir(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(self.state_dir.as_deref().unwrap_or(DEFAULT_STATE_DIR))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            include_schema_dialect: true,
            history_limit: DEFAULT_HISTORY_LIMIT,
            indent: 2,
            python: "python3".to_string(),
            state_dir: None,
        }
    }
}
