//! Settings file location.

use serde::{Deserialize, Serialize};

/// Where the persisted settings record lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsConfig {
    /// Path of the JSON settings file. Backups are written next to it
    /// with `.bak` and `.error` suffixes.
    #[serde(default = "default_path")]
    pub path: String,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}

fn default_path() -> String {
    "data/modhost.settings.json".to_string()
}
