//! Application configuration schemas.
//!
//! All configuration structs are deserialized from an optional TOML file
//! via the `config` crate, overlaid with `MODHOST__*` environment
//! variables. Every section has defaults, so an empty configuration is
//! valid.

pub mod logging;
pub mod plugin;
pub mod preload;
pub mod settings;

use serde::{Deserialize, Serialize};

use self::logging::LoggingConfig;
use self::plugin::PluginConfig;
use self::preload::PreloadConfig;
use self::settings::SettingsConfig;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// API identity shown in the diagnostic overlay.
    #[serde(default)]
    pub api: ApiConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Plugin discovery settings.
    #[serde(default)]
    pub plugins: PluginConfig,
    /// Preload pass settings.
    #[serde(default)]
    pub preload: PreloadConfig,
    /// Persisted settings location.
    #[serde(default)]
    pub settings: SettingsConfig,
}

/// Identity of the extension layer itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Version string displayed on the first overlay line.
    #[serde(default = "default_api_version")]
    pub version: String,
    /// Whether this API build is the newest known release.
    #[serde(default = "default_true")]
    pub is_current: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            version: default_api_version(),
            is_current: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from an optional TOML file.
    ///
    /// The file is optional; environment variables prefixed with
    /// `MODHOST__` (e.g. `MODHOST__PRELOAD__SETTLE_FRAMES=3`) override it.
    pub fn load(path: Option<&str>) -> Result<Self, AppError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("MODHOST")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

fn default_api_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_true() -> bool {
    true
}
