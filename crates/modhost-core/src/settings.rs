//! Persisted global settings.
//!
//! A small versioned record holding the logging verbosity and the
//! per-plugin enabled flags. The file is rotated to `<path>.bak` before
//! every write; a file that cannot be read back is moved to
//! `<path>.error` and replaced by defaults instead of failing startup.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::error::AppError;
use crate::result::AppResult;

/// Current layout version of the settings record.
pub const SETTINGS_VERSION: u32 = 1;

/// Verbosity stored in the settings record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Per-call tracing of every hook dispatch.
    Fine,
    /// Debug output.
    Debug,
    /// Informational output.
    #[default]
    Info,
    /// Warnings only.
    Warn,
    /// Errors only.
    Error,
}

impl LogLevel {
    /// Returns the `tracing` filter directive for this level.
    pub fn as_filter(&self) -> &'static str {
        match self {
            Self::Fine => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// The persisted settings record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalSettings {
    /// Layout version, see [`SETTINGS_VERSION`].
    pub version: u32,
    /// Logging verbosity.
    #[serde(default)]
    pub logging_level: LogLevel,
    /// Whether log lines are mirrored to the in-host console.
    #[serde(default)]
    pub show_debug_log: bool,
    /// Plugin name → enabled flag.
    #[serde(default)]
    pub plugin_enabled: BTreeMap<String, bool>,
    /// When the record was last written.
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            logging_level: LogLevel::Info,
            show_debug_log: false,
            plugin_enabled: BTreeMap::new(),
            saved_at: None,
        }
    }
}

impl GlobalSettings {
    /// Returns the enabled flag for a plugin, if one was ever recorded.
    pub fn is_enabled(&self, plugin: &str) -> Option<bool> {
        self.plugin_enabled.get(plugin).copied()
    }

    /// Sets the enabled flag for a plugin.
    pub fn set_enabled(&mut self, plugin: &str, enabled: bool) {
        self.plugin_enabled.insert(plugin.to_string(), enabled);
    }

    /// Returns the recorded flag, inserting `true` on first sight.
    pub fn enabled_or_insert(&mut self, plugin: &str) -> bool {
        *self
            .plugin_enabled
            .entry(plugin.to_string())
            .or_insert(true)
    }

    /// Drops flags for plugins not in `known`. Returns the removed names.
    pub fn retain_plugins<'a>(&mut self, known: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        let known: std::collections::HashSet<&str> = known.into_iter().collect();
        let stale: Vec<String> = self
            .plugin_enabled
            .keys()
            .filter(|name| !known.contains(name.as_str()))
            .cloned()
            .collect();
        for name in &stale {
            self.plugin_enabled.remove(name);
        }
        stale
    }
}

/// Reads and writes [`GlobalSettings`] at a fixed path.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    /// Path of the live settings file.
    path: PathBuf,
}

impl SettingsStore {
    /// Creates a store for the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the live settings file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the path the previous file is rotated to before a write.
    pub fn backup_path(&self) -> PathBuf {
        with_suffix(&self.path, "bak")
    }

    /// Returns the path a corrupt file is moved to.
    pub fn error_path(&self) -> PathBuf {
        with_suffix(&self.path, "error")
    }

    /// Loads the settings record.
    ///
    /// Never fails: a missing file yields defaults, and an unreadable,
    /// corrupt or newer-version file is moved aside and replaced by
    /// defaults.
    pub fn load(&self) -> GlobalSettings {
        info!(path = %self.path.display(), "Loading global settings");

        if !self.path.exists() {
            debug!(path = %self.path.display(), "No settings file, using defaults");
            return GlobalSettings::default();
        }

        match self.read() {
            Ok(settings) => settings,
            Err(e) => {
                error!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to load global settings, creating new settings file"
                );
                self.quarantine();
                GlobalSettings::default()
            }
        }
    }

    /// Writes the settings record, rotating the previous file to `.bak`.
    pub fn save(&self, settings: &GlobalSettings) -> AppResult<()> {
        info!(path = %self.path.display(), "Saving global settings");

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let backup = self.backup_path();
        if backup.exists() {
            fs::remove_file(&backup)?;
        }
        if self.path.exists() {
            fs::rename(&self.path, &backup)?;
        }

        let mut record = settings.clone();
        record.version = SETTINGS_VERSION;
        record.saved_at = Some(Utc::now());

        let json = serde_json::to_string_pretty(&record)?;
        fs::write(&self.path, json).map_err(|e| {
            AppError::with_source(
                crate::error::ErrorKind::Persistence,
                format!("Failed to write settings to '{}'", self.path.display()),
                e,
            )
        })
    }

    fn read(&self) -> AppResult<GlobalSettings> {
        let text = fs::read_to_string(&self.path)?;
        let settings: GlobalSettings = serde_json::from_str(&text)?;
        if settings.version > SETTINGS_VERSION {
            return Err(AppError::persistence(format!(
                "settings version {} is newer than supported version {}",
                settings.version, SETTINGS_VERSION
            )));
        }
        Ok(settings)
    }

    fn quarantine(&self) {
        let target = self.error_path();
        if target.exists() {
            if let Err(e) = fs::remove_file(&target) {
                warn!(path = %target.display(), error = %e, "Could not remove old error file");
            }
        }
        if let Err(e) = fs::rename(&self.path, &target) {
            warn!(
                path = %self.path.display(),
                error = %e,
                "Could not move corrupt settings file aside"
            );
        }
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}
