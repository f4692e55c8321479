//! Plugin registry: the plugin contract, discovered records, and the
//! loaded-plugin name/version table.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use modhost_core::error::{AppError, ErrorKind};

use crate::context::PluginContext;
use crate::preload::{PluginPreloads, PreloadRequest};

/// Default load priority; lower values load first.
pub const DEFAULT_LOAD_PRIORITY: i32 = 1;

/// Error returned by a plugin from one of its lifecycle calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct PluginFault(pub String);

impl PluginFault {
    /// Creates a new fault with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<String> for PluginFault {
    fn from(message: String) -> Self {
        Self(message)
    }
}

impl From<&str> for PluginFault {
    fn from(message: &str) -> Self {
        Self(message.to_string())
    }
}

impl From<PluginFault> for AppError {
    fn from(fault: PluginFault) -> Self {
        AppError::new(ErrorKind::Activation, fault.0)
    }
}

/// Trait that all plugins must implement.
pub trait Plugin: Send + Sync + fmt::Debug {
    /// Unique plugin name.
    fn name(&self) -> String;

    /// Plugin version string.
    fn version(&self) -> String;

    /// Load priority (lower = activated first).
    fn load_priority(&self) -> i32 {
        DEFAULT_LOAD_PRIORITY
    }

    /// Scene objects this plugin wants staged before activation.
    fn preload_requests(&self) -> Vec<PreloadRequest> {
        Vec::new()
    }

    /// Activates the plugin. `preloads` is `None` when the plugin requested
    /// nothing or is being re-enabled after a toggle.
    fn initialize(
        &self,
        ctx: &PluginContext,
        preloads: Option<PluginPreloads>,
    ) -> Result<(), PluginFault>;

    /// Whether this is the newest known release of the plugin.
    fn is_current(&self) -> bool {
        true
    }

    /// Returns the togglable view of this plugin, if it supports unloading.
    fn as_togglable(&self) -> Option<&dyn TogglablePlugin> {
        None
    }
}

/// A plugin that can be deactivated at runtime.
pub trait TogglablePlugin: Plugin {
    /// Undoes what `initialize` did. Hook subscriptions owned by the plugin
    /// are dropped by the host afterwards regardless.
    fn unload(&self) -> Result<(), PluginFault>;
}

/// Whether a plugin can be turned off without a restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Stays active for the process lifetime.
    Static,
    /// Supports [`TogglablePlugin::unload`].
    Togglable,
}

/// Discovery index of a plugin, stable for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PluginId(pub usize);

impl fmt::Display for PluginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A discovered plugin instance and its metadata.
#[derive(Debug, Clone)]
pub struct PluginRecord {
    /// Discovery index.
    pub id: PluginId,
    /// Unique name reported by the instance.
    pub name: String,
    /// Version reported by the instance.
    pub version: String,
    /// Declared load priority.
    pub priority: i32,
    /// Static or togglable.
    pub capability: Capability,
    /// Fully qualified name of the exporting type, `::`-separated.
    pub type_name: String,
    /// Where the plugin was found (library path or source label).
    pub location: String,
    /// The live instance.
    pub instance: Arc<dyn Plugin>,
}

impl PluginRecord {
    /// Builds a record from a freshly constructed instance.
    pub fn new(
        id: PluginId,
        instance: Arc<dyn Plugin>,
        type_name: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        let capability = if instance.as_togglable().is_some() {
            Capability::Togglable
        } else {
            Capability::Static
        };
        Self {
            id,
            name: instance.name(),
            version: instance.version(),
            priority: instance.load_priority(),
            capability,
            type_name: type_name.into(),
            location: location.into(),
            instance,
        }
    }

    /// Returns the namespace of the exporting type: everything before the
    /// last `::`, or the whole name when unqualified.
    pub fn namespace(&self) -> &str {
        match self.type_name.rfind("::") {
            Some(index) => &self.type_name[..index],
            None => &self.type_name,
        }
    }

    /// Returns whether the plugin can be unloaded at runtime.
    pub fn is_togglable(&self) -> bool {
        self.capability == Capability::Togglable
    }
}

/// Sorts records by ascending priority, keeping discovery order among ties.
pub fn sort_by_priority(records: &mut [PluginRecord]) {
    records.sort_by_key(|record| record.priority);
}

#[derive(Debug, Default)]
struct LoadedTable {
    /// Names in first-activation order, without duplicates.
    names: Vec<String>,
    /// Name → version.
    versions: HashMap<String, String>,
}

/// Registry of activated plugins.
#[derive(Debug, Default)]
pub struct PluginRegistry {
    loaded: RwLock<LoadedTable>,
}

impl PluginRegistry {
    /// Creates a new empty plugin registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a plugin as loaded. Re-recording overwrites the version but
    /// never duplicates the name.
    pub fn record(&self, name: &str, version: &str) {
        let mut loaded = self.loaded.write();
        let previous = loaded.versions.insert(name.to_string(), version.to_string());
        if previous.is_none() {
            loaded.names.push(name.to_string());
            info!(plugin = %name, version = %version, "Plugin registered");
        } else {
            debug!(plugin = %name, version = %version, "Plugin re-registered");
        }
    }

    /// Removes a plugin from the loaded table. Returns whether it was present.
    pub fn remove(&self, name: &str) -> bool {
        let mut loaded = self.loaded.write();
        if loaded.versions.remove(name).is_none() {
            return false;
        }
        loaded.names.retain(|n| n != name);
        info!(plugin = %name, "Plugin unregistered");
        true
    }

    /// Checks whether a plugin is loaded.
    pub fn is_loaded(&self, name: &str) -> bool {
        self.loaded.read().versions.contains_key(name)
    }

    /// Returns the version of a loaded plugin.
    pub fn version_of(&self, name: &str) -> Option<String> {
        self.loaded.read().versions.get(name).cloned()
    }

    /// Returns loaded plugin names in activation order.
    pub fn loaded_names(&self) -> Vec<String> {
        self.loaded.read().names.clone()
    }

    /// Returns the number of loaded plugins.
    pub fn count(&self) -> usize {
        self.loaded.read().names.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Plain;

    impl Plugin for Plain {
        fn name(&self) -> String {
            "Plain".into()
        }
        fn version(&self) -> String {
            "1.0".into()
        }
        fn initialize(&self, _: &PluginContext, _: Option<PluginPreloads>) -> Result<(), PluginFault> {
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    struct Switchable;

    impl Plugin for Switchable {
        fn name(&self) -> String {
            "Switchable".into()
        }
        fn version(&self) -> String {
            "2.0".into()
        }
        fn load_priority(&self) -> i32 {
            -3
        }
        fn initialize(&self, _: &PluginContext, _: Option<PluginPreloads>) -> Result<(), PluginFault> {
            Ok(())
        }
        fn as_togglable(&self) -> Option<&dyn TogglablePlugin> {
            Some(self)
        }
    }

    impl TogglablePlugin for Switchable {
        fn unload(&self) -> Result<(), PluginFault> {
            Ok(())
        }
    }

    fn record(id: usize, priority: i32, name: &str) -> PluginRecord {
        let mut record = PluginRecord::new(PluginId(id), Arc::new(Plain), "mods::Plain", "test");
        record.priority = priority;
        record.name = name.to_string();
        record
    }

    #[test]
    fn test_record_captures_metadata() {
        let record = PluginRecord::new(
            PluginId(0),
            Arc::new(Switchable),
            "switch_mods::Switchable",
            "libswitch.so",
        );
        assert_eq!(record.name, "Switchable");
        assert_eq!(record.version, "2.0");
        assert_eq!(record.priority, -3);
        assert_eq!(record.capability, Capability::Togglable);
        assert_eq!(record.namespace(), "switch_mods");

        let plain = PluginRecord::new(PluginId(1), Arc::new(Plain), "Plain", "static");
        assert_eq!(plain.capability, Capability::Static);
        assert_eq!(plain.priority, DEFAULT_LOAD_PRIORITY);
        assert_eq!(plain.namespace(), "Plain");
    }

    #[test]
    fn test_sort_by_priority_is_stable() {
        let mut records = vec![record(0, 5, "A"), record(1, 1, "B"), record(2, 3, "C"), record(3, 1, "D")];
        sort_by_priority(&mut records);
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["B", "D", "C", "A"]);
    }

    #[test]
    fn test_record_is_idempotent() {
        let registry = PluginRegistry::new();
        registry.record("Alpha", "1.0");
        registry.record("Beta", "1.0");
        registry.record("Alpha", "1.1");

        assert_eq!(registry.loaded_names(), vec!["Alpha", "Beta"]);
        assert_eq!(registry.version_of("Alpha").as_deref(), Some("1.1"));
        assert_eq!(registry.count(), 2);
    }

    #[test]
    fn test_remove() {
        let registry = PluginRegistry::new();
        registry.record("Alpha", "1.0");
        assert!(registry.remove("Alpha"));
        assert!(!registry.remove("Alpha"));
        assert!(!registry.is_loaded("Alpha"));
        assert!(registry.loaded_names().is_empty());
    }
}
