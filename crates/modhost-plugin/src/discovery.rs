//! Plugin discovery: turns candidate sources into plugin records.
//!
//! Every candidate publishes a manifest of [`ExportedType`]s. A type
//! qualifies when it carries the plugin capability, is concrete, and has a
//! zero-argument constructor. A failure while reading a candidate's manifest
//! or constructing one of its qualifying types stops that candidate and is
//! reported. Plugins it built before the failure are kept; other candidates
//! are unaffected.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info};

use modhost_core::error::AppError;

use crate::isolation::isolate;
use crate::registry::{Plugin, PluginId, PluginRecord};

/// Zero-argument constructor of an exported plugin type.
pub type PluginConstructor = fn() -> Result<Arc<dyn Plugin>, String>;

/// What an exported type is, as declared by its manifest entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportKind {
    /// Implements the plugin contract directly.
    Plugin,
    /// A plugin specialised over its own settings type.
    SettingsPlugin,
    /// Anything else the library exports.
    Other,
}

/// One entry of a candidate's export manifest.
#[derive(Clone)]
pub struct ExportedType {
    /// Fully qualified type name.
    pub type_name: String,
    /// Declared capability.
    pub kind: ExportKind,
    /// `false` for abstract bases that cannot be instantiated.
    pub is_concrete: bool,
    /// Zero-argument constructor, if the type has one.
    pub constructor: Option<PluginConstructor>,
}

impl fmt::Debug for ExportedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportedType")
            .field("type_name", &self.type_name)
            .field("kind", &self.kind)
            .field("is_concrete", &self.is_concrete)
            .field("has_constructor", &self.constructor.is_some())
            .finish()
    }
}

impl ExportedType {
    /// Manifest entry for a concrete plugin type built with `Default`.
    pub fn plugin<T: Plugin + Default + 'static>() -> Self {
        Self {
            type_name: std::any::type_name::<T>().to_string(),
            kind: ExportKind::Plugin,
            is_concrete: true,
            constructor: Some(construct::<T>),
        }
    }

    /// Manifest entry for a settings-carrying plugin type built with `Default`.
    pub fn settings_plugin<T: Plugin + Default + 'static>() -> Self {
        Self {
            kind: ExportKind::SettingsPlugin,
            ..Self::plugin::<T>()
        }
    }

    /// Manifest entry with an explicit constructor.
    pub fn with_constructor(type_name: impl Into<String>, constructor: PluginConstructor) -> Self {
        Self {
            type_name: type_name.into(),
            kind: ExportKind::Plugin,
            is_concrete: true,
            constructor: Some(constructor),
        }
    }

    /// Manifest entry for a non-plugin type.
    pub fn other(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            kind: ExportKind::Other,
            is_concrete: true,
            constructor: None,
        }
    }

    /// Returns whether this entry should be instantiated as a plugin.
    ///
    /// A concrete plugin type without a constructor still qualifies; it is
    /// reported as an error when discovered.
    pub fn qualifies(&self) -> bool {
        matches!(self.kind, ExportKind::Plugin | ExportKind::SettingsPlugin) && self.is_concrete
    }
}

fn construct<T: Plugin + Default + 'static>() -> Result<Arc<dyn Plugin>, String> {
    Ok(Arc::new(T::default()))
}

/// A candidate unit that may export plugin types.
pub trait PluginSource: Send + Sync + fmt::Debug {
    /// Where the candidate lives; used to tag errors.
    fn location(&self) -> String;

    /// Reads the candidate's export manifest.
    fn exports(&self) -> Result<Vec<ExportedType>, String>;
}

/// An in-process candidate with a fixed manifest.
#[derive(Debug, Clone)]
pub struct StaticSource {
    location: String,
    exports: Vec<ExportedType>,
}

impl StaticSource {
    /// Creates an empty source labelled `location`.
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            exports: Vec::new(),
        }
    }

    /// Adds a manifest entry.
    pub fn with_export(mut self, export: ExportedType) -> Self {
        self.exports.push(export);
        self
    }

    /// Adds a `Default`-constructed plugin type.
    pub fn with_plugin<T: Plugin + Default + 'static>(self) -> Self {
        self.with_export(ExportedType::plugin::<T>())
    }
}

impl PluginSource for StaticSource {
    fn location(&self) -> String {
        self.location.clone()
    }

    fn exports(&self) -> Result<Vec<ExportedType>, String> {
        Ok(self.exports.clone())
    }
}

/// A candidate that could not contribute plugins.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{location}: {reason}")]
pub struct DiscoveryError {
    /// The candidate's location.
    pub location: String,
    /// What went wrong.
    pub reason: String,
}

impl From<DiscoveryError> for AppError {
    fn from(e: DiscoveryError) -> Self {
        AppError::discovery(e.to_string())
    }
}

/// Outcome of a discovery pass.
#[derive(Debug, Default)]
pub struct DiscoveryReport {
    /// Plugins found, in discovery order.
    pub records: Vec<PluginRecord>,
    /// Candidates that failed, fully or partly.
    pub errors: Vec<DiscoveryError>,
}

/// Discovers plugins from every source, in order.
pub fn discover(sources: &[Box<dyn PluginSource>]) -> DiscoveryReport {
    let mut report = DiscoveryReport::default();

    for source in sources {
        let location = source.location();
        debug!(location = %location, "Loading plugins from candidate");

        if let Err(reason) = load_candidate(source.as_ref(), &location, &mut report.records) {
            error!(location = %location, error = %reason, "Error loading plugins from candidate");
            report.errors.push(DiscoveryError { location, reason });
        }
    }

    info!(
        plugins = report.records.len(),
        errors = report.errors.len(),
        "Plugin discovery finished"
    );
    report
}

/// Instantiates the qualifying types of one candidate in manifest order,
/// appending each to `records`. Stops at the first type that fails.
fn load_candidate(
    source: &dyn PluginSource,
    location: &str,
    records: &mut Vec<PluginRecord>,
) -> Result<(), String> {
    let exports = isolate(|| source.exports())??;

    for export in exports {
        if !export.qualifies() {
            debug!(location = %location, type_name = %export.type_name, "Skipping non-plugin export");
            continue;
        }
        let Some(constructor) = export.constructor else {
            return Err(format!(
                "type '{}' has no zero-argument constructor",
                export.type_name
            ));
        };

        let id = PluginId(records.len());
        let record = isolate(|| {
            constructor().map(|instance| {
                PluginRecord::new(id, instance, export.type_name.as_str(), location)
            })
        })
        .and_then(|result| result)
        .map_err(|e| format!("failed to construct '{}': {e}", export.type_name))?;
        info!(
            plugin = %record.name,
            version = %record.version,
            location = %location,
            "Discovered plugin"
        );
        records.push(record);
    }
    Ok(())
}
