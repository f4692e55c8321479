//! Diagnostic overlay text shown by the host.

use std::fmt::Write as _;

use tracing::{error, warn};

use modhost_core::config::ApiConfig;

use crate::isolation::isolate;
use crate::registry::PluginRecord;

/// Appended to a version that has a newer release.
pub const NEW_VERSION_SUFFIX: &str = " - New Version Available!";

/// Names per overlay line before a namespace list wraps.
const NAMES_PER_LINE: usize = 4;

/// Accumulated error lines and the last rendered overlay.
#[derive(Debug, Default, Clone)]
pub struct Overlay {
    errors: Vec<String>,
    text: String,
}

impl Overlay {
    /// Creates an empty overlay.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an error line.
    pub fn push_error(&mut self, line: impl Into<String>) {
        self.errors.push(line.into());
    }

    /// Adds the standard line for something that failed to load.
    pub fn failed_to_load(&mut self, name: &str) {
        warn!(plugin = %name, "Recording load failure");
        self.push_error(format!("{name}: FAILED TO LOAD! Check the log."));
    }

    /// Error lines so far.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Text produced by the last [`refresh`](Overlay::refresh).
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Re-renders the overlay for the given active plugins.
    ///
    /// Plugins are grouped by namespace in first-seen order. A namespace
    /// with one plugin shows `name : version`; a larger one lists its
    /// plugin names after the namespace, four per line.
    pub fn refresh(&mut self, api: &ApiConfig, plugins: &[&PluginRecord]) {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Modding API: {}{}",
            api.version,
            if api.is_current { "" } else { NEW_VERSION_SUFFIX }
        );
        for error in &self.errors {
            let _ = writeln!(out, "{error}");
        }

        let mut namespaces: Vec<(&str, Vec<&PluginRecord>)> = Vec::new();
        for &plugin in plugins {
            let namespace = plugin.namespace();
            match namespaces.iter_mut().find(|(ns, _)| *ns == namespace) {
                Some((_, members)) => members.push(plugin),
                None => namespaces.push((namespace, vec![plugin])),
            }
        }

        for (namespace, members) in &namespaces {
            match members.as_slice() {
                [] => {}
                [only] => {
                    let _ = writeln!(out, "{} : {}", only.name, version_label(only));
                }
                many => {
                    let _ = write!(out, "{namespace} : ");
                    let last = many.len() - 1;
                    for (i, plugin) in many.iter().enumerate() {
                        out.push_str(&plugin.name);
                        out.push_str(if i == last { "\n" } else { ", " });
                        if (i + 1) % NAMES_PER_LINE == 0 && i < last {
                            out.push_str("\n\t");
                        }
                    }
                }
            }
        }

        self.text = out;
    }
}

fn version_label(plugin: &PluginRecord) -> String {
    let is_current = isolate(|| plugin.instance.is_current()).unwrap_or_else(|e| {
        error!(plugin = %plugin.name, error = %e, "Failed to check plugin version");
        true
    });
    if is_current {
        plugin.version.clone()
    } else {
        format!("{}{}", plugin.version, NEW_VERSION_SUFFIX)
    }
}
