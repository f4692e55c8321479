//! Plugin manager: drives the load session and runtime toggling.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use tracing::{debug, error, info, warn};

use modhost_core::error::AppError;
use modhost_core::result::AppResult;

use crate::activator::{activate, deactivate};
use crate::context::HostContext;
use crate::diagnostics::Overlay;
use crate::discovery::{DiscoveryError, PluginSource, discover};
use crate::host::SceneHost;
use crate::preload;
use crate::registry::{PluginRecord, sort_by_priority};

/// What a load session did.
#[derive(Debug, Default)]
pub struct LoadSummary {
    /// Plugins activated, in activation order.
    pub activated: Vec<String>,
    /// Plugins that failed preloading or activation.
    pub failed: Vec<String>,
    /// Togglable plugins unloaded because they were persisted as disabled.
    pub unloaded: Vec<String>,
    /// Candidates that failed to load, fully or partly.
    pub discovery_errors: Vec<DiscoveryError>,
}

/// Owns the discovered plugins and the diagnostic overlay.
#[derive(Debug)]
pub struct PluginManager {
    ctx: Arc<HostContext>,
    /// Discovered plugins, in discovery order.
    records: RwLock<Vec<PluginRecord>>,
    overlay: RwLock<Overlay>,
    loaded: AtomicBool,
}

impl PluginManager {
    /// Creates a manager bound to a host context.
    pub fn new(ctx: Arc<HostContext>) -> Self {
        Self {
            ctx,
            records: RwLock::new(Vec::new()),
            overlay: RwLock::new(Overlay::new()),
            loaded: AtomicBool::new(false),
        }
    }

    /// Host context.
    pub fn context(&self) -> &Arc<HostContext> {
        &self.ctx
    }

    /// Whether a load session has run.
    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::SeqCst)
    }

    /// Discovered plugins, in discovery order.
    pub fn records(&self) -> Vec<PluginRecord> {
        self.records.read().clone()
    }

    /// Current overlay text.
    pub fn overlay_text(&self) -> String {
        self.overlay.read().text().to_string()
    }

    /// Runs the load session: discovery, preload planning and execution,
    /// activation in priority order, settings cleanup, overlay refresh.
    ///
    /// Only the first call does anything; later calls return an empty
    /// summary.
    pub async fn load_all(
        &self,
        host: &dyn SceneHost,
        sources: &[Box<dyn PluginSource>],
    ) -> AppResult<LoadSummary> {
        if self.loaded.swap(true, Ordering::SeqCst) {
            debug!("Plugins already loaded, skipping load session");
            return Ok(LoadSummary::default());
        }
        info!(candidates = sources.len(), "Trying to load plugins");

        let mut summary = LoadSummary::default();
        let mut overlay = Overlay::new();

        let report = discover(sources);
        for e in &report.errors {
            overlay.failed_to_load(&e.location);
        }
        summary.discovery_errors = report.errors;
        let records = report.records;

        let mut ordered = records.clone();
        sort_by_priority(&mut ordered);

        let manifest = preload::plan(&ordered, &host.known_scenes());
        let mut preloaded = preload::execute(host, &manifest, &self.ctx.config().preload).await;

        for record in &ordered {
            if preloaded.is_failed(record.id) {
                warn!(plugin = %record.name, "Skipping plugin whose preload failed");
                overlay.failed_to_load(&record.name);
                summary.failed.push(record.name.clone());
                continue;
            }
            let slice = preloaded.bundle.take(record.id);
            match activate(&self.ctx, record, slice, false) {
                Ok(()) => summary.activated.push(record.name.clone()),
                Err(e) => {
                    error!(plugin = %record.name, error = %e, "Error activating plugin");
                    overlay.failed_to_load(&record.name);
                    summary.failed.push(record.name.clone());
                }
            }
        }

        let stale = self
            .ctx
            .update_settings(|s| s.retain_plugins(records.iter().map(|r| r.name.as_str())));
        if !stale.is_empty() {
            debug!(plugins = ?stale, "Removed settings of missing plugins");
        }

        let settings = self.ctx.settings();
        for record in &records {
            if settings.is_enabled(&record.name) != Some(false) || !record.is_togglable() {
                continue;
            }
            if let Err(e) = deactivate(&self.ctx, record) {
                error!(plugin = %record.name, error = %e, "Failed to unload disabled plugin");
                continue;
            }
            debug!(plugin = %record.name, "Plugin was unloaded");
            summary.unloaded.push(record.name.clone());
        }

        *self.records.write() = records;
        *self.overlay.write() = overlay;
        self.refresh_overlay();

        if let Err(e) = self.ctx.save_settings() {
            error!(error = %e, "Failed to save settings after load session");
        }

        info!(
            activated = summary.activated.len(),
            failed = summary.failed.len(),
            unloaded = summary.unloaded.len(),
            "Plugin load session finished"
        );
        Ok(summary)
    }

    /// Turns a togglable plugin on or off at runtime.
    ///
    /// Re-enabling initializes the plugin again without preloads.
    pub fn set_enabled(&self, name: &str, enabled: bool) -> AppResult<()> {
        let record = self
            .records
            .read()
            .iter()
            .find(|r| r.name == name)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Plugin '{name}' not found")))?;
        if !record.is_togglable() {
            return Err(AppError::plugin(format!("Plugin '{name}' cannot be toggled")));
        }

        let loaded = self.ctx.plugins().is_loaded(name);
        let result = match (enabled, loaded) {
            (true, true) => {
                debug!(plugin = %name, "Plugin already enabled");
                Ok(())
            }
            (true, false) => activate(&self.ctx, &record, None, true).inspect_err(|e| {
                error!(plugin = %name, error = %e, "Error re-enabling plugin");
                self.overlay.write().failed_to_load(name);
            }),
            (false, true) => deactivate(&self.ctx, &record),
            (false, false) => {
                self.ctx.update_settings(|s| s.set_enabled(name, false));
                Ok(())
            }
        };

        self.refresh_overlay();
        result
    }

    fn refresh_overlay(&self) {
        let settings = self.ctx.settings();
        let records = self.records.read();
        let active: Vec<&PluginRecord> = records
            .iter()
            .filter(|r| settings.is_enabled(&r.name) == Some(true))
            .filter(|r| self.ctx.plugins().is_loaded(&r.name))
            .collect();
        self.overlay.write().refresh(&self.ctx.config().api, &active);
    }
}
