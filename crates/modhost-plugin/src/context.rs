//! Host context: the process-wide state shared by every component, and
//! the narrower view handed to plugins.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use modhost_core::config::AppConfig;
use modhost_core::result::AppResult;
use modhost_core::settings::{GlobalSettings, SettingsStore};

use crate::hooks::HookRegistry;
use crate::registry::PluginRegistry;

/// Owns the hook registry, the loaded-plugin table, and the persisted
/// settings for the whole process run.
#[derive(Debug)]
pub struct HostContext {
    config: AppConfig,
    hooks: Arc<HookRegistry>,
    plugins: Arc<PluginRegistry>,
    settings: RwLock<GlobalSettings>,
    store: SettingsStore,
}

impl HostContext {
    /// Creates the context and loads the persisted settings.
    pub fn init(config: AppConfig) -> Arc<Self> {
        let store = SettingsStore::new(&config.settings.path);
        let settings = store.load();
        info!(
            api_version = %config.api.version,
            settings = %store.path().display(),
            "Host context initialized"
        );
        Arc::new(Self {
            config,
            hooks: Arc::new(HookRegistry::new()),
            plugins: Arc::new(PluginRegistry::new()),
            settings: RwLock::new(settings),
            store,
        })
    }

    /// Application configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Hook registry.
    pub fn hooks(&self) -> &Arc<HookRegistry> {
        &self.hooks
    }

    /// Loaded-plugin table.
    pub fn plugins(&self) -> &Arc<PluginRegistry> {
        &self.plugins
    }

    /// Snapshot of the current settings.
    pub fn settings(&self) -> GlobalSettings {
        self.settings.read().clone()
    }

    /// Mutates the settings in place. The closure must not call back into
    /// the context.
    pub fn update_settings<T>(&self, f: impl FnOnce(&mut GlobalSettings) -> T) -> T {
        f(&mut self.settings.write())
    }

    /// Writes the settings to disk.
    pub fn save_settings(&self) -> AppResult<()> {
        let snapshot = self.settings();
        self.store.save(&snapshot)
    }

    /// Builds the context handed to a plugin.
    pub fn plugin_context(&self, owner: &str) -> PluginContext {
        PluginContext {
            owner: owner.to_string(),
            api_version: self.config.api.version.clone(),
            hooks: Arc::clone(&self.hooks),
            plugins: Arc::clone(&self.plugins),
        }
    }

    /// Notifies subscribers that the application is quitting, then saves
    /// the settings.
    pub fn shutdown(&self) -> AppResult<()> {
        debug!("Dispatching application quit");
        self.hooks.application_quit.dispatch(&(), ());
        self.save_settings()?;
        info!("Host context shut down");
        Ok(())
    }
}

/// What a plugin sees of the host.
#[derive(Debug, Clone)]
pub struct PluginContext {
    owner: String,
    api_version: String,
    hooks: Arc<HookRegistry>,
    plugins: Arc<PluginRegistry>,
}

impl PluginContext {
    /// Name of the plugin this context belongs to. Use it as the owner
    /// when subscribing so the host can drop the subscriptions on unload.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Version of the extension layer.
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Hook registry.
    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    /// Names of the plugins loaded so far.
    pub fn loaded_plugins(&self) -> Vec<String> {
        self.plugins.loaded_names()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;

    fn config_in(dir: &tempfile::TempDir) -> AppConfig {
        let mut config = AppConfig::default();
        config.settings.path = dir
            .path()
            .join("modhost.settings.json")
            .to_string_lossy()
            .into_owned();
        config
    }

    #[test]
    fn test_shutdown_dispatches_quit_and_saves() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ctx = HostContext::init(config_in(&dir));

        let quit = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&quit);
        ctx.hooks()
            .application_quit
            .observe("Saver", move |_| flag.store(true, Ordering::SeqCst));
        ctx.update_settings(|s| s.set_enabled("Saver", true));

        ctx.shutdown().expect("shutdown");
        assert!(quit.load(Ordering::SeqCst));

        let reloaded = HostContext::init(config_in(&dir));
        assert_eq!(reloaded.settings().is_enabled("Saver"), Some(true));
    }

    #[test]
    fn test_plugin_context_shares_registries() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ctx = HostContext::init(config_in(&dir));
        let plugin_ctx = ctx.plugin_context("Alpha");

        plugin_ctx
            .hooks()
            .hero_update
            .observe(plugin_ctx.owner(), |_| {});
        ctx.plugins().record("Alpha", "1.0");

        assert_eq!(ctx.hooks().hero_update.len(), 1);
        assert_eq!(plugin_ctx.loaded_plugins(), vec!["Alpha"]);
        assert_eq!(plugin_ctx.api_version(), ctx.config().api.version);
    }
}
