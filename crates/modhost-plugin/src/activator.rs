//! Plugin activation and deactivation.

use tracing::{debug, error, info};

use modhost_core::error::AppError;
use modhost_core::result::AppResult;

use crate::context::HostContext;
use crate::isolation::isolate;
use crate::preload::PluginPreloads;
use crate::registry::{PluginFault, PluginRecord};

/// Initializes a plugin and records it as loaded.
///
/// The enabled flag is set to `true` on first sight, or always when
/// `change_settings` is set. A plugin that fails or panics in `initialize`
/// is not recorded. The recorded version is the one the plugin reports
/// once initialized.
pub fn activate(
    ctx: &HostContext,
    record: &PluginRecord,
    preloads: Option<PluginPreloads>,
    change_settings: bool,
) -> AppResult<()> {
    ctx.update_settings(|settings| {
        if change_settings {
            settings.set_enabled(&record.name, true);
        } else {
            settings.enabled_or_insert(&record.name);
        }
    });

    let plugin_ctx = ctx.plugin_context(&record.name);
    debug!(
        plugin = %record.name,
        preloaded = preloads.as_ref().map_or(0, PluginPreloads::len),
        "Initializing plugin"
    );

    let version = isolate(|| {
        record.instance.initialize(&plugin_ctx, preloads)?;
        Ok::<_, PluginFault>(record.instance.version())
    })
    .map_err(AppError::activation)?
    .map_err(AppError::from)?;

    ctx.plugins().record(&record.name, &version);
    info!(plugin = %record.name, version = %version, "Plugin loaded");
    Ok(())
}

/// Unloads a togglable plugin.
///
/// The plugin is marked disabled and removed from the loaded table before
/// its `unload` runs; a failing `unload` is logged and otherwise ignored.
/// Hook subscriptions the plugin still owns are dropped afterwards.
pub fn deactivate(ctx: &HostContext, record: &PluginRecord) -> AppResult<()> {
    if !record.is_togglable() {
        return Err(AppError::plugin(format!(
            "plugin '{}' cannot be unloaded",
            record.name
        )));
    }

    ctx.update_settings(|settings| settings.set_enabled(&record.name, false));
    ctx.plugins().remove(&record.name);

    match isolate(|| record.instance.as_togglable().map(|t| t.unload())) {
        Ok(Some(Ok(()))) => {}
        Ok(Some(Err(e))) => error!(plugin = %record.name, error = %e, "Failed to unload plugin"),
        Ok(None) => error!(plugin = %record.name, "Plugin no longer supports unloading"),
        Err(e) => error!(plugin = %record.name, error = %e, "Failed to unload plugin"),
    }

    let dropped = ctx.hooks().unsubscribe_owner(&record.name);
    info!(plugin = %record.name, dropped_hooks = dropped, "Plugin unloaded");
    Ok(())
}
