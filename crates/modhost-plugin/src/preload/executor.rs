//! Preload execution: cycles through the planned scenes and duplicates
//! the requested objects before any plugin is activated.

use tracing::{debug, error, info, warn};

use modhost_core::config::preload::PreloadConfig;

use crate::host::{HostError, ObjectHandle, SceneHost};
use crate::registry::PluginId;

use super::bundle::PreloadBundle;
use super::planner::{PreloadManifest, ScenePreloads};
use super::request::ObjectPath;

/// A scene transition that stopped the pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneFailure {
    /// The scene that could not be entered.
    pub scene: String,
    /// What the host reported.
    pub error: HostError,
    /// Plugins waiting on this scene or on any scene after it.
    pub plugins: Vec<PluginId>,
}

/// Outcome of a preload pass.
#[derive(Debug, Default)]
pub struct PreloadReport {
    /// Objects that were fetched.
    pub bundle: PreloadBundle,
    /// Set when the pass stopped early.
    pub failure: Option<SceneFailure>,
}

impl PreloadReport {
    /// Returns whether a plugin must not be activated.
    pub fn is_failed(&self, plugin: PluginId) -> bool {
        self.failure
            .as_ref()
            .is_some_and(|failure| failure.plugins.contains(&plugin))
    }
}

/// Runs the preload pass.
///
/// Scenes are visited once each, in manifest order. After the last scene
/// (or a failed transition) the host returns home and the blanker is
/// released. An empty manifest does not touch the host at all.
pub async fn execute(
    host: &dyn SceneHost,
    manifest: &PreloadManifest,
    config: &PreloadConfig,
) -> PreloadReport {
    let mut report = PreloadReport::default();
    if manifest.is_empty() {
        debug!("Nothing to preload");
        return report;
    }

    info!(scenes = manifest.scenes.len(), "Preloading");
    if config.use_blanker {
        host.show_blanker();
    }

    let settle_frames = config.effective_settle_frames();
    for (index, scene) in manifest.scenes.iter().enumerate() {
        if let Err(e) = preload_scene(host, scene, settle_frames, &mut report.bundle).await {
            let plugins = manifest.plugins_from(index);
            error!(
                scene = %scene.scene,
                error = %e,
                plugins = plugins.len(),
                "Scene transition failed, aborting preload"
            );
            report.failure = Some(SceneFailure {
                scene: scene.scene.clone(),
                error: e,
                plugins,
            });
            break;
        }
    }

    info!("Preload done, returning to home scene");
    if let Err(e) = host.return_to_home().await {
        error!(error = %e, "Failed to return to home scene");
    }
    if config.use_blanker {
        host.hide_blanker();
    }

    report
}

async fn preload_scene(
    host: &dyn SceneHost,
    scene: &ScenePreloads,
    settle_frames: u32,
    bundle: &mut PreloadBundle,
) -> Result<(), HostError> {
    info!(scene = %scene.scene, "Loading scene");
    host.load_scene(&scene.scene)?;
    for _ in 0..settle_frames {
        host.next_frame().await;
    }
    let roots = host.scene_roots(&scene.scene)?;

    for group in &scene.groups {
        debug!(plugin = %group.name, scene = %scene.scene, "Fetching objects for plugin");
        for path in &group.paths {
            let Some(object) = resolve(&roots, path) else {
                warn!(
                    plugin = %group.name,
                    scene = %scene.scene,
                    path = %path,
                    "Could not find object"
                );
                continue;
            };
            match host.instantiate_inert(&object) {
                Ok(copy) => bundle.insert(group.plugin, &scene.scene, &path.raw, copy),
                Err(e) => warn!(
                    plugin = %group.name,
                    scene = %scene.scene,
                    path = %path,
                    error = %e,
                    "Could not duplicate object"
                ),
            }
        }
    }
    Ok(())
}

/// Finds the root by exact name (first match), then its direct child.
fn resolve(roots: &[ObjectHandle], path: &ObjectPath) -> Option<ObjectHandle> {
    let root = roots.iter().find(|r| r.name() == path.root)?;
    match &path.child {
        None => Some(root.clone()),
        Some(child) => root.find_child(child),
    }
}
