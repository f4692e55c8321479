//! Preload planning: validates requests and groups them by scene.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::isolation::isolate;
use crate::registry::{PluginId, PluginRecord};

use super::request::{ObjectPath, PreloadIssue, PreloadRequest};

/// The objects one plugin wants from one scene, in request order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreloadGroup {
    /// Requesting plugin.
    pub plugin: PluginId,
    /// Its name, for logging.
    pub name: String,
    /// Requested paths; duplicates are kept.
    pub paths: Vec<ObjectPath>,
}

/// Everything to fetch from one scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenePreloads {
    /// Scene name.
    pub scene: String,
    /// Per-plugin groups in plugin order.
    pub groups: Vec<PreloadGroup>,
}

/// Ordered per-scene preload plan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreloadManifest {
    /// Scenes in first-seen order.
    pub scenes: Vec<ScenePreloads>,
}

impl PreloadManifest {
    /// Returns whether nothing needs to be preloaded.
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Returns the plugins waiting on the scenes from `index` onwards, in
    /// first-seen order without duplicates.
    pub fn plugins_from(&self, index: usize) -> Vec<PluginId> {
        let mut seen = HashSet::new();
        self.scenes
            .iter()
            .skip(index)
            .flat_map(|scene| scene.groups.iter().map(|group| group.plugin))
            .filter(|id| seen.insert(*id))
            .collect()
    }

    /// Total number of requested objects.
    pub fn request_count(&self) -> usize {
        self.scenes
            .iter()
            .flat_map(|scene| &scene.groups)
            .map(|group| group.paths.len())
            .sum()
    }
}

/// Builds the preload manifest for plugins given in activation order.
pub fn plan(records: &[PluginRecord], known_scenes: &[String]) -> PreloadManifest {
    let known: HashSet<&str> = known_scenes.iter().map(String::as_str).collect();
    let mut manifest = PreloadManifest::default();

    for record in records {
        debug!(plugin = %record.name, "Checking preloads for plugin");

        let requests = match isolate(|| record.instance.preload_requests()) {
            Ok(requests) => requests,
            Err(e) => {
                warn!(plugin = %record.name, error = %e, "Failed to read preload requests");
                continue;
            }
        };

        // scene → paths, in first-seen scene order for this plugin
        let mut by_scene: Vec<(String, Vec<ObjectPath>)> = Vec::new();
        for request in requests {
            let path = match validate(&request, &known) {
                Ok(path) => path,
                Err(issue) => {
                    warn!(
                        plugin = %record.name,
                        scene = %request.scene,
                        path = %request.path,
                        error = %issue,
                        "Rejected preload request"
                    );
                    continue;
                }
            };
            debug!(plugin = %record.name, scene = %request.scene, path = %path, "Found object");

            match by_scene.iter_mut().find(|(scene, _)| *scene == request.scene) {
                Some((_, paths)) => paths.push(path),
                None => by_scene.push((request.scene, vec![path])),
            }
        }

        for (scene, paths) in by_scene {
            let group = PreloadGroup {
                plugin: record.id,
                name: record.name.clone(),
                paths,
            };
            match manifest.scenes.iter_mut().find(|s| s.scene == scene) {
                Some(entry) => entry.groups.push(group),
                None => manifest.scenes.push(ScenePreloads {
                    scene,
                    groups: vec![group],
                }),
            }
        }
    }

    info!(
        scenes = manifest.scenes.len(),
        objects = manifest.request_count(),
        "Preload plan built"
    );
    manifest
}

fn validate(request: &PreloadRequest, known: &HashSet<&str>) -> Result<ObjectPath, PreloadIssue> {
    if request.scene.is_empty() || request.path.is_empty() {
        return Err(PreloadIssue::EmptyName);
    }
    if !known.contains(request.scene.as_str()) {
        return Err(PreloadIssue::UnknownScene(request.scene.clone()));
    }
    ObjectPath::parse(&request.path)
}
