//! Preloaded objects, grouped per plugin and handed over at activation.

use std::collections::HashMap;

use crate::host::ObjectHandle;
use crate::registry::PluginId;

/// One plugin's preloaded objects: scene → requested path → object.
#[derive(Debug, Clone, Default)]
pub struct PluginPreloads {
    scenes: HashMap<String, HashMap<String, ObjectHandle>>,
}

impl PluginPreloads {
    /// Returns the object preloaded from `scene` under the requested `path`.
    pub fn get(&self, scene: &str, path: &str) -> Option<&ObjectHandle> {
        self.scenes.get(scene).and_then(|objects| objects.get(path))
    }

    /// Returns every object preloaded from `scene`, keyed by requested path.
    pub fn scene(&self, scene: &str) -> Option<&HashMap<String, ObjectHandle>> {
        self.scenes.get(scene)
    }

    /// Returns the scenes that contributed objects.
    pub fn scene_names(&self) -> impl Iterator<Item = &str> {
        self.scenes.keys().map(String::as_str)
    }

    /// Total number of objects.
    pub fn len(&self) -> usize {
        self.scenes.values().map(HashMap::len).sum()
    }

    /// Returns whether no object was preloaded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(&mut self, scene: &str, path: &str, object: ObjectHandle) {
        self.scenes
            .entry(scene.to_string())
            .or_default()
            .insert(path.to_string(), object);
    }
}

/// All preloaded objects of a load session.
///
/// Filled by the executor, then drained plugin by plugin; a plugin's slice
/// can only be taken once.
#[derive(Debug, Default)]
pub struct PreloadBundle {
    plugins: HashMap<PluginId, PluginPreloads>,
}

impl PreloadBundle {
    /// Creates an empty bundle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an object under the requested path. A repeated path replaces
    /// the earlier object.
    pub fn insert(&mut self, plugin: PluginId, scene: &str, path: &str, object: ObjectHandle) {
        self.plugins.entry(plugin).or_default().insert(scene, path, object);
    }

    /// Removes and returns a plugin's slice.
    pub fn take(&mut self, plugin: PluginId) -> Option<PluginPreloads> {
        self.plugins.remove(&plugin)
    }

    /// Returns whether a plugin still has an untaken slice.
    pub fn contains(&self, plugin: PluginId) -> bool {
        self.plugins.contains_key(&plugin)
    }

    /// Number of plugins with untaken slices.
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Returns whether every slice was taken (or none was stored).
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::host::memory::MemoryObject;

    #[test]
    fn test_take_is_single_use() {
        let mut bundle = PreloadBundle::new();
        let object: ObjectHandle = Arc::new(MemoryObject::new("Bat"));
        bundle.insert(PluginId(0), "Cave", "Bat", Arc::clone(&object));
        bundle.insert(PluginId(0), "Town", "Elder", Arc::new(MemoryObject::new("Elder")));

        let slice = bundle.take(PluginId(0)).expect("slice present");
        assert_eq!(slice.len(), 2);
        assert_eq!(slice.get("Cave", "Bat").map(|o| o.name()), Some("Bat".to_string()));
        assert!(slice.get("Cave", "Elder").is_none());
        assert!(bundle.take(PluginId(0)).is_none());
        assert!(bundle.is_empty());
    }

    #[test]
    fn test_repeated_path_keeps_last_object() {
        let mut bundle = PreloadBundle::new();
        bundle.insert(PluginId(1), "Cave", "Bat", Arc::new(MemoryObject::new("first")));
        bundle.insert(PluginId(1), "Cave", "Bat", Arc::new(MemoryObject::new("second")));

        let slice = bundle.take(PluginId(1)).expect("slice present");
        assert_eq!(slice.len(), 1);
        assert_eq!(slice.get("Cave", "Bat").map(|o| o.name()), Some("second".to_string()));
    }
}
