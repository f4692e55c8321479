//! In-memory scene host driven by a JSON scene catalogue.
//!
//! Used by the harness binary and the tests. Loading a scene takes
//! [`LOAD_FRAMES`] frame boundaries before its roots become available.

use std::any::Any;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use super::{HostError, HostObject, ObjectHandle, SceneHost};

/// Frames between `load_scene` and the scene becoming active.
pub const LOAD_FRAMES: u64 = 2;

fn default_home() -> String {
    "Menu_Title".to_string()
}

fn default_true() -> bool {
    true
}

/// Description of an object in the catalogue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectSpec {
    /// Object name.
    pub name: String,
    /// Whether the object starts active.
    #[serde(default = "default_true")]
    pub active: bool,
    /// Direct children.
    #[serde(default)]
    pub children: Vec<ObjectSpec>,
}

/// Description of one scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneSpec {
    /// Scene name.
    pub name: String,
    /// Root objects.
    #[serde(default)]
    pub roots: Vec<ObjectSpec>,
}

/// The full scene catalogue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneCatalogue {
    /// Scene returned to after preloading.
    #[serde(default = "default_home")]
    pub home: String,
    /// Loadable scenes, in build order.
    #[serde(default)]
    pub scenes: Vec<SceneSpec>,
    /// Scenes whose load request fails.
    #[serde(default)]
    pub failing: Vec<String>,
    /// Scenes that load but never become active.
    #[serde(default)]
    pub stalled: Vec<String>,
}

impl Default for SceneCatalogue {
    fn default() -> Self {
        Self {
            home: default_home(),
            scenes: Vec::new(),
            failing: Vec::new(),
            stalled: Vec::new(),
        }
    }
}

/// A scene object held in memory.
#[derive(Debug)]
pub struct MemoryObject {
    id: Uuid,
    name: String,
    active: bool,
    children: Vec<Arc<MemoryObject>>,
}

impl MemoryObject {
    /// Creates an active object without children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            active: true,
            children: Vec::new(),
        }
    }

    /// Adds a child.
    pub fn with_child(mut self, child: MemoryObject) -> Self {
        self.children.push(Arc::new(child));
        self
    }

    fn from_spec(spec: &ObjectSpec) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: spec.name.clone(),
            active: spec.active,
            children: spec
                .children
                .iter()
                .map(|c| Arc::new(Self::from_spec(c)))
                .collect(),
        }
    }

    /// Deep copy with fresh ids; only the copied root is deactivated.
    fn duplicate_inert(&self) -> Self {
        Self {
            active: false,
            ..self.duplicate()
        }
    }

    fn duplicate(&self) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: self.name.clone(),
            active: self.active,
            children: self
                .children
                .iter()
                .map(|c| Arc::new(c.duplicate()))
                .collect(),
        }
    }

    /// Unique instance id.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Direct children.
    pub fn children(&self) -> &[Arc<MemoryObject>] {
        &self.children
    }
}

impl HostObject for MemoryObject {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn find_child(&self, name: &str) -> Option<ObjectHandle> {
        self.children
            .iter()
            .find(|c| c.name == name)
            .map(|c| Arc::clone(c) as ObjectHandle)
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Something observable the host did, recorded in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// The blanker was shown.
    BlankerShown,
    /// A scene load was started.
    LoadStarted(String),
    /// A scene became active.
    SceneActivated(String),
    /// An object was duplicated.
    Instantiated(String),
    /// The blanker was removed.
    BlankerHidden,
}

#[derive(Debug, Default)]
struct HostState {
    frame: u64,
    active: Option<String>,
    pending: Option<(String, u64)>,
    blanker: bool,
    events: Vec<HostEvent>,
}

/// Scene host backed by a [`SceneCatalogue`].
#[derive(Debug)]
pub struct MemorySceneHost {
    catalogue: SceneCatalogue,
    /// Root objects per scene, built once so lookups are stable.
    roots: Vec<(String, Vec<Arc<MemoryObject>>)>,
    state: Mutex<HostState>,
}

impl MemorySceneHost {
    /// Creates a host whose home scene is active.
    pub fn new(catalogue: SceneCatalogue) -> Self {
        let roots = catalogue
            .scenes
            .iter()
            .map(|scene| {
                let objects = scene
                    .roots
                    .iter()
                    .map(|spec| Arc::new(MemoryObject::from_spec(spec)))
                    .collect();
                (scene.name.clone(), objects)
            })
            .collect();
        let state = HostState {
            active: Some(catalogue.home.clone()),
            ..HostState::default()
        };
        Self {
            catalogue,
            roots,
            state: Mutex::new(state),
        }
    }

    /// Parses a JSON catalogue.
    pub fn from_json(json: &str) -> Result<Self, HostError> {
        let catalogue: SceneCatalogue =
            serde_json::from_str(json).map_err(|e| HostError::Catalogue(e.to_string()))?;
        Ok(Self::new(catalogue))
    }

    /// Reads a JSON catalogue file.
    pub fn from_path(path: &Path) -> Result<Self, HostError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| HostError::Catalogue(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    /// Current frame number.
    pub fn frame(&self) -> u64 {
        self.state.lock().frame
    }

    /// Name of the active scene, if one is active.
    pub fn active_scene(&self) -> Option<String> {
        self.state.lock().active.clone()
    }

    /// Whether the blanker is currently shown.
    pub fn blanker_visible(&self) -> bool {
        self.state.lock().blanker
    }

    /// Everything the host did so far.
    pub fn events(&self) -> Vec<HostEvent> {
        self.state.lock().events.clone()
    }

    /// Names of the scenes whose load was started, in order.
    pub fn loaded_scenes(&self) -> Vec<String> {
        self.state
            .lock()
            .events
            .iter()
            .filter_map(|e| match e {
                HostEvent::LoadStarted(scene) => Some(scene.clone()),
                _ => None,
            })
            .collect()
    }

    fn begin_load(&self, scene: &str) {
        let mut state = self.state.lock();
        let ready_at = state.frame + LOAD_FRAMES;
        state.active = None;
        state.pending = Some((scene.to_string(), ready_at));
        state.events.push(HostEvent::LoadStarted(scene.to_string()));
    }

    fn advance(&self) {
        let mut state = self.state.lock();
        state.frame += 1;
        let frame = state.frame;
        let ready = matches!(&state.pending, Some((_, at)) if *at <= frame);
        if !ready {
            return;
        }
        if let Some((scene, _)) = state.pending.take() {
            if self.catalogue.stalled.contains(&scene) {
                debug!(scene = %scene, "Scene stalled");
                return;
            }
            debug!(scene = %scene, frame, "Scene activated");
            state.events.push(HostEvent::SceneActivated(scene.clone()));
            state.active = Some(scene);
        }
    }
}

#[async_trait]
impl SceneHost for MemorySceneHost {
    fn known_scenes(&self) -> Vec<String> {
        self.catalogue.scenes.iter().map(|s| s.name.clone()).collect()
    }

    fn load_scene(&self, scene: &str) -> Result<(), HostError> {
        if !self.roots.iter().any(|(name, _)| name == scene) {
            return Err(HostError::UnknownScene(scene.to_string()));
        }
        if self.catalogue.failing.iter().any(|s| s == scene) {
            return Err(HostError::SceneLoad {
                scene: scene.to_string(),
                reason: "scene data unavailable".to_string(),
            });
        }
        self.begin_load(scene);
        Ok(())
    }

    async fn next_frame(&self) {
        tokio::task::yield_now().await;
        self.advance();
    }

    fn scene_roots(&self, scene: &str) -> Result<Vec<ObjectHandle>, HostError> {
        if self.state.lock().active.as_deref() != Some(scene) {
            return Err(HostError::SceneNotReady(scene.to_string()));
        }
        self.roots
            .iter()
            .find(|(name, _)| name == scene)
            .map(|(_, objects)| {
                objects
                    .iter()
                    .map(|o| Arc::clone(o) as ObjectHandle)
                    .collect()
            })
            .ok_or_else(|| HostError::UnknownScene(scene.to_string()))
    }

    fn instantiate_inert(&self, object: &ObjectHandle) -> Result<ObjectHandle, HostError> {
        let source = object
            .as_any()
            .downcast_ref::<MemoryObject>()
            .ok_or_else(|| HostError::Instantiate {
                object: object.name(),
                reason: "not a memory object".to_string(),
            })?;
        self.state
            .lock()
            .events
            .push(HostEvent::Instantiated(source.name.clone()));
        Ok(Arc::new(source.duplicate_inert()))
    }

    fn show_blanker(&self) {
        let mut state = self.state.lock();
        state.blanker = true;
        state.events.push(HostEvent::BlankerShown);
    }

    fn hide_blanker(&self) {
        let mut state = self.state.lock();
        state.blanker = false;
        state.events.push(HostEvent::BlankerHidden);
    }

    async fn return_to_home(&self) -> Result<(), HostError> {
        let home = self.catalogue.home.clone();
        info!(scene = %home, "Returning to home scene");
        self.begin_load(&home);
        for _ in 0..LOAD_FRAMES {
            self.next_frame().await;
        }
        Ok(())
    }
}
