//! The narrow interface to the host application's scene system.

pub mod memory;

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use modhost_core::error::AppError;

pub use memory::{MemoryObject, MemorySceneHost, SceneCatalogue};

/// An object in the host's scene graph.
pub trait HostObject: Any + Send + Sync + fmt::Debug {
    /// Object name.
    fn name(&self) -> String;

    /// Returns the direct child called `name`, if any.
    fn find_child(&self, name: &str) -> Option<ObjectHandle>;

    /// Whether the object currently takes part in the simulation.
    fn is_active(&self) -> bool;

    /// Allows downcasting to the host's concrete object type.
    fn as_any(&self) -> &dyn Any;
}

/// Shared handle to a host object.
pub type ObjectHandle = Arc<dyn HostObject>;

/// Errors reported by a [`SceneHost`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The scene is not part of the host build.
    #[error("unknown scene \"{0}\"")]
    UnknownScene(String),
    /// The host refused or failed to start loading a scene.
    #[error("failed to load scene \"{scene}\": {reason}")]
    SceneLoad {
        /// Scene name.
        scene: String,
        /// Host-provided reason.
        reason: String,
    },
    /// The scene's root objects are not available.
    #[error("scene \"{0}\" is not active")]
    SceneNotReady(String),
    /// An object could not be duplicated.
    #[error("failed to instantiate \"{object}\": {reason}")]
    Instantiate {
        /// Object name.
        object: String,
        /// Host-provided reason.
        reason: String,
    },
    /// The scene catalogue could not be read.
    #[error("invalid scene catalogue: {0}")]
    Catalogue(String),
}

impl From<HostError> for AppError {
    fn from(e: HostError) -> Self {
        match e {
            HostError::UnknownScene(_) | HostError::SceneLoad { .. } | HostError::SceneNotReady(_) => {
                AppError::scene_transition(e.to_string())
            }
            HostError::Instantiate { .. } | HostError::Catalogue(_) => AppError::host(e.to_string()),
        }
    }
}

/// Scene operations the preload pass needs from the host.
///
/// Scene construction completes asynchronously: after [`load_scene`] the
/// new scene's roots only become available after some frame boundaries,
/// which are awaited with [`next_frame`].
///
/// [`load_scene`]: SceneHost::load_scene
/// [`next_frame`]: SceneHost::next_frame
#[async_trait]
pub trait SceneHost: Send + Sync {
    /// Names of every scene the host can load.
    fn known_scenes(&self) -> Vec<String>;

    /// Starts loading `scene`, replacing the current one.
    fn load_scene(&self, scene: &str) -> Result<(), HostError>;

    /// Resolves at the next frame boundary.
    async fn next_frame(&self);

    /// Root objects of the active scene `scene`.
    fn scene_roots(&self, scene: &str) -> Result<Vec<ObjectHandle>, HostError>;

    /// Creates a deactivated duplicate of `object` that survives scene changes.
    fn instantiate_inert(&self, object: &ObjectHandle) -> Result<ObjectHandle, HostError>;

    /// Covers the screen while scenes are cycled.
    fn show_blanker(&self);

    /// Removes the cover.
    fn hide_blanker(&self);

    /// Returns to the host's home scene.
    async fn return_to_home(&self) -> Result<(), HostError>;
}
