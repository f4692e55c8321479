//! Preload requests and object path parsing.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use modhost_core::error::AppError;

/// Separator between the root and child segments of an object path.
pub const PATH_SEPARATOR: char = '/';

/// A plugin's request for one scene object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PreloadRequest {
    /// Scene to load.
    pub scene: String,
    /// `root` or `root/child`.
    pub path: String,
}

impl PreloadRequest {
    /// Creates a request.
    pub fn new(scene: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            scene: scene.into(),
            path: path.into(),
        }
    }
}

impl fmt::Display for PreloadRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.scene, self.path)
    }
}

/// Why a preload request was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreloadIssue {
    /// The scene or path is empty.
    #[error("empty scene or object name")]
    EmptyName,
    /// The scene is not one the host can load.
    #[error("non-existent scene \"{0}\"")]
    UnknownScene(String),
    /// The path has an empty segment or too many separators.
    #[error("invalid object name \"{0}\"")]
    MalformedPath(String),
}

impl From<PreloadIssue> for AppError {
    fn from(issue: PreloadIssue) -> Self {
        AppError::preload(issue.to_string())
    }
}

/// A validated object path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectPath {
    /// Name of the scene root object.
    pub root: String,
    /// Name of a direct child of the root, if any.
    pub child: Option<String>,
    /// The path exactly as requested; preloaded objects are keyed by it.
    pub raw: String,
}

impl ObjectPath {
    /// Parses `root` or `root/child`.
    pub fn parse(raw: &str) -> Result<Self, PreloadIssue> {
        if raw.is_empty() {
            return Err(PreloadIssue::EmptyName);
        }
        let malformed = || PreloadIssue::MalformedPath(raw.to_string());

        match raw.split_once(PATH_SEPARATOR) {
            None => Ok(Self {
                root: raw.to_string(),
                child: None,
                raw: raw.to_string(),
            }),
            Some((root, child)) => {
                if root.is_empty() || child.is_empty() || child.contains(PATH_SEPARATOR) {
                    return Err(malformed());
                }
                Ok(Self {
                    root: root.to_string(),
                    child: Some(child.to_string()),
                    raw: raw.to_string(),
                })
            }
        }
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
