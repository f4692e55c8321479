//! Unified application error types for modhost.
//!
//! Component-local errors (host, preload, plugin faults) are mapped into
//! [`AppError`] so they propagate through the `?` operator with a
//! consistent shape.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The requested plugin or resource was not found.
    NotFound,
    /// A configuration error occurred.
    Configuration,
    /// Reading or writing persisted settings failed.
    Persistence,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// A plugin rejected an operation it does not support.
    Plugin,
    /// A plugin candidate failed to load or instantiate.
    Discovery,
    /// A preload request could not be satisfied.
    Preload,
    /// The host could not enter a required scene.
    SceneTransition,
    /// A plugin's initialize or unload entry point failed.
    Activation,
    /// The host collaborator reported an error.
    Host,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Persistence => write!(f, "PERSISTENCE"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Plugin => write!(f, "PLUGIN"),
            Self::Discovery => write!(f, "DISCOVERY"),
            Self::Preload => write!(f, "PRELOAD"),
            Self::SceneTransition => write!(f, "SCENE_TRANSITION"),
            Self::Activation => write!(f, "ACTIVATION"),
            Self::Host => write!(f, "HOST"),
        }
    }
}

/// The unified application error used throughout modhost.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create a persistence error.
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Persistence, message)
    }

    /// Create a plugin error.
    pub fn plugin(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Plugin, message)
    }

    /// Create a discovery error.
    pub fn discovery(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Discovery, message)
    }

    /// Create a preload error.
    pub fn preload(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Preload, message)
    }

    /// Create a scene-transition error.
    pub fn scene_transition(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SceneTransition, message)
    }

    /// Create an activation error.
    pub fn activation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Activation, message)
    }

    /// Create a host error.
    pub fn host(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Host, message)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Persistence, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
