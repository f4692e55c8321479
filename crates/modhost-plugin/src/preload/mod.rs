//! Cross-scene object preloading: request validation, planning, the async
//! scene pass, and the per-plugin bundle it produces.

pub mod bundle;
pub mod executor;
pub mod planner;
pub mod request;

pub use bundle::{PluginPreloads, PreloadBundle};
pub use executor::{PreloadReport, SceneFailure, execute};
pub use planner::{PreloadGroup, PreloadManifest, ScenePreloads, plan};
pub use request::{ObjectPath, PreloadIssue, PreloadRequest};
