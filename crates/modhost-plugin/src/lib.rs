//! # modhost-plugin
//!
//! Extension layer for a host application. Provides:
//!
//! - Typed hook channels with chain, override-once, logical-or, and
//!   side-effect combination
//! - Plugin discovery from static manifests or, with the `dynamic`
//!   feature, shared libraries via `libloading`
//! - Cross-scene object preloading before plugins initialize
//! - Priority-ordered activation, runtime toggling, and the diagnostic
//!   overlay

pub mod activator;
pub mod context;
pub mod diagnostics;
pub mod discovery;
pub mod hooks;
pub mod host;
pub(crate) mod isolation;
pub mod loader;
pub mod macros;
pub mod manager;
pub mod prelude;
pub mod preload;
pub mod registry;

pub use context::{HostContext, PluginContext};
pub use diagnostics::Overlay;
pub use discovery::{DiscoveryError, ExportedType, PluginSource, StaticSource};
pub use hooks::{HookChannel, HookPoint, HookRegistry};
pub use host::{HostError, HostObject, ObjectHandle, SceneHost};
pub use manager::{LoadSummary, PluginManager};
pub use registry::{Plugin, PluginFault, PluginRecord, PluginRegistry, TogglablePlugin};
