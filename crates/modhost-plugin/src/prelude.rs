//! Prelude for plugin authors.

pub use crate::context::PluginContext;
pub use crate::discovery::ExportedType;
pub use crate::hooks::{
    AttackDirection, DamageArgs, DeathEffects, DeathEvent, HitInstance, HookFault, HookPoint,
    JournalKill, LanguageKey, SaveData, SlashHit, VariableValue, VariableWrite, Vector2, Vector3,
};
pub use crate::host::{HostObject, ObjectHandle};
pub use crate::preload::{PluginPreloads, PreloadRequest};
pub use crate::registry::{DEFAULT_LOAD_PRIORITY, Plugin, PluginFault, TogglablePlugin};

pub use crate::export_plugins;
