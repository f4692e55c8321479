//! Hook system: typed channels, combination policies, and the registry.

pub mod channel;
pub mod definitions;
pub mod dispatcher;
pub mod policy;
pub mod registry;

pub use channel::{ChannelInfo, HookCallback, HookChannel, HookFault};
pub use definitions::{
    AttackDirection, DamageArgs, DeathEffects, DeathEvent, HitInstance, HookPoint, JournalKill,
    LanguageKey, SaveData, SlashHit, VariableValue, VariableWrite, Vector2, Vector3,
};
pub use policy::{CombinePolicy, HookValue};
pub use registry::HookRegistry;
