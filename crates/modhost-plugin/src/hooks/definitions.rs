//! All hook point definitions with typed payloads.

use serde::{Deserialize, Serialize};

use super::policy::{CombinePolicy, HookValue};
use crate::host::{HostObject, ObjectHandle};

/// Enumeration of all interception points exposed to plugins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookPoint {
    // ── Player data ──
    /// A boolean player field is written. Subscribers replace the host write.
    SetPlayerBool,
    /// A boolean player field is read.
    GetPlayerBool,
    /// An integer player field is written.
    SetPlayerInt,
    /// An integer player field is read.
    GetPlayerInt,
    /// A float player field is written.
    SetPlayerFloat,
    /// A float player field is read.
    GetPlayerFloat,
    /// A string player field is written.
    SetPlayerString,
    /// A string player field is read.
    GetPlayerString,
    /// A vector player field is written.
    SetPlayerVector3,
    /// A vector player field is read.
    GetPlayerVector3,
    /// A player field of any other type is written.
    SetPlayerVariable,
    /// A player field of any other type is read.
    GetPlayerVariable,
    /// A fresh player data record was created.
    NewPlayerData,

    // ── Health and combat ──
    /// Extra ("blue") health to grant.
    BlueHealth,
    /// Health about to be removed.
    TakeHealth,
    /// Damage about to be dealt to the player.
    TakeDamage,
    /// Damage that was dealt, at the end of the damage routine.
    AfterTakeDamage,
    /// The player is about to die.
    BeforePlayerDead,
    /// The player died.
    AfterPlayerDead,
    /// An attack was started in a direction.
    Attack,
    /// An attack is being performed.
    DoAttack,
    /// An attack finished.
    AfterAttack,
    /// Health about to be added.
    BeforeAddHealth,
    /// Soul cost multiplier for focusing.
    FocusCost,
    /// Soul gained from a hit.
    SoulGain,
    /// The dash button was pressed; any `true` suppresses the host dash.
    DashPressed,
    /// Dash velocity is computed.
    DashVector,
    /// The nail struck a collider.
    SlashHit,
    /// A hit is about to be applied.
    HitInstance,
    /// Called every hero frame.
    HeroUpdate,
    /// Charms were re-evaluated.
    CharmUpdate,

    // ── Save handling ──
    /// A save slot is being loaded.
    SavegameLoad,
    /// A save slot is being written.
    SavegameSave,
    /// A new game was started.
    NewGame,
    /// A save slot is being cleared.
    SavegameClear,
    /// A save slot was loaded and its data is available.
    AfterSavegameLoad,
    /// Save data is about to be serialized.
    BeforeSavegameSave,
    /// File name for a save slot.
    GetSaveFileName,
    /// A save slot was cleared.
    AfterSavegameClear,

    // ── Text ──
    /// A localized string is looked up.
    LanguageGet,
    /// Text direction is queried.
    TextDirection,
    /// The UI font was set.
    SetFont,
    /// The cursor is shown or hidden. Subscribers replace the host handling.
    Cursor,

    // ── Scenes ──
    /// A scene became active.
    SceneChanged,
    /// A scene is about to load; subscribers may redirect it.
    BeforeSceneLoad,
    /// An enemy was enabled; the value says whether it is already dead.
    EnableEnemy,
    /// An enemy received a death event.
    ReceiveDeathEvent,
    /// A journal kill was recorded for an enemy.
    RecordKillForJournal,
    /// An object with a collider and a state machine was created.
    ColliderCreate,
    /// An object is spawned from the object pool.
    ObjectPoolSpawn,
    /// A state machine asked for the sender of its current event.
    GetEventSender,
    /// Black borders were drawn around a scene.
    DrawBlackBorders,

    // ── Lifecycle ──
    /// The host application is quitting.
    ApplicationQuit,
}

impl HookPoint {
    /// Every hook point, in declaration order.
    pub const ALL: [HookPoint; 53] = [
        Self::SetPlayerBool,
        Self::GetPlayerBool,
        Self::SetPlayerInt,
        Self::GetPlayerInt,
        Self::SetPlayerFloat,
        Self::GetPlayerFloat,
        Self::SetPlayerString,
        Self::GetPlayerString,
        Self::SetPlayerVector3,
        Self::GetPlayerVector3,
        Self::SetPlayerVariable,
        Self::GetPlayerVariable,
        Self::NewPlayerData,
        Self::BlueHealth,
        Self::TakeHealth,
        Self::TakeDamage,
        Self::AfterTakeDamage,
        Self::BeforePlayerDead,
        Self::AfterPlayerDead,
        Self::Attack,
        Self::DoAttack,
        Self::AfterAttack,
        Self::BeforeAddHealth,
        Self::FocusCost,
        Self::SoulGain,
        Self::DashPressed,
        Self::DashVector,
        Self::SlashHit,
        Self::HitInstance,
        Self::HeroUpdate,
        Self::CharmUpdate,
        Self::SavegameLoad,
        Self::SavegameSave,
        Self::NewGame,
        Self::SavegameClear,
        Self::AfterSavegameLoad,
        Self::BeforeSavegameSave,
        Self::GetSaveFileName,
        Self::AfterSavegameClear,
        Self::LanguageGet,
        Self::TextDirection,
        Self::SetFont,
        Self::Cursor,
        Self::SceneChanged,
        Self::BeforeSceneLoad,
        Self::EnableEnemy,
        Self::ReceiveDeathEvent,
        Self::RecordKillForJournal,
        Self::ColliderCreate,
        Self::ObjectPoolSpawn,
        Self::GetEventSender,
        Self::DrawBlackBorders,
        Self::ApplicationQuit,
    ];

    /// Returns the string name of this hook point.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SetPlayerBool => "set_player_bool",
            Self::GetPlayerBool => "get_player_bool",
            Self::SetPlayerInt => "set_player_int",
            Self::GetPlayerInt => "get_player_int",
            Self::SetPlayerFloat => "set_player_float",
            Self::GetPlayerFloat => "get_player_float",
            Self::SetPlayerString => "set_player_string",
            Self::GetPlayerString => "get_player_string",
            Self::SetPlayerVector3 => "set_player_vector3",
            Self::GetPlayerVector3 => "get_player_vector3",
            Self::SetPlayerVariable => "set_player_variable",
            Self::GetPlayerVariable => "get_player_variable",
            Self::NewPlayerData => "new_player_data",
            Self::BlueHealth => "blue_health",
            Self::TakeHealth => "take_health",
            Self::TakeDamage => "take_damage",
            Self::AfterTakeDamage => "after_take_damage",
            Self::BeforePlayerDead => "before_player_dead",
            Self::AfterPlayerDead => "after_player_dead",
            Self::Attack => "attack",
            Self::DoAttack => "do_attack",
            Self::AfterAttack => "after_attack",
            Self::BeforeAddHealth => "before_add_health",
            Self::FocusCost => "focus_cost",
            Self::SoulGain => "soul_gain",
            Self::DashPressed => "dash_pressed",
            Self::DashVector => "dash_vector",
            Self::SlashHit => "slash_hit",
            Self::HitInstance => "hit_instance",
            Self::HeroUpdate => "hero_update",
            Self::CharmUpdate => "charm_update",
            Self::SavegameLoad => "savegame_load",
            Self::SavegameSave => "savegame_save",
            Self::NewGame => "new_game",
            Self::SavegameClear => "savegame_clear",
            Self::AfterSavegameLoad => "after_savegame_load",
            Self::BeforeSavegameSave => "before_savegame_save",
            Self::GetSaveFileName => "get_save_file_name",
            Self::AfterSavegameClear => "after_savegame_clear",
            Self::LanguageGet => "language_get",
            Self::TextDirection => "text_direction",
            Self::SetFont => "set_font",
            Self::Cursor => "cursor",
            Self::SceneChanged => "scene_changed",
            Self::BeforeSceneLoad => "before_scene_load",
            Self::EnableEnemy => "enable_enemy",
            Self::ReceiveDeathEvent => "receive_death_event",
            Self::RecordKillForJournal => "record_kill_for_journal",
            Self::ColliderCreate => "collider_create",
            Self::ObjectPoolSpawn => "object_pool_spawn",
            Self::GetEventSender => "get_event_sender",
            Self::DrawBlackBorders => "draw_black_borders",
            Self::ApplicationQuit => "application_quit",
        }
    }

    /// Returns how subscriber outputs are combined at this point.
    pub fn policy(&self) -> CombinePolicy {
        match self {
            Self::GetPlayerBool
            | Self::GetPlayerInt
            | Self::GetPlayerFloat
            | Self::GetPlayerString
            | Self::GetPlayerVector3
            | Self::GetPlayerVariable
            | Self::LanguageGet
            | Self::TextDirection => CombinePolicy::OverrideOnce,
            Self::BlueHealth
            | Self::TakeHealth
            | Self::TakeDamage
            | Self::AfterTakeDamage
            | Self::BeforeAddHealth
            | Self::FocusCost
            | Self::SoulGain
            | Self::GetSaveFileName
            | Self::BeforeSceneLoad
            | Self::EnableEnemy
            | Self::DashVector
            | Self::HitInstance
            | Self::ReceiveDeathEvent
            | Self::ObjectPoolSpawn
            | Self::GetEventSender => CombinePolicy::Chain,
            Self::DashPressed => CombinePolicy::LogicalOr,
            _ => CombinePolicy::SideEffect,
        }
    }
}

impl std::fmt::Display for HookPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Three-component vector stored in player data.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    /// X component.
    pub x: f32,
    /// Y component.
    pub y: f32,
    /// Z component.
    pub z: f32,
}

impl Vector3 {
    /// Creates a vector from its components.
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl HookValue for Vector3 {}

/// Two-component vector, used for velocities.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector2 {
    /// X component.
    pub x: f32,
    /// Y component.
    pub y: f32,
}

impl Vector2 {
    /// Creates a vector from its components.
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl HookValue for Vector2 {}

// Host objects compare by identity, so chained object hooks detect a
// replaced object but not a mutated one.
impl PartialEq for dyn HostObject {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(self, other)
    }
}

impl HookValue for ObjectHandle {}

/// A player data value of any supported type.
///
/// The primitive cases are routed to their dedicated channels; only
/// [`VariableValue::Other`] reaches the generic variable channels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum VariableValue {
    /// Boolean field.
    Bool(bool),
    /// Integer field.
    Int(i32),
    /// Float field.
    Float(f32),
    /// String field.
    String(String),
    /// Vector field.
    Vector3(Vector3),
    /// Any other structured value.
    Other(serde_json::Value),
}

impl HookValue for VariableValue {}

/// Arguments of a player data write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableWrite<T> {
    /// Name of the player data field.
    pub target: String,
    /// Value being written.
    pub value: T,
}

impl<T> VariableWrite<T> {
    /// Creates a write for the given field.
    pub fn new(target: impl Into<String>, value: T) -> Self {
        Self {
            target: target.into(),
            value,
        }
    }
}

/// Context of a damage event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DamageArgs {
    /// Host-defined hazard classification.
    pub hazard_type: i32,
}

/// Key of a localized string lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageKey {
    /// Entry key.
    pub key: String,
    /// Sheet the entry lives in.
    pub sheet: String,
}

impl LanguageKey {
    /// Creates a lookup key.
    pub fn new(key: impl Into<String>, sheet: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            sheet: sheet.into(),
        }
    }
}

/// Direction of a player attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackDirection {
    /// Horizontal attack.
    Normal,
    /// Upward attack.
    Upward,
    /// Downward attack.
    Downward,
}

/// Serialized save game contents as seen by save hooks.
pub type SaveData = serde_json::Value;

/// A nail strike.
#[derive(Debug, Clone)]
pub struct SlashHit {
    /// The collider that was struck.
    pub collider: ObjectHandle,
    /// The object doing the slashing.
    pub source: ObjectHandle,
}

/// A hit about to be applied by a damage state machine.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HitInstance {
    /// Damage dealt by the hit.
    pub damage_dealt: i32,
    /// Hit direction in degrees.
    pub direction: f32,
    /// Knockback multiplier.
    pub magnitude_multiplier: f32,
    /// Damage multiplier.
    pub multiplier: f32,
    /// Whether the hit ignores invulnerability.
    pub ignore_invulnerable: bool,
}

impl HookValue for HitInstance {}

/// An enemy death event as delivered to the enemy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeathEvent {
    /// Name of the dying enemy.
    pub enemy: String,
    /// Whether the enemy already received a death event.
    pub already_received: bool,
}

/// The adjustable part of a death event.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DeathEffects {
    /// Direction of the killing blow, if known.
    pub attack_direction: Option<f32>,
    /// Whether the enemy's death event is reset afterwards.
    pub reset_death_event: bool,
    /// Whether the enemy burns from a spell.
    pub spell_burn: bool,
    /// Whether the enemy dies in water.
    pub is_watery: bool,
}

impl HookValue for DeathEffects {}

/// A journal kill record and the player data keys it touches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalKill {
    /// Name of the killed enemy.
    pub enemy: String,
    /// Journal entry name.
    pub player_data_name: String,
    /// Bool field marking the enemy as killed.
    pub killed_key: String,
    /// Int field counting remaining kills.
    pub kill_count_key: String,
    /// Bool field marking the entry as new.
    pub new_data_key: String,
}
