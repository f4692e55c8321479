//! Hook registry: one typed channel per interception point.
//!
//! Plugins subscribe through the public channel fields; the host calls the
//! `set_player_*` / `get_player_*` helpers (or `dispatch` directly) at the
//! intercepted operation.

use tracing::debug;

use super::channel::{ChannelInfo, HookChannel};
use super::definitions::{
    AttackDirection, DamageArgs, DeathEffects, DeathEvent, HitInstance, HookPoint, JournalKill,
    LanguageKey, SaveData, SlashHit, VariableValue, VariableWrite, Vector2, Vector3,
};
use super::policy::HookValue;
use crate::host::ObjectHandle;

/// Registry of every hook channel.
#[derive(Debug)]
pub struct HookRegistry {
    // ── Player data ──
    /// Boolean field writes.
    pub set_player_bool: HookChannel<VariableWrite<bool>, ()>,
    /// Boolean field reads.
    pub get_player_bool: HookChannel<String, bool>,
    /// Integer field writes.
    pub set_player_int: HookChannel<VariableWrite<i32>, ()>,
    /// Integer field reads.
    pub get_player_int: HookChannel<String, i32>,
    /// Float field writes.
    pub set_player_float: HookChannel<VariableWrite<f32>, ()>,
    /// Float field reads.
    pub get_player_float: HookChannel<String, f32>,
    /// String field writes.
    pub set_player_string: HookChannel<VariableWrite<String>, ()>,
    /// String field reads.
    pub get_player_string: HookChannel<String, String>,
    /// Vector field writes.
    pub set_player_vector3: HookChannel<VariableWrite<Vector3>, ()>,
    /// Vector field reads.
    pub get_player_vector3: HookChannel<String, Vector3>,
    /// Writes of fields that are not one of the primitive types.
    pub set_player_variable: HookChannel<VariableWrite<VariableValue>, ()>,
    /// Reads of fields that are not one of the primitive types.
    pub get_player_variable: HookChannel<String, VariableValue>,
    /// A new player data record exists.
    pub new_player_data: HookChannel<(), ()>,

    // ── Health and combat ──
    /// Blue health to grant, starting from 0.
    pub blue_health: HookChannel<(), i32>,
    /// Health being removed.
    pub take_health: HookChannel<(), i32>,
    /// Damage being dealt.
    pub take_damage: HookChannel<DamageArgs, i32>,
    /// Damage that was dealt.
    pub after_take_damage: HookChannel<DamageArgs, i32>,
    pub before_player_dead: HookChannel<(), ()>,
    pub after_player_dead: HookChannel<(), ()>,
    pub attack: HookChannel<AttackDirection, ()>,
    pub do_attack: HookChannel<(), ()>,
    pub after_attack: HookChannel<AttackDirection, ()>,
    /// Health being added.
    pub before_add_health: HookChannel<(), i32>,
    /// Focus cost multiplier, starting from 1.0.
    pub focus_cost: HookChannel<(), f32>,
    /// Soul gained from a hit.
    pub soul_gain: HookChannel<(), i32>,
    /// Any `true` suppresses the host dash.
    pub dash_pressed: HookChannel<(), bool>,
    /// Dash velocity.
    pub dash_vector: HookChannel<(), Vector2>,
    pub slash_hit: HookChannel<SlashHit, ()>,
    /// Hit about to be applied; the argument names the damaging state machine.
    pub hit_instance: HookChannel<String, HitInstance>,
    pub hero_update: HookChannel<(), ()>,
    pub charm_update: HookChannel<(), ()>,

    // ── Save handling ──
    /// Save slot being loaded.
    pub savegame_load: HookChannel<i32, ()>,
    /// Save slot being written.
    pub savegame_save: HookChannel<i32, ()>,
    pub new_game: HookChannel<(), ()>,
    /// Save slot being cleared.
    pub savegame_clear: HookChannel<i32, ()>,
    pub after_savegame_load: HookChannel<SaveData, ()>,
    pub before_savegame_save: HookChannel<SaveData, ()>,
    /// Save file name for a slot; `None` keeps the host's name.
    pub get_save_file_name: HookChannel<i32, Option<String>>,
    pub after_savegame_clear: HookChannel<i32, ()>,

    // ── Text ──
    /// Localized string lookups.
    pub language_get: HookChannel<LanguageKey, String>,
    /// Text direction queries.
    pub text_direction: HookChannel<(), bool>,
    pub set_font: HookChannel<(), ()>,
    /// Cursor handling; subscribers replace the host's.
    pub cursor: HookChannel<(), ()>,

    // ── Scenes ──
    /// Name of the scene that became active.
    pub scene_changed: HookChannel<String, ()>,
    /// Scene about to load; the value is the target scene name.
    pub before_scene_load: HookChannel<(), String>,
    /// Enemy object name; the value is whether it is already dead.
    pub enable_enemy: HookChannel<String, bool>,
    /// Death effects of an enemy, adjusted in turn.
    pub receive_death_event: HookChannel<DeathEvent, DeathEffects>,
    pub record_kill_for_journal: HookChannel<JournalKill, ()>,
    pub collider_create: HookChannel<ObjectHandle, ()>,
    /// Object leaving the pool; subscribers may substitute it.
    pub object_pool_spawn: HookChannel<(), ObjectHandle>,
    /// Sender of a state machine's current event; the argument is the state machine name.
    pub get_event_sender: HookChannel<String, ObjectHandle>,
    /// Border objects drawn around the scene.
    pub draw_black_borders: HookChannel<Vec<ObjectHandle>, ()>,

    // ── Lifecycle ──
    pub application_quit: HookChannel<(), ()>,
}

impl HookRegistry {
    /// Creates a registry with every channel empty.
    pub fn new() -> Self {
        Self {
            set_player_bool: HookChannel::side_effect(HookPoint::SetPlayerBool),
            get_player_bool: HookChannel::override_once(HookPoint::GetPlayerBool),
            set_player_int: HookChannel::side_effect(HookPoint::SetPlayerInt),
            get_player_int: HookChannel::override_once(HookPoint::GetPlayerInt),
            set_player_float: HookChannel::side_effect(HookPoint::SetPlayerFloat),
            get_player_float: HookChannel::override_once(HookPoint::GetPlayerFloat),
            set_player_string: HookChannel::side_effect(HookPoint::SetPlayerString),
            get_player_string: HookChannel::override_once(HookPoint::GetPlayerString),
            set_player_vector3: HookChannel::side_effect(HookPoint::SetPlayerVector3),
            get_player_vector3: HookChannel::override_once(HookPoint::GetPlayerVector3),
            set_player_variable: HookChannel::side_effect(HookPoint::SetPlayerVariable),
            get_player_variable: HookChannel::override_once(HookPoint::GetPlayerVariable),
            new_player_data: HookChannel::side_effect(HookPoint::NewPlayerData),

            blue_health: HookChannel::chain(HookPoint::BlueHealth),
            take_health: HookChannel::chain(HookPoint::TakeHealth),
            take_damage: HookChannel::chain(HookPoint::TakeDamage),
            after_take_damage: HookChannel::chain(HookPoint::AfterTakeDamage),
            before_player_dead: HookChannel::side_effect(HookPoint::BeforePlayerDead),
            after_player_dead: HookChannel::side_effect(HookPoint::AfterPlayerDead),
            attack: HookChannel::side_effect(HookPoint::Attack),
            do_attack: HookChannel::side_effect(HookPoint::DoAttack),
            after_attack: HookChannel::side_effect(HookPoint::AfterAttack),
            before_add_health: HookChannel::chain(HookPoint::BeforeAddHealth),
            focus_cost: HookChannel::chain(HookPoint::FocusCost),
            soul_gain: HookChannel::chain(HookPoint::SoulGain),
            dash_pressed: HookChannel::logical_or(HookPoint::DashPressed),
            dash_vector: HookChannel::chain(HookPoint::DashVector),
            slash_hit: HookChannel::side_effect(HookPoint::SlashHit),
            hit_instance: HookChannel::chain(HookPoint::HitInstance),
            hero_update: HookChannel::side_effect(HookPoint::HeroUpdate),
            charm_update: HookChannel::side_effect(HookPoint::CharmUpdate),

            savegame_load: HookChannel::side_effect(HookPoint::SavegameLoad),
            savegame_save: HookChannel::side_effect(HookPoint::SavegameSave),
            new_game: HookChannel::side_effect(HookPoint::NewGame),
            savegame_clear: HookChannel::side_effect(HookPoint::SavegameClear),
            after_savegame_load: HookChannel::side_effect(HookPoint::AfterSavegameLoad),
            before_savegame_save: HookChannel::side_effect(HookPoint::BeforeSavegameSave),
            get_save_file_name: HookChannel::chain(HookPoint::GetSaveFileName),
            after_savegame_clear: HookChannel::side_effect(HookPoint::AfterSavegameClear),

            language_get: HookChannel::override_once(HookPoint::LanguageGet),
            text_direction: HookChannel::override_once(HookPoint::TextDirection),
            set_font: HookChannel::side_effect(HookPoint::SetFont),
            cursor: HookChannel::side_effect(HookPoint::Cursor),

            scene_changed: HookChannel::side_effect(HookPoint::SceneChanged),
            before_scene_load: HookChannel::chain(HookPoint::BeforeSceneLoad),
            enable_enemy: HookChannel::chain(HookPoint::EnableEnemy),
            receive_death_event: HookChannel::chain(HookPoint::ReceiveDeathEvent),
            record_kill_for_journal: HookChannel::side_effect(HookPoint::RecordKillForJournal),
            collider_create: HookChannel::side_effect(HookPoint::ColliderCreate),
            object_pool_spawn: HookChannel::chain(HookPoint::ObjectPoolSpawn),
            get_event_sender: HookChannel::chain(HookPoint::GetEventSender),
            draw_black_borders: HookChannel::side_effect(HookPoint::DrawBlackBorders),

            application_quit: HookChannel::side_effect(HookPoint::ApplicationQuit),
        }
    }

    /// Returns a type-erased view of every channel, in catalogue order.
    pub fn channels(&self) -> Vec<&dyn ChannelInfo> {
        vec![
            &self.set_player_bool,
            &self.get_player_bool,
            &self.set_player_int,
            &self.get_player_int,
            &self.set_player_float,
            &self.get_player_float,
            &self.set_player_string,
            &self.get_player_string,
            &self.set_player_vector3,
            &self.get_player_vector3,
            &self.set_player_variable,
            &self.get_player_variable,
            &self.new_player_data,
            &self.blue_health,
            &self.take_health,
            &self.take_damage,
            &self.after_take_damage,
            &self.before_player_dead,
            &self.after_player_dead,
            &self.attack,
            &self.do_attack,
            &self.after_attack,
            &self.before_add_health,
            &self.focus_cost,
            &self.soul_gain,
            &self.dash_pressed,
            &self.dash_vector,
            &self.slash_hit,
            &self.hit_instance,
            &self.hero_update,
            &self.charm_update,
            &self.savegame_load,
            &self.savegame_save,
            &self.new_game,
            &self.savegame_clear,
            &self.after_savegame_load,
            &self.before_savegame_save,
            &self.get_save_file_name,
            &self.after_savegame_clear,
            &self.language_get,
            &self.text_direction,
            &self.set_font,
            &self.cursor,
            &self.scene_changed,
            &self.before_scene_load,
            &self.enable_enemy,
            &self.receive_death_event,
            &self.record_kill_for_journal,
            &self.collider_create,
            &self.object_pool_spawn,
            &self.get_event_sender,
            &self.draw_black_borders,
            &self.application_quit,
        ]
    }

    /// Removes every subscription owned by a plugin. Returns how many were removed.
    pub fn unsubscribe_owner(&self, owner: &str) -> usize {
        let removed: usize = self
            .channels()
            .into_iter()
            .map(|channel| channel.remove_owner(owner))
            .sum();
        if removed > 0 {
            debug!(plugin = %owner, removed, "Dropped plugin hook subscriptions");
        }
        removed
    }

    /// Returns `(point, subscriber count)` for every channel with subscribers.
    pub fn subscriber_counts(&self) -> Vec<(HookPoint, usize)> {
        self.channels()
            .into_iter()
            .map(|channel| (channel.point(), channel.subscriber_count()))
            .filter(|(_, count)| *count > 0)
            .collect()
    }

    // ── Host-side call helpers ──

    /// Intercepts a boolean write. With subscribers present they own the
    /// write and `internal` is skipped.
    pub fn set_player_bool(&self, target: &str, value: bool, internal: impl FnOnce(&str, bool)) {
        intercept_set(&self.set_player_bool, target, value, internal);
    }

    /// Intercepts a boolean read; `internal` supplies the host's value.
    pub fn get_player_bool(&self, target: &str, internal: impl FnOnce(&str) -> bool) -> bool {
        intercept_get(&self.get_player_bool, target, internal)
    }

    /// Intercepts an integer write.
    pub fn set_player_int(&self, target: &str, value: i32, internal: impl FnOnce(&str, i32)) {
        intercept_set(&self.set_player_int, target, value, internal);
    }

    /// Intercepts an integer read.
    pub fn get_player_int(&self, target: &str, internal: impl FnOnce(&str) -> i32) -> i32 {
        intercept_get(&self.get_player_int, target, internal)
    }

    /// Intercepts a float write.
    pub fn set_player_float(&self, target: &str, value: f32, internal: impl FnOnce(&str, f32)) {
        intercept_set(&self.set_player_float, target, value, internal);
    }

    /// Intercepts a float read.
    pub fn get_player_float(&self, target: &str, internal: impl FnOnce(&str) -> f32) -> f32 {
        intercept_get(&self.get_player_float, target, internal)
    }

    /// Intercepts a string write.
    pub fn set_player_string(
        &self,
        target: &str,
        value: String,
        internal: impl FnOnce(&str, String),
    ) {
        intercept_set(&self.set_player_string, target, value, internal);
    }

    /// Intercepts a string read.
    pub fn get_player_string(
        &self,
        target: &str,
        internal: impl FnOnce(&str) -> String,
    ) -> String {
        intercept_get(&self.get_player_string, target, internal)
    }

    /// Intercepts a vector write.
    pub fn set_player_vector3(
        &self,
        target: &str,
        value: Vector3,
        internal: impl FnOnce(&str, Vector3),
    ) {
        intercept_set(&self.set_player_vector3, target, value, internal);
    }

    /// Intercepts a vector read.
    pub fn get_player_vector3(
        &self,
        target: &str,
        internal: impl FnOnce(&str) -> Vector3,
    ) -> Vector3 {
        intercept_get(&self.get_player_vector3, target, internal)
    }

    /// Intercepts a write of any type.
    ///
    /// Primitive values are routed to their typed channel; only
    /// [`VariableValue::Other`] reaches `set_player_variable` subscribers.
    pub fn set_player_variable(
        &self,
        target: &str,
        value: VariableValue,
        internal: impl FnOnce(&str, VariableValue),
    ) {
        match value {
            VariableValue::Bool(v) => {
                self.set_player_bool(target, v, |t, v| internal(t, VariableValue::Bool(v)))
            }
            VariableValue::Int(v) => {
                self.set_player_int(target, v, |t, v| internal(t, VariableValue::Int(v)))
            }
            VariableValue::Float(v) => {
                self.set_player_float(target, v, |t, v| internal(t, VariableValue::Float(v)))
            }
            VariableValue::String(v) => {
                self.set_player_string(target, v, |t, v| internal(t, VariableValue::String(v)))
            }
            VariableValue::Vector3(v) => {
                self.set_player_vector3(target, v, |t, v| internal(t, VariableValue::Vector3(v)))
            }
            other @ VariableValue::Other(_) => {
                intercept_set(&self.set_player_variable, target, other, internal)
            }
        }
    }

    /// Intercepts a read of any type.
    ///
    /// The variant of the host's value selects the channel, so a bool field
    /// is overridden by `get_player_bool` subscribers and so on.
    pub fn get_player_variable(
        &self,
        target: &str,
        internal: impl FnOnce(&str) -> VariableValue,
    ) -> VariableValue {
        let args = target.to_string();
        match internal(target) {
            VariableValue::Bool(v) => VariableValue::Bool(self.get_player_bool.dispatch(&args, v)),
            VariableValue::Int(v) => VariableValue::Int(self.get_player_int.dispatch(&args, v)),
            VariableValue::Float(v) => {
                VariableValue::Float(self.get_player_float.dispatch(&args, v))
            }
            VariableValue::String(v) => {
                VariableValue::String(self.get_player_string.dispatch(&args, v))
            }
            VariableValue::Vector3(v) => {
                VariableValue::Vector3(self.get_player_vector3.dispatch(&args, v))
            }
            other @ VariableValue::Other(_) => self.get_player_variable.dispatch(&args, other),
        }
    }

    /// Looks up a localized string, letting the first differing subscriber override it.
    pub fn language_get(
        &self,
        key: &str,
        sheet: &str,
        internal: impl FnOnce(&str, &str) -> String,
    ) -> String {
        let value = internal(key, sheet);
        self.language_get.dispatch(&LanguageKey::new(key, sheet), value)
    }

    /// Runs the cursor subscribers, or `internal` when there are none.
    pub fn cursor(&self, internal: impl FnOnce()) {
        if self.cursor.is_empty() {
            internal();
            return;
        }
        self.cursor.dispatch(&(), ());
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn intercept_set<T: HookValue>(
    channel: &HookChannel<VariableWrite<T>, ()>,
    target: &str,
    value: T,
    internal: impl FnOnce(&str, T),
) {
    if channel.is_empty() {
        internal(target, value);
        return;
    }
    channel.dispatch(&VariableWrite::new(target, value), ());
}

fn intercept_get<T: HookValue>(
    channel: &HookChannel<String, T>,
    target: &str,
    internal: impl FnOnce(&str) -> T,
) -> T {
    let value = internal(target);
    channel.dispatch(&target.to_string(), value)
}
