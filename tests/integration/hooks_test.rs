//! Integration tests for hook combination across plugins.

mod helpers;

use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};

use modhost_plugin::discovery::ExportedType;
use modhost_plugin::prelude::*;

use helpers::TestSession;

#[derive(Debug, Default)]
struct Doubler;

impl Plugin for Doubler {
    fn name(&self) -> String {
        "Doubler".to_string()
    }
    fn version(&self) -> String {
        "1.0".to_string()
    }
    fn initialize(&self, ctx: &PluginContext, _: Option<PluginPreloads>) -> Result<(), PluginFault> {
        ctx.hooks().soul_gain.subscribe_fn(ctx.owner(), |_: &(), soul| Ok(soul * 2));
        ctx.hooks()
            .language_get
            .subscribe_fn(ctx.owner(), |key: &LanguageKey, text| {
                Ok(if key.key == "TITLE" { "Doubled".to_string() } else { text })
            });
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Adder;

impl Plugin for Adder {
    fn name(&self) -> String {
        "Adder".to_string()
    }
    fn version(&self) -> String {
        "1.0".to_string()
    }
    fn load_priority(&self) -> i32 {
        2
    }
    fn initialize(&self, ctx: &PluginContext, _: Option<PluginPreloads>) -> Result<(), PluginFault> {
        ctx.hooks().soul_gain.subscribe_fn(ctx.owner(), |_: &(), soul| Ok(soul + 1));
        ctx.hooks()
            .language_get
            .subscribe_fn(ctx.owner(), |_: &LanguageKey, _| Ok("Added".to_string()));
        ctx.hooks()
            .set_player_int
            .observe(ctx.owner(), |_: &VariableWrite<i32>| {});
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Faulty;

impl Plugin for Faulty {
    fn name(&self) -> String {
        "Faulty".to_string()
    }
    fn version(&self) -> String {
        "1.0".to_string()
    }
    fn load_priority(&self) -> i32 {
        0
    }
    fn initialize(&self, ctx: &PluginContext, _: Option<PluginPreloads>) -> Result<(), PluginFault> {
        ctx.hooks()
            .soul_gain
            .subscribe_fn(ctx.owner(), |_: &(), _| panic!("soul overflow"));
        ctx.hooks()
            .take_damage
            .subscribe_fn(ctx.owner(), |_: &DamageArgs, _| Err(HookFault::new("no")));
        Ok(())
    }
}

async fn loaded(exports: Vec<ExportedType>) -> TestSession {
    let session = TestSession::new();
    let sources = helpers::source("mods/hooks.so", exports);
    session
        .manager
        .load_all(&helpers::scene_host(), &sources)
        .await
        .expect("load");
    session
}

#[tokio::test]
async fn test_chain_follows_activation_order() {
    let session = loaded(vec![
        ExportedType::plugin::<Adder>(),
        ExportedType::plugin::<Doubler>(),
    ])
    .await;

    // Doubler (priority 1) subscribes before Adder (priority 2).
    assert_eq!(session.ctx().hooks().soul_gain.dispatch(&(), 3), 7);
}

#[tokio::test]
async fn test_override_once_takes_first_differing_subscriber() {
    let session = loaded(vec![
        ExportedType::plugin::<Doubler>(),
        ExportedType::plugin::<Adder>(),
    ])
    .await;
    let hooks = session.ctx().hooks();

    let title = hooks.language_get("TITLE", "Menu", |_, _| "Title".to_string());
    assert_eq!(title, "Doubled");
    // Doubler returns the input unchanged, so Adder's value wins.
    let other = hooks.language_get("QUIT", "Menu", |_, _| "Quit".to_string());
    assert_eq!(other, "Added");
}

#[tokio::test]
async fn test_faulting_subscriber_is_skipped() {
    let session = loaded(vec![
        ExportedType::plugin::<Doubler>(),
        ExportedType::plugin::<Faulty>(),
    ])
    .await;
    let hooks = session.ctx().hooks();

    assert_eq!(hooks.soul_gain.dispatch(&(), 5), 10);
    assert_eq!(hooks.take_damage.dispatch(&DamageArgs { hazard_type: 1 }, 2), 2);
    assert!(session.ctx().plugins().is_loaded("Faulty"));
}

#[tokio::test]
async fn test_subscribed_setter_replaces_internal_write() {
    let session = loaded(vec![ExportedType::plugin::<Adder>()]).await;
    let hooks = session.ctx().hooks();

    let stored = Arc::new(AtomicI32::new(0));
    let sink = Arc::clone(&stored);
    hooks.set_player_variable("geo", VariableValue::Int(300), move |_, v| {
        if let VariableValue::Int(v) = v {
            sink.store(v, Ordering::SeqCst);
        }
    });
    // Adder observes integer writes, so the host's own write is skipped.
    assert_eq!(stored.load(Ordering::SeqCst), 0);

    let sink = Arc::clone(&stored);
    hooks.set_player_variable("name", VariableValue::String("Ghost".to_string()), move |_, _| {
        sink.store(1, Ordering::SeqCst);
    });
    assert_eq!(stored.load(Ordering::SeqCst), 1);
}
