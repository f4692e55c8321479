//! Integration tests for the preload pass.

mod helpers;

use modhost_plugin::discovery::ExportedType;
use modhost_plugin::host::memory::HostEvent;

use helpers::{Bravo, Collector, Diver, PRELOADED_TARGET, TestSession};

#[tokio::test]
async fn test_plugin_receives_inert_copies() {
    let session = TestSession::new();
    let host = helpers::scene_host();
    let sources = helpers::source("mods/collector.so", vec![ExportedType::plugin::<Collector>()]);

    let summary = session.manager.load_all(&host, &sources).await.expect("load");

    assert_eq!(summary.activated, vec!["Collector"]);
    // Elder/Hat, Well, Grub; the missing child and rejected requests are skipped.
    let count = session
        .ctx()
        .hooks()
        .get_player_int(PRELOADED_TARGET, |_| 0);
    assert_eq!(count, 3);

    assert_eq!(host.loaded_scenes(), vec!["Town", "Crossroads", "Menu_Title"]);
    assert_eq!(host.active_scene().as_deref(), Some("Menu_Title"));
    assert!(!host.blanker_visible());
    let events = host.events();
    assert_eq!(events.first(), Some(&HostEvent::BlankerShown));
    assert_eq!(events.last(), Some(&HostEvent::BlankerHidden));
}

#[tokio::test]
async fn test_failed_scene_skips_plugins_waiting_on_it() {
    let session = TestSession::new();
    let host = helpers::scene_host();
    let sources = helpers::source(
        "mods/pack.so",
        vec![
            ExportedType::plugin::<Collector>(),
            ExportedType::plugin::<Diver>(),
            ExportedType::plugin::<Bravo>(),
        ],
    );

    let summary = session.manager.load_all(&host, &sources).await.expect("load");

    // Town and Crossroads succeed before Abyss fails.
    assert_eq!(summary.activated, vec!["Collector", "Bravo"]);
    assert_eq!(summary.failed, vec!["Diver"]);
    assert!(
        session
            .manager
            .overlay_text()
            .contains("Diver: FAILED TO LOAD! Check the log.\n")
    );
    assert_eq!(host.active_scene().as_deref(), Some("Menu_Title"));
}

#[tokio::test]
async fn test_early_failure_skips_every_later_scene() {
    let session = TestSession::new();
    let host = helpers::scene_host();
    let sources = helpers::source(
        "mods/pack.so",
        vec![
            ExportedType::plugin::<Diver>(),
            ExportedType::plugin::<Collector>(),
        ],
    );

    let summary = session.manager.load_all(&host, &sources).await.expect("load");

    assert!(summary.activated.is_empty());
    assert_eq!(summary.failed, vec!["Diver", "Collector"]);
    assert_eq!(host.loaded_scenes(), vec!["Menu_Title"]);
    assert!(!host.blanker_visible());
}

#[tokio::test]
async fn test_no_requests_leaves_host_untouched() {
    let session = TestSession::new();
    let host = helpers::scene_host();
    let sources = helpers::source("mods/plain.so", vec![ExportedType::plugin::<Bravo>()]);

    session.manager.load_all(&host, &sources).await.expect("load");

    assert!(host.events().is_empty());
    assert_eq!(host.frame(), 0);
}
