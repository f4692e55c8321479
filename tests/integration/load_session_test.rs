//! Integration tests for discovery, ordering, and activation.

mod helpers;

use modhost_plugin::discovery::ExportedType;
use modhost_plugin::{PluginSource, StaticSource};

use helpers::{Alpha, Bravo, Broken, Charlie, Dasher, TestSession, UnreadableSource};

#[tokio::test]
async fn test_activation_follows_load_priority() {
    let session = TestSession::new();
    let sources = helpers::source(
        "mods/ordered.so",
        vec![
            ExportedType::plugin::<Alpha>(),
            ExportedType::plugin::<Bravo>(),
            ExportedType::plugin::<Charlie>(),
        ],
    );

    let summary = session
        .manager
        .load_all(&helpers::scene_host(), &sources)
        .await
        .expect("load");

    assert_eq!(summary.activated, vec!["Bravo", "Charlie", "Alpha"]);
    assert!(summary.failed.is_empty());
    // Discovery order is kept in the records.
    let names: Vec<String> = session.manager.records().into_iter().map(|r| r.name).collect();
    assert_eq!(names, vec!["Alpha", "Bravo", "Charlie"]);
}

#[tokio::test]
async fn test_failing_plugin_does_not_stop_others() {
    let session = TestSession::new();
    let sources = helpers::source(
        "mods/mixed.so",
        vec![ExportedType::plugin::<Broken>(), ExportedType::plugin::<Bravo>()],
    );

    let summary = session
        .manager
        .load_all(&helpers::scene_host(), &sources)
        .await
        .expect("load");

    assert_eq!(summary.activated, vec!["Bravo"]);
    assert_eq!(summary.failed, vec!["Broken"]);
    assert!(!session.ctx().plugins().is_loaded("Broken"));
    assert!(
        session
            .manager
            .overlay_text()
            .contains("Broken: FAILED TO LOAD! Check the log.\n")
    );
}

#[tokio::test]
async fn test_unreadable_candidate_is_reported() {
    let session = TestSession::new();
    let sources: Vec<Box<dyn PluginSource>> = vec![
        Box::new(UnreadableSource),
        Box::new(StaticSource::new("mods/good.so").with_plugin::<Bravo>()),
    ];

    let summary = session
        .manager
        .load_all(&helpers::scene_host(), &sources)
        .await
        .expect("load");

    assert_eq!(summary.discovery_errors.len(), 1);
    assert_eq!(summary.discovery_errors[0].location, "mods/corrupt.so");
    assert_eq!(summary.activated, vec!["Bravo"]);
    let overlay = session.manager.overlay_text();
    assert!(overlay.starts_with("Modding API: 1.5.78\n"));
    assert!(overlay.contains("mods/corrupt.so: FAILED TO LOAD! Check the log.\n"));
}

#[tokio::test]
async fn test_overlay_marks_outdated_plugin() {
    let session = TestSession::new();
    let sources = helpers::source("mods/dash.so", vec![ExportedType::plugin::<Dasher>()]);

    session
        .manager
        .load_all(&helpers::scene_host(), &sources)
        .await
        .expect("load");

    assert_eq!(
        session.manager.overlay_text(),
        "Modding API: 1.5.78\nDasher : 3.0 - New Version Available!\n"
    );
}

#[tokio::test]
async fn test_second_load_session_is_ignored() {
    let session = TestSession::new();
    let sources = helpers::source("mods/dash.so", vec![ExportedType::plugin::<Dasher>()]);
    let host = helpers::scene_host();

    session.manager.load_all(&host, &sources).await.expect("load");
    let again = session.manager.load_all(&host, &sources).await.expect("load");

    assert!(again.activated.is_empty());
    assert_eq!(session.ctx().hooks().dash_pressed.len(), 1);
}
