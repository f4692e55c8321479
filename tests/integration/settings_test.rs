//! Integration tests for persisted enabled flags across sessions.

mod helpers;

use modhost_core::settings::{GlobalSettings, SettingsStore};
use modhost_plugin::discovery::ExportedType;

use helpers::{Alpha, Bravo, Dasher, TestSession};

fn dasher_and_bravo() -> Vec<ExportedType> {
    vec![ExportedType::plugin::<Dasher>(), ExportedType::plugin::<Bravo>()]
}

#[tokio::test]
async fn test_disabled_plugin_stays_off_after_restart() {
    let session = TestSession::new();
    let host = helpers::scene_host();
    let sources = helpers::source("mods/pack.so", dasher_and_bravo());
    session.manager.load_all(&host, &sources).await.expect("load");
    session.manager.set_enabled("Dasher", false).expect("disable");

    let session = session.restart();
    let summary = session
        .manager
        .load_all(&host, &sources)
        .await
        .expect("load");

    assert_eq!(summary.unloaded, vec!["Dasher"]);
    let ctx = session.ctx();
    assert!(!ctx.plugins().is_loaded("Dasher"));
    assert!(!ctx.hooks().dash_pressed.dispatch(&(), false));
    assert_eq!(ctx.settings().is_enabled("Dasher"), Some(false));
    assert!(!session.manager.overlay_text().contains("Dasher"));

    session.manager.set_enabled("Dasher", true).expect("enable");
    assert!(ctx.hooks().dash_pressed.dispatch(&(), false));
    assert_eq!(ctx.settings().is_enabled("Dasher"), Some(true));
}

#[tokio::test]
async fn test_flags_of_missing_plugins_are_pruned() {
    let session = TestSession::new();
    let host = helpers::scene_host();
    let both = helpers::source(
        "mods/pack.so",
        vec![ExportedType::plugin::<Alpha>(), ExportedType::plugin::<Bravo>()],
    );
    session.manager.load_all(&host, &both).await.expect("load");

    let session = session.restart();
    let only_bravo = helpers::source("mods/pack.so", vec![ExportedType::plugin::<Bravo>()]);
    session.manager.load_all(&host, &only_bravo).await.expect("load");

    let settings = session.ctx().settings();
    assert_eq!(settings.is_enabled("Alpha"), None);
    assert_eq!(settings.is_enabled("Bravo"), Some(true));
}

#[tokio::test]
async fn test_settings_file_is_written_and_rotated() {
    let session = TestSession::new();
    let host = helpers::scene_host();
    let sources = helpers::source("mods/pack.so", dasher_and_bravo());
    session.manager.load_all(&host, &sources).await.expect("load");
    session.manager.set_enabled("Dasher", false).expect("disable");
    let path = session.settings_path();

    // load_all saved once; shutdown saves again and rotates the first file.
    session.ctx().shutdown().expect("shutdown");

    let text = std::fs::read_to_string(&path).expect("settings file");
    let written: serde_json::Value = serde_json::from_str(&text).expect("valid json");
    assert_eq!(written["plugin_enabled"]["Dasher"], false);
    assert_eq!(written["plugin_enabled"]["Bravo"], true);

    let store = SettingsStore::new(&path);
    assert!(store.backup_path().exists());
    let backup: GlobalSettings =
        serde_json::from_str(&std::fs::read_to_string(store.backup_path()).expect("backup"))
            .expect("valid backup");
    assert_eq!(backup.is_enabled("Dasher"), Some(true));
}

#[tokio::test]
async fn test_corrupt_settings_are_moved_aside() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(helpers::SETTINGS_FILE);
    std::fs::write(&path, "{ \"version\": 1, \"plugin_enabled\": ").expect("write");

    let session = TestSession::in_dir(dir);
    assert_eq!(session.ctx().settings(), GlobalSettings::default());

    let store = SettingsStore::new(&path);
    assert!(store.error_path().exists());
    assert!(!path.exists());

    let sources = helpers::source("mods/pack.so", dasher_and_bravo());
    let summary = session
        .manager
        .load_all(&helpers::scene_host(), &sources)
        .await
        .expect("load");
    assert_eq!(summary.activated, vec!["Dasher", "Bravo"]);
    assert!(path.exists());
}
