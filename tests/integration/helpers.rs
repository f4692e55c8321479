//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;

use modhost_core::config::AppConfig;
use modhost_plugin::discovery::ExportedType;
use modhost_plugin::host::MemorySceneHost;
use modhost_plugin::prelude::*;
use modhost_plugin::{HostContext, PluginManager, PluginSource, StaticSource};

/// Scene catalogue shared by the tests.
pub const CATALOGUE: &str = r#"{
    "home": "Menu_Title",
    "scenes": [
        {"name": "Town", "roots": [
            {"name": "Elder", "children": [{"name": "Hat"}, {"name": "Cane"}]},
            {"name": "Well"}
        ]},
        {"name": "Crossroads", "roots": [
            {"name": "Grub", "active": false},
            {"name": "Crawler"}
        ]},
        {"name": "Abyss", "roots": [{"name": "Shade"}]}
    ],
    "failing": ["Abyss"]
}"#;

/// Target name under which [`Collector`] reports its preload count.
pub const PRELOADED_TARGET: &str = "collector.preloaded";

/// A test session with its own settings directory.
pub struct TestSession {
    /// Scratch directory holding the settings file.
    pub dir: TempDir,
    /// The manager under test.
    pub manager: PluginManager,
}

impl TestSession {
    /// Creates a session with an empty settings directory.
    pub fn new() -> Self {
        Self::in_dir(tempfile::tempdir().expect("Failed to create temp dir"))
    }

    /// Creates a session reading whatever settings `dir` already holds.
    pub fn in_dir(dir: TempDir) -> Self {
        let manager = PluginManager::new(HostContext::init(config_in(&dir)));
        Self { dir, manager }
    }

    /// Starts a fresh session on the same settings file, as after a restart.
    pub fn restart(self) -> Self {
        self.ctx().shutdown().expect("Failed to shut down session");
        Self::in_dir(self.dir)
    }

    /// Host context of this session.
    pub fn ctx(&self) -> &Arc<HostContext> {
        self.manager.context()
    }

    /// Settings file path.
    pub fn settings_path(&self) -> PathBuf {
        PathBuf::from(&self.ctx().config().settings.path)
    }
}

/// Settings file name inside a session directory.
pub const SETTINGS_FILE: &str = "modhost.settings.json";

/// Configuration pointing the settings file into `dir`.
pub fn config_in(dir: &TempDir) -> AppConfig {
    let mut config = AppConfig::default();
    config.settings.path = dir.path().join(SETTINGS_FILE).to_string_lossy().into_owned();
    config.api.version = "1.5.78".to_string();
    config
}

/// Scene host built from [`CATALOGUE`].
pub fn scene_host() -> MemorySceneHost {
    MemorySceneHost::from_json(CATALOGUE).expect("Invalid test catalogue")
}

/// One static source exporting `exports`.
pub fn source(location: &str, exports: Vec<ExportedType>) -> Vec<Box<dyn PluginSource>> {
    let source = exports
        .into_iter()
        .fold(StaticSource::new(location), StaticSource::with_export);
    vec![Box::new(source)]
}

macro_rules! prioritized {
    ($ty:ident, $priority:expr) => {
        #[derive(Debug, Default)]
        pub struct $ty;

        impl Plugin for $ty {
            fn name(&self) -> String {
                stringify!($ty).to_string()
            }
            fn version(&self) -> String {
                "1.0".to_string()
            }
            fn load_priority(&self) -> i32 {
                $priority
            }
            fn initialize(
                &self,
                _: &PluginContext,
                _: Option<PluginPreloads>,
            ) -> Result<(), PluginFault> {
                Ok(())
            }
        }
    };
}

prioritized!(Alpha, 5);
prioritized!(Bravo, 1);
prioritized!(Charlie, 3);

/// Requests objects from Town and Crossroads and reports how many it got
/// through `get_player_int`.
#[derive(Debug, Default)]
pub struct Collector;

impl Plugin for Collector {
    fn name(&self) -> String {
        "Collector".to_string()
    }
    fn version(&self) -> String {
        "2.1".to_string()
    }
    fn preload_requests(&self) -> Vec<PreloadRequest> {
        vec![
            PreloadRequest::new("Town", "Elder/Hat"),
            PreloadRequest::new("Town", "Well"),
            PreloadRequest::new("Crossroads", "Grub"),
            PreloadRequest::new("Crossroads", "Crawler/Missing"),
            PreloadRequest::new("Town", "/Elder"),
            PreloadRequest::new("Nowhere", "Thing"),
        ]
    }
    fn initialize(
        &self,
        ctx: &PluginContext,
        preloads: Option<PluginPreloads>,
    ) -> Result<(), PluginFault> {
        let preloads = preloads.ok_or_else(|| PluginFault::new("expected preloads"))?;
        let hat = preloads
            .get("Town", "Elder/Hat")
            .ok_or_else(|| PluginFault::new("hat missing"))?;
        if hat.is_active() {
            return Err(PluginFault::new("preloaded copy must be inert"));
        }
        let count = preloads.len() as i32;
        ctx.hooks()
            .get_player_int
            .subscribe_fn(ctx.owner(), move |target: &String, value| {
                Ok(if target == PRELOADED_TARGET { count } else { value })
            });
        Ok(())
    }
}

/// Requests an object from the failing scene.
#[derive(Debug, Default)]
pub struct Diver;

impl Plugin for Diver {
    fn name(&self) -> String {
        "Diver".to_string()
    }
    fn version(&self) -> String {
        "0.9".to_string()
    }
    fn preload_requests(&self) -> Vec<PreloadRequest> {
        vec![PreloadRequest::new("Abyss", "Shade")]
    }
    fn initialize(&self, _: &PluginContext, _: Option<PluginPreloads>) -> Result<(), PluginFault> {
        Ok(())
    }
}

/// Togglable plugin that forces dashing while enabled.
#[derive(Debug, Default)]
pub struct Dasher;

impl Plugin for Dasher {
    fn name(&self) -> String {
        "Dasher".to_string()
    }
    fn version(&self) -> String {
        "3.0".to_string()
    }
    fn is_current(&self) -> bool {
        false
    }
    fn initialize(&self, ctx: &PluginContext, _: Option<PluginPreloads>) -> Result<(), PluginFault> {
        ctx.hooks()
            .dash_pressed
            .subscribe_fn(ctx.owner(), |_: &(), _| Ok(true));
        Ok(())
    }
    fn as_togglable(&self) -> Option<&dyn TogglablePlugin> {
        Some(self)
    }
}

impl TogglablePlugin for Dasher {
    fn unload(&self) -> Result<(), PluginFault> {
        Ok(())
    }
}

/// Fails during initialization.
#[derive(Debug, Default)]
pub struct Broken;

impl Plugin for Broken {
    fn name(&self) -> String {
        "Broken".to_string()
    }
    fn version(&self) -> String {
        "0.1".to_string()
    }
    fn initialize(&self, _: &PluginContext, _: Option<PluginPreloads>) -> Result<(), PluginFault> {
        Err(PluginFault::new("missing dependency"))
    }
}

/// A candidate whose manifest cannot be read.
#[derive(Debug)]
pub struct UnreadableSource;

impl PluginSource for UnreadableSource {
    fn location(&self) -> String {
        "mods/corrupt.so".to_string()
    }

    fn exports(&self) -> Result<Vec<ExportedType>, String> {
        Err("bad image format".to_string())
    }
}
