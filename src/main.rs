//! modhost: runs one plugin load session against a scene catalogue.
//!
//! Loads configuration, discovers plugins from the plugin directory,
//! preloads their requested objects, activates them, prints the overlay,
//! and shuts down.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt, reload};

use modhost_core::config::AppConfig;
use modhost_core::result::AppResult;
use modhost_plugin::host::{MemorySceneHost, SceneCatalogue};
use modhost_plugin::{HostContext, PluginManager, PluginSource, loader};

type FilterHandle = reload::Handle<EnvFilter, Registry>;

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "modhost", version, about = "Plugin host for scene-based applications")]
struct Cli {
    /// Configuration file (TOML).
    #[arg(short, long)]
    config: Option<String>,

    /// Scene catalogue (JSON). An empty catalogue is used when omitted.
    #[arg(short, long)]
    scenes: Option<PathBuf>,

    /// Plugin directory, overriding the configured one.
    #[arg(short, long)]
    plugins: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let mut config = match AppConfig::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(dir) = &cli.plugins {
        config.plugins.directory = dir.to_string_lossy().into_owned();
    }

    let filter = init_logging(&config);

    if let Err(e) = run(config, cli.scenes.as_deref(), &filter).await {
        tracing::error!("modhost error: {}", e);
        std::process::exit(1);
    }
}

/// Installs the subscriber. The filter sits behind a reload layer so the
/// persisted level can replace it once settings are read.
fn init_logging(config: &AppConfig) -> FilterHandle {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    let (filter, handle) = reload::Layer::new(filter);
    let registry = tracing_subscriber::registry().with(filter);

    match config.logging.format.as_str() {
        "json" => registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(true))
            .init(),
        _ => registry.with(fmt::layer().pretty().with_target(true)).init(),
    }
    handle
}

/// Applies the persisted logging level unless `RUST_LOG` is set.
fn apply_persisted_level(ctx: &HostContext, filter: &FilterHandle) {
    if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        return;
    }
    let level = ctx.settings().logging_level.as_filter();
    match filter.reload(EnvFilter::new(level)) {
        Ok(()) => info!(level, "Applied persisted logging level"),
        Err(e) => warn!(error = %e, "Could not apply persisted logging level"),
    }
}

async fn run(config: AppConfig, scenes: Option<&Path>, filter: &FilterHandle) -> AppResult<()> {
    info!("Starting modhost v{}", env!("CARGO_PKG_VERSION"));

    let ctx = HostContext::init(config);
    apply_persisted_level(&ctx, filter);

    let host = match scenes {
        Some(path) => MemorySceneHost::from_path(path)?,
        None => MemorySceneHost::new(SceneCatalogue::default()),
    };

    let plugins = &ctx.config().plugins;
    let sources: Vec<Box<dyn PluginSource>> = if plugins.auto_load {
        loader::sources_from_directory(Path::new(&plugins.directory))?
    } else {
        info!("Plugin auto-load disabled");
        Vec::new()
    };

    let manager = PluginManager::new(Arc::clone(&ctx));
    let summary = manager.load_all(&host, &sources).await?;
    for e in &summary.discovery_errors {
        warn!(location = %e.location, reason = %e.reason, "Plugin candidate rejected");
    }

    println!("{}", manager.overlay_text());

    ctx.shutdown()?;
    info!("modhost finished");
    Ok(())
}
