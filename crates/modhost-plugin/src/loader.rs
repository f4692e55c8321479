//! Dynamic plugin loader using `libloading` (feature-gated).
//!
//! A plugin library exports its manifest through the symbol generated by
//! [`export_plugins!`](crate::export_plugins). Libraries are kept loaded
//! for the process lifetime, since plugin instances point into them.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use modhost_core::result::AppResult;

use crate::discovery::PluginSource;

/// Symbol every plugin library must export.
pub const EXPORTS_SYMBOL: &[u8] = b"modhost_plugin_exports";

/// File extensions treated as plugin libraries.
pub const LIBRARY_EXTENSIONS: [&str; 3] = ["so", "dll", "dylib"];

/// Lists the library files in `dir`, sorted by path. A missing directory
/// yields an empty list.
pub fn scan_directory(dir: &Path) -> AppResult<Vec<PathBuf>> {
    if !dir.exists() {
        warn!(path = %dir.display(), "Plugin directory does not exist");
        return Ok(Vec::new());
    }

    let mut libraries = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_library = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| LIBRARY_EXTENSIONS.contains(&ext));
        if path.is_file() && is_library {
            debug!(path = %path.display(), "Found plugin library");
            libraries.push(path);
        }
    }
    libraries.sort();
    Ok(libraries)
}

/// Builds one source per library in `dir`.
pub fn sources_from_directory(dir: &Path) -> AppResult<Vec<Box<dyn PluginSource>>> {
    Ok(scan_directory(dir)?
        .into_iter()
        .map(|path| Box::new(DynamicLibrarySource::new(path)) as Box<dyn PluginSource>)
        .collect())
}

#[cfg(feature = "dynamic")]
mod dynamic_source {
    use std::path::PathBuf;

    use parking_lot::Mutex;
    use tracing::info;

    use crate::discovery::{ExportedType, PluginSource};

    use super::EXPORTS_SYMBOL;

    /// Signature of the generated export function.
    pub type ExportsFn = fn() -> Vec<ExportedType>;

    /// A plugin library on disk.
    #[derive(Debug)]
    pub struct DynamicLibrarySource {
        path: PathBuf,
        /// The opened library, kept alive once loaded.
        library: Mutex<Option<libloading::Library>>,
    }

    impl DynamicLibrarySource {
        /// Creates a source for the library at `path`; nothing is opened yet.
        pub fn new(path: PathBuf) -> Self {
            Self {
                path,
                library: Mutex::new(None),
            }
        }
    }

    impl PluginSource for DynamicLibrarySource {
        fn location(&self) -> String {
            self.path.display().to_string()
        }

        fn exports(&self) -> Result<Vec<ExportedType>, String> {
            let mut slot = self.library.lock();
            if slot.is_none() {
                // SAFETY: loading a library runs its initializers; only
                // trusted plugin directories should be configured.
                let library = unsafe { libloading::Library::new(&self.path) }
                    .map_err(|e| format!("failed to load library: {e}"))?;
                *slot = Some(library);
                info!(path = %self.path.display(), "Plugin library loaded");
            }
            let Some(library) = slot.as_ref() else {
                return Err("library not loaded".to_string());
            };

            // SAFETY: the symbol is generated by `export_plugins!` with this
            // exact signature, and the library outlives every call.
            let exports: ExportsFn = unsafe {
                *library
                    .get::<ExportsFn>(EXPORTS_SYMBOL)
                    .map_err(|e| format!("missing export manifest: {e}"))?
            };
            Ok(exports())
        }
    }
}

#[cfg(not(feature = "dynamic"))]
mod dynamic_source {
    use std::path::PathBuf;

    use crate::discovery::{ExportedType, PluginSource};

    /// A plugin library on disk. Built without the `dynamic` feature, so
    /// reading its manifest always fails.
    #[derive(Debug)]
    pub struct DynamicLibrarySource {
        path: PathBuf,
    }

    impl DynamicLibrarySource {
        /// Creates a source for the library at `path`.
        pub fn new(path: PathBuf) -> Self {
            Self { path }
        }
    }

    impl PluginSource for DynamicLibrarySource {
        fn location(&self) -> String {
            self.path.display().to_string()
        }

        fn exports(&self) -> Result<Vec<ExportedType>, String> {
            Err("dynamic plugin loading is not enabled in this build".to_string())
        }
    }
}

pub use dynamic_source::DynamicLibrarySource;
