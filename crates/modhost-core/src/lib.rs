//! # modhost-core
//!
//! Core crate for modhost. Contains configuration schemas, the persisted
//! settings record with its rotating file store, and the unified error
//! system.
//!
//! This crate has **no** internal dependencies on other modhost crates.

pub mod config;
pub mod error;
pub mod result;
pub mod settings;

pub use error::AppError;
pub use result::AppResult;
