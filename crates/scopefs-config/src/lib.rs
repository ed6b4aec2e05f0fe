#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
//! Layered configuration for scopefs.
//!
//! # Usage
//!
//! ```rust,no_run
//! use scopefs_config::Config;
//!
//! let resolved = Config::load(None).unwrap();
//! println!("task: {}", resolved.config.vfs.task_id);
//! ```
//!
//! # Layers
//!
//! Later layers win:
//!
//! 1. **Embedded defaults** (`defaults.toml`)
//! 2. **User file** (`<config dir>/scopefs/config.toml`)
//! 3. **Explicit file** (`--config <path>`, must exist)
//!
//! `SCOPEFS_*` variables only fill fields none of the files set.
//!
//! This crate has no dependencies on other scopefs crates. The binary turns
//! `[vfs]` into VFS options; `scopefs-telemetry` (feature `config`) turns
//! `[logging]` into a log config.

/// `SCOPEFS_*` fallbacks.
pub mod env;
/// Load and validation errors.
pub mod error;
/// Layered file loading.
pub mod loader;
/// The `Config` tree.
pub mod types;
/// Semantic checks on a merged `Config`.
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::ResolvedConfig;
pub use types::*;

impl Config {
    /// Load every layer from the platform locations plus `explicit`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any layer is malformed or the result
    /// fails validation.
    pub fn load(explicit: Option<&std::path::Path>) -> ConfigResult<ResolvedConfig> {
        loader::load(explicit, None)
    }
}
