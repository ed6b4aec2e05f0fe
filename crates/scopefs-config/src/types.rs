//! Configuration types.
//!
//! Every struct implements [`Default`] matching `defaults.toml`, so a bare
//! `[section]` header in TOML produces a working configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Scope roots and identity of the current task and run.
    pub vfs: VfsSection,
    /// Event bus sizing.
    pub events: EventsSection,
    /// Logging level, format, target and per-crate directives.
    pub logging: LoggingSection,
}

// ---------------------------------------------------------------------------
// VfsSection
// ---------------------------------------------------------------------------

/// Scoped filesystem settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VfsSection {
    /// Ecosystem root. `None` uses the platform data directory.
    pub root: Option<PathBuf>,
    /// Task the `task` and `run` scopes belong to.
    pub task_id: String,
    /// Run the `run` scope belongs to.
    pub run_id: String,
    /// Log every tool dispatch at info level.
    pub debug: bool,
}

impl Default for VfsSection {
    fn default() -> Self {
        Self {
            root: None,
            task_id: "default".to_owned(),
            run_id: "default".to_owned(),
            debug: false,
        }
    }
}

impl VfsSection {
    /// The configured root, or `<data dir>/scopefs` when unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoHomeDir`] if no root is configured and the
    /// platform has no data directory.
    pub fn ecosystem_root(&self) -> ConfigResult<PathBuf> {
        if let Some(root) = &self.root {
            return Ok(root.clone());
        }
        directories::ProjectDirs::from("", "", "scopefs")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or(ConfigError::NoHomeDir)
    }
}

// ---------------------------------------------------------------------------
// EventsSection
// ---------------------------------------------------------------------------

/// Event bus settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsSection {
    /// Broadcast channel capacity. Slow receivers skip events beyond this.
    pub channel_capacity: usize,
}

impl Default for EventsSection {
    fn default() -> Self {
        Self {
            channel_capacity: 1024,
        }
    }
}

// ---------------------------------------------------------------------------
// LoggingSection
// ---------------------------------------------------------------------------

/// Logging and tracing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Global log level filter (`"trace"`, `"debug"`, `"info"`, `"warn"`,
    /// `"error"`).
    pub level: String,
    /// Output format: `"pretty"`, `"compact"`, `"json"` or `"full"`.
    pub format: String,
    /// Per-crate tracing directives (e.g. `["scopefs_vfs=debug"]`).
    pub directives: Vec<String>,
    /// Where logs go: `"stderr"`, `"stdout"` or `"file"`.
    pub target: String,
    /// Log directory for the `"file"` target.
    pub directory: Option<PathBuf>,
    /// File rotation for the `"file"` target: `"daily"`, `"hourly"` or
    /// `"never"`.
    pub rotation: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "compact".to_owned(),
            directives: Vec::new(),
            target: "stderr".to_owned(),
            directory: None,
            rotation: "daily".to_owned(),
        }
    }
}
