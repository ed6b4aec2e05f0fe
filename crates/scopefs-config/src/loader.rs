//! Layered TOML loading.
//!
//! Order of application:
//! 1. Embedded `defaults.toml`
//! 2. Merge `<config dir>/scopefs/config.toml` (user)
//! 3. Merge the explicit `--config` file, if any
//! 4. Apply `SCOPEFS_*` fallbacks for fields no file set
//! 5. Deserialize merged tree → `Config`
//! 6. Validate

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::env::{apply_env_fallbacks, collect_env_vars};
use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;
use crate::validate;

/// Defaults compiled into every binary.
const DEFAULTS_TOML: &str = include_str!("defaults.toml");

/// Larger config files are rejected.
const MAX_CONFIG_FILE_SIZE: u64 = 1_048_576;

/// A loaded configuration and where its values came from.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedConfig {
    /// The final configuration.
    pub config: Config,
    /// Config files that were found and merged, lowest precedence first.
    pub loaded_files: Vec<String>,
    /// Dotted fields filled from `SCOPEFS_*` variables.
    pub env_fields: Vec<String>,
}

/// Load configuration with layered precedence.
///
/// `explicit` is a file that must exist (typically from `--config`).
/// `config_dir_override` replaces the platform config directory used to find
/// the user file `config.toml`.
///
/// # Errors
///
/// Returns a [`ConfigError`] if any config file is unreadable, malformed or
/// too large, or if the merged configuration fails validation.
pub fn load(
    explicit: Option<&Path>,
    config_dir_override: Option<&Path>,
) -> ConfigResult<ResolvedConfig> {
    load_with_env(explicit, config_dir_override, &collect_env_vars())
}

/// [`load`] with an explicit environment snapshot.
///
/// # Errors
///
/// See [`load`].
pub fn load_with_env(
    explicit: Option<&Path>,
    config_dir_override: Option<&Path>,
    env_vars: &HashMap<String, String>,
) -> ConfigResult<ResolvedConfig> {
    // 1. Embedded defaults.
    let mut merged: toml::Value =
        toml::from_str(DEFAULTS_TOML).map_err(|e| ConfigError::ParseError {
            path: "<embedded defaults>".to_owned(),
            source: e,
        })?;

    let mut file_set = BTreeSet::new();
    let mut loaded_files = Vec::new();

    // 2. User config.
    let user_path = match config_dir_override {
        Some(dir) => Some(dir.join("config.toml")),
        None => user_config_path(),
    };
    if let Some(path) = user_path {
        if let Some(overlay) = try_load_file(&path)? {
            deep_merge(&mut merged, &overlay, "", &mut file_set);
            loaded_files.push(path.display().to_string());
            info!(path = %path.display(), "loaded user config");
        }
    } else {
        debug!("no platform config directory, skipping user config");
    }

    // 3. Explicit file. Unlike the user layer it must exist.
    if let Some(path) = explicit {
        let overlay = read_file(path)?;
        deep_merge(&mut merged, &overlay, "", &mut file_set);
        loaded_files.push(path.display().to_string());
        info!(path = %path.display(), "loaded explicit config");
    }

    // 4. Env fallbacks.
    let env_fields = apply_env_fallbacks(&mut merged, &file_set, env_vars);
    if !env_fields.is_empty() {
        debug!(fields = ?env_fields, "applied environment variable fallbacks");
    }

    // 5. Deserialize.
    let config: Config =
        merged
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::ParseError {
                path: "<merged config>".to_owned(),
                source: e,
            })?;

    // 6. Validate.
    validate::validate(&config)?;

    Ok(ResolvedConfig {
        config,
        loaded_files,
        env_fields,
    })
}

/// Load a config from a specific file path (no layering, no environment).
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read, parsed or validated.
pub fn load_file(path: &Path) -> ConfigResult<Config> {
    let value = read_file(path)?;
    let config: Config = value
        .try_into()
        .map_err(|e: toml::de::Error| ConfigError::ParseError {
            path: path.display().to_string(),
            source: e,
        })?;
    validate::validate(&config)?;
    Ok(config)
}

/// `<platform config dir>/config.toml` for the `scopefs` application.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "scopefs").map(|d| d.config_dir().join("config.toml"))
}

fn read_file(path: &Path) -> ConfigResult<toml::Value> {
    match try_load_file(path)? {
        Some(value) => Ok(value),
        None => Err(ConfigError::ReadError {
            path: path.display().to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        }),
    }
}

/// Parse `path`; `Ok(None)` when it does not exist.
fn try_load_file(path: &Path) -> ConfigResult<Option<toml::Value>> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no config file here");
            return Ok(None);
        },
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: path.display().to_string(),
                source: e,
            });
        },
    };

    // Measured on the bytes actually read, not a prior stat.
    if content.len() as u64 > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::ValidationError {
            field: path.display().to_string(),
            message: format!(
                "{} bytes exceeds the {} byte config size limit",
                content.len(),
                MAX_CONFIG_FILE_SIZE
            ),
        });
    }

    let value: toml::Value = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(Some(value))
}

/// Recursively deep-merge `overlay` into `base`, recording every leaf the
/// overlay set in `set`.
///
/// Tables merge per-field; scalars and arrays from the overlay replace the
/// base value.
fn deep_merge(
    base: &mut toml::Value,
    overlay: &toml::Value,
    prefix: &str,
    set: &mut BTreeSet<String>,
) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                if let Some(base_val) = base_table.get_mut(key) {
                    deep_merge(base_val, overlay_val, &path, set);
                } else {
                    base_table.insert(key.clone(), overlay_val.clone());
                    record_leaves(overlay_val, &path, set);
                }
            }
        },
        (base, overlay) => {
            *base = overlay.clone();
            set.insert(prefix.to_owned());
        },
    }
}

fn record_leaves(val: &toml::Value, prefix: &str, set: &mut BTreeSet<String>) {
    if let toml::Value::Table(table) = val {
        for (key, child) in table {
            record_leaves(child, &format!("{prefix}.{key}"), set);
        }
    } else {
        set.insert(prefix.to_owned());
    }
}
