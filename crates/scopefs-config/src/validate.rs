//! Post-merge configuration validation.

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

/// Validate a fully-merged and deserialized configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_vfs(config)?;
    validate_events(config)?;
    validate_logging(config)?;
    Ok(())
}

fn validate_vfs(config: &Config) -> ConfigResult<()> {
    validate_identifier("vfs.task_id", &config.vfs.task_id)?;
    validate_identifier("vfs.run_id", &config.vfs.run_id)?;

    if let Some(root) = &config.vfs.root
        && root.as_os_str().is_empty()
    {
        return Err(ConfigError::ValidationError {
            field: "vfs.root".to_owned(),
            message: "must not be empty; omit it to use the data directory".to_owned(),
        });
    }
    Ok(())
}

fn validate_identifier(field: &str, value: &str) -> ConfigResult<()> {
    let message = if value.trim().is_empty() {
        Some("must not be empty")
    } else if value == "." || value == ".." {
        Some("must not be a relative directory name")
    } else if value.contains(['/', '\\', '\0']) {
        Some("must not contain path separators")
    } else {
        None
    };

    match message {
        Some(message) => Err(ConfigError::ValidationError {
            field: field.to_owned(),
            message: format!("'{value}' {message}"),
        }),
        None => Ok(()),
    }
}

fn validate_events(config: &Config) -> ConfigResult<()> {
    if config.events.channel_capacity == 0 {
        return Err(ConfigError::ValidationError {
            field: "events.channel_capacity".to_owned(),
            message: "must be at least 1".to_owned(),
        });
    }
    Ok(())
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let logging = &config.logging;
    one_of("logging.level", &logging.level, &[
        "trace", "debug", "info", "warn", "error",
    ])?;
    one_of("logging.format", &logging.format, &[
        "pretty", "compact", "json", "full",
    ])?;
    one_of("logging.target", &logging.target, &["stderr", "stdout", "file"])?;
    one_of("logging.rotation", &logging.rotation, &["daily", "hourly", "never"])?;

    if logging.target == "file" && logging.directory.is_none() {
        return Err(ConfigError::ValidationError {
            field: "logging.directory".to_owned(),
            message: "required when logging.target is \"file\"".to_owned(),
        });
    }
    Ok(())
}

fn one_of(field: &str, value: &str, allowed: &[&str]) -> ConfigResult<()> {
    if allowed.contains(&value) {
        return Ok(());
    }
    Err(ConfigError::ValidationError {
        field: field.to_owned(),
        message: format!(
            "unsupported value '{value}'; expected one of: {}",
            allowed.join(", ")
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_bad_identifiers() {
        for bad in ["", "  ", "..", "a/b", "a\\b"] {
            let mut config = Config::default();
            config.vfs.task_id = bad.to_owned();
            let err = validate(&config).unwrap_err();
            assert!(err.to_string().contains("vfs.task_id"), "{bad:?}: {err}");
        }

        let mut config = Config::default();
        config.vfs.run_id = ".".to_owned();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_empty_root() {
        let mut config = Config::default();
        config.vfs.root = Some(PathBuf::new());
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_capacity() {
        let mut config = Config::default();
        config.events.channel_capacity = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_logging_values() {
        let mut config = Config::default();
        config.logging.level = "verbose".to_owned();
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.logging.format = "xml".to_owned();
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.logging.target = "file".to_owned();
        assert!(validate(&config).is_err());
        config.logging.directory = Some(PathBuf::from("/tmp/logs"));
        assert!(validate(&config).is_ok());
    }
}
