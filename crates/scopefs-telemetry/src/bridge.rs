//! Conversion from the `[logging]` config section.

use scopefs_config::LoggingSection;

use crate::error::{TelemetryError, TelemetryResult};
use crate::logging::{FileRotation, LogConfig, LogFormat, LogSink};

impl TryFrom<&LoggingSection> for LogConfig {
    type Error = TelemetryError;

    fn try_from(section: &LoggingSection) -> TelemetryResult<Self> {
        let sink = match section.target.as_str() {
            "stderr" => LogSink::Stderr,
            "stdout" => LogSink::Stdout,
            "file" => LogSink::Files {
                directory: section.directory.clone().ok_or_else(|| {
                    TelemetryError::ConfigError("file logging needs a directory".to_string())
                })?,
                rotation: section.rotation.parse::<FileRotation>()?,
            },
            other => {
                return Err(TelemetryError::ConfigError(format!(
                    "unknown log target '{other}'"
                )));
            },
        };

        let mut config = LogConfig::new(section.level.clone())
            .format(section.format.parse::<LogFormat>()?)
            .sink(sink);
        config.directives.clone_from(&section.directives);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_section() {
        let config = LogConfig::try_from(&LoggingSection::default()).unwrap();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Compact);
        assert_eq!(config.sink, LogSink::Stderr);
    }

    #[test]
    fn test_file_section() {
        let section = LoggingSection {
            level: "debug".to_owned(),
            format: "json".to_owned(),
            directives: vec!["scopefs_vfs=trace".to_owned()],
            target: "file".to_owned(),
            directory: Some(PathBuf::from("/var/log/scopefs")),
            rotation: "hourly".to_owned(),
        };
        let config = LogConfig::try_from(&section).unwrap();
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(
            config.sink,
            LogSink::Files {
                directory: PathBuf::from("/var/log/scopefs"),
                rotation: FileRotation::Hourly,
            }
        );
        assert_eq!(config.directives, vec!["scopefs_vfs=trace"]);
    }

    #[test]
    fn test_file_target_without_directory() {
        let section = LoggingSection {
            target: "file".to_owned(),
            directory: None,
            ..LoggingSection::default()
        };
        assert!(LogConfig::try_from(&section).is_err());
    }

    #[test]
    fn test_unknown_target() {
        let section = LoggingSection {
            target: "syslog".to_owned(),
            ..LoggingSection::default()
        };
        assert!(LogConfig::try_from(&section).is_err());
    }
}
