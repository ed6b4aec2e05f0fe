//! Subscriber installation for the scopefs binaries.

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use crate::error::{TelemetryError, TelemetryResult};

fn unknown(kind: &str, value: &str, expected: &str) -> TelemetryError {
    TelemetryError::ConfigError(format!(
        "unknown {kind} '{value}'; expected one of: {expected}"
    ))
}

/// How often a file sink starts a new file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileRotation {
    /// One file per day.
    #[default]
    Daily,
    /// One file per hour.
    Hourly,
    /// A single, ever-growing file.
    Never,
}

impl FromStr for FileRotation {
    type Err = TelemetryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Self::Daily),
            "hourly" => Ok(Self::Hourly),
            "never" => Ok(Self::Never),
            other => Err(unknown("rotation", other, "daily, hourly, never")),
        }
    }
}

impl From<FileRotation> for Rotation {
    fn from(rotation: FileRotation) -> Self {
        match rotation {
            FileRotation::Daily => Self::DAILY,
            FileRotation::Hourly => Self::HOURLY,
            FileRotation::Never => Self::NEVER,
        }
    }
}

/// Line layout of emitted records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Multi-line, indented fields.
    Pretty,
    /// One short line per record.
    #[default]
    Compact,
    /// Newline-delimited JSON objects.
    Json,
    /// One line per record with span context.
    Full,
}

impl FromStr for LogFormat {
    type Err = TelemetryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            "full" => Ok(Self::Full),
            other => Err(unknown("format", other, "pretty, compact, json, full")),
        }
    }
}

/// Where records are written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogSink {
    /// Standard output. Mixes with command output.
    Stdout,
    /// Standard error.
    #[default]
    Stderr,
    /// Rolling files named `scopefs.<date>` under `directory`.
    Files {
        /// Directory holding the log files; created on install.
        directory: PathBuf,
        /// Rotation period.
        rotation: FileRotation,
    },
}

/// Everything [`setup_logging`] needs to install a subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Base `EnvFilter` expression, usually a bare level.
    pub level: String,
    /// Record layout.
    pub format: LogFormat,
    /// Output destination.
    pub sink: LogSink,
    /// Extra per-target directives such as `scopefs_tools=trace`.
    pub directives: Vec<String>,
    /// Prefix each record with a timestamp.
    pub timestamps: bool,
    /// Colorize terminal output. Ignored for file sinks.
    pub ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
            sink: LogSink::Stderr,
            directives: Vec::new(),
            timestamps: true,
            ansi: true,
        }
    }
}

impl LogConfig {
    /// Defaults with `level` as the base filter.
    #[must_use]
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            ..Self::default()
        }
    }

    /// Use `format`.
    #[must_use]
    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Write to `sink`.
    #[must_use]
    pub fn sink(mut self, sink: LogSink) -> Self {
        self.sink = sink;
        self
    }

    /// Append a per-target directive.
    #[must_use]
    pub fn directive(mut self, directive: impl Into<String>) -> Self {
        self.directives.push(directive.into());
        self
    }

    /// Drop timestamps and colors, for piping or snapshotting output.
    #[must_use]
    pub fn plain(mut self) -> Self {
        self.timestamps = false;
        self.ansi = false;
        self
    }

    /// Raise the base level to `debug` unless it is already `trace`.
    #[must_use]
    pub fn verbose(mut self, on: bool) -> Self {
        if on && self.level != "trace" {
            "debug".clone_into(&mut self.level);
        }
        self
    }

    fn env_filter(&self) -> TelemetryResult<EnvFilter> {
        let invalid = |e: tracing_subscriber::filter::ParseError| {
            TelemetryError::ConfigError(format!("invalid log filter: {e}"))
        };
        self.directives
            .iter()
            .try_fold(EnvFilter::try_new(&self.level).map_err(invalid)?, |filter, d| {
                let directive = d
                    .parse::<tracing_subscriber::filter::Directive>()
                    .map_err(invalid)?;
                Ok::<_, TelemetryError>(filter.add_directive(directive))
            })
    }
}

/// Install `config` as the global subscriber.
///
/// # Errors
///
/// Fails on an unparsable filter, an uncreatable log directory, or when a
/// global subscriber is already set.
pub fn setup_logging(config: &LogConfig) -> TelemetryResult<()> {
    let filter = config.env_filter()?;

    let layer = match &config.sink {
        LogSink::Stdout => boxed_layer(config, config.ansi, std::io::stdout),
        LogSink::Stderr => boxed_layer(config, config.ansi, std::io::stderr),
        LogSink::Files {
            directory,
            rotation,
        } => {
            std::fs::create_dir_all(directory)?;
            let appender = RollingFileAppender::new((*rotation).into(), directory, "scopefs");
            boxed_layer(config, false, appender)
        },
    };

    tracing_subscriber::registry()
        .with(layer.with_filter(filter))
        .try_init()
        .map_err(|e| TelemetryError::InitError(e.to_string()))
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

fn boxed_layer<W>(config: &LogConfig, ansi: bool, writer: W) -> BoxedLayer
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let base = fmt::layer().with_writer(writer).with_ansi(ansi);

    match (config.format, config.timestamps) {
        (LogFormat::Json, true) => base.json().boxed(),
        (LogFormat::Json, false) => base.json().without_time().boxed(),
        (LogFormat::Pretty, true) => base.pretty().boxed(),
        (LogFormat::Pretty, false) => base.pretty().without_time().boxed(),
        (LogFormat::Compact, true) => base.compact().boxed(),
        (LogFormat::Compact, false) => base.compact().without_time().boxed(),
        (LogFormat::Full, true) => base.boxed(),
        (LogFormat::Full, false) => base.without_time().boxed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_target_stderr() {
        let config = LogConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Compact);
        assert_eq!(config.sink, LogSink::Stderr);
        assert!(config.timestamps && config.ansi);
    }

    #[test]
    fn test_chained_settings() {
        let config = LogConfig::new("warn")
            .format(LogFormat::Json)
            .directive("scopefs_tools=trace")
            .plain();

        assert_eq!(config.level, "warn");
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.directives, vec!["scopefs_tools=trace"]);
        assert!(!config.timestamps);
        assert!(!config.ansi);
    }

    #[test]
    fn test_verbose_raises_level() {
        assert_eq!(LogConfig::new("info").verbose(true).level, "debug");
        assert_eq!(LogConfig::new("info").verbose(false).level, "info");
        assert_eq!(LogConfig::new("trace").verbose(true).level, "trace");
    }

    #[test]
    fn test_names_parse() {
        assert_eq!("full".parse::<LogFormat>().unwrap(), LogFormat::Full);
        assert_eq!("hourly".parse::<FileRotation>().unwrap(), FileRotation::Hourly);
        let err = "xml".parse::<LogFormat>().unwrap_err();
        assert!(err.to_string().contains("pretty, compact, json, full"));
        assert!("weekly".parse::<FileRotation>().is_err());
    }

    #[test]
    fn test_file_sink_json_shape() {
        let config = LogConfig::new("debug").sink(LogSink::Files {
            directory: PathBuf::from("/var/log/scopefs"),
            rotation: FileRotation::Never,
        });
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["sink"]["files"]["rotation"], "never");

        let back: LogConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_env_filter_rejects_bad_directive() {
        assert!(LogConfig::new("debug").directive("scopefs_vfs=trace").env_filter().is_ok());
        assert!(
            LogConfig::new("debug")
                .directive("[unterminated=span")
                .env_filter()
                .is_err()
        );
    }
}
