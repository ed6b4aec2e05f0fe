//! Configuration error types.

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A TOML document could not be parsed or deserialized.
    #[error("failed to parse {path}: {source}")]
    ParseError {
        /// File (or pseudo-path) that failed.
        path: String,
        /// Underlying parse error.
        #[source]
        source: toml::de::Error,
    },

    /// A config file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    ReadError {
        /// File that failed.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A value is out of range or malformed.
    #[error("invalid value for {field}: {message}")]
    ValidationError {
        /// Dotted field path.
        field: String,
        /// What is wrong with it.
        message: String,
    },

    /// No platform data directory to place the ecosystem root in.
    #[error("could not determine a data directory; set vfs.root or SCOPEFS_ROOT")]
    NoHomeDir,
}

/// Result alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
