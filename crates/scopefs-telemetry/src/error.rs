//! Logging setup failures.

use thiserror::Error;

/// Why a subscriber could not be built or installed.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// A level, format, sink or directive was not understood.
    #[error("bad logging setting: {0}")]
    ConfigError(String),

    /// Another global subscriber is already installed.
    #[error("could not install subscriber: {0}")]
    InitError(String),

    /// The log directory could not be created.
    #[error("log directory: {0}")]
    IoError(#[from] std::io::Error),
}

/// `Result` alias for this crate.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
