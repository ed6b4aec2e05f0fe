//! Scopefs Telemetry - Logging setup for the scopefs binaries.
//!
//! # Example
//!
//! ```rust,no_run
//! use scopefs_telemetry::{LogConfig, LogFormat, setup_logging};
//!
//! # fn main() -> Result<(), scopefs_telemetry::TelemetryError> {
//! let config = LogConfig::new("debug")
//!     .format(LogFormat::Pretty)
//!     .directive("scopefs_vfs=trace");
//!
//! setup_logging(&config)?;
//! tracing::info!("ready");
//! # Ok(())
//! # }
//! ```
//!
//! With the `config` feature, a [`LogConfig`] can be built from the
//! `[logging]` section of a `scopefs-config` configuration.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

#[cfg(feature = "config")]
mod bridge;
mod error;
mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{FileRotation, LogConfig, LogFormat, LogSink, setup_logging};
