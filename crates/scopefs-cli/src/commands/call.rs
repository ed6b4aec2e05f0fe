//! `scopefs call`: one tool invocation.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use scopefs_tools::HostToolRegistry;
use scopefs_vfs::ScopedVfs;
use serde_json::Value;

use crate::formatter::{OutputFormat, print_json};

/// Dispatch `tool` and print the envelope. Failure envelopes exit non-zero.
pub(crate) async fn run_call(
    vfs: Arc<ScopedVfs>,
    tool: &str,
    params: Option<&str>,
    format: OutputFormat,
) -> Result<ExitCode> {
    ensure_one_shot(tool)?;

    let params: Value = match params {
        Some(raw) => serde_json::from_str(raw).context("--params is not valid JSON")?,
        None => Value::Object(serde_json::Map::new()),
    };

    let registry = HostToolRegistry::with_defaults(vfs);
    let envelope = registry.call(tool, params).await;
    print_json(&envelope, format)?;

    if envelope.get("success").and_then(Value::as_bool) == Some(true) {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// Tools whose result only matters while the process keeps running.
const LONG_LIVED: &[(&str, &str)] = &[("watchFile", "scopefs watch <path> --scope <scope>")];

fn ensure_one_shot(tool: &str) -> Result<()> {
    if let Some((_, instead)) = LONG_LIVED.iter().find(|(name, _)| *name == tool) {
        bail!("{tool} would be closed as soon as `call` exits; use `{instead}` instead");
    }
    Ok(())
}
