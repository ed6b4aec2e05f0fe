//! `scopefs watch`: stream changes to one path.

use std::process::ExitCode;

use anyhow::{Context, Result};
use scopefs_vfs::{Scope, ScopedVfs};
use tracing::info;

use crate::formatter::{OutputFormat, print_json};

/// Print changes to `path` until Ctrl-C.
pub(crate) async fn run_watch(
    vfs: &ScopedVfs,
    path: &str,
    scope: &str,
    format: OutputFormat,
) -> Result<ExitCode> {
    let scope: Scope = scope.parse()?;
    let mut subscription = vfs
        .watch(path, scope)
        .await
        .with_context(|| format!("cannot watch '{path}' in {scope} scope"))?;

    info!(watch_id = %subscription.id(), path, scope = %scope, "Watching; Ctrl-C to stop");

    loop {
        tokio::select! {
            change = subscription.recv() => {
                let Some(change) = change else { break };
                match format {
                    OutputFormat::Json => print_json(&change, format)?,
                    OutputFormat::Pretty => println!(
                        "{} {:?} {}",
                        change.timestamp.to_rfc3339(),
                        change.kind,
                        change.filename.as_deref().unwrap_or(&change.path)
                    ),
                }
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    subscription.close();
    Ok(ExitCode::SUCCESS)
}
