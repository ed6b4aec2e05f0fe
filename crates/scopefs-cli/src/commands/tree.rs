//! `scopefs tree`: scope root summary.

use std::process::ExitCode;

use anyhow::Result;
use scopefs_vfs::{Scope, ScopedVfs};

use crate::formatter::{OutputFormat, human_size, print_json};

/// Print each scope root, whether it exists and its total size.
pub(crate) async fn run_tree(vfs: &ScopedVfs, format: OutputFormat) -> Result<ExitCode> {
    let tree = vfs.tree().await;

    match format {
        OutputFormat::Json => print_json(&tree, format)?,
        OutputFormat::Pretty => {
            for scope in Scope::ALL {
                let summary = tree.get(scope);
                let state = if summary.exists { "" } else { " (missing)" };
                println!(
                    "{:<7} {:>10}  {}{state}",
                    scope.as_str(),
                    human_size(summary.size),
                    summary.path.display()
                );
            }
        },
    }
    Ok(ExitCode::SUCCESS)
}
