//! `scopefs export`: copy scope roots out of the ecosystem.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use scopefs_vfs::ScopedVfs;

use crate::formatter::{OutputFormat, human_size, print_json};

/// Export every scope root of the current task into `dir`.
pub(crate) async fn run_export(
    vfs: &ScopedVfs,
    dir: &Path,
    format: OutputFormat,
) -> Result<ExitCode> {
    let summary = vfs
        .export_tree(dir)
        .await
        .with_context(|| format!("export to {} failed", dir.display()))?;

    match format {
        OutputFormat::Json => print_json(&summary, format)?,
        OutputFormat::Pretty => {
            let scopes: Vec<_> = summary.scopes.iter().map(|s| s.as_str()).collect();
            println!(
                "Exported {} files ({}) from [{}] to {}",
                summary.files_copied,
                human_size(summary.bytes_copied),
                scopes.join(", "),
                summary.destination.display()
            );
        },
    }
    Ok(ExitCode::SUCCESS)
}
