//! `scopefs tools`: the host tool catalog.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use scopefs_tools::HostToolRegistry;
use scopefs_vfs::ScopedVfs;

use crate::formatter::{OutputFormat, print_json};

/// Print every tool's name, required parameters and description.
pub(crate) fn run_tools(vfs: Arc<ScopedVfs>, format: OutputFormat) -> Result<ExitCode> {
    let registry = HostToolRegistry::with_defaults(vfs);
    let definitions = registry.definitions();

    match format {
        OutputFormat::Json => print_json(&definitions, format)?,
        OutputFormat::Pretty => {
            for def in &definitions {
                let required = if def.required.is_empty() {
                    "-".to_string()
                } else {
                    def.required.join(", ")
                };
                println!("{:<12} required: {required}", def.name);
                println!("             {}", def.description);
            }
        },
    }
    Ok(ExitCode::SUCCESS)
}
