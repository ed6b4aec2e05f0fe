//! Output formatting for command results.

use anyhow::Result;
use serde::Serialize;

/// How command results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum OutputFormat {
    /// Indented JSON and human-readable summaries.
    Pretty,
    /// One compact JSON document per result.
    Json,
}

/// Print `value` as JSON in the requested style.
pub(crate) fn print_json(value: &impl Serialize, format: OutputFormat) -> Result<()> {
    let text = match format {
        OutputFormat::Pretty => serde_json::to_string_pretty(value)?,
        OutputFormat::Json => serde_json::to_string(value)?,
    };
    println!("{text}");
    Ok(())
}

/// Render a byte count with a binary unit.
pub(crate) fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes;
    let mut unit = 0;
    while value >= 1024 && unit < UNITS.len().saturating_sub(1) {
        value = value.saturating_div(1024);
        unit = unit.saturating_add(1);
    }
    format!("{value} {}", UNITS.get(unit).copied().unwrap_or("B"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(0), "0 B");
        assert_eq!(human_size(1023), "1023 B");
        assert_eq!(human_size(2048), "2 KiB");
        assert_eq!(human_size(5_242_880), "5 MiB");
    }
}
