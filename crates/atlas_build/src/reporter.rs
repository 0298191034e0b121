use std::io::{self, Write};

use colored::Colorize;
use log::debug;

use crate::types::BuildResult;

pub fn print_build_summary<W: Write>(
    writer: &mut W,
    result: &BuildResult,
    elapsed_ms: u128,
) -> io::Result<()> {
    debug!("Printing build summary for {} files", result.files.len());

    if result.files.is_empty() {
        writeln!(
            writer,
            "{} No files matched the configured roots and include patterns.",
            "⚠".yellow().bold()
        )?;
    }

    for artifact in &result.artifacts {
        let display = artifact.strip_prefix(&result.repo_root).unwrap_or(artifact);
        writeln!(writer, "  {} {}", "└──".dimmed(), display.display())?;
    }

    let xref_note = match result.cross_referenced {
        Some(n) => format!(", {} cross-referenced", n.to_string().cyan()),
        None => String::new(),
    };
    writeln!(
        writer,
        "{} Report generated in {} ({} files{}) in {}ms.",
        "●".bright_blue(),
        result.output_dir.blue(),
        result.files.len().to_string().cyan(),
        xref_note,
        elapsed_ms.to_string().cyan()
    )?;
    writer.flush()?;
    Ok(())
}
