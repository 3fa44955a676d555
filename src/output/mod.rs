pub mod formatter;

pub use formatter::{
    format_breakdown, format_breakdown_tsv, format_report_json, format_score, format_standings_json,
    format_standings_table, format_tsv, should_use_colors,
};

use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::io::Write;
use std::path::Path;

/// Write a rendered report to `path` atomically, so a reader never sees a
/// half-written file.
pub fn write_report(path: &Path, rendered: &str) -> Result<()> {
    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    file.write_all(rendered.as_bytes())
        .and_then(|_| file.write_all(b"\n"))
        .with_context(|| format!("Failed to write report to {}", path.display()))?;

    file.commit()
        .with_context(|| format!("Failed to save report to {}", path.display()))?;

    Ok(())
}
