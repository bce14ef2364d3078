use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::core::config::GitCopyConfig;
use crate::core::copier::{CopyEngine, CopyRequest, MarkupCopier};
use crate::core::style;

/// Validate snippet markup across a tree by copying it into a throwaway
/// directory. Nothing is published; the exit code reflects the findings.
pub async fn run(root_path: PathBuf, ignore: Vec<String>) -> Result<()> {
    if !root_path.is_dir() {
        anyhow::bail!(
            "Source root does not exist or is not a directory: {}",
            root_path.display()
        );
    }

    let config = GitCopyConfig::find_or_default(&root_path)?;
    let mut ignore_patterns = config.copy.ignore;
    ignore_patterns.extend(ignore);

    let scratch = tempfile::tempdir().context("Failed to create scratch directory")?;

    let report = MarkupCopier
        .copy(&CopyRequest {
            root_path,
            ignore: ignore_patterns,
            state: None,
            destination: scratch.path().to_path_buf(),
        })
        .await;

    if !report.is_clean() {
        eprintln!("{}", style::section("Markup errors:"));
        for err in &report.errors {
            eprintln!("  {}", style::error(&err.to_string()));
        }
        anyhow::bail!("{} file(s) failed validation", report.errors.len());
    }

    eprintln!(
        "{} {}",
        "✓".green().bold(),
        format!("{} file(s) checked, no markup errors", report.files_written).bold()
    );

    Ok(())
}
