use std::path::PathBuf;

use anyhow::Result;
use colored::Colorize;

use crate::core::config::GitCopyConfig;
use crate::core::copier::{CopyEngine, CopyRequest, MarkupCopier};
use crate::core::style;

/// Run the copy engine against a plain directory — same processing as
/// `publish`, no git involved.
pub async fn run(
    root_path: PathBuf,
    destination: PathBuf,
    ignore: Vec<String>,
    state: Option<String>,
) -> Result<()> {
    if !root_path.is_dir() {
        anyhow::bail!(
            "Source root does not exist or is not a directory: {}",
            root_path.display()
        );
    }

    let config = GitCopyConfig::find_or_default(&root_path)?;
    let mut ignore_patterns = config.copy.ignore;
    ignore_patterns.extend(ignore);

    std::fs::create_dir_all(&destination)?;

    eprintln!(
        "{}",
        style::step(
            "Copying",
            &format!("{} -> {}...", root_path.display(), destination.display())
        )
    );

    let report = MarkupCopier
        .copy(&CopyRequest {
            root_path,
            ignore: ignore_patterns,
            state: state.or(config.copy.state),
            destination,
        })
        .await;

    if !report.is_clean() {
        eprintln!("{}", style::section("Copy errors:"));
        for err in &report.errors {
            eprintln!("  {}", style::error(&err.to_string()));
        }
        anyhow::bail!("copy reported {} error(s)", report.errors.len());
    }

    eprintln!(
        "{} {}",
        "✓".green().bold(),
        format!("{} file(s) copied", report.files_written).bold()
    );

    Ok(())
}
