use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;

use crate::core::config::GitCopyConfig;
use crate::core::copier::MarkupCopier;
use crate::core::error::PublishError;
use crate::core::publisher::{PublishRequest, Publisher};
use crate::core::style;

#[allow(clippy::too_many_arguments)]
pub async fn run(
    root_path: PathBuf,
    to_repo: Option<String>,
    branch: Option<String>,
    start_point: Option<String>,
    commit_message: Option<String>,
    delete_everything: bool,
    ignore: Vec<String>,
    state: Option<String>,
    verbose: bool,
) -> Result<()> {
    let source_root = resolve_root(&root_path)?;
    let config = GitCopyConfig::find_or_default(&source_root)?;

    let destination_repo = to_repo.or(config.publish.repo).context(
        "No destination repository.\n\
         Hint: Pass --to-repo, or set `repo` under [publish] in gitcopy.toml.",
    )?;

    // Config patterns first so command-line ones can refine them.
    let mut ignore_patterns = config.copy.ignore;
    ignore_patterns.extend(ignore);

    let request = PublishRequest {
        source_root,
        destination_repo,
        branch: branch.or(config.publish.branch),
        start_point,
        commit_message: commit_message.or(config.publish.commit_message),
        delete_everything,
        ignore_patterns,
        state: state.or(config.copy.state),
    };

    let publisher = Publisher::new(MarkupCopier).verbose(verbose);
    let report = match publisher.publish(&request).await {
        Ok(report) => report,
        Err(PublishError::Content(errors)) => {
            eprintln!("{}", style::section("Copy errors:"));
            for err in &errors {
                eprintln!("  {}", style::error(&err.to_string()));
            }
            anyhow::bail!(
                "copy reported {} error(s); nothing was committed or pushed",
                errors.len()
            );
        }
        Err(err) => return Err(err.into()),
    };

    // Summary
    let short = &report.commit[..7.min(report.commit.len())];
    eprintln!(
        "{} Published commit {}",
        "✓".green().bold(),
        style::commit_hash(short)
    );
    eprintln!();
    if let Some(branch) = &report.branch {
        let verb = if report.branch_created {
            "created"
        } else {
            "updated"
        };
        eprintln!("{}", style::summary_line("Branch", &format!("{} ({})", branch, verb)));
    } else {
        eprintln!("{}", style::summary_line("Branch", "default"));
    }
    eprintln!(
        "{}",
        style::summary_line("Files copied", &report.files_written.to_string())
    );
    if report.changes.added > 0 {
        eprintln!(
            "{}",
            style::summary_line("Added", &report.changes.added.to_string().green().to_string())
        );
    }
    if report.changes.modified > 0 {
        eprintln!(
            "{}",
            style::summary_line(
                "Modified",
                &report.changes.modified.to_string().yellow().to_string()
            )
        );
    }
    if report.changes.deleted > 0 {
        eprintln!(
            "{}",
            style::summary_line("Deleted", &report.changes.deleted.to_string().red().to_string())
        );
    }
    if report.changes.is_empty() {
        eprintln!(
            "{}",
            style::hint("  Tree matched the branch tip; an empty commit was pushed.")
        );
    }

    Ok(())
}

fn resolve_root(path: &Path) -> Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    let full_path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    };

    if !full_path.is_dir() {
        anyhow::bail!(
            "Source root does not exist or is not a directory: {}\n\
             Hint: Check the path and try again.",
            full_path.display()
        );
    }

    Ok(full_path)
}
