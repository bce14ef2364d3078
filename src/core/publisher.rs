//! The publish workflow: clone, branch, purge, copy, commit, push.

use std::path::PathBuf;

use crate::core::copier::{CopyEngine, CopyRequest};
use crate::core::error::PublishError;
use crate::core::remote::{self, CloneOptions};
use crate::core::repo::{ChangeSummary, CloneRepo};
use crate::core::style;
use crate::core::workspace::ClonedWorkspace;

/// Commit message used when the caller supplies none.
pub const DEFAULT_COMMIT_MESSAGE: &str = "Update";

/// One publish invocation's inputs. Immutable once built.
#[derive(Debug, Clone)]
pub struct PublishRequest {
    /// Tree to publish
    pub source_root: PathBuf,
    /// Destination repository (path or URL)
    pub destination_repo: String,
    /// Target branch; reused if it exists remotely, created otherwise
    pub branch: Option<String>,
    /// Ref to branch from, only meaningful when creating a new branch
    pub start_point: Option<String>,
    /// Commit text; defaults to [`DEFAULT_COMMIT_MESSAGE`]
    pub commit_message: Option<String>,
    /// Purge the clone before copying
    pub delete_everything: bool,
    /// Gitignore-style globs handed to the copy engine
    pub ignore_patterns: Vec<String>,
    /// Content variant handed to the copy engine
    pub state: Option<String>,
}

/// Remote state of the requested branch. Derived, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchResolution {
    pub exists: bool,
}

/// Decide how to clone from the requested branch and its remote state.
///
/// Clones are always shallow; they are pinned to the branch only when it
/// already exists remotely — otherwise the default branch is cloned and the
/// branch is created locally afterwards.
pub fn clone_options(branch: Option<&str>, resolution: BranchResolution) -> CloneOptions {
    CloneOptions {
        branch: match (branch, resolution.exists) {
            (Some(name), true) => Some(name.to_string()),
            _ => None,
        },
        depth: 1,
    }
}

/// What a successful publish did.
#[derive(Debug)]
pub struct PublishReport {
    pub commit: String,
    pub branch: Option<String>,
    pub branch_created: bool,
    pub files_written: usize,
    pub changes: ChangeSummary,
}

/// Orchestrates one publish: strictly sequential steps, a copy engine
/// consumed through its contract, and a workspace that is released on
/// every exit path. Single-shot — nothing is retried; callers decide
/// whether to retry a failed invocation.
pub struct Publisher<E: CopyEngine> {
    engine: E,
    verbose: bool,
}

impl<E: CopyEngine> Publisher<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            verbose: false,
        }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Run the full publish sequence against `request.destination_repo`.
    pub async fn publish(&self, request: &PublishRequest) -> Result<PublishReport, PublishError> {
        let resolution = resolve_branch(request)?;
        let options = clone_options(request.branch.as_deref(), resolution);

        let workspace = ClonedWorkspace::create(&request.destination_repo)?;
        let result = self
            .publish_into(&workspace, request, resolution, &options)
            .await;

        match result {
            // Surface removal failures on the success path.
            Ok(report) => {
                workspace.close()?;
                Ok(report)
            }
            // On failure the workspace drops here; removal is best-effort
            // so the original error stays the one reported.
            Err(err) => Err(err),
        }
    }

    async fn publish_into(
        &self,
        workspace: &ClonedWorkspace,
        request: &PublishRequest,
        resolution: BranchResolution,
        options: &CloneOptions,
    ) -> Result<PublishReport, PublishError> {
        eprintln!(
            "{}",
            style::step("Cloning", &format!("{}...", request.destination_repo))
        );
        remote::clone(&request.destination_repo, workspace.path(), options)?;
        let repo = CloneRepo::open(workspace.path())?;

        let mut branch_created = false;
        if let Some(branch) = &request.branch {
            if resolution.exists {
                if request.start_point.is_some() {
                    eprintln!(
                        "{}",
                        style::warning(&format!(
                            "Branch '{}' already exists; --start-point ignored.",
                            branch
                        ))
                    );
                }
            } else {
                eprintln!(
                    "{}",
                    style::step("Creating", &format!("branch '{}'...", branch))
                );
                repo.create_branch(branch, request.start_point.as_deref())?;
                branch_created = true;
            }
        }

        if request.delete_everything {
            self.list_tree(workspace, "Clone tree before purge:");
            eprintln!("{}", style::step("Purging", "clone contents..."));
            workspace.purge()?;
            self.list_tree(workspace, "Clone tree after purge:");
        }

        eprintln!(
            "{}",
            style::step("Copying", &format!("{}...", request.source_root.display()))
        );
        let copy_request = CopyRequest {
            root_path: request.source_root.clone(),
            ignore: request.ignore_patterns.clone(),
            state: request.state.clone(),
            destination: workspace.path().to_path_buf(),
        };
        let report = self.engine.copy(&copy_request).await;
        if !report.is_clean() {
            return Err(PublishError::Content(report.errors));
        }

        repo.stage_all()?;
        let changes = repo.change_summary()?;

        eprintln!("{}", style::step("Committing", "..."));
        let message = request
            .commit_message
            .as_deref()
            .unwrap_or(DEFAULT_COMMIT_MESSAGE);
        let commit = repo.commit(message)?;

        eprintln!("{}", style::step("Pushing", "..."));
        remote::push(workspace.path(), request.branch.as_deref())?;

        Ok(PublishReport {
            commit,
            branch: request.branch.clone(),
            branch_created,
            files_written: report.files_written,
            changes,
        })
    }

    fn list_tree(&self, workspace: &ClonedWorkspace, label: &str) {
        if !self.verbose {
            return;
        }
        eprintln!("{}", style::hint(label));
        for name in workspace.entries() {
            eprintln!("{}", style::tree_entry(&name));
        }
    }
}

/// Query the destination's remote heads for the requested branch.
///
/// No branch name means there is nothing to check — resolved as "does not
/// exist" without any network access.
fn resolve_branch(request: &PublishRequest) -> Result<BranchResolution, PublishError> {
    let exists = match &request.branch {
        Some(branch) => remote::ls_remote_heads(&request.destination_repo, branch)?,
        None => false,
    };
    Ok(BranchResolution { exists })
}
