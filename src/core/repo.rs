use std::path::{Path, PathBuf};

use git2::{
    IndexAddOption, Repository, Signature, StatusOptions, StatusShow, build::CheckoutBuilder,
};

use crate::core::error::PublishError;

/// Information about a single commit
#[derive(Debug, Clone)]
pub struct CommitInfo {
    pub hash: String,
    pub short_hash: String,
    pub message: String,
}

/// Counts of working-tree changes, for the publish summary.
#[derive(Debug, Default)]
pub struct ChangeSummary {
    pub added: usize,
    pub modified: usize,
    pub deleted: usize,
}

impl ChangeSummary {
    pub fn total(&self) -> usize {
        self.added + self.modified + self.deleted
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Git wrapper for the temporary clone.
///
/// All local git interactions go through this struct so the rest of the
/// codebase doesn't deal with git2 directly. Remote transport (clone, push,
/// ls-remote) lives in [`crate::core::remote`] instead.
pub struct CloneRepo {
    repo: Repository,
    root: PathBuf,
}

impl CloneRepo {
    /// Open the repository at the given path (the clone's working tree).
    pub fn open(path: &Path) -> Result<Self, PublishError> {
        let repo = Repository::open(path).map_err(|e| {
            PublishError::version_control(
                "open",
                format!("{} is not a git repository: {}", path.display(), e.message()),
            )
        })?;

        // Canonicalize to resolve symlinks (e.g., /var -> /private/var on macOS)
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        Ok(Self { repo, root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    // ---------- Branches ----------

    /// Name of the branch HEAD points at, if any.
    pub fn current_branch(&self) -> Option<String> {
        let head = self.repo.head().ok()?;
        head.shorthand().map(str::to_string)
    }

    /// Create a local branch and switch the working tree to it.
    ///
    /// With a start point, the branch is created at that ref and the tree is
    /// checked out to match. Without one, the branch is created at the
    /// current HEAD commit (tree untouched); on an unborn HEAD — a clone of
    /// an empty repository — HEAD is pointed at the new unborn branch so the
    /// first commit lands on it.
    pub fn create_branch(
        &self,
        name: &str,
        start_point: Option<&str>,
    ) -> Result<(), PublishError> {
        let refname = format!("refs/heads/{}", name);

        match start_point {
            Some(rev) => {
                let obj = self.repo.revparse_single(rev).map_err(|e| {
                    PublishError::version_control(
                        "branch",
                        format!("cannot resolve start point '{}': {}", rev, e.message()),
                    )
                })?;
                let commit = obj.peel_to_commit().map_err(|_| {
                    PublishError::version_control(
                        "branch",
                        format!("start point '{}' does not point to a commit", rev),
                    )
                })?;

                self.repo
                    .branch(name, &commit, false)
                    .map_err(|e| PublishError::version_control("branch", e.message()))?;
                self.repo
                    .set_head(&refname)
                    .map_err(|e| PublishError::version_control("checkout", e.message()))?;
                self.repo
                    .checkout_head(Some(CheckoutBuilder::new().force()))
                    .map_err(|e| PublishError::version_control("checkout", e.message()))?;
            }
            None => match self.repo.head() {
                Ok(head) => {
                    let commit = head.peel_to_commit().map_err(|e| {
                        PublishError::version_control("branch", e.message())
                    })?;
                    self.repo
                        .branch(name, &commit, false)
                        .map_err(|e| PublishError::version_control("branch", e.message()))?;
                    // Same commit as HEAD, so the working tree already matches.
                    self.repo
                        .set_head(&refname)
                        .map_err(|e| PublishError::version_control("checkout", e.message()))?;
                }
                Err(_) => {
                    // Unborn HEAD: just repoint it at the new branch name.
                    self.repo
                        .set_head(&refname)
                        .map_err(|e| PublishError::version_control("checkout", e.message()))?;
                }
            },
        }

        Ok(())
    }

    // ---------- Staging ----------

    /// Stage every change in the working tree, deletions included.
    pub fn stage_all(&self) -> Result<(), PublishError> {
        let mut index = self
            .repo
            .index()
            .map_err(|e| PublishError::version_control("stage", e.message()))?;

        index
            .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
            .map_err(|e| PublishError::version_control("stage", e.message()))?;
        index
            .update_all(["*"].iter(), None)
            .map_err(|e| PublishError::version_control("stage", e.message()))?;
        index
            .write()
            .map_err(|e| PublishError::version_control("stage", e.message()))?;

        Ok(())
    }

    // ---------- Commit ----------

    /// Create a commit with all staged changes, returning the full hash.
    pub fn commit(&self, message: &str) -> Result<String, PublishError> {
        let mut index = self
            .repo
            .index()
            .map_err(|e| PublishError::version_control("commit", e.message()))?;
        let tree_oid = index
            .write_tree()
            .map_err(|e| PublishError::version_control("commit", e.message()))?;
        let tree = self
            .repo
            .find_tree(tree_oid)
            .map_err(|e| PublishError::version_control("commit", e.message()))?;

        let sig = self.default_signature()?;

        let commit_oid = if let Ok(head) = self.repo.head() {
            let parent = head
                .peel_to_commit()
                .map_err(|e| PublishError::version_control("commit", e.message()))?;
            self.repo
                .commit(Some("HEAD"), &sig, &sig, message, &tree, &[&parent])
                .map_err(|e| PublishError::version_control("commit", e.message()))?
        } else {
            // Initial commit (no parent)
            self.repo
                .commit(Some("HEAD"), &sig, &sig, message, &tree, &[])
                .map_err(|e| PublishError::version_control("commit", e.message()))?
        };

        Ok(format!("{}", commit_oid))
    }

    /// Get the HEAD commit info, or None if there are no commits.
    pub fn head_commit(&self) -> Option<CommitInfo> {
        let head = self.repo.head().ok()?;
        let commit = head.peel_to_commit().ok()?;
        Some(commit_to_info(&commit))
    }

    // ---------- Log ----------

    /// Get commit history (newest first), up to `limit` entries.
    pub fn log(&self, limit: usize) -> Result<Vec<CommitInfo>, PublishError> {
        let head = match self.repo.head() {
            Ok(h) => h,
            Err(_) => return Ok(Vec::new()), // No commits yet
        };

        let head_commit = head
            .peel_to_commit()
            .map_err(|e| PublishError::version_control("log", e.message()))?;

        let mut revwalk = self
            .repo
            .revwalk()
            .map_err(|e| PublishError::version_control("log", e.message()))?;
        revwalk
            .push(head_commit.id())
            .map_err(|e| PublishError::version_control("log", e.message()))?;

        let mut commits = Vec::new();
        for oid in revwalk {
            if commits.len() >= limit {
                break;
            }
            let oid = oid.map_err(|e| PublishError::version_control("log", e.message()))?;
            let commit = self
                .repo
                .find_commit(oid)
                .map_err(|e| PublishError::version_control("log", e.message()))?;
            commits.push(commit_to_info(&commit));
        }

        Ok(commits)
    }

    // ---------- Status ----------

    /// Count staged/working-tree changes for the publish summary.
    pub fn change_summary(&self) -> Result<ChangeSummary, PublishError> {
        let mut opts = StatusOptions::new();
        opts.show(StatusShow::IndexAndWorkdir);
        opts.include_untracked(true);
        opts.recurse_untracked_dirs(true);

        let statuses = self
            .repo
            .statuses(Some(&mut opts))
            .map_err(|e| PublishError::version_control("status", e.message()))?;

        let mut summary = ChangeSummary::default();
        for entry in statuses.iter() {
            let status = entry.status();
            if status.is_empty() {
                continue;
            }

            if status.is_wt_new() || status.is_index_new() {
                summary.added += 1;
            } else if status.is_wt_deleted() || status.is_index_deleted() {
                summary.deleted += 1;
            } else if status.is_wt_modified()
                || status.is_index_modified()
                || status.is_wt_renamed()
                || status.is_index_renamed()
            {
                summary.modified += 1;
            }
        }

        Ok(summary)
    }

    // ---------- Internal ----------

    fn default_signature(&self) -> Result<Signature<'_>, PublishError> {
        // Try to get signature from git config, fall back to defaults
        self.repo.signature().or_else(|_| {
            Signature::now("gitcopy", "gitcopy@localhost")
                .map_err(|e| PublishError::version_control("commit", e.message()))
        })
    }
}

fn commit_to_info(commit: &git2::Commit) -> CommitInfo {
    let hash = format!("{}", commit.id());
    let short_hash = hash[..7.min(hash.len())].to_string();
    let message = commit.message().unwrap_or("").trim().to_string();

    CommitInfo {
        hash,
        short_hash,
        message,
    }
}
