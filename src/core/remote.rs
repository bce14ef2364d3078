//! Remote git transport: ls-remote, clone, push.
//!
//! We shell out to git for remote operations because git2's transport layer
//! requires complex SSH/credential setup. The system git already handles
//! credentials, SSH keys, and proxies correctly.

use std::path::Path;
use std::process::Command;

use crate::core::error::PublishError;

/// How the destination should be cloned.
///
/// Produced by [`crate::core::publisher::clone_options`]; clones are always
/// shallow, and pinned to a branch only when that branch exists remotely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneOptions {
    pub branch: Option<String>,
    pub depth: u32,
}

/// Check whether `branch` exists among the destination's remote heads.
pub fn ls_remote_heads(repo: &str, branch: &str) -> Result<bool, PublishError> {
    let output = Command::new("git")
        .args(["ls-remote", "--heads", repo, branch])
        .output()
        .map_err(|e| PublishError::Transport {
            detail: format!("failed to run `git ls-remote`: {}. Is git installed?", e),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(PublishError::Transport {
            detail: format!("cannot query {}: {}", repo, stderr.trim()),
        });
    }

    Ok(!String::from_utf8_lossy(&output.stdout).trim().is_empty())
}

/// Shallow-clone `repo` into `dest`.
pub fn clone(repo: &str, dest: &Path, options: &CloneOptions) -> Result<(), PublishError> {
    let mut cmd = Command::new("git");
    cmd.args(["clone", "--depth"]).arg(options.depth.to_string());
    if let Some(branch) = &options.branch {
        cmd.args(["--branch", branch]);
    }
    cmd.arg(repo).arg(dest);

    run_git(cmd, "clone")
}

/// Push the clone's current branch.
///
/// With a branch name, sets/creates the corresponding upstream
/// (`-u origin <branch>`); without one, pushes to the default upstream.
pub fn push(clone_dir: &Path, branch: Option<&str>) -> Result<(), PublishError> {
    let mut cmd = Command::new("git");
    cmd.arg("push");
    if let Some(branch) = branch {
        cmd.args(["-u", "origin", branch]);
    }
    cmd.current_dir(clone_dir);

    run_git(cmd, "push")
}

fn run_git(mut cmd: Command, op: &'static str) -> Result<(), PublishError> {
    let output = cmd.output().map_err(|e| {
        PublishError::version_control(op, format!("failed to run git: {}. Is git installed?", e))
    })?;

    // Forward git's output
    if !output.stdout.is_empty() {
        let stdout = String::from_utf8_lossy(&output.stdout);
        eprint!("{}", stdout);
    }
    if !output.stderr.is_empty() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        eprint!("{}", stderr);
    }

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(PublishError::version_control(
            op,
            format!(
                "exit code {:?}: {}",
                output.status.code(),
                stderr.trim()
            ),
        ));
    }

    Ok(())
}
