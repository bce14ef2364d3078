//! The temporary clone directory, scoped to one publish invocation.

use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};
use tempfile::TempDir;

use crate::core::error::PublishError;

/// Ephemeral directory holding the shallow clone.
///
/// Owned exclusively by one publish invocation. The backing `TempDir`
/// removes the directory when the value drops, so cleanup happens on every
/// exit path; [`ClonedWorkspace::close`] makes removal failures visible on
/// the success path.
///
/// The directory name embeds a digest of the destination identifier plus
/// tempfile's random suffix, so concurrent invocations never collide.
pub struct ClonedWorkspace {
    dir: TempDir,
}

impl ClonedWorkspace {
    /// Allocate a fresh workspace for a clone of `destination`.
    pub fn create(destination: &str) -> Result<Self, PublishError> {
        let mut hasher = Sha256::new();
        hasher.update(destination.as_bytes());
        let digest = format!("{:x}", hasher.finalize());

        let dir = tempfile::Builder::new()
            .prefix(&format!("gitcopy-{}-", &digest[..8]))
            .tempdir()
            .map_err(|e| PublishError::filesystem(&std::env::temp_dir(), e))?;

        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Sorted top-level entry names, for advisory tree listings.
    pub fn entries(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.path())
            .into_iter()
            .flatten()
            .flatten()
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// Delete every top-level entry except the `.git` metadata directory.
    ///
    /// Entries are enumerated and filtered by name — hidden files are
    /// deleted like any other, and no shell glob expansion is involved.
    pub fn purge(&self) -> Result<(), PublishError> {
        let entries = fs::read_dir(self.path())
            .map_err(|e| PublishError::filesystem(self.path(), e))?;

        for entry in entries {
            let entry = entry.map_err(|e| PublishError::filesystem(self.path(), e))?;
            if entry.file_name() == ".git" {
                continue;
            }

            let path = entry.path();
            let file_type = entry
                .file_type()
                .map_err(|e| PublishError::filesystem(&path, e))?;

            let removed = if file_type.is_dir() {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };
            removed.map_err(|e| PublishError::filesystem(&path, e))?;
        }

        Ok(())
    }

    /// Remove the workspace now, surfacing the failure if removal fails.
    pub fn close(self) -> Result<(), PublishError> {
        let path = self.dir.path().to_path_buf();
        self.dir
            .close()
            .map_err(|e| PublishError::filesystem(&path, e))
    }
}
