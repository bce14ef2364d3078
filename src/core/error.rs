use std::path::PathBuf;

use thiserror::Error;

/// A single failure reported by the copy engine.
///
/// The engine never aborts mid-tree; it accumulates these and reports them
/// all once the walk has settled.
#[derive(Debug, Clone, Error)]
pub enum CopyError {
    /// Snippet markup in a source file is malformed.
    #[error("{path}:{line}: {message}")]
    Markup {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// Reading a source entry or writing a destination entry failed.
    #[error("{path}: {message}")]
    Io { path: PathBuf, message: String },

    /// An ignore glob handed to the engine does not parse.
    #[error("invalid ignore pattern `{pattern}`: {message}")]
    Pattern { pattern: String, message: String },
}

impl CopyError {
    pub fn io(path: &std::path::Path, err: &std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}

/// Why a publish invocation failed.
///
/// None of these are retried internally; each aborts the invocation after
/// workspace cleanup and propagates to the caller.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The remote-branch query could not reach the destination.
    #[error("remote query failed: {detail}")]
    Transport { detail: String },

    /// A git operation was rejected (clone, branch, commit, push).
    #[error("git {op} failed: {detail}")]
    VersionControl { op: String, detail: String },

    /// The copy engine reported one or more errors; nothing was committed.
    #[error("copy reported {} error(s)", .0.len())]
    Content(Vec<CopyError>),

    /// Purging the clone or releasing the workspace failed.
    #[error("filesystem operation on {path} failed: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PublishError {
    pub fn version_control(op: &str, detail: impl Into<String>) -> Self {
        Self::VersionControl {
            op: op.to_string(),
            detail: detail.into(),
        }
    }

    pub fn filesystem(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.to_path_buf(),
            source,
        }
    }
}
