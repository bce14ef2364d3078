//! The tree-copy engine.
//!
//! [`CopyEngine`] is the contract the publisher consumes; [`MarkupCopier`]
//! is the real engine: walk the source tree, run every text file through
//! the snippet-markup filter, and write the results under the destination.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::task::JoinSet;

use crate::core::error::CopyError;
use crate::core::ignore::IgnoreSet;
use crate::core::markup;

/// One copy invocation's inputs.
#[derive(Debug, Clone)]
pub struct CopyRequest {
    /// Tree to publish
    pub root_path: PathBuf,
    /// Gitignore-style globs to skip
    pub ignore: Vec<String>,
    /// Content variant to select; `None` drops all state blocks
    pub state: Option<String>,
    /// Directory to populate
    pub destination: PathBuf,
}

/// What a copy invocation did.
#[derive(Debug, Default)]
pub struct CopyReport {
    pub files_written: usize,
    pub errors: Vec<CopyError>,
}

impl CopyReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Contract between the publisher and the copy engine.
#[async_trait]
pub trait CopyEngine: Send + Sync {
    /// Process and copy the tree.
    ///
    /// The returned report is complete: every piece of work the engine
    /// fanned out has settled by the time the future resolves. The engine
    /// never aborts mid-tree — failures accumulate in the report.
    async fn copy(&self, request: &CopyRequest) -> CopyReport;
}

/// The snippet-markup copy engine.
pub struct MarkupCopier;

#[async_trait]
impl CopyEngine for MarkupCopier {
    async fn copy(&self, request: &CopyRequest) -> CopyReport {
        let mut report = CopyReport::default();

        let ignores = match IgnoreSet::from_patterns(&request.ignore) {
            Ok(set) => set,
            Err(e) => {
                report.errors.push(CopyError::Pattern {
                    pattern: e.pattern,
                    message: e.message,
                });
                return report;
            }
        };

        let mut files = Vec::new();
        collect_files(
            &request.root_path,
            &request.root_path,
            &ignores,
            &mut files,
            &mut report.errors,
        );

        let mut tasks = JoinSet::new();
        for rel in files {
            let source = request.root_path.join(&rel);
            let dest = request.destination.join(&rel);
            let state = request.state.clone();
            tasks.spawn(process_file(source, dest, rel, state));
        }

        // Drain every task before returning; the report only means
        // something once all file work has settled.
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(())) => report.files_written += 1,
                Ok(Err(err)) => report.errors.push(err),
                Err(join_err) => report.errors.push(CopyError::Io {
                    path: request.root_path.clone(),
                    message: join_err.to_string(),
                }),
            }
        }

        report
    }
}

/// Walk `dir`, recording files relative to `root`.
///
/// Skips `.git` at any depth and anything the ignore set matches. Walk
/// failures become report entries; the walk keeps going.
fn collect_files(
    root: &Path,
    dir: &Path,
    ignores: &IgnoreSet,
    files: &mut Vec<PathBuf>,
    errors: &mut Vec<CopyError>,
) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            errors.push(CopyError::io(dir, &e));
            return;
        }
    };

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                errors.push(CopyError::io(dir, &e));
                continue;
            }
        };

        if entry.file_name() == ".git" {
            continue;
        }

        let path = entry.path();
        let Ok(rel) = path.strip_prefix(root) else {
            continue;
        };

        let is_dir = match entry.file_type() {
            Ok(file_type) => file_type.is_dir(),
            Err(e) => {
                errors.push(CopyError::io(&path, &e));
                continue;
            }
        };

        if ignores.is_ignored(rel, is_dir) {
            continue;
        }

        if is_dir {
            collect_files(root, &path, ignores, files, errors);
        } else {
            files.push(rel.to_path_buf());
        }
    }
}

/// Process one file: markup-filter UTF-8 text, pass other payloads through
/// byte-for-byte. A file with malformed markup is not written at all.
async fn process_file(
    source: PathBuf,
    dest: PathBuf,
    rel: PathBuf,
    state: Option<String>,
) -> Result<(), CopyError> {
    let bytes = tokio::fs::read(&source)
        .await
        .map_err(|e| CopyError::io(&rel, &e))?;

    let output = match String::from_utf8(bytes) {
        Ok(text) => match markup::process(&text, state.as_deref()) {
            Ok(processed) => processed.into_bytes(),
            Err(err) => {
                return Err(CopyError::Markup {
                    path: rel,
                    line: err.line,
                    message: err.message,
                });
            }
        },
        Err(not_text) => not_text.into_bytes(),
    };

    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| CopyError::io(&rel, &e))?;
    }
    tokio::fs::write(&dest, output)
        .await
        .map_err(|e| CopyError::io(&rel, &e))?;

    Ok(())
}
