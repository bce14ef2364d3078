//! Ignore-pattern matching for the copy walk.
//!
//! Patterns arrive from `--ignore` flags and `gitcopy.toml`, and follow
//! gitignore semantics via the `ignore` crate.

use std::path::Path;

use ignore::gitignore::{Gitignore, GitignoreBuilder};

/// A pattern that did not parse, with the matcher's explanation.
#[derive(Debug, Clone)]
pub struct PatternError {
    pub pattern: String,
    pub message: String,
}

/// A compiled set of ignore globs.
#[derive(Debug)]
pub struct IgnoreSet {
    matcher: Gitignore,
    pattern_count: usize,
}

impl Default for IgnoreSet {
    fn default() -> Self {
        Self::empty()
    }
}

impl IgnoreSet {
    /// A set that matches nothing.
    pub fn empty() -> Self {
        let matcher = GitignoreBuilder::new("")
            .build()
            .expect("empty gitignore should always build");
        Self {
            matcher,
            pattern_count: 0,
        }
    }

    /// Compile a list of gitignore-style globs.
    pub fn from_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Self, PatternError> {
        let mut builder = GitignoreBuilder::new("");
        let mut pattern_count = 0;

        for pattern in patterns {
            let pattern = pattern.as_ref().trim();
            if pattern.is_empty() {
                continue;
            }
            pattern_count += 1;
            builder.add_line(None, pattern).map_err(|e| PatternError {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })?;
        }

        let matcher = builder.build().map_err(|e| PatternError {
            pattern: String::new(),
            message: e.to_string(),
        })?;

        Ok(Self {
            matcher,
            pattern_count,
        })
    }

    /// Check whether a path (relative to the walk root) should be skipped.
    ///
    /// `is_dir` must be true for directories so `dir/` patterns match.
    pub fn is_ignored(&self, rel_path: &Path, is_dir: bool) -> bool {
        self.matcher
            .matched_path_or_any_parents(rel_path, is_dir)
            .is_ignore()
    }

    pub fn pattern_count(&self) -> usize {
        self.pattern_count
    }

    pub fn is_empty(&self) -> bool {
        self.pattern_count == 0
    }
}
