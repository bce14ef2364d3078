use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

/// Project defaults from gitcopy.toml.
///
/// The file is optional: absent config means all defaults, and every value
/// can be overridden on the command line.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitCopyConfig {
    #[serde(default)]
    pub publish: PublishDefaults,
    #[serde(default)]
    pub copy: CopyDefaults,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PublishDefaults {
    /// Destination repository (path or URL)
    pub repo: Option<String>,
    /// Target branch
    pub branch: Option<String>,
    /// Commit message
    #[serde(rename = "commit-message")]
    pub commit_message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CopyDefaults {
    /// Content variant to select
    pub state: Option<String>,
    /// Ignore patterns, prepended to any given on the command line
    #[serde(default)]
    pub ignore: Vec<String>,
}

impl GitCopyConfig {
    /// Load and validate configuration from a gitcopy.toml file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: GitCopyConfig =
            toml::from_str(content).context("Failed to parse gitcopy.toml")?;

        config.validate()?;
        Ok(config)
    }

    /// Find gitcopy.toml by walking up from the given directory.
    ///
    /// Returns `None` when no config file exists anywhere up the tree.
    pub fn find_and_load(start_dir: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut current = start_dir.to_path_buf();
        loop {
            let config_path = current.join("gitcopy.toml");
            if config_path.exists() {
                let config = Self::from_file(&config_path)?;
                return Ok(Some((config, current)));
            }
            if !current.pop() {
                return Ok(None);
            }
        }
    }

    /// Find gitcopy.toml, falling back to defaults when there is none.
    pub fn find_or_default(start_dir: &Path) -> Result<Self> {
        Ok(Self::find_and_load(start_dir)?
            .map(|(config, _root)| config)
            .unwrap_or_default())
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        if let Some(branch) = &self.publish.branch {
            if branch.trim().is_empty() {
                bail!("Empty branch name in gitcopy.toml [publish]");
            }
        }
        if let Some(repo) = &self.publish.repo {
            if repo.trim().is_empty() {
                bail!("Empty repo in gitcopy.toml [publish]");
            }
        }
        if let Some(state) = &self.copy.state {
            if state.trim().is_empty() {
                bail!("Empty state name in gitcopy.toml [copy]");
            }
        }
        Ok(())
    }
}
