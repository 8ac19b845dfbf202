use crate::error::{GitError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Where to look for repositories and how to run `git`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GitProviderConfig {
    /// Executable to invoke.
    pub git_binary: PathBuf,

    /// Repositories listed first, in this order.
    pub repositories: Vec<PathBuf>,

    /// Directories scanned for repositories (sorted by path).
    pub search_roots: Vec<PathBuf>,

    /// How deep below a search root a repository may sit.
    pub max_depth: usize,

    /// Upper bound for a single git invocation.
    pub command_timeout_ms: u64,
}

impl Default for GitProviderConfig {
    fn default() -> Self {
        Self {
            git_binary: PathBuf::from("git"),
            repositories: Vec::new(),
            search_roots: Vec::new(),
            max_depth: 3,
            command_timeout_ms: 10_000,
        }
    }
}

impl GitProviderConfig {
    #[must_use]
    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.git_binary.as_os_str().is_empty() {
            return Err(GitError::InvalidConfig("git_binary must not be empty".to_string()));
        }
        if self.command_timeout_ms == 0 {
            return Err(GitError::InvalidConfig(
                "command_timeout_ms must be > 0".to_string(),
            ));
        }
        if self.max_depth == 0 {
            return Err(GitError::InvalidConfig("max_depth must be > 0".to_string()));
        }
        Ok(())
    }
}
