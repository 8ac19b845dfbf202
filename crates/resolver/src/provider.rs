use async_trait::async_trait;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("`{command}` exited with {status}: {stderr}")]
    Command {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("`{command}` timed out after {timeout_ms}ms")]
    Timeout { command: String, timeout_ms: u64 },

    #[error("{0}")]
    Other(String),
}

/// A local repository known to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Repository {
    pub name: String,
    pub path: PathBuf,
}

impl Repository {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { name, path }
    }

    #[must_use]
    pub fn path_string(&self) -> String {
        self.path.display().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Remote {
    pub name: String,
    pub url: String,
}

impl Remote {
    #[must_use]
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Branch {
    /// Fully qualified name, e.g. `origin/main`.
    pub name: String,
    pub sha: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub name: String,
    pub sha: String,
}

/// Narrows `RepositoryProvider::remotes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteFilter {
    /// Exact, byte-for-byte URL equality.
    Url(String),
}

impl RemoteFilter {
    #[must_use]
    pub fn matches(&self, remote: &Remote) -> bool {
        match self {
            Self::Url(url) => remote.url == *url,
        }
    }

    /// Applies the filter while keeping enumeration order.
    #[must_use]
    pub fn apply(filter: Option<&Self>, remotes: Vec<Remote>) -> Vec<Remote> {
        match filter {
            Some(filter) => remotes.into_iter().filter(|r| filter.matches(r)).collect(),
            None => remotes,
        }
    }
}

/// Version-control queries the resolver depends on.
///
/// Enumeration orders must be stable: repository and remote matching are
/// first-match-wins.
#[async_trait]
pub trait RepositoryProvider: Send + Sync {
    async fn repositories(&self) -> ProviderResult<Vec<Repository>>;

    async fn remotes(
        &self,
        repo: &Repository,
        filter: Option<&RemoteFilter>,
    ) -> ProviderResult<Vec<Remote>>;

    /// Looks up a branch by fully qualified name (`{remote}/{branch}` for
    /// remote-tracking branches).
    async fn branch(&self, repo: &Repository, name: &str) -> ProviderResult<Option<Branch>>;

    async fn tag(&self, repo: &Repository, name: &str) -> ProviderResult<Option<Tag>>;

    /// Whether `candidate` names a revision reachable in the repository at
    /// `repo_path`.
    async fn validate_revision(&self, repo_path: &Path, candidate: &str) -> ProviderResult<bool>;
}
