use repolink_resolver::ProviderError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GitError>;

#[derive(Error, Debug)]
pub enum GitError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Repository discovery failed: {0}")]
    Discovery(String),
}

impl From<GitError> for ProviderError {
    fn from(err: GitError) -> Self {
        match err {
            GitError::IoError(io) => Self::Io(io),
            other => Self::Other(other.to_string()),
        }
    }
}
