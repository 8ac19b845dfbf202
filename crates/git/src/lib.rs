//! # Repolink Git
//!
//! [`RepositoryProvider`](repolink_resolver::RepositoryProvider) backed by the
//! `git` executable.
//!
//! ```text
//! GitProviderConfig
//!     │
//!     ├──> discovery  (explicit paths, then search roots, sorted)
//!     │
//!     └──> GitCliProvider
//!            ├─ git remote -v
//!            ├─ git rev-parse --verify refs/remotes/... | refs/tags/...
//!            └─ git rev-parse --verify {rev}^{commit}
//! ```

mod command;
mod config;
mod discovery;
mod error;
mod provider;

pub use config::GitProviderConfig;
pub use discovery::{discover_repositories, is_repository};
pub use error::{GitError, Result};
pub use provider::{parse_remote_listing, GitCliProvider};
