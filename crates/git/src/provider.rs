use crate::command::GitRunner;
use crate::config::GitProviderConfig;
use crate::discovery::discover_repositories;
use crate::error::Result;
use async_trait::async_trait;
use log::debug;
use repolink_resolver::{
    Branch, ProviderResult, Remote, RemoteFilter, Repository, RepositoryProvider, Tag,
};
use std::path::Path;

pub struct GitCliProvider {
    config: GitProviderConfig,
    git: GitRunner,
}

impl GitCliProvider {
    pub fn new(config: GitProviderConfig) -> Result<Self> {
        config.validate()?;
        let git = GitRunner::new(config.git_binary.clone(), config.command_timeout());
        Ok(Self { config, git })
    }
}

#[async_trait]
impl RepositoryProvider for GitCliProvider {
    async fn repositories(&self) -> ProviderResult<Vec<Repository>> {
        let paths = discover_repositories(&self.config).await?;
        Ok(paths.into_iter().map(Repository::new).collect())
    }

    async fn remotes(
        &self,
        repo: &Repository,
        filter: Option<&RemoteFilter>,
    ) -> ProviderResult<Vec<Remote>> {
        let listing = self.git.stdout(&repo.path, &["remote", "-v"]).await?;
        let remotes = parse_remote_listing(&listing);
        debug!("{} remotes in {}", remotes.len(), repo.path.display());
        Ok(RemoteFilter::apply(filter, remotes))
    }

    async fn branch(&self, repo: &Repository, name: &str) -> ProviderResult<Option<Branch>> {
        if !is_plausible_ref(name) {
            return Ok(None);
        }
        for namespace in ["refs/remotes", "refs/heads"] {
            let rev = format!("{namespace}/{name}^{{commit}}");
            if let Some(sha) = self.git.verify(&repo.path, &rev).await? {
                return Ok(Some(Branch {
                    name: name.to_string(),
                    sha,
                }));
            }
        }
        Ok(None)
    }

    async fn tag(&self, repo: &Repository, name: &str) -> ProviderResult<Option<Tag>> {
        if !is_plausible_ref(name) {
            return Ok(None);
        }
        let rev = format!("refs/tags/{name}^{{commit}}");
        Ok(self
            .git
            .verify(&repo.path, &rev)
            .await?
            .map(|sha| Tag {
                name: name.to_string(),
                sha,
            }))
    }

    async fn validate_revision(&self, repo_path: &Path, candidate: &str) -> ProviderResult<bool> {
        if !is_plausible_ref(candidate) {
            return Ok(false);
        }
        let rev = format!("{candidate}^{{commit}}");
        Ok(self.git.verify(repo_path, &rev).await?.is_some())
    }
}

/// Parses `git remote -v`. One entry per remote name in first-seen order,
/// carrying the fetch URL when both fetch and push are listed.
#[must_use]
pub fn parse_remote_listing(listing: &str) -> Vec<Remote> {
    let mut remotes: Vec<Remote> = Vec::new();
    for line in listing.lines() {
        let Some((name, rest)) = line.split_once('\t') else {
            continue;
        };
        let (url, kind) = match rest.rsplit_once(' ') {
            Some((url, kind)) if kind.starts_with('(') => (url, kind),
            _ => (rest, "(fetch)"),
        };
        let name = name.trim();
        let url = url.trim();
        if name.is_empty() || url.is_empty() {
            continue;
        }

        match remotes.iter_mut().find(|r| r.name == name) {
            Some(existing) => {
                if kind == "(fetch)" {
                    existing.url = url.to_string();
                }
            }
            None => remotes.push(Remote::new(name, url)),
        }
    }
    remotes
}

/// Revisions and ref names coming from a link never become git options.
fn is_plausible_ref(raw: &str) -> bool {
    !raw.is_empty()
        && !raw.starts_with('-')
        && !raw.contains("..")
        && !raw.chars().any(|c| c.is_whitespace() || c.is_control())
}
