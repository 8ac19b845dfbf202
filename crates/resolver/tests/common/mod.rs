#![allow(dead_code)]

use async_trait::async_trait;
use repolink_resolver::{
    Branch, ProviderError, ProviderResult, Remote, RemoteFilter, Repository, RepositoryProvider,
    Tag,
};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

#[derive(Debug, Clone)]
pub struct FakeRepo {
    pub repo: Repository,
    pub remotes: Vec<Remote>,
    pub branches: Vec<Branch>,
    pub tags: Vec<Tag>,
    pub revisions: Vec<String>,
}

impl FakeRepo {
    pub fn new(path: &str) -> Self {
        Self {
            repo: Repository::new(path),
            remotes: Vec::new(),
            branches: Vec::new(),
            tags: Vec::new(),
            revisions: Vec::new(),
        }
    }

    pub fn remote(mut self, name: &str, url: &str) -> Self {
        self.remotes.push(Remote::new(name, url));
        self
    }

    pub fn branch(mut self, name: &str, sha: &str) -> Self {
        self.branches.push(Branch {
            name: name.to_string(),
            sha: sha.to_string(),
        });
        self
    }

    pub fn tag(mut self, name: &str, sha: &str) -> Self {
        self.tags.push(Tag {
            name: name.to_string(),
            sha: sha.to_string(),
        });
        self
    }

    pub fn revision(mut self, sha: &str) -> Self {
        self.revisions.push(sha.to_string());
        self
    }
}

/// In-memory provider that records every query it receives.
#[derive(Default)]
pub struct FakeProvider {
    repos: Vec<FakeRepo>,
    calls: Mutex<Vec<String>>,
    gate: Option<Arc<Notify>>,
    fail_remotes: bool,
}

impl FakeProvider {
    pub fn new(repos: Vec<FakeRepo>) -> Self {
        Self {
            repos,
            ..Default::default()
        }
    }

    /// `repositories()` blocks until the returned handle is notified.
    pub fn gated(repos: Vec<FakeRepo>) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let provider = Self {
            repos,
            gate: Some(gate.clone()),
            ..Default::default()
        };
        (provider, gate)
    }

    pub fn failing_remotes(repos: Vec<FakeRepo>) -> Self {
        Self {
            repos,
            fail_remotes: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn find(&self, path: &Path) -> Option<&FakeRepo> {
        self.repos.iter().find(|r| r.repo.path == path)
    }
}

#[async_trait]
impl RepositoryProvider for FakeProvider {
    async fn repositories(&self) -> ProviderResult<Vec<Repository>> {
        self.record("repositories".to_string());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        Ok(self.repos.iter().map(|r| r.repo.clone()).collect())
    }

    async fn remotes(
        &self,
        repo: &Repository,
        filter: Option<&RemoteFilter>,
    ) -> ProviderResult<Vec<Remote>> {
        self.record(format!("remotes {}", repo.path.display()));
        if self.fail_remotes {
            return Err(ProviderError::Other("remote listing exploded".to_string()));
        }
        let remotes = self
            .find(&repo.path)
            .map(|r| r.remotes.clone())
            .unwrap_or_default();
        Ok(RemoteFilter::apply(filter, remotes))
    }

    async fn branch(&self, repo: &Repository, name: &str) -> ProviderResult<Option<Branch>> {
        self.record(format!("branch {} {name}", repo.path.display()));
        Ok(self
            .find(&repo.path)
            .and_then(|r| r.branches.iter().find(|b| b.name == name).cloned()))
    }

    async fn tag(&self, repo: &Repository, name: &str) -> ProviderResult<Option<Tag>> {
        self.record(format!("tag {} {name}", repo.path.display()));
        Ok(self
            .find(&repo.path)
            .and_then(|r| r.tags.iter().find(|t| t.name == name).cloned()))
    }

    async fn validate_revision(&self, repo_path: &Path, candidate: &str) -> ProviderResult<bool> {
        self.record(format!("validate {} {candidate}", repo_path.display()));
        Ok(self
            .find(repo_path)
            .is_some_and(|r| r.revisions.iter().any(|rev| rev == candidate)))
    }
}
