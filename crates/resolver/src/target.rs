use crate::provider::{ProviderResult, Remote, Repository, RepositoryProvider};
use log::debug;
use repolink_protocol::LinkType;

/// Name of the remote-tracking branch a branch link points at.
#[must_use]
pub fn remote_branch_name(remote: &Remote, branch: &str) -> String {
    format!("{}/{}", remote.name, branch)
}

/// Resolves a branch, tag or commit link to a concrete sha.
///
/// `Ok(None)` means the target does not exist locally; errors are reserved for
/// provider failures. `Remote` links have no sha and always yield `None`.
pub async fn resolve_target_sha(
    provider: &dyn RepositoryProvider,
    repo: &Repository,
    remote: &Remote,
    target_type: LinkType,
    target_id: &str,
) -> ProviderResult<Option<String>> {
    match target_type {
        LinkType::Remote => Ok(None),
        LinkType::Branch => {
            let name = remote_branch_name(remote, target_id);
            let branch = provider.branch(repo, &name).await?;
            debug!("branch {name} in {}: {:?}", repo.path.display(), branch);
            Ok(branch.map(|b| b.sha))
        }
        LinkType::Tag => {
            let tag = provider.tag(repo, target_id).await?;
            debug!("tag {target_id} in {}: {:?}", repo.path.display(), tag);
            Ok(tag.map(|t| t.sha))
        }
        LinkType::Commit => {
            let valid = provider.validate_revision(&repo.path, target_id).await?;
            Ok(valid.then(|| target_id.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{Branch, RemoteFilter, Tag};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::path::Path;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Lookups {
        branches: Vec<Branch>,
        tags: Vec<Tag>,
        revisions: Vec<String>,
        queried: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl RepositoryProvider for Lookups {
        async fn repositories(&self) -> ProviderResult<Vec<Repository>> {
            Ok(Vec::new())
        }

        async fn remotes(
            &self,
            _repo: &Repository,
            _filter: Option<&RemoteFilter>,
        ) -> ProviderResult<Vec<Remote>> {
            Ok(Vec::new())
        }

        async fn branch(&self, _repo: &Repository, name: &str) -> ProviderResult<Option<Branch>> {
            self.queried.lock().unwrap().push(name.to_string());
            Ok(self.branches.iter().find(|b| b.name == name).cloned())
        }

        async fn tag(&self, _repo: &Repository, name: &str) -> ProviderResult<Option<Tag>> {
            Ok(self.tags.iter().find(|t| t.name == name).cloned())
        }

        async fn validate_revision(&self, _path: &Path, candidate: &str) -> ProviderResult<bool> {
            Ok(self.revisions.iter().any(|r| r == candidate))
        }
    }

    fn fixtures() -> (Repository, Remote) {
        (
            Repository::new("/work/y"),
            Remote::new("upstream", "https://x/y.git"),
        )
    }

    #[tokio::test]
    async fn branch_lookup_uses_remote_qualified_name() {
        let provider = Lookups {
            branches: vec![
                Branch {
                    name: "main".to_string(),
                    sha: "aaa".to_string(),
                },
                Branch {
                    name: "upstream/main".to_string(),
                    sha: "bbb".to_string(),
                },
            ],
            ..Default::default()
        };
        let (repo, remote) = fixtures();

        let sha = resolve_target_sha(&provider, &repo, &remote, LinkType::Branch, "main")
            .await
            .expect("resolve");
        assert_eq!(sha.as_deref(), Some("bbb"));
        assert_eq!(
            *provider.queried.lock().unwrap(),
            vec!["upstream/main".to_string()]
        );
    }

    #[tokio::test]
    async fn branch_missing_under_remote_is_not_found() {
        let provider = Lookups {
            branches: vec![Branch {
                name: "origin/main".to_string(),
                sha: "aaa".to_string(),
            }],
            ..Default::default()
        };
        let (repo, remote) = fixtures();

        let sha = resolve_target_sha(&provider, &repo, &remote, LinkType::Branch, "main")
            .await
            .expect("resolve");
        assert_eq!(sha, None);
    }

    #[tokio::test]
    async fn tag_and_commit_resolution() {
        let provider = Lookups {
            tags: vec![Tag {
                name: "v1.0".to_string(),
                sha: "ccc".to_string(),
            }],
            revisions: vec!["DeadBeef".to_string()],
            ..Default::default()
        };
        let (repo, remote) = fixtures();

        let tag = resolve_target_sha(&provider, &repo, &remote, LinkType::Tag, "v1.0")
            .await
            .expect("tag");
        assert_eq!(tag.as_deref(), Some("ccc"));

        let commit = resolve_target_sha(&provider, &repo, &remote, LinkType::Commit, "DeadBeef")
            .await
            .expect("commit");
        assert_eq!(commit.as_deref(), Some("DeadBeef"));

        let missing = resolve_target_sha(&provider, &repo, &remote, LinkType::Commit, "deadbeef")
            .await
            .expect("commit");
        assert_eq!(missing, None);

        let remote_only = resolve_target_sha(&provider, &repo, &remote, LinkType::Remote, "")
            .await
            .expect("remote");
        assert_eq!(remote_only, None);
    }
}
