use crate::config::GitProviderConfig;
use crate::error::{GitError, Result};
use log::{debug, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A directory is a repository when it has a `.git` entry (directory for
/// regular clones, file for worktrees and submodules).
#[must_use]
pub fn is_repository(dir: &Path) -> bool {
    dir.join(".git").exists()
}

/// Lists repositories in a stable order: explicit paths as configured, then
/// everything found under the search roots sorted by path. Duplicates (by
/// canonical path) keep their first position.
pub async fn discover_repositories(config: &GitProviderConfig) -> Result<Vec<PathBuf>> {
    let config = config.clone();
    tokio::task::spawn_blocking(move || discover_blocking(&config))
        .await
        .map_err(|e| GitError::Discovery(format!("discovery task failed: {e}")))?
}

fn discover_blocking(config: &GitProviderConfig) -> Result<Vec<PathBuf>> {
    let mut seen = HashSet::new();
    let mut found = Vec::new();

    for path in &config.repositories {
        if !is_repository(path) {
            warn!("configured path {} is not a git repository", path.display());
            continue;
        }
        push_unique(&mut found, &mut seen, path.clone());
    }

    for root in &config.search_roots {
        if !root.is_dir() {
            warn!("search root {} is not a directory", root.display());
            continue;
        }
        let mut under_root = scan_root(root, config.max_depth);
        under_root.sort();
        for path in under_root {
            push_unique(&mut found, &mut seen, path);
        }
    }

    debug!("discovered {} repositories", found.len());
    Ok(found)
}

fn scan_root(root: &Path, max_depth: usize) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let mut walker = WalkDir::new(root)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter();

    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                debug!("skipping unreadable entry under {}: {err}", root.display());
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }
        if entry.file_name() == ".git" {
            walker.skip_current_dir();
            continue;
        }
        if is_repository(entry.path()) {
            found.push(entry.into_path());
            // Nested repositories are submodules; they resolve through their parent.
            walker.skip_current_dir();
        }
    }
    found
}

fn push_unique(found: &mut Vec<PathBuf>, seen: &mut HashSet<PathBuf>, path: PathBuf) {
    let key = std::fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
    if seen.insert(key) {
        found.push(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn fake_repo(root: &Path, rel: &str) -> PathBuf {
        let dir = root.join(rel);
        std::fs::create_dir_all(dir.join(".git")).expect("create .git");
        dir
    }

    #[tokio::test]
    async fn explicit_paths_come_first_then_sorted_scan() {
        let temp = TempDir::new().expect("tempdir");
        let zeta = fake_repo(temp.path(), "zeta");
        let alpha = fake_repo(temp.path(), "group/alpha");
        let beta = fake_repo(temp.path(), "beta");
        fake_repo(temp.path(), "beta/vendor/nested");
        std::fs::create_dir_all(temp.path().join("plain")).expect("plain dir");

        let config = GitProviderConfig {
            repositories: vec![zeta.clone(), temp.path().join("plain")],
            search_roots: vec![temp.path().to_path_buf()],
            ..Default::default()
        };

        let found = discover_repositories(&config).await.expect("discover");
        assert_eq!(found, vec![zeta, beta, alpha]);
    }

    #[tokio::test]
    async fn depth_limit_hides_deep_repositories() {
        let temp = TempDir::new().expect("tempdir");
        fake_repo(temp.path(), "a/b/c/d");

        let config = GitProviderConfig {
            search_roots: vec![temp.path().to_path_buf()],
            max_depth: 2,
            ..Default::default()
        };

        let found = discover_repositories(&config).await.expect("discover");
        assert!(found.is_empty());
    }
}
