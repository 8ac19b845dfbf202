use log::debug;
use repolink_resolver::{ProviderError, ProviderResult};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::time::timeout;

pub(crate) struct GitOutput {
    pub success: bool,
    pub status: String,
    pub stdout: String,
    pub stderr: String,
}

/// Runs `git -C <repo> ...` with a hard deadline.
#[derive(Debug, Clone)]
pub(crate) struct GitRunner {
    binary: PathBuf,
    timeout: Duration,
}

impl GitRunner {
    pub fn new(binary: PathBuf, timeout: Duration) -> Self {
        Self { binary, timeout }
    }

    pub async fn run(&self, repo: &Path, args: &[&str]) -> ProviderResult<GitOutput> {
        let output = timeout(
            self.timeout,
            tokio::process::Command::new(&self.binary)
                .arg("-C")
                .arg(repo)
                .args(args)
                .env("GIT_TERMINAL_PROMPT", "0")
                .stdin(Stdio::null())
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| ProviderError::Timeout {
            command: describe(args),
            timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
        })??;

        Ok(GitOutput {
            success: output.status.success(),
            status: output.status.to_string(),
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }

    /// Stdout of a command that must succeed.
    pub async fn stdout(&self, repo: &Path, args: &[&str]) -> ProviderResult<String> {
        let out = self.run(repo, args).await?;
        if !out.success {
            return Err(ProviderError::Command {
                command: describe(args),
                status: out.status,
                stderr: out.stderr,
            });
        }
        Ok(out.stdout)
    }

    /// Stdout of `rev-parse --verify --quiet`, or `None` when the revision
    /// does not resolve.
    pub async fn verify(&self, repo: &Path, rev: &str) -> ProviderResult<Option<String>> {
        let out = self
            .run(repo, &["rev-parse", "--verify", "--quiet", rev])
            .await?;
        if !out.success {
            if !out.stderr.is_empty() {
                debug!("rev-parse {rev} in {}: {}", repo.display(), out.stderr);
            }
            return Ok(None);
        }
        Ok(Some(out.stdout).filter(|sha| !sha.is_empty()))
    }
}

fn describe(args: &[&str]) -> String {
    format!("git {}", args.join(" "))
}
