//! Per-state handlers. Each one inspects the context, performs the provider
//! calls its state needs and concludes with the next action.

use crate::context::ResolutionContext;
use crate::error::ResolveFailure;
use crate::provider::{ProviderResult, RemoteFilter, RepositoryProvider};
use crate::sink::ActionSink;
use crate::state::{Action, State};
use crate::target::resolve_target_sha;
use log::{debug, info};
use repolink_protocol::{FollowUp, GitReference, LinkType};
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// A handler that stops short of its own success or failure action.
#[derive(Debug)]
pub(crate) enum Halt {
    Cancelled,
    Failed(ResolveFailure),
}

impl From<ResolveFailure> for Halt {
    fn from(failure: ResolveFailure) -> Self {
        Self::Failed(failure)
    }
}

pub(crate) type StepResult = Result<Action, Halt>;

pub(crate) struct Collaborators<'a> {
    pub provider: &'a dyn RepositoryProvider,
    pub sink: &'a dyn ActionSink,
    pub cancel: &'a CancellationToken,
}

impl Collaborators<'_> {
    /// Awaits a provider call unless the resolution is cancelled first.
    async fn call<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = ProviderResult<T>>,
    ) -> Result<T, Halt> {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(Halt::Cancelled),
            res = fut => res.map_err(|source| Halt::Failed(ResolveFailure::provider(operation, source))),
        }
    }
}

pub(crate) async fn run(
    state: State,
    ctx: &mut ResolutionContext,
    deps: &Collaborators<'_>,
) -> StepResult {
    match state {
        State::RepoMatch | State::AddedRepoMatch => match_repo(state, ctx, deps).await,
        State::CloneOrAddRepo => clone_or_add_repo(ctx),
        State::RemoteMatch => match_remote(ctx, deps).await,
        State::AddRemote => add_remote(ctx),
        State::TargetMatch | State::FetchedTargetMatch => match_target(state, ctx, deps).await,
        State::Fetch => fetch(ctx),
        State::OpenTarget => open_target(ctx, deps).await,
        // Idle is terminal and handled by the engine loop itself.
        State::Idle => Err(ResolveFailure::UnknownState.into()),
    }
}

async fn match_repo(
    state: State,
    ctx: &mut ResolutionContext,
    deps: &Collaborators<'_>,
) -> StepResult {
    let Some(repo_id) = ctx.repo_id.clone() else {
        return Err(ResolveFailure::MissingRepoId.into());
    };
    let filter = ctx.remote_url.clone().map(RemoteFilter::Url);

    let repos = deps
        .call("list repositories", deps.provider.repositories())
        .await?;
    debug!("matching link against {} repositories", repos.len());

    for repo in repos {
        if let Some(filter) = &filter {
            let matches = deps
                .call("list remotes", deps.provider.remotes(&repo, Some(filter)))
                .await?;
            if let Some(remote) = matches.into_iter().next() {
                info!(
                    "matched repo {} by remote {} ({})",
                    repo.path.display(),
                    remote.name,
                    remote.url
                );
                ctx.repo = Some(repo);
                ctx.remote = Some(remote);
                return Ok(Action::RepoMatchedWithRemoteUrl);
            }
        }

        // Any sha reachable in the repository identifies it; by convention the
        // link carries the first commit.
        let known = deps
            .call(
                "validate revision",
                deps.provider.validate_revision(&repo.path, &repo_id),
            )
            .await?;
        if known {
            info!("matched repo {} by id {repo_id}", repo.path.display());
            ctx.repo = Some(repo);
            return Ok(Action::RepoMatchedWithId);
        }
    }

    if state == State::RepoMatch {
        Ok(Action::RepoMatchFailed)
    } else {
        Err(ResolveFailure::NotFound("repo").into())
    }
}

// TODO: offer to clone the remote or add an existing folder, then continue in
// AddedRepoMatch.
fn clone_or_add_repo(ctx: &ResolutionContext) -> StepResult {
    if ctx.repo_id.is_none() || ctx.remote_url.is_none() {
        return Err(ResolveFailure::MissingInput("repo id or remote url").into());
    }
    Err(ResolveFailure::Unsupported {
        operation: "clone or add repository",
        subject: "repo",
    }
    .into())
}

async fn match_remote(ctx: &mut ResolutionContext, deps: &Collaborators<'_>) -> StepResult {
    let (Some(repo), Some(remote_url)) = (ctx.repo.as_ref(), ctx.remote_url.as_ref()) else {
        return Err(ResolveFailure::MissingInput("repo or remote url").into());
    };

    let filter = RemoteFilter::Url(remote_url.clone());
    let matches = deps
        .call("list remotes", deps.provider.remotes(repo, Some(&filter)))
        .await?;
    match matches.into_iter().next() {
        Some(remote) => {
            debug!("using remote {} for {}", remote.name, repo.path.display());
            ctx.remote = Some(remote);
            Ok(Action::RemoteMatched)
        }
        None => Ok(Action::RemoteMatchFailed),
    }
}

// TODO: offer to add the link's URL as a remote, then retry RemoteMatch.
fn add_remote(ctx: &ResolutionContext) -> StepResult {
    if ctx.repo.is_none() || ctx.remote_url.is_none() {
        return Err(ResolveFailure::MissingInput("repo or remote url").into());
    }
    Err(ResolveFailure::Unsupported {
        operation: "add remote",
        subject: "remote",
    }
    .into())
}

async fn match_target(
    state: State,
    ctx: &mut ResolutionContext,
    deps: &Collaborators<'_>,
) -> StepResult {
    let (Some(repo), Some(remote), Some(target_type)) =
        (ctx.repo.as_ref(), ctx.remote.as_ref(), ctx.target_type)
    else {
        return Err(ResolveFailure::MissingInput("repo, remote, or target type").into());
    };

    if target_type == LinkType::Remote {
        return Ok(Action::TargetMatched);
    }

    let sha = match ctx.target_id.as_deref() {
        Some(target_id) => {
            deps.call(
                "resolve target",
                resolve_target_sha(deps.provider, repo, remote, target_type, target_id),
            )
            .await?
        }
        None => None,
    };
    ctx.target_sha = sha;

    if ctx.target_sha.is_some() {
        Ok(Action::TargetMatched)
    } else if state == State::TargetMatch {
        Ok(Action::TargetMatchFailed)
    } else {
        Err(ResolveFailure::NotFound("target").into())
    }
}

// TODO: offer to fetch the remote, then continue in FetchedTargetMatch.
fn fetch(ctx: &ResolutionContext) -> StepResult {
    if ctx.repo.is_none() || ctx.remote.is_none() {
        return Err(ResolveFailure::MissingInput("repo or remote").into());
    }
    Err(ResolveFailure::Unsupported {
        operation: "fetch",
        subject: "target",
    }
    .into())
}

async fn open_target(ctx: &mut ResolutionContext, deps: &Collaborators<'_>) -> StepResult {
    let (Some(repo), Some(target_type)) = (ctx.repo.as_ref(), ctx.target_type) else {
        return Err(ResolveFailure::MissingInput("repo or target type").into());
    };

    if target_type == LinkType::Remote {
        deps.sink
            .invoke_follow_up(FollowUp::OpenRepoView {
                repo_path: repo.path_string(),
            })
            .await;
        return Ok(Action::Resolved);
    }

    let Some(sha) = ctx.target_sha.as_ref() else {
        return Err(ResolveFailure::TargetUnresolved(target_type).into());
    };
    deps.sink
        .invoke_follow_up(FollowUp::OpenTargetInGraph {
            reference: GitReference::new(sha.clone(), repo.path_string()),
        })
        .await;
    Ok(Action::Resolved)
}
