use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum State {
    #[default]
    Idle,
    RepoMatch,
    /// Repository matching again after a clone or add.
    AddedRepoMatch,
    CloneOrAddRepo,
    RemoteMatch,
    AddRemote,
    TargetMatch,
    /// Target matching again after a fetch.
    FetchedTargetMatch,
    Fetch,
    OpenTarget,
}

impl State {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::RepoMatch => "repo match",
            Self::AddedRepoMatch => "added repo match",
            Self::CloneOrAddRepo => "clone or add repo",
            Self::RemoteMatch => "remote match",
            Self::AddRemote => "add remote",
            Self::TargetMatch => "target match",
            Self::FetchedTargetMatch => "fetched target match",
            Self::Fetch => "fetch",
            Self::OpenTarget => "open target",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transition labels. Each state handler concludes with exactly one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    EventFired,
    RepoMatchedWithRemoteUrl,
    RepoMatchedWithId,
    RepoMatchFailed,
    RemoteMatched,
    RemoteMatchFailed,
    TargetMatched,
    TargetMatchFailed,
    Resolved,
    Errored(String),
    Cancelled,
}

impl Action {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::EventFired => "event_fired",
            Self::RepoMatchedWithRemoteUrl => "repo_matched_with_remote_url",
            Self::RepoMatchedWithId => "repo_matched_with_id",
            Self::RepoMatchFailed => "repo_match_failed",
            Self::RemoteMatched => "remote_matched",
            Self::RemoteMatchFailed => "remote_match_failed",
            Self::TargetMatched => "target_matched",
            Self::TargetMatchFailed => "target_match_failed",
            Self::Resolved => "resolved",
            Self::Errored(_) => "errored",
            Self::Cancelled => "cancelled",
        }
    }
}

/// The transition table. `None` marks a pair with no defined edge.
#[must_use]
pub fn transition(state: State, action: &Action) -> Option<State> {
    use Action as A;
    use State as S;

    if matches!(action, A::Cancelled) {
        return Some(S::Idle);
    }

    let next = match (state, action) {
        (S::Idle, A::EventFired) => S::RepoMatch,

        (S::RepoMatch | S::AddedRepoMatch, A::RepoMatchedWithRemoteUrl | A::RepoMatchedWithId) => {
            S::RemoteMatch
        }
        (S::RepoMatch, A::RepoMatchFailed) => S::CloneOrAddRepo,

        (S::RemoteMatch, A::RemoteMatched) => S::TargetMatch,
        (S::RemoteMatch, A::RemoteMatchFailed) => S::AddRemote,

        (S::TargetMatch | S::FetchedTargetMatch, A::TargetMatched) => S::OpenTarget,
        (S::TargetMatch, A::TargetMatchFailed) => S::Fetch,

        (S::OpenTarget, A::Resolved) => S::Idle,

        (
            S::RepoMatch
            | S::AddedRepoMatch
            | S::CloneOrAddRepo
            | S::RemoteMatch
            | S::AddRemote
            | S::TargetMatch
            | S::FetchedTargetMatch
            | S::Fetch
            | S::OpenTarget,
            A::Errored(_),
        ) => S::Idle,

        _ => return None,
    };
    Some(next)
}
