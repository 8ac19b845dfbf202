use crate::provider::{Remote, Repository};
use crate::state::State;
use repolink_protocol::{LinkEvent, LinkType};
use serde::Serialize;

/// Mutable state of the resolution in flight. Every field except `state` is
/// scoped to one resolution and cleared when it ends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionContext {
    pub state: State,
    pub raw_uri: Option<String>,
    pub repo_id: Option<String>,
    pub remote_url: Option<String>,
    pub target_id: Option<String>,
    pub target_type: Option<LinkType>,
    pub repo: Option<Repository>,
    pub remote: Option<Remote>,
    /// Only meaningful when `target_type` is not `Remote`.
    pub target_sha: Option<String>,
}

impl ResolutionContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.state == State::Idle
    }

    /// True when no resolution-scoped field is populated.
    #[must_use]
    pub fn is_cleared(&self) -> bool {
        *self == Self::default()
    }

    pub(crate) fn accept(&mut self, event: &LinkEvent) {
        self.raw_uri = Some(event.raw_uri.clone());
        self.repo_id = Some(event.repo_id.clone());
        self.remote_url = Some(event.remote_url.clone());
        self.target_id = event.target_id.clone();
        self.target_type = Some(event.link_type);
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}
