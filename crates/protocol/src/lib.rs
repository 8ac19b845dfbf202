//! # Repolink Protocol
//!
//! Shared data model for deep-link resolution: the parsed link event handed to
//! the resolver, the follow-up actions it can request, and the `repolink` URI
//! grammar.
//!
//! ```text
//! vscode://eamodio.gitlens/repolink/{repoId}[/{branch|tag|commit}/{id}]?url={remoteUrl}
//!     │
//!     └──> parse_link_uri ──> LinkEvent ──> resolver
//! ```

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub mod uri;

pub use uri::{parse_link_uri, redact_query, UriError, REPOLINK_PATH_KIND};

/// What a deep link points at inside the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum LinkType {
    /// The repository itself, no specific revision.
    Remote,
    Branch,
    Tag,
    Commit,
}

impl LinkType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Branch => "branch",
            Self::Tag => "tag",
            Self::Commit => "commit",
        }
    }

    /// Parses a target segment of a link path. `remote` is implied by the
    /// absence of a target and is not accepted here.
    #[must_use]
    pub fn from_target_segment(raw: &str) -> Option<Self> {
        match raw {
            "branch" => Some(Self::Branch),
            "tag" => Some(Self::Tag),
            "commit" => Some(Self::Commit),
            _ => None,
        }
    }

    #[must_use]
    pub const fn requires_target(self) -> bool {
        !matches!(self, Self::Remote)
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One inbound deep-link request, already parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct LinkEvent {
    /// Identifier of the repository; conventionally a SHA reachable in it
    /// (usually the first commit).
    pub repo_id: String,
    pub link_type: LinkType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    pub remote_url: String,
    /// The URI this event came from. Display only.
    pub raw_uri: String,
}

impl LinkEvent {
    #[must_use]
    pub fn remote(
        repo_id: impl Into<String>,
        remote_url: impl Into<String>,
        raw_uri: impl Into<String>,
    ) -> Self {
        Self {
            repo_id: repo_id.into(),
            link_type: LinkType::Remote,
            target_id: None,
            remote_url: remote_url.into(),
            raw_uri: raw_uri.into(),
        }
    }

    #[must_use]
    pub fn targeted(
        repo_id: impl Into<String>,
        link_type: LinkType,
        target_id: impl Into<String>,
        remote_url: impl Into<String>,
        raw_uri: impl Into<String>,
    ) -> Self {
        Self {
            repo_id: repo_id.into(),
            link_type,
            target_id: Some(target_id.into()),
            remote_url: remote_url.into(),
            raw_uri: raw_uri.into(),
        }
    }

    /// Checks the fields every resolution needs before it may start.
    pub fn validate(&self) -> Result<(), InvalidLinkEvent> {
        if self.repo_id.trim().is_empty() || self.remote_url.trim().is_empty() {
            return Err(InvalidLinkEvent::MissingRequired);
        }
        if self.link_type.requires_target()
            && self
                .target_id
                .as_deref()
                .map_or(true, |id| id.trim().is_empty())
        {
            return Err(InvalidLinkEvent::MissingTarget(self.link_type));
        }
        Ok(())
    }
}

/// Reasons an event is refused before resolution begins.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidLinkEvent {
    #[error("missing required properties.")]
    MissingRequired,

    #[error("no target id provided for link of type {0}.")]
    MissingTarget(LinkType),
}

/// A revision inside a specific repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GitReference {
    pub sha: String,
    pub repo_path: String,
}

impl GitReference {
    #[must_use]
    pub fn new(sha: impl Into<String>, repo_path: impl Into<String>) -> Self {
        Self {
            sha: sha.into(),
            repo_path: repo_path.into(),
        }
    }
}

/// Follow-up UI action requested once a link is resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "follow_up", rename_all = "snake_case")]
pub enum FollowUp {
    /// Open the repository-level view; the link named no revision.
    OpenRepoView { repo_path: String },
    /// Reveal a concrete revision in the commit graph.
    OpenTargetInGraph {
        #[serde(rename = "ref")]
        reference: GitReference,
    },
}

impl FollowUp {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::OpenRepoView { .. } => "open_repo_view",
            Self::OpenTargetInGraph { .. } => "open_target_in_graph",
        }
    }

    #[must_use]
    pub const fn is_remote_only(&self) -> bool {
        matches!(self, Self::OpenRepoView { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MessageLevel {
    Info,
    Error,
}

/// A user-visible effect, as recorded by sinks that keep a log of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionRecord {
    Message { level: MessageLevel, text: String },
    FollowUp { action: FollowUp },
}

pub fn serialize_json<T: Serialize>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string(value)
}
