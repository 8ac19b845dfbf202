use crate::provider::ProviderError;
use crate::state::State;
use repolink_protocol::LinkType;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ResolverError>;

#[derive(Error, Debug)]
pub enum ResolverError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Why a resolution ended in `Errored`. The display text is the message shown
/// to the user.
#[derive(Error, Debug)]
pub enum ResolveFailure {
    #[error("No repo id was provided.")]
    MissingRepoId,

    /// A context field the current state depends on is absent.
    #[error("Missing {0}.")]
    MissingInput(&'static str),

    /// A lookup exhausted every candidate.
    #[error("No matching {0} found.")]
    NotFound(&'static str),

    /// Clone, add-remote and fetch are not available yet; they conclude the
    /// same way a failed lookup does.
    #[error("No matching {subject} found.")]
    Unsupported {
        operation: &'static str,
        subject: &'static str,
    },

    #[error("Cannot find target {0} in repo.")]
    TargetUnresolved(LinkType),

    #[error("Unknown state.")]
    UnknownState,

    #[error("Failed to {operation}: {source}")]
    Provider {
        operation: &'static str,
        #[source]
        source: ProviderError,
    },

    #[error("Timed out while resolving {0}.")]
    Timeout(State),
}

impl ResolveFailure {
    #[must_use]
    pub fn provider(operation: &'static str, source: ProviderError) -> Self {
        Self::Provider { operation, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn messages_match_user_facing_text() {
        assert_eq!(
            ResolveFailure::MissingRepoId.to_string(),
            "No repo id was provided."
        );
        assert_eq!(
            ResolveFailure::NotFound("repo").to_string(),
            "No matching repo found."
        );
        assert_eq!(
            ResolveFailure::Unsupported {
                operation: "fetch",
                subject: "target",
            }
            .to_string(),
            "No matching target found."
        );
        assert_eq!(
            ResolveFailure::TargetUnresolved(LinkType::Tag).to_string(),
            "Cannot find target tag in repo."
        );
        assert_eq!(
            ResolveFailure::provider("list remotes", ProviderError::Other("boom".into()))
                .to_string(),
            "Failed to list remotes: boom"
        );
    }
}
