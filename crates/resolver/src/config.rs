use crate::error::{ResolverError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tuning for the resolution engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolverConfig {
    /// Deadline for a single state handler, provider calls included.
    /// `None` lets every call run to completion.
    pub state_timeout_ms: Option<u64>,
}

impl ResolverConfig {
    #[must_use]
    pub fn with_state_timeout(timeout: Duration) -> Self {
        Self {
            state_timeout_ms: Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX)),
        }
    }

    #[must_use]
    pub fn state_timeout(&self) -> Option<Duration> {
        self.state_timeout_ms.map(Duration::from_millis)
    }

    pub fn validate(&self) -> Result<()> {
        if self.state_timeout_ms == Some(0) {
            return Err(ResolverError::InvalidConfig(
                "state_timeout_ms must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}
