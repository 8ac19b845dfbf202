//! Parser for `repolink` deep-link URIs.
//!
//! Accepted shapes (any scheme and authority):
//!
//! 1. Remote: `/repolink/{repoId}?url={remoteUrl}`
//! 2. Branch: `/repolink/{repoId}/branch/{branchName}?url={remoteUrl}`
//! 3. Tag:    `/repolink/{repoId}/tag/{tagName}?url={remoteUrl}`
//! 4. Commit: `/repolink/{repoId}/commit/{commitSha}?url={remoteUrl}`

use crate::{LinkEvent, LinkType};
use thiserror::Error;
use url::Url;

/// First path segment that marks a deep link.
pub const REPOLINK_PATH_KIND: &str = "repolink";

const REMOTE_URL_PARAM: &str = "url";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UriError {
    #[error("Invalid URI: {0}")]
    Invalid(String),

    #[error("Unsupported URI kind: {0}")]
    UnsupportedKind(String),

    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Unknown link type: {0}")]
    UnknownLinkType(String),

    #[error("Malformed deep link path: {0}")]
    Malformed(String),
}

pub fn parse_link_uri(raw: &str) -> Result<LinkEvent, UriError> {
    let uri = Url::parse(raw.trim()).map_err(|e| UriError::Invalid(e.to_string()))?;
    let segments: Vec<&str> = uri.path().split('/').collect();

    let kind = segments.get(1).copied().unwrap_or_default();
    if kind != REPOLINK_PATH_KIND {
        return Err(UriError::UnsupportedKind(kind.to_string()));
    }

    let repo_id = segments
        .get(2)
        .map(|s| decode_segment(s))
        .transpose()?
        .filter(|s| !s.is_empty())
        .ok_or(UriError::MissingField("repo id"))?;

    let remote_url = uri
        .query_pairs()
        .find(|(key, _)| key == REMOTE_URL_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|s| !s.is_empty())
        .ok_or(UriError::MissingField("remote url"))?;

    let raw_uri = uri.to_string();
    if segments.len() == 3 {
        return Ok(LinkEvent::remote(repo_id, remote_url, raw_uri));
    }

    if segments.len() < 5 {
        return Err(UriError::Malformed(uri.path().to_string()));
    }

    let link_type = LinkType::from_target_segment(segments[3])
        .ok_or_else(|| UriError::UnknownLinkType(segments[3].to_string()))?;
    let target_id = decode_segment(segments[4])?;
    if target_id.is_empty() {
        return Err(UriError::MissingField("target id"));
    }

    Ok(LinkEvent::targeted(
        repo_id, link_type, target_id, remote_url, raw_uri,
    ))
}

/// Drops the query string so tokens carried there never reach the logs.
#[must_use]
pub fn redact_query(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut uri) => {
            uri.set_query(None);
            uri.to_string()
        }
        Err(_) => raw.split('?').next().unwrap_or_default().to_string(),
    }
}

fn decode_segment(raw: &str) -> Result<String, UriError> {
    urlencoding::decode(raw)
        .map(|s| s.into_owned())
        .map_err(|e| UriError::Malformed(format!("{raw}: {e}")))
}
