use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::domain::release::WatchedRepo;

pub const FAILURE_KIND_NOT_FOUND: &str = "not_found";
pub const FAILURE_KIND_UNAUTHORIZED: &str = "unauthorized";
pub const FAILURE_KIND_TRANSPORT: &str = "transport";
pub const FAILURE_KIND_TIMEOUT: &str = "timeout";

/// Why fetching the latest release of a single repository failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("No releases found for {repo}")]
    NotFound { repo: WatchedRepo },
    #[error("credentials rejected while fetching releases for {repo}: {message}")]
    Unauthorized { repo: WatchedRepo, message: String },
    #[error("failed to fetch releases for {repo}: {message}")]
    Transport { repo: WatchedRepo, message: String },
    #[error("timed out after {timeout:?} fetching releases for {repo}")]
    Timeout { repo: WatchedRepo, timeout: Duration },
}

impl FetchError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => FAILURE_KIND_NOT_FOUND,
            Self::Unauthorized { .. } => FAILURE_KIND_UNAUTHORIZED,
            Self::Transport { .. } => FAILURE_KIND_TRANSPORT,
            Self::Timeout { .. } => FAILURE_KIND_TIMEOUT,
        }
    }

    pub fn repo(&self) -> &WatchedRepo {
        match self {
            Self::NotFound { repo }
            | Self::Unauthorized { repo, .. }
            | Self::Transport { repo, .. }
            | Self::Timeout { repo, .. } => repo,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoFetchFailure {
    pub repo: String,
    pub kind: &'static str,
    pub message: String,
    #[serde(skip)]
    pub error: FetchError,
}

impl From<FetchError> for RepoFetchFailure {
    fn from(error: FetchError) -> Self {
        Self {
            repo: error.repo().full_name(),
            kind: error.kind(),
            message: error.to_string(),
            error,
        }
    }
}

/// Credential problems. Both variants abort the whole run.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Please set a GitHub OAuth client ID and secret (missing: {})", .missing.join(", "))]
    MissingCredentials { missing: Vec<&'static str> },
    #[error("GitHub rejected the client credentials ({repo}): {message}")]
    Rejected { repo: String, message: String },
}
