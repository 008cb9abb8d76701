use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A repository on the watchlist, identified by owner and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WatchedRepo {
    #[serde(rename = "userName")]
    pub owner: String,
    #[serde(rename = "repoName")]
    pub name: String,
}

impl WatchedRepo {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl Display for WatchedRepo {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub download_url: String,
}

/// A watchlist entry paired with the release fetched for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapedRelease {
    pub repo: WatchedRepo,
    pub release: Release,
}
