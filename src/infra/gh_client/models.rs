use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GhRelease {
    pub(crate) name: Option<String>,
    pub(crate) tag_name: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) tarball_url: Option<String>,
    pub(crate) html_url: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct GhErrorBody {
    pub(super) message: Option<String>,
}
