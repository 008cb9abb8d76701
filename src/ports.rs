use async_trait::async_trait;

use crate::{
    config::ConfigError,
    domain::{
        failure::FetchError,
        release::{Release, WatchedRepo},
    },
};

/// Source of the repositories to poll.
pub trait WatchlistPort: Send + Sync {
    fn load(&self) -> Result<Vec<WatchedRepo>, ConfigError>;
}

#[async_trait]
pub trait ReleaseFetcherPort: Send + Sync {
    /// Returns the first release of the first page the forge lists for `repo`.
    async fn latest_release(&self, repo: &WatchedRepo) -> Result<Release, FetchError>;
}
