use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    config::{validate_repo, Config, ConfigError, DEFAULT_WATCHLIST_PATH},
    domain::release::WatchedRepo,
    ports::WatchlistPort,
};

/// Reads `[{"userName": "...", "repoName": "..."}]` from a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileWatchlist {
    path: PathBuf,
}

impl JsonFileWatchlist {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl WatchlistPort for JsonFileWatchlist {
    fn load(&self) -> Result<Vec<WatchedRepo>, ConfigError> {
        let src = fs::read_to_string(&self.path).map_err(|source| ConfigError::Read {
            path: self.path.clone(),
            source,
        })?;
        let repos: Vec<WatchedRepo> =
            serde_json::from_str(&src).map_err(|source| ConfigError::Json {
                path: self.path.clone(),
                source,
            })?;
        validate_watchlist(&repos)?;
        Ok(repos)
    }
}

#[derive(Debug, Clone, Default)]
pub struct StaticWatchlist {
    repos: Vec<WatchedRepo>,
}

impl StaticWatchlist {
    pub fn new(repos: Vec<WatchedRepo>) -> Self {
        Self { repos }
    }
}

impl WatchlistPort for StaticWatchlist {
    fn load(&self) -> Result<Vec<WatchedRepo>, ConfigError> {
        validate_watchlist(&self.repos)?;
        Ok(self.repos.clone())
    }
}

fn validate_watchlist(repos: &[WatchedRepo]) -> Result<(), ConfigError> {
    repos
        .iter()
        .enumerate()
        .try_for_each(|(index, repo)| validate_repo(index, repo))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchlistSource {
    Flag,
    ConfigPath,
    ConfigRepositories,
    DefaultFile,
}

impl std::fmt::Display for WatchlistSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Flag => "--watchlist",
            Self::ConfigPath => "config watchlist",
            Self::ConfigRepositories => "config repositories",
            Self::DefaultFile => "./watchlist.json",
        })
    }
}

/// The watchlist picked for a run plus a label describing where it came from.
pub struct SelectedWatchlist {
    pub provider: Box<dyn WatchlistPort>,
    pub source: WatchlistSource,
    pub description: String,
}

pub fn select_watchlist(flag: Option<&Path>, cfg: &Config) -> SelectedWatchlist {
    if let Some(path) = flag {
        return file_watchlist(path, WatchlistSource::Flag);
    }

    if let Some(path) = cfg.watchlist.as_deref() {
        return file_watchlist(path, WatchlistSource::ConfigPath);
    }

    if !cfg.repositories.is_empty() {
        let repos = cfg.repositories.iter().map(WatchedRepo::from).collect();
        return SelectedWatchlist {
            provider: Box::new(StaticWatchlist::new(repos)),
            source: WatchlistSource::ConfigRepositories,
            description: format!("{} configured repositories", cfg.repositories.len()),
        };
    }

    file_watchlist(Path::new(DEFAULT_WATCHLIST_PATH), WatchlistSource::DefaultFile)
}

fn file_watchlist(path: &Path, source: WatchlistSource) -> SelectedWatchlist {
    SelectedWatchlist {
        provider: Box::new(JsonFileWatchlist::new(path)),
        source,
        description: path.display().to_string(),
    }
}
