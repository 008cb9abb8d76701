use std::{
    env,
    fmt::{Display, Formatter},
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use directories::BaseDirs;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::{failure::AuthError, release::WatchedRepo};

pub const CONFIG_ENV_VAR: &str = "RELEASE_WATCH_CONFIG";
pub const CLIENT_ID_ENV_VAR: &str = "CLIENT_ID";
pub const CLIENT_SECRET_ENV_VAR: &str = "CLIENT_SECRET";
pub const DEFAULT_WATCHLIST_PATH: &str = "watchlist.json";
const LOCAL_CONFIG_FILE: &str = "release-watch.toml";

/// Problems with the config file or the watchlist. Always fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse watchlist {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to parse config TOML: {source}")]
    Toml {
        #[source]
        source: toml::de::Error,
    },
    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    pub watchlist: Option<PathBuf>,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub repositories: Vec<RepositoryConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    pub max_concurrency: Option<usize>,
    pub run_timeout_seconds: Option<u64>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
            max_concurrency: None,
            run_timeout_seconds: None,
        }
    }
}

impl FetchConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn run_timeout(&self) -> Option<Duration> {
        self.run_timeout_seconds.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryConfig {
    pub owner: String,
    pub name: String,
}

impl From<&RepositoryConfig> for WatchedRepo {
    fn from(repo: &RepositoryConfig) -> Self {
        WatchedRepo::new(repo.owner.clone(), repo.name.clone())
    }
}

fn default_base_url() -> String {
    "https://api.github.com".to_string()
}

fn default_user_agent() -> String {
    format!("release-watch/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout_seconds() -> u64 {
    30
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigPathSource {
    ExplicitArg,
    LocalFile,
    EnvVar,
    DefaultPath,
}

impl Display for ConfigPathSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::ExplicitArg => "--config",
            Self::LocalFile => "./release-watch.toml",
            Self::EnvVar => CONFIG_ENV_VAR,
            Self::DefaultPath => "default",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfigPath {
    pub path: PathBuf,
    pub source: ConfigPathSource,
}

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub resolved_path: ResolvedConfigPath,
    /// False when no file existed at the resolved path and defaults were used.
    pub from_file: bool,
}

pub fn parse_config(src: &str) -> Result<Config, ConfigError> {
    let cfg: Config = toml::from_str(src).map_err(|source| ConfigError::Toml { source })?;
    validate_config(&cfg)?;
    Ok(cfg)
}

pub fn load_config_with_path(path: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    let resolved_path = resolve_config_path_with_source(path)?;

    if resolved_path.source != ConfigPathSource::ExplicitArg && !resolved_path.path.exists() {
        return Ok(LoadedConfig {
            config: Config::default(),
            resolved_path,
            from_file: false,
        });
    }

    let src = fs::read_to_string(&resolved_path.path).map_err(|source| ConfigError::Read {
        path: resolved_path.path.clone(),
        source,
    })?;
    let config = parse_config(&src)?;
    Ok(LoadedConfig {
        config,
        resolved_path,
        from_file: true,
    })
}

pub fn resolve_config_path_with_source(
    path: Option<&Path>,
) -> Result<ResolvedConfigPath, ConfigError> {
    if let Some(explicit) = path {
        return Ok(ResolvedConfigPath {
            path: explicit.to_path_buf(),
            source: ConfigPathSource::ExplicitArg,
        });
    }

    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.exists() {
        return Ok(ResolvedConfigPath {
            path: local,
            source: ConfigPathSource::LocalFile,
        });
    }

    if let Some(raw) = env::var_os(CONFIG_ENV_VAR).filter(|raw| !raw.is_empty()) {
        return Ok(ResolvedConfigPath {
            path: PathBuf::from(raw),
            source: ConfigPathSource::EnvVar,
        });
    }

    Ok(ResolvedConfigPath {
        path: default_config_path()?,
        source: ConfigPathSource::DefaultPath,
    })
}

pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let dirs = BaseDirs::new()
        .ok_or_else(|| ConfigError::Invalid("could not determine home directory".to_string()))?;
    Ok(dirs
        .home_dir()
        .join(".config")
        .join("release-watch")
        .join("config.toml"))
}

fn validate_config(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.api.base_url.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "api.base_url must not be empty".to_string(),
        ));
    }

    if cfg.fetch.timeout_seconds == 0 {
        return Err(ConfigError::Invalid(
            "fetch.timeout_seconds must be >= 1".to_string(),
        ));
    }

    if cfg.fetch.max_concurrency == Some(0) {
        return Err(ConfigError::Invalid(
            "fetch.max_concurrency must be >= 1".to_string(),
        ));
    }

    if cfg.fetch.run_timeout_seconds == Some(0) {
        return Err(ConfigError::Invalid(
            "fetch.run_timeout_seconds must be >= 1".to_string(),
        ));
    }

    for (index, repo) in cfg.repositories.iter().enumerate() {
        validate_repo(index, &WatchedRepo::from(repo))?;
    }

    Ok(())
}

pub(crate) fn validate_repo(index: usize, repo: &WatchedRepo) -> Result<(), ConfigError> {
    let valid_part =
        |part: &str| !part.is_empty() && !part.contains('/') && !part.contains(char::is_whitespace);

    if valid_part(&repo.owner) && valid_part(&repo.name) {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "watchlist entry {index} ('{}' / '{}') is invalid; expected a non-empty owner and repository name",
            repo.owner, repo.name
        )))
    }
}

/// OAuth client credentials used for every API call of a run.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn from_env() -> Result<Self, AuthError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AuthError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let client_id = read(CLIENT_ID_ENV_VAR);
        let client_secret = read(CLIENT_SECRET_ENV_VAR);

        match (client_id, client_secret) {
            (Some(client_id), Some(client_secret)) => Ok(Self {
                client_id,
                client_secret,
            }),
            (client_id, client_secret) => {
                let mut missing = Vec::new();
                if client_id.is_none() {
                    missing.push(CLIENT_ID_ENV_VAR);
                }
                if client_secret.is_none() {
                    missing.push(CLIENT_SECRET_ENV_VAR);
                }
                Err(AuthError::MissingCredentials { missing })
            }
        }
    }
}
