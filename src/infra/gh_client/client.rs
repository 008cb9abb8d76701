use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, ACCEPT},
    StatusCode,
};

use crate::{
    config::{ApiConfig, Credentials},
    domain::{
        failure::FetchError,
        release::{Release, WatchedRepo},
    },
    ports::ReleaseFetcherPort,
};

use super::{
    models::{GhErrorBody, GhRelease},
    normalize::normalize_release,
};

const GITHUB_JSON: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "x-github-api-version";
const API_VERSION: &str = "2022-11-28";
const ERROR_BODY_MAX_CHARS: usize = 200;

/// Lists releases through the GitHub REST API, authenticated as an OAuth app.
#[derive(Debug, Clone)]
pub struct GithubReleaseClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

impl GithubReleaseClient {
    pub fn new(api: &ApiConfig, credentials: Credentials) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_JSON));
        headers.insert(
            HeaderName::from_static(API_VERSION_HEADER),
            HeaderValue::from_static(API_VERSION),
        );

        let http = reqwest::Client::builder()
            .user_agent(api.user_agent.clone())
            .default_headers(headers)
            .build()
            .context("failed to build GitHub HTTP client")?;

        Ok(Self {
            http,
            base_url: api.base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn releases_endpoint(&self, repo: &WatchedRepo) -> String {
        format!("{}/repos/{}/{}/releases", self.base_url, repo.owner, repo.name)
    }
}

#[async_trait]
impl ReleaseFetcherPort for GithubReleaseClient {
    async fn latest_release(&self, repo: &WatchedRepo) -> Result<Release, FetchError> {
        let endpoint = self.releases_endpoint(repo);
        tracing::debug!(repo = %repo, endpoint = %endpoint, "listing releases");

        // Only the first page is consulted; its first entry is taken as the latest release.
        let response = self
            .http
            .get(&endpoint)
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .send()
            .await
            .map_err(|err| FetchError::Transport {
                repo: repo.clone(),
                message: err.to_string(),
            })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(FetchError::Unauthorized {
                repo: repo.clone(),
                message: error_message(response).await,
            });
        }

        if !status.is_success() {
            return Err(FetchError::Transport {
                repo: repo.clone(),
                message: format!("status={status}: {}", error_message(response).await),
            });
        }

        let releases: Vec<GhRelease> = response.json().await.map_err(|err| FetchError::Transport {
            repo: repo.clone(),
            message: format!("invalid releases payload: {err}"),
        })?;
        tracing::debug!(repo = %repo, count = releases.len(), "received releases page");

        releases
            .into_iter()
            .next()
            .map(normalize_release)
            .ok_or_else(|| FetchError::NotFound { repo: repo.clone() })
    }
}

async fn error_message(response: reqwest::Response) -> String {
    let body = response.text().await.unwrap_or_default();
    serde_json::from_str::<GhErrorBody>(&body)
        .ok()
        .and_then(|parsed| parsed.message)
        .unwrap_or_else(|| truncate(body.trim(), ERROR_BODY_MAX_CHARS))
}

fn truncate(input: &str, max_chars: usize) -> String {
    if input.chars().count() <= max_chars {
        return input.to_string();
    }
    let mut s = input
        .chars()
        .take(max_chars.saturating_sub(1))
        .collect::<String>();
    s.push_str("...");
    s
}
