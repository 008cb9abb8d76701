use std::{panic::AssertUnwindSafe, sync::Arc, time::Duration};

use futures_util::FutureExt;
use tokio::{
    sync::{mpsc, Semaphore},
    task::JoinSet,
    time::Instant,
};

use crate::{
    config::FetchConfig,
    domain::{
        failure::{AuthError, FetchError, RepoFetchFailure},
        release::{Release, ScrapedRelease, WatchedRepo},
    },
    ports::ReleaseFetcherPort,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FanInOptions {
    /// Upper bound for a single release lookup.
    pub request_timeout: Duration,
    /// Upper bound for the whole run; unreported repositories time out when it fires.
    pub run_timeout: Option<Duration>,
    /// Maximum simultaneous lookups; `None` starts every lookup at once.
    pub max_concurrency: Option<usize>,
}

impl Default for FanInOptions {
    fn default() -> Self {
        Self::from_fetch_config(&FetchConfig::default())
    }
}

impl FanInOptions {
    pub fn from_fetch_config(cfg: &FetchConfig) -> Self {
        Self {
            request_timeout: cfg.request_timeout(),
            run_timeout: cfg.run_timeout(),
            max_concurrency: cfg.max_concurrency.filter(|limit| *limit > 0),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FanInOutcome {
    /// Successes in arrival order.
    pub releases: Vec<ScrapedRelease>,
    /// Failures in arrival order.
    pub failures: Vec<RepoFetchFailure>,
}

impl FanInOutcome {
    pub fn signal_count(&self) -> usize {
        self.releases.len() + self.failures.len()
    }
}

/// Fetches the latest release of every watched repository concurrently.
///
/// Each repository gets its own task which reports exactly once, either on the
/// release channel or on the failure channel. The coordinator stops after it
/// has heard from every repository. `on_failure` runs as soon as a failure
/// arrives so callers can surface it before the run completes.
///
/// A rejected credential aborts every in-flight lookup and is returned as
/// [`AuthError::Rejected`].
pub async fn fetch_latest_releases<F, R>(
    watchlist: &[WatchedRepo],
    fetcher: Arc<F>,
    options: &FanInOptions,
    mut on_failure: R,
) -> Result<FanInOutcome, AuthError>
where
    F: ReleaseFetcherPort + ?Sized + 'static,
    R: FnMut(&RepoFetchFailure),
{
    let total = watchlist.len();
    let (release_tx, mut release_rx) = mpsc::unbounded_channel::<(usize, ScrapedRelease)>();
    let (failure_tx, mut failure_rx) = mpsc::unbounded_channel::<(usize, FetchError)>();
    let limiter = options
        .max_concurrency
        .map(|limit| Arc::new(Semaphore::new(limit)));

    let mut tasks = JoinSet::new();
    for (index, repo) in watchlist.iter().cloned().enumerate() {
        let fetcher = Arc::clone(&fetcher);
        let release_tx = release_tx.clone();
        let failure_tx = failure_tx.clone();
        let limiter = limiter.clone();
        let request_timeout = options.request_timeout;

        tasks.spawn(async move {
            let _permit = match limiter {
                Some(limiter) => limiter.acquire_owned().await.ok(),
                None => None,
            };

            let result = AssertUnwindSafe(fetch_one(fetcher.as_ref(), &repo, request_timeout))
                .catch_unwind()
                .await
                .unwrap_or_else(|_| {
                    Err(FetchError::Transport {
                        repo: repo.clone(),
                        message: "release lookup panicked".to_string(),
                    })
                });

            // The receiver only goes away once the coordinator has given up on the run.
            match result {
                Ok(release) => {
                    let _ = release_tx.send((index, ScrapedRelease { repo, release }));
                }
                Err(error) => {
                    let _ = failure_tx.send((index, error));
                }
            }
        });
    }
    drop(release_tx);
    drop(failure_tx);

    let deadline = options.run_timeout.map(|timeout| Instant::now() + timeout);
    let run_deadline = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now));
    tokio::pin!(run_deadline);

    let mut collector = Collector::new(total);
    while collector.received < total {
        tokio::select! {
            Some((index, scraped)) = release_rx.recv() => {
                collector.accept_release(index, scraped);
            }
            Some((index, error)) = failure_rx.recv() => {
                if let Err(err) = collector.accept_failure(index, error, &mut on_failure) {
                    tasks.abort_all();
                    return Err(err);
                }
            }
            _ = &mut run_deadline, if deadline.is_some() => {
                tasks.abort_all();
                while let Ok((index, scraped)) = release_rx.try_recv() {
                    collector.accept_release(index, scraped);
                }
                while let Ok((index, error)) = failure_rx.try_recv() {
                    collector.accept_failure(index, error, &mut on_failure)?;
                }

                let timeout = options.run_timeout.unwrap_or_default();
                tracing::warn!(
                    timeout = ?timeout,
                    unreported = total - collector.received,
                    "run deadline reached"
                );
                collector.fill_unreported(watchlist, &mut on_failure, |repo| FetchError::Timeout {
                    repo,
                    timeout,
                })?;
                break;
            }
            else => {
                // Every task is gone; anything still missing never reported.
                collector.fill_unreported(watchlist, &mut on_failure, |repo| FetchError::Transport {
                    repo,
                    message: "release lookup ended without a result".to_string(),
                })?;
                break;
            }
        }
    }

    let outcome = collector.outcome;
    tracing::info!(
        repositories = total,
        releases = outcome.releases.len(),
        failures = outcome.failures.len(),
        "release fetch finished"
    );
    Ok(outcome)
}

async fn fetch_one<F>(
    fetcher: &F,
    repo: &WatchedRepo,
    request_timeout: Duration,
) -> Result<Release, FetchError>
where
    F: ReleaseFetcherPort + ?Sized,
{
    match tokio::time::timeout(request_timeout, fetcher.latest_release(repo)).await {
        Ok(result) => result,
        Err(_) => Err(FetchError::Timeout {
            repo: repo.clone(),
            timeout: request_timeout,
        }),
    }
}

struct Collector {
    reported: Vec<bool>,
    received: usize,
    outcome: FanInOutcome,
}

impl Collector {
    fn new(total: usize) -> Self {
        Self {
            reported: vec![false; total],
            received: 0,
            outcome: FanInOutcome::default(),
        }
    }

    fn mark(&mut self, index: usize) {
        if !self.reported[index] {
            self.reported[index] = true;
            self.received += 1;
        }
    }

    fn accept_release(&mut self, index: usize, scraped: ScrapedRelease) {
        self.mark(index);
        tracing::debug!(repo = %scraped.repo, release = %scraped.release.name, "release fetched");
        self.outcome.releases.push(scraped);
    }

    fn accept_failure<R>(
        &mut self,
        index: usize,
        error: FetchError,
        on_failure: &mut R,
    ) -> Result<(), AuthError>
    where
        R: FnMut(&RepoFetchFailure),
    {
        self.mark(index);
        if let FetchError::Unauthorized { repo, message } = &error {
            return Err(AuthError::Rejected {
                repo: repo.full_name(),
                message: message.clone(),
            });
        }

        let failure = RepoFetchFailure::from(error);
        tracing::debug!(repo = %failure.repo, kind = failure.kind, error = %failure.message, "release fetch failed");
        on_failure(&failure);
        self.outcome.failures.push(failure);
        Ok(())
    }

    fn fill_unreported<R, E>(
        &mut self,
        watchlist: &[WatchedRepo],
        on_failure: &mut R,
        make_error: E,
    ) -> Result<(), AuthError>
    where
        R: FnMut(&RepoFetchFailure),
        E: Fn(WatchedRepo) -> FetchError,
    {
        for (index, repo) in watchlist.iter().enumerate() {
            if !self.reported[index] {
                self.accept_failure(index, make_error(repo.clone()), on_failure)?;
            }
        }
        Ok(())
    }
}
