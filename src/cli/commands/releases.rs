use std::sync::Arc;

use anyhow::{Context, Result};

use crate::{
    app::{
        fan_in::{fetch_latest_releases, FanInOptions},
        report::ReleaseReport,
    },
    cli::args::RunArgs,
    config::{load_config_with_path, Credentials},
    infra::{gh_client::GithubReleaseClient, watchlist::select_watchlist},
};

pub(crate) async fn run(args: RunArgs) -> Result<()> {
    let loaded = load_config_with_path(args.config.as_deref())?;
    let cfg = loaded.config;

    let selected = select_watchlist(args.watchlist.as_deref(), &cfg);
    let watchlist = selected.provider.load()?;
    tracing::debug!(
        source = %selected.source,
        watchlist = %selected.description,
        repositories = watchlist.len(),
        "watchlist loaded"
    );

    let credentials = Credentials::from_env()?;
    let client = GithubReleaseClient::new(&cfg.api, credentials)?;
    let options = FanInOptions::from_fetch_config(&cfg.fetch);

    let json = args.json;
    let outcome = fetch_latest_releases(&watchlist, Arc::new(client), &options, |failure| {
        if json {
            eprintln!("{}", failure.message);
        } else {
            println!("{}", failure.message);
        }
    })
    .await?;

    let report = ReleaseReport::from_outcome(outcome);
    if json {
        let doc = report
            .to_json()
            .context("failed to serialize release report")?;
        println!("{doc}");
    } else {
        print!("{}", report.render_table());
    }

    Ok(())
}
