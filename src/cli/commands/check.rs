use std::path::Path;

use anyhow::Result;

use crate::{
    config::{load_config_with_path, Credentials},
    infra::watchlist::select_watchlist,
};

/// Runs every startup validation of a release run without touching the network.
pub(crate) fn run(config: Option<&Path>, watchlist: Option<&Path>) -> Result<()> {
    let loaded = load_config_with_path(config)?;
    let selected = select_watchlist(watchlist, &loaded.config);
    let repos = selected.provider.load()?;
    let credentials = Credentials::from_env()?;

    if loaded.from_file {
        println!(
            "config: {} (source: {})",
            loaded.resolved_path.path.display(),
            loaded.resolved_path.source
        );
    } else {
        println!(
            "config: defaults (no file at {})",
            loaded.resolved_path.path.display()
        );
    }
    println!(
        "watchlist: {} (source: {}, repositories: {})",
        selected.description,
        selected.source,
        repos.len()
    );
    println!("credentials: ok (client id: {})", credentials.client_id);
    println!("api: {}", loaded.config.api.base_url);
    Ok(())
}
