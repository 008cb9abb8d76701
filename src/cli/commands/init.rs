use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};

use crate::config::DEFAULT_WATCHLIST_PATH;

const SAMPLE_WATCHLIST: &str = include_str!("../../../watchlist.example.json");

pub(crate) fn run(path: Option<PathBuf>, force: bool) -> Result<()> {
    let path = path.unwrap_or_else(|| PathBuf::from(DEFAULT_WATCHLIST_PATH));
    prepare_init_target(&path, force)?;

    fs::write(&path, SAMPLE_WATCHLIST)
        .with_context(|| format!("failed to write watchlist: {}", path.display()))?;

    println!("created watchlist: {}", path.display());
    println!("next: edit the userName/repoName entries, then export CLIENT_ID and CLIENT_SECRET");
    Ok(())
}

fn prepare_init_target(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(anyhow!(
            "watchlist already exists: {} (use --force to overwrite)",
            path.display()
        ));
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create watchlist directory: {}", parent.display())
            })?;
        }
    }

    Ok(())
}
