//! Resolution of which repositories a command operates on.
//!
//! Commands take their targets either from an explicit `--dir` scan or from
//! the configuration: pinned repositories plus the contents of each active
//! account directory.

use std::path::PathBuf;

use anyhow::{Context, Result};
use libgitall::config::{self, Account, Config};
use libgitall::git;

/// Load the configuration from its default location.
pub fn load_config() -> Result<Config> {
    let path = config::default_path()?;
    let config = Config::load(&path)?;
    Ok(config)
}

/// The active accounts, narrowed to one username when `user` is given.
pub fn resolve_accounts<'a>(config: &'a Config, user: Option<&str>) -> Result<Vec<&'a Account>> {
    match user {
        Some(user) => {
            let account = config
                .account(user)
                .with_context(|| format!("no account '{user}' in the configuration"))?;
            Ok(vec![account])
        }
        None => {
            let accounts = config.active_accounts();
            anyhow::ensure!(!accounts.is_empty(), "no active accounts configured");
            Ok(accounts)
        }
    }
}

/// Repository paths to operate on. An explicit directory wins; otherwise
/// pinned repositories and the active account directories are scanned.
/// Paths are deduplicated and sorted.
pub fn repo_paths(dir: Option<&str>, user: Option<&str>) -> Result<Vec<PathBuf>> {
    if let Some(dir) = dir {
        let expanded = PathBuf::from(config::expand_path(dir));
        let repos = git::discover_repos(&expanded)?;
        anyhow::ensure!(
            !repos.is_empty(),
            "no git repositories under {}",
            expanded.display()
        );
        return Ok(repos);
    }

    let config = load_config()?;
    let mut paths = Vec::new();
    if user.is_none() {
        paths.extend(config.repo_dirs(None).into_iter().filter(|path| path.exists()));
    }
    for account in resolve_accounts(&config, user)? {
        let account_dir = PathBuf::from(&account.dir);
        if account_dir.is_dir() {
            paths.extend(git::discover_repos(&account_dir)?);
        }
        if user.is_some() {
            paths.extend(
                config
                    .repo_dirs(Some(&account.username))
                    .into_iter()
                    .filter(|path| path.exists()),
            );
        }
    }

    paths.sort();
    paths.dedup();
    anyhow::ensure!(!paths.is_empty(), "no repositories to operate on");
    Ok(paths)
}

/// Keep only paths whose origin belongs to `owner`.
pub fn filter_by_owner(paths: Vec<PathBuf>, owner: &str) -> Vec<PathBuf> {
    paths
        .into_iter()
        .filter(|path| {
            git::remote_owner(path)
                .is_some_and(|repo_owner| repo_owner.eq_ignore_ascii_case(owner))
        })
        .collect()
}
