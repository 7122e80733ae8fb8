//! Inspect or modify the configuration file.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use libgitall::config::{self, Account, Config, Protocol, RepoEntry};
use libgitall::{GitallError, git};

use crate::commands::Context;
use crate::render;

/// Create a starter configuration for one account. Refuses to overwrite.
pub fn init(ctx: &Context, username: &str) -> Result<()> {
    let path = config::default_path()?;
    if path.exists() {
        return Err(GitallError::ConfigError(format!(
            "{} already exists",
            path.display()
        ))
        .into());
    }
    let config = config::default_config(username);
    config.save(&path)?;

    let mut out = ctx.stdout();
    render::info(&mut out, &format!("wrote {}", path.display()))?;
    Ok(())
}

/// Print the configuration, as TOML or JSON.
pub fn show(ctx: &Context) -> Result<()> {
    let path = config::default_path()?;
    let config = Config::load(&path)?;

    let mut out = ctx.stdout();
    if ctx.json {
        render::info(&mut out, &serde_json::to_string_pretty(&config)?)?;
    } else {
        let encoded = toml::to_string_pretty(&config).context("encoding config")?;
        render::info(&mut out, encoded.trim_end())?;
    }
    Ok(())
}

/// Print the configuration file path.
pub fn path(ctx: &Context) -> Result<()> {
    let mut out = ctx.stdout();
    render::info(&mut out, &config::default_path()?.display().to_string())?;
    Ok(())
}

/// Add an account, creating the configuration file if needed.
pub fn add_account(
    ctx: &Context,
    username: &str,
    dir: &str,
    protocol: Protocol,
    token: Option<String>,
) -> Result<()> {
    let config_path = config::default_path()?;
    let mut config = if config_path.exists() {
        Config::load(&config_path)?
    } else {
        Config::default()
    };

    config.add_account(Account {
        username: username.to_string(),
        dir: dir.to_string(),
        protocol,
        token,
        api_url: None,
        active: None,
    })?;
    config.save(&config_path)?;

    let mut out = ctx.stdout();
    if !ctx.quiet {
        render::info(&mut out, &format!("added account '{username}'"))?;
    }
    Ok(())
}

/// Remove an account by username.
pub fn remove_account(ctx: &Context, username: &str) -> Result<()> {
    let config_path = config::default_path()?;
    let mut config = Config::load(&config_path)?;
    config.remove_account(username)?;
    config.save(&config_path)?;

    let mut out = ctx.stdout();
    if !ctx.quiet {
        render::info(&mut out, &format!("removed account '{username}'"))?;
    }
    Ok(())
}

/// Scan a directory tree and pin the repositories found there.
pub fn discover(ctx: &Context, dir: &str, dry_run: bool) -> Result<()> {
    let scan_root = PathBuf::from(config::expand_path(dir));
    let repos = git::discover_repos_recursive(&scan_root)?;

    let config_path = config::default_path()?;
    let mut config = if config_path.exists() {
        Config::load(&config_path)?
    } else {
        Config::default()
    };

    let mut out = ctx.stdout();
    let mut added = 0;
    for repo_path in repos {
        let name = git::repo_name_from_path(&repo_path);
        let Some(owner) = git::remote_owner(&repo_path) else {
            if !ctx.quiet {
                render::info(&mut out, &format!("{name}: no recognisable origin, skipped"))?;
            }
            continue;
        };
        let entry = RepoEntry {
            name,
            owner,
            dir: repo_path.to_string_lossy().into_owned(),
            protocol: git::remote_protocol(&repo_path).unwrap_or_default(),
        };

        if dry_run {
            render::dry_run(&mut out, "add", &format!("{}/{} at {}", entry.owner, entry.name, entry.dir))?;
            continue;
        }
        match config.add_repo(entry) {
            Ok(()) => added += 1,
            // Already-pinned repositories are fine on a rescan.
            Err(GitallError::ConfigError(_)) => {}
            Err(err) => return Err(err.into()),
        }
    }

    if dry_run {
        return Ok(());
    }

    config.save(&config_path)?;
    if !ctx.quiet {
        render::info(&mut out, &format!("added {added} repos"))?;
    }
    Ok(())
}
