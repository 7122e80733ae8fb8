//! Clone missing repositories for the configured accounts.

use std::path::PathBuf;

use anyhow::Result;
use libgitall::config::{self, Account, Protocol};
use libgitall::github::{Client, ListOptions};
use libgitall::runner::{self, Task};
use libgitall::{GitallError, Summary, git};

use crate::commands::Context;
use crate::{render, resolve};

/// Parameters for the clone command.
pub struct CloneRequest {
    /// Clone this user's repositories instead of the configured accounts.
    pub user: Option<String>,
    /// Destination directory override.
    pub dir: Option<String>,
    /// Clone URL protocol override.
    pub protocol: Option<Protocol>,
    /// Maximum clones in flight.
    pub concurrency: usize,
    /// Show what would be cloned without cloning.
    pub dry_run: bool,
    /// Listing filters forwarded to the API client.
    pub list_options: ListOptions,
}

/// Run the clone command.
pub fn run(ctx: &Context, request: CloneRequest) -> Result<()> {
    let accounts = clone_accounts(&request)?;

    let mut out = ctx.stdout();
    let mut tasks = Vec::new();
    for account in &accounts {
        let base = request
            .dir
            .as_deref()
            .map_or_else(|| account.dir.clone(), config::expand_path);
        let base = PathBuf::from(base);
        let protocol = request.protocol.unwrap_or(account.protocol);

        let client = Client::new(account.api_url.as_deref(), account.token.as_deref())?;
        let repos = client.list_repos(&account.username, &request.list_options)?;
        if !ctx.quiet && !ctx.json {
            render::info(
                &mut out,
                &format!("{}: {} repos listed", account.username, repos.len()),
            )?;
        }

        for repo in &repos {
            let dest = base.join(repo.name.to_lowercase());
            let url = Client::clone_url(repo, protocol);
            if request.dry_run {
                if !dest.exists() {
                    render::dry_run(&mut out, "clone", &format!("{url} -> {}", dest.display()))?;
                }
                continue;
            }
            tasks.push(Task::new(repo.name.clone(), move || git::clone(&url, &dest)));
        }
    }

    if request.dry_run {
        return Ok(());
    }

    let show_progress = !ctx.quiet && !ctx.json;
    let results =
        runner::run_with_progress(tasks, request.concurrency, |completed, total, name, result| {
            if show_progress {
                if let Err(err) = render::progress(&mut out, completed, total, name, result) {
                    eprintln!("writing progress: {err}");
                }
            }
        });

    let summary = Summary::of("clone", &results);
    if ctx.json {
        render::results_json(&mut out, &results, &summary)?;
    } else {
        if ctx.quiet {
            render::failures(&mut out, &results)?;
        }
        render::summary(&mut out, &summary)?;
    }

    if summary.failed > 0 {
        return Err(GitallError::ContextError(format!(
            "{} of {} clones failed",
            summary.failed, summary.total
        ))
        .into());
    }
    Ok(())
}

/// Accounts to clone for. `--user` works without a configuration file by
/// synthesizing an account rooted at the destination directory.
fn clone_accounts(request: &CloneRequest) -> Result<Vec<Account>> {
    match &request.user {
        Some(user) => {
            if let Ok(config) = resolve::load_config() {
                if let Some(account) = config.account(user) {
                    return Ok(vec![account.clone()]);
                }
            }
            Ok(vec![Account {
                username: user.clone(),
                dir: request.dir.clone().unwrap_or_else(|| ".".to_string()),
                protocol: request.protocol.unwrap_or_default(),
                token: None,
                api_url: None,
                active: None,
            }])
        }
        None => {
            let config = resolve::load_config()?;
            let accounts = resolve::resolve_accounts(&config, None)?;
            Ok(accounts.into_iter().cloned().collect())
        }
    }
}
