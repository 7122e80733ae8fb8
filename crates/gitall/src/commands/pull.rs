//! Pull every managed repository that is safe to pull.

use anyhow::Result;
use libgitall::runner::{self, Task};
use libgitall::{GitallError, PullOptions, Summary, git};

use crate::commands::Context;
use crate::{render, resolve};

/// Parameters for the pull command.
pub struct PullRequest {
    /// Limit to this configured account.
    pub user: Option<String>,
    /// Operate on this directory instead of the configuration.
    pub dir: Option<String>,
    /// Maximum pulls in flight.
    pub concurrency: usize,
    /// Safety switches passed through to each pull.
    pub options: PullOptions,
    /// Restrict to repositories owned by the selected accounts.
    pub owned_only: bool,
    /// Restrict to repositories owned by this owner.
    pub owner: Option<String>,
}

/// Run the pull command.
pub fn run(ctx: &Context, request: PullRequest) -> Result<()> {
    let mut paths = resolve::repo_paths(request.dir.as_deref(), request.user.as_deref())?;

    if let Some(owner) = &request.owner {
        paths = resolve::filter_by_owner(paths, owner);
    } else if request.owned_only {
        let config = resolve::load_config()?;
        let owners: Vec<String> = resolve::resolve_accounts(&config, request.user.as_deref())?
            .iter()
            .map(|account| account.username.clone())
            .collect();
        paths.retain(|path| {
            git::remote_owner(path)
                .is_some_and(|owner| owners.iter().any(|o| o.eq_ignore_ascii_case(&owner)))
        });
    }
    anyhow::ensure!(!paths.is_empty(), "no repositories matched the owner filter");

    let options = request.options;
    let tasks: Vec<Task> = paths
        .into_iter()
        .map(|path| {
            Task::new(git::repo_name_from_path(&path), move || {
                git::pull(&path, &options)
            })
        })
        .collect();

    let mut out = ctx.stdout();
    let show_progress = !ctx.quiet && !ctx.json;
    let results =
        runner::run_with_progress(tasks, request.concurrency, |completed, total, name, result| {
            if show_progress {
                if let Err(err) = render::progress(&mut out, completed, total, name, result) {
                    eprintln!("writing progress: {err}");
                }
            }
        });

    let summary = Summary::of("pull", &results);
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
            "{} of {} pulls failed",
            summary.failed, summary.total
        ))
        .into());
    }
    Ok(())
}
