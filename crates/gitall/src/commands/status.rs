//! Show working tree state across every managed repository.

use anyhow::Result;
use libgitall::{StatusSummary, git};

use crate::commands::Context;
use crate::{render, resolve};

/// Run the status command. Clean repositories are hidden unless `all` is set.
pub fn run(
    ctx: &Context,
    user: Option<&str>,
    dir: Option<&str>,
    concurrency: usize,
    all: bool,
) -> Result<()> {
    let paths = resolve::repo_paths(dir, user)?;
    let statuses = git::statuses(&paths, concurrency);
    let summary = StatusSummary::of(&statuses);

    let mut out = ctx.stdout();
    if ctx.json {
        render::statuses_json(&mut out, &statuses, &summary)?;
        return Ok(());
    }

    for status in &statuses {
        if all || !status.is_clean() || status.error.is_some() {
            render::status_line(&mut out, status)?;
        }
    }
    if !ctx.quiet {
        render::status_summary(&mut out, &summary)?;
    }
    Ok(())
}
