//! List managed repositories with branch, state, and remote.

use anyhow::Result;
use libgitall::{StatusSummary, git};

use crate::commands::Context;
use crate::{render, resolve};

/// Run the list command.
pub fn run(
    ctx: &Context,
    user: Option<&str>,
    dir: Option<&str>,
    concurrency: usize,
) -> Result<()> {
    let paths = resolve::repo_paths(dir, user)?;
    let statuses = git::statuses(&paths, concurrency);

    let mut out = ctx.stdout();
    if ctx.json {
        let summary = StatusSummary::of(&statuses);
        render::statuses_json(&mut out, &statuses, &summary)?;
        return Ok(());
    }

    for status in &statuses {
        render::list_line(&mut out, status)?;
    }
    Ok(())
}
