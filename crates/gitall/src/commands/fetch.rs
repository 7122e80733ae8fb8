//! Fetch all remotes for every managed repository.

use anyhow::Result;
use libgitall::runner::{self, Task};
use libgitall::{GitallError, Summary, git};

use crate::commands::Context;
use crate::{render, resolve};

/// Run the fetch command.
pub fn run(
    ctx: &Context,
    user: Option<&str>,
    dir: Option<&str>,
    concurrency: usize,
) -> Result<()> {
    let paths = resolve::repo_paths(dir, user)?;

    let tasks: Vec<Task> = paths
        .into_iter()
        .map(|path| Task::new(git::repo_name_from_path(&path), move || git::fetch(&path)))
        .collect();

    let mut out = ctx.stdout();
    let show_progress = !ctx.quiet && !ctx.json;
    let results = runner::run_with_progress(tasks, concurrency, |completed, total, name, result| {
        if show_progress {
            if let Err(err) = render::progress(&mut out, completed, total, name, result) {
                eprintln!("writing progress: {err}");
            }
        }
    });

    let summary = Summary::of("fetch", &results);
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
            "{} of {} fetches failed",
            summary.failed, summary.total
        ))
        .into());
    }
    Ok(())
}
