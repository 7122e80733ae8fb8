//! Colorized and JSON rendering of results and statuses.
//!
//! All functions here are stateless: they take a `WriteColor` target and a
//! value, write, and reset. Color selection is keyed on the result status so
//! every command renders consistently.

use anyhow::Result;
use libgitall::{RepoResult, RepoStatus, ResultStatus, StatusSummary, Summary};
use termcolor::{Color, ColorSpec, WriteColor};

/// Color for a result status.
fn status_color(status: ResultStatus) -> Color {
    match status {
        ResultStatus::Success => Color::Green,
        ResultStatus::Skipped => Color::Yellow,
        ResultStatus::Failed => Color::Red,
        ResultStatus::UpToDate => Color::Cyan,
    }
}

/// Write text in the given color, then reset.
fn colored(out: &mut dyn WriteColor, color: Color, text: &str) -> Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(color)))?;
    write!(out, "{text}")?;
    out.reset()?;
    Ok(())
}

/// Write dimmed text, then reset.
fn dimmed(out: &mut dyn WriteColor, text: &str) -> Result<()> {
    out.set_color(ColorSpec::new().set_dimmed(true))?;
    write!(out, "{text}")?;
    out.reset()?;
    Ok(())
}

/// One progress line: `[k/n] name message`, message colored by status.
/// The name is the task's, as reported by the runner.
pub fn progress(
    out: &mut dyn WriteColor,
    completed: usize,
    total: usize,
    name: &str,
    result: &RepoResult,
) -> Result<()> {
    dimmed(out, &format!("[{completed}/{total}] "))?;
    write!(out, "{name} ")?;
    colored(out, status_color(result.status), &result.message)?;
    writeln!(out)?;
    Ok(())
}

/// Batch summary line: per-status counts, zeroes elided.
pub fn summary(out: &mut dyn WriteColor, summary: &Summary) -> Result<()> {
    write!(out, "{}: {} repos", summary.action, summary.total)?;
    let parts: [(usize, ResultStatus, &str); 4] = [
        (summary.success, ResultStatus::Success, "succeeded"),
        (summary.up_to_date, ResultStatus::UpToDate, "up to date"),
        (summary.skipped, ResultStatus::Skipped, "skipped"),
        (summary.failed, ResultStatus::Failed, "failed"),
    ];
    for (count, status, label) in parts {
        if count > 0 {
            write!(out, ", ")?;
            colored(out, status_color(status), &format!("{count} {label}"))?;
        }
    }
    writeln!(out)?;
    Ok(())
}

/// The failed results, one line each, for a non-quiet recap after a batch.
pub fn failures(out: &mut dyn WriteColor, results: &[RepoResult]) -> Result<()> {
    for result in results {
        if result.status == ResultStatus::Failed {
            colored(out, Color::Red, &result.name)?;
            writeln!(out, ": {}", result.message)?;
        }
    }
    Ok(())
}

/// One status line: name, branch, upstream drift, and change counters.
pub fn status_line(out: &mut dyn WriteColor, status: &RepoStatus) -> Result<()> {
    if let Some(error) = &status.error {
        colored(out, Color::Red, &status.name)?;
        writeln!(out, " {error}")?;
        return Ok(());
    }

    let color = if status.is_clean() {
        Color::Green
    } else {
        Color::Yellow
    };
    colored(out, color, &status.name)?;
    write!(out, " [{}]", status.branch)?;
    if status.ahead > 0 {
        colored(out, Color::Yellow, &format!(" ↑{}", status.ahead))?;
    }
    if status.behind > 0 {
        colored(out, Color::Yellow, &format!(" ↓{}", status.behind))?;
    }
    if status.staged > 0 {
        write!(out, " staged:{}", status.staged)?;
    }
    if status.unstaged > 0 {
        write!(out, " unstaged:{}", status.unstaged)?;
    }
    if status.untracked > 0 {
        write!(out, " untracked:{}", status.untracked)?;
    }
    if status.upstream.is_none() {
        dimmed(out, " (no upstream)")?;
    }
    writeln!(out)?;
    Ok(())
}

/// One listing line: name, branch, clean/dirty marker, remote URL.
pub fn list_line(out: &mut dyn WriteColor, status: &RepoStatus) -> Result<()> {
    if let Some(error) = &status.error {
        colored(out, Color::Red, &status.name)?;
        writeln!(out, " {error}")?;
        return Ok(());
    }

    write!(out, "{} ", status.name)?;
    dimmed(out, &format!("[{}]", status.branch))?;
    if status.is_clean() {
        colored(out, Color::Green, " clean")?;
    } else {
        colored(out, Color::Yellow, " dirty")?;
    }
    if let Some(remote) = &status.remote_url {
        dimmed(out, &format!(" {remote}"))?;
    }
    writeln!(out)?;
    Ok(())
}

/// Status batch summary: clean/dirty/errored counts.
pub fn status_summary(out: &mut dyn WriteColor, summary: &StatusSummary) -> Result<()> {
    write!(out, "{} repos: ", summary.total)?;
    colored(out, Color::Green, &format!("{} clean", summary.clean))?;
    write!(out, ", ")?;
    colored(out, Color::Yellow, &format!("{} dirty", summary.dirty))?;
    if summary.errored > 0 {
        write!(out, ", ")?;
        colored(out, Color::Red, &format!("{} errored", summary.errored))?;
    }
    writeln!(out)?;
    Ok(())
}

/// A dry-run line for an operation that was not performed.
pub fn dry_run(out: &mut dyn WriteColor, action: &str, detail: &str) -> Result<()> {
    dimmed(out, "would ")?;
    write!(out, "{action} ")?;
    writeln!(out, "{detail}")?;
    Ok(())
}

/// An informational line.
pub fn info(out: &mut dyn WriteColor, message: &str) -> Result<()> {
    writeln!(out, "{message}")?;
    Ok(())
}

/// An error line in red.
pub fn error_line(out: &mut dyn WriteColor, message: &str) -> Result<()> {
    colored(out, Color::Red, "error: ")?;
    writeln!(out, "{message}")?;
    Ok(())
}

/// Results plus summary as a JSON document.
pub fn results_json(out: &mut dyn WriteColor, results: &[RepoResult], summary: &Summary) -> Result<()> {
    let doc = serde_json::json!({
        "results": results,
        "summary": summary,
    });
    writeln!(out, "{}", serde_json::to_string_pretty(&doc)?)?;
    Ok(())
}

/// Statuses plus summary as a JSON document.
pub fn statuses_json(
    out: &mut dyn WriteColor,
    statuses: &[RepoStatus],
    summary: &StatusSummary,
) -> Result<()> {
    let doc = serde_json::json!({
        "repos": statuses,
        "summary": summary,
    });
    writeln!(out, "{}", serde_json::to_string_pretty(&doc)?)?;
    Ok(())
}
