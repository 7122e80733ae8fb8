//! Git subprocess adapter and the pull safety classifier.
//!
//! Every batch operation bottoms out here: `clone`, `fetch`, `pull`, and
//! `status` each act on a single repository and report a result value rather
//! than an error, so one bad repository never aborts a batch. The decision of
//! whether a pull may proceed is a pure function ([`classify_pull`]) over a
//! snapshot of the working tree, kept separate from the subprocess calls so
//! the rules are testable without a repository.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};

use crate::config::Protocol;
use crate::runner;
use crate::types::{PullOptions, RepoResult, RepoStatus, ResultStatus};

/// Message attached to stashes created around an auto-stashed pull.
const STASH_MESSAGE: &str = "gitall-auto-stash";

/// Run a git command in the given directory and return its trimmed stdout.
/// On failure the error carries the command and git's stderr.
fn run_git(repo_path: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .current_dir(repo_path)
        .args(args)
        .output()
        .with_context(|| format!("Failed to execute git command: git {}", args.join(" ")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("git {}: {}", args.join(" "), stderr.trim());
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Final path component, used as the repository's display name.
pub fn repo_name_from_path(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Name of the currently checked-out branch.
pub fn current_branch(repo_path: &Path) -> Result<String> {
    run_git(repo_path, &["rev-parse", "--abbrev-ref", "HEAD"])
}

/// The upstream tracking ref of the current branch, if one is configured.
pub fn upstream(repo_path: &Path) -> Option<String> {
    run_git(
        repo_path,
        &["rev-parse", "--abbrev-ref", "--symbolic-full-name", "@{u}"],
    )
    .ok()
    .filter(|name| !name.is_empty())
}

/// URL of the `origin` remote, if set.
pub fn remote_url(repo_path: &Path) -> Option<String> {
    run_git(repo_path, &["remote", "get-url", "origin"])
        .ok()
        .filter(|url| !url.is_empty())
}

/// Commits the current branch is ahead of and behind its upstream.
pub fn ahead_behind(repo_path: &Path) -> Result<(u32, u32)> {
    let output = run_git(
        repo_path,
        &["rev-list", "--left-right", "--count", "HEAD...@{u}"],
    )?;
    let mut parts = output.split_whitespace();
    let ahead = parts.next().unwrap_or("0").parse().unwrap_or(0);
    let behind = parts.next().unwrap_or("0").parse().unwrap_or(0);
    Ok((ahead, behind))
}

/// Count staged, unstaged, and untracked entries from `git status --porcelain`
/// output. Untracked lines (`??`) count only as untracked; for the rest, a
/// non-space X column means staged and a non-space Y column means unstaged,
/// so one line can count as both.
fn parse_porcelain(output: &str) -> (u32, u32, u32) {
    let mut staged = 0;
    let mut unstaged = 0;
    let mut untracked = 0;
    for line in output.lines() {
        let mut chars = line.chars();
        let (Some(x), Some(y)) = (chars.next(), chars.next()) else {
            continue;
        };
        if x == '?' {
            untracked += 1;
            continue;
        }
        if x != ' ' {
            staged += 1;
        }
        if y != ' ' && y != '?' {
            unstaged += 1;
        }
    }
    (staged, unstaged, untracked)
}

/// Staged, unstaged, and untracked counts for the working tree.
fn porcelain_counts(repo_path: &Path) -> Result<(u32, u32, u32)> {
    let output = run_git(repo_path, &["status", "--porcelain"])?;
    Ok(parse_porcelain(&output))
}

/// Everything [`classify_pull`] needs to know about a repository.
#[derive(Debug, Clone, Default)]
pub struct PullSnapshot {
    /// Files with staged changes.
    pub staged: u32,
    /// Files with unstaged changes.
    pub unstaged: u32,
    /// Untracked files.
    pub untracked: u32,
    /// Upstream tracking ref, if configured.
    pub upstream: Option<String>,
    /// Commits ahead of upstream. Zero when there is no upstream.
    pub ahead: u32,
}

impl PullSnapshot {
    /// Any local change, tracked or not, makes the tree dirty.
    pub fn is_dirty(&self) -> bool {
        self.staged > 0 || self.unstaged > 0 || self.untracked > 0
    }
}

/// What to do with a repository in a batch pull.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PullDecision {
    /// Pull, stashing local changes around it when `stash_first` is set.
    Proceed {
        /// Stash before pulling and pop afterwards.
        stash_first: bool,
    },
    /// Do not pull; the string explains why.
    Skip(String),
}

/// Take a snapshot of the state that drives the pull decision.
pub fn snapshot(repo_path: &Path) -> Result<PullSnapshot> {
    let (staged, unstaged, untracked) = porcelain_counts(repo_path)?;
    let upstream = upstream(repo_path);
    let ahead = if upstream.is_some() {
        ahead_behind(repo_path)?.0
    } else {
        0
    };
    Ok(PullSnapshot {
        staged,
        unstaged,
        untracked,
        upstream,
        ahead,
    })
}

/// Decide whether a pull may proceed. Rules apply in order: a dirty tree
/// skips unless stashing is enabled, a missing upstream always skips, and
/// unpushed commits skip unless rebasing is enabled.
pub fn classify_pull(snapshot: &PullSnapshot, options: &PullOptions) -> PullDecision {
    let mut stash_first = false;
    if snapshot.is_dirty() {
        if !options.stash {
            return PullDecision::Skip(
                "dirty working tree (use --stash to auto-stash)".to_string(),
            );
        }
        stash_first = true;
    }
    if snapshot.upstream.is_none() {
        return PullDecision::Skip("no upstream tracking branch".to_string());
    }
    if snapshot.ahead > 0 && !options.rebase {
        return PullDecision::Skip(format!(
            "{} unpushed commits (use --rebase to pull with rebase)",
            snapshot.ahead
        ));
    }
    PullDecision::Proceed { stash_first }
}

/// Pull one repository, honouring the safety rules. Never returns an error;
/// failures become a `Failed` result so the rest of the batch continues.
pub fn pull(repo_path: &Path, options: &PullOptions) -> RepoResult {
    let name = repo_name_from_path(repo_path);
    let result = |status, message: String| RepoResult {
        name: name.clone(),
        path: repo_path.to_path_buf(),
        status,
        message,
    };

    let snapshot = match snapshot(repo_path) {
        Ok(snapshot) => snapshot,
        Err(err) => return result(ResultStatus::Failed, err.to_string()),
    };

    let stash_first = match classify_pull(&snapshot, options) {
        PullDecision::Skip(reason) => return result(ResultStatus::Skipped, reason),
        PullDecision::Proceed { stash_first } => stash_first,
    };

    if stash_first {
        if let Err(err) = run_git(
            repo_path,
            &["stash", "push", "--include-untracked", "-m", STASH_MESSAGE],
        ) {
            return result(ResultStatus::Failed, format!("failed to stash: {err}"));
        }
    }

    let pull_args: &[&str] = if options.rebase {
        &["pull", "--rebase"]
    } else {
        &["pull"]
    };
    let pulled = run_git(repo_path, pull_args);

    // Pop the stash whether or not the pull worked, so local changes are
    // never left stranded silently. A failed pop is appended to the message
    // rather than changing the outcome.
    let mut restore_note = String::new();
    if stash_first {
        if let Err(err) = run_git(repo_path, &["stash", "pop"]) {
            restore_note = format!("; stash pop failed: {err}");
        }
    }

    match pulled {
        Err(err) => result(ResultStatus::Failed, format!("{err}{restore_note}")),
        Ok(output) if output.contains("Already up to date") => {
            result(ResultStatus::UpToDate, format!("already up to date{restore_note}"))
        }
        Ok(_) => result(ResultStatus::Success, format!("pulled{restore_note}")),
    }
}

/// Clone `url` into `dest`. An existing destination directory is a skip, not
/// an error, so re-running a batch clone is idempotent.
pub fn clone(url: &str, dest: &Path) -> RepoResult {
    let name = repo_name_from_path(dest);
    if dest.exists() {
        return RepoResult {
            name,
            path: dest.to_path_buf(),
            status: ResultStatus::Skipped,
            message: "already exists".to_string(),
        };
    }

    let parent = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if let Err(err) = fs::create_dir_all(parent) {
        return RepoResult {
            name,
            path: dest.to_path_buf(),
            status: ResultStatus::Failed,
            message: format!("creating {}: {err}", parent.display()),
        };
    }

    let dest_str = dest.to_string_lossy();
    match run_git(parent, &["clone", url, &dest_str]) {
        Ok(_) => RepoResult {
            name,
            path: dest.to_path_buf(),
            status: ResultStatus::Success,
            message: "cloned".to_string(),
        },
        Err(err) => RepoResult {
            name,
            path: dest.to_path_buf(),
            status: ResultStatus::Failed,
            message: err.to_string(),
        },
    }
}

/// Fetch all remotes for one repository, pruning stale refs.
pub fn fetch(repo_path: &Path) -> RepoResult {
    let name = repo_name_from_path(repo_path);
    match run_git(repo_path, &["fetch", "--all", "--prune"]) {
        Ok(_) => RepoResult {
            name,
            path: repo_path.to_path_buf(),
            status: ResultStatus::Success,
            message: "fetched".to_string(),
        },
        Err(err) => RepoResult {
            name,
            path: repo_path.to_path_buf(),
            status: ResultStatus::Failed,
            message: err.to_string(),
        },
    }
}

/// Gather the full status of one repository. Inspection failures land in the
/// `error` field instead of aborting.
pub fn status(repo_path: &Path) -> RepoStatus {
    let name = repo_name_from_path(repo_path);
    let mut status = RepoStatus {
        name,
        path: repo_path.to_path_buf(),
        ..RepoStatus::default()
    };

    status.branch = match current_branch(repo_path) {
        Ok(branch) => branch,
        Err(err) => {
            status.error = Some(err.to_string());
            return status;
        }
    };

    match porcelain_counts(repo_path) {
        Ok((staged, unstaged, untracked)) => {
            status.staged = staged;
            status.unstaged = unstaged;
            status.untracked = untracked;
        }
        Err(err) => {
            status.error = Some(err.to_string());
            return status;
        }
    }

    status.upstream = upstream(repo_path);
    if status.upstream.is_some() {
        if let Ok((ahead, behind)) = ahead_behind(repo_path) {
            status.ahead = ahead;
            status.behind = behind;
        }
    }
    status.remote_url = remote_url(repo_path);
    status
}

/// Gather statuses for many repositories concurrently.
pub fn statuses(paths: &[PathBuf], concurrency: usize) -> Vec<RepoStatus> {
    let ops: Vec<Box<dyn FnOnce() -> RepoStatus + Send>> = paths
        .iter()
        .cloned()
        .map(|path| {
            Box::new(move || status(&path)) as Box<dyn FnOnce() -> RepoStatus + Send>
        })
        .collect();
    runner::execute(ops, concurrency, &mut |_, _, _, _| {})
}

/// List the git repositories directly under `dir`, sorted by name.
pub fn discover_repos(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("reading directory {}", dir.display()))?;
    let mut repos = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_dir() && path.join(".git").exists() {
            repos.push(path);
        }
    }
    repos.sort();
    Ok(repos)
}

/// Like [`discover_repos`] but descending into subdirectories. Directories
/// that are themselves repositories are not searched further, and hidden
/// directories are skipped.
pub fn discover_repos_recursive(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut repos = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        let entries = fs::read_dir(&current)
            .with_context(|| format!("reading directory {}", current.display()))?;
        for entry in entries {
            let path = entry?.path();
            if !path.is_dir() {
                continue;
            }
            if repo_name_from_path(&path).starts_with('.') {
                continue;
            }
            if path.join(".git").exists() {
                repos.push(path);
            } else {
                pending.push(path);
            }
        }
    }
    repos.sort();
    Ok(repos)
}

/// Owner segment of the repository's `origin` URL, if it can be parsed.
pub fn remote_owner(repo_path: &Path) -> Option<String> {
    remote_url(repo_path).and_then(|url| owner_from_url(&url))
}

/// Extract the owner from an ssh or https remote URL.
pub fn owner_from_url(url: &str) -> Option<String> {
    let trimmed = url.trim_end_matches('/').trim_end_matches(".git");
    let path = if let Some((_, rest)) = trimmed.split_once("://") {
        // https://host/owner/name
        rest.split_once('/')?.1
    } else if let Some((_, rest)) = trimmed.split_once(':') {
        // git@host:owner/name
        rest
    } else {
        return None;
    };
    let owner = path.split('/').next()?;
    if owner.is_empty() {
        None
    } else {
        Some(owner.to_string())
    }
}

/// Protocol of the repository's `origin` URL, if it can be determined.
pub fn remote_protocol(repo_path: &Path) -> Option<Protocol> {
    let url = remote_url(repo_path)?;
    if url.starts_with("git@") || url.starts_with("ssh://") {
        Some(Protocol::Ssh)
    } else if url.starts_with("http://") || url.starts_with("https://") {
        Some(Protocol::Https)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Initialize a repository with a committed README on branch `main`.
    fn setup_test_repo() -> Result<(TempDir, PathBuf)> {
        let temp_dir = TempDir::new()?;
        let repo_path = temp_dir.path().to_path_buf();

        run_git(&repo_path, &["init", "-b", "main"])?;
        run_git(&repo_path, &["config", "user.email", "test@example.com"])?;
        run_git(&repo_path, &["config", "user.name", "Test User"])?;

        fs::write(repo_path.join("README.md"), "# Test Repo")?;
        run_git(&repo_path, &["add", "README.md"])?;
        run_git(&repo_path, &["commit", "-m", "Initial commit"])?;

        Ok((temp_dir, repo_path))
    }

    /// Create a bare origin plus two clones of it. Commits pushed from the
    /// writer leave the reader behind, which is what the pull tests need.
    fn setup_origin_pair() -> Result<(TempDir, PathBuf, PathBuf)> {
        let temp_dir = TempDir::new()?;
        let base = temp_dir.path().to_path_buf();
        let origin = base.join("origin.git");
        fs::create_dir(&origin)?;
        run_git(&origin, &["init", "--bare", "-b", "main"])?;
        let origin_str = origin.to_string_lossy().to_string();

        let writer = base.join("writer");
        run_git(&base, &["clone", &origin_str, "writer"])?;
        run_git(&writer, &["config", "user.email", "test@example.com"])?;
        run_git(&writer, &["config", "user.name", "Test User"])?;
        // Pin the unborn branch name; the empty clone may not carry it over.
        run_git(&writer, &["symbolic-ref", "HEAD", "refs/heads/main"])?;
        fs::write(writer.join("README.md"), "# Origin Repo")?;
        run_git(&writer, &["add", "README.md"])?;
        run_git(&writer, &["commit", "-m", "Initial commit"])?;
        run_git(&writer, &["push", "-u", "origin", "main"])?;

        // Cloned after the first push, so tracking is set up automatically.
        let reader = base.join("reader");
        run_git(&base, &["clone", &origin_str, "reader"])?;
        run_git(&reader, &["config", "user.email", "test@example.com"])?;
        run_git(&reader, &["config", "user.name", "Test User"])?;

        Ok((temp_dir, writer, reader))
    }

    /// Commit a new file in `repo` and push it to origin.
    fn push_commit(repo: &Path, file: &str) -> Result<()> {
        fs::write(repo.join(file), "content")?;
        run_git(repo, &["add", file])?;
        run_git(repo, &["commit", "-m", "Add file"])?;
        run_git(repo, &["push"])?;
        Ok(())
    }

    #[test]
    fn test_parse_porcelain_counts() {
        let output = " M modified.txt\nM  staged.txt\nMM both.txt\n?? untracked.txt\nA  added.txt\n";
        let (staged, unstaged, untracked) = parse_porcelain(output);
        assert_eq!(staged, 3); // staged.txt, both.txt, added.txt
        assert_eq!(unstaged, 2); // modified.txt, both.txt
        assert_eq!(untracked, 1);
    }

    #[test]
    fn test_classify_dirty_without_stash_skips() {
        let snapshot = PullSnapshot {
            unstaged: 1,
            upstream: Some("origin/main".to_string()),
            ..PullSnapshot::default()
        };
        let decision = classify_pull(&snapshot, &PullOptions::default());
        assert_eq!(
            decision,
            PullDecision::Skip("dirty working tree (use --stash to auto-stash)".to_string())
        );
    }

    #[test]
    fn test_classify_dirty_with_stash_proceeds() {
        let snapshot = PullSnapshot {
            untracked: 2,
            upstream: Some("origin/main".to_string()),
            ..PullSnapshot::default()
        };
        let options = PullOptions {
            stash: true,
            rebase: false,
        };
        assert_eq!(
            classify_pull(&snapshot, &options),
            PullDecision::Proceed { stash_first: true }
        );
    }

    #[test]
    fn test_classify_no_upstream_skips_even_with_stash() {
        let snapshot = PullSnapshot {
            staged: 1,
            upstream: None,
            ..PullSnapshot::default()
        };
        let options = PullOptions {
            stash: true,
            rebase: true,
        };
        assert_eq!(
            classify_pull(&snapshot, &options),
            PullDecision::Skip("no upstream tracking branch".to_string())
        );
    }

    #[test]
    fn test_classify_unpushed_without_rebase_skips() {
        let snapshot = PullSnapshot {
            upstream: Some("origin/main".to_string()),
            ahead: 3,
            ..PullSnapshot::default()
        };
        let decision = classify_pull(&snapshot, &PullOptions::default());
        assert_eq!(
            decision,
            PullDecision::Skip("3 unpushed commits (use --rebase to pull with rebase)".to_string())
        );
    }

    #[test]
    fn test_classify_unpushed_with_rebase_proceeds() {
        let snapshot = PullSnapshot {
            upstream: Some("origin/main".to_string()),
            ahead: 1,
            ..PullSnapshot::default()
        };
        let options = PullOptions {
            stash: false,
            rebase: true,
        };
        assert_eq!(
            classify_pull(&snapshot, &options),
            PullDecision::Proceed { stash_first: false }
        );
    }

    #[test]
    fn test_classify_clean_tracking_proceeds() {
        let snapshot = PullSnapshot {
            upstream: Some("origin/main".to_string()),
            ..PullSnapshot::default()
        };
        assert_eq!(
            classify_pull(&snapshot, &PullOptions::default()),
            PullDecision::Proceed { stash_first: false }
        );
    }

    #[test]
    fn test_pull_behind_repo_succeeds() -> Result<()> {
        let (_temp_dir, writer, reader) = setup_origin_pair()?;
        push_commit(&writer, "new.txt")?;

        let result = pull(&reader, &PullOptions::default());
        assert_eq!(result.status, ResultStatus::Success);
        assert_eq!(result.message, "pulled");
        assert!(reader.join("new.txt").exists());
        Ok(())
    }

    #[test]
    fn test_pull_current_repo_is_up_to_date() -> Result<()> {
        let (_temp_dir, _writer, reader) = setup_origin_pair()?;

        let result = pull(&reader, &PullOptions::default());
        assert_eq!(result.status, ResultStatus::UpToDate);
        assert_eq!(result.message, "already up to date");
        Ok(())
    }

    #[test]
    fn test_pull_dirty_repo_is_skipped() -> Result<()> {
        let (_temp_dir, writer, reader) = setup_origin_pair()?;
        push_commit(&writer, "new.txt")?;
        fs::write(reader.join("README.md"), "local edit")?;

        let result = pull(&reader, &PullOptions::default());
        assert_eq!(result.status, ResultStatus::Skipped);
        assert_eq!(
            result.message,
            "dirty working tree (use --stash to auto-stash)"
        );
        assert!(!reader.join("new.txt").exists());
        Ok(())
    }

    #[test]
    fn test_pull_with_stash_restores_local_changes() -> Result<()> {
        let (_temp_dir, writer, reader) = setup_origin_pair()?;
        push_commit(&writer, "new.txt")?;
        fs::write(reader.join("local.txt"), "local work")?;

        let options = PullOptions {
            stash: true,
            rebase: false,
        };
        let result = pull(&reader, &options);
        assert_eq!(result.status, ResultStatus::Success, "{}", result.message);
        // Pulled content and local changes must both be present afterwards.
        assert!(reader.join("new.txt").exists());
        assert_eq!(fs::read_to_string(reader.join("local.txt"))?, "local work");
        Ok(())
    }

    #[test]
    fn test_pull_without_upstream_is_skipped() -> Result<()> {
        let (_temp_dir, repo_path) = setup_test_repo()?;

        let result = pull(&repo_path, &PullOptions::default());
        assert_eq!(result.status, ResultStatus::Skipped);
        assert_eq!(result.message, "no upstream tracking branch");
        Ok(())
    }

    #[test]
    fn test_pull_failing_stash_reports_failed() -> Result<()> {
        let (_temp_dir, writer, reader) = setup_origin_pair()?;
        push_commit(&writer, "new.txt")?;
        fs::write(reader.join("README.md"), "local edit")?;

        // A non-empty refs/stash directory makes `git stash push` unable to
        // write the stash ref.
        let blocker = reader.join(".git").join("refs").join("stash");
        fs::create_dir_all(&blocker)?;
        fs::write(blocker.join("blocker"), "")?;

        let options = PullOptions {
            stash: true,
            rebase: false,
        };
        let result = pull(&reader, &options);
        assert_eq!(result.status, ResultStatus::Failed);
        assert!(
            result.message.starts_with("failed to stash:"),
            "unexpected message: {}",
            result.message
        );
        // Nothing was pulled and the local edit is untouched.
        assert!(!reader.join("new.txt").exists());
        assert_eq!(fs::read_to_string(reader.join("README.md"))?, "local edit");
        Ok(())
    }

    #[test]
    fn test_pull_with_missing_origin_fails() -> Result<()> {
        let (temp_dir, _writer, reader) = setup_origin_pair()?;
        fs::remove_dir_all(temp_dir.path().join("origin.git"))?;

        let result = pull(&reader, &PullOptions::default());
        assert_eq!(result.status, ResultStatus::Failed);
        assert!(
            result.message.contains("git pull"),
            "unexpected message: {}",
            result.message
        );
        Ok(())
    }

    #[test]
    fn test_pull_stash_pop_conflict_is_noted_not_fatal() -> Result<()> {
        let (_temp_dir, writer, reader) = setup_origin_pair()?;
        // Both sides change the same file, so the popped stash conflicts
        // with the pulled commit.
        fs::write(writer.join("README.md"), "remote change")?;
        run_git(&writer, &["commit", "-am", "Remote change"])?;
        run_git(&writer, &["push"])?;
        fs::write(reader.join("README.md"), "local change")?;

        let options = PullOptions {
            stash: true,
            rebase: false,
        };
        let result = pull(&reader, &options);
        // The pull itself worked; the failed pop only annotates the message.
        assert_eq!(result.status, ResultStatus::Success, "{}", result.message);
        assert!(
            result.message.starts_with("pulled; stash pop failed:"),
            "unexpected message: {}",
            result.message
        );
        // The stash entry is kept, so the local change is recoverable.
        let stashes = run_git(&reader, &["stash", "list"])?;
        assert!(stashes.contains("gitall-auto-stash"));
        Ok(())
    }

    #[test]
    fn test_pull_ahead_repo_is_skipped() -> Result<()> {
        let (_temp_dir, _writer, reader) = setup_origin_pair()?;
        fs::write(reader.join("unpushed.txt"), "content")?;
        run_git(&reader, &["add", "unpushed.txt"])?;
        run_git(&reader, &["commit", "-m", "Unpushed commit"])?;

        let result = pull(&reader, &PullOptions::default());
        assert_eq!(result.status, ResultStatus::Skipped);
        assert_eq!(
            result.message,
            "1 unpushed commits (use --rebase to pull with rebase)"
        );
        Ok(())
    }

    #[test]
    fn test_clone_local_repo() -> Result<()> {
        let (_temp_dir, repo_path) = setup_test_repo()?;
        let dest_dir = TempDir::new()?;
        let dest = dest_dir.path().join("cloned");

        let url = repo_path.to_string_lossy();
        let result = clone(&url, &dest);
        assert_eq!(result.status, ResultStatus::Success, "{}", result.message);
        assert_eq!(result.message, "cloned");
        assert!(dest.join("README.md").exists());

        // A second clone of the same destination is a skip.
        let result = clone(&url, &dest);
        assert_eq!(result.status, ResultStatus::Skipped);
        assert_eq!(result.message, "already exists");
        Ok(())
    }

    #[test]
    fn test_clone_bad_url_fails() -> Result<()> {
        let dest_dir = TempDir::new()?;
        let dest = dest_dir.path().join("missing");

        let result = clone("/nonexistent/repo.git", &dest);
        assert_eq!(result.status, ResultStatus::Failed);
        assert!(result.message.contains("git clone"));
        Ok(())
    }

    #[test]
    fn test_fetch_updates_remote_refs() -> Result<()> {
        let (_temp_dir, writer, reader) = setup_origin_pair()?;
        push_commit(&writer, "new.txt")?;

        let result = fetch(&reader);
        assert_eq!(result.status, ResultStatus::Success, "{}", result.message);
        assert_eq!(result.message, "fetched");

        // The fetch moved origin/main but left the working tree alone.
        let (_, behind) = ahead_behind(&reader)?;
        assert_eq!(behind, 1);
        assert!(!reader.join("new.txt").exists());
        Ok(())
    }

    #[test]
    fn test_status_reports_counters_and_branch() -> Result<()> {
        let (_temp_dir, writer, reader) = setup_origin_pair()?;
        push_commit(&writer, "new.txt")?;
        run_git(&reader, &["fetch"])?;
        fs::write(reader.join("README.md"), "local edit")?;
        fs::write(reader.join("untracked.txt"), "new")?;

        let status = status(&reader);
        assert!(status.error.is_none());
        assert_eq!(status.name, "reader");
        assert_eq!(status.branch, "main");
        assert_eq!(status.upstream.as_deref(), Some("origin/main"));
        assert_eq!(status.unstaged, 1);
        assert_eq!(status.untracked, 1);
        assert_eq!(status.behind, 1);
        assert!(!status.is_clean());
        Ok(())
    }

    #[test]
    fn test_status_of_non_repo_reports_error() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let status = status(temp_dir.path());
        assert!(status.error.is_some());
        Ok(())
    }

    #[test]
    fn test_statuses_gathers_concurrently_in_order() -> Result<()> {
        let (_temp_dir1, repo1) = setup_test_repo()?;
        let (_temp_dir2, repo2) = setup_test_repo()?;

        let statuses = statuses(&[repo1.clone(), repo2.clone()], 2);
        assert_eq!(statuses.len(), 2);
        assert_eq!(statuses[0].path, repo1);
        assert_eq!(statuses[1].path, repo2);
        Ok(())
    }

    #[test]
    fn test_discover_repos_finds_only_repos_sorted() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let base = temp_dir.path();
        for name in ["zebra", "alpha"] {
            let repo = base.join(name);
            fs::create_dir(&repo)?;
            run_git(&repo, &["init"])?;
        }
        fs::create_dir(base.join("plain-dir"))?;
        fs::write(base.join("file.txt"), "not a dir")?;

        let repos = discover_repos(base)?;
        assert_eq!(repos, vec![base.join("alpha"), base.join("zebra")]);
        Ok(())
    }

    #[test]
    fn test_discover_repos_recursive_stops_at_repo_roots() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let base = temp_dir.path();
        let nested = base.join("group").join("inner");
        fs::create_dir_all(&nested)?;
        run_git(&nested, &["init"])?;
        let top = base.join("top");
        fs::create_dir(&top)?;
        run_git(&top, &["init"])?;
        // A repo nested inside another repo's tree is not reported.
        fs::create_dir(top.join("vendor"))?;
        run_git(&top.join("vendor"), &["init"])?;
        fs::create_dir(base.join(".hidden"))?;

        let repos = discover_repos_recursive(base)?;
        assert_eq!(repos, vec![nested, top]);
        Ok(())
    }

    #[test]
    fn test_owner_from_url_variants() {
        assert_eq!(
            owner_from_url("git@github.com:someuser/repo.git").as_deref(),
            Some("someuser")
        );
        assert_eq!(
            owner_from_url("https://github.com/someorg/repo.git").as_deref(),
            Some("someorg")
        );
        assert_eq!(
            owner_from_url("https://github.com/someorg/repo").as_deref(),
            Some("someorg")
        );
        assert_eq!(owner_from_url("not-a-url"), None);
    }

    #[test]
    fn test_remote_protocol_from_origin() -> Result<()> {
        let (_temp_dir, repo_path) = setup_test_repo()?;
        assert_eq!(remote_protocol(&repo_path), None);

        run_git(
            &repo_path,
            &["remote", "add", "origin", "git@github.com:someuser/repo.git"],
        )?;
        assert_eq!(remote_protocol(&repo_path), Some(Protocol::Ssh));

        run_git(
            &repo_path,
            &[
                "remote",
                "set-url",
                "origin",
                "https://github.com/someuser/repo.git",
            ],
        )?;
        assert_eq!(remote_protocol(&repo_path), Some(Protocol::Https));
        Ok(())
    }
}
