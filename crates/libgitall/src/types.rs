use std::fmt;
use std::path::PathBuf;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// Outcome class of a single per-repository operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResultStatus {
    /// The operation ran and changed something.
    Success,
    /// The operation was not attempted; the message says why.
    Skipped,
    /// The operation ran and failed.
    Failed,
    /// The operation ran but there was nothing to do.
    UpToDate,
}

impl fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Success => "success",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
            Self::UpToDate => "up-to-date",
        };
        write!(f, "{name}")
    }
}

/// Result of one operation against one repository.
#[derive(Debug, Clone, Serialize)]
pub struct RepoResult {
    /// Repository name (final path component).
    pub name: String,
    /// Local working tree path.
    pub path: PathBuf,
    /// Outcome class.
    pub status: ResultStatus,
    /// Human-readable detail: what happened, or why it was skipped/failed.
    pub message: String,
}

/// Working tree state of one repository, as gathered by `git::status`.
#[derive(Debug, Clone, Default)]
pub struct RepoStatus {
    /// Repository name (final path component).
    pub name: String,
    /// Local working tree path.
    pub path: PathBuf,
    /// Checked-out branch, if it could be determined.
    pub branch: String,
    /// Upstream tracking ref, if one is configured.
    pub upstream: Option<String>,
    /// Commits ahead of upstream.
    pub ahead: u32,
    /// Commits behind upstream.
    pub behind: u32,
    /// Files with staged changes.
    pub staged: u32,
    /// Files with unstaged changes.
    pub unstaged: u32,
    /// Untracked files.
    pub untracked: u32,
    /// URL of the `origin` remote, if set.
    pub remote_url: Option<String>,
    /// Set when the path is not a usable repository.
    pub error: Option<String>,
}

impl RepoStatus {
    /// A repository is clean when nothing is staged, modified, untracked,
    /// or out of sync with its upstream.
    pub fn is_clean(&self) -> bool {
        self.staged == 0
            && self.unstaged == 0
            && self.untracked == 0
            && self.ahead == 0
            && self.behind == 0
    }
}

/// Hand-written so the derived `clean` flag appears in JSON output next to
/// the counters it is computed from. `None` fields are omitted.
impl Serialize for RepoStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let optional = [
            self.upstream.is_some(),
            self.remote_url.is_some(),
            self.error.is_some(),
        ]
        .iter()
        .filter(|present| **present)
        .count();
        let mut state = serializer.serialize_struct("RepoStatus", 9 + optional)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("path", &self.path)?;
        state.serialize_field("branch", &self.branch)?;
        if let Some(upstream) = &self.upstream {
            state.serialize_field("upstream", upstream)?;
        }
        state.serialize_field("ahead", &self.ahead)?;
        state.serialize_field("behind", &self.behind)?;
        state.serialize_field("staged", &self.staged)?;
        state.serialize_field("unstaged", &self.unstaged)?;
        state.serialize_field("untracked", &self.untracked)?;
        state.serialize_field("clean", &self.is_clean())?;
        if let Some(remote_url) = &self.remote_url {
            state.serialize_field("remote_url", remote_url)?;
        }
        if let Some(error) = &self.error {
            state.serialize_field("error", error)?;
        }
        state.end()
    }
}

/// Safety switches for a batch pull.
#[derive(Debug, Clone, Copy, Default)]
pub struct PullOptions {
    /// Auto-stash local changes around the pull instead of skipping dirty
    /// repositories.
    pub stash: bool,
    /// Pull with `--rebase`, allowing repositories with unpushed commits.
    pub rebase: bool,
}

/// Aggregate counts over a batch of results.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    /// Verb describing the batch ("pull", "clone", ...).
    pub action: String,
    /// Number of repositories processed.
    pub total: usize,
    /// Results with status `Success`.
    pub success: usize,
    /// Results with status `Skipped`.
    pub skipped: usize,
    /// Results with status `Failed`.
    pub failed: usize,
    /// Results with status `UpToDate`.
    pub up_to_date: usize,
}

impl Summary {
    /// Tally a result slice.
    pub fn of(action: &str, results: &[RepoResult]) -> Self {
        let mut summary = Self {
            action: action.to_string(),
            total: results.len(),
            success: 0,
            skipped: 0,
            failed: 0,
            up_to_date: 0,
        };
        for result in results {
            match result.status {
                ResultStatus::Success => summary.success += 1,
                ResultStatus::Skipped => summary.skipped += 1,
                ResultStatus::Failed => summary.failed += 1,
                ResultStatus::UpToDate => summary.up_to_date += 1,
            }
        }
        summary
    }
}

/// Aggregate counts over a batch of status reports.
#[derive(Debug, Clone, Serialize)]
pub struct StatusSummary {
    /// Number of repositories inspected.
    pub total: usize,
    /// Repositories with nothing pending.
    pub clean: usize,
    /// Repositories with local changes or upstream drift.
    pub dirty: usize,
    /// Paths that could not be inspected.
    pub errored: usize,
}

impl StatusSummary {
    /// Tally a status slice.
    pub fn of(statuses: &[RepoStatus]) -> Self {
        let mut summary = Self {
            total: statuses.len(),
            clean: 0,
            dirty: 0,
            errored: 0,
        };
        for status in statuses {
            if status.error.is_some() {
                summary.errored += 1;
            } else if status.is_clean() {
                summary.clean += 1;
            } else {
                summary.dirty += 1;
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a result with the given status for tallying tests.
    fn result(status: ResultStatus) -> RepoResult {
        RepoResult {
            name: "repo".to_string(),
            path: PathBuf::from("/tmp/repo"),
            status,
            message: String::new(),
        }
    }

    #[test]
    fn summary_tallies_by_status() {
        let results = vec![
            result(ResultStatus::Success),
            result(ResultStatus::Success),
            result(ResultStatus::Skipped),
            result(ResultStatus::Failed),
            result(ResultStatus::UpToDate),
        ];
        let summary = Summary::of("pull", &results);
        assert_eq!(summary.total, 5);
        assert_eq!(summary.success, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.up_to_date, 1);
    }

    #[test]
    fn status_serializes_kebab_case() {
        let json = serde_json::to_string(&ResultStatus::UpToDate).unwrap();
        assert_eq!(json, "\"up-to-date\"");
        assert_eq!(ResultStatus::UpToDate.to_string(), "up-to-date");
    }

    #[test]
    fn clean_requires_all_counters_zero() {
        let mut status = RepoStatus::default();
        assert!(status.is_clean());
        status.behind = 1;
        assert!(!status.is_clean());
        status.behind = 0;
        status.untracked = 1;
        assert!(!status.is_clean());
    }

    #[test]
    fn repo_status_json_carries_clean_flag() {
        let clean = RepoStatus {
            name: "tool".to_string(),
            branch: "main".to_string(),
            ..RepoStatus::default()
        };
        let doc: serde_json::Value = serde_json::to_value(&clean).unwrap();
        assert_eq!(doc["clean"], true);
        assert!(doc.get("upstream").is_none());
        assert!(doc.get("error").is_none());

        let dirty = RepoStatus {
            name: "tool".to_string(),
            upstream: Some("origin/main".to_string()),
            behind: 2,
            ..RepoStatus::default()
        };
        let doc: serde_json::Value = serde_json::to_value(&dirty).unwrap();
        assert_eq!(doc["clean"], false);
        assert_eq!(doc["upstream"], "origin/main");
        assert_eq!(doc["behind"], 2);
    }

    #[test]
    fn status_summary_counts_errors_separately() {
        let clean = RepoStatus::default();
        let dirty = RepoStatus {
            unstaged: 2,
            ..RepoStatus::default()
        };
        let errored = RepoStatus {
            error: Some("not a git repo".to_string()),
            ..RepoStatus::default()
        };
        let summary = StatusSummary::of(&[clean, dirty, errored]);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.clean, 1);
        assert_eq!(summary.dirty, 1);
        assert_eq!(summary.errored, 1);
    }
}
