#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
//! Core library for batch-managing many git repositories.
//!
//! The crate is built around two pieces: a bounded-concurrency task runner
//! ([`runner`]) that executes one operation per repository in parallel, and a
//! git adapter ([`git`]) whose pull path decides per repository whether an
//! operation may safely proceed, must be skipped, or failed. Around those sit
//! the configuration store ([`config`]) and the GitHub listing client
//! ([`github`]). The CLI binary in `crates/gitall` builds on top of this
//! library.

/// Account and repository configuration persisted to disk.
pub mod config;
/// Library error type and result alias.
mod error;
/// Git subprocess adapter and the pull safety classifier.
pub mod git;
/// GitHub API client for listing remote repositories.
pub mod github;
/// Bounded-concurrency task runner.
pub mod runner;
/// Result and status value types shared across operations.
mod types;

pub use error::{GitallError, Result};
pub use types::{PullOptions, RepoResult, RepoStatus, ResultStatus, StatusSummary, Summary};
