use clap::{ArgGroup, Parser, Subcommand};
use libgitall::config::Protocol;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(group(
    ArgGroup::new("color_mode")
        .args(["color", "no_color"])
))]
#[command(group(
    ArgGroup::new("output_mode")
        .args(["json", "quiet"])
))]
/// Top-level CLI options for gitall.
pub struct Cli {
    /// Enable colored output
    #[arg(long, global = true)]
    pub color: bool,

    /// Disable colored output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Suppress progress and informational output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Emit results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    /// The primary command to execute.
    pub command: Commands,
}

#[derive(Subcommand)]
/// CLI subcommands supported by gitall.
pub enum Commands {
    /// Clone missing repositories for the configured accounts
    Clone {
        /// Clone repositories of this user instead of the configured accounts
        #[arg(long, value_name = "USERNAME")]
        user: Option<String>,

        /// Destination directory (defaults to each account's dir)
        #[arg(long, value_name = "DIR")]
        dir: Option<String>,

        /// Clone URL protocol
        #[arg(long, value_name = "PROTOCOL")]
        protocol: Option<Protocol>,

        /// Maximum clones in flight
        #[arg(short = 'j', long, default_value_t = 4, value_name = "N")]
        concurrency: usize,

        /// Show what would be cloned without cloning
        #[arg(long = "dry-run")]
        dry_run: bool,

        /// Exclude forks
        #[arg(long = "no-forks")]
        no_forks: bool,

        /// Exclude archived repositories
        #[arg(long = "no-archived")]
        no_archived: bool,

        /// Keep only repository names matching this glob
        #[arg(long, value_name = "GLOB")]
        filter: Option<String>,
    },

    /// Pull every managed repository that is safe to pull
    Pull {
        /// Limit to this configured account
        #[arg(long, value_name = "USERNAME")]
        user: Option<String>,

        /// Pull repositories under this directory instead of the configuration
        #[arg(long, value_name = "DIR")]
        dir: Option<String>,

        /// Maximum pulls in flight
        #[arg(short = 'j', long, default_value_t = 4, value_name = "N")]
        concurrency: usize,

        /// Auto-stash local changes around the pull
        #[arg(long)]
        stash: bool,

        /// Pull with --rebase, allowing unpushed commits
        #[arg(long)]
        rebase: bool,

        /// Only repositories whose origin belongs to the account owner
        #[arg(long = "owned-only", conflicts_with = "owner")]
        owned_only: bool,

        /// Only repositories whose origin belongs to this owner
        #[arg(long, value_name = "OWNER")]
        owner: Option<String>,
    },

    /// Fetch all remotes for every managed repository
    Fetch {
        /// Limit to this configured account
        #[arg(long, value_name = "USERNAME")]
        user: Option<String>,

        /// Fetch repositories under this directory instead of the configuration
        #[arg(long, value_name = "DIR")]
        dir: Option<String>,

        /// Maximum fetches in flight
        #[arg(short = 'j', long, default_value_t = 4, value_name = "N")]
        concurrency: usize,
    },

    /// Show working tree state across every managed repository
    Status {
        /// Limit to this configured account
        #[arg(long, value_name = "USERNAME")]
        user: Option<String>,

        /// Inspect repositories under this directory instead of the configuration
        #[arg(long, value_name = "DIR")]
        dir: Option<String>,

        /// Maximum inspections in flight
        #[arg(short = 'j', long, default_value_t = 8, value_name = "N")]
        concurrency: usize,

        /// Include clean repositories in the output
        #[arg(long)]
        all: bool,
    },

    /// List managed repositories with branch and remote
    #[command(alias = "ls")]
    List {
        /// Limit to this configured account
        #[arg(long, value_name = "USERNAME")]
        user: Option<String>,

        /// List repositories under this directory instead of the configuration
        #[arg(long, value_name = "DIR")]
        dir: Option<String>,

        /// Maximum inspections in flight
        #[arg(short = 'j', long, default_value_t = 8, value_name = "N")]
        concurrency: usize,
    },

    /// Inspect or modify the configuration
    Config {
        #[command(subcommand)]
        /// Configuration operation to run.
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
/// Subcommands of `gitall config`.
pub enum ConfigCommands {
    /// Create a starter configuration for one account
    Init {
        /// GitHub username of the first account
        username: String,
    },

    /// Print the configuration
    Show,

    /// Print the configuration file path
    Path,

    /// Add an account
    AddAccount {
        /// GitHub username or organisation name
        username: String,

        /// Directory under which the account's repositories live
        #[arg(long, value_name = "DIR")]
        dir: String,

        /// Clone URL protocol
        #[arg(long, default_value_t = Protocol::Ssh, value_name = "PROTOCOL")]
        protocol: Protocol,

        /// API token for private repositories
        #[arg(long, value_name = "TOKEN")]
        token: Option<String>,
    },

    /// Remove an account
    RemoveAccount {
        /// Username of the account to remove
        username: String,
    },

    /// Scan a directory tree and pin the repositories found there
    Discover {
        /// Directory to scan recursively
        #[arg(long, value_name = "DIR")]
        dir: String,

        /// Show what would be added without saving
        #[arg(long = "dry-run")]
        dry_run: bool,
    },
}
