//! Account and repository configuration persisted to disk.
//!
//! Configuration lives in a TOML file at `~/.gitall/config.toml` and names
//! the GitHub accounts whose repositories are managed, plus any individually
//! pinned repositories. Paths in the file may use `~/` or `$HOME` prefixes;
//! they are expanded on load.

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::result::Result as StdResult;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GitallError, Result};

/// Clone URL scheme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// `git@host:owner/name.git` URLs.
    #[default]
    Ssh,
    /// `https://host/owner/name.git` URLs.
    Https,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ssh => write!(f, "ssh"),
            Self::Https => write!(f, "https"),
        }
    }
}

impl FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> StdResult<Self, Self::Err> {
        match s {
            "ssh" => Ok(Self::Ssh),
            "https" => Ok(Self::Https),
            other => Err(format!("unknown protocol '{other}' (expected ssh or https)")),
        }
    }
}

/// One GitHub account whose repositories gitall manages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// GitHub username or organisation name.
    pub username: String,
    /// Directory under which this account's repositories live.
    pub dir: String,
    /// Clone URL scheme for this account.
    #[serde(default)]
    pub protocol: Protocol,
    /// API token for private repositories and higher rate limits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Base API URL override, for GitHub Enterprise hosts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    /// Whether batch commands include this account. Unset means active.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl Account {
    /// Accounts are active unless explicitly deactivated.
    pub fn is_active(&self) -> bool {
        self.active.unwrap_or(true)
    }
}

/// One individually pinned repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoEntry {
    /// Repository name.
    pub name: String,
    /// Owning user or organisation.
    pub owner: String,
    /// Local working tree path.
    pub dir: String,
    /// Clone URL scheme for this repository.
    #[serde(default)]
    pub protocol: Protocol,
}

/// The whole configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Managed accounts.
    #[serde(default)]
    pub accounts: Vec<Account>,
    /// Individually pinned repositories.
    #[serde(default)]
    pub repos: Vec<RepoEntry>,
}

impl Config {
    /// Load and validate the configuration at `path`, expanding directories.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|err| {
            GitallError::ConfigError(format!("reading {}: {err}", path.display()))
        })?;
        let mut config: Self = toml::from_str(&contents).map_err(|err| {
            GitallError::ConfigError(format!("parsing {}: {err}", path.display()))
        })?;
        for account in &mut config.accounts {
            account.dir = expand_path(&account.dir);
        }
        for repo in &mut config.repos {
            repo.dir = expand_path(&repo.dir);
        }
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| {
                GitallError::ConfigError(format!("creating {}: {err}", parent.display()))
            })?;
        }
        let encoded = toml::to_string_pretty(self)
            .map_err(|err| GitallError::ConfigError(format!("encoding config: {err}")))?;
        fs::write(path, encoded).map_err(|err| {
            GitallError::ConfigError(format!("writing {}: {err}", path.display()))
        })?;
        Ok(())
    }

    /// Check structural invariants: something to manage, non-empty names
    /// and directories, no duplicate account usernames.
    pub fn validate(&self) -> Result<()> {
        if self.accounts.is_empty() && self.repos.is_empty() {
            return Err(GitallError::ConfigError(
                "no accounts or repos configured".to_string(),
            ));
        }
        for account in &self.accounts {
            if account.username.is_empty() {
                return Err(GitallError::ConfigError(
                    "account with empty username".to_string(),
                ));
            }
            if account.dir.is_empty() {
                return Err(GitallError::ConfigError(format!(
                    "account '{}' has no dir",
                    account.username
                )));
            }
        }
        for (i, account) in self.accounts.iter().enumerate() {
            for other in &self.accounts[i + 1..] {
                if account.username.eq_ignore_ascii_case(&other.username) {
                    return Err(GitallError::ConfigError(format!(
                        "duplicate account '{}'",
                        account.username
                    )));
                }
            }
        }
        for repo in &self.repos {
            if repo.name.is_empty() || repo.owner.is_empty() || repo.dir.is_empty() {
                return Err(GitallError::ConfigError(
                    "repo entry missing name, owner, or dir".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Accounts that batch commands should include.
    pub fn active_accounts(&self) -> Vec<&Account> {
        self.accounts
            .iter()
            .filter(|account| account.is_active())
            .collect()
    }

    /// Look up an account by username, case-insensitively.
    pub fn account(&self, username: &str) -> Option<&Account> {
        self.accounts
            .iter()
            .find(|account| account.username.eq_ignore_ascii_case(username))
    }

    /// Add an account, rejecting duplicates.
    pub fn add_account(&mut self, account: Account) -> Result<()> {
        if self.account(&account.username).is_some() {
            return Err(GitallError::ConfigError(format!(
                "account '{}' already exists",
                account.username
            )));
        }
        self.accounts.push(account);
        Ok(())
    }

    /// Remove an account by username, case-insensitively.
    pub fn remove_account(&mut self, username: &str) -> Result<()> {
        let before = self.accounts.len();
        self.accounts
            .retain(|account| !account.username.eq_ignore_ascii_case(username));
        if self.accounts.len() == before {
            return Err(GitallError::ConfigError(format!(
                "no such account '{username}'"
            )));
        }
        Ok(())
    }

    /// Add a pinned repository, rejecting a duplicate directory.
    pub fn add_repo(&mut self, repo: RepoEntry) -> Result<()> {
        if self.repos.iter().any(|existing| existing.dir == repo.dir) {
            return Err(GitallError::ConfigError(format!(
                "a repo is already configured at '{}'",
                repo.dir
            )));
        }
        self.repos.push(repo);
        Ok(())
    }

    /// Working tree paths of all pinned repositories, optionally filtered
    /// to one owner.
    pub fn repo_dirs(&self, owner: Option<&str>) -> Vec<PathBuf> {
        self.repos
            .iter()
            .filter(|repo| owner.is_none_or(|owner| repo.owner.eq_ignore_ascii_case(owner)))
            .map(|repo| PathBuf::from(&repo.dir))
            .collect()
    }

    /// Whether any repositories are pinned.
    pub fn has_repos(&self) -> bool {
        !self.repos.is_empty()
    }
}

/// Default configuration file location: `$HOME/.gitall/config.toml`.
pub fn default_path() -> Result<PathBuf> {
    let home =
        env::var("HOME").map_err(|_| GitallError::ConfigError("HOME is not set".to_string()))?;
    Ok(PathBuf::from(home).join(".gitall").join("config.toml"))
}

/// A starter configuration with one account.
pub fn default_config(username: &str) -> Config {
    Config {
        accounts: vec![Account {
            username: username.to_string(),
            dir: format!("~/src/{username}"),
            protocol: Protocol::default(),
            token: None,
            api_url: None,
            active: None,
        }],
        repos: Vec::new(),
    }
}

/// Expand a leading `~/` or `$HOME` against the current home directory.
pub fn expand_path(path: &str) -> String {
    match env::var("HOME") {
        Ok(home) => expand_with_home(path, &home),
        Err(_) => path.to_string(),
    }
}

/// Expansion core, split out so tests can supply the home directory.
fn expand_with_home(path: &str, home: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        return format!("{home}/{rest}");
    }
    if path == "~" {
        return home.to_string();
    }
    if let Some(rest) = path.strip_prefix("$HOME") {
        return format!("{home}{rest}");
    }
    path.to_string()
}
