//! GitHub API client for listing remote repositories.
//!
//! A thin blocking client over the repository listing endpoints, enough to
//! drive batch clones: paginated listing via the `Link` header, fork and
//! archive filtering, and clone URL selection per protocol.

use std::time::Duration;

use reqwest::blocking;
use reqwest::header::{ACCEPT, LINK, USER_AGENT};
use serde::Deserialize;

use crate::config::Protocol;
use crate::error::{GitallError, Result};

/// Base URL of the public GitHub API.
const DEFAULT_API_URL: &str = "https://api.github.com";

/// User agent sent with every request; GitHub rejects anonymous clients.
const CLIENT_USER_AGENT: &str = "gitall-cli";

/// Results requested per page, the API maximum.
const PER_PAGE: u32 = 100;

/// A repository as reported by the listing endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteRepo {
    /// Repository name.
    pub name: String,
    /// `owner/name` form.
    pub full_name: String,
    /// HTTPS clone URL.
    pub clone_url: String,
    /// SSH clone URL.
    pub ssh_url: String,
    /// Whether the repository is a fork.
    #[serde(default)]
    pub fork: bool,
    /// Whether the repository is archived.
    #[serde(default)]
    pub archived: bool,
}

/// Filters applied to a repository listing.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Exclude forks.
    pub no_forks: bool,
    /// Exclude archived repositories.
    pub no_archived: bool,
    /// Keep only names matching this glob (`*` and `?` wildcards).
    pub filter: Option<String>,
}

/// Blocking GitHub API client.
pub struct Client {
    /// Base API URL without a trailing slash.
    api_url: String,
    /// Bearer token, if the account has one configured.
    token: Option<String>,
    /// Underlying HTTP client.
    http: blocking::Client,
}

impl Client {
    /// Create a client for the given API host. `None` means api.github.com.
    pub fn new(api_url: Option<&str>, token: Option<&str>) -> Result<Self> {
        let http = blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|err| GitallError::ApiError(format!("building http client: {err}")))?;
        Ok(Self {
            api_url: api_url
                .unwrap_or(DEFAULT_API_URL)
                .trim_end_matches('/')
                .to_string(),
            token: token.map(str::to_string),
            http,
        })
    }

    /// List all repositories belonging to `owner`, following pagination and
    /// applying the filters. With a token the `/user/repos` endpoint is used
    /// so private repositories of the authenticated user are included.
    pub fn list_repos(&self, owner: &str, options: &ListOptions) -> Result<Vec<RemoteRepo>> {
        let base = if self.token.is_some() {
            format!(
                "{}/user/repos?affiliation=owner&per_page={PER_PAGE}",
                self.api_url
            )
        } else {
            format!("{}/users/{owner}/repos?per_page={PER_PAGE}", self.api_url)
        };

        let mut repos = Vec::new();
        let mut next = Some(base);
        while let Some(url) = next {
            let (page, next_url) = self.fetch_page(&url, owner)?;
            repos.extend(page);
            next = next_url;
        }

        // The authenticated endpoint can return repos of other owners the
        // user collaborates on; keep only the requested owner's.
        repos.retain(|repo| {
            repo.full_name
                .split('/')
                .next()
                .is_some_and(|repo_owner| repo_owner.eq_ignore_ascii_case(owner))
        });

        filter_repos(repos, options)
    }

    /// Fetch one page of results, returning the repos and the next page URL
    /// from the `Link` header, if any.
    fn fetch_page(&self, url: &str, owner: &str) -> Result<(Vec<RemoteRepo>, Option<String>)> {
        let mut request = self
            .http
            .get(url)
            .header(ACCEPT, "application/vnd.github.v3+json")
            .header(USER_AGENT, CLIENT_USER_AGENT);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .map_err(|err| GitallError::ApiError(format!("requesting {url}: {err}")))?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Err(GitallError::ApiError(format!(
                "user or organisation '{owner}' not found"
            )));
        }
        if status.as_u16() == 403 || status.as_u16() == 429 {
            return Err(GitallError::ApiError(
                "rate limited by the GitHub API (configure a token to raise the limit)"
                    .to_string(),
            ));
        }
        if !status.is_success() {
            return Err(GitallError::ApiError(format!(
                "unexpected status {status} from {url}"
            )));
        }

        // The Link header must be read before the body consumes the response.
        let next = response
            .headers()
            .get(LINK)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_next_page);

        let page: Vec<RemoteRepo> = response
            .json()
            .map_err(|err| GitallError::ApiError(format!("decoding response from {url}: {err}")))?;
        Ok((page, next))
    }

    /// Clone URL for a repository under the given protocol.
    pub fn clone_url(repo: &RemoteRepo, protocol: Protocol) -> String {
        match protocol {
            Protocol::Ssh => repo.ssh_url.clone(),
            Protocol::Https => repo.clone_url.clone(),
        }
    }
}

/// Extract the `rel="next"` URL from a `Link` header value.
fn parse_next_page(link_header: &str) -> Option<String> {
    for part in link_header.split(',') {
        let part = part.trim();
        let Some((url_part, rel_part)) = part.split_once(';') else {
            continue;
        };
        if rel_part.trim() != "rel=\"next\"" {
            continue;
        }
        let url = url_part
            .trim()
            .strip_prefix('<')?
            .strip_suffix('>')?
            .to_string();
        return Some(url);
    }
    None
}

/// Apply fork, archive, and name-glob filters to a listing.
fn filter_repos(repos: Vec<RemoteRepo>, options: &ListOptions) -> Result<Vec<RemoteRepo>> {
    let pattern = match &options.filter {
        Some(glob) => {
            let regex = regex::Regex::new(&glob_to_regex(glob)).map_err(|err| {
                GitallError::ApiError(format!("invalid filter '{glob}': {err}"))
            })?;
            Some(regex)
        }
        None => None,
    };

    Ok(repos
        .into_iter()
        .filter(|repo| !(options.no_forks && repo.fork))
        .filter(|repo| !(options.no_archived && repo.archived))
        .filter(|repo| {
            pattern
                .as_ref()
                .is_none_or(|pattern| pattern.is_match(&repo.name))
        })
        .collect())
}

/// Translate a shell-style glob into an anchored regular expression.
/// `*` matches any run of characters and `?` any single character.
fn glob_to_regex(glob: &str) -> String {
    let mut regex = String::with_capacity(glob.len() + 2);
    regex.push('^');
    for ch in glob.chars() {
        match ch {
            '*' => regex.push_str(".*"),
            '?' => regex.push('.'),
            other => regex.push_str(&regex::escape(&other.to_string())),
        }
    }
    regex.push('$');
    regex
}
