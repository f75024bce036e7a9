//! Repository identifiers and git remote parsing.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use git2::Repository;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ContribError;

#[allow(clippy::unwrap_used)] // Compile-time constant regex pattern
static GITHUB_REMOTE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"github\.com[:/]([^/]+)/(.+)$").unwrap());

/// An `owner/repo` pair identifying a GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoSlug {
    /// User or organization owning the repository.
    pub owner: String,
    /// Repository name.
    pub repo: String,
}

impl RepoSlug {
    /// Creates a slug.
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

impl FromStr for RepoSlug {
    type Err = ContribError;

    /// Accepts `owner/repo` or any GitHub remote URL.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.contains("github.com") {
            return parse_git_url(s);
        }
        match s.split_once('/') {
            Some((owner, repo)) if is_segment(owner) && is_segment(repo) => Ok(Self::new(owner, repo)),
            _ => Err(ContribError::InvalidRemoteUrl(s.to_string())),
        }
    }
}

fn is_segment(part: &str) -> bool {
    !part.is_empty() && !part.contains('/') && !part.chars().any(char::is_whitespace)
}

/// Parses a GitHub remote URL (HTTPS or SSH) into its owner and repository.
///
/// A trailing `.git` is dropped.
pub fn parse_git_url(url: &str) -> Result<RepoSlug, ContribError> {
    let trimmed = url.trim();
    let captures = GITHUB_REMOTE_PATTERN
        .captures(trimmed)
        .ok_or_else(|| ContribError::InvalidRemoteUrl(trimmed.to_string()))?;

    let owner = &captures[1];
    let repo = captures[2].trim_end_matches('/');
    let repo = repo.strip_suffix(".git").unwrap_or(repo);
    if repo.is_empty() {
        return Err(ContribError::InvalidRemoteUrl(trimmed.to_string()));
    }

    Ok(RepoSlug::new(owner, repo))
}

/// Reads `remote.origin.url` of the repository containing the working directory.
pub fn current_repo_info() -> Result<RepoSlug> {
    repo_info_at(".")
}

/// Reads `remote.origin.url` of the repository containing `path`.
pub fn repo_info_at<P: AsRef<Path>>(path: P) -> Result<RepoSlug> {
    let path = path.as_ref();
    let repo = Repository::discover(path)
        .with_context(|| format!("Not in a git repository: {}", path.display()))?;
    let remote = repo
        .find_remote("origin")
        .context("Repository has no 'origin' remote")?;
    let url = remote
        .url()
        .context("Remote 'origin' URL is not valid UTF-8")?;
    Ok(parse_git_url(url)?)
}
