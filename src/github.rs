//! GitHub REST client - releases, commits and comparisons.
//!
//! Read-only: the notifier only ever looks things up. The API surface is
//! behind the [`ReleaseHost`] trait so flows can be driven by in-memory
//! fakes in tests.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::error::{NotifyError, Result};
use crate::identity::GithubLogin;

const GITHUB_API_URL: &str = "https://api.github.com";
const USER_AGENT: &str = concat!("ci-slack-notify/", env!("CARGO_PKG_VERSION"));
const HTTP_TIMEOUT_SECS: u64 = 30;

/// An `owner/repo` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

impl RepoRef {
    /// Parse the `owner/repo` input form.
    pub fn parse(full: &str) -> Result<Self> {
        match full.split_once('/') {
            Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() => Ok(Self {
                owner: owner.to_string(),
                repo: repo.to_string(),
            }),
            _ => Err(NotifyError::config(
                "'repository' must be in 'owner/repo' form",
            )),
        }
    }

    pub fn full(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

/// A release as returned by the releases endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    pub tag_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    pub html_url: String,
}

impl Release {
    /// Display name, falling back to the tag when the release is unnamed.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.tag_name,
        }
    }
}

/// Git author signature embedded in a commit object.
#[derive(Debug, Clone, Deserialize)]
pub struct GitSignature {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitDetail {
    pub message: String,
    #[serde(default)]
    pub author: Option<GitSignature>,
}

/// Reference to the GitHub account behind a commit. Absent when the commit
/// email maps to no platform user.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountRef {
    pub login: String,
}

/// One commit from the list/compare endpoints, reduced to the fields we read.
#[derive(Debug, Clone, Deserialize)]
pub struct RepoCommit {
    pub sha: String,
    pub commit: CommitDetail,
    #[serde(default)]
    pub author: Option<AccountRef>,
}

impl RepoCommit {
    /// Account login for this commit, when one resolves.
    pub fn login(&self) -> Option<GithubLogin> {
        self.author
            .as_ref()
            .map(|a| a.login.as_str())
            .filter(|l| !l.is_empty())
            .map(GithubLogin::new)
    }
}

#[derive(Debug, Deserialize)]
struct Comparison {
    commits: Vec<RepoCommit>,
}

/// The slice of the hosting API the notifier consumes.
#[async_trait]
pub trait ReleaseHost: Send + Sync {
    async fn release_by_tag(&self, tag: &str) -> Result<Release>;
    async fn latest_release(&self) -> Result<Release>;
    async fn list_releases(&self) -> Result<Vec<Release>>;
    async fn recent_commits(&self, per_page: u32) -> Result<Vec<RepoCommit>>;
    async fn compare(&self, base: &str, head: &str) -> Result<Vec<RepoCommit>>;
}

/// REST v3 implementation of [`ReleaseHost`].
pub struct GithubClient {
    http: Client,
    token: String,
    repo: RepoRef,
    base_url: String,
}

impl GithubClient {
    pub fn new(token: impl Into<String>, repo: RepoRef) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            token: token.into(),
            repo,
            base_url: GITHUB_API_URL.to_string(),
        })
    }

    /// Point the client at a different API root (proxies, GHES).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "github GET");
        let res = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", USER_AGENT)
            .send()
            .await?;
        let status = res.status();
        if !status.is_success() {
            return Err(NotifyError::GithubStatus {
                endpoint: path.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(res.json::<T>().await?)
    }
}

#[async_trait]
impl ReleaseHost for GithubClient {
    async fn release_by_tag(&self, tag: &str) -> Result<Release> {
        self.get(&format!(
            "/repos/{}/{}/releases/tags/{}",
            self.repo.owner, self.repo.repo, tag
        ))
        .await
    }

    async fn latest_release(&self) -> Result<Release> {
        self.get(&format!(
            "/repos/{}/{}/releases/latest",
            self.repo.owner, self.repo.repo
        ))
        .await
    }

    async fn list_releases(&self) -> Result<Vec<Release>> {
        self.get(&format!(
            "/repos/{}/{}/releases",
            self.repo.owner, self.repo.repo
        ))
        .await
    }

    async fn recent_commits(&self, per_page: u32) -> Result<Vec<RepoCommit>> {
        self.get(&format!(
            "/repos/{}/{}/commits?per_page={}",
            self.repo.owner, self.repo.repo, per_page
        ))
        .await
    }

    async fn compare(&self, base: &str, head: &str) -> Result<Vec<RepoCommit>> {
        let cmp: Comparison = self
            .get(&format!(
                "/repos/{}/{}/compare/{}...{}",
                self.repo.owner, self.repo.repo, base, head
            ))
            .await?;
        Ok(cmp.commits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_ref_parse() {
        let repo = RepoRef::parse("acme/widget").unwrap();
        assert_eq!(repo.owner, "acme");
        assert_eq!(repo.repo, "widget");
        assert_eq!(repo.full(), "acme/widget");
    }

    #[test]
    fn test_repo_ref_rejects_bad_forms() {
        for bad in ["acme", "/widget", "acme/", ""] {
            assert!(RepoRef::parse(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_release_display_name_falls_back_to_tag() {
        let release: Release = serde_json::from_value(serde_json::json!({
            "tag_name": "v1.0.0",
            "html_url": "https://github.com/acme/widget/releases/v1.0.0"
        }))
        .unwrap();
        assert_eq!(release.display_name(), "v1.0.0");

        let named: Release = serde_json::from_value(serde_json::json!({
            "tag_name": "v1.0.0",
            "name": "First stable",
            "html_url": "https://github.com/acme/widget/releases/v1.0.0"
        }))
        .unwrap();
        assert_eq!(named.display_name(), "First stable");
    }

    #[test]
    fn test_commit_login_filters_missing_accounts() {
        let commit: RepoCommit = serde_json::from_value(serde_json::json!({
            "sha": "abc123",
            "commit": { "message": "fix: a thing" },
            "author": null
        }))
        .unwrap();
        assert!(commit.login().is_none());

        let commit: RepoCommit = serde_json::from_value(serde_json::json!({
            "sha": "abc123",
            "commit": { "message": "fix: a thing" },
            "author": { "login": "alice" }
        }))
        .unwrap();
        assert_eq!(commit.login().unwrap().as_str(), "alice");
    }
}
