//! CI run context - workflow metadata, the push event payload and step
//! outputs.
//!
//! Everything here degrades gracefully: missing environment variables become
//! empty strings, an unreadable event payload yields no push commits, and a
//! missing `$GITHUB_OUTPUT` only drops the step outputs with a warning.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::error::Result;
use crate::github::RepoCommit;
use crate::identity::GithubLogin;

/// Author record carried by push-event commits.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommitAuthor {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// One commit as it appears in a push event payload.
#[derive(Debug, Clone, Deserialize)]
pub struct PushCommit {
    pub id: String,
    pub message: String,
    #[serde(default)]
    pub author: Option<CommitAuthor>,
}

impl PushCommit {
    /// First line of the commit message.
    pub fn title(&self) -> &str {
        self.message.split('\n').next().unwrap_or_default()
    }

    /// Contributing identity: the account username when known, else the
    /// author email as a best-effort stand-in. Empty values resolve to none.
    pub fn author_identity(&self) -> Option<GithubLogin> {
        let author = self.author.as_ref()?;
        author
            .username
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| author.email.as_deref().filter(|s| !s.is_empty()))
            .map(GithubLogin::new)
    }

    /// Shape an API commit like a push-event commit so both sources feed the
    /// same staging pipeline.
    pub fn from_repo_commit(commit: RepoCommit) -> Self {
        let username = commit
            .author
            .as_ref()
            .map(|a| a.login.clone())
            .unwrap_or_default();
        let email = commit.commit.author.as_ref().and_then(|a| a.email.clone());
        Self {
            id: commit.sha,
            message: commit.commit.message,
            author: Some(CommitAuthor {
                username: Some(username),
                email,
            }),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct EventPayload {
    #[serde(default)]
    commits: Vec<PushCommit>,
}

/// Parse the commits out of a raw event payload. Anything unparseable is
/// treated as an event with no commits.
pub fn parse_event_commits(raw: &str) -> Vec<PushCommit> {
    serde_json::from_str::<EventPayload>(raw)
        .map(|e| e.commits)
        .unwrap_or_default()
}

/// Metadata the Actions runner exposes through the environment.
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    pub run_id: String,
    pub workflow: String,
    pub git_ref: String,
    pub sha: String,
    pub push_commits: Vec<PushCommit>,
}

impl RunContext {
    pub fn from_env() -> Self {
        let push_commits = std::env::var("GITHUB_EVENT_PATH")
            .ok()
            .and_then(|p| fs::read_to_string(p).ok())
            .map(|raw| parse_event_commits(&raw))
            .unwrap_or_default();
        Self {
            run_id: env_or_empty("GITHUB_RUN_ID"),
            workflow: env_or_empty("GITHUB_WORKFLOW"),
            git_ref: env_or_empty("GITHUB_REF"),
            sha: env_or_empty("GITHUB_SHA"),
            push_commits,
        }
    }

    /// Link to the workflow run that produced this notification.
    pub fn workflow_url(&self, repo_full: &str) -> String {
        format!(
            "https://github.com/{}/actions/runs/{}",
            repo_full, self.run_id
        )
    }
}

fn env_or_empty(name: &str) -> String {
    std::env::var(name).unwrap_or_default()
}

/// Record a step output for later workflow steps.
pub fn write_step_output(name: &str, value: &str) -> Result<()> {
    match std::env::var("GITHUB_OUTPUT") {
        Ok(path) if !path.is_empty() => append_output(Path::new(&path), name, value),
        _ => {
            warn!(output = name, "GITHUB_OUTPUT not set, step output dropped");
            Ok(())
        }
    }
}

fn append_output(path: &Path, name: &str, value: &str) -> Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}={}", name, value)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_event_commits() {
        let raw = r#"{
            "commits": [
                {"id": "abc", "message": "fix: bug\n\ndetails", "author": {"username": "alice"}},
                {"id": "def", "message": "docs", "author": {"email": "bob@example.com"}}
            ]
        }"#;
        let commits = parse_event_commits(raw);
        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].title(), "fix: bug");
        assert_eq!(commits[0].author_identity().unwrap().as_str(), "alice");
        assert_eq!(
            commits[1].author_identity().unwrap().as_str(),
            "bob@example.com"
        );
    }

    #[test]
    fn test_parse_event_commits_tolerates_garbage() {
        assert!(parse_event_commits("not json").is_empty());
        assert!(parse_event_commits("{}").is_empty());
    }

    #[test]
    fn test_author_identity_filters_empty_values() {
        let commit = PushCommit {
            id: "abc".to_string(),
            message: "m".to_string(),
            author: Some(CommitAuthor {
                username: Some(String::new()),
                email: Some(String::new()),
            }),
        };
        assert!(commit.author_identity().is_none());

        let commit = PushCommit {
            id: "abc".to_string(),
            message: "m".to_string(),
            author: None,
        };
        assert!(commit.author_identity().is_none());
    }

    #[test]
    fn test_workflow_url() {
        let context = RunContext {
            run_id: "12345".to_string(),
            ..Default::default()
        };
        assert_eq!(
            context.workflow_url("acme/widget"),
            "https://github.com/acme/widget/actions/runs/12345"
        );
    }

    #[test]
    fn test_append_output_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output");
        append_output(&path, "thread-ts", "1700000000.000100").unwrap();
        append_output(&path, "channel-id", "C123").unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "thread-ts=1700000000.000100\nchannel-id=C123\n");
    }
}
