//! Input parsing and validation.
//!
//! Inputs arrive either as CLI flags or as the `INPUT_*` environment
//! variables the Actions runner exports for each declared input. Everything
//! is validated in [`NotifyConfig::from_args`] before any network call; a
//! bad input fails the run with a message naming the offending option.

use std::str::FromStr;

use clap::Parser;

use crate::error::{NotifyError, Result};
use crate::github::RepoRef;
use crate::identity::{GithubLogin, MentionMap};

/// CLI / Actions inputs, unvalidated.
#[derive(Debug, Parser)]
#[command(name = "ci-notify")]
#[command(about = "Post CI lifecycle notifications to Slack")]
#[command(version)]
pub struct NotifyArgs {
    /// Notification kind: release, staging, deployment-success, deployment-failure
    #[arg(long = "type", env = "INPUT_TYPE")]
    pub kind: String,

    /// Repository in owner/repo form
    #[arg(long, env = "INPUT_REPOSITORY")]
    pub repository: Option<String>,

    /// GitHub login that triggered the workflow
    #[arg(long, env = "INPUT_ACTOR")]
    pub actor: Option<String>,

    /// Slack bot token
    #[arg(long, env = "INPUT_SLACK_BOT_TOKEN", hide_env_values = true)]
    pub slack_bot_token: Option<String>,

    /// GitHub API token
    #[arg(long, env = "INPUT_GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// JSON object mapping GitHub logins to Slack member IDs
    #[arg(long, env = "INPUT_USERNAME_MAPPING")]
    pub username_mapping: Option<String>,

    /// Release tag to announce; defaults to the latest release
    #[arg(long, env = "INPUT_RELEASE_TAG")]
    pub release_tag: Option<String>,

    /// Deployment environment name
    #[arg(long, env = "INPUT_ENVIRONMENT")]
    pub environment: Option<String>,

    /// Channel for new notifications
    #[arg(long, env = "INPUT_CHANNEL")]
    pub channel: Option<String>,

    /// Channel ID of a previously posted thread
    #[arg(long, env = "INPUT_CHANNEL_ID")]
    pub channel_id: Option<String>,

    /// Timestamp of a previously posted thread
    #[arg(long, env = "INPUT_THREAD_TS")]
    pub thread_ts: Option<String>,

    /// Staging URL for the action button
    #[arg(long, env = "INPUT_STAGING_URL")]
    pub staging_url: Option<String>,

    /// Commit SHA to display; defaults to the run's SHA
    #[arg(long, env = "INPUT_COMMIT_SHA")]
    pub commit_sha: Option<String>,

    /// Branch to display
    #[arg(long, env = "INPUT_BRANCH")]
    pub branch: Option<String>,

    /// "true" to add an in-progress reaction to the release post
    #[arg(long, env = "INPUT_SHOW_PROGRESS")]
    pub show_progress: Option<String>,
}

/// The four notification kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyKind {
    Release,
    Staging,
    DeploymentSuccess,
    DeploymentFailure,
}

impl FromStr for NotifyKind {
    type Err = NotifyError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "release" => Ok(NotifyKind::Release),
            "staging" => Ok(NotifyKind::Staging),
            "deployment-success" => Ok(NotifyKind::DeploymentSuccess),
            "deployment-failure" => Ok(NotifyKind::DeploymentFailure),
            other => Err(NotifyError::config(format!(
                "invalid notification type '{other}'. Must be: release, \
                 deployment-success, deployment-failure, or staging"
            ))),
        }
    }
}

/// Validated run configuration.
#[derive(Debug)]
pub struct NotifyConfig {
    pub kind: NotifyKind,
    pub repo: RepoRef,
    pub actor: GithubLogin,
    pub slack_token: String,
    pub github_token: String,
    pub mentions: MentionMap,
    pub release_tag: Option<String>,
    pub environment: Option<String>,
    pub channel: Option<String>,
    pub channel_id: Option<String>,
    pub thread_ts: Option<String>,
    pub staging_url: Option<String>,
    pub commit_sha: Option<String>,
    pub branch: Option<String>,
    pub show_progress: bool,
}

impl NotifyConfig {
    pub fn from_args(args: NotifyArgs) -> Result<Self> {
        let kind: NotifyKind = args.kind.parse()?;
        let slack_token = require(args.slack_bot_token, "slack-bot-token")?;
        let github_token = require(args.github_token, "github-token")?;
        let repo = RepoRef::parse(&require(args.repository, "repository")?)?;
        let actor = GithubLogin::new(require(args.actor, "actor")?);

        if matches!(
            kind,
            NotifyKind::DeploymentSuccess | NotifyKind::DeploymentFailure
        ) && args.environment.as_deref().unwrap_or("").is_empty()
        {
            return Err(NotifyError::config(
                "'environment' is required for deployment notifications",
            ));
        }

        let mentions = MentionMap::from_json(args.username_mapping.as_deref().unwrap_or(""))?;
        let show_progress = args.show_progress.as_deref() == Some("true");

        Ok(Self {
            kind,
            repo,
            actor,
            slack_token,
            github_token,
            mentions,
            release_tag: non_empty(args.release_tag),
            environment: non_empty(args.environment),
            channel: non_empty(args.channel),
            channel_id: non_empty(args.channel_id),
            thread_ts: non_empty(args.thread_ts),
            staging_url: non_empty(args.staging_url),
            commit_sha: non_empty(args.commit_sha),
            branch: non_empty(args.branch),
            show_progress,
        })
    }

    /// Channel used for thread follow-ups. Deployment flows accept either
    /// `channel-id` or the plain `channel` input.
    pub fn thread_channel(&self) -> Option<&str> {
        self.channel_id.as_deref().or(self.channel.as_deref())
    }
}

fn require(value: Option<String>, name: &str) -> Result<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| NotifyError::config(format!("'{name}' is required")))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> NotifyArgs {
        NotifyArgs {
            kind: "release".to_string(),
            repository: Some("acme/widget".to_string()),
            actor: Some("alice".to_string()),
            slack_bot_token: Some("xoxb-test".to_string()),
            github_token: Some("ghp-test".to_string()),
            username_mapping: None,
            release_tag: None,
            environment: None,
            channel: Some("#releases".to_string()),
            channel_id: None,
            thread_ts: None,
            staging_url: None,
            commit_sha: None,
            branch: None,
            show_progress: None,
        }
    }

    #[test]
    fn test_valid_release_config() {
        let config = NotifyConfig::from_args(base_args()).unwrap();
        assert_eq!(config.kind, NotifyKind::Release);
        assert_eq!(config.repo.full(), "acme/widget");
        assert!(!config.show_progress);
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let mut args = base_args();
        args.kind = "canary".to_string();
        let err = NotifyConfig::from_args(args).unwrap_err();
        assert!(err.to_string().contains("invalid notification type"));
    }

    #[test]
    fn test_missing_required_inputs() {
        let mut args = base_args();
        args.slack_bot_token = None;
        let err = NotifyConfig::from_args(args).unwrap_err();
        assert!(err.to_string().contains("slack-bot-token"));

        let mut args = base_args();
        args.repository = Some("not-a-repo".to_string());
        let err = NotifyConfig::from_args(args).unwrap_err();
        assert!(err.to_string().contains("owner/repo"));

        let mut args = base_args();
        args.actor = Some("  ".to_string());
        let err = NotifyConfig::from_args(args).unwrap_err();
        assert!(err.to_string().contains("actor"));
    }

    #[test]
    fn test_deployment_requires_environment() {
        let mut args = base_args();
        args.kind = "deployment-success".to_string();
        let err = NotifyConfig::from_args(args).unwrap_err();
        assert!(err.to_string().contains("environment"));

        let mut args = base_args();
        args.kind = "deployment-failure".to_string();
        args.environment = Some("production".to_string());
        assert!(NotifyConfig::from_args(args).is_ok());
    }

    #[test]
    fn test_malformed_mapping_fails_validation() {
        let mut args = base_args();
        args.username_mapping = Some("{broken".to_string());
        assert!(NotifyConfig::from_args(args).is_err());
    }

    #[test]
    fn test_show_progress_parses_literal_true_only() {
        let mut args = base_args();
        args.show_progress = Some("true".to_string());
        assert!(NotifyConfig::from_args(args).unwrap().show_progress);

        let mut args = base_args();
        args.show_progress = Some("yes".to_string());
        assert!(!NotifyConfig::from_args(args).unwrap().show_progress);
    }

    #[test]
    fn test_thread_channel_prefers_channel_id() {
        let mut args = base_args();
        args.channel_id = Some("C999".to_string());
        let config = NotifyConfig::from_args(args).unwrap();
        assert_eq!(config.thread_channel(), Some("C999"));

        let config = NotifyConfig::from_args(base_args()).unwrap();
        assert_eq!(config.thread_channel(), Some("#releases"));
    }
}
