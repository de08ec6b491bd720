//! Lifecycle orchestration - sequences the API calls for each notification
//! kind.
//!
//! Steps are strictly sequential; each depends on the previous one's result
//! (a reaction needs the timestamp of the posted message). The only
//! tolerated failure modes are the ones called out inline: a reaction that
//! is already present counts as success, and the cosmetic follow-ups of a
//! deployment (progress-reaction removal, the outcome reply) are logged and
//! skipped on failure because the primary notification already exists.

use tracing::{info, warn};

use crate::compose::{self, ReleaseNotice, StagingNotice};
use crate::config::{NotifyConfig, NotifyKind};
use crate::context::{write_step_output, RunContext};
use crate::contributors;
use crate::error::Result;
use crate::github::{Release, ReleaseHost};
use crate::markup::MarkupTranslator;
use crate::slack::{ChatGateway, OutboundMessage, ThreadRef};

/// Reaction shown while a deployment is still running.
pub const PROGRESS_REACTION: &str = "hourglass_flowing_sand";
/// Reaction for a finished, successful deployment.
pub const SUCCESS_REACTION: &str = "white_check_mark";
/// Reaction for a failed deployment.
pub const FAILURE_REACTION: &str = "x";

/// Drives one notification run end to end.
pub struct Notifier<'a> {
    config: &'a NotifyConfig,
    context: &'a RunContext,
    host: &'a dyn ReleaseHost,
    chat: &'a dyn ChatGateway,
}

impl<'a> Notifier<'a> {
    pub fn new(
        config: &'a NotifyConfig,
        context: &'a RunContext,
        host: &'a dyn ReleaseHost,
        chat: &'a dyn ChatGateway,
    ) -> Self {
        Self {
            config,
            context,
            host,
            chat,
        }
    }

    pub async fn run(&self) -> Result<()> {
        match self.config.kind {
            NotifyKind::Release => self.notify_release().await,
            NotifyKind::Staging => self.notify_staging().await,
            NotifyKind::DeploymentSuccess => self.notify_deployment(true).await,
            NotifyKind::DeploymentFailure => self.notify_deployment(false).await,
        }
    }

    async fn notify_release(&self) -> Result<()> {
        let release = match &self.config.release_tag {
            Some(tag) => self.host.release_by_tag(tag).await?,
            None => self.host.latest_release().await?,
        };
        info!(tag = %release.tag_name, "announcing release");

        let releases = self.host.list_releases().await?;
        let prev_tag = previous_tag(&releases, &release.tag_name);
        let contributor_set =
            contributors::for_release(self.host, &release.tag_name, prev_tag.as_deref()).await?;
        info!(count = contributor_set.len(), "resolved contributors");

        let translator = MarkupTranslator::new(&self.config.repo, &self.config.mentions);
        let notes = translator.translate(release.body.as_deref().unwrap_or(""));

        let tag_label = self
            .config
            .branch
            .clone()
            .unwrap_or_else(|| self.context.git_ref.clone());
        let sha = self
            .config
            .commit_sha
            .clone()
            .unwrap_or_else(|| self.context.sha.clone());

        let message = compose::release_message(
            ReleaseNotice {
                channel: self.config.channel.as_deref().unwrap_or(""),
                repo: &self.config.repo.repo,
                release_name: release.display_name(),
                tag_label: &tag_label,
                released_by: self.config.mentions.mention(&self.config.actor),
                notes,
                contributors: &contributor_set,
                sha: &sha,
                release_url: &release.html_url,
            },
            &self.config.mentions,
        );

        let thread = self.chat.post_message(&message).await?;
        info!(channel = %thread.channel, ts = %thread.ts, "release notification posted");

        write_step_output("thread-ts", &thread.ts)?;
        write_step_output("channel-id", &thread.channel)?;

        if self.config.show_progress {
            self.add_reaction_tolerant(&thread, PROGRESS_REACTION).await?;
        }
        Ok(())
    }

    async fn notify_staging(&self) -> Result<()> {
        let commits = contributors::push_window(self.host, &self.context.push_commits).await?;
        let contributor_set = contributors::from_commits(&commits);

        let translator = MarkupTranslator::new(&self.config.repo, &self.config.mentions);
        let notes = translator.translate(&compose::commit_notes(&commits, &self.config.repo));

        let repository = self.config.repo.full();
        let sha = self
            .config
            .commit_sha
            .clone()
            .unwrap_or_else(|| self.context.sha.clone());

        let message = compose::staging_message(
            StagingNotice {
                channel: self.config.channel.as_deref().unwrap_or(""),
                repository: &repository,
                environment: self.config.environment.as_deref().unwrap_or("staging"),
                branch: self.config.branch.as_deref().unwrap_or(""),
                pushed_by: self.config.mentions.mention(&self.config.actor),
                notes,
                contributors: &contributor_set,
                sha: &sha,
                staging_url: self.config.staging_url.as_deref(),
            },
            &self.config.mentions,
        );

        let thread = self.chat.post_message(&message).await?;
        info!(channel = %thread.channel, ts = %thread.ts, "staging notification posted");
        Ok(())
    }

    async fn notify_deployment(&self, success: bool) -> Result<()> {
        let thread = ThreadRef {
            channel: self.config.thread_channel().unwrap_or("").to_string(),
            ts: self.config.thread_ts.clone().unwrap_or_default(),
        };

        // Mark the thread in-progress first, in case the release step never
        // added the reaction itself.
        self.add_reaction_tolerant(&thread, PROGRESS_REACTION).await?;

        if let Err(e) = self.chat.remove_reaction(&thread, PROGRESS_REACTION).await {
            warn!(error = %e, "could not remove progress reaction");
        }

        let workflow_url = self.context.workflow_url(&self.config.repo.full());
        let text = if success {
            format!(
                "✅ {} successful! <{}|View workflow>",
                self.context.workflow, workflow_url
            )
        } else {
            format!(
                "❌ {} failed! <{}|View workflow>",
                self.context.workflow, workflow_url
            )
        };
        let mut reply = OutboundMessage::reply(thread.channel.clone(), thread.ts.clone(), text);
        if !success {
            reply = reply.with_broadcast();
        }
        if let Err(e) = self.chat.post_message(&reply).await {
            warn!(error = %e, "could not post deployment outcome reply");
        }

        let outcome = if success {
            SUCCESS_REACTION
        } else {
            FAILURE_REACTION
        };
        self.add_reaction_tolerant(&thread, outcome).await?;
        Ok(())
    }

    /// Add a reaction, treating "already present" as success.
    async fn add_reaction_tolerant(&self, thread: &ThreadRef, name: &str) -> Result<()> {
        match self.chat.add_reaction(thread, name).await {
            Err(e) if e.is_already_reacted() => {
                info!(reaction = name, "reaction already present");
                Ok(())
            }
            other => other,
        }
    }
}

/// Tag of the release preceding `current` in the listing. A tag absent from
/// the listing compares against the most recent listed release instead.
fn previous_tag(releases: &[Release], current: &str) -> Option<String> {
    let idx = releases
        .iter()
        .position(|r| r.tag_name == current)
        .map(|i| i + 1)
        .unwrap_or(0);
    releases.get(idx).map(|r| r.tag_name.clone())
}
