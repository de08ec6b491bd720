//! CI → Slack notifier CLI.
//!
//! One invocation per CI event. Inputs come in as flags or as the `INPUT_*`
//! environment the Actions runner exports; validation happens before any
//! network call.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use ci_slack_notify::{
    GithubClient, NotifyArgs, NotifyConfig, Notifier, RunContext, SlackClient,
};

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ci_slack_notify=info,ci_notify=info"));
    fmt().with_env_filter(filter).init();

    let args = NotifyArgs::parse();
    let config = NotifyConfig::from_args(args)?;
    let context = RunContext::from_env();

    let github = GithubClient::new(&config.github_token, config.repo.clone())?;
    let slack = SlackClient::new(&config.slack_token)?;

    Notifier::new(&config, &context, &github, &slack)
        .run()
        .await?;
    Ok(())
}
