//! CI lifecycle notifications for Slack.
//!
//! Short-lived binary invoked once per CI event: reads run context and
//! inputs, makes a bounded sequence of GitHub and Slack API calls, and
//! exits. The interesting parts are the markdown-to-mrkdwn translation,
//! the GitHub→Slack identity mapping and the contributor resolution; the
//! API clients are thin and sit behind traits.

pub mod blocks;
pub mod compose;
pub mod config;
pub mod context;
pub mod contributors;
pub mod error;
pub mod github;
pub mod identity;
pub mod markup;
pub mod notify;
pub mod slack;

pub use blocks::{Block, Element, Text};
pub use config::{NotifyArgs, NotifyConfig, NotifyKind};
pub use context::{PushCommit, RunContext};
pub use contributors::ContributorSet;
pub use error::{NotifyError, Result};
pub use github::{GithubClient, Release, ReleaseHost, RepoCommit, RepoRef};
pub use identity::{ChatMention, GithubLogin, MentionMap};
pub use markup::{MarkupTranslator, MAX_SECTION_LEN};
pub use notify::Notifier;
pub use slack::{ChatGateway, OutboundMessage, SlackClient, ThreadRef};
