//! Slack Web API client - chat.postMessage and reactions.
//!
//! Thin JSON-over-HTTP wrapper behind the [`ChatGateway`] trait. `ok: false`
//! responses surface as [`NotifyError::Slack`] with the platform error code,
//! so callers can treat `already_reacted` as success where that is the
//! intended behavior.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::blocks::Block;
use crate::error::{NotifyError, Result};

const SLACK_API_URL: &str = "https://slack.com/api";
const HTTP_TIMEOUT_SECS: u64 = 30;

/// A fully composed outbound message, ready to post as-is.
#[derive(Debug, Clone, Serialize)]
pub struct OutboundMessage {
    pub channel: String,
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<Block>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_ts: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_broadcast: Option<bool>,
}

impl OutboundMessage {
    pub fn new(channel: impl Into<String>, text: impl Into<String>, blocks: Vec<Block>) -> Self {
        Self {
            channel: channel.into(),
            text: text.into(),
            blocks,
            thread_ts: None,
            reply_broadcast: None,
        }
    }

    /// A plain-text reply attached to an existing thread.
    pub fn reply(
        channel: impl Into<String>,
        thread_ts: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            channel: channel.into(),
            text: text.into(),
            blocks: Vec::new(),
            thread_ts: Some(thread_ts.into()),
            reply_broadcast: None,
        }
    }

    /// Also surface the reply in the channel, not just the thread.
    pub fn with_broadcast(mut self) -> Self {
        self.reply_broadcast = Some(true);
        self
    }
}

/// Identifies a previously posted message for follow-up reactions and
/// replies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadRef {
    pub channel: String,
    pub ts: String,
}

/// The slice of the chat API the notifier consumes.
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Post a message; on success the returned [`ThreadRef`] is guaranteed
    /// to carry both channel and timestamp.
    async fn post_message(&self, message: &OutboundMessage) -> Result<ThreadRef>;
    async fn add_reaction(&self, thread: &ThreadRef, name: &str) -> Result<()>;
    async fn remove_reaction(&self, thread: &ThreadRef, name: &str) -> Result<()>;
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    ts: Option<String>,
}

/// Web API implementation of [`ChatGateway`].
pub struct SlackClient {
    http: Client,
    token: String,
    base_url: String,
}

impl SlackClient {
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            token: token.into(),
            base_url: SLACK_API_URL.to_string(),
        })
    }

    /// Point the client at a different API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn call(&self, method: &str, payload: &serde_json::Value) -> Result<ApiResponse> {
        let url = format!("{}/{}", self.base_url, method);
        debug!(%method, "slack call");
        let res = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(payload)
            .send()
            .await?;
        let body: ApiResponse = res.json().await?;
        if !body.ok {
            return Err(NotifyError::Slack {
                method: method.to_string(),
                code: body.error.unwrap_or_else(|| "unknown_error".to_string()),
            });
        }
        Ok(body)
    }
}

#[async_trait]
impl ChatGateway for SlackClient {
    async fn post_message(&self, message: &OutboundMessage) -> Result<ThreadRef> {
        let body = self
            .call("chat.postMessage", &serde_json::to_value(message)?)
            .await?;
        match (body.channel, body.ts) {
            (Some(channel), Some(ts)) => Ok(ThreadRef { channel, ts }),
            _ => Err(NotifyError::Slack {
                method: "chat.postMessage".to_string(),
                code: "response missing channel or ts".to_string(),
            }),
        }
    }

    async fn add_reaction(&self, thread: &ThreadRef, name: &str) -> Result<()> {
        self.call(
            "reactions.add",
            &json!({
                "channel": thread.channel,
                "timestamp": thread.ts,
                "name": name,
            }),
        )
        .await?;
        Ok(())
    }

    async fn remove_reaction(&self, thread: &ThreadRef, name: &str) -> Result<()> {
        self.call(
            "reactions.remove",
            &json!({
                "channel": thread.channel,
                "timestamp": thread.ts,
                "name": name,
            }),
        )
        .await?;
        Ok(())
    }
}
