//! GitHub → Slack identity mapping.
//!
//! GitHub logins and Slack mentions are distinct newtypes so the two
//! namespaces cannot be mixed up at compile time. The mapping is loaded once
//! per run from the `username-mapping` input and is read-only afterwards.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{NotifyError, Result};

/// A GitHub login (case-sensitive, opaque).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GithubLogin(String);

impl GithubLogin {
    pub fn new(login: impl Into<String>) -> Self {
        Self(login.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GithubLogin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A rendered Slack mention, ready to embed in mrkdwn text.
///
/// Either a resolved member reference (`<@U0123456789>`) or a plain-text
/// `@name` fallback for identities without a known member ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMention(String);

impl ChatMention {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChatMention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Strict Slack member ID shape: leading `U`, ten uppercase alphanumerics.
fn member_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^U[A-Z0-9]{10}$").expect("valid literal regex"))
}

/// GitHub login → Slack token mapping.
#[derive(Debug, Clone, Default)]
pub struct MentionMap {
    entries: HashMap<String, String>,
}

impl MentionMap {
    /// Parse the mapping from its JSON input. An empty input yields an empty
    /// map; malformed JSON is a configuration error.
    pub fn from_json(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let entries: HashMap<String, String> = serde_json::from_str(raw)
            .map_err(|e| NotifyError::config(format!("invalid 'username-mapping' JSON: {e}")))?;
        Ok(Self { entries })
    }

    /// Format a mention for a login. Unmapped logins pass through unchanged;
    /// only tokens that look like a Slack member ID become resolved
    /// references, everything else degrades to a plain `@token`.
    pub fn mention(&self, login: &GithubLogin) -> ChatMention {
        let token = self
            .entries
            .get(login.as_str())
            .map(String::as_str)
            .unwrap_or(login.as_str());
        if member_id_re().is_match(token) {
            ChatMention(format!("<@{token}>"))
        } else {
            ChatMention(format!("@{token}"))
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
