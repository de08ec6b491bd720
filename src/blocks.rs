//! Minimal Slack Block Kit model.
//!
//! Only the block shapes the notifier actually emits: header, section (text
//! or fields), context and a single-button actions row. Serializes to the
//! exact JSON `chat.postMessage` expects.

use serde::Serialize;

/// A text object, either `plain_text` or `mrkdwn`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Text {
    PlainText { text: String },
    Mrkdwn { text: String },
}

impl Text {
    pub fn plain(text: impl Into<String>) -> Self {
        Text::PlainText { text: text.into() }
    }

    pub fn mrkdwn(text: impl Into<String>) -> Self {
        Text::Mrkdwn { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Text::PlainText { text } | Text::Mrkdwn { text } => text,
        }
    }
}

/// An interactive element inside an `actions` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Element {
    Button { text: Text, url: String },
}

/// One layout block of an outbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Header {
        text: Text,
    },
    Section {
        #[serde(skip_serializing_if = "Option::is_none")]
        text: Option<Text>,
        #[serde(skip_serializing_if = "Option::is_none")]
        fields: Option<Vec<Text>>,
    },
    Context {
        elements: Vec<Text>,
    },
    Actions {
        elements: Vec<Element>,
    },
}

impl Block {
    pub fn header(text: impl Into<String>) -> Self {
        Block::Header { text: Text::plain(text) }
    }

    pub fn section(text: impl Into<String>) -> Self {
        Block::Section {
            text: Some(Text::mrkdwn(text)),
            fields: None,
        }
    }

    pub fn fields(fields: Vec<Text>) -> Self {
        Block::Section {
            text: None,
            fields: Some(fields),
        }
    }

    pub fn context(text: impl Into<String>) -> Self {
        Block::Context { elements: vec![Text::mrkdwn(text)] }
    }

    pub fn button(label: impl Into<String>, url: impl Into<String>) -> Self {
        Block::Actions {
            elements: vec![Element::Button {
                text: Text::plain(label),
                url: url.into(),
            }],
        }
    }

    /// Text of a header block.
    pub fn header_text(&self) -> Option<&str> {
        match self {
            Block::Header { text } => Some(text.as_str()),
            _ => None,
        }
    }

    /// Text of a plain section block (not a fields section).
    pub fn section_text(&self) -> Option<&str> {
        match self {
            Block::Section { text: Some(text), .. } => Some(text.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_header_serialization() {
        let block = Block::header("🚀 New widget release: v1.0.0");
        assert_eq!(
            serde_json::to_value(&block).unwrap(),
            json!({
                "type": "header",
                "text": { "type": "plain_text", "text": "🚀 New widget release: v1.0.0" }
            })
        );
    }

    #[test]
    fn test_section_omits_absent_parts() {
        let block = Block::section("hello");
        assert_eq!(
            serde_json::to_value(&block).unwrap(),
            json!({
                "type": "section",
                "text": { "type": "mrkdwn", "text": "hello" }
            })
        );

        let block = Block::fields(vec![Text::mrkdwn("*Tag:*\n`v1`")]);
        assert_eq!(
            serde_json::to_value(&block).unwrap(),
            json!({
                "type": "section",
                "fields": [{ "type": "mrkdwn", "text": "*Tag:*\n`v1`" }]
            })
        );
    }

    #[test]
    fn test_button_serialization() {
        let block = Block::button("View Release", "https://example.com/r/1");
        assert_eq!(
            serde_json::to_value(&block).unwrap(),
            json!({
                "type": "actions",
                "elements": [{
                    "type": "button",
                    "text": { "type": "plain_text", "text": "View Release" },
                    "url": "https://example.com/r/1"
                }]
            })
        );
    }
}
