//! Notification composition - one block layout per notification kind.
//!
//! Pure: composers do no I/O and return messages that are ready to post
//! as-is. Deployment outcome replies are minimal text built directly by the
//! orchestrator; they attach to an existing thread and skip this module.

use crate::blocks::{Block, Text};
use crate::context::PushCommit;
use crate::contributors::ContributorSet;
use crate::github::RepoRef;
use crate::identity::{ChatMention, MentionMap};
use crate::slack::OutboundMessage;

/// Inputs for a release announcement.
pub struct ReleaseNotice<'a> {
    pub channel: &'a str,
    pub repo: &'a str,
    pub release_name: &'a str,
    pub tag_label: &'a str,
    pub released_by: ChatMention,
    pub notes: Vec<Block>,
    pub contributors: &'a ContributorSet,
    pub sha: &'a str,
    pub release_url: &'a str,
}

/// Inputs for a staging-push announcement.
pub struct StagingNotice<'a> {
    pub channel: &'a str,
    pub repository: &'a str,
    pub environment: &'a str,
    pub branch: &'a str,
    pub pushed_by: ChatMention,
    pub notes: Vec<Block>,
    pub contributors: &'a ContributorSet,
    pub sha: &'a str,
    pub staging_url: Option<&'a str>,
}

pub fn release_message(notice: ReleaseNotice<'_>, mentions: &MentionMap) -> OutboundMessage {
    let summary = format!("New {} release: {}", notice.repo, notice.release_name);
    let mut blocks = vec![
        Block::header(format!("🚀 {summary}")),
        Block::fields(vec![
            Text::mrkdwn(format!("*Released by:*\n{}", notice.released_by)),
            Text::mrkdwn(format!("*Tag:*\n`{}`", notice.tag_label)),
        ]),
    ];
    blocks.extend(notice.notes);
    blocks.push(Block::fields(vec![
        Text::mrkdwn(format!(
            "*Contributors:*\n{}",
            render_contributors(notice.contributors, mentions)
        )),
        Text::mrkdwn(format!("SHA: `{}`", notice.sha)),
    ]));
    blocks.push(Block::button("View Release", notice.release_url));

    OutboundMessage::new(notice.channel, summary, blocks)
}

pub fn staging_message(notice: StagingNotice<'_>, mentions: &MentionMap) -> OutboundMessage {
    let summary = format!("Staging Updated: {}", notice.environment);
    let mut blocks = vec![
        Block::header(format!("🔄 {summary}")),
        Block::fields(vec![
            Text::mrkdwn(format!("*Repository:*\n{}", notice.repository)),
            Text::mrkdwn(format!("*Environment:*\n`{}`", notice.environment)),
            Text::mrkdwn(format!("*Branch:*\n`{}`", notice.branch)),
            Text::mrkdwn(format!("*Pushed by:*\n{}", notice.pushed_by)),
        ]),
    ];
    blocks.extend(notice.notes);
    blocks.push(Block::fields(vec![
        Text::mrkdwn(format!(
            "*Contributors:*\n{}",
            render_contributors(notice.contributors, mentions)
        )),
        Text::mrkdwn(format!("Commit: `{}`", notice.sha)),
    ]));
    if let Some(url) = notice.staging_url.filter(|u| !u.is_empty()) {
        blocks.push(Block::button("View Staging", url));
    }

    OutboundMessage::new(notice.channel, summary, blocks)
}

/// Mentions for every contributor, space-separated, with a placeholder when
/// the set is empty.
fn render_contributors(contributors: &ContributorSet, mentions: &MentionMap) -> String {
    if contributors.is_empty() {
        return "No contributors found".to_string();
    }
    contributors
        .iter()
        .map(|login| mentions.mention(login).to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Markdown bullet list of commit-title links for the staging body. Titles
/// are scrubbed of characters that clash with mrkdwn link syntax before the
/// list goes through translation.
pub fn commit_notes(commits: &[PushCommit], repo: &RepoRef) -> String {
    commits
        .iter()
        .map(|c| {
            format!(
                "- [{}](https://github.com/{}/{}/commit/{})",
                scrub_title(c.title()),
                repo.owner,
                repo.repo,
                c.id
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn scrub_title(title: &str) -> String {
    title
        .replace('|', "")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\r', "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CommitAuthor;
    use crate::identity::GithubLogin;

    fn mentions() -> MentionMap {
        MentionMap::from_json(r#"{"alice": "U1234567890"}"#).unwrap()
    }

    fn contributors(names: &[&str]) -> ContributorSet {
        names.iter().map(|n| GithubLogin::new(*n)).collect()
    }

    #[test]
    fn test_release_message_layout() {
        let set = contributors(&["alice", "bob"]);
        let map = mentions();
        let message = release_message(
            ReleaseNotice {
                channel: "#releases",
                repo: "widget",
                release_name: "v1.1.0",
                tag_label: "refs/tags/v1.1.0",
                released_by: map.mention(&GithubLogin::new("alice")),
                notes: vec![Block::section("notes\n")],
                contributors: &set,
                sha: "abc123",
                release_url: "https://github.com/acme/widget/releases/v1.1.0",
            },
            &map,
        );

        assert_eq!(message.channel, "#releases");
        assert_eq!(message.text, "New widget release: v1.1.0");
        assert_eq!(message.blocks.len(), 5);
        assert_eq!(
            message.blocks[0].header_text(),
            Some("🚀 New widget release: v1.1.0")
        );
        // Contributors render through the mapping, unmapped ones fall back.
        let json = serde_json::to_string(&message.blocks[3]).unwrap();
        assert!(json.contains("<@U1234567890> @bob"));
        assert!(json.contains("SHA: `abc123`"));
        // Last block is the action button.
        let json = serde_json::to_string(&message.blocks[4]).unwrap();
        assert!(json.contains("View Release"));
    }

    #[test]
    fn test_staging_message_button_is_gated_on_url() {
        let set = contributors(&[]);
        let map = MentionMap::default();
        let base = |staging_url| StagingNotice {
            channel: "#staging",
            repository: "acme/widget",
            environment: "staging",
            branch: "main",
            pushed_by: map.mention(&GithubLogin::new("carol")),
            notes: Vec::new(),
            contributors: &set,
            sha: "def456",
            staging_url,
        };

        let with_url = staging_message(base(Some("https://staging.example.com")), &map);
        let json = serde_json::to_string(&with_url.blocks).unwrap();
        assert!(json.contains("View Staging"));

        let without = staging_message(base(None), &map);
        let json = serde_json::to_string(&without.blocks).unwrap();
        assert!(!json.contains("View Staging"));
        assert!(json.contains("No contributors found"));
    }

    #[test]
    fn test_commit_notes_scrub_and_link() {
        let repo = RepoRef::parse("acme/widget").unwrap();
        let commits = vec![PushCommit {
            id: "abc".to_string(),
            message: "fix: a|b <risky>\n\nbody".to_string(),
            author: Some(CommitAuthor::default()),
        }];
        assert_eq!(
            commit_notes(&commits, &repo),
            "- [fix: ab &lt;risky&gt;](https://github.com/acme/widget/commit/abc)"
        );
    }
}
