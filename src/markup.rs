//! Markdown-to-mrkdwn translation for release notes and commit lists.
//!
//! Line-oriented: headings become standalone header blocks, everything else
//! accumulates into capped section blocks after running through an ordered
//! pipeline of text transforms. Translation is best-effort and never fails,
//! whatever the input looks like.

use regex::{Captures, Regex};

use crate::blocks::Block;
use crate::identity::{GithubLogin, MentionMap};
use crate::github::RepoRef;

/// Hard cap on a section block's accumulated text. Slack rejects section
/// text above 3000 characters; we cut over well before that.
pub const MAX_SECTION_LEN: usize = 2500;

/// Translates markdown-ish note text into Slack blocks for one repository.
pub struct MarkupTranslator<'a> {
    mentions: &'a MentionMap,
    owner: String,
    repo: String,
    heading: Regex,
    inline_heading: Regex,
    bold: Regex,
    link: Regex,
    repo_link: Regex,
    mention: Regex,
}

impl<'a> MarkupTranslator<'a> {
    pub fn new(repo: &RepoRef, mentions: &'a MentionMap) -> Self {
        let repo_url = regex::escape(&format!(
            "https://github.com/{}/{}",
            repo.owner, repo.repo
        ));
        // Also swallows an already-converted `<url|text>` wrapper so the
        // shortened form replaces it instead of nesting link syntax.
        // The `issue/` path segment is kept as-is even though the platform
        // emits `issues/`; see the module tests.
        let repo_link = Regex::new(&format!(
            r"<?{repo_url}/(pull|issue)/([0-9]+)(\|[^>]*)?>?"
        ))
        .expect("valid escaped repo pattern");

        Self {
            mentions,
            owner: repo.owner.clone(),
            repo: repo.repo.clone(),
            heading: Regex::new(r"^#+ +(.+?) *$").expect("valid literal regex"),
            inline_heading: Regex::new(r"^#+ +(.*) *$").expect("valid literal regex"),
            bold: Regex::new(r"\*\*([^*]*)\*\*").expect("valid literal regex"),
            link: Regex::new(r"\[([^\]]*)\]\(([^)]*)\)").expect("valid literal regex"),
            repo_link,
            mention: Regex::new(r"@([a-zA-Z0-9_-]+)").expect("valid literal regex"),
        }
    }

    /// Translate raw note text into an ordered block sequence.
    pub fn translate(&self, raw: &str) -> Vec<Block> {
        let cleaned: String = raw.chars().filter(|c| *c != '\r' && *c != '\0').collect();
        if cleaned.is_empty() {
            return Vec::new();
        }

        let mut blocks = Vec::new();
        let mut section = String::new();

        for line in cleaned.split('\n') {
            if let Some(caps) = self.heading.captures(line) {
                flush(&mut blocks, &mut section);
                blocks.push(Block::header(&caps[1]));
                continue;
            }
            let rendered = self.render_line(line);
            self.append_line(&mut blocks, &mut section, &rendered);
        }
        flush(&mut blocks, &mut section);
        blocks
    }

    /// Apply the transform pipeline to one line. Order matters: each stage
    /// operates on the previous stage's output.
    fn render_line(&self, line: &str) -> String {
        let s = self.inline_heading.replace_all(line, "*${1}*");
        let s = self.bold.replace_all(&s, "*${1}*");
        let s = self.link.replace_all(&s, "<${2}|${1}>");
        let s = self.repo_link.replace_all(&s, |caps: &Captures| {
            format!(
                "<https://github.com/{}/{}/{}/{}|{}#{}>",
                self.owner, self.repo, &caps[1], &caps[2], self.repo, &caps[2]
            )
        });
        let s = self.mention.replace_all(&s, |caps: &Captures| {
            self.mentions
                .mention(&GithubLogin::new(&caps[1]))
                .to_string()
        });
        s.into_owned()
    }

    /// Append a rendered line (plus its newline) to the open section,
    /// starting a new section whenever the cap would be exceeded.
    fn append_line(&self, blocks: &mut Vec<Block>, section: &mut String, rendered: &str) {
        if !section.is_empty() && section.len() + rendered.len() + 1 > MAX_SECTION_LEN {
            flush(blocks, section);
        }
        // Single lines longer than the cap are split on char boundaries.
        let mut rest = rendered;
        while rest.len() + 1 > MAX_SECTION_LEN {
            let mut cut = MAX_SECTION_LEN - 1;
            while !rest.is_char_boundary(cut) {
                cut -= 1;
            }
            section.push_str(&rest[..cut]);
            flush(blocks, section);
            rest = &rest[cut..];
        }
        section.push_str(rest);
        section.push('\n');
    }
}

fn flush(blocks: &mut Vec<Block>, section: &mut String) {
    if !section.is_empty() {
        blocks.push(Block::section(std::mem::take(section)));
    }
}
