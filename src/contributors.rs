//! Contributor resolution over a release range or a push window.
//!
//! Two resolvers, one per notification family:
//! - releases compare the new tag against its predecessor, or sample recent
//!   history when the repository has never released before;
//! - staging pushes read the commits carried by the event, or fetch a small
//!   recent window when the event carries none (a normal path for manually
//!   dispatched workflows, not a degraded one).

use std::collections::BTreeSet;

use tracing::info;

use crate::context::PushCommit;
use crate::error::Result;
use crate::github::{ReleaseHost, RepoCommit};
use crate::identity::GithubLogin;

/// Recent-commit window when a release has no predecessor to compare against.
const FIRST_RELEASE_WINDOW: u32 = 10;

/// Recent-commit window when a push event carries no commit list.
const PUSH_FALLBACK_WINDOW: u32 = 5;

/// Deduplicated, stably ordered set of contributing identities.
pub type ContributorSet = BTreeSet<GithubLogin>;

/// Distinct authors between `base` and `head`, or across the most recent
/// commits when there is no baseline. Commits without a resolvable account
/// contribute nothing.
pub async fn for_release(
    host: &dyn ReleaseHost,
    head: &str,
    base: Option<&str>,
) -> Result<ContributorSet> {
    let commits = match base {
        Some(base) => {
            info!(%base, %head, "resolving contributors from release comparison");
            host.compare(base, head).await?
        }
        None => {
            info!(%head, "no previous release, sampling recent commits");
            host.recent_commits(FIRST_RELEASE_WINDOW).await?
        }
    };
    Ok(collect(&commits))
}

fn collect(commits: &[RepoCommit]) -> ContributorSet {
    commits.iter().filter_map(RepoCommit::login).collect()
}

/// The commit window for a staging push: the event payload when it carries
/// commits, otherwise the latest commits from the API.
pub async fn push_window(
    host: &dyn ReleaseHost,
    event_commits: &[PushCommit],
) -> Result<Vec<PushCommit>> {
    if !event_commits.is_empty() {
        info!(count = event_commits.len(), "using commits from push event");
        return Ok(event_commits.to_vec());
    }
    info!("push event carried no commits, fetching recent commits");
    let commits = host.recent_commits(PUSH_FALLBACK_WINDOW).await?;
    Ok(commits.into_iter().map(PushCommit::from_repo_commit).collect())
}

/// Contributing identities of a commit window.
pub fn from_commits(commits: &[PushCommit]) -> ContributorSet {
    commits.iter().filter_map(PushCommit::author_identity).collect()
}
