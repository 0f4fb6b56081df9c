//! Release pull request command implementation.
use log::*;

use crate::{Result, orchestrator::Orchestrator};

/// Updates every outdated manifest on a new branch and opens a draft pull
/// request. Does nothing when all manifests are current.
pub async fn execute(orchestrator: &Orchestrator) -> Result<()> {
    let Some(published) = orchestrator.create_release_pr().await? else {
        return Ok(());
    };

    if !published.closed_prs.is_empty() {
        info!("closed stale PRs: {:?}", published.closed_prs);
    }

    info!(
        "release PR #{} opened from {} updating {} file(s): {}",
        published.pull_request.number,
        published.branch,
        published.files.len(),
        published.pull_request.url
    );

    Ok(())
}
