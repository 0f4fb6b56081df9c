//! Commit digests rendered into release pull request bodies.
use log::warn;

use crate::{forge::request::SourceCommit, manifest::sha::sha_matches};

/// Commits of a source repository newer than the deployed one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommitWindow {
    /// Newest first.
    pub commits: Vec<SourceCommit>,
    /// The deployed commit was not among the fetched ones, so older
    /// commits may be missing.
    pub truncated: bool,
}

/// Keeps the commits strictly newer than `old_sha`. `commits` must be
/// ordered newest first.
pub fn commits_since(commits: Vec<SourceCommit>, old_sha: &str) -> CommitWindow {
    match commits.iter().position(|c| sha_matches(&c.sha, old_sha)) {
        Some(index) => CommitWindow {
            commits: commits.into_iter().take(index).collect(),
            truncated: false,
        },
        None => CommitWindow {
            commits,
            truncated: true,
        },
    }
}

/// Renders `- [<title>](<link>) by <author>`.
pub fn format_commit(commit: &SourceCommit) -> String {
    format!(
        "- [{}]({}) by {}",
        commit.title(),
        commit.link,
        commit.author_name
    )
}

/// Renders the digest of one source repository.
pub fn project_section(repo: &str, old_sha: &str, window: &CommitWindow) -> String {
    let lines = window
        .commits
        .iter()
        .map(format_commit)
        .collect::<Vec<String>>()
        .join("\n");

    let mut section = format!("{}\n\n{lines}", repo.to_uppercase());

    if window.truncated {
        section = format!(
            "{section}\n\n_Only the latest {} commits are listed: {old_sha} was not found among them._",
            window.commits.len()
        );
    }

    section
}

/// Renders a warning line placed above the digest.
pub fn prepend_warning(log: &str, message: &str) -> String {
    format!("⚠️ **{message}** \n\n {log}")
}

/// Joins project sections and places warnings on top in the given order.
pub fn build_log(sections: &[String], warnings: &[String]) -> String {
    let log = sections.join("\n\n");

    warnings
        .iter()
        .rev()
        .fold(log, |log, warning| prepend_warning(&log, warning))
}

/// Inserts the digest into the pull request template in place of
/// `placeholder`. Templates without the placeholder get the digest
/// appended.
pub fn render_body(template: &str, placeholder: &str, log: &str) -> String {
    if !placeholder.is_empty() && template.contains(placeholder) {
        template.replacen(placeholder, log, 1)
    } else {
        warn!("pull request template has no placeholder: appending digest");
        format!("{}\n\n{log}", template.trim_end())
    }
}
