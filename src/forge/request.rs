use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// A file read from a repository.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct RemoteFile {
    /// Path relative to the repository root.
    pub path: String,
    /// Blob SHA, required to update the file.
    pub sha: String,
    /// Decoded text content.
    pub content: String,
}

#[derive(Debug, Clone, PartialEq)]
/// Request to read a file.
pub struct GetFileRequest {
    pub owner: String,
    pub repo: String,
    pub path: String,
    /// Branch or SHA to read from (default branch when absent).
    pub reference: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
/// Request addressing a branch of a repository.
pub struct BranchRequest {
    pub owner: String,
    pub repo: String,
    pub branch: String,
}

#[derive(Debug, Clone, PartialEq)]
/// Request to list the most recent commits of a repository.
pub struct ListCommitsRequest {
    pub owner: String,
    pub repo: String,
    /// Branch to list (default branch when absent).
    pub branch: Option<String>,
    pub per_page: u8,
}

/// Normalized commit returned by the forge, newest first in listings.
#[derive(
    Debug, Default, Clone, PartialEq, Serialize, Deserialize, Builder,
)]
#[builder(setter(into), default)]
pub struct SourceCommit {
    pub sha: String,
    pub link: String,
    pub author_name: String,
    pub message: String,
}

impl SourceCommit {
    /// First paragraph of the commit message.
    pub fn title(&self) -> &str {
        self.message.split("\n\n").next().unwrap_or_default().trim()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// Open pull request information.
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    /// Name of the head branch.
    pub head_branch: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq)]
/// Request to create a branch pointing at a commit.
pub struct CreateBranchRequest {
    pub branch: String,
    pub sha: String,
}

#[derive(Debug, Clone, PartialEq)]
/// Request to create or replace a file on a branch.
pub struct UpdateFileRequest {
    pub branch: String,
    pub path: String,
    pub message: String,
    pub content: String,
    /// Blob SHA of the file being replaced.
    pub sha: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
/// Request to create a draft pull request.
pub struct CreatePrRequest {
    pub head_branch: String,
    pub base_branch: String,
    pub title: String,
    pub body: String,
    pub draft: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Commit {
    pub sha: String,
}
