//! Traits related to remote git forges
use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::{
    Result,
    forge::{
        config::RemoteConfig,
        request::{
            BranchRequest, Commit, CreateBranchRequest, CreatePrRequest,
            GetFileRequest, ListCommitsRequest, PullRequest, RemoteFile,
            SourceCommit, UpdateFileRequest,
        },
    },
};

/// Operations against the hosted source-control API. Reads may target any
/// repository; writes always target the manifests repository described by
/// [`RemoteConfig`].
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Forge: Send + Sync {
    fn remote_config(&self) -> RemoteConfig;

    async fn get_file(&self, req: GetFileRequest) -> Result<RemoteFile>;
    async fn default_branch(&self, owner: &str, repo: &str) -> Result<String>;
    async fn branch_head(&self, req: BranchRequest) -> Result<String>;
    async fn latest_tag(&self, owner: &str, repo: &str)
    -> Result<Option<String>>;
    async fn list_commits(
        &self,
        req: ListCommitsRequest,
    ) -> Result<Vec<SourceCommit>>;

    async fn list_open_prs(&self) -> Result<Vec<PullRequest>>;
    async fn close_pr(&self, pr_number: u64) -> Result<()>;
    async fn delete_branch(&self, branch: &str) -> Result<()>;
    async fn create_branch(&self, req: CreateBranchRequest) -> Result<()>;
    async fn update_file(&self, req: UpdateFileRequest) -> Result<Commit>;
    async fn create_pr(&self, req: CreatePrRequest) -> Result<PullRequest>;
}
