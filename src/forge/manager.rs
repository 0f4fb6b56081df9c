//! Manager that wraps forge implementations
use log::*;

use crate::{
    Result,
    forge::{
        config::RemoteConfig,
        request::{
            BranchRequest, Commit, CreateBranchRequest, CreatePrRequest,
            GetFileRequest, ListCommitsRequest, PullRequest, RemoteFile,
            SourceCommit, UpdateFileRequest,
        },
        traits::Forge,
    },
};

/// Placeholder SHA returned for skipped writes in dry-run mode.
const DRY_RUN_SHA: &str = "fff";

pub struct ForgeManager {
    forge: Box<dyn Forge>,
    remote_config: RemoteConfig,
}

impl ForgeManager {
    pub fn new(forge: Box<dyn Forge>) -> Self {
        let remote_config = forge.remote_config();
        Self {
            forge,
            remote_config,
        }
    }

    pub fn remote_config(&self) -> &RemoteConfig {
        &self.remote_config
    }

    /// Owner of the manifests repository, the default for every project.
    pub fn owner(&self) -> &str {
        &self.remote_config.owner
    }

    /// Name of the manifests repository.
    pub fn repo(&self) -> &str {
        &self.remote_config.repo
    }

    pub async fn get_file(&self, req: GetFileRequest) -> Result<RemoteFile> {
        self.forge.get_file(req).await
    }

    /// Reads a file from the manifests repository.
    pub async fn get_manifest_file(
        &self,
        path: &str,
        reference: Option<String>,
    ) -> Result<RemoteFile> {
        self.get_file(GetFileRequest {
            owner: self.owner().to_string(),
            repo: self.repo().to_string(),
            path: path.to_string(),
            reference,
        })
        .await
    }

    pub async fn default_branch(&self, owner: &str, repo: &str) -> Result<String> {
        self.forge.default_branch(owner, repo).await
    }

    /// Resolves the commit at the tip of `branch`, or of the default branch
    /// when none is given.
    pub async fn head_sha(
        &self,
        owner: &str,
        repo: &str,
        branch: Option<String>,
    ) -> Result<String> {
        let branch = match branch {
            Some(branch) => branch,
            None => self.default_branch(owner, repo).await?,
        };

        let sha = self
            .forge
            .branch_head(BranchRequest {
                owner: owner.to_string(),
                repo: repo.to_string(),
                branch: branch.clone(),
            })
            .await?;

        debug!("{owner}/{repo}@{branch} is at {sha}");

        Ok(sha)
    }

    pub async fn latest_tag(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Option<String>> {
        self.forge.latest_tag(owner, repo).await
    }

    pub async fn list_commits(
        &self,
        req: ListCommitsRequest,
    ) -> Result<Vec<SourceCommit>> {
        debug!(
            "listing {} commits of {}/{} on {:?}",
            req.per_page, req.owner, req.repo, req.branch
        );
        self.forge.list_commits(req).await
    }

    pub async fn list_open_prs(&self) -> Result<Vec<PullRequest>> {
        self.forge.list_open_prs().await
    }

    pub async fn close_pr(&self, pr_number: u64) -> Result<()> {
        if self.remote_config.dry_run {
            warn!("dry_run: would close PR: {pr_number}");
            return Ok(());
        }
        self.forge.close_pr(pr_number).await
    }

    pub async fn delete_branch(&self, branch: &str) -> Result<()> {
        if self.remote_config.dry_run {
            warn!("dry_run: would delete branch: {branch}");
            return Ok(());
        }
        self.forge.delete_branch(branch).await
    }

    pub async fn create_branch(&self, req: CreateBranchRequest) -> Result<()> {
        if self.remote_config.dry_run {
            warn!("dry_run: would create branch: req: {:#?}", req);
            return Ok(());
        }
        self.forge.create_branch(req).await
    }

    pub async fn update_file(&self, req: UpdateFileRequest) -> Result<Commit> {
        if self.remote_config.dry_run {
            warn!(
                "dry_run: would update file {} on {}: message: {}",
                req.path, req.branch, req.message
            );
            return Ok(Commit {
                sha: DRY_RUN_SHA.into(),
            });
        }
        self.forge.update_file(req).await
    }

    pub async fn create_pr(&self, req: CreatePrRequest) -> Result<PullRequest> {
        if self.remote_config.dry_run {
            warn!("dry_run: would create PR: req: {:#?}", req);
            return Ok(PullRequest {
                number: 0,
                title: req.title,
                head_branch: req.head_branch,
                url: "".into(),
            });
        }

        self.forge.create_pr(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{forge::traits::MockForge, test_helpers::*};

    fn dry_run_forge() -> MockForge {
        let mut mock_forge = MockForge::new();
        mock_forge.expect_remote_config().returning(|| RemoteConfig {
            dry_run: true,
            ..create_test_remote_config()
        });
        mock_forge
    }

    #[tokio::test]
    async fn head_sha_uses_default_branch_when_none_given() {
        let mut mock_forge = MockForge::new();
        mock_forge
            .expect_remote_config()
            .returning(create_test_remote_config);
        mock_forge
            .expect_default_branch()
            .withf(|owner, repo| owner == "cds-snc" && repo == "notification-api")
            .returning(|_, _| Ok("main".into()))
            .times(1);
        mock_forge
            .expect_branch_head()
            .withf(|req| req.branch == "main")
            .returning(|_| Ok(HEAD_SHA.into()))
            .times(1);

        let manager = ForgeManager::new(Box::new(mock_forge));
        let sha = manager
            .head_sha("cds-snc", "notification-api", None)
            .await
            .unwrap();

        assert_eq!(sha, HEAD_SHA);
    }

    #[tokio::test]
    async fn head_sha_uses_configured_branch() {
        let mut mock_forge = MockForge::new();
        mock_forge
            .expect_remote_config()
            .returning(create_test_remote_config);
        mock_forge.expect_default_branch().times(0);
        mock_forge
            .expect_branch_head()
            .withf(|req| req.branch == "release")
            .returning(|_| Ok(HEAD_SHA.into()))
            .times(1);

        let manager = ForgeManager::new(Box::new(mock_forge));
        let sha = manager
            .head_sha("cds-snc", "notification-api", Some("release".into()))
            .await
            .unwrap();

        assert_eq!(sha, HEAD_SHA);
    }

    #[tokio::test]
    async fn get_manifest_file_targets_manifests_repo() {
        let mut mock_forge = MockForge::new();
        mock_forge
            .expect_remote_config()
            .returning(create_test_remote_config);
        mock_forge
            .expect_get_file()
            .with(mockall::predicate::eq(GetFileRequest {
                owner: "cds-snc".into(),
                repo: "notification-manifests".into(),
                path: "VERSION".into(),
                reference: None,
            }))
            .returning(|req| Ok(create_test_remote_file(&req.path, "1.0.0")));

        let manager = ForgeManager::new(Box::new(mock_forge));
        let file = manager.get_manifest_file("VERSION", None).await.unwrap();

        assert_eq!(file.content, "1.0.0");
    }

    #[tokio::test]
    async fn dry_run_skips_writes() {
        let mut mock_forge = dry_run_forge();
        mock_forge.expect_close_pr().times(0);
        mock_forge.expect_delete_branch().times(0);
        mock_forge.expect_create_branch().times(0);
        mock_forge.expect_update_file().times(0);
        mock_forge.expect_create_pr().times(0);

        let manager = ForgeManager::new(Box::new(mock_forge));

        manager.close_pr(1).await.unwrap();
        manager.delete_branch("release-1").await.unwrap();
        manager
            .create_branch(CreateBranchRequest {
                branch: "release-2".into(),
                sha: HEAD_SHA.into(),
            })
            .await
            .unwrap();
        let commit = manager
            .update_file(UpdateFileRequest {
                branch: "release-2".into(),
                path: "images.yaml".into(),
                message: "update".into(),
                content: "".into(),
                sha: None,
            })
            .await
            .unwrap();
        let pr = manager
            .create_pr(CreatePrRequest {
                head_branch: "release-2".into(),
                base_branch: "main".into(),
                title: "[AUTO-PR] release".into(),
                body: "".into(),
                draft: true,
            })
            .await
            .unwrap();

        assert_eq!(commit.sha, DRY_RUN_SHA);
        assert_eq!(pr.number, 0);
        assert_eq!(pr.head_branch, "release-2");
    }

    #[tokio::test]
    async fn writes_pass_through_when_not_dry_run() {
        let mut mock_forge = MockForge::new();
        mock_forge
            .expect_remote_config()
            .returning(create_test_remote_config);
        mock_forge
            .expect_close_pr()
            .with(mockall::predicate::eq(7))
            .returning(|_| Ok(()))
            .times(1);

        let manager = ForgeManager::new(Box::new(mock_forge));

        manager.close_pr(7).await.unwrap();
    }
}
