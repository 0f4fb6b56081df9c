//! Implements the Forge trait for Github
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use log::*;
use octocrab::{
    Octocrab,
    models::{pulls::PullRequest as GithubPullRequest, repos::Object},
    params::{self, repos::Reference},
};
use serde::{Deserialize, Serialize};

use crate::{
    ManifestReleaseError, Result,
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

#[derive(Debug, Deserialize)]
struct ContentResponse {
    pub path: String,
    pub sha: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Serialize)]
struct ContentQuery {
    #[serde(rename = "ref")]
    pub reference: String,
}

#[derive(Debug, Serialize)]
struct UpdateFileBody {
    pub message: String,
    pub content: String,
    pub branch: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpdateFileResponse {
    pub commit: Commit,
}

#[derive(Debug, Serialize)]
struct CommitsQuery {
    pub per_page: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommitAuthor {
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct CommitDetails {
    pub message: String,
    pub author: Option<CommitAuthor>,
}

#[derive(Debug, Deserialize)]
struct CommitListItem {
    pub sha: String,
    pub html_url: Option<String>,
    pub commit: CommitDetails,
}

/// Decodes the Base64 payload of the contents API, which wraps lines.
fn decode_content(encoded: &str) -> Result<String> {
    let compact: String =
        encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD.decode(compact)?;
    Ok(String::from_utf8(bytes)?)
}

fn encode_content(content: &str) -> String {
    STANDARD.encode(content.as_bytes())
}

fn is_not_found(err: &octocrab::Error) -> bool {
    matches!(
        err,
        octocrab::Error::GitHub { source, .. }
            if source.status_code.as_u16() == 404
    )
}

impl From<GithubPullRequest> for PullRequest {
    fn from(pr: GithubPullRequest) -> Self {
        Self {
            number: pr.number,
            title: pr.title.unwrap_or_default(),
            head_branch: pr.head.ref_field,
            url: pr.html_url.map(|u| u.to_string()).unwrap_or_default(),
        }
    }
}

/// GitHub forge implementation using Octocrab for API interactions with
/// repository contents, branches, commits, tags and pull requests.
pub struct Github {
    config: RemoteConfig,
    base_uri: String,
    instance: Octocrab,
}

impl Github {
    /// Create GitHub client with personal access token authentication and API
    /// base URL configuration.
    pub fn new(config: RemoteConfig) -> Result<Self> {
        let base_uri = config.api_base_uri();
        let instance = Octocrab::builder()
            .personal_token(config.token.clone())
            .base_uri(base_uri.clone())?
            .build()?;

        Ok(Self {
            config,
            base_uri,
            instance,
        })
    }

    fn repo_endpoint(&self, owner: &str, repo: &str, route: &str) -> String {
        format!("{}/repos/{owner}/{repo}/{route}", self.base_uri)
    }
}

#[async_trait]
impl Forge for Github {
    fn remote_config(&self) -> RemoteConfig {
        self.config.clone()
    }

    async fn get_file(&self, req: GetFileRequest) -> Result<RemoteFile> {
        let path = req.path.strip_prefix("./").unwrap_or(&req.path);
        let endpoint = self.repo_endpoint(
            &req.owner,
            &req.repo,
            &format!("contents/{path}"),
        );

        let query = req
            .reference
            .clone()
            .map(|reference| ContentQuery { reference });

        debug!("fetching {}/{}:{path}", req.owner, req.repo);

        let result: octocrab::Result<ContentResponse> =
            self.instance.get(endpoint, query.as_ref()).await;

        match result {
            Err(err) if is_not_found(&err) => {
                Err(ManifestReleaseError::not_found(&req.repo, &req.path))
            }
            Err(err) => {
                error!("error getting contents for path {path}: {err}");
                Err(err.into())
            }
            Ok(data) => Ok(RemoteFile {
                path: data.path,
                sha: data.sha,
                content: decode_content(&data.content)?,
            }),
        }
    }

    async fn default_branch(&self, owner: &str, repo: &str) -> Result<String> {
        let details = self.instance.repos(owner, repo).get().await?;

        details.default_branch.ok_or_else(|| {
            ManifestReleaseError::api(format!(
                "failed to find default branch for repo: {owner}/{repo}"
            ))
        })
    }

    async fn branch_head(&self, req: BranchRequest) -> Result<String> {
        let result = self
            .instance
            .repos(&req.owner, &req.repo)
            .get_ref(&Reference::Branch(req.branch.clone()))
            .await;

        let branch_ref = match result {
            Err(err) if is_not_found(&err) => {
                return Err(ManifestReleaseError::not_found(
                    &req.repo,
                    format!("refs/heads/{}", req.branch),
                ));
            }
            other => other?,
        };

        match branch_ref.object {
            Object::Commit { sha, .. } => Ok(sha),
            _ => Err(ManifestReleaseError::api(format!(
                "branch {} of {}/{} does not point at a commit",
                req.branch, req.owner, req.repo
            ))),
        }
    }

    async fn latest_tag(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Option<String>> {
        let page = self
            .instance
            .repos(owner, repo)
            .list_tags()
            .per_page(1)
            .send()
            .await?;

        Ok(page.items.into_iter().next().map(|tag| tag.name))
    }

    async fn list_commits(
        &self,
        req: ListCommitsRequest,
    ) -> Result<Vec<SourceCommit>> {
        let endpoint = self.repo_endpoint(&req.owner, &req.repo, "commits");
        let query = CommitsQuery {
            per_page: req.per_page,
            sha: req.branch.clone(),
        };

        let items: Vec<CommitListItem> =
            self.instance.get(endpoint, Some(&query)).await?;

        let repo_url = self.config.repo_url(&req.owner, &req.repo);

        let commits = items
            .into_iter()
            .map(|item| SourceCommit {
                link: item
                    .html_url
                    .unwrap_or_else(|| format!("{repo_url}/commit/{}", item.sha)),
                sha: item.sha,
                author_name: item
                    .commit
                    .author
                    .map(|a| a.name)
                    .unwrap_or_default(),
                message: item.commit.message,
            })
            .collect::<Vec<SourceCommit>>();

        debug!(
            "fetched {} commits for {}/{}",
            commits.len(),
            req.owner,
            req.repo
        );

        Ok(commits)
    }

    async fn list_open_prs(&self) -> Result<Vec<PullRequest>> {
        let page = self
            .instance
            .pulls(&self.config.owner, &self.config.repo)
            .list()
            .state(params::State::Open)
            .per_page(100)
            .send()
            .await?;

        let prs = self.instance.all_pages(page).await?;

        Ok(prs.into_iter().map(PullRequest::from).collect())
    }

    async fn close_pr(&self, pr_number: u64) -> Result<()> {
        let endpoint = self.repo_endpoint(
            &self.config.owner,
            &self.config.repo,
            &format!("pulls/{pr_number}"),
        );

        let _: serde_json::Value = self
            .instance
            .patch(endpoint, Some(&serde_json::json!({ "state": "closed" })))
            .await?;

        Ok(())
    }

    async fn delete_branch(&self, branch: &str) -> Result<()> {
        self.instance
            .repos(&self.config.owner, &self.config.repo)
            .delete_ref(&Reference::Branch(branch.to_string()))
            .await?;

        Ok(())
    }

    async fn create_branch(&self, req: CreateBranchRequest) -> Result<()> {
        info!("creating branch {} at {}", req.branch, req.sha);

        self.instance
            .repos(&self.config.owner, &self.config.repo)
            .create_ref(&Reference::Branch(req.branch), req.sha)
            .await?;

        Ok(())
    }

    async fn update_file(&self, req: UpdateFileRequest) -> Result<Commit> {
        let path = req.path.strip_prefix("./").unwrap_or(&req.path);
        let endpoint = self.repo_endpoint(
            &self.config.owner,
            &self.config.repo,
            &format!("contents/{path}"),
        );

        let body = UpdateFileBody {
            message: req.message.clone(),
            content: encode_content(&req.content),
            branch: req.branch.clone(),
            sha: req.sha.clone(),
        };

        let response: UpdateFileResponse =
            self.instance.put(endpoint, Some(&body)).await?;

        info!(
            "committed {path} to {}: sha: {}",
            req.branch, response.commit.sha
        );

        Ok(response.commit)
    }

    async fn create_pr(&self, req: CreatePrRequest) -> Result<PullRequest> {
        let pr = self
            .instance
            .pulls(&self.config.owner, &self.config.repo)
            .create(req.title, req.head_branch, req.base_branch)
            .body(req.body)
            .draft(req.draft)
            .send()
            .await?;

        Ok(pr.into())
    }
}
