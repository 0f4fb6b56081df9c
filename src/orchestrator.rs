//! Release pipeline: resolve the head commit of every tracked project,
//! patch the manifests that reference it, and publish the result as a
//! single draft pull request.
use chrono::{SecondsFormat, Utc};
use futures_util::future::try_join_all;
use log::*;
use serde::Serialize;
use std::rc::Rc;

use crate::{
    Result,
    changelog::{build_log, commits_since, project_section, render_body},
    config::{Config, project::ProjectConfig},
    forge::{
        manager::ForgeManager,
        request::{
            CreateBranchRequest, CreatePrRequest, ListCommitsRequest,
            PullRequest, UpdateFileRequest,
        },
    },
    manifest::{ManifestFileChange, ResolvedProject, patch_file},
    staleness::stale_warnings,
};

/// Everything a release pull request would contain.
#[derive(Debug, Clone, Serialize)]
pub struct ReleasePlan {
    /// Branch the pull request targets.
    pub base_branch: String,
    /// One entry per manifest file touched by a tracked project.
    pub files: Vec<ManifestFileChange>,
    /// Staleness warnings placed on top of the digest.
    pub warnings: Vec<String>,
    /// Rendered pull request body. Empty when nothing changed.
    pub body: String,
}

impl ReleasePlan {
    /// False only when every manifest file is unchanged.
    pub fn has_changes(&self) -> bool {
        self.files.iter().any(|file| file.changed)
    }

    pub fn changed_files(&self) -> impl Iterator<Item = &ManifestFileChange> {
        self.files.iter().filter(|file| file.changed)
    }
}

/// Result of publishing a release plan.
#[derive(Debug, Clone, Serialize)]
pub struct PublishedRelease {
    pub branch: String,
    pub pull_request: PullRequest,
    pub closed_prs: Vec<u64>,
    pub files: Vec<String>,
}

/// Renders `<repo>:<short sha>` pairs joined with " and ".
pub fn manifest_updates_summary(projects: &[&ResolvedProject]) -> String {
    projects
        .iter()
        .map(|p| format!("{}:{}", p.project.repo, p.short_sha()))
        .collect::<Vec<String>>()
        .join(" and ")
}

/// Groups projects by target manifest, keeping first-seen order.
pub fn group_by_manifest(
    projects: &[ProjectConfig],
) -> Vec<(String, Vec<ProjectConfig>)> {
    let mut groups: Vec<(String, Vec<ProjectConfig>)> = vec![];

    for project in projects.iter() {
        match groups
            .iter_mut()
            .find(|(path, _)| *path == project.manifest_file)
        {
            Some((_, group)) => group.push(project.clone()),
            None => groups
                .push((project.manifest_file.clone(), vec![project.clone()])),
        }
    }

    groups
}

pub struct Orchestrator {
    config: Rc<Config>,
    forge: Rc<ForgeManager>,
}

impl Orchestrator {
    pub fn new(config: Rc<Config>, forge: Rc<ForgeManager>) -> Self {
        Self { config, forge }
    }

    fn project_owner<'a>(&'a self, project: &'a ProjectConfig) -> &'a str {
        project.owner.as_deref().unwrap_or(self.forge.owner())
    }

    async fn base_branch(&self) -> Result<String> {
        match &self.config.base_branch {
            Some(branch) => Ok(branch.clone()),
            None => {
                self.forge
                    .default_branch(self.forge.owner(), self.forge.repo())
                    .await
            }
        }
    }

    async fn resolve_head(&self, project: &ProjectConfig) -> Result<String> {
        self.forge
            .head_sha(
                self.project_owner(project),
                &project.repo,
                project.branch.clone(),
            )
            .await
    }

    /// Fetches one manifest and the heads of every project it tracks, then
    /// applies the new tags.
    async fn resolve_manifest(
        &self,
        path: &str,
        projects: &[ProjectConfig],
        base_branch: &str,
    ) -> Result<ManifestFileChange> {
        let file_fut = self
            .forge
            .get_manifest_file(path, Some(base_branch.to_string()));
        let heads_fut =
            try_join_all(projects.iter().map(|p| self.resolve_head(p)));

        let (file, heads) = tokio::try_join!(file_fut, heads_fut)?;

        let pairs = projects
            .iter()
            .cloned()
            .zip(heads)
            .collect::<Vec<(ProjectConfig, String)>>();

        patch_file(file, &pairs)
    }

    /// Builds one digest section per distinct outdated source repository.
    async fn commit_log_sections(
        &self,
        files: &[ManifestFileChange],
    ) -> Result<Vec<String>> {
        let mut unique: Vec<&ResolvedProject> = vec![];

        for project in files.iter().flat_map(|f| f.projects.iter()) {
            if !project.is_outdated() {
                continue;
            }

            let owner = self.project_owner(&project.project);
            let seen = unique.iter().any(|p| {
                p.project.repo == project.project.repo
                    && self.project_owner(&p.project) == owner
            });

            if !seen {
                unique.push(project);
            }
        }

        let sections = unique.into_iter().map(|project| async move {
            let commits = self
                .forge
                .list_commits(ListCommitsRequest {
                    owner: self.project_owner(&project.project).to_string(),
                    repo: project.project.repo.clone(),
                    branch: project.project.branch.clone(),
                    per_page: self.config.commit_log_depth,
                })
                .await?;

            let window = commits_since(commits, &project.old_sha);

            if window.truncated {
                warn!(
                    "{}: {} not found in the latest {} commits",
                    project.project.repo,
                    project.old_sha,
                    self.config.commit_log_depth
                );
            }

            Result::Ok(project_section(
                &project.project.repo,
                &project.old_sha,
                &window,
            ))
        });

        try_join_all(sections).await
    }

    /// Computes the new manifest contents and pull request body without
    /// writing anything.
    pub async fn plan(&self) -> Result<ReleasePlan> {
        let base_branch = self.base_branch().await?;
        let groups = group_by_manifest(&self.config.projects);

        info!(
            "checking {} projects across {} manifest files",
            self.config.projects.len(),
            groups.len()
        );

        let template_fut = self.forge.get_manifest_file(
            &self.config.pr_template,
            Some(base_branch.clone()),
        );
        let files_fut = try_join_all(groups.iter().map(|(path, projects)| {
            self.resolve_manifest(path, projects, &base_branch)
        }));

        let (template, files) = tokio::try_join!(template_fut, files_fut)?;

        let mut plan = ReleasePlan {
            base_branch,
            files,
            warnings: vec![],
            body: "".into(),
        };

        if !plan.has_changes() {
            return Ok(plan);
        }

        let (sections, warnings) = tokio::try_join!(
            self.commit_log_sections(&plan.files),
            stale_warnings(&self.forge, &self.config.staleness_checks)
        )?;

        let log = build_log(&sections, &warnings);

        plan.body = render_body(
            &template.content,
            &self.config.template_placeholder,
            &log,
        );
        plan.warnings = warnings;

        Ok(plan)
    }

    /// Closes every open pull request whose title starts with the configured
    /// prefix and deletes its branch. Returns the closed PR numbers.
    pub async fn close_stale_prs(&self) -> Result<Vec<u64>> {
        let prs = self.forge.list_open_prs().await?;
        let mut closed = vec![];

        for pr in prs
            .into_iter()
            .filter(|pr| pr.title.starts_with(&self.config.title_prefix))
        {
            info!("closing PR #{} {}", pr.number, pr.title);
            self.forge.close_pr(pr.number).await?;
            self.forge.delete_branch(&pr.head_branch).await?;
            closed.push(pr.number);
        }

        Ok(closed)
    }

    /// Creates a release branch holding the changed manifests and opens a
    /// draft pull request for it.
    pub async fn publish(&self, plan: &ReleasePlan) -> Result<PublishedRelease> {
        let now = Utc::now();
        let branch =
            format!("{}-{}", self.config.branch_prefix, now.timestamp_millis());

        let base_sha = self
            .forge
            .head_sha(
                self.forge.owner(),
                self.forge.repo(),
                Some(plan.base_branch.clone()),
            )
            .await?;

        info!("creating release branch {branch} from {base_sha}");

        self.forge
            .create_branch(CreateBranchRequest {
                branch: branch.clone(),
                sha: base_sha,
            })
            .await?;

        let mut files = vec![];

        // one commit per file, sequentially, as every write moves the branch
        for change in plan.changed_files() {
            let retagged = change
                .projects
                .iter()
                .filter(|p| p.is_retagged())
                .collect::<Vec<&ResolvedProject>>();

            self.forge
                .update_file(UpdateFileRequest {
                    branch: branch.clone(),
                    path: change.path.clone(),
                    message: format!(
                        "Updated manifests to {}",
                        manifest_updates_summary(&retagged)
                    ),
                    content: change.content.clone(),
                    sha: Some(change.original.sha.clone()),
                })
                .await?;

            files.push(change.path.clone());
        }

        let title = format!(
            "{} - Automatically generated new release {}",
            self.config.title_prefix,
            now.to_rfc3339_opts(SecondsFormat::Millis, true)
        );

        info!("creating PR {title}");

        let pull_request = self
            .forge
            .create_pr(CreatePrRequest {
                head_branch: branch.clone(),
                base_branch: plan.base_branch.clone(),
                title,
                body: plan.body.clone(),
                draft: true,
            })
            .await?;

        info!("created release PR #{}", pull_request.number);

        Ok(PublishedRelease {
            branch,
            pull_request,
            closed_prs: vec![],
            files,
        })
    }

    /// Runs the whole pipeline. Returns `None` when every manifest is
    /// already current.
    pub async fn create_release_pr(&self) -> Result<Option<PublishedRelease>> {
        let plan = self.plan().await?;

        if !plan.has_changes() {
            info!("no changes: all manifests are up to date");
            return Ok(None);
        }

        let closed_prs = if self.config.close_stale_prs {
            self.close_stale_prs().await?
        } else {
            vec![]
        };

        let mut published = self.publish(&plan).await?;
        published.closed_prs = closed_prs;

        Ok(Some(published))
    }
}
