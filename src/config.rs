//! Configuration loading and parsing for `manifest-release.toml` files.
//!
//! One configuration file describes one deployment target: the projects
//! whose images are tracked, where their tags live in the manifests
//! repository, and how the release pull request is composed.
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{ManifestReleaseError, Result};

pub mod project;
pub mod staleness;

use project::ProjectConfig;
use staleness::StalenessCheckConfig;

/// Default configuration filename.
pub const DEFAULT_CONFIG_FILE: &str = "manifest-release.toml";
/// Default pull request template path in the manifests repository.
pub const DEFAULT_PR_TEMPLATE: &str = ".github/PULL_REQUEST_TEMPLATE.md";
/// Template text replaced by the generated commit digest.
pub const DEFAULT_TEMPLATE_PLACEHOLDER: &str =
    "> Give details ex. Security patching, content update, more API pods etc";
/// Title prefix identifying pull requests opened by this tool.
pub const DEFAULT_TITLE_PREFIX: &str = "[AUTO-PR]";
/// Prefix of the branches created for release pull requests.
pub const DEFAULT_BRANCH_PREFIX: &str = "release";
/// Number of recent commits searched for the previously deployed SHA.
pub const DEFAULT_COMMIT_LOG_DEPTH: u8 = 50;
/// Largest page the GitHub commits endpoint returns.
pub const MAX_COMMIT_LOG_DEPTH: u8 = 100;

/// Root configuration structure for `manifest-release.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Branch release pull requests target. Defaults to the manifests
    /// repository's default branch.
    pub base_branch: Option<String>,
    /// Pull request template path in the manifests repository.
    pub pr_template: String,
    /// Template text replaced by the generated commit digest.
    pub template_placeholder: String,
    /// Title prefix identifying pull requests opened by this tool.
    pub title_prefix: String,
    /// Prefix of release branch names.
    pub branch_prefix: String,
    /// Number of recent commits searched per source repository.
    pub commit_log_depth: u8,
    /// Close previously opened pull requests before opening a new one.
    pub close_stale_prs: bool,
    /// Tracked projects.
    #[serde(rename = "project")]
    pub projects: Vec<ProjectConfig>,
    /// Production version checks rendered as warnings.
    #[serde(rename = "staleness_check")]
    pub staleness_checks: Vec<StalenessCheckConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_branch: None,
            pr_template: DEFAULT_PR_TEMPLATE.into(),
            template_placeholder: DEFAULT_TEMPLATE_PLACEHOLDER.into(),
            title_prefix: DEFAULT_TITLE_PREFIX.into(),
            branch_prefix: DEFAULT_BRANCH_PREFIX.into(),
            commit_log_depth: DEFAULT_COMMIT_LOG_DEPTH,
            close_stale_prs: true,
            projects: vec![],
            staleness_checks: vec![],
        }
    }
}

impl Config {
    /// Parses and validates configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates the configuration file at `path`.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            ManifestReleaseError::invalid_config(format!(
                "failed to read {}: {e}",
                path.display()
            ))
        })?;

        log::debug!("loaded configuration from {}", path.display());

        Self::parse(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.projects.is_empty() {
            return Err(ManifestReleaseError::invalid_config(
                "at least one [[project]] must be configured",
            ));
        }

        if self.title_prefix.trim().is_empty() {
            return Err(ManifestReleaseError::invalid_config(
                "title_prefix must not be empty",
            ));
        }

        if self.branch_prefix.trim().is_empty() {
            return Err(ManifestReleaseError::invalid_config(
                "branch_prefix must not be empty",
            ));
        }

        if self.commit_log_depth == 0
            || self.commit_log_depth > MAX_COMMIT_LOG_DEPTH
        {
            return Err(ManifestReleaseError::invalid_config(format!(
                "commit_log_depth must be between 1 and {MAX_COMMIT_LOG_DEPTH}"
            )));
        }

        for project in self.projects.iter() {
            project.validate()?;
        }

        for check in self.staleness_checks.iter() {
            check.validate()?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::{project::PatchStrategy, *};

    const CONFIG: &str = r#"
title_prefix = "[AUTO-PR]"

[[project]]
repo = "notification-api"
manifest_file = "env/production/kustomization.yaml"
registry_url = "public.ecr.aws/cds-snc"
image_name = "notify-api"

[[project]]
repo = "notification-lambdas"
manifest_file = "helmfile/overrides/lambdas.yaml"
image_name = "api-lambda"
strategy = "image-ref"

[[staleness_check]]
repo = "notification-terraform"
path = ".github/workflows/infrastructure_version.txt"
strip_prefix = "v"
message = "The production version of the Terraform infrastructure is behind the latest staging version."
"#;

    #[test]
    fn loads_defaults() {
        let config = Config::default();
        assert_eq!(config.pr_template, DEFAULT_PR_TEMPLATE);
        assert_eq!(config.commit_log_depth, DEFAULT_COMMIT_LOG_DEPTH);
        assert!(config.close_stale_prs);
        assert!(config.base_branch.is_none());
    }

    #[test]
    fn parses_projects_and_checks() {
        let config = Config::parse(CONFIG).unwrap();

        assert_eq!(config.projects.len(), 2);
        assert_eq!(config.projects[0].strategy, PatchStrategy::Kustomize);
        assert_eq!(config.projects[1].strategy, PatchStrategy::ImageRef);
        assert_eq!(config.staleness_checks.len(), 1);
        assert_eq!(
            config.staleness_checks[0].strip_prefix.as_deref(),
            Some("v")
        );
        assert_eq!(config.template_placeholder, DEFAULT_TEMPLATE_PLACEHOLDER);
    }

    #[test]
    fn rejects_config_without_projects() {
        let result = Config::parse("title_prefix = \"[AUTO-PR]\"\n");
        assert!(matches!(
            result,
            Err(ManifestReleaseError::InvalidConfig(_))
        ));
    }

    #[test]
    fn rejects_out_of_range_commit_log_depth() {
        let mut config = Config::parse(CONFIG).unwrap();

        config.commit_log_depth = 0;
        assert!(config.validate().is_err());

        config.commit_log_depth = 101;
        assert!(config.validate().is_err());

        config.commit_log_depth = 100;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_unparsable_toml() {
        let result = Config::parse("[[project]\nrepo = ");
        assert!(matches!(
            result,
            Err(ManifestReleaseError::TomlParseError(_))
        ));
    }

    #[tokio::test]
    async fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CONFIG.as_bytes()).unwrap();

        let config = Config::load(file.path()).await.unwrap();

        assert_eq!(config.projects[0].repo, "notification-api");
    }

    #[tokio::test]
    async fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load(dir.path().join("missing.toml")).await;

        assert!(matches!(
            result,
            Err(ManifestReleaseError::InvalidConfig(_))
        ));
    }
}
