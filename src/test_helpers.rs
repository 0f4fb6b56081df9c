//! Common test helper functions shared across test modules.
//!
//! This module provides reusable utilities for creating test fixtures and mock objects,
//! reducing code duplication across different test suites.
use secrecy::SecretString;

use crate::{
    config::{
        Config,
        project::{PatchStrategy, ProjectConfig, ProjectConfigBuilder},
    },
    forge::{
        config::RemoteConfig,
        request::{RemoteFile, SourceCommit, SourceCommitBuilder},
    },
};

/// A full 40 character commit SHA whose short form is `1234567`.
pub const HEAD_SHA: &str = "1234567890abcdef1234567890abcdef12345678";
/// Registry prefix used by test projects.
pub const TEST_REGISTRY: &str = "public.ecr.aws/cds-snc";

/// Creates a test RemoteConfig pointing at `cds-snc/notification-manifests`.
pub fn create_test_remote_config() -> RemoteConfig {
    RemoteConfig {
        host: "github.com".to_string(),
        scheme: "https".to_string(),
        owner: "cds-snc".to_string(),
        repo: "notification-manifests".to_string(),
        token: SecretString::from("test-token".to_string()),
        dry_run: false,
    }
}

/// Creates a remote file with a blob SHA derived from its path.
pub fn create_test_remote_file(path: &str, content: &str) -> RemoteFile {
    RemoteFile {
        path: path.to_string(),
        sha: format!("blob-{path}"),
        content: content.to_string(),
    }
}

/// Creates a project using the test registry.
///
/// # Example
/// ```ignore
/// let project = create_test_project(
///     "notification-api",
///     "env/production/kustomization.yaml",
///     "notify-api",
///     PatchStrategy::Kustomize,
/// );
/// ```
pub fn create_test_project(
    repo: &str,
    manifest_file: &str,
    image_name: &str,
    strategy: PatchStrategy,
) -> ProjectConfig {
    ProjectConfigBuilder::default()
        .repo(repo)
        .manifest_file(manifest_file)
        .registry_url(TEST_REGISTRY)
        .image_name(image_name)
        .strategy(strategy)
        .build()
        .unwrap()
}

/// Creates a test Config with the provided projects and no staleness
/// checks.
pub fn create_test_config(projects: Vec<ProjectConfig>) -> Config {
    Config {
        projects,
        ..Config::default()
    }
}

/// Creates a commit whose link and author are derived from its SHA.
pub fn create_test_commit(sha: &str, message: &str) -> SourceCommit {
    SourceCommitBuilder::default()
        .sha(sha)
        .link(format!("https://github.com/cds-snc/repo/commit/{sha}"))
        .author_name("Jane Doe")
        .message(message)
        .build()
        .unwrap()
}
