//! Common test utilities for orchestrator tests.

use std::rc::Rc;

use crate::{
    ManifestReleaseError,
    config::{Config, project::PatchStrategy},
    forge::{
        config::RemoteConfig, manager::ForgeManager, request::SourceCommit,
        traits::MockForge,
    },
    orchestrator::Orchestrator,
    test_helpers::*,
};

pub use crate::test_helpers::HEAD_SHA;

pub const KUSTOMIZATION_PATH: &str = "env/production/kustomization.yaml";
pub const HELMFILE_PATH: &str = "helmfile/overrides/production.env";
pub const TEMPLATE_PATH: &str = ".github/PULL_REQUEST_TEMPLATE.md";
/// Head of the manifests repository base branch.
pub const BASE_SHA: &str = "9999999999999999999999999999999999999999";

pub const KUSTOMIZATION: &str = r#"images:
- name: notify-api
  newName: public.ecr.aws/cds-snc/notify-api:abcdef1
- name: notify-admin
  newName: public.ecr.aws/cds-snc/notify-admin:1234567
"#;

pub const KUSTOMIZATION_CURRENT: &str = r#"images:
- name: notify-api
  newName: public.ecr.aws/cds-snc/notify-api:1234567
- name: notify-admin
  newName: public.ecr.aws/cds-snc/notify-admin:1234567
"#;

pub const HELMFILE: &str =
    "DOCUMENTATION_IMAGE=public.ecr.aws/cds-snc/notify-documentation:abcdef1\n";

pub const TEMPLATE: &str = "# Summary | Résumé\n\n> Give details ex. Security patching, content update, more API pods etc\n\n# Test instructions\n";

/// Projects tracked by most tests: two images in the kustomization, one in
/// the helmfile overrides.
pub fn test_config() -> Config {
    create_test_config(vec![
        create_test_project(
            "notification-api",
            KUSTOMIZATION_PATH,
            "notify-api",
            PatchStrategy::Kustomize,
        ),
        create_test_project(
            "notification-admin",
            KUSTOMIZATION_PATH,
            "notify-admin",
            PatchStrategy::Kustomize,
        ),
        create_test_project(
            "notification-documentation",
            HELMFILE_PATH,
            "notify-documentation",
            PatchStrategy::ImageRef,
        ),
    ])
}

/// Commit history of every source repository: the head plus the deployed
/// `abcdef1` commit.
pub fn test_history() -> Vec<SourceCommit> {
    vec![
        create_test_commit(HEAD_SHA, "feat: new thing (#10)\n\n* details"),
        create_test_commit("bcdef12000", "fix: small fix (#9)"),
        create_test_commit("abcdef1000", "chore: deployed (#8)"),
    ]
}

/// Creates a mock forge serving `files` from the manifests repository.
/// Every source repository is at [`HEAD_SHA`] and the manifests repository
/// is at [`BASE_SHA`].
///
/// # Example
/// ```ignore
/// let mut mock_forge = mock_forge_with_files(vec![(HELMFILE_PATH, HELMFILE)]);
/// mock_forge.expect_create_pr().times(0);
/// ```
pub fn mock_forge_with_files(files: Vec<(&'static str, &'static str)>) -> MockForge {
    mock_forge_with_remote(create_test_remote_config(), files)
}

/// Same as [`mock_forge_with_files`] with a custom remote configuration.
pub fn mock_forge_with_remote(
    remote_config: RemoteConfig,
    files: Vec<(&'static str, &'static str)>,
) -> MockForge {
    let mut mock_forge = MockForge::new();

    mock_forge
        .expect_remote_config()
        .returning(move || remote_config.clone());

    mock_forge
        .expect_default_branch()
        .returning(|_, _| Ok("main".into()));

    mock_forge.expect_branch_head().returning(|req| {
        if req.repo == "notification-manifests" {
            Ok(BASE_SHA.into())
        } else {
            Ok(HEAD_SHA.into())
        }
    });

    mock_forge.expect_get_file().returning(move |req| {
        if req.path == TEMPLATE_PATH {
            return Ok(create_test_remote_file(&req.path, TEMPLATE));
        }

        files
            .iter()
            .find(|(path, _)| *path == req.path)
            .map(|(path, content)| create_test_remote_file(path, content))
            .ok_or_else(|| ManifestReleaseError::not_found(&req.repo, &req.path))
    });

    mock_forge
}

/// Mock forge serving the default kustomization and helmfile fixtures.
pub fn default_mock_forge() -> MockForge {
    mock_forge_with_files(vec![
        (KUSTOMIZATION_PATH, KUSTOMIZATION),
        (HELMFILE_PATH, HELMFILE),
    ])
}

pub fn create_test_orchestrator(mock_forge: MockForge, config: Config) -> Orchestrator {
    Orchestrator::new(
        Rc::new(config),
        Rc::new(ForgeManager::new(Box::new(mock_forge))),
    )
}
