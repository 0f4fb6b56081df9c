use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::{ManifestReleaseError, Result};

/// How the image reference of a project is located inside its manifest.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatchStrategy {
    /// Parse the file as a kustomization and update the matching entry of
    /// its `images` list.
    #[default]
    Kustomize,
    /// Replace the tag of every `<image_name>:<tag>` occurrence in the text.
    ImageRef,
}

/// A tracked service or lambda whose image tag lives in the manifests
/// repository.
#[derive(
    Debug, Default, Clone, PartialEq, Serialize, Deserialize, Builder,
)]
#[serde(default)]
#[builder(setter(into), default)]
pub struct ProjectConfig {
    /// Source repository name.
    pub repo: String,
    /// Owner of the source repository (defaults to the manifests owner).
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(setter(into, strip_option))]
    pub owner: Option<String>,
    /// Branch to follow (defaults to the repository's default branch).
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(setter(into, strip_option))]
    pub branch: Option<String>,
    /// Manifest path relative to the manifests repository root.
    pub manifest_file: String,
    /// Container registry URL prefix, e.g. `public.ecr.aws/cds-snc`.
    pub registry_url: String,
    /// Image name to match inside the manifest.
    pub image_name: String,
    /// How the image reference is located.
    pub strategy: PatchStrategy,
}

impl ProjectConfig {
    pub fn validate(&self) -> Result<()> {
        if self.repo.is_empty() {
            return Err(ManifestReleaseError::invalid_config(
                "project repo must not be empty",
            ));
        }

        if self.manifest_file.is_empty() {
            return Err(ManifestReleaseError::invalid_config(format!(
                "project {}: manifest_file must not be empty",
                self.repo
            )));
        }

        if self.image_name.is_empty() {
            return Err(ManifestReleaseError::invalid_config(format!(
                "project {}: image_name must not be empty",
                self.repo
            )));
        }

        if self.strategy == PatchStrategy::Kustomize
            && self.registry_url.is_empty()
        {
            return Err(ManifestReleaseError::invalid_config(format!(
                "project {}: kustomize strategy requires registry_url",
                self.repo
            )));
        }

        Ok(())
    }
}
