//! Rewriting image tags inside manifest files and detecting whether the
//! rendered content actually changed.
use log::*;
use serde::Serialize;

use crate::{
    Result,
    config::project::{PatchStrategy, ProjectConfig},
    forge::request::RemoteFile,
};

/// Plain text `<image>:<tag>` substitution.
pub mod image_ref;
/// Structured `images` updates for kustomization files.
pub mod kustomize;
/// Short SHA helpers.
pub mod sha;

use sha::{sha_matches, short_sha};

/// A tracked project with the references resolved during a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedProject {
    #[serde(flatten)]
    pub project: ProjectConfig,
    /// Head commit of the source repository.
    pub head_sha: String,
    /// Tag recorded in the manifest before this run.
    pub old_sha: String,
    /// Image reference after this run.
    pub head_url: String,
    /// Image reference before this run.
    pub old_url: String,
}

impl ResolvedProject {
    pub fn short_sha(&self) -> &str {
        short_sha(&self.head_sha)
    }

    /// Whether the manifest pointed at a different commit than the head.
    /// A longer tag of the head commit is not outdated.
    pub fn is_outdated(&self) -> bool {
        !sha_matches(&self.head_sha, &self.old_sha)
    }

    /// Whether the recorded tag text differs from the new short SHA.
    pub fn is_retagged(&self) -> bool {
        self.short_sha() != self.old_sha
    }
}

/// Original and re-rendered content of one manifest file.
#[derive(Debug, Clone, Serialize)]
pub struct ManifestFileChange {
    pub path: String,
    #[serde(skip)]
    pub original: RemoteFile,
    pub content: String,
    pub projects: Vec<ResolvedProject>,
    pub changed: bool,
}

/// Compares rendered manifests ignoring surrounding whitespace.
pub fn has_changed(old: &str, new: &str) -> bool {
    old.trim() != new.trim()
}

fn image_url(registry_url: &str, image_name: &str, tag: &str) -> String {
    if registry_url.is_empty() {
        format!("{image_name}:{tag}")
    } else {
        format!("{registry_url}/{image_name}:{tag}")
    }
}

/// Points a single project's image at `head_sha` within `content`.
pub fn patch_project(
    content: &str,
    path: &str,
    project: &ProjectConfig,
    head_sha: &str,
) -> Result<(String, ResolvedProject)> {
    let tag = short_sha(head_sha);

    let (content, old_sha, old_url) = match project.strategy {
        PatchStrategy::Kustomize => {
            let update = kustomize::update_image(
                content,
                &project.image_name,
                &project.registry_url,
                tag,
                path,
            )?;
            (update.content, update.old_tag, update.old_image)
        }
        PatchStrategy::ImageRef => {
            let old_tag =
                image_ref::extract_tag(content, &project.image_name, path)?;
            let updated =
                image_ref::replace_tag(content, &project.image_name, tag)?;
            let old_url =
                image_url(&project.registry_url, &project.image_name, &old_tag);
            (updated, old_tag, old_url)
        }
    };

    let resolved = ResolvedProject {
        project: project.clone(),
        head_sha: head_sha.to_string(),
        old_sha,
        head_url: image_url(&project.registry_url, &project.image_name, tag),
        old_url,
    };

    Ok((content, resolved))
}

/// Applies every project targeting `file`, in order, and records whether
/// the result differs from what is stored remotely.
pub fn patch_file(
    file: RemoteFile,
    projects: &[(ProjectConfig, String)],
) -> Result<ManifestFileChange> {
    let mut content = file.content.clone();
    let mut resolved = vec![];

    for (project, head_sha) in projects.iter() {
        let (updated, project) =
            patch_project(&content, &file.path, project, head_sha)?;

        debug!(
            "{}: {} -> {}",
            file.path, project.old_url, project.head_url
        );

        content = updated;
        resolved.push(project);
    }

    let changed = has_changed(&file.content, &content);

    if changed {
        info!("manifest {} has new image tags", file.path);
    } else {
        info!("manifest {} is up to date", file.path);
    }

    Ok(ManifestFileChange {
        path: file.path.clone(),
        original: file,
        content,
        projects: resolved,
        changed,
    })
}
