//! Structured patching of the `images` list in kustomization files.
use serde_yaml::Value;

use crate::{ManifestReleaseError, Result, manifest::sha::image_tag};

const IMAGES_KEY: &str = "images";
const NAME_KEY: &str = "name";
const NEW_NAME_KEY: &str = "newName";
const NEW_TAG_KEY: &str = "newTag";

/// Outcome of updating one image in a kustomization document.
#[derive(Debug, Clone, PartialEq)]
pub struct KustomizeUpdate {
    /// Rendered document. Identical to the input when nothing changed.
    pub content: String,
    /// Image reference recorded before the update.
    pub old_image: String,
    /// Tag recorded before the update.
    pub old_tag: String,
}

/// Repository part of an image reference, without its tag. A `:` followed
/// by a `/` separates a registry port, not a tag.
fn image_repository(image: &str) -> &str {
    match image.rsplit_once(':') {
        Some((repository, tag)) if !tag.contains('/') => repository,
        _ => image,
    }
}

/// An entry belongs to `image_name` when its `name` is exactly the image
/// name, or when the last path segment of its `newName` repository is.
fn is_entry_for(name: Option<&str>, new_name: &str, image_name: &str) -> bool {
    if name == Some(image_name) {
        return true;
    }

    let repository = image_repository(new_name);

    repository == image_name
        || repository
            .strip_suffix(image_name)
            .is_some_and(|prefix| prefix.ends_with('/'))
}

/// Points every `images` entry of `image_name` at
/// `<registry_url>/<image_name>:<tag>`. Entries that carry a separate
/// `newTag` keep their `newName` and get the tag written to `newTag`.
pub fn update_image(
    content: &str,
    image_name: &str,
    registry_url: &str,
    tag: &str,
    path: &str,
) -> Result<KustomizeUpdate> {
    let mut doc: Value = serde_yaml::from_str(content)?;

    let images = doc
        .get_mut(IMAGES_KEY)
        .and_then(Value::as_sequence_mut)
        .ok_or_else(|| ManifestReleaseError::pattern_mismatch(image_name, path))?;

    let new_image = format!("{registry_url}/{image_name}:{tag}");
    let mut previous: Option<(String, String)> = None;
    let mut changed = false;

    for entry in images.iter_mut() {
        let Some(mapping) = entry.as_mapping_mut() else {
            continue;
        };

        let Some(current_name) = mapping
            .get(NEW_NAME_KEY)
            .and_then(Value::as_str)
            .map(str::to_string)
        else {
            continue;
        };

        let name = mapping.get(NAME_KEY).and_then(Value::as_str);

        if !is_entry_for(name, &current_name, image_name) {
            continue;
        }

        let current_tag = mapping
            .get(NEW_TAG_KEY)
            .and_then(|t| match t {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            });

        let (old_image, old_tag) = match current_tag {
            Some(old_tag) => {
                if old_tag != tag {
                    mapping.insert(
                        Value::String(NEW_TAG_KEY.into()),
                        Value::String(tag.into()),
                    );
                    changed = true;
                }
                (format!("{current_name}:{old_tag}"), old_tag)
            }
            None => {
                if current_name != new_image {
                    mapping.insert(
                        Value::String(NEW_NAME_KEY.into()),
                        Value::String(new_image.clone()),
                    );
                    changed = true;
                }
                let old_tag = image_tag(&current_name).to_string();
                (current_name, old_tag)
            }
        };

        if previous.is_none() {
            previous = Some((old_image, old_tag));
        }
    }

    let (old_image, old_tag) = previous
        .ok_or_else(|| ManifestReleaseError::pattern_mismatch(image_name, path))?;

    let content = if changed {
        serde_yaml::to_string(&doc)?
    } else {
        content.to_string()
    };

    Ok(KustomizeUpdate {
        content,
        old_image,
        old_tag,
    })
}
