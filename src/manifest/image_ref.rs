//! Plain text image reference patching for files where the image is not at
//! a fixed structural key (helmfile overrides, lambda image lists, ...).
use regex::{Captures, Regex};

use crate::{ManifestReleaseError, Result};

/// Builds the matcher for `<image_name>:<tag>`. The image name must be
/// preceded by start of line, `/`, whitespace, a quote, `=`, `[`, `,` or
/// `(` so that `notify-api` never matches inside `other-notify-api`.
fn image_ref_regex(image_name: &str) -> Result<Regex> {
    let pattern = format!(
        r#"(?m)(?<lead>^|[/\s"'=\[,(])(?<name>{}):(?<tag>[A-Za-z0-9][A-Za-z0-9_.\-]*)"#,
        regex::escape(image_name)
    );
    Ok(Regex::new(&pattern)?)
}

/// Returns the tag currently recorded for `image_name` in `content`. The
/// first occurrence wins.
pub fn extract_tag(content: &str, image_name: &str, path: &str) -> Result<String> {
    let re = image_ref_regex(image_name)?;

    re.captures(content)
        .and_then(|caps| caps.name("tag"))
        .map(|tag| tag.as_str().to_string())
        .ok_or_else(|| ManifestReleaseError::pattern_mismatch(image_name, path))
}

/// Replaces the tag of every `<image_name>:<tag>` occurrence with `new_tag`
/// leaving all other text untouched.
pub fn replace_tag(
    content: &str,
    image_name: &str,
    new_tag: &str,
) -> Result<String> {
    let re = image_ref_regex(image_name)?;

    let replaced = re.replace_all(content, |caps: &Captures| {
        format!("{}{}:{}", &caps["lead"], &caps["name"], new_tag)
    });

    Ok(replaced.into_owned())
}
