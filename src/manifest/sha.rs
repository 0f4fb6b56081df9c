//! Short commit identifiers used as image tags.

/// Number of characters of a commit SHA used as an image tag.
pub const SHORT_SHA_LEN: usize = 7;

/// Returns the first seven characters of a commit SHA, or the whole value
/// when it is shorter.
pub fn short_sha(full: &str) -> &str {
    match full.char_indices().nth(SHORT_SHA_LEN) {
        Some((idx, _)) => &full[..idx],
        None => full,
    }
}

/// Whether `full` is the commit identified by the (possibly abbreviated)
/// `short` SHA.
pub fn sha_matches(full: &str, short: &str) -> bool {
    !short.is_empty() && full.starts_with(short)
}

/// Returns the tag portion of an image reference (text after the last `:`).
pub fn image_tag(image: &str) -> &str {
    image.rsplit(':').next().unwrap_or(image)
}
