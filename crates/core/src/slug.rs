//! Slug derivation for products and categories.
//!
//! Slugs are derived from the entity name and must be unique per table.
//! The repository layer supplies the slugs already taken for a base; this
//! module picks the first free `base`, `base-2`, `base-3`, ... candidate.
//! Every slug fits the `VARCHAR(255)` column, suffix included.

use std::collections::HashSet;

use deunicode::deunicode;

/// Longest slug the tables accept.
pub const MAX_SLUG_LEN: usize = 255;

/// Room kept after the stem for `-` plus the digits of any `u32`.
const SUFFIX_RESERVE: usize = 11;

/// Generate a URL-safe slug from a name.
///
/// Transliterates to ASCII, converts to lowercase, replaces spaces and
/// special characters with hyphens, collapses consecutive hyphens, trims
/// leading/trailing hyphens, and cuts the result to [`MAX_SLUG_LEN`].
/// Empty when the name has nothing to transliterate.
pub fn generate_slug(name: &str) -> String {
    let ascii = deunicode(name);
    let mut result = String::with_capacity(ascii.len());
    let mut prev_hyphen = false;

    for c in ascii.to_ascii_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            result.push(c);
            prev_hyphen = false;
        } else if !prev_hyphen {
            result.push('-');
            prev_hyphen = true;
        }
    }

    truncate(result.trim_matches('-'), MAX_SLUG_LEN).to_string()
}

/// [`generate_slug`], or `fallback` when the name yields an empty slug.
pub fn slug_base(name: &str, fallback: &str) -> String {
    let slug = generate_slug(name);
    if slug.is_empty() {
        fallback.to_string()
    } else {
        slug
    }
}

/// The part of `base` that numeric suffixes are appended to.
///
/// Equal to `base` unless it is too long to take a suffix.
pub fn suffix_stem(base: &str) -> &str {
    truncate(base, MAX_SLUG_LEN - SUFFIX_RESERVE)
}

/// Pick the first slug derived from `base` that is not in `taken`.
///
/// `taken` is typically every slug in the table equal to `base` or starting
/// with `{suffix_stem(base)}-`, trashed rows included.
pub fn next_free_slug(base: &str, taken: &[String]) -> String {
    let taken: HashSet<&str> = taken.iter().map(String::as_str).collect();
    if !taken.contains(base) {
        return base.to_string();
    }

    let stem = suffix_stem(base);
    (2u32..)
        .map(|n| format!("{stem}-{n}"))
        .find(|candidate| !taken.contains(candidate.as_str()))
        .unwrap_or_else(|| base.to_string())
}

/// Cut a slug to at most `max` characters without leaving a trailing hyphen.
fn truncate(slug: &str, max: usize) -> &str {
    match slug.char_indices().nth(max) {
        Some((end, _)) => slug[..end].trim_end_matches('-'),
        None => slug,
    }
}
