//! Slug derivation for categories and genres.

/// Maximum stored slug length.
pub const MAX_SLUG_LEN: usize = 50;

/// Derive a URL-safe slug from a display name: lowercase ASCII
/// alphanumerics with single dashes, trimmed and truncated.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true; // suppress a leading dash
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
        if slug.len() >= MAX_SLUG_LEN {
            break;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Whether an explicitly supplied slug is acceptable as stored:
/// non-empty, at most [`MAX_SLUG_LEN`] bytes, ASCII letters, digits,
/// dashes and underscores only. Everything [`slugify`] produces passes.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.len() <= MAX_SLUG_LEN
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_dashes() {
        assert_eq!(slugify("Film"), "film");
        assert_eq!(slugify("Science Fiction"), "science-fiction");
        assert_eq!(slugify("Rock & Roll"), "rock-roll");
    }

    #[test]
    fn trims_and_collapses_separators() {
        assert_eq!(slugify("  spaced   out  "), "spaced-out");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn truncates_long_names() {
        let long = "x".repeat(200);
        assert_eq!(slugify(&long).len(), MAX_SLUG_LEN);
    }

    #[test]
    fn validates_explicit_slugs() {
        assert!(is_valid_slug("sci-fi"));
        assert!(is_valid_slug("top_10"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("has space"));
        assert!(!is_valid_slug("caf\u{e9}"));
        assert!(!is_valid_slug(&"a".repeat(MAX_SLUG_LEN + 1)));
        assert!(is_valid_slug(&slugify("Rock & Roll, Vol. 2")));
    }
}
