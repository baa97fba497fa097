//! URL slugification and link utilities.
//!
//! Converts titles to URL-safe file names and joins permalink segments.

use deunicode::deunicode;

/// Quote characters dropped before slugifying ("it's" → "its")
const QUOTE_CHARS: &[char] = &['\'', '"', '\u{2019}'];

// ============================================================================
// Slugification
// ============================================================================

/// Convert text to a lowercase, ASCII, hyphen-joined slug.
///
/// Non-ASCII characters are transliterated first, then every run of
/// non-alphanumeric characters collapses into one hyphen.
pub fn slugify(text: &str) -> String {
    let stripped: String = text.chars().filter(|c| !QUOTE_CHARS.contains(c)).collect();
    let ascii = deunicode(&stripped).to_ascii_lowercase();

    let mut slug = String::with_capacity(ascii.len());
    let mut pending_hyphen = false;
    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

// ============================================================================
// Link Utilities
// ============================================================================

/// Join permalink segments with `/`.
///
/// Empty segments and `./` prefixes are dropped. The result is rooted
/// (`/posts/hello`) unless the base is an absolute URL, which then prefixes it.
pub fn join_url(base: &str, segments: &[&str]) -> String {
    let path = segments
        .iter()
        .map(|s| clean_segment(s))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/");

    if base.contains("://") {
        let base = base.trim_end_matches('/');
        return if path.is_empty() {
            format!("{base}/")
        } else {
            format!("{base}/{path}")
        };
    }

    match clean_segment(base) {
        "" => format!("/{path}"),
        base if path.is_empty() => format!("/{base}"),
        base => format!("/{base}/{path}"),
    }
}

/// Strip `./` prefixes and surrounding slashes from one segment.
fn clean_segment(segment: &str) -> &str {
    let mut s = segment.trim();
    while let Some(rest) = s.strip_prefix("./") {
        s = rest;
    }
    if s == "." {
        s = "";
    }
    s.trim_matches('/')
}
