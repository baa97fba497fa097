//! `.gitignore` matching on top of gix's pattern parser.

use gix::{
    bstr::{BString, ByteSlice},
    glob::wildmatch,
};
use std::{fs, io, path::Path};

// Bits of gix::ignore::search::pattern::Mode
const MODE_NO_SUB_DIR: u32 = 1 << 0; // no slash inside the pattern: match the basename
const MODE_MUST_MATCH_DIR: u32 = 1 << 2; // trailing slash
const MODE_NEGATIVE: u32 = 1 << 3; // leading `!`
const MODE_ABSOLUTE: u32 = 1 << 4; // leading `/`

/// Patterns of one ignore file, in file order.
#[derive(Debug, Default)]
pub struct IgnoreMatcher {
    patterns: Vec<(BString, u32)>,
}

impl IgnoreMatcher {
    pub fn new(gitignore: &[u8]) -> Self {
        let patterns = gix::ignore::parse(gitignore)
            .map(|(pattern, _, _)| (pattern.text, pattern.mode.bits()))
            .collect();
        Self { patterns }
    }

    /// Load `path`; a missing file yields a matcher that ignores nothing.
    pub fn from_file(path: &Path) -> io::Result<Self> {
        match fs::read(path) {
            Ok(bytes) => Ok(Self::new(&bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(err),
        }
    }

    /// Whether `path` (relative, `/`-separated) is ignored. Last match wins.
    pub fn matches(&self, path: &str, is_dir: bool) -> bool {
        let mut ignored = false;
        for (text, mode) in &self.patterns {
            if mode & MODE_MUST_MATCH_DIR != 0 && !is_dir {
                continue;
            }

            let basename_only = mode & MODE_NO_SUB_DIR != 0 && mode & MODE_ABSOLUTE == 0;
            let candidate = if basename_only {
                path.rsplit_once('/').map_or(path, |(_, name)| name)
            } else {
                path
            };

            if wildmatch(
                text.as_bstr(),
                candidate.into(),
                wildmatch::Mode::NO_MATCH_SLASH_LITERAL,
            ) {
                ignored = mode & MODE_NEGATIVE == 0;
            }
        }
        ignored
    }
}

/// Append `dir/` to the ignore file unless a pattern already ignores it.
///
/// Returns whether the file changed.
pub fn ensure_dir_ignored(gitignore: &Path, dir: &str) -> io::Result<bool> {
    if IgnoreMatcher::from_file(gitignore)?.matches(dir, true) {
        return Ok(false);
    }

    let mut content = match fs::read_to_string(gitignore) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => String::new(),
        Err(err) => return Err(err),
    };
    if !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }
    content.push_str(dir);
    content.push_str("/\n");
    fs::write(gitignore, content)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ignore_matcher() {
        let gitignore = b"target/**\n*.log\n.DS_Store\n!important.log\nbuild/\n/root_only";
        let matcher = IgnoreMatcher::new(gitignore);

        assert!(matcher.matches("target/debug/clog", false));
        assert!(matcher.matches("error.log", false));
        assert!(matcher.matches(".DS_Store", false));
        assert!(!matcher.matches("important.log", false));

        assert!(matcher.matches("build", true));
        assert!(!matcher.matches("build", false));

        assert!(matcher.matches("root_only", false));
        assert!(!matcher.matches("src/root_only", false));
        assert!(!matcher.matches("README.md", false));
    }

    #[test]
    fn test_publish_dir_patterns() {
        for pattern in ["public/", "/public", "/public/", "public", "pub*"] {
            let matcher = IgnoreMatcher::new(pattern.as_bytes());
            assert!(matcher.matches("public", true), "pattern {pattern}");
        }

        let matcher = IgnoreMatcher::new(b"public/\n!public/");
        assert!(!matcher.matches("public", true));

        let matcher = IgnoreMatcher::new(b"# public/\nnode_modules/");
        assert!(!matcher.matches("public", true));
    }

    #[test]
    fn test_from_missing_file() {
        let dir = TempDir::new().unwrap();
        let matcher = IgnoreMatcher::from_file(&dir.path().join(".gitignore")).unwrap();
        assert!(!matcher.matches("public", true));
    }

    #[test]
    fn test_ensure_dir_ignored_appends() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".gitignore");
        fs::write(&path, "*.log").unwrap();

        assert!(ensure_dir_ignored(&path, "public").unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "*.log\npublic/\n");

        // Second call finds the pattern
        assert!(!ensure_dir_ignored(&path, "public").unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "*.log\npublic/\n");
    }

    #[test]
    fn test_ensure_dir_ignored_creates_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".gitignore");

        assert!(ensure_dir_ignored(&path, "public").unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "public/\n");
    }
}
