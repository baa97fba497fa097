//! Directory copy and cleanup helpers.

use std::{fs, io, path::Path};
use walkdir::WalkDir;

/// Recursively copy `src` into `dst`, creating directories as needed.
///
/// Returns the number of files copied.
pub fn copy_dir_all(src: &Path, dst: &Path) -> io::Result<usize> {
    let mut copied = 0;
    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry?;
        let rel = entry.path().strip_prefix(src).map_err(io::Error::other)?;
        let target = dst.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Remove every entry of `dir` except those named in `keep`.
pub fn clear_dir_except(dir: &Path, keep: &[&str]) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if keep.iter().any(|name| entry.file_name() == *name) {
            continue;
        }
        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(entry.path())?;
        } else {
            fs::remove_file(entry.path())?;
        }
    }
    Ok(())
}

/// Remove a directory tree; a missing directory is not an error.
pub fn remove_dir_if_exists(dir: &Path) -> io::Result<()> {
    match fs::remove_dir_all(dir) {
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_copy_dir_all() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("static");
        fs::create_dir_all(src.join("css")).unwrap();
        fs::write(src.join("css/style.css"), "body {}").unwrap();
        fs::write(src.join("favicon.ico"), [0u8, 1]).unwrap();

        let dst = dir.path().join("public/static");
        assert_eq!(copy_dir_all(&src, &dst).unwrap(), 2);
        assert_eq!(
            fs::read_to_string(dst.join("css/style.css")).unwrap(),
            "body {}"
        );
        assert_eq!(fs::read(dst.join("favicon.ico")).unwrap(), [0u8, 1]);
    }

    #[test]
    fn test_clear_dir_except() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(".git/objects")).unwrap();
        fs::create_dir_all(dir.path().join("posts/a")).unwrap();
        fs::write(dir.path().join("index.html"), "old").unwrap();

        clear_dir_except(dir.path(), &[".git"]).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, [".git"]);
        assert!(dir.path().join(".git/objects").is_dir());
    }

    #[test]
    fn test_remove_dir_if_exists() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("gone");
        remove_dir_if_exists(&target).unwrap();

        fs::create_dir_all(target.join("nested")).unwrap();
        remove_dir_if_exists(&target).unwrap();
        assert!(!target.exists());
    }
}
