//! Path conventions and small filesystem helpers shared by the patcher.
//!
//! The backup and unminified siblings of a script live next to the original,
//! distinguished by a suffix inserted before the file extension. These
//! conventions are fixed, not configurable.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Insert a suffix immediately before the file extension.
///
/// `foo.js` + `.orig` → `foo.orig.js`. If the path has no extension the
/// suffix is simply appended to the file name.
pub(crate) fn add_ext_prefix(path: &Path, prefix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    match path.extension().map(|e| e.to_string_lossy()) {
        Some(ext) => path.with_file_name(format!("{stem}{prefix}.{ext}")),
        None => path.with_file_name(format!("{stem}{prefix}")),
    }
}

/// Copy a file, propagating the underlying I/O error.
pub(crate) fn copy_file(from: &Path, to: &Path) -> io::Result<()> {
    fs::copy(from, to)?;
    Ok(())
}

/// Read a file into an ordered buffer of lines (without terminators).
pub(crate) fn file_lines(path: &Path) -> io::Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    Ok(content.lines().map(str::to_owned).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ext_prefix_goes_before_extension() {
        let p = add_ext_prefix(Path::new("/steamui/libraryroot~sp.js"), ".orig");
        assert_eq!(p, PathBuf::from("/steamui/libraryroot~sp.orig.js"));
    }

    #[test]
    fn ext_prefix_unmin_suffix() {
        let p = add_ext_prefix(Path::new("foo.js"), ".unmin");
        assert_eq!(p, PathBuf::from("foo.unmin.js"));
    }

    #[test]
    fn ext_prefix_without_extension_appends() {
        let p = add_ext_prefix(Path::new("/tmp/script"), ".orig");
        assert_eq!(p, PathBuf::from("/tmp/script.orig"));
    }

    #[test]
    fn ext_prefix_keeps_parent_dir() {
        let p = add_ext_prefix(Path::new("/a/b/c.js"), ".unmin");
        assert_eq!(p.parent(), Some(Path::new("/a/b")));
    }

    #[test]
    fn file_lines_splits_on_newlines() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("f.js");
        fs::write(&path, "one\ntwo\nthree").expect("write");
        let lines = file_lines(&path).expect("file_lines");
        assert_eq!(lines, vec!["one", "two", "three"]);
    }

    #[test]
    fn file_lines_on_missing_file_is_err() {
        assert!(file_lines(Path::new("/nonexistent/nope.js")).is_err());
    }

    #[test]
    fn copy_file_copies_contents() {
        let dir = tempfile::tempdir().expect("tempdir");
        let from = dir.path().join("a.js");
        let to = dir.path().join("b.js");
        fs::write(&from, "content").expect("write");
        copy_file(&from, &to).expect("copy");
        assert_eq!(fs::read_to_string(&to).expect("read"), "content");
    }
}
