//! Content root traversal
//!
//! Walks the content root and yields every regular file whose name matches
//! the page filename, ignoring case. A symlink to a regular file counts as a
//! page; symlinked directories are never descended into.

use crate::ShelfmarkError;
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Iterator over page files below a content root
pub struct PageWalker {
    inner: walkdir::IntoIter,
    /// Lowercased page filename
    page_filename: String,
}

impl PageWalker {
    /// Starts a walk of `root`
    ///
    /// Fails up front when the root is missing or is not a directory, so a
    /// vanished root is reported as a whole-crawl failure rather than an
    /// empty crawl.
    pub fn new(root: &Path, page_filename: &str) -> Result<Self, ShelfmarkError> {
        let metadata =
            std::fs::metadata(root).map_err(|source| ShelfmarkError::ContentRootUnavailable {
                path: root.to_path_buf(),
                source,
            })?;

        if !metadata.is_dir() {
            return Err(ShelfmarkError::ContentRootUnavailable {
                path: root.to_path_buf(),
                source: std::io::Error::other("not a directory"),
            });
        }

        Ok(Self {
            inner: WalkDir::new(root).follow_links(false).into_iter(),
            page_filename: page_filename.to_lowercase(),
        })
    }

    fn is_page(&self, name: &OsStr) -> bool {
        name.to_str()
            .map(|name| name.to_lowercase() == self.page_filename)
            .unwrap_or(false)
    }
}

impl Iterator for PageWalker {
    type Item = Result<PathBuf, walkdir::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(e)),
            };

            if !self.is_page(entry.file_name()) {
                continue;
            }

            let is_file = if entry.path_is_symlink() {
                entry.path().is_file()
            } else {
                entry.file_type().is_file()
            };

            if is_file {
                return Some(Ok(entry.into_path()));
            }
        }
    }
}

/// Logical index path of `file`: relative to `root`, `/`-separated
pub fn logical_path(root: &Path, file: &Path) -> String {
    let relative = file.strip_prefix(root).unwrap_or(file);

    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn collect(root: &Path) -> Vec<String> {
        let mut pages: Vec<String> = PageWalker::new(root, "index.html")
            .unwrap()
            .map(|page| logical_path(root, &page.unwrap()))
            .collect();
        pages.sort();
        pages
    }

    #[test]
    fn test_finds_pages_case_insensitively() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("blog/2024")).unwrap();
        fs::write(root.join("index.html"), "").unwrap();
        fs::write(root.join("blog/INDEX.HTML"), "").unwrap();
        fs::write(root.join("blog/2024/Index.Html"), "").unwrap();
        fs::write(root.join("blog/2024/post.html"), "").unwrap();
        fs::write(root.join("blog/index.html.bak"), "").unwrap();

        assert_eq!(
            collect(root),
            vec!["blog/2024/Index.Html", "blog/INDEX.HTML", "index.html"]
        );
    }

    #[test]
    fn test_directory_named_like_page_is_ignored() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("index.html")).unwrap();
        fs::write(root.join("index.html/index.html"), "").unwrap();

        assert_eq!(collect(root), vec!["index.html/index.html"]);
    }

    #[test]
    fn test_unicode_page_filename_matches_any_case() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("a")).unwrap();
        fs::write(root.join("ÍNDICE.HTML"), "").unwrap();
        fs::write(root.join("a/índice.html"), "").unwrap();

        let mut pages: Vec<String> = PageWalker::new(root, "Índice.html")
            .unwrap()
            .map(|page| logical_path(root, &page.unwrap()))
            .collect();
        pages.sort();

        assert_eq!(pages, vec!["a/índice.html", "ÍNDICE.HTML"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_page_is_found() {
        use std::os::unix::fs::symlink;

        let dir = TempDir::new().unwrap();
        let root = dir.path().join("web");
        fs::create_dir_all(root.join("mirror")).unwrap();
        fs::write(root.join("shared.html"), "<title>Shared</title>").unwrap();
        symlink("../shared.html", root.join("mirror/index.html")).unwrap();

        assert_eq!(collect(&root), vec!["mirror/index.html"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_directory_is_not_descended() {
        use std::os::unix::fs::symlink;

        let dir = TempDir::new().unwrap();
        let root = dir.path().join("web");
        let outside = dir.path().join("outside");
        fs::create_dir_all(&root).unwrap();
        fs::create_dir_all(&outside).unwrap();
        fs::write(outside.join("index.html"), "").unwrap();
        symlink(&outside, root.join("linked")).unwrap();

        assert!(collect(&root).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_is_ignored() {
        use std::os::unix::fs::symlink;

        let dir = TempDir::new().unwrap();
        let root = dir.path().join("web");
        fs::create_dir_all(&root).unwrap();
        symlink("missing.html", root.join("index.html")).unwrap();

        assert!(collect(&root).is_empty());
    }

    #[test]
    fn test_missing_root_fails() {
        let dir = TempDir::new().unwrap();
        let result = PageWalker::new(&dir.path().join("missing"), "index.html");
        assert!(matches!(
            result,
            Err(ShelfmarkError::ContentRootUnavailable { .. })
        ));
    }

    #[test]
    fn test_file_root_fails() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("index.html");
        fs::write(&file, "").unwrap();
        assert!(PageWalker::new(&file, "index.html").is_err());
    }

    #[test]
    fn test_logical_path_uses_forward_slashes() {
        let root = Path::new("/srv/web");
        let file = root.join("a").join("b").join("index.html");
        assert_eq!(logical_path(root, &file), "a/b/index.html");
        assert_eq!(logical_path(root, &root.join("index.html")), "index.html");
    }
}
