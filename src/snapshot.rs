//! Read-only view of a project directory tree
//!
//! A [`ProjectSnapshot`] walks the tree lazily: directories are listed one at a
//! time in pre-order (a parent before its children, siblings sorted by name),
//! so a classifier that stops at the first match only pays for what it reads.

use crate::fs::FileSystem;
use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Files directly inside one directory of the project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirListing {
    pub path: PathBuf,
    /// File names, sorted
    pub files: Vec<String>,
    /// Child directories, sorted by name
    pub subdirs: Vec<PathBuf>,
}

impl DirListing {
    pub fn has_file(&self, name: &str) -> bool {
        self.files.iter().any(|f| f == name)
    }

    pub fn has_extension(&self, extension: &str) -> bool {
        self.first_with_extension(extension).is_some()
    }

    /// First file (by name) ending in `.<extension>`
    pub fn first_with_extension(&self, extension: &str) -> Option<&str> {
        let suffix = format!(".{}", extension);
        self.files
            .iter()
            .map(String::as_str)
            .find(|f| f.ends_with(&suffix))
    }

    pub fn file_path(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

/// Project tree rooted at a caller-supplied directory
pub struct ProjectSnapshot<'a> {
    root: PathBuf,
    fs: &'a dyn FileSystem,
}

impl<'a> ProjectSnapshot<'a> {
    pub fn new(root: impl Into<PathBuf>, fs: &'a dyn FileSystem) -> Self {
        Self {
            root: root.into(),
            fs,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Pre-order walk over every readable directory
    pub fn directories(&self) -> DirectoryWalk<'a> {
        DirectoryWalk {
            fs: self.fs,
            pending: vec![self.root.clone()],
        }
    }

    /// Listing of the root directory only
    pub fn root_listing(&self) -> Result<DirListing> {
        list_directory(self.fs, &self.root)
    }

    pub fn read_file(&self, path: &Path) -> Result<String> {
        self.fs.read_to_string(path)
    }
}

impl std::fmt::Debug for ProjectSnapshot<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectSnapshot")
            .field("root", &self.root)
            .finish()
    }
}

/// Lazy pre-order directory iterator; unreadable directories are skipped
pub struct DirectoryWalk<'a> {
    fs: &'a dyn FileSystem,
    pending: Vec<PathBuf>,
}

impl Iterator for DirectoryWalk<'_> {
    type Item = DirListing;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(dir) = self.pending.pop() {
            match list_directory(self.fs, &dir) {
                Ok(listing) => {
                    self.pending.extend(listing.subdirs.iter().rev().cloned());
                    return Some(listing);
                }
                Err(e) => {
                    warn!(dir = %dir.display(), error = %e, "Skipping unreadable directory");
                }
            }
        }
        None
    }
}

fn list_directory(fs: &dyn FileSystem, dir: &Path) -> Result<DirListing> {
    let mut entries = fs.read_dir(dir)?;
    entries.sort_by(|a, b| a.name.cmp(&b.name));

    let mut files = Vec::new();
    let mut subdirs = Vec::new();
    for entry in entries {
        if entry.is_dir() {
            subdirs.push(entry.path);
        } else if entry.is_file() {
            files.push(entry.name);
        }
    }

    Ok(DirListing {
        path: dir.to_path_buf(),
        files,
        subdirs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;

    fn walk_order(fs: &MockFileSystem) -> Vec<PathBuf> {
        ProjectSnapshot::new("/mock", fs)
            .directories()
            .map(|d| d.path)
            .collect()
    }

    #[test]
    fn test_pre_order_walk() {
        let fs = MockFileSystem::new();
        fs.add_file("b/inner/x.txt", "");
        fs.add_file("a/y.txt", "");
        fs.add_file("a/deep/z.txt", "");
        fs.add_file("root.txt", "");

        assert_eq!(
            walk_order(&fs),
            vec![
                PathBuf::from("/mock"),
                PathBuf::from("/mock/a"),
                PathBuf::from("/mock/a/deep"),
                PathBuf::from("/mock/b"),
                PathBuf::from("/mock/b/inner"),
            ]
        );
    }

    #[test]
    fn test_listing_sorted() {
        let fs = MockFileSystem::new();
        fs.add_file("zeta.js", "");
        fs.add_file("alpha.html", "");
        fs.add_dir("src");

        let listing = ProjectSnapshot::new("/mock", &fs).root_listing().unwrap();
        assert_eq!(listing.files, vec!["alpha.html", "zeta.js"]);
        assert_eq!(listing.subdirs, vec![PathBuf::from("/mock/src")]);
    }

    #[test]
    fn test_extension_helpers() {
        let listing = DirListing {
            path: PathBuf::from("/p"),
            files: vec!["B.csproj".to_string(), "a.csproj".to_string()],
            subdirs: vec![],
        };
        assert!(listing.has_extension("csproj"));
        assert!(!listing.has_extension("java"));
        assert_eq!(listing.first_with_extension("csproj"), Some("B.csproj"));
        assert_eq!(listing.file_path("a.csproj"), PathBuf::from("/p/a.csproj"));
    }

    #[test]
    fn test_missing_root_yields_nothing() {
        let fs = MockFileSystem::new();
        let snapshot = ProjectSnapshot::new("/elsewhere", &fs);
        assert_eq!(snapshot.directories().count(), 0);
        assert!(snapshot.root_listing().is_err());
    }
}
