//! Prioritized search paths for loose asset files.

use std::path::{Path, PathBuf};

/// An ordered list of directories probed for loose files.
///
/// Order is priority: the first directory containing the file wins. The
/// resolver is a pure function over the current list and filesystem state;
/// misses are never cached, since a file may appear later.
#[derive(Debug, Default)]
pub struct SearchPaths {
    paths: Vec<PathBuf>,
}

impl SearchPaths {
    /// Create an empty search path list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a directory at the lowest priority.
    ///
    /// Duplicates are not rejected; a duplicate simply wastes a probe.
    pub fn add(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        tracing::debug!("adding search path: {}", path.display());
        self.paths.push(path);
    }

    /// The directories in priority order.
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }

    /// Resolve a filename to an existing on-disk path, first match wins.
    ///
    /// Probing follows the filesystem's own case rules, so on a
    /// case-sensitive filesystem the name must match the on-disk casing.
    /// Case-insensitive lookup is guaranteed one layer up, by cache keys
    /// and barn directories.
    pub fn resolve(&self, file_name: &str) -> Option<PathBuf> {
        self.resolve_with_extensions(file_name, &[])
    }

    /// Resolve a filename that may omit its extension.
    ///
    /// Each directory is probed in priority order; within a directory the
    /// name is tried as given, then with each candidate extension appended
    /// in the order supplied.
    pub fn resolve_with_extensions(&self, file_name: &str, extensions: &[&str]) -> Option<PathBuf> {
        for dir in &self.paths {
            let candidate = dir.join(file_name);
            if candidate.is_file() {
                return Some(candidate);
            }
            for ext in extensions {
                let candidate = dir.join(format!("{}.{}", file_name, ext));
                if candidate.is_file() {
                    return Some(candidate);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_priority_order() {
        let dir_a = tempfile::tempdir().unwrap();
        let dir_b = tempfile::tempdir().unwrap();
        fs::write(dir_a.path().join("asset.txt"), b"from a").unwrap();
        fs::write(dir_b.path().join("asset.txt"), b"from b").unwrap();

        let mut paths = SearchPaths::new();
        paths.add(dir_a.path());
        paths.add(dir_b.path());

        let resolved = paths.resolve("asset.txt").unwrap();
        assert_eq!(fs::read(resolved).unwrap(), b"from a");
    }

    #[test]
    fn test_extension_probing() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("scene.sif"), b"x").unwrap();

        let mut paths = SearchPaths::new();
        paths.add(dir.path());

        assert!(paths.resolve("scene").is_none());
        let resolved = paths
            .resolve_with_extensions("scene", &["stk", "sif"])
            .unwrap();
        assert!(resolved.ends_with("scene.sif"));
    }

    #[test]
    fn test_miss_is_not_sticky() {
        let dir = tempfile::tempdir().unwrap();
        let mut paths = SearchPaths::new();
        paths.add(dir.path());

        assert!(paths.resolve("late.txt").is_none());
        fs::write(dir.path().join("late.txt"), b"now").unwrap();
        assert!(paths.resolve("late.txt").is_some());
    }
}
