//! Where media bytes come from.
//!
//! Fetching is a collaborator concern: the loader only asks a `MediaSource` for
//! the bytes behind a URL. Networking lives outside this crate.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use super::decoder::LoaderError;

/// Provides raw bytes for a media URL.
pub trait MediaSource: Send + Sync {
    /// Fetch the bytes behind `url`.
    fn fetch(&self, url: &str) -> Result<Vec<u8>, LoaderError>;
}

/// Serves media from a local directory.
///
/// URLs are mapped by their path component, so `https://cdn/x/pano.jpg` and
/// `x/pano.jpg` both resolve to `<root>/x/pano.jpg`.
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    /// Create a source rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a URL to a path under the root. Parent-directory components are rejected.
    pub fn resolve(&self, url: &str) -> Result<PathBuf, LoaderError> {
        let without_query = url.split(['?', '#']).next().unwrap_or(url);
        let path_part = match without_query.split_once("://") {
            // Drop scheme and host
            Some((_, rest)) => rest.split_once('/').map(|(_, p)| p).unwrap_or(""),
            None => without_query,
        };

        let relative = Path::new(path_part.trim_start_matches('/'));
        if relative.as_os_str().is_empty() {
            return Err(LoaderError::new(format!("URL has no path: {}", url)).with_loader("file"));
        }
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(
                LoaderError::new(format!("URL escapes media root: {}", url)).with_loader("file")
            );
        }

        Ok(self.root.join(relative))
    }
}

impl MediaSource for FileSource {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, LoaderError> {
        let path = self.resolve(url)?;
        std::fs::read(&path).map_err(|e| {
            LoaderError::new(format!("Failed to read {:?}: {}", path, e)).with_loader("file")
        })
    }
}

/// Serves media from memory, keyed by exact URL.
#[derive(Default)]
pub struct MemorySource {
    entries: HashMap<String, Vec<u8>>,
}

impl MemorySource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry (builder style).
    pub fn with(mut self, url: &str, data: Vec<u8>) -> Self {
        self.insert(url, data);
        self
    }

    /// Add or replace an entry.
    pub fn insert(&mut self, url: &str, data: Vec<u8>) {
        self.entries.insert(url.to_string(), data);
    }
}

impl MediaSource for MemorySource {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, LoaderError> {
        self.entries
            .get(url)
            .cloned()
            .ok_or_else(|| LoaderError::new(format!("Not found: {}", url)).with_loader("memory"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_strips_scheme_host_and_query() {
        let source = FileSource::new("/media");
        assert_eq!(
            source.resolve("https://cdn.example.com/pano/a.jpg?v=2").unwrap(),
            PathBuf::from("/media/pano/a.jpg")
        );
        assert_eq!(
            source.resolve("/pano/b.jpg").unwrap(),
            PathBuf::from("/media/pano/b.jpg")
        );
        assert_eq!(
            source.resolve("c.mp4").unwrap(),
            PathBuf::from("/media/c.mp4")
        );
    }

    #[test]
    fn test_resolve_rejects_escapes_and_empty() {
        let source = FileSource::new("/media");
        assert!(source.resolve("../etc/passwd").is_err());
        assert!(source.resolve("https://cdn.example.com").is_err());
        assert!(source.resolve("").is_err());
    }

    #[test]
    fn test_file_source_reads_files() {
        let dir = std::env::temp_dir().join(format!("vrtour-source-{}", std::process::id()));
        std::fs::create_dir_all(dir.join("pano")).unwrap();
        std::fs::write(dir.join("pano").join("a.bin"), [1u8, 2, 3]).unwrap();

        let source = FileSource::new(&dir);
        assert_eq!(source.fetch("pano/a.bin").unwrap(), vec![1, 2, 3]);
        let err = source.fetch("pano/missing.bin").unwrap_err();
        assert_eq!(err.loader_id, Some("file"));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_memory_source() {
        let source = MemorySource::new().with("a.jpg", vec![9, 9]);
        assert_eq!(source.fetch("a.jpg").unwrap(), vec![9, 9]);
        assert!(source.fetch("b.jpg").is_err());
    }
}
