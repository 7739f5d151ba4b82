//! Source collaborators
//!
//! Listing and reading schema files. Both operations swallow failures:
//! listing yields an empty list and reading yields `None`, each logged
//! here so the translation core never sees an I/O error.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

use crate::config::FileConvention;

/// Access to schema source files
pub trait SourceProvider {
    /// Schema files directly inside `dir`, in a stable order
    fn list_files(&self, dir: &Path) -> Vec<PathBuf>;

    /// Full text of `path`, or `None` if it cannot be read
    fn read(&self, path: &Path) -> Option<String>;
}

/// Filesystem-backed source
#[derive(Debug, Clone, Default)]
pub struct FsSource {
    convention: FileConvention,
}

impl FsSource {
    pub fn new(convention: FileConvention) -> Self {
        Self { convention }
    }

    pub fn convention(&self) -> FileConvention {
        self.convention
    }
}

impl SourceProvider for FsSource {
    fn list_files(&self, dir: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(dir = %dir.display(), error = %err, "failed to list schema directory");
                    return Vec::new();
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if self.convention.matches(&name) {
                files.push(entry.path().to_path_buf());
            }
        }
        files
    }

    fn read(&self, path: &Path) -> Option<String> {
        match fs::read_to_string(path) {
            Ok(text) => Some(text),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to read schema file");
                None
            }
        }
    }
}

/// In-memory source keyed by path, for pipelines that already hold the text
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: HashMap<PathBuf, String>,
    convention: FileConvention,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_convention(convention: FileConvention) -> Self {
        Self {
            files: HashMap::new(),
            convention,
        }
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, text: impl Into<String>) {
        self.files.insert(path.into(), text.into());
    }
}

impl SourceProvider for MemorySource {
    fn list_files(&self, dir: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = self
            .files
            .keys()
            .filter(|path| path.parent().unwrap_or(Path::new("")) == dir)
            .filter(|path| {
                path.file_name()
                    .map(|name| self.convention.matches(&name.to_string_lossy()))
                    .unwrap_or(false)
            })
            .cloned()
            .collect();
        files.sort();
        files
    }

    fn read(&self, path: &Path) -> Option<String> {
        let text = self.files.get(path).cloned();
        if text.is_none() {
            warn!(path = %path.display(), "schema file not found");
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fs_listing_filters_by_convention() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b-schema.cds"), "entity B {}").unwrap();
        fs::write(dir.path().join("a.cds"), "entity A {}").unwrap();
        fs::write(dir.path().join("notes.txt"), "not a schema").unwrap();
        fs::create_dir(dir.path().join("nested.cds")).unwrap();

        let plain = FsSource::new(FileConvention::Plain).list_files(dir.path());
        let names: Vec<_> = plain
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.cds", "b-schema.cds"]);

        let schema = FsSource::new(FileConvention::Schema).list_files(dir.path());
        assert_eq!(schema.len(), 1);
        assert!(schema[0].ends_with("b-schema.cds"));
    }

    #[test]
    fn test_fs_failures_are_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        let source = FsSource::default();
        assert!(source.list_files(&dir.path().join("missing")).is_empty());
        assert!(source.read(&dir.path().join("missing.cds")).is_none());
    }

    #[test]
    fn test_fs_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.cds");
        fs::write(&path, "entity A { x : Integer; }").unwrap();
        assert_eq!(FsSource::default().read(&path).as_deref(), Some("entity A { x : Integer; }"));
    }

    #[test]
    fn test_memory_source_lists_one_directory() {
        let mut source = MemorySource::new();
        source.insert("db/b.cds", "");
        source.insert("db/a.cds", "");
        source.insert("db/sub/c.cds", "");
        source.insert("srv/d.cds", "");
        assert_eq!(
            source.list_files(Path::new("db")),
            vec![PathBuf::from("db/a.cds"), PathBuf::from("db/b.cds")]
        );
        assert!(source.read(Path::new("db/zzz.cds")).is_none());
    }
}
