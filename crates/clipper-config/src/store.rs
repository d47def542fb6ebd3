//! Filesystem index of rule files

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Maps rule filenames (`example.com.txt`) to absolute paths.
///
/// Directories are scanned once at construction and the index is immutable
/// afterwards. When the same filename appears in several directories the
/// first-listed directory wins. Lookup is by exact filename only.
#[derive(Debug, Clone, Default)]
pub struct ConfigFileStore {
    files: HashMap<String, PathBuf>,
}

impl ConfigFileStore {
    pub fn new<P: AsRef<Path>>(directories: &[P]) -> Self {
        let mut files = HashMap::new();

        for dir in directories {
            let dir = dir.as_ref();
            let entries = match std::fs::read_dir(dir) {
                Ok(entries) => entries,
                Err(err) => {
                    warn!(dir = %dir.display(), error = %err, "skipping unreadable rule directory");
                    continue;
                }
            };

            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) != Some("txt") {
                    continue;
                }
                let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                    continue;
                };
                // first-listed directory wins
                files.entry(name.to_string()).or_insert(path.clone());
            }
        }

        debug!(count = files.len(), "rule file index built");
        Self { files }
    }

    pub fn get(&self, filename: &str) -> Option<&Path> {
        self.files.get(filename).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn indexes_txt_files_only() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("example.com.txt"), "title: //h1\n").unwrap();
        std::fs::write(dir.path().join("notes.md"), "ignored").unwrap();

        let store = ConfigFileStore::new(&[dir.path()]);
        assert_eq!(store.len(), 1);
        assert!(store.get("example.com.txt").is_some());
        assert!(store.get("notes.md").is_none());
    }

    #[test]
    fn first_listed_directory_wins() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        std::fs::write(first.path().join("example.com.txt"), "title: //h1\n").unwrap();
        std::fs::write(second.path().join("example.com.txt"), "title: //h2\n").unwrap();

        let store = ConfigFileStore::new(&[first.path(), second.path()]);
        let path = store.get("example.com.txt").unwrap();
        assert!(path.starts_with(first.path()));
    }

    #[test]
    fn missing_directory_is_not_fatal() {
        let store = ConfigFileStore::new(&[Path::new("/nonexistent/rules")]);
        assert!(store.is_empty());
    }
}
