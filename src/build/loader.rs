//! Where unit inputs come from.

use std::io;
use std::path::PathBuf;

/// Reads source documents by cookbook-relative path.
pub trait SourceLoader: Sync {
    fn load(&self, path: &str) -> io::Result<String>;
}

/// Loads from a directory on disk, usually the cookbook's own.
#[derive(Debug, Clone)]
pub struct FsLoader {
    root: PathBuf,
}

impl FsLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

impl SourceLoader for FsLoader {
    fn load(&self, path: &str) -> io::Result<String> {
        std::fs::read_to_string(self.resolve(path))
    }
}

/// In-memory sources for tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryLoader(rustc_hash::FxHashMap<String, String>);

#[cfg(test)]
impl MemoryLoader {
    pub fn with(mut self, path: &str, text: &str) -> Self {
        self.0.insert(path.to_string(), text.to_string());
        self
    }
}

#[cfg(test)]
impl SourceLoader for MemoryLoader {
    fn load(&self, path: &str) -> io::Result<String> {
        self.0
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_fs_loader_reads_relative_paths() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("badges")).unwrap();
        std::fs::write(dir.path().join("badges/plus.svg"), "<svg/>").unwrap();

        let loader = FsLoader::new(dir.path());
        assert_eq!(loader.load("badges/plus.svg").unwrap(), "<svg/>");
        let err = loader.load("badges/minus.svg").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
