use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
#[cfg(test)]
use std::{
    collections::{HashMap, HashSet},
    path::PathBuf,
    sync::{Arc, RwLock},
};

use tempfile::NamedTempFile;

/// Trait for filesystem operations to enable testing with mocks
pub trait FileSystem: Send + Sync {
    /// Read file contents as string
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Replace the file at `path` with `contents`.
    ///
    /// Readers observe either the previous file or the complete new one.
    fn write(&self, path: &Path, contents: &str) -> Result<()>;
}

/// Real filesystem implementation using std::fs
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))
    }

    fn write(&self, path: &Path, contents: &str) -> Result<()> {
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        // Ensure parent directory exists
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create parent directory: {:?}", parent))?;

        // Temp file in the same directory so the final rename stays on one filesystem
        let mut temp_file = NamedTempFile::new_in(parent)
            .with_context(|| format!("Failed to create temp file in: {:?}", parent))?;
        temp_file
            .write_all(contents.as_bytes())
            .with_context(|| format!("Failed to write temp file for: {:?}", path))?;
        temp_file
            .as_file()
            .sync_all()
            .with_context(|| format!("Failed to sync temp file for: {:?}", path))?;

        temp_file
            .persist(path)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to write file: {:?}", path))?;

        Ok(())
    }
}

/// Mock filesystem implementation for testing (in-memory)
#[cfg(test)]
pub struct MockFileSystem {
    files: Arc<RwLock<HashMap<PathBuf, String>>>,
    fail_writes: bool,
    fail_paths: HashSet<PathBuf>,
}

#[cfg(test)]
impl MockFileSystem {
    /// Create new empty mock filesystem
    pub fn new() -> Self {
        Self {
            files: Arc::new(RwLock::new(HashMap::new())),
            fail_writes: false,
            fail_paths: HashSet::new(),
        }
    }

    /// Make every write fail, as on a read-only destination
    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    /// Make writes to one path fail while other paths keep working
    pub fn failing_writes_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.fail_paths.insert(path.into());
        self
    }

    /// Get captured file contents for testing assertions
    pub fn get_file_contents(&self, path: &Path) -> Option<String> {
        self.files.read().unwrap().get(path).cloned()
    }

    /// Check if file was written
    pub fn has_file(&self, path: &Path) -> bool {
        self.files.read().unwrap().contains_key(path)
    }
}

#[cfg(test)]
impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.files
            .read()
            .unwrap()
            .get(path)
            .cloned()
            .with_context(|| format!("File not found in mock filesystem: {:?}", path))
    }

    fn write(&self, path: &Path, contents: &str) -> Result<()> {
        if self.fail_writes || self.fail_paths.contains(path) {
            anyhow::bail!("Read-only mock filesystem: {:?}", path);
        }

        self.files
            .write()
            .unwrap()
            .insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_real_write_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("imports.hcl");
        std::fs::write(&path, "old").unwrap();

        RealFileSystem.write(&path, "new contents\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new contents\n");
        let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_real_write_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out").join("imports.hcl");

        RealFileSystem.write(&path, "").unwrap();

        assert!(path.is_file());
    }

    #[test]
    fn test_real_write_failure_keeps_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("imports.hcl");
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("keep"), "x").unwrap();

        assert!(RealFileSystem.write(&target, "new").is_err());
        assert!(target.join("keep").is_file());
    }

    #[test]
    fn test_mock_round_trip() {
        let fs = MockFileSystem::new();
        let path = PathBuf::from("/a/b.txt");

        fs.write(&path, "hello").unwrap();
        assert_eq!(fs.read_to_string(&path).unwrap(), "hello");
        assert!(fs.read_to_string(Path::new("/missing")).is_err());
    }
}
