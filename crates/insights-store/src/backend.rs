//! Byte-level storage behind the artifact store

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::StoreError;

pub trait StorageBackend {
    /// Contents of `file`, or `None` when it does not exist
    fn read(&self, file: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Replace `file` with `bytes` as a single step
    fn write(&self, file: &str, bytes: &[u8]) -> Result<(), StoreError>;

    /// Remove `file`. Removing a missing file is not an error.
    fn remove(&self, file: &str) -> Result<(), StoreError>;
}

/// Artifacts as files in one directory
#[derive(Debug, Clone)]
pub struct FsBackend {
    root: PathBuf,
}

impl FsBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, file: &str) -> PathBuf {
        self.root.join(file)
    }
}

impl StorageBackend for FsBackend {
    fn read(&self, file: &str) -> Result<Option<Vec<u8>>, StoreError> {
        match fs::read(self.path(file)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, file: &str, bytes: &[u8]) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root)?;

        // Readers see either the old file or the complete new one
        let tmp = self.path(&format!(".{file}.tmp"));
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, self.path(file))?;
        Ok(())
    }

    fn remove(&self, file: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path(file)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process backend, used by tests and one-shot runs
#[derive(Debug, Default)]
pub struct MemoryBackend {
    files: RefCell<BTreeMap<String, Vec<u8>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file_names(&self) -> Vec<String> {
        self.files.borrow().keys().cloned().collect()
    }

    /// Overwrite a file without going through the store
    pub fn tamper(&self, file: &str, bytes: &[u8]) {
        self.files.borrow_mut().insert(file.to_string(), bytes.to_vec());
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, file: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.files.borrow().get(file).cloned())
    }

    fn write(&self, file: &str, bytes: &[u8]) -> Result<(), StoreError> {
        self.files.borrow_mut().insert(file.to_string(), bytes.to_vec());
        Ok(())
    }

    fn remove(&self, file: &str) -> Result<(), StoreError> {
        self.files.borrow_mut().remove(file);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fs_backend_roundtrip() -> Result<(), StoreError> {
        let dir = tempfile::tempdir()?;
        let backend = FsBackend::new(dir.path().join("nested"));

        assert_eq!(backend.read("a.csv")?, None);
        backend.write("a.csv", b"x,y\n1,2\n")?;
        assert_eq!(backend.read("a.csv")?.as_deref(), Some(&b"x,y\n1,2\n"[..]));
        assert!(!backend.root().join(".a.csv.tmp").exists());

        backend.remove("a.csv")?;
        backend.remove("a.csv")?;
        assert_eq!(backend.read("a.csv")?, None);
        Ok(())
    }

    #[test]
    fn test_memory_backend_roundtrip() -> Result<(), StoreError> {
        let backend = MemoryBackend::new();
        backend.write("b.csv", b"1")?;
        assert_eq!(backend.file_names(), vec!["b.csv".to_string()]);
        backend.remove("b.csv")?;
        assert!(backend.read("b.csv")?.is_none());
        Ok(())
    }
}
