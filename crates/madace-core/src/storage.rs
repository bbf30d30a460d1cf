//! Storage abstraction for durable state documents.
//!
//! The workflow engine and the story state machine persist through this
//! trait instead of touching the filesystem directly, so a caller can
//! swap in a locking or transactional store later without touching
//! engine logic. `FsStateStore` is the plain-file implementation; it has
//! no cross-process locking — two processes writing the same path can
//! still clobber each other. `compare_and_swap` gives single-process
//! callers an optimistic check against stale writes.

use std::path::Path;

use crate::error::CoreError;

/// Read/write/remove plus an optimistic compare-and-swap over named
/// documents.
pub trait StateStore {
    /// Read a document; `Ok(None)` when it does not exist.
    fn read(&self, path: &Path) -> Result<Option<String>, CoreError>;

    fn write(&self, path: &Path, content: &str) -> Result<(), CoreError>;

    /// Remove a document; removing a missing document is not an error.
    fn remove(&self, path: &Path) -> Result<(), CoreError>;

    /// Write `new` only if the current content equals `expected`
    /// (`None` = document must not exist). Returns whether the swap
    /// happened.
    fn compare_and_swap(
        &self,
        path: &Path,
        expected: Option<&str>,
        new: &str,
    ) -> Result<bool, CoreError> {
        let current = self.read(path)?;
        if current.as_deref() != expected {
            return Ok(false);
        }
        self.write(path, new)?;
        Ok(true)
    }
}

/// Plain-file store. Parent directories are created on write.
#[derive(Debug, Clone, Default)]
pub struct FsStateStore;

impl StateStore for FsStateStore {
    fn read(&self, path: &Path) -> Result<Option<String>, CoreError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CoreError::io(path, e)),
        }
    }

    fn write(&self, path: &Path, content: &str) -> Result<(), CoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| CoreError::io(parent, e))?;
            }
        }
        std::fs::write(path, content).map_err(|e| CoreError::io(path, e))
    }

    fn remove(&self, path: &Path) -> Result<(), CoreError> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CoreError::io(path, e)),
        }
    }
}

#[cfg(test)]
pub mod testing {
    //! An in-memory store for engine tests that should not hit the disk.

    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};

    use super::*;

    #[derive(Debug, Default)]
    pub struct MemStateStore {
        docs: RefCell<HashMap<PathBuf, String>>,
    }

    impl MemStateStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn contains(&self, path: &Path) -> bool {
            self.docs.borrow().contains_key(path)
        }
    }

    impl StateStore for MemStateStore {
        fn read(&self, path: &Path) -> Result<Option<String>, CoreError> {
            Ok(self.docs.borrow().get(path).cloned())
        }

        fn write(&self, path: &Path, content: &str) -> Result<(), CoreError> {
            self.docs
                .borrow_mut()
                .insert(path.to_path_buf(), content.to_string());
            Ok(())
        }

        fn remove(&self, path: &Path) -> Result<(), CoreError> {
            self.docs.borrow_mut().remove(path);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_fs_store_read_missing_is_none() {
        let store = FsStateStore;
        let path = PathBuf::from("/definitely/not/here.json");
        assert!(store.read(&path).unwrap().is_none());
    }

    #[test]
    fn test_fs_store_roundtrip_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");
        let store = FsStateStore;

        store.write(&path, "{}").unwrap();
        assert_eq!(store.read(&path).unwrap().as_deref(), Some("{}"));

        store.remove(&path).unwrap();
        assert!(store.read(&path).unwrap().is_none());
        // Removing again is fine
        store.remove(&path).unwrap();
    }

    #[test]
    fn test_compare_and_swap() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let store = FsStateStore;

        // Create-if-absent
        assert!(store.compare_and_swap(&path, None, "v1").unwrap());
        // Stale expectation refused
        assert!(!store.compare_and_swap(&path, None, "v2").unwrap());
        assert!(!store.compare_and_swap(&path, Some("other"), "v2").unwrap());
        // Matching expectation succeeds
        assert!(store.compare_and_swap(&path, Some("v1"), "v2").unwrap());
        assert_eq!(store.read(&path).unwrap().as_deref(), Some("v2"));
    }
}
