//! File-backed store

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use tracing::debug;

use super::{KeyValueStore, StorageError};

/// Store that keeps one JSON file per key inside a profile directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding the stored values.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }

        Ok(self.root.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;

        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");

        fs::create_dir_all(&self.root)?;
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;

        debug!(key, bytes = value.len(), "stored value");

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;

        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn missing_directory_reads_as_empty() -> TestResult {
        let dir = tempfile::tempdir()?;
        let store = FileStore::new(dir.path().join("profile"));

        assert_eq!(store.get("grocery-cart-items")?, None);

        Ok(())
    }

    #[test]
    fn values_survive_reopening() -> TestResult {
        let dir = tempfile::tempdir()?;

        FileStore::new(dir.path()).set("user", r#"{"role":"customer"}"#)?;

        let reopened = FileStore::new(dir.path());

        assert_eq!(
            reopened.get("user")?,
            Some(r#"{"role":"customer"}"#.to_string())
        );
        assert!(dir.path().join("user.json").exists());
        assert!(!dir.path().join("user.json.tmp").exists());

        Ok(())
    }

    #[test]
    fn remove_deletes_file_and_tolerates_missing() -> TestResult {
        let dir = tempfile::tempdir()?;
        let store = FileStore::new(dir.path());

        store.set("last-order", "{}")?;
        store.remove("last-order")?;
        store.remove("last-order")?;

        assert_eq!(store.get("last-order")?, None);

        Ok(())
    }

    #[test]
    fn path_traversal_keys_are_rejected() {
        let store = FileStore::new("unused");

        let result = store.set("../escape", "x");

        assert!(
            matches!(result, Err(StorageError::InvalidKey(ref key)) if key == "../escape"),
            "expected InvalidKey, got {result:?}"
        );
    }
}
