//! Object-store collaborator
//!
//! Blob storage addressed by relative artifact path. `put` returns a
//! locator (backend-specific display string); `get` takes the same artifact
//! path used at `put` time, so readers never need to understand locators.

use async_trait::async_trait;
use std::path::PathBuf;
use tcgen_utils::error::ObjectStoreError;
use tracing::debug;

/// Blob storage for generated samples and test sources.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store bytes at an artifact path, returning a locator. Writes are
    /// last-writer-wins.
    async fn put(
        &self,
        path: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, ObjectStoreError>;

    /// Fetch the bytes previously stored at an artifact path.
    async fn get(&self, path: &str) -> Result<Vec<u8>, ObjectStoreError>;
}

/// Filesystem-backed store rooted at a directory. The locator is the
/// absolute path of the written file.
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn put(
        &self,
        path: &str,
        bytes: &[u8],
        _content_type: &str,
    ) -> Result<String, ObjectStoreError> {
        let full = self.resolve(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ObjectStoreError::Write {
                path: path.to_string(),
                source,
            })?;
        }
        std::fs::write(&full, bytes).map_err(|source| ObjectStoreError::Write {
            path: path.to_string(),
            source,
        })?;

        debug!(path, bytes = bytes.len(), "stored object");
        Ok(full.display().to_string())
    }

    async fn get(&self, path: &str) -> Result<Vec<u8>, ObjectStoreError> {
        let full = self.resolve(path);
        match std::fs::read(&full) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ObjectStoreError::NotFound(path.to_string()))
            }
            Err(source) => Err(ObjectStoreError::Read {
                path: path.to_string(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(dir.path());

        let locator = store
            .put("artifacts/samples/REQ-1/TC-1.json", b"{}", "application/json")
            .await
            .unwrap();
        assert!(locator.contains("TC-1.json"));

        let bytes = store.get("artifacts/samples/REQ-1/TC-1.json").await.unwrap();
        assert_eq!(bytes, b"{}");
    }

    #[tokio::test]
    async fn put_is_last_writer_wins() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(dir.path());

        store.put("a/b.txt", b"one", "text/plain").await.unwrap();
        store.put("a/b.txt", b"two", "text/plain").await.unwrap();
        assert_eq!(store.get("a/b.txt").await.unwrap(), b"two");
    }

    #[tokio::test]
    async fn get_missing_object_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(dir.path());
        let err = store.get("missing.json").await.unwrap_err();
        assert!(matches!(err, ObjectStoreError::NotFound(_)));
    }
}
