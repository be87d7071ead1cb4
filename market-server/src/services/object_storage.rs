//! Object storage collaborator
//!
//! The engine only ever needs `upload(bytes) -> url`. The filesystem
//! implementation serves deployments where evidence lives next to the
//! database; anything else (S3, GCS) slots in behind the same trait.

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/// Object storage errors
#[derive(Debug, Error)]
pub enum ObjectStorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Rejected: {0}")]
    Rejected(String),
}

/// Upload interface consumed by the dispute subsystem
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store the bytes and return a stable public URL
    async fn upload(&self, file_name: &str, bytes: &[u8]) -> Result<String, ObjectStorageError>;
}

/// Filesystem-backed object store under the server work directory
pub struct FsObjectStore {
    root: PathBuf,
    public_base: String,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base: public_base.into(),
        }
    }

    /// Object key: random id plus the original extension, if any
    fn object_key(file_name: &str) -> String {
        let id = Uuid::new_v4();
        match file_name.rsplit_once('.') {
            Some((_, ext)) if !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()) => {
                format!("{id}.{}", ext.to_ascii_lowercase())
            }
            _ => id.to_string(),
        }
    }
}

#[async_trait]
impl ObjectStorage for FsObjectStore {
    async fn upload(&self, file_name: &str, bytes: &[u8]) -> Result<String, ObjectStorageError> {
        if bytes.is_empty() {
            return Err(ObjectStorageError::Rejected("empty file".to_string()));
        }

        let key = Self::object_key(file_name);
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(self.root.join(&key), bytes).await?;

        Ok(format!("{}/{key}", self.public_base.trim_end_matches('/')))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_writes_file_and_returns_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(dir.path(), "https://cdn.example/evidence/");

        let url = store.upload("photo.JPG", b"fakejpegbytes").await.unwrap();
        assert!(url.starts_with("https://cdn.example/evidence/"));
        assert!(url.ends_with(".jpg"));

        let key = url.rsplit('/').next().unwrap();
        let on_disk = std::fs::read(dir.path().join(key)).unwrap();
        assert_eq!(on_disk, b"fakejpegbytes");
    }

    #[tokio::test]
    async fn test_empty_upload_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(dir.path(), "https://cdn.example");

        let result = store.upload("photo.jpg", b"").await;
        assert!(matches!(result, Err(ObjectStorageError::Rejected(_))));
    }

    #[test]
    fn test_object_key_drops_suspicious_extensions() {
        assert!(!FsObjectStore::object_key("x.j/../pg").contains('/'));
        let plain = FsObjectStore::object_key("noext");
        assert!(!plain.contains('.'));
    }
}
