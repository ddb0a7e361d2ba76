//! Transient storage for uploaded files.
//!
//! Uploads are staged to a local directory for the lifetime of one request
//! and removed when the handler's `StagedFile` guard is dropped, whatever
//! path the handler exits through.

use service_core::error::AppError;
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct UploadStore {
    base_path: PathBuf,
}

impl UploadStore {
    pub async fn new(base_path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let base_path = base_path.into();
        if !base_path.exists() {
            fs::create_dir_all(&base_path).await?;
        }
        Ok(Self { base_path })
    }

    /// Write `data` under a unique name, keeping the upload's extension.
    pub async fn stage(&self, original_name: &str, data: &[u8]) -> Result<StagedFile, AppError> {
        let extension = Path::new(original_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("bin");

        let path = self.base_path.join(format!("{}.{}", Uuid::new_v4(), extension));
        fs::write(&path, data).await?;

        Ok(StagedFile { path })
    }
}

/// A staged upload, removed from disk on drop.
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the staged payload back into memory.
    pub async fn read(&self) -> Result<Vec<u8>, AppError> {
        Ok(fs::read(&self.path).await?)
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to remove staged upload"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_store() -> (UploadStore, PathBuf) {
        let dir = std::env::temp_dir().join(format!("staging-test-{}", Uuid::new_v4()));
        let store = UploadStore::new(&dir).await.unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn staged_file_round_trips_and_is_removed_on_drop() {
        let (store, dir) = test_store().await;

        let staged = store.stage("clip.wav", b"payload").await.unwrap();
        let path = staged.path().to_path_buf();
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("wav"));
        assert_eq!(staged.read().await.unwrap(), b"payload");

        drop(staged);
        assert!(!path.exists());

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn staged_file_is_removed_without_being_read() {
        let (store, dir) = test_store().await;

        let staged = store.stage("unnamed", b"abandoned").await.unwrap();
        let path = staged.path().to_path_buf();
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("bin"));
        assert!(path.exists());

        drop(staged);
        assert!(!path.exists());

        let _ = std::fs::remove_dir_all(dir);
    }
}
