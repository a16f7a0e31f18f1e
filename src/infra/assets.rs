//! Uploaded image storage on the local filesystem.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Stores uploaded images and hands back the path the core records.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Write `bytes` under a fresh name with extension `ext`, returning its path
    async fn store(&self, ext: &str, bytes: Vec<u8>) -> AppResult<String>;

    /// Remove a previously stored asset. Removing a missing file is not an error.
    async fn remove(&self, path: &str) -> AppResult<()>;
}

/// Writes assets to `{root}/{uuid}.{ext}`
pub struct LocalAssetStore {
    root: PathBuf,
}

impl LocalAssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the upload directory if it does not exist yet.
    pub async fn ensure_root(&self) -> AppResult<()> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| AppError::internal(format!("create {}: {e}", self.root.display())))
    }
}

#[async_trait]
impl AssetStore for LocalAssetStore {
    async fn store(&self, ext: &str, bytes: Vec<u8>) -> AppResult<String> {
        let path = self.root.join(format!("{}.{}", Uuid::new_v4(), ext));

        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| AppError::internal(format!("write {}: {e}", path.display())))?;

        tracing::debug!(path = %path.display(), "Asset stored");
        Ok(path.to_string_lossy().replace('\\', "/"))
    }

    async fn remove(&self, path: &str) -> AppResult<()> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::internal(format!("remove {path}: {e}"))),
        }
    }
}

/// Best-effort removal; failures are logged and swallowed.
pub async fn discard(assets: &dyn AssetStore, path: &str) {
    if let Err(e) = assets.remove(path).await {
        tracing::warn!(path, error = %e, "Failed to discard asset");
    }
}
