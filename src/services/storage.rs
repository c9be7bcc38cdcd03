//! Blob storage for avatars and post media.
//!
//! Handlers only see the [`StorageBackend`] trait; the bytes land wherever the
//! backend puts them and the database keeps the returned reference.

use crate::error::{AppError, AppResult};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Reference to a stored blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Storage key relative to the backend root, e.g. `avatars/3f2a….png`.
    pub key: String,
    /// Public URL the file is served from.
    pub url: String,
    pub size: u64,
}

#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync {
    /// Copies the file at `source` into the store under `prefix/`.
    async fn store(
        &self,
        prefix: &str,
        original_name: Option<&str>,
        source: &Path,
    ) -> AppResult<StoredFile>;

    async fn delete(&self, key: &str) -> AppResult<()>;

    fn public_url(&self, key: &str) -> String;

    /// Inverse of [`StorageBackend::public_url`]; `None` for URLs this backend did not issue.
    fn key_for_url(&self, url: &str) -> Option<String>;
}

pub struct LocalStorage {
    root: PathBuf,
    base_url: String,
}

impl LocalStorage {
    pub fn new(root: PathBuf, base_url: String) -> Self {
        Self {
            root,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

/// Random file name that keeps the original extension when it is sane.
fn storage_name(original_name: Option<&str>) -> String {
    let extension = original_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| {
            !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(|ext| ext.to_ascii_lowercase());

    let stem = Uuid::new_v4().simple().to_string();
    match extension {
        Some(ext) => format!("{}.{}", stem, ext),
        None => stem,
    }
}

#[async_trait::async_trait]
impl StorageBackend for LocalStorage {
    async fn store(
        &self,
        prefix: &str,
        original_name: Option<&str>,
        source: &Path,
    ) -> AppResult<StoredFile> {
        let key = format!("{}/{}", prefix.trim_matches('/'), storage_name(original_name));
        let path = self.root.join(&key);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Storage(format!("Failed to create directory: {}", e)))?;
        }

        let size = tokio::fs::copy(source, &path)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write {}: {}", key, e)))?;

        log::debug!("Stored {} ({} bytes)", key, size);

        Ok(StoredFile {
            url: self.public_url(&key),
            key,
            size,
        })
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let path = self.root.join(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Storage(format!(
                "Failed to delete {}: {}",
                key, e
            ))),
        }
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }

    fn key_for_url(&self, url: &str) -> Option<String> {
        let key = url.strip_prefix(&self.base_url)?.strip_prefix('/')?;
        if key.is_empty() || key.split('/').any(|part| part.is_empty() || part == "..") {
            return None;
        }
        Some(key.to_string())
    }
}
