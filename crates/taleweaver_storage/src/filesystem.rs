//! Filesystem-based asset storage implementation.
//!
//! Assets live under a root directory and are addressed by their public
//! path, relative to that root.

use crate::{AssetStorage, StoredAsset};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use taleweaver_error::{StorageError, StorageErrorKind, TaleweaverResult};
use uuid::Uuid;

/// Filesystem storage backend.
///
/// # Example Structure
///
/// ```text
/// public/
/// ├── audio/
/// │   └── 3f2a.../
/// │       ├── page-1.mp3
/// │       └── page-2.mp3
/// └── images/
///     └── 3f2a.../
///         └── page-1.png
/// ```
///
/// # Features
///
/// - **Atomic writes**: temp file + rename, so readers never see partial files
/// - **Confined paths**: `..`, absolute paths and unusual characters are rejected
#[derive(Debug, Clone)]
pub struct FileSystemStorage {
    base_path: PathBuf,
    public_base_url: String,
}

impl FileSystemStorage {
    /// Create a new filesystem storage backend.
    ///
    /// Creates the base directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created or accessed.
    #[tracing::instrument(skip(base_path, public_base_url))]
    pub fn new(
        base_path: impl Into<PathBuf>,
        public_base_url: impl Into<String>,
    ) -> TaleweaverResult<Self> {
        let base_path = base_path.into();

        std::fs::create_dir_all(&base_path).map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                base_path.display(),
                e
            )))
        })?;

        let public_base_url = public_base_url.into().trim_end_matches('/').to_string();
        tracing::info!(path = %base_path.display(), base_url = %public_base_url, "Created filesystem storage");
        Ok(Self {
            base_path,
            public_base_url,
        })
    }

    /// Storage root.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Compute SHA-256 hash of data.
    fn compute_hash(data: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(data);
        format!("{:x}", hasher.finalize())
    }

    /// Validate a relative path and split it into segments.
    fn segments(relative: &str) -> Result<Vec<&str>, StorageError> {
        let trimmed = relative.trim_matches('/');
        let invalid = || StorageError::new(StorageErrorKind::InvalidPath(relative.to_string()));
        if trimmed.is_empty() {
            return Err(invalid());
        }
        let segments: Vec<&str> = trimmed.split('/').collect();
        for segment in &segments {
            let allowed = segment
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
            if segment.is_empty() || *segment == "." || *segment == ".." || !allowed {
                return Err(invalid());
            }
        }
        Ok(segments)
    }

    /// Filesystem location of a public path.
    fn resolve(&self, public_path: &str) -> Result<PathBuf, StorageError> {
        Ok(Self::segments(public_path)?
            .into_iter()
            .fold(self.base_path.clone(), |path, segment| path.join(segment)))
    }
}

#[async_trait::async_trait]
impl AssetStorage for FileSystemStorage {
    #[tracing::instrument(skip(self, data), fields(size = data.len()))]
    async fn store(
        &self,
        data: &[u8],
        directory: &str,
        file_name: &str,
    ) -> TaleweaverResult<StoredAsset> {
        let dir_segments = Self::segments(directory)?;
        let name_segments = Self::segments(file_name)?;
        if name_segments.len() != 1 {
            return Err(
                StorageError::new(StorageErrorKind::InvalidPath(file_name.to_string())).into(),
            );
        }

        let public_path = format!("/{}/{}", dir_segments.join("/"), file_name);
        let path = self.resolve(&public_path)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                    "{}: {}",
                    parent.display(),
                    e
                )))
            })?;
        }

        // Unique temp name so concurrent writers of the same asset never share one.
        let temp_path = path.with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4()));
        tokio::fs::write(&temp_path, data).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "{}: {}",
                temp_path.display(),
                e
            )))
        })?;

        if let Err(e) = tokio::fs::rename(&temp_path, &path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(StorageError::new(StorageErrorKind::FileWrite(format!(
                "rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            )))
            .into());
        }

        let content_hash = Self::compute_hash(data);
        tracing::info!(
            hash = %content_hash,
            path = %path.display(),
            size = data.len(),
            "Stored asset"
        );

        Ok(StoredAsset {
            url: self.public_url(&public_path),
            path: public_path,
            size_bytes: data.len() as u64,
            content_hash,
        })
    }

    #[tracing::instrument(skip(self))]
    async fn retrieve(&self, public_path: &str) -> TaleweaverResult<Vec<u8>> {
        let path = self.resolve(public_path)?;

        let data = tokio::fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::new(StorageErrorKind::NotFound(public_path.to_string()))
            } else {
                StorageError::new(StorageErrorKind::FileRead(format!(
                    "{}: {}",
                    path.display(),
                    e
                )))
            }
        })?;

        tracing::debug!(path = %path.display(), size = data.len(), "Retrieved asset");
        Ok(data)
    }

    #[tracing::instrument(skip(self))]
    async fn exists(&self, public_path: &str) -> TaleweaverResult<bool> {
        let path = self.resolve(public_path)?;
        Ok(tokio::fs::try_exists(path).await.unwrap_or(false))
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, public_path: &str) -> TaleweaverResult<()> {
        let path = self.resolve(public_path)?;

        tokio::fs::remove_file(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::new(StorageErrorKind::NotFound(public_path.to_string()))
            } else {
                StorageError::new(StorageErrorKind::FileWrite(format!(
                    "delete {}: {}",
                    path.display(),
                    e
                )))
            }
        })?;

        tracing::info!(path = %path.display(), "Deleted asset");
        Ok(())
    }

    fn public_url(&self, public_path: &str) -> String {
        format!(
            "{}/{}",
            self.public_base_url,
            public_path.trim_start_matches('/')
        )
    }
}
