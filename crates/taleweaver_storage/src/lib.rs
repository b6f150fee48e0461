//! Public asset storage for Taleweaver.
//!
//! Generated page audio and illustrations are written under a storage root
//! and served back over HTTP at the same relative path:
//!
//! ```text
//! {root}/audio/{storyId}/page-1.mp3   →  /audio/{storyId}/page-1.mp3
//! {root}/images/{storyId}/page-1.png  →  /images/{storyId}/page-1.png
//! ```
//!
//! # Example
//!
//! ```rust
//! use taleweaver_storage::{AssetStorage, FileSystemStorage};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = FileSystemStorage::new("/tmp/taleweaver", "http://localhost:5000")?;
//!
//! let asset = storage.store(b"ID3...", "audio/abc123", "page-1.mp3").await?;
//! assert_eq!(asset.path, "/audio/abc123/page-1.mp3");
//! assert_eq!(asset.url, "http://localhost:5000/audio/abc123/page-1.mp3");
//!
//! let bytes = storage.retrieve(&asset.path).await?;
//! assert_eq!(bytes, b"ID3...");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use base64::Engine;
use taleweaver_core::AssetRef;
use taleweaver_error::{StorageError, StorageErrorKind, TaleweaverResult};

mod filesystem;
mod media_type;

pub use filesystem::FileSystemStorage;
pub use media_type::{MediaType, content_type_for};

/// A written asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAsset {
    /// Public path, always starting with `/`
    pub path: String,
    /// Absolute URL
    pub url: String,
    /// Bytes written
    pub size_bytes: u64,
    /// SHA-256 of the content, hex encoded
    pub content_hash: String,
}

impl From<StoredAsset> for AssetRef {
    fn from(asset: StoredAsset) -> Self {
        AssetRef {
            path: asset.path,
            url: asset.url,
        }
    }
}

/// Trait for pluggable asset storage backends.
#[async_trait::async_trait]
pub trait AssetStorage: Send + Sync {
    /// Write `data` to `{directory}/{file_name}`, replacing any existing file.
    ///
    /// Readers never observe a partially written asset.
    ///
    /// # Errors
    ///
    /// Returns [`StorageErrorKind::InvalidPath`] when either part escapes the
    /// storage root, or a write error.
    async fn store(
        &self,
        data: &[u8],
        directory: &str,
        file_name: &str,
    ) -> TaleweaverResult<StoredAsset>;

    /// Decode base64 and store it.
    async fn store_base64(
        &self,
        data: &str,
        directory: &str,
        file_name: &str,
    ) -> TaleweaverResult<StoredAsset> {
        let bytes = decode_base64(data)?;
        self.store(&bytes, directory, file_name).await
    }

    /// Read an asset by public path.
    async fn retrieve(&self, public_path: &str) -> TaleweaverResult<Vec<u8>>;

    /// Whether an asset exists.
    async fn exists(&self, public_path: &str) -> TaleweaverResult<bool>;

    /// Remove an asset.
    async fn delete(&self, public_path: &str) -> TaleweaverResult<()>;

    /// Absolute URL for a public path.
    fn public_url(&self, public_path: &str) -> String;
}

/// Decode standard base64, tolerating a `data:` URL prefix.
pub fn decode_base64(data: &str) -> Result<Vec<u8>, StorageError> {
    let payload = match data.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => data,
    };
    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| StorageError::new(StorageErrorKind::InvalidPayload(e.to_string())))
}
