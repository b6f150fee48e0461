//! Tests for filesystem asset storage.

use taleweaver_core::AssetRef;
use taleweaver_error::{StorageErrorKind, TaleweaverErrorKind};
use taleweaver_storage::{AssetStorage, FileSystemStorage, MediaType, decode_base64};
use tempfile::TempDir;

fn storage(dir: &TempDir) -> FileSystemStorage {
    FileSystemStorage::new(dir.path(), "http://localhost:5000/").unwrap()
}

fn storage_kind(err: &taleweaver_error::TaleweaverError) -> Option<&StorageErrorKind> {
    match err.kind() {
        TaleweaverErrorKind::Storage(e) => Some(&e.kind),
        _ => None,
    }
}

#[tokio::test]
async fn test_store_and_retrieve() {
    let temp_dir = TempDir::new().unwrap();
    let storage = storage(&temp_dir);

    let asset = storage
        .store(b"page audio", "audio/story-1", "page-1.mp3")
        .await
        .unwrap();

    assert_eq!(asset.path, "/audio/story-1/page-1.mp3");
    assert_eq!(asset.url, "http://localhost:5000/audio/story-1/page-1.mp3");
    assert_eq!(asset.size_bytes, 10);
    assert_eq!(asset.content_hash.len(), 64);
    assert!(temp_dir.path().join("audio/story-1/page-1.mp3").is_file());

    let retrieved = storage.retrieve(&asset.path).await.unwrap();
    assert_eq!(retrieved, b"page audio");

    let asset_ref: AssetRef = asset.into();
    assert_eq!(asset_ref.path, "/audio/story-1/page-1.mp3");
}

#[tokio::test]
async fn test_overwrite_replaces_content_and_leaves_no_temp_files() {
    let temp_dir = TempDir::new().unwrap();
    let storage = storage(&temp_dir);

    storage.store(b"first", "images/s", "page-1.png").await.unwrap();
    storage.store(b"second", "images/s", "page-1.png").await.unwrap();

    assert_eq!(storage.retrieve("/images/s/page-1.png").await.unwrap(), b"second");
    let entries: Vec<_> = std::fs::read_dir(temp_dir.path().join("images/s"))
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(entries, vec!["page-1.png".to_string()]);
}

#[tokio::test]
async fn test_concurrent_writes_of_same_asset() {
    let temp_dir = TempDir::new().unwrap();
    let storage = std::sync::Arc::new(storage(&temp_dir));

    let mut handles = Vec::new();
    for i in 0..8u8 {
        let storage = storage.clone();
        handles.push(tokio::spawn(async move {
            storage.store(&[i; 64], "audio/race", "page-1.mp3").await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let data = storage.retrieve("/audio/race/page-1.mp3").await.unwrap();
    assert_eq!(data.len(), 64);
    assert!(data.iter().all(|b| *b == data[0]));
}

#[tokio::test]
async fn test_store_base64() {
    let temp_dir = TempDir::new().unwrap();
    let storage = storage(&temp_dir);

    let asset = storage
        .store_base64("data:image/png;base64,aGVsbG8=", "images/b64", "page-2.png")
        .await
        .unwrap();
    assert_eq!(storage.retrieve(&asset.path).await.unwrap(), b"hello");

    let err = storage
        .store_base64("not base64!!", "images/b64", "page-3.png")
        .await
        .unwrap_err();
    assert!(matches!(storage_kind(&err), Some(StorageErrorKind::InvalidPayload(_))));
}

#[tokio::test]
async fn test_path_traversal_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let storage = storage(&temp_dir);

    for (dir, file) in [
        ("../outside", "x.mp3"),
        ("audio/..", "x.mp3"),
        ("audio", "../x.mp3"),
        ("audio", "a/b.mp3"),
        ("audio", "bad name.mp3"),
        ("", "x.mp3"),
    ] {
        let err = storage.store(b"x", dir, file).await.unwrap_err();
        assert!(
            matches!(storage_kind(&err), Some(StorageErrorKind::InvalidPath(_))),
            "{dir}/{file} should be rejected"
        );
    }

    assert!(storage.retrieve("/audio/../../etc/passwd").await.is_err());
}

#[tokio::test]
async fn test_missing_asset() {
    let temp_dir = TempDir::new().unwrap();
    let storage = storage(&temp_dir);

    assert!(!storage.exists("/audio/none/page-1.mp3").await.unwrap());
    let err = storage.retrieve("/audio/none/page-1.mp3").await.unwrap_err();
    assert!(matches!(storage_kind(&err), Some(StorageErrorKind::NotFound(_))));
}

#[tokio::test]
async fn test_delete() {
    let temp_dir = TempDir::new().unwrap();
    let storage = storage(&temp_dir);

    let asset = storage.store(b"bye", "audio/d", "page-1.mp3").await.unwrap();
    assert!(storage.exists(&asset.path).await.unwrap());
    storage.delete(&asset.path).await.unwrap();
    assert!(!storage.exists(&asset.path).await.unwrap());
    assert!(storage.delete(&asset.path).await.is_err());
}

#[test]
fn test_media_type_directories() {
    assert_eq!(MediaType::from_directory("images"), Some(MediaType::Image));
    assert_eq!(MediaType::Audio.directory(), "audio");
    assert_eq!(MediaType::Image.extension(), "png");
    assert_eq!(MediaType::from_directory("video"), None);
}

#[test]
fn test_decode_plain_base64() {
    assert_eq!(decode_base64("aGk=").unwrap(), b"hi");
}
