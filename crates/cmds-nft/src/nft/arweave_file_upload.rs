use super::Storage;
use crate::error::UploadError;
use bytes::Bytes;
use std::path::Path;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Upload a local file, returning its URI.
///
/// The file is read before anything is sent, so a missing file never reaches
/// the storage.
pub async fn upload_file<S: Storage + ?Sized>(
    storage: &S,
    path: &Path,
) -> Result<String, UploadError> {
    let data = tokio::fs::read(path)
        .await
        .map_err(|source| UploadError::ReadFile {
            path: path.to_owned(),
            source,
        })?;

    let content_type = mime_guess::from_path(path)
        .first()
        .map(|mime| mime.to_string())
        .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_owned());

    tracing::debug!(
        "uploading {} ({} bytes, {})",
        path.display(),
        data.len(),
        content_type
    );

    upload_checked(storage, data.into(), content_type).await
}

pub(crate) async fn upload_checked<S: Storage + ?Sized>(
    storage: &S,
    data: Bytes,
    content_type: String,
) -> Result<String, UploadError> {
    let uri = storage.upload(data, content_type).await?;
    if uri.trim().is_empty() {
        return Err(UploadError::EmptyUri);
    }
    Ok(uri)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nft::tests::MemoryStorage;

    #[tokio::test]
    async fn test_upload_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("albatross.jpeg");
        tokio::fs::write(&path, b"\xFF\xD8\xFF\xE0jpeg").await.unwrap();

        let storage = MemoryStorage::default();
        let uri = upload_file(&storage, &path).await.unwrap();
        assert!(!uri.is_empty());

        let uploads = storage.uploads();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].content_type, "image/jpeg");
        assert_eq!(&uploads[0].data[..], b"\xFF\xD8\xFF\xE0jpeg");
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = MemoryStorage::default();

        let result = upload_file(&storage, &dir.path().join("missing.jpeg")).await;
        assert!(matches!(result, Err(UploadError::ReadFile { .. })));
        assert!(storage.uploads().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob");
        tokio::fs::write(&path, b"data").await.unwrap();

        let storage = MemoryStorage::default();
        upload_file(&storage, &path).await.unwrap();
        assert_eq!(storage.uploads()[0].content_type, FALLBACK_CONTENT_TYPE);
    }

    #[tokio::test]
    async fn test_empty_uri() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.png");
        tokio::fs::write(&path, b"png").await.unwrap();

        let storage = MemoryStorage::returning("");
        let result = upload_file(&storage, &path).await;
        assert!(matches!(result, Err(UploadError::EmptyUri)));
    }
}
