//! Listing and download lookups.

use sqlx::SqlitePool;
use tokio::fs::File;

use super::filename::canonical_filename;
use super::record::{Record, RecordFilter};
use super::repository::RecordRepository;
use super::storage::BlobStore;
use super::Category;
use crate::{Result, StudySyncError};

/// List records of a category matching `filter`.
pub async fn list_records(
    pool: &SqlitePool,
    category: Category,
    filter: &RecordFilter,
) -> Result<Vec<Record>> {
    RecordRepository::new(pool).query(category, filter).await
}

/// An opened blob, ready to stream.
#[derive(Debug)]
pub struct BlobHandle {
    /// Canonical filename.
    pub filename: String,
    /// Open file.
    pub file: File,
    /// Size in bytes.
    pub size: u64,
}

/// Open a blob by the name a client asked for.
///
/// The name is resolved directly in the category directory without a
/// metadata lookup. Unsafe names give [`StudySyncError::Validation`] and a
/// missing blob gives [`StudySyncError::NotFound`].
pub async fn open_blob(storage: &BlobStore, category: Category, raw_name: &str) -> Result<BlobHandle> {
    let filename = canonical_filename(raw_name)
        .map_err(|e| StudySyncError::Validation(format!("invalid file name: {e}")))?
        .to_string();

    let (file, size) = storage.open(category, &filename).await?;

    Ok(BlobHandle {
        filename,
        file,
        size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_open_blob() {
        let dir = TempDir::new().unwrap();
        let store = BlobStore::new(dir.path()).await.unwrap();
        store
            .write(Category::QuestionPaper, "final.pdf", b"paper")
            .await
            .unwrap();

        let handle = open_blob(&store, Category::QuestionPaper, "final.pdf")
            .await
            .unwrap();
        assert_eq!(handle.filename, "final.pdf");
        assert_eq!(handle.size, 5);
    }

    #[tokio::test]
    async fn test_open_blob_rejects_traversal() {
        let dir = TempDir::new().unwrap();
        let store = BlobStore::new(dir.path().join("files")).await.unwrap();
        std::fs::write(dir.path().join("secret.txt"), b"secret").unwrap();

        for name in ["../secret.txt", "../../secret.txt", "..", "a/b", ""] {
            let result = open_blob(&store, Category::Note, name).await;
            assert!(
                matches!(result, Err(StudySyncError::Validation(_))),
                "{name:?} should be refused"
            );
        }
    }

    #[tokio::test]
    async fn test_open_blob_missing() {
        let dir = TempDir::new().unwrap();
        let store = BlobStore::new(dir.path()).await.unwrap();

        let result = open_blob(&store, Category::Assignment, "nothing.pdf").await;
        assert!(matches!(result, Err(StudySyncError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_open_blob_in_wrong_category() {
        let dir = TempDir::new().unwrap();
        let store = BlobStore::new(dir.path()).await.unwrap();
        store.write(Category::Note, "calc.pdf", b"x").await.unwrap();

        let result = open_blob(&store, Category::Assignment, "calc.pdf").await;
        assert!(matches!(result, Err(StudySyncError::NotFound(_))));
    }
}
