//! Blob storage for StudySync.
//!
//! Each category owns one directory under the storage root:
//! ```text
//! {root}/
//! ├── uploads/
//! ├── assignments/
//! ├── notes/
//! └── qpapers/
//! ```
//! A blob is stored under exactly the filename its record carries. Names
//! must already have passed [`canonical_filename`](super::canonical_filename).

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use super::Category;
use crate::{Result, StudySyncError};

/// Blob store rooted at a directory on disk.
#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    /// Create a BlobStore, creating the root and every category directory.
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        for category in Category::ALL {
            fs::create_dir_all(root.join(category.partition())).await?;
        }

        Ok(Self { root })
    }

    /// Get the root path of this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Full path of a blob.
    pub fn path(&self, category: Category, name: &str) -> PathBuf {
        self.root.join(category.partition()).join(name)
    }

    /// Write a blob, replacing any existing blob of the same name.
    ///
    /// Content goes to a hidden sibling first and is renamed into place, so
    /// readers never observe a half-written blob.
    pub async fn write(&self, category: Category, name: &str, content: &[u8]) -> Result<()> {
        let target = self.path(category, name);
        let staging = self
            .root
            .join(category.partition())
            .join(format!(".{}.part", Uuid::new_v4()));

        let result = async {
            let mut file = fs::File::create(&staging).await?;
            file.write_all(content).await?;
            file.sync_all().await?;
            fs::rename(&staging, &target).await
        }
        .await;

        if let Err(e) = result {
            let _ = fs::remove_file(&staging).await;
            return Err(e.into());
        }

        Ok(())
    }

    /// Open a blob for streaming, returning the file and its size.
    pub async fn open(&self, category: Category, name: &str) -> Result<(fs::File, u64)> {
        let path = self.path(category, name);
        let file = fs::File::open(&path).await.map_err(|e| not_found(e, name))?;
        let metadata = file.metadata().await?;
        if !metadata.is_file() {
            return Err(StudySyncError::NotFound(format!("file '{name}'")));
        }

        Ok((file, metadata.len()))
    }

    #[cfg(test)]
    pub(crate) async fn read(&self, category: Category, name: &str) -> Result<Vec<u8>> {
        fs::read(self.path(category, name))
            .await
            .map_err(|e| not_found(e, name))
    }

    /// Check whether a blob exists.
    pub async fn exists(&self, category: Category, name: &str) -> Result<bool> {
        Ok(fs::try_exists(self.path(category, name)).await?)
    }

    /// Delete a blob.
    ///
    /// Returns `false` if it didn't exist.
    pub async fn remove(&self, category: Category, name: &str) -> Result<bool> {
        match fs::remove_file(self.path(category, name)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

fn not_found(e: io::Error, name: &str) -> StudySyncError {
    if e.kind() == io::ErrorKind::NotFound {
        StudySyncError::NotFound(format!("file '{name}'"))
    } else {
        e.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn setup() -> (TempDir, BlobStore) {
        let dir = TempDir::new().unwrap();
        let store = BlobStore::new(dir.path().join("files")).await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_new_creates_partitions() {
        let (_dir, store) = setup().await;
        for category in Category::ALL {
            assert!(store.root().join(category.partition()).is_dir());
        }
    }

    #[tokio::test]
    async fn test_write_and_read() {
        let (_dir, store) = setup().await;

        store
            .write(Category::Note, "calc.pdf", b"derivatives")
            .await
            .unwrap();
        assert!(store.exists(Category::Note, "calc.pdf").await.unwrap());
        assert_eq!(
            store.read(Category::Note, "calc.pdf").await.unwrap(),
            b"derivatives"
        );

        let (_file, size) = store.open(Category::Note, "calc.pdf").await.unwrap();
        assert_eq!(size, 11);
    }

    #[tokio::test]
    async fn test_write_replaces_existing() {
        let (_dir, store) = setup().await;

        store.write(Category::Upload, "a.txt", b"first").await.unwrap();
        store.write(Category::Upload, "a.txt", b"second").await.unwrap();
        assert_eq!(store.read(Category::Upload, "a.txt").await.unwrap(), b"second");

        let leftovers: Vec<_> = std::fs::read_dir(store.root().join("uploads"))
            .unwrap()
            .flatten()
            .map(|e| e.file_name())
            .collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[tokio::test]
    async fn test_partitions_are_isolated() {
        let (_dir, store) = setup().await;

        store.write(Category::Note, "same.pdf", b"note").await.unwrap();
        assert!(!store.exists(Category::Assignment, "same.pdf").await.unwrap());
        assert!(matches!(
            store.read(Category::Assignment, "same.pdf").await,
            Err(StudySyncError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_blob() {
        let (_dir, store) = setup().await;

        assert!(matches!(
            store.open(Category::QuestionPaper, "nope.pdf").await,
            Err(StudySyncError::NotFound(_))
        ));
        assert!(!store.remove(Category::QuestionPaper, "nope.pdf").await.unwrap());
    }

    #[tokio::test]
    async fn test_remove() {
        let (_dir, store) = setup().await;

        store.write(Category::Assignment, "hw.pdf", b"x").await.unwrap();
        assert!(store.remove(Category::Assignment, "hw.pdf").await.unwrap());
        assert!(!store.exists(Category::Assignment, "hw.pdf").await.unwrap());
    }
}
