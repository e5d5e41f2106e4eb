//! Write-ahead journal for blobs.
//!
//! An upload records a pending marker before it writes its blob and deletes
//! the marker in the same transaction that inserts the metadata record. A
//! marker that outlives its upload therefore names a blob that may have no
//! record, and [`sweep_orphans`] resolves it.

use std::time::Duration;

use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use super::repository::RecordRepository;
use super::storage::BlobStore;
use super::Category;
use crate::Result;

/// A blob written by an upload that has not committed its record yet.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct PendingBlob {
    /// Marker ID.
    pub id: i64,
    /// Category identifier, see [`Category::as_str`].
    pub category: String,
    /// Blob filename.
    pub filename: String,
    /// When the marker was written.
    pub created_at: String,
}

/// Repository for pending blob markers.
pub struct PendingBlobRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> PendingBlobRepository<'a> {
    /// Create a new PendingBlobRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Record that a blob is about to be written. Returns the marker ID.
    pub async fn begin(&self, category: Category, filename: &str) -> Result<i64> {
        let result = sqlx::query("INSERT INTO pending_blobs (category, filename) VALUES (?, ?)")
            .bind(category.as_str())
            .bind(filename)
            .execute(self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    /// Delete a marker outside of any transaction.
    pub async fn discard(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM pending_blobs WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a marker on `conn`, typically inside the record transaction.
    pub async fn clear(conn: &mut SqliteConnection, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM pending_blobs WHERE id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Markers at least `min_age` old, oldest first.
    pub async fn list_older_than(&self, min_age: Duration) -> Result<Vec<PendingBlob>> {
        let markers = sqlx::query_as::<_, PendingBlob>(
            r#"
            SELECT id, category, filename, created_at
            FROM pending_blobs
            WHERE created_at <= datetime('now', ?)
            ORDER BY id
            "#,
        )
        .bind(format!("-{} seconds", min_age.as_secs()))
        .fetch_all(self.pool)
        .await?;

        Ok(markers)
    }

    /// Whether a later upload of the same blob is still pending.
    pub async fn has_newer(&self, marker: &PendingBlob) -> Result<bool> {
        let exists: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM pending_blobs
                WHERE category = ? AND filename = ? AND id > ?
            )
            "#,
        )
        .bind(&marker.category)
        .bind(&marker.filename)
        .bind(marker.id)
        .fetch_one(self.pool)
        .await?;
        Ok(exists.0)
    }

    /// Count all markers.
    pub async fn count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM pending_blobs")
            .fetch_one(self.pool)
            .await?;
        Ok(count.0)
    }
}

/// Outcome of one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Markers resolved.
    pub examined: usize,
    /// Blobs deleted because no record referenced them.
    pub removed_blobs: usize,
}

/// Resolve pending markers older than `min_age`.
///
/// A blob is deleted only when no record of its category names it and no
/// newer marker for the same name is pending; the marker is deleted either
/// way. Pass a zero age at startup, before the
/// server accepts uploads.
pub async fn sweep_orphans(
    pool: &SqlitePool,
    storage: &BlobStore,
    min_age: Duration,
) -> Result<SweepReport> {
    let journal = PendingBlobRepository::new(pool);
    let markers = journal.list_older_than(min_age).await?;
    let mut report = SweepReport::default();

    for marker in markers {
        report.examined += 1;

        match marker.category.parse::<Category>() {
            Ok(category) => {
                let referenced = {
                    let mut conn = pool.acquire().await?;
                    RecordRepository::references(&mut conn, category, &marker.filename).await?
                };
                if referenced {
                    debug!(category = %category, filename = %marker.filename, "Blob is referenced");
                } else if journal.has_newer(&marker).await? {
                    // The newer marker's upload owns the blob now.
                    debug!(category = %category, filename = %marker.filename, "Blob has a newer pending upload");
                } else if storage.remove(category, &marker.filename).await? {
                    report.removed_blobs += 1;
                    debug!(category = %category, filename = %marker.filename, "Removed orphaned blob");
                }
            }
            Err(e) => {
                warn!(marker_id = marker.id, error = %e, "Dropping marker with unknown category");
            }
        }

        journal.discard(marker.id).await?;
    }

    if report.examined > 0 {
        info!(
            examined = report.examined,
            removed_blobs = report.removed_blobs,
            "Orphan sweep finished"
        );
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::{NewRecord, RecordFields};
    use crate::Database;
    use tempfile::TempDir;

    async fn setup() -> (TempDir, Database, BlobStore) {
        let dir = TempDir::new().unwrap();
        let db = Database::open_in_memory().await.unwrap();
        let store = BlobStore::new(dir.path()).await.unwrap();
        (dir, db, store)
    }

    #[tokio::test]
    async fn test_begin_and_discard() {
        let (_dir, db, _store) = setup().await;
        let journal = PendingBlobRepository::new(db.pool());

        let id = journal.begin(Category::Note, "a.pdf").await.unwrap();
        assert_eq!(journal.count().await.unwrap(), 1);
        assert!(journal.discard(id).await.unwrap());
        assert!(!journal.discard(id).await.unwrap());
        assert_eq!(journal.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_respects_age() {
        let (_dir, db, _store) = setup().await;
        let journal = PendingBlobRepository::new(db.pool());
        journal.begin(Category::Note, "fresh.pdf").await.unwrap();

        assert_eq!(journal.list_older_than(Duration::ZERO).await.unwrap().len(), 1);
        assert!(journal
            .list_older_than(Duration::from_secs(3600))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_sweep_removes_unreferenced_blob() {
        let (_dir, db, store) = setup().await;
        let journal = PendingBlobRepository::new(db.pool());

        journal.begin(Category::Assignment, "crashed.pdf").await.unwrap();
        store
            .write(Category::Assignment, "crashed.pdf", b"partial")
            .await
            .unwrap();

        let report = sweep_orphans(db.pool(), &store, Duration::ZERO).await.unwrap();
        assert_eq!(
            report,
            SweepReport {
                examined: 1,
                removed_blobs: 1
            }
        );
        assert!(!store.exists(Category::Assignment, "crashed.pdf").await.unwrap());
        assert_eq!(journal.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_sweep_keeps_referenced_blob() {
        let (_dir, db, store) = setup().await;
        let journal = PendingBlobRepository::new(db.pool());

        // An earlier upload committed the name; a later one crashed after
        // overwriting the blob.
        RecordRepository::new(db.pool())
            .create(&NewRecord::new(
                RecordFields::Note {
                    subject: "Math".into(),
                    unit: "1".into(),
                },
                "calc.pdf",
            ))
            .await
            .unwrap();
        journal.begin(Category::Note, "calc.pdf").await.unwrap();
        store.write(Category::Note, "calc.pdf", b"v2").await.unwrap();

        let report = sweep_orphans(db.pool(), &store, Duration::ZERO).await.unwrap();
        assert_eq!(report.examined, 1);
        assert_eq!(report.removed_blobs, 0);
        assert!(store.exists(Category::Note, "calc.pdf").await.unwrap());
        assert_eq!(journal.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_sweep_without_blob() {
        let (_dir, db, store) = setup().await;
        let journal = PendingBlobRepository::new(db.pool());
        journal.begin(Category::QuestionPaper, "never-written.pdf").await.unwrap();

        let report = sweep_orphans(db.pool(), &store, Duration::ZERO).await.unwrap();
        assert_eq!(report.examined, 1);
        assert_eq!(report.removed_blobs, 0);
        assert_eq!(journal.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_sweep_skips_young_markers() {
        let (_dir, db, store) = setup().await;
        let journal = PendingBlobRepository::new(db.pool());
        journal.begin(Category::Upload, "in-flight.pdf").await.unwrap();
        store.write(Category::Upload, "in-flight.pdf", b"x").await.unwrap();

        let report = sweep_orphans(db.pool(), &store, Duration::from_secs(3600))
            .await
            .unwrap();
        assert_eq!(report, SweepReport::default());
        assert!(store.exists(Category::Upload, "in-flight.pdf").await.unwrap());
        assert_eq!(journal.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_sweep_keeps_blob_with_newer_marker() {
        let (_dir, db, store) = setup().await;
        let journal = PendingBlobRepository::new(db.pool());

        let stale = journal.begin(Category::Note, "x.pdf").await.unwrap();
        sqlx::query("UPDATE pending_blobs SET created_at = datetime('now', '-2 hours') WHERE id = ?")
            .bind(stale)
            .execute(db.pool())
            .await
            .unwrap();
        // A second upload of the same name has written its blob but not its record.
        journal.begin(Category::Note, "x.pdf").await.unwrap();
        store.write(Category::Note, "x.pdf", b"in flight").await.unwrap();

        let report = sweep_orphans(db.pool(), &store, Duration::from_secs(3600))
            .await
            .unwrap();
        assert_eq!(
            report,
            SweepReport {
                examined: 1,
                removed_blobs: 0
            }
        );
        assert!(store.exists(Category::Note, "x.pdf").await.unwrap());
        assert_eq!(journal.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_sweep_removes_blob_after_newer_marker_resolves() {
        let (_dir, db, store) = setup().await;
        let journal = PendingBlobRepository::new(db.pool());

        // Two crashed uploads of the same name.
        journal.begin(Category::Note, "x.pdf").await.unwrap();
        journal.begin(Category::Note, "x.pdf").await.unwrap();
        store.write(Category::Note, "x.pdf", b"orphan").await.unwrap();

        let report = sweep_orphans(db.pool(), &store, Duration::ZERO).await.unwrap();
        assert_eq!(report.examined, 2);
        assert_eq!(report.removed_blobs, 1);
        assert!(!store.exists(Category::Note, "x.pdf").await.unwrap());
        assert_eq!(journal.count().await.unwrap(), 0);
    }
}
